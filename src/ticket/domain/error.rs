//! Error types for ticket domain validation and parsing.

use super::{TicketId, TicketStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating domain ticket values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TicketDomainError {
    /// The ticket title is empty after trimming.
    #[error("ticket title must not be empty")]
    EmptyTitle,

    /// The comment or reflection body is empty after trimming.
    #[error("body must not be empty")]
    EmptyBody,

    /// The requested status change would move the ticket backwards.
    #[error("ticket {ticket_id} cannot move from {from:?} to {to:?}")]
    InvalidStatusTransition {
        /// The ticket being transitioned.
        ticket_id: TicketId,
        /// The current status.
        from: TicketStatus,
        /// The rejected target status.
        to: TicketStatus,
    },

    /// The ticket is already resolved.
    #[error("ticket {0} is already resolved")]
    AlreadyResolved(TicketId),
}

/// Error returned while parsing ticket statuses from persistence.
///
/// Only the canonical spellings parse; in particular `in_progress` is not
/// an alias for `in_talks`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown ticket status: {0}")]
pub struct ParseTicketStatusError(pub String);

/// Error returned while parsing ticket categories from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown ticket category: {0}")]
pub struct ParseTicketCategoryError(pub String);

/// Error returned while parsing ticket priorities from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown ticket priority: {0}")]
pub struct ParseTicketPriorityError(pub String);
