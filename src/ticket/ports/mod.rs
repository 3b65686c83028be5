//! Port contracts for the ticket lifecycle.
//!
//! One port per aggregate: tickets, the comment log, and reflections. A
//! single adapter typically implements all three over the same store so the
//! cascade and counting operations stay atomic.

pub mod comments;
pub mod reflections;
pub mod tickets;

pub use comments::{COMMENT_PAGE_SIZE, CommentPage, CommentRepository};
pub use reflections::ReflectionRepository;
pub use tickets::{TICKET_PAGE_SIZE, TicketFilter, TicketPage, TicketRepository};

use crate::partnership::domain::UserId;
use crate::ticket::domain::TicketId;
use std::sync::Arc;
use thiserror::Error;

/// Result type for ticket repository operations.
pub type TicketRepositoryResult<T> = Result<T, TicketRepositoryError>;

/// Errors returned by ticket, comment, and reflection repository
/// implementations.
#[derive(Debug, Clone, Error)]
pub enum TicketRepositoryError {
    /// A record with the same identifier already exists.
    #[error("duplicate record identifier: {0}")]
    DuplicateRecord(uuid::Uuid),

    /// The ticket was not found.
    #[error("ticket not found: {0}")]
    TicketNotFound(TicketId),

    /// A reflection by the same author already exists for the ticket.
    #[error("duplicate reflection on ticket {ticket_id} by {author_id}")]
    DuplicateReflection {
        /// The ticket the duplicate targets.
        ticket_id: TicketId,
        /// The author who already reflected.
        author_id: UserId,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TicketRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
