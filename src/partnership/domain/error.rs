//! Error types for partnership domain validation and parsing.

use super::UserId;
use thiserror::Error;

/// Errors returned while constructing partnership domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PartnershipDomainError {
    /// The user name is empty after trimming.
    #[error("user name must not be empty")]
    EmptyUserName,

    /// The email address does not have a `local@domain` shape.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// The board name is empty after trimming.
    #[error("board name must not be empty")]
    EmptyBoardName,

    /// A user was paired with itself.
    #[error("user {0} cannot partner with themselves")]
    SelfReference(UserId),
}

/// Error returned while parsing invite statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown invite status: {0}")]
pub struct ParseInviteStatusError(pub String);
