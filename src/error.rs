//! Transport-facing error taxonomy.
//!
//! Every service error in this crate maps onto one of these kinds so the
//! HTTP-layer collaborator can choose a status code without inspecting
//! variant internals. The core itself never retries a failed precondition;
//! conflicting second calls fail cleanly and idempotent retries are the
//! caller's responsibility.

use std::fmt;

/// Coarse classification of a core operation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No identified caller backs the request.
    Unauthorized,
    /// The caller is identified but not entitled (non-member, non-author).
    Forbidden,
    /// The entity is absent, or the caller must not learn it exists.
    NotFound,
    /// A state-machine precondition was violated (already resolved, already
    /// partnered, duplicate reflection, stale invite).
    Conflict,
    /// Input was malformed in a way the shape-validation collaborator could
    /// not catch (self-invite, empty title, unknown enum value).
    Validation,
    /// The storage layer failed; not a caller mistake.
    Internal,
}

impl ErrorKind {
    /// Returns the canonical lowercase label for logging and diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that expose a taxonomy classification.
pub trait Classify {
    /// Returns the taxonomy kind for this error.
    fn kind(&self) -> ErrorKind;
}
