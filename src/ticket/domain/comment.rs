//! Append-only ticket comments.

use super::{CommentId, TicketDomainError, TicketId};
use crate::partnership::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A single entry in a ticket's comment log.
///
/// Comments are never edited; they disappear only when their ticket is
/// deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    id: CommentId,
    ticket_id: TicketId,
    author_id: UserId,
    body: String,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCommentData {
    /// Persisted comment identifier.
    pub id: CommentId,
    /// Persisted owning ticket.
    pub ticket_id: TicketId,
    /// Persisted author.
    pub author_id: UserId,
    /// Persisted body text.
    pub body: String,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a new comment.
    ///
    /// # Errors
    ///
    /// Returns [`TicketDomainError::EmptyBody`] if the body is empty after
    /// trimming.
    pub fn new(
        ticket_id: TicketId,
        author_id: UserId,
        body: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, TicketDomainError> {
        let raw = body.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(TicketDomainError::EmptyBody);
        }

        Ok(Self {
            id: CommentId::new(),
            ticket_id,
            author_id,
            body: normalized.to_owned(),
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a comment from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedCommentData) -> Self {
        Self {
            id: data.id,
            ticket_id: data.ticket_id,
            author_id: data.author_id,
            body: data.body,
            created_at: data.created_at,
        }
    }

    /// Returns the comment identifier.
    #[must_use]
    pub const fn id(&self) -> CommentId {
        self.id
    }

    /// Returns the owning ticket's identifier.
    #[must_use]
    pub const fn ticket_id(&self) -> TicketId {
        self.ticket_id
    }

    /// Returns the author's identifier.
    #[must_use]
    pub const fn author_id(&self) -> UserId {
        self.author_id
    }

    /// Returns the body text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
