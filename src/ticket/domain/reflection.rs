//! Close-out reflections, one per partner per ticket.

use super::{ReflectionId, TicketDomainError, TicketId};
use crate::partnership::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// One partner's written reflection on a ticket.
///
/// At most one reflection exists per (ticket, author); the second distinct
/// author's reflection resolves the ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reflection {
    id: ReflectionId,
    ticket_id: TicketId,
    author_id: UserId,
    body: String,
    created_at: DateTime<Utc>,
}

impl Reflection {
    /// Creates a new reflection.
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
            id: ReflectionId::new(),
            ticket_id,
            author_id,
            body: normalized.to_owned(),
            created_at: clock.utc(),
        })
    }

    /// Returns the reflection identifier.
    #[must_use]
    pub const fn id(&self) -> ReflectionId {
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
