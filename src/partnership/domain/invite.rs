//! Pairing invite value objects and lifecycle state.

use super::{InviteId, ParseInviteStatusError, PartnershipDomainError, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Invite lifecycle status.
///
/// Rejected invites are deleted rather than retained, so no `Rejected`
/// variant exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    /// Awaiting a response from the invitee.
    Pending,
    /// Converted into a partnership.
    Accepted,
}

impl InviteStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
        }
    }
}

impl TryFrom<&str> for InviteStatus {
    type Error = ParseInviteStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            _ => Err(ParseInviteStatusError(value.to_owned())),
        }
    }
}

/// A pairing request from one user to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    id: InviteId,
    inviter_id: UserId,
    invitee_id: UserId,
    status: InviteStatus,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted invite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedInviteData {
    /// Persisted invite identifier.
    pub id: InviteId,
    /// Persisted inviter identifier.
    pub inviter_id: UserId,
    /// Persisted invitee identifier.
    pub invitee_id: UserId,
    /// Persisted lifecycle status.
    pub status: InviteStatus,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Invite {
    /// Creates a new pending invite.
    ///
    /// # Errors
    ///
    /// Returns [`PartnershipDomainError::SelfReference`] when the inviter
    /// addresses themselves.
    pub fn new(
        inviter_id: UserId,
        invitee_id: UserId,
        clock: &impl Clock,
    ) -> Result<Self, PartnershipDomainError> {
        if inviter_id == invitee_id {
            return Err(PartnershipDomainError::SelfReference(inviter_id));
        }

        Ok(Self {
            id: InviteId::new(),
            inviter_id,
            invitee_id,
            status: InviteStatus::Pending,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs an invite from persisted storage.
    #[must_use]
    pub const fn from_persisted(data: PersistedInviteData) -> Self {
        Self {
            id: data.id,
            inviter_id: data.inviter_id,
            invitee_id: data.invitee_id,
            status: data.status,
            created_at: data.created_at,
        }
    }

    /// Returns the invite identifier.
    #[must_use]
    pub const fn id(&self) -> InviteId {
        self.id
    }

    /// Returns the inviter identifier.
    #[must_use]
    pub const fn inviter_id(&self) -> UserId {
        self.inviter_id
    }

    /// Returns the invitee identifier.
    #[must_use]
    pub const fn invitee_id(&self) -> UserId {
        self.invitee_id
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> InviteStatus {
        self.status
    }

    /// Returns `true` while the invite awaits a response.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == InviteStatus::Pending
    }

    /// Returns `true` when the given user is named by this invite, as either
    /// inviter or invitee.
    #[must_use]
    pub fn names(&self, user_id: UserId) -> bool {
        self.inviter_id == user_id || self.invitee_id == user_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Marks the invite accepted. Written only by the commit path, after
    /// the pending-state re-check.
    pub const fn mark_accepted(&mut self) {
        self.status = InviteStatus::Accepted;
    }
}
