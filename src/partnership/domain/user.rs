//! User aggregate and validated identity value objects.

use super::{PartnershipDomainError, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized, validated email address.
///
/// Input is trimmed and lowercased; the address must contain exactly one `@`
/// with non-empty local and domain parts. Full RFC validation is the
/// upstream schema collaborator's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// # Errors
    ///
    /// Returns [`PartnershipDomainError::InvalidEmail`] when the value does
    /// not have a `local@domain` shape.
    pub fn new(value: impl Into<String>) -> Result<Self, PartnershipDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();
        let mut parts = normalized.split('@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        let has_more_parts = parts.next().is_some();
        let is_valid = !local.is_empty()
            && !domain.is_empty()
            && !has_more_parts
            && !normalized.chars().any(char::is_whitespace);

        if !is_valid {
            return Err(PartnershipDomainError::InvalidEmail(raw));
        }

        Ok(Self(normalized))
    }

    /// Returns the address as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User aggregate root.
///
/// The partner link is a plain identifier back-reference; it never implies
/// ownership of the partner account or of the shared board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    name: String,
    email: EmailAddress,
    partner_id: Option<UserId>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUserData {
    /// Persisted user identifier.
    pub id: UserId,
    /// Persisted display name.
    pub name: String,
    /// Persisted email address.
    pub email: EmailAddress,
    /// Persisted partner link, if any.
    pub partner_id: Option<UserId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new unpartnered user.
    ///
    /// # Errors
    ///
    /// Returns [`PartnershipDomainError::EmptyUserName`] if the name is
    /// empty after trimming.
    pub fn new(
        name: impl Into<String>,
        email: EmailAddress,
        clock: &impl Clock,
    ) -> Result<Self, PartnershipDomainError> {
        let raw_name = name.into();
        let normalized = raw_name.trim();
        if normalized.is_empty() {
            return Err(PartnershipDomainError::EmptyUserName);
        }

        Ok(Self {
            id: UserId::new(),
            name: normalized.to_owned(),
            email,
            partner_id: None,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a user from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUserData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            email: data.email,
            partner_id: data.partner_id,
            created_at: data.created_at,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the email address.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the current partner link, if any.
    #[must_use]
    pub const fn partner_id(&self) -> Option<UserId> {
        self.partner_id
    }

    /// Returns `true` when the user has a committed partner.
    #[must_use]
    pub const fn is_partnered(&self) -> bool {
        self.partner_id.is_some()
    }

    /// Returns `true` when this user is mutually linked to `other`.
    #[must_use]
    pub fn is_partner_of(&self, other: &Self) -> bool {
        self.partner_id == Some(other.id) && other.partner_id == Some(self.id)
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Sets the partner link. Written only by the invite engine's accept
    /// path.
    ///
    /// # Errors
    ///
    /// Returns [`PartnershipDomainError::SelfReference`] when linking a user
    /// to themselves.
    pub fn link_partner(&mut self, partner_id: UserId) -> Result<(), PartnershipDomainError> {
        if partner_id == self.id {
            return Err(PartnershipDomainError::SelfReference(self.id));
        }
        self.partner_id = Some(partner_id);
        Ok(())
    }

    /// Clears the partner link. Written only by the break-up path.
    pub const fn unlink_partner(&mut self) {
        self.partner_id = None;
    }
}
