//! Shared board aggregate and the unordered partner pair that owns it.

use super::{BoardId, PartnershipDomainError, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unordered pair of partnered users.
///
/// The pair is normalized on construction (lower UUID first) so that
/// `{A, B}` and `{B, A}` compare and hash identically. Board uniqueness is
/// keyed on this normalized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartnerPair {
    first: UserId,
    second: UserId,
}

impl PartnerPair {
    /// Creates a normalized pair from two distinct users.
    ///
    /// # Errors
    ///
    /// Returns [`PartnershipDomainError::SelfReference`] when both sides are
    /// the same user.
    pub fn new(a: UserId, b: UserId) -> Result<Self, PartnershipDomainError> {
        if a == b {
            return Err(PartnershipDomainError::SelfReference(a));
        }
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Ok(Self { first, second })
    }

    /// Returns the lower-ordered member.
    #[must_use]
    pub const fn first(&self) -> UserId {
        self.first
    }

    /// Returns the higher-ordered member.
    #[must_use]
    pub const fn second(&self) -> UserId {
        self.second
    }

    /// Returns `true` when the given user is one of the pair.
    #[must_use]
    pub fn contains(&self, user_id: UserId) -> bool {
        self.first == user_id || self.second == user_id
    }

    /// Returns the other member of the pair, or `None` when the given user
    /// is not a member.
    #[must_use]
    pub fn other(&self, user_id: UserId) -> Option<UserId> {
        if self.first == user_id {
            Some(self.second)
        } else if self.second == user_id {
            Some(self.first)
        } else {
            None
        }
    }

    /// Returns both members in normalized order.
    #[must_use]
    pub const fn members(&self) -> [UserId; 2] {
        [self.first, self.second]
    }
}

impl fmt::Display for PartnerPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.first, self.second)
    }
}

/// Validated board display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardName(String);

impl BoardName {
    /// Name given to boards created on the invite accept path.
    pub const DEFAULT: &'static str = "Our Board";

    /// Creates a validated board name.
    ///
    /// # Errors
    ///
    /// Returns [`PartnershipDomainError::EmptyBoardName`] if the name is
    /// empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, PartnershipDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(PartnershipDomainError::EmptyBoardName);
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BoardName {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl AsRef<str> for BoardName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BoardName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared board aggregate root.
///
/// Exactly one board exists per partnership; it owns the tickets filed
/// against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    id: BoardId,
    name: BoardName,
    members: PartnerPair,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedBoardData {
    /// Persisted board identifier.
    pub id: BoardId,
    /// Persisted display name.
    pub name: BoardName,
    /// Persisted member pair.
    pub members: PartnerPair,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Board {
    /// Creates a new board for a freshly committed partnership with the
    /// default name.
    #[must_use]
    pub fn new(members: PartnerPair, clock: &impl Clock) -> Self {
        Self {
            id: BoardId::new(),
            name: BoardName::default(),
            members,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a board from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedBoardData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            members: data.members,
            created_at: data.created_at,
        }
    }

    /// Returns the board identifier.
    #[must_use]
    pub const fn id(&self) -> BoardId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &BoardName {
        &self.name
    }

    /// Returns the owning member pair.
    #[must_use]
    pub const fn members(&self) -> PartnerPair {
        self.members
    }

    /// Returns `true` when the given user is one of the board's two members.
    #[must_use]
    pub fn has_member(&self, user_id: UserId) -> bool {
        self.members.contains(user_id)
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replaces the display name.
    pub fn rename(&mut self, name: BoardName) {
        self.name = name;
    }
}
