//! Ticket aggregate root and its forward-only status machine.

use super::{
    ParseTicketCategoryError, ParseTicketPriorityError, ParseTicketStatusError, TicketDomainError,
    TicketId, TicketPatch,
};
use crate::partnership::domain::{BoardId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticket lifecycle status.
///
/// Status only ever moves forward; the archived flag is orthogonal and never
/// interacts with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Freshly filed, no partner response yet.
    Open,
    /// The partner has replied at least once.
    InTalks,
    /// The author has called resolve; both partners must now reflect.
    NeedsReflection,
    /// Both reflections are in. Terminal.
    Resolved,
}

impl TicketStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InTalks => "in_talks",
            Self::NeedsReflection => "needs_reflection",
            Self::Resolved => "resolved",
        }
    }

    /// Returns `true` when the status machine permits moving to `target`.
    ///
    /// Valid moves: `open → in_talks`, `open → needs_reflection` (resolve
    /// without any comment), `in_talks → needs_reflection`, and
    /// `needs_reflection → resolved`. Nothing moves backwards.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Open, Self::InTalks)
                | (Self::Open | Self::InTalks, Self::NeedsReflection)
                | (Self::NeedsReflection, Self::Resolved)
        )
    }

    /// Returns `true` for the terminal status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved)
    }
}

impl TryFrom<&str> for TicketStatus {
    type Error = ParseTicketStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "open" => Ok(Self::Open),
            "in_talks" => Ok(Self::InTalks),
            "needs_reflection" => Ok(Self::NeedsReflection),
            "resolved" => Ok(Self::Resolved),
            _ => Err(ParseTicketStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Topic a ticket is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketCategory {
    /// How the pair talks to each other.
    Communication,
    /// The relationship itself.
    Relationship,
    /// Chores and shared living.
    Household,
    /// Money matters.
    Finance,
    /// Physical and mental health.
    Wellbeing,
    /// Anything else.
    Other,
}

impl TicketCategory {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Communication => "communication",
            Self::Relationship => "relationship",
            Self::Household => "household",
            Self::Finance => "finance",
            Self::Wellbeing => "wellbeing",
            Self::Other => "other",
        }
    }
}

impl TryFrom<&str> for TicketCategory {
    type Error = ParseTicketCategoryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "communication" => Ok(Self::Communication),
            "relationship" => Ok(Self::Relationship),
            "household" => Ok(Self::Household),
            "finance" => Ok(Self::Finance),
            "wellbeing" => Ok(Self::Wellbeing),
            "other" => Ok(Self::Other),
            _ => Err(ParseTicketCategoryError(value.to_owned())),
        }
    }
}

impl fmt::Display for TicketCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Urgency assigned by the ticket's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    /// Can wait.
    Low,
    /// Should be talked through soon.
    Medium,
    /// Needs attention now.
    High,
}

impl TicketPriority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl TryFrom<&str> for TicketPriority {
    type Error = ParseTicketPriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseTicketPriorityError(value.to_owned())),
        }
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ticket aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    id: TicketId,
    board_id: BoardId,
    author_id: UserId,
    title: String,
    description: Option<String>,
    category: TicketCategory,
    priority: TicketPriority,
    status: TicketStatus,
    archived: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTicketData {
    /// Persisted ticket identifier.
    pub id: TicketId,
    /// Persisted owning board.
    pub board_id: BoardId,
    /// Persisted author.
    pub author_id: UserId,
    /// Persisted title.
    pub title: String,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted category.
    pub category: TicketCategory,
    /// Persisted priority.
    pub priority: TicketPriority,
    /// Persisted lifecycle status.
    pub status: TicketStatus,
    /// Persisted archived flag.
    pub archived: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Creates a new open, unarchived ticket.
    ///
    /// # Errors
    ///
    /// Returns [`TicketDomainError::EmptyTitle`] if the title is empty after
    /// trimming.
    pub fn new(
        board_id: BoardId,
        author_id: UserId,
        title: impl Into<String>,
        description: Option<String>,
        category: TicketCategory,
        priority: TicketPriority,
        clock: &impl Clock,
    ) -> Result<Self, TicketDomainError> {
        let normalized_title = validated_title(title.into())?;
        let timestamp = clock.utc();

        Ok(Self {
            id: TicketId::new(),
            board_id,
            author_id,
            title: normalized_title,
            description: normalized_description(description),
            category,
            priority,
            status: TicketStatus::Open,
            archived: false,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a ticket from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTicketData) -> Self {
        Self {
            id: data.id,
            board_id: data.board_id,
            author_id: data.author_id,
            title: data.title,
            description: data.description,
            category: data.category,
            priority: data.priority,
            status: data.status,
            archived: data.archived,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the ticket identifier.
    #[must_use]
    pub const fn id(&self) -> TicketId {
        self.id
    }

    /// Returns the owning board's identifier.
    #[must_use]
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Returns the author's identifier.
    #[must_use]
    pub const fn author_id(&self) -> UserId {
        self.author_id
    }

    /// Returns `true` when the given user authored this ticket.
    #[must_use]
    pub fn is_author(&self, user_id: UserId) -> bool {
        self.author_id == user_id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the category.
    #[must_use]
    pub const fn category(&self) -> TicketCategory {
        self.category
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TicketPriority {
        self.priority
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TicketStatus {
        self.status
    }

    /// Returns the archived flag.
    #[must_use]
    pub const fn archived(&self) -> bool {
        self.archived
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves the ticket through the status machine.
    ///
    /// # Errors
    ///
    /// Returns [`TicketDomainError::InvalidStatusTransition`] when the move
    /// is not forward.
    pub fn transition_to(
        &mut self,
        target: TicketStatus,
        clock: &impl Clock,
    ) -> Result<(), TicketDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(TicketDomainError::InvalidStatusTransition {
                ticket_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.touch(clock);
        Ok(())
    }

    /// Sends the ticket to the reflection stage (the author's resolve call).
    ///
    /// Works from `open`, `in_talks`, or `needs_reflection` (where it is a
    /// no-op by value).
    ///
    /// # Errors
    ///
    /// Returns [`TicketDomainError::AlreadyResolved`] when the ticket is
    /// already resolved.
    pub fn begin_reflection(&mut self, clock: &impl Clock) -> Result<(), TicketDomainError> {
        if self.status == TicketStatus::Resolved {
            return Err(TicketDomainError::AlreadyResolved(self.id));
        }
        self.status = TicketStatus::NeedsReflection;
        self.touch(clock);
        Ok(())
    }

    /// Returns `true` when a comment from `commenter` should promote the
    /// ticket from `open` to `in_talks`: the ticket is open and the
    /// commenter is not its author.
    #[must_use]
    pub fn promotes_on_comment_from(&self, commenter: UserId) -> bool {
        self.status == TicketStatus::Open && commenter != self.author_id
    }

    /// Applies the fields present in `patch`, leaving absent fields alone.
    ///
    /// # Errors
    ///
    /// Returns [`TicketDomainError::EmptyTitle`] when a patched title is
    /// empty after trimming.
    pub fn apply_patch(
        &mut self,
        patch: TicketPatch,
        clock: &impl Clock,
    ) -> Result<(), TicketDomainError> {
        if patch.is_empty() {
            return Ok(());
        }
        if let Some(title) = patch.title {
            self.title = validated_title(title)?;
        }
        if let Some(description) = patch.description {
            self.description = normalized_description(Some(description));
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        self.touch(clock);
        Ok(())
    }

    /// Sets the archived flag. Independent of status; archiving never blocks
    /// a status transition and vice versa.
    pub fn set_archived(&mut self, archived: bool, clock: &impl Clock) {
        self.archived = archived;
        self.touch(clock);
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

fn validated_title(raw: String) -> Result<String, TicketDomainError> {
    let normalized = raw.trim();
    if normalized.is_empty() {
        return Err(TicketDomainError::EmptyTitle);
    }
    Ok(normalized.to_owned())
}

fn normalized_description(description: Option<String>) -> Option<String> {
    description.and_then(|value| {
        let normalized = value.trim();
        (!normalized.is_empty()).then(|| normalized.to_owned())
    })
}
