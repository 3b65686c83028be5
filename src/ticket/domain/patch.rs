//! Explicit optional-field patch for author edits.
//!
//! Each editable field is an `Option`, and only present fields are applied,
//! so "unset" and "falsy" never blur together. The archived flag is not
//! patchable here; it moves through the dedicated archive operation.

use super::{TicketCategory, TicketPriority};

/// Partial update to a ticket's author-editable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketPatch {
    /// Replacement title, if present.
    pub title: Option<String>,
    /// Replacement description, if present.
    pub description: Option<String>,
    /// Replacement category, if present.
    pub category: Option<TicketCategory>,
    /// Replacement priority, if present.
    pub priority: Option<TicketPriority>,
}

impl TicketPatch {
    /// Creates an empty patch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            title: None,
            description: None,
            category: None,
            priority: None,
        }
    }

    /// Sets the replacement title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the replacement description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the replacement category.
    #[must_use]
    pub const fn with_category(mut self, category: TicketCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Sets the replacement priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TicketPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Returns `true` when no field is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.priority.is_none()
    }
}
