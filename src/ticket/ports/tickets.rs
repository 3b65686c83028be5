//! Repository port for ticket persistence and conditional status updates.

use super::TicketRepositoryResult;
use crate::partnership::domain::BoardId;
use crate::ticket::domain::{
    PageNumber, Ticket, TicketCategory, TicketId, TicketPriority, TicketStatus,
};
use async_trait::async_trait;

/// Fixed page size for ticket listings.
pub const TICKET_PAGE_SIZE: u32 = 10;

/// Filter for board-scoped ticket listings.
///
/// Absent fields match everything; `archived` always applies and defaults to
/// the live (unarchived) view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TicketFilter {
    /// Restrict to a single lifecycle status.
    pub status: Option<TicketStatus>,
    /// Restrict to a single priority.
    pub priority: Option<TicketPriority>,
    /// Restrict to a single category.
    pub category: Option<TicketCategory>,
    /// Whether to list archived tickets instead of live ones.
    pub archived: bool,
}

impl TicketFilter {
    /// Returns `true` when the ticket matches every present criterion.
    #[must_use]
    pub fn matches(&self, ticket: &Ticket) -> bool {
        ticket.archived() == self.archived
            && self.status.is_none_or(|status| ticket.status() == status)
            && self
                .priority
                .is_none_or(|priority| ticket.priority() == priority)
            && self
                .category
                .is_none_or(|category| ticket.category() == category)
    }
}

/// One page of a reverse-chronological ticket listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketPage {
    /// Tickets on this page, newest first.
    pub items: Vec<Ticket>,
    /// Whether a later page exists.
    pub has_next_page: bool,
    /// Matching tickets on later pages.
    pub remaining: u64,
}

/// Ticket persistence contract.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Stores a new ticket.
    ///
    /// # Errors
    ///
    /// Returns [`super::TicketRepositoryError::DuplicateRecord`] when the
    /// ticket ID already exists.
    async fn store_ticket(&self, ticket: &Ticket) -> TicketRepositoryResult<()>;

    /// Finds a ticket by identifier.
    ///
    /// Returns `None` when the ticket does not exist.
    async fn find_ticket(&self, id: TicketId) -> TicketRepositoryResult<Option<Ticket>>;

    /// Persists changes to an existing ticket (field edits, archived flag).
    ///
    /// # Errors
    ///
    /// Returns [`super::TicketRepositoryError::TicketNotFound`] when the
    /// ticket does not exist.
    async fn update_ticket(&self, ticket: &Ticket) -> TicketRepositoryResult<()>;

    /// Compare-and-set status transition.
    ///
    /// Moves the ticket from `from` to `to` only when its current status is
    /// exactly `from`; returns `false` (without error) otherwise, which makes
    /// racing transitions idempotent at the storage edge.
    async fn transition_status(
        &self,
        id: TicketId,
        from: TicketStatus,
        to: TicketStatus,
    ) -> TicketRepositoryResult<bool>;

    /// Conditionally sends a ticket to `needs_reflection`.
    ///
    /// Applies from any status except `resolved`; returns `false` when the
    /// ticket was already resolved or missing.
    async fn mark_needs_reflection(&self, id: TicketId) -> TicketRepositoryResult<bool>;

    /// Deletes a ticket, cascading to its comments and reflections in the
    /// same operation. Idempotent: deleting an absent ticket is a no-op.
    async fn delete_ticket(&self, id: TicketId) -> TicketRepositoryResult<()>;

    /// Deletes every ticket on a board, cascading to comments and
    /// reflections. Idempotent; used by the partnership break-up path.
    async fn delete_board_tickets(&self, board_id: BoardId) -> TicketRepositoryResult<()>;

    /// Lists a board's tickets matching `filter`, newest first, in pages of
    /// [`TICKET_PAGE_SIZE`].
    async fn list_tickets(
        &self,
        board_id: BoardId,
        filter: &TicketFilter,
        page: PageNumber,
    ) -> TicketRepositoryResult<TicketPage>;
}
