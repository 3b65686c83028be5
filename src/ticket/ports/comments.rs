//! Repository port for the append-only comment log.

use super::TicketRepositoryResult;
use crate::ticket::domain::{Comment, PageNumber, TicketId};
use async_trait::async_trait;

/// Fixed page size for comment listings.
pub const COMMENT_PAGE_SIZE: u32 = 5;

/// One page of a reverse-chronological comment listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentPage {
    /// Comments on this page, newest first.
    pub items: Vec<Comment>,
    /// Whether a later page exists.
    pub has_next_page: bool,
    /// Comments on later pages.
    pub remaining: u64,
}

/// Comment log persistence contract.
///
/// Append-only: no update or single-delete operations exist. Comments leave
/// storage only through the owning ticket's cascade.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Appends a comment to a ticket's log.
    ///
    /// # Errors
    ///
    /// Returns [`super::TicketRepositoryError::DuplicateRecord`] when the
    /// comment ID already exists.
    async fn append_comment(&self, comment: &Comment) -> TicketRepositoryResult<()>;

    /// Lists a ticket's comments, newest first, in pages of
    /// [`COMMENT_PAGE_SIZE`].
    async fn list_comments(
        &self,
        ticket_id: TicketId,
        page: PageNumber,
    ) -> TicketRepositoryResult<CommentPage>;
}
