//! Ticket lifecycle orchestration: CRUD, the status machine, the comment
//! log, and the reflection gate.
//!
//! Every operation authorizes against board membership before anything
//! else; a caller outside the board is turned away with a membership error
//! before author checks run, and membership failures never degrade into
//! not-found answers for boards that do exist.

use crate::error::{Classify, ErrorKind};
use crate::partnership::{
    domain::{Board, BoardId, UserId},
    ports::{PartnershipRepository, PartnershipRepositoryError},
};
use crate::ticket::{
    domain::{
        Comment, PageNumber, Reflection, Ticket, TicketCategory, TicketDomainError, TicketId,
        TicketPatch, TicketPriority, TicketStatus,
    },
    ports::{
        CommentPage, CommentRepository, ReflectionRepository, TicketFilter, TicketPage,
        TicketRepository, TicketRepositoryError,
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for filing a new ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTicketRequest {
    title: String,
    description: Option<String>,
    category: TicketCategory,
    priority: TicketPriority,
}

impl CreateTicketRequest {
    /// Creates a request with required fields.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        category: TicketCategory,
        priority: TicketPriority,
    ) -> Self {
        Self {
            title: title.into(),
            description: None,
            category,
            priority,
        }
    }

    /// Sets the optional description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A ticket together with whether the caller authored it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketView {
    /// The ticket.
    pub ticket: Ticket,
    /// Whether the requesting caller is the ticket's author.
    pub is_author: bool,
}

/// Result of submitting a reflection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionOutcome {
    /// The stored reflection.
    pub reflection: Reflection,
    /// `true` when this reflection was the second distinct author's and the
    /// ticket resolved; `false` while the partner's reflection is still
    /// pending.
    pub resolved: bool,
}

/// Service-level errors for ticket lifecycle operations.
#[derive(Debug, Error)]
pub enum TicketLifecycleError {
    /// The board does not exist.
    #[error("board not found: {0}")]
    BoardNotFound(BoardId),

    /// The caller is not one of the board's two members.
    #[error("user {0} is not a member of this board")]
    NotBoardMember(UserId),

    /// The ticket does not exist.
    #[error("ticket not found: {0}")]
    TicketNotFound(TicketId),

    /// The caller is a board member but not the ticket's author.
    #[error("user {0} is not this ticket's author")]
    NotTicketAuthor(UserId),

    /// The ticket is already resolved.
    #[error("ticket {0} is already resolved")]
    AlreadyResolved(TicketId),

    /// The ticket is not in the reflection stage.
    #[error("ticket {ticket_id} is in status {status}, not awaiting reflections")]
    NotAwaitingReflection {
        /// The ticket the reflection targeted.
        ticket_id: TicketId,
        /// The ticket's actual status.
        status: TicketStatus,
    },

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TicketDomainError),

    /// Ticket-context repository operation failed.
    #[error(transparent)]
    Repository(#[from] TicketRepositoryError),

    /// Board lookup in the partnership context failed.
    #[error(transparent)]
    Partnership(#[from] PartnershipRepositoryError),
}

impl Classify for TicketLifecycleError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::BoardNotFound(_) | Self::TicketNotFound(_) => ErrorKind::NotFound,
            Self::NotBoardMember(_) | Self::NotTicketAuthor(_) => ErrorKind::Forbidden,
            Self::AlreadyResolved(_) | Self::NotAwaitingReflection { .. } => ErrorKind::Conflict,
            Self::Domain(_) => ErrorKind::Validation,
            Self::Repository(err) => match err {
                TicketRepositoryError::TicketNotFound(_) => ErrorKind::NotFound,
                TicketRepositoryError::DuplicateReflection { .. }
                | TicketRepositoryError::DuplicateRecord(_) => ErrorKind::Conflict,
                TicketRepositoryError::Persistence(_) => ErrorKind::Internal,
            },
            Self::Partnership(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for ticket lifecycle operations.
pub type TicketLifecycleResult<T> = Result<T, TicketLifecycleError>;

/// Ticket lifecycle orchestration service.
#[derive(Clone)]
pub struct TicketLifecycleService<B, S, K>
where
    B: PartnershipRepository,
    S: TicketRepository + CommentRepository + ReflectionRepository,
    K: Clock + Send + Sync,
{
    boards: Arc<B>,
    store: Arc<S>,
    clock: Arc<K>,
}

impl<B, S, K> TicketLifecycleService<B, S, K>
where
    B: PartnershipRepository,
    S: TicketRepository + CommentRepository + ReflectionRepository,
    K: Clock + Send + Sync,
{
    /// Creates a new ticket lifecycle service.
    #[must_use]
    pub const fn new(boards: Arc<B>, store: Arc<S>, clock: Arc<K>) -> Self {
        Self {
            boards,
            store,
            clock,
        }
    }

    /// Files a new ticket on a board the caller belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`TicketLifecycleError`] when the board is missing, the
    /// caller is not a member, or the title fails validation.
    pub async fn create_ticket(
        &self,
        caller_id: UserId,
        board_id: BoardId,
        request: CreateTicketRequest,
    ) -> TicketLifecycleResult<Ticket> {
        self.authorize_board(caller_id, board_id).await?;

        let ticket = Ticket::new(
            board_id,
            caller_id,
            request.title,
            request.description,
            request.category,
            request.priority,
            &*self.clock,
        )?;
        self.store.store_ticket(&ticket).await?;
        tracing::debug!(ticket_id = %ticket.id(), board_id = %board_id, "ticket created");
        Ok(ticket)
    }

    /// Fetches a ticket for a board member, flagging whether the caller is
    /// its author.
    ///
    /// # Errors
    ///
    /// Returns [`TicketLifecycleError::TicketNotFound`] for a missing
    /// ticket or [`TicketLifecycleError::NotBoardMember`] for an outsider.
    pub async fn get_ticket(
        &self,
        caller_id: UserId,
        ticket_id: TicketId,
    ) -> TicketLifecycleResult<TicketView> {
        let ticket = self.authorize_ticket(caller_id, ticket_id).await?;
        let is_author = ticket.is_author(caller_id);
        Ok(TicketView { ticket, is_author })
    }

    /// Lists a board's tickets matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TicketLifecycleError`] when the board is missing or the
    /// caller is not a member.
    pub async fn list_tickets(
        &self,
        caller_id: UserId,
        board_id: BoardId,
        filter: TicketFilter,
        page: PageNumber,
    ) -> TicketLifecycleResult<TicketPage> {
        self.authorize_board(caller_id, board_id).await?;
        Ok(self.store.list_tickets(board_id, &filter, page).await?)
    }

    /// Applies an author's partial edit to a ticket's fields.
    ///
    /// # Errors
    ///
    /// Returns [`TicketLifecycleError::NotTicketAuthor`] when a non-author
    /// member tries to edit, plus the usual membership and validation
    /// errors.
    pub async fn edit_ticket(
        &self,
        caller_id: UserId,
        ticket_id: TicketId,
        patch: TicketPatch,
    ) -> TicketLifecycleResult<Ticket> {
        let mut ticket = self.authorize_author(caller_id, ticket_id).await?;
        ticket.apply_patch(patch, &*self.clock)?;
        self.store.update_ticket(&ticket).await?;
        Ok(ticket)
    }

    /// Deletes a ticket and, in the same operation, its comments and
    /// reflections. Author-only.
    ///
    /// # Errors
    ///
    /// Returns [`TicketLifecycleError`] on membership, authorship, or
    /// repository failure.
    pub async fn delete_ticket(
        &self,
        caller_id: UserId,
        ticket_id: TicketId,
    ) -> TicketLifecycleResult<()> {
        self.authorize_author(caller_id, ticket_id).await?;
        self.store.delete_ticket(ticket_id).await?;
        tracing::debug!(ticket_id = %ticket_id, "ticket deleted");
        Ok(())
    }

    /// Sends a ticket to the reflection stage. Author-only.
    ///
    /// Works from `open` or `in_talks` alike; no comment is required first.
    ///
    /// # Errors
    ///
    /// Returns [`TicketLifecycleError::AlreadyResolved`] when the ticket is
    /// already resolved, including when a racing call resolved it between
    /// the read and the conditional update.
    pub async fn resolve(
        &self,
        caller_id: UserId,
        ticket_id: TicketId,
    ) -> TicketLifecycleResult<Ticket> {
        let mut ticket = self.authorize_author(caller_id, ticket_id).await?;
        ticket
            .begin_reflection(&*self.clock)
            .map_err(|err| match err {
                TicketDomainError::AlreadyResolved(id) => TicketLifecycleError::AlreadyResolved(id),
                other => TicketLifecycleError::Domain(other),
            })?;

        // The domain move validated the transition; the conditional update
        // is what makes it stick against a racing resolve.
        let moved = self.store.mark_needs_reflection(ticket_id).await?;
        if !moved {
            return Err(TicketLifecycleError::AlreadyResolved(ticket_id));
        }
        let updated = self
            .store
            .find_ticket(ticket_id)
            .await?
            .ok_or(TicketLifecycleError::TicketNotFound(ticket_id))?;
        tracing::debug!(ticket_id = %ticket_id, "ticket sent to reflection stage");
        Ok(updated)
    }

    /// Sets or clears the archived flag. Author-only, independent of
    /// status.
    ///
    /// # Errors
    ///
    /// Returns [`TicketLifecycleError`] on membership, authorship, or
    /// repository failure.
    pub async fn set_archived(
        &self,
        caller_id: UserId,
        ticket_id: TicketId,
        archived: bool,
    ) -> TicketLifecycleResult<Ticket> {
        let mut ticket = self.authorize_author(caller_id, ticket_id).await?;
        ticket.set_archived(archived, &*self.clock);
        self.store.update_ticket(&ticket).await?;
        Ok(ticket)
    }

    /// Appends a comment to a ticket's log.
    ///
    /// The first comment from a member other than the author while the
    /// ticket is `open` promotes it to `in_talks`; every later comment, and
    /// every comment by the author, leaves status untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TicketLifecycleError`] on membership failure or an empty
    /// body.
    pub async fn post_comment(
        &self,
        caller_id: UserId,
        ticket_id: TicketId,
        body: &str,
    ) -> TicketLifecycleResult<Comment> {
        let ticket = self.authorize_ticket(caller_id, ticket_id).await?;

        let comment = Comment::new(ticket_id, caller_id, body, &*self.clock)?;
        self.store.append_comment(&comment).await?;

        if ticket.promotes_on_comment_from(caller_id) {
            // Compare-and-set: a concurrent promotion simply makes this a
            // no-op.
            self.store
                .transition_status(ticket_id, TicketStatus::Open, TicketStatus::InTalks)
                .await?;
        }
        Ok(comment)
    }

    /// Lists a ticket's comments, newest first, in fixed-size pages.
    ///
    /// # Errors
    ///
    /// Returns [`TicketLifecycleError`] on membership or repository
    /// failure.
    pub async fn list_comments(
        &self,
        caller_id: UserId,
        ticket_id: TicketId,
        page: PageNumber,
    ) -> TicketLifecycleResult<CommentPage> {
        self.authorize_ticket(caller_id, ticket_id).await?;
        Ok(self.store.list_comments(ticket_id, page).await?)
    }

    /// Submits the caller's reflection on a ticket awaiting close-out.
    ///
    /// The gate does not care which partner reflects first: the insert is
    /// guarded by (ticket, author) uniqueness, and when the distinct-author
    /// count reaches two the ticket flips to `resolved` as part of the same
    /// logical operation. The flip is a conditional update, so two racing
    /// partners resolve the ticket exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`TicketLifecycleError::NotAwaitingReflection`] off stage,
    /// or a repository conflict when this author already reflected.
    pub async fn submit_reflection(
        &self,
        caller_id: UserId,
        ticket_id: TicketId,
        body: &str,
    ) -> TicketLifecycleResult<ReflectionOutcome> {
        let ticket = self.authorize_ticket(caller_id, ticket_id).await?;
        if ticket.status() != TicketStatus::NeedsReflection {
            return Err(TicketLifecycleError::NotAwaitingReflection {
                ticket_id,
                status: ticket.status(),
            });
        }

        let reflection = Reflection::new(ticket_id, caller_id, body, &*self.clock)?;
        let distinct_authors = self.store.record_reflection(&reflection).await?;

        let resolved = distinct_authors >= 2;
        if resolved {
            self.store
                .transition_status(
                    ticket_id,
                    TicketStatus::NeedsReflection,
                    TicketStatus::Resolved,
                )
                .await?;
            tracing::info!(ticket_id = %ticket_id, "both partners reflected, ticket resolved");
        }
        Ok(ReflectionOutcome {
            reflection,
            resolved,
        })
    }

    /// Loads a board and checks the caller's membership.
    async fn authorize_board(
        &self,
        caller_id: UserId,
        board_id: BoardId,
    ) -> TicketLifecycleResult<Board> {
        let board = self
            .boards
            .find_board(board_id)
            .await?
            .ok_or(TicketLifecycleError::BoardNotFound(board_id))?;
        if !board.has_member(caller_id) {
            return Err(TicketLifecycleError::NotBoardMember(caller_id));
        }
        Ok(board)
    }

    /// Loads a ticket and checks the caller's membership of its board.
    ///
    /// A ticket whose board is already gone counts as not found; that
    /// window exists only mid-break-up.
    async fn authorize_ticket(
        &self,
        caller_id: UserId,
        ticket_id: TicketId,
    ) -> TicketLifecycleResult<Ticket> {
        let ticket = self
            .store
            .find_ticket(ticket_id)
            .await?
            .ok_or(TicketLifecycleError::TicketNotFound(ticket_id))?;
        let board = self
            .boards
            .find_board(ticket.board_id())
            .await?
            .ok_or(TicketLifecycleError::TicketNotFound(ticket_id))?;
        if !board.has_member(caller_id) {
            return Err(TicketLifecycleError::NotBoardMember(caller_id));
        }
        Ok(ticket)
    }

    /// Loads a ticket and checks membership, then authorship.
    async fn authorize_author(
        &self,
        caller_id: UserId,
        ticket_id: TicketId,
    ) -> TicketLifecycleResult<Ticket> {
        let ticket = self.authorize_ticket(caller_id, ticket_id).await?;
        if !ticket.is_author(caller_id) {
            return Err(TicketLifecycleError::NotTicketAuthor(caller_id));
        }
        Ok(ticket)
    }
}
