//! Repository port for users, invites, and boards.
//!
//! The handshake-critical operations ([`PartnershipRepository::commit_acceptance`]
//! and [`PartnershipRepository::dissolve`]) are composite by design: the
//! partner-link assignment and the invite-status transition must land as a
//! single atomic operation so that two racing accepts cannot both succeed.

use crate::partnership::domain::{
    Board, BoardId, BoardName, EmailAddress, Invite, InviteId, PartnerPair, User, UserId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for partnership repository operations.
pub type PartnershipRepositoryResult<T> = Result<T, PartnershipRepositoryError>;

/// Persistence contract for the partnership context.
#[async_trait]
pub trait PartnershipRepository: Send + Sync {
    /// Stores a new user account.
    ///
    /// # Errors
    ///
    /// Returns [`PartnershipRepositoryError::DuplicateUser`] when the ID
    /// already exists or [`PartnershipRepositoryError::DuplicateEmail`] when
    /// the address is taken.
    async fn store_user(&self, user: &User) -> PartnershipRepositoryResult<()>;

    /// Finds a user by identifier.
    ///
    /// Returns `None` when the user does not exist.
    async fn find_user(&self, id: UserId) -> PartnershipRepositoryResult<Option<User>>;

    /// Finds a user by normalized email address.
    ///
    /// Returns `None` when no account uses the address.
    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> PartnershipRepositoryResult<Option<User>>;

    /// Stores a new pending invite.
    ///
    /// # Errors
    ///
    /// Returns [`PartnershipRepositoryError::DuplicatePendingInvite`] when a
    /// pending invite for the same ordered (inviter, invitee) pair already
    /// exists.
    async fn store_invite(&self, invite: &Invite) -> PartnershipRepositoryResult<()>;

    /// Finds an invite by identifier.
    ///
    /// Returns `None` when the invite does not exist (including invites
    /// already purged by rejection or acceptance).
    async fn find_invite(&self, id: InviteId) -> PartnershipRepositoryResult<Option<Invite>>;

    /// Returns pending invites addressed to the given invitee, newest first.
    async fn pending_invites_for(
        &self,
        invitee_id: UserId,
    ) -> PartnershipRepositoryResult<Vec<Invite>>;

    /// Counts pending invites addressed to the given invitee.
    async fn count_pending_invites_for(
        &self,
        invitee_id: UserId,
    ) -> PartnershipRepositoryResult<u64>;

    /// Deletes an invite outright (the reject path). No trace is kept.
    ///
    /// # Errors
    ///
    /// Returns [`PartnershipRepositoryError::InviteNotFound`] when the
    /// invite does not exist.
    async fn delete_invite(&self, id: InviteId) -> PartnershipRepositoryResult<()>;

    /// Atomically commits an invite acceptance.
    ///
    /// In one operation: re-checks the invite is still pending and both pair
    /// members are still unpartnered, marks the invite accepted, purges every
    /// *other* pending invite naming either member, links the partners
    /// symmetrically, and inserts `board` unless one already exists for the
    /// pair (in which case the existing board is returned). The conditional
    /// partner-state check is what closes the double-accept race window.
    ///
    /// # Errors
    ///
    /// Returns [`PartnershipRepositoryError::InviteNotFound`],
    /// [`PartnershipRepositoryError::InviteNotPending`],
    /// [`PartnershipRepositoryError::UserNotFound`], or
    /// [`PartnershipRepositoryError::AlreadyPartnered`] when a precondition
    /// no longer holds.
    async fn commit_acceptance(
        &self,
        invite_id: InviteId,
        board: &Board,
    ) -> PartnershipRepositoryResult<Board>;

    /// Atomically dissolves a partnership.
    ///
    /// Clears both partner links and deletes the pair's board. Returns the
    /// deleted board's identifier so the caller can cascade ticket deletion,
    /// or `None` when no board existed.
    ///
    /// # Errors
    ///
    /// Returns [`PartnershipRepositoryError::UserNotFound`] when either
    /// account is missing or
    /// [`PartnershipRepositoryError::NotMutuallyLinked`] when the two are
    /// not each other's partner.
    async fn dissolve(&self, pair: PartnerPair) -> PartnershipRepositoryResult<Option<BoardId>>;

    /// Finds a board by identifier.
    ///
    /// Returns `None` when the board does not exist.
    async fn find_board(&self, id: BoardId) -> PartnershipRepositoryResult<Option<Board>>;

    /// Finds the board one of whose members is the given user.
    ///
    /// Returns `None` when the user has no board.
    async fn find_board_for_member(
        &self,
        user_id: UserId,
    ) -> PartnershipRepositoryResult<Option<Board>>;

    /// Renames a board.
    ///
    /// # Errors
    ///
    /// Returns [`PartnershipRepositoryError::BoardNotFound`] when the board
    /// does not exist.
    async fn rename_board(
        &self,
        id: BoardId,
        name: &BoardName,
    ) -> PartnershipRepositoryResult<()>;
}

/// Errors returned by partnership repository implementations.
#[derive(Debug, Clone, Error)]
pub enum PartnershipRepositoryError {
    /// A user with the same identifier already exists.
    #[error("duplicate user identifier: {0}")]
    DuplicateUser(UserId),

    /// A user with the same email address already exists.
    #[error("duplicate email address: {0}")]
    DuplicateEmail(EmailAddress),

    /// The user was not found.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// An invite with the same identifier already exists.
    #[error("duplicate invite identifier: {0}")]
    DuplicateInvite(InviteId),

    /// A pending invite for the same ordered pair already exists.
    #[error("pending invite already exists from {inviter_id} to {invitee_id}")]
    DuplicatePendingInvite {
        /// The inviter on the existing pending invite.
        inviter_id: UserId,
        /// The invitee on the existing pending invite.
        invitee_id: UserId,
    },

    /// The invite was not found.
    #[error("invite not found: {0}")]
    InviteNotFound(InviteId),

    /// The invite is no longer pending.
    #[error("invite is not pending: {0}")]
    InviteNotPending(InviteId),

    /// A pair member already has a partner.
    #[error("user {0} already has a partner")]
    AlreadyPartnered(UserId),

    /// The two users are not mutually linked as partners.
    #[error("users {0} are not mutually linked partners")]
    NotMutuallyLinked(PartnerPair),

    /// A board with the same identifier already exists.
    #[error("duplicate board identifier: {0}")]
    DuplicateBoard(BoardId),

    /// The board was not found.
    #[error("board not found: {0}")]
    BoardNotFound(BoardId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl PartnershipRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
