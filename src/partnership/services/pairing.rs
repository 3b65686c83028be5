//! Invite engine: pairing requests, the accept/reject handshake, and
//! break-ups.
//!
//! This service is the sole writer of partner links. The accept path defers
//! its final precondition checks to the repository's atomic commit so that
//! two racing accepts naming the same inviter cannot both succeed.

use crate::error::{Classify, ErrorKind};
use crate::partnership::{
    domain::{
        Board, EmailAddress, Invite, InviteId, PartnerPair, PartnershipDomainError, UserId,
    },
    ports::{PartnershipRepository, PartnershipRepositoryError},
};
use crate::ticket::ports::{TicketRepository, TicketRepositoryError};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for pairing operations.
#[derive(Debug, Error)]
pub enum PairingError {
    /// The calling account does not exist.
    #[error("calling account {0} not found")]
    CallerNotFound(UserId),

    /// The caller tried to invite themselves.
    #[error("cannot invite yourself")]
    SelfInvite,

    /// No account uses the invited address.
    #[error("no account found for {0}")]
    InviteeNotFound(EmailAddress),

    /// The caller already has a partner.
    #[error("you already have a partner")]
    AlreadyPartnered(UserId),

    /// The invited account already has a partner.
    #[error("invitee already has a partner")]
    InviteePartnered(UserId),

    /// The invite does not exist (possibly already purged).
    #[error("invite not found: {0}")]
    InviteNotFound(InviteId),

    /// Someone other than the invitee tried to respond.
    #[error("user {0} is not this invite's recipient")]
    NotInvitee(UserId),

    /// The named partner account does not exist.
    #[error("partner account {0} does not exist")]
    PartnerNotFound(UserId),

    /// The two accounts are not mutually linked partners.
    #[error("user {partner_id} is not {caller_id}'s partner")]
    PartnerMismatch {
        /// The caller requesting the break-up.
        caller_id: UserId,
        /// The account the caller named.
        partner_id: UserId,
    },

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] PartnershipDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] PartnershipRepositoryError),

    /// The ticket cascade after a break-up failed.
    #[error(transparent)]
    Cascade(#[from] TicketRepositoryError),
}

impl Classify for PairingError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::CallerNotFound(_) => ErrorKind::Unauthorized,
            Self::SelfInvite | Self::Domain(_) => ErrorKind::Validation,
            Self::InviteeNotFound(_) | Self::PartnerNotFound(_) => ErrorKind::NotFound,
            Self::AlreadyPartnered(_)
            | Self::InviteePartnered(_)
            | Self::PartnerMismatch { .. } => ErrorKind::Conflict,
            Self::NotInvitee(_) => ErrorKind::Forbidden,
            Self::InviteNotFound(_) => ErrorKind::NotFound,
            Self::Repository(err) => match err {
                PartnershipRepositoryError::UserNotFound(_)
                | PartnershipRepositoryError::InviteNotFound(_)
                | PartnershipRepositoryError::BoardNotFound(_) => ErrorKind::NotFound,
                PartnershipRepositoryError::Persistence(_) => ErrorKind::Internal,
                _ => ErrorKind::Conflict,
            },
            Self::Cascade(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for pairing operations.
pub type PairingResult<T> = Result<T, PairingError>;

/// Invite engine orchestration service.
#[derive(Clone)]
pub struct PairingService<R, T, K>
where
    R: PartnershipRepository,
    T: TicketRepository,
    K: Clock + Send + Sync,
{
    repository: Arc<R>,
    tickets: Arc<T>,
    clock: Arc<K>,
}

impl<R, T, K> PairingService<R, T, K>
where
    R: PartnershipRepository,
    T: TicketRepository,
    K: Clock + Send + Sync,
{
    /// Creates a new pairing service.
    #[must_use]
    pub const fn new(repository: Arc<R>, tickets: Arc<T>, clock: Arc<K>) -> Self {
        Self {
            repository,
            tickets,
            clock,
        }
    }

    /// Creates a pending invite from the caller to the account behind
    /// `invitee_email`.
    ///
    /// # Errors
    ///
    /// Returns [`PairingError`] when either party is already partnered, the
    /// invitee is unknown, the caller addresses themselves, or a pending
    /// invite for this pair already exists.
    pub async fn create_invite(
        &self,
        caller_id: UserId,
        invitee_email: &str,
    ) -> PairingResult<Invite> {
        let inviter = self
            .repository
            .find_user(caller_id)
            .await?
            .ok_or(PairingError::CallerNotFound(caller_id))?;
        if inviter.is_partnered() {
            return Err(PairingError::AlreadyPartnered(caller_id));
        }

        let email = EmailAddress::new(invitee_email)?;
        if inviter.email() == &email {
            return Err(PairingError::SelfInvite);
        }

        let invitee = self
            .repository
            .find_user_by_email(&email)
            .await?
            .ok_or(PairingError::InviteeNotFound(email))?;
        if invitee.is_partnered() {
            return Err(PairingError::InviteePartnered(invitee.id()));
        }

        let invite = Invite::new(inviter.id(), invitee.id(), &*self.clock)?;
        self.repository.store_invite(&invite).await?;
        tracing::info!(invite_id = %invite.id(), inviter_id = %inviter.id(), "pairing invite created");
        Ok(invite)
    }

    /// Returns pending invites addressed to the caller, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`PairingError::CallerNotFound`] for an unknown caller or a
    /// repository error on lookup failure.
    pub async fn pending_invites(&self, caller_id: UserId) -> PairingResult<Vec<Invite>> {
        self.repository
            .find_user(caller_id)
            .await?
            .ok_or(PairingError::CallerNotFound(caller_id))?;
        Ok(self.repository.pending_invites_for(caller_id).await?)
    }

    /// Responds to a pending invite.
    ///
    /// Rejection deletes the invite outright and returns `None`. Acceptance
    /// commits the partnership atomically (partner links, purge of other
    /// pending invites touching either party, board creation) and returns
    /// the pair's board. The inviter's partner state is re-checked inside
    /// the commit even though the invite was pending a moment ago; that late
    /// re-check is what loses the double-accept race cleanly.
    ///
    /// # Errors
    ///
    /// Returns [`PairingError`] when the invite is missing or stale, the
    /// caller is not the invitee, or a commit precondition no longer holds.
    pub async fn respond(
        &self,
        caller_id: UserId,
        invite_id: InviteId,
        accept: bool,
    ) -> PairingResult<Option<Board>> {
        let invite = self
            .repository
            .find_invite(invite_id)
            .await?
            .ok_or(PairingError::InviteNotFound(invite_id))?;
        if invite.invitee_id() != caller_id {
            return Err(PairingError::NotInvitee(caller_id));
        }
        if !invite.is_pending() {
            return Err(PairingError::Repository(
                PartnershipRepositoryError::InviteNotPending(invite_id),
            ));
        }

        if !accept {
            self.repository.delete_invite(invite_id).await?;
            tracing::info!(invite_id = %invite_id, "pairing invite rejected");
            return Ok(None);
        }

        let pair = PartnerPair::new(invite.inviter_id(), invite.invitee_id())?;
        let board = Board::new(pair, &*self.clock);
        let committed = self.repository.commit_acceptance(invite_id, &board).await?;
        tracing::info!(
            invite_id = %invite_id,
            board_id = %committed.id(),
            "pairing invite accepted, partnership committed"
        );
        Ok(Some(committed))
    }

    /// Breaks the caller's partnership with `partner_id`.
    ///
    /// Clears both partner links, deletes the shared board, and cascades
    /// deletion of the board's tickets together with their comments and
    /// reflections.
    ///
    /// # Errors
    ///
    /// Returns [`PairingError`] when either account is missing or the two
    /// are not mutually linked.
    pub async fn break_partnership(
        &self,
        caller_id: UserId,
        partner_id: UserId,
    ) -> PairingResult<()> {
        let caller = self
            .repository
            .find_user(caller_id)
            .await?
            .ok_or(PairingError::CallerNotFound(caller_id))?;
        let partner = self
            .repository
            .find_user(partner_id)
            .await?
            .ok_or(PairingError::PartnerNotFound(partner_id))?;
        if !caller.is_partner_of(&partner) {
            return Err(PairingError::PartnerMismatch {
                caller_id,
                partner_id,
            });
        }

        let pair = PartnerPair::new(caller_id, partner_id)?;
        let deleted_board = self.repository.dissolve(pair).await?;
        if let Some(board_id) = deleted_board {
            // Deletes are idempotent, so a ticket write racing the break-up
            // either lands before this cascade or fails against a missing
            // board.
            self.tickets.delete_board_tickets(board_id).await?;
        }
        tracing::info!(caller_id = %caller_id, partner_id = %partner_id, "partnership dissolved");
        Ok(())
    }
}
