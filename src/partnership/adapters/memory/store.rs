//! Thread-safe in-memory implementation of the partnership repository.
//!
//! The whole context lives behind one [`RwLock`], so the composite
//! handshake operations are naturally atomic: a racing second accept
//! observes the first accept's partner links and fails.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::partnership::{
    domain::{
        Board, BoardId, BoardName, EmailAddress, Invite, InviteId, PartnerPair, User, UserId,
    },
    ports::{PartnershipRepository, PartnershipRepositoryError, PartnershipRepositoryResult},
};

/// Thread-safe in-memory partnership repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPartnershipStore {
    state: Arc<RwLock<PartnershipState>>,
}

#[derive(Debug, Default)]
struct PartnershipState {
    users: HashMap<UserId, User>,
    email_index: HashMap<EmailAddress, UserId>,
    invites: HashMap<InviteId, Invite>,
    boards: HashMap<BoardId, Board>,
    pair_index: HashMap<PartnerPair, BoardId>,
}

impl InMemoryPartnershipStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: impl ToString) -> PartnershipRepositoryError {
    PartnershipRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

/// Checks that both pair members exist and carry no partner link yet.
fn ensure_unpartnered(
    state: &PartnershipState,
    pair: PartnerPair,
) -> PartnershipRepositoryResult<()> {
    for member in pair.members() {
        let user = state
            .users
            .get(&member)
            .ok_or(PartnershipRepositoryError::UserNotFound(member))?;
        if user.is_partnered() {
            return Err(PartnershipRepositoryError::AlreadyPartnered(member));
        }
    }
    Ok(())
}

#[async_trait]
impl PartnershipRepository for InMemoryPartnershipStore {
    async fn store_user(&self, user: &User) -> PartnershipRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        if state.users.contains_key(&user.id()) {
            return Err(PartnershipRepositoryError::DuplicateUser(user.id()));
        }
        if state.email_index.contains_key(user.email()) {
            return Err(PartnershipRepositoryError::DuplicateEmail(
                user.email().clone(),
            ));
        }
        state.email_index.insert(user.email().clone(), user.id());
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_user(&self, id: UserId) -> PartnershipRepositoryResult<Option<User>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.users.get(&id).cloned())
    }

    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> PartnershipRepositoryResult<Option<User>> {
        let state = self.state.read().map_err(poisoned)?;
        let user = state
            .email_index
            .get(email)
            .and_then(|user_id| state.users.get(user_id))
            .cloned();
        Ok(user)
    }

    async fn store_invite(&self, invite: &Invite) -> PartnershipRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        if state.invites.contains_key(&invite.id()) {
            return Err(PartnershipRepositoryError::DuplicateInvite(invite.id()));
        }
        let pending_pair_exists = state.invites.values().any(|existing| {
            existing.is_pending()
                && existing.inviter_id() == invite.inviter_id()
                && existing.invitee_id() == invite.invitee_id()
        });
        if pending_pair_exists {
            return Err(PartnershipRepositoryError::DuplicatePendingInvite {
                inviter_id: invite.inviter_id(),
                invitee_id: invite.invitee_id(),
            });
        }
        state.invites.insert(invite.id(), invite.clone());
        Ok(())
    }

    async fn find_invite(&self, id: InviteId) -> PartnershipRepositoryResult<Option<Invite>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.invites.get(&id).cloned())
    }

    async fn pending_invites_for(
        &self,
        invitee_id: UserId,
    ) -> PartnershipRepositoryResult<Vec<Invite>> {
        let state = self.state.read().map_err(poisoned)?;
        let mut invites: Vec<Invite> = state
            .invites
            .values()
            .filter(|invite| invite.is_pending() && invite.invitee_id() == invitee_id)
            .cloned()
            .collect();
        invites.sort_by_key(|invite| std::cmp::Reverse(invite.created_at()));
        Ok(invites)
    }

    async fn count_pending_invites_for(
        &self,
        invitee_id: UserId,
    ) -> PartnershipRepositoryResult<u64> {
        let state = self.state.read().map_err(poisoned)?;
        let count = state
            .invites
            .values()
            .filter(|invite| invite.is_pending() && invite.invitee_id() == invitee_id)
            .count();
        Ok(count.try_into().unwrap_or(u64::MAX))
    }

    async fn delete_invite(&self, id: InviteId) -> PartnershipRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state
            .invites
            .remove(&id)
            .map(|_| ())
            .ok_or(PartnershipRepositoryError::InviteNotFound(id))
    }

    async fn commit_acceptance(
        &self,
        invite_id: InviteId,
        board: &Board,
    ) -> PartnershipRepositoryResult<Board> {
        let mut state = self.state.write().map_err(poisoned)?;

        let mut invite = state
            .invites
            .get(&invite_id)
            .cloned()
            .ok_or(PartnershipRepositoryError::InviteNotFound(invite_id))?;
        if !invite.is_pending() {
            return Err(PartnershipRepositoryError::InviteNotPending(invite_id));
        }

        let pair = board.members();
        debug_assert!(
            pair.contains(invite.inviter_id()) && pair.contains(invite.invitee_id()),
            "board members must be the invite's parties"
        );
        ensure_unpartnered(&state, pair)?;

        invite.mark_accepted();
        state.invites.insert(invite_id, invite.clone());

        // Purge every other pending invite naming either party, so no
        // dangling triangular invite can be accepted later.
        state.invites.retain(|id, existing| {
            *id == invite_id
                || !(existing.is_pending()
                    && (existing.names(invite.inviter_id()) || existing.names(invite.invitee_id())))
        });

        for member in pair.members() {
            let partner = pair.other(member).ok_or_else(|| {
                poisoned(format!("pair {pair} lost member {member} mid-commit"))
            })?;
            if let Some(user) = state.users.get_mut(&member) {
                user.link_partner(partner).map_err(poisoned)?;
            }
        }

        if let Some(existing_id) = state.pair_index.get(&pair)
            && let Some(existing) = state.boards.get(existing_id)
        {
            return Ok(existing.clone());
        }
        state.pair_index.insert(pair, board.id());
        state.boards.insert(board.id(), board.clone());
        Ok(board.clone())
    }

    async fn dissolve(&self, pair: PartnerPair) -> PartnershipRepositoryResult<Option<BoardId>> {
        let mut state = self.state.write().map_err(poisoned)?;

        for member in pair.members() {
            let user = state
                .users
                .get(&member)
                .ok_or(PartnershipRepositoryError::UserNotFound(member))?;
            let expected_partner = pair.other(member);
            if user.partner_id() != expected_partner {
                return Err(PartnershipRepositoryError::NotMutuallyLinked(pair));
            }
        }

        for member in pair.members() {
            if let Some(user) = state.users.get_mut(&member) {
                user.unlink_partner();
            }
        }

        let board_id = state.pair_index.remove(&pair);
        if let Some(id) = board_id {
            state.boards.remove(&id);
        }
        Ok(board_id)
    }

    async fn find_board(&self, id: BoardId) -> PartnershipRepositoryResult<Option<Board>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.boards.get(&id).cloned())
    }

    async fn find_board_for_member(
        &self,
        user_id: UserId,
    ) -> PartnershipRepositoryResult<Option<Board>> {
        let state = self.state.read().map_err(poisoned)?;
        let board = state
            .boards
            .values()
            .find(|board| board.has_member(user_id))
            .cloned();
        Ok(board)
    }

    async fn rename_board(
        &self,
        id: BoardId,
        name: &BoardName,
    ) -> PartnershipRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        let board = state
            .boards
            .get_mut(&id)
            .ok_or(PartnershipRepositoryError::BoardNotFound(id))?;
        board.rename(name.clone());
        Ok(())
    }
}
