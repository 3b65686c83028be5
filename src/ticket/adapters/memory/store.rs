//! Thread-safe in-memory implementation of the ticket-context repositories.
//!
//! One struct implements the ticket, comment, and reflection ports over a
//! single [`RwLock`], which keeps the delete cascades and the
//! reflection-count read atomic with the writes they follow.

use async_trait::async_trait;
use mockable::Clock;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::partnership::domain::BoardId;
use crate::ticket::{
    domain::{Comment, CommentId, PageNumber, Reflection, Ticket, TicketId, TicketStatus},
    ports::{
        COMMENT_PAGE_SIZE, CommentPage, CommentRepository, ReflectionRepository, TICKET_PAGE_SIZE,
        TicketFilter, TicketPage, TicketRepository, TicketRepositoryError, TicketRepositoryResult,
    },
};

/// Thread-safe in-memory ticket, comment, and reflection store.
#[derive(Debug, Clone)]
pub struct InMemoryTicketStore<C: Clock + Send + Sync> {
    state: Arc<RwLock<TicketState>>,
    clock: C,
}

#[derive(Debug, Default)]
struct TicketState {
    tickets: HashMap<TicketId, Ticket>,
    comments: HashMap<TicketId, Vec<Comment>>,
    comment_ids: HashSet<CommentId>,
    reflections: HashMap<TicketId, Vec<Reflection>>,
}

impl<C: Clock + Send + Sync> InMemoryTicketStore<C> {
    /// Creates an empty store with the given clock.
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self {
            state: Arc::new(RwLock::new(TicketState::default())),
            clock,
        }
    }
}

fn poisoned(err: impl ToString) -> TicketRepositoryError {
    TicketRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

/// Cuts one reverse-chronological page out of an already-sorted listing.
fn paginate<T: Clone>(sorted: &[T], page: PageNumber, page_size: u32) -> (Vec<T>, bool, u64) {
    let total = sorted.len() as u64;
    let offset = page.offset(page_size);
    let items: Vec<T> = sorted
        .iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(page_size as usize)
        .cloned()
        .collect();
    let consumed = offset.saturating_add(items.len() as u64);
    let remaining = total.saturating_sub(consumed);
    (items, remaining > 0, remaining)
}

fn distinct_reflection_authors(state: &TicketState, ticket_id: TicketId) -> u64 {
    state
        .reflections
        .get(&ticket_id)
        .map(|entries| {
            entries
                .iter()
                .map(Reflection::author_id)
                .collect::<HashSet<_>>()
                .len() as u64
        })
        .unwrap_or(0)
}

fn remove_ticket_records(state: &mut TicketState, ticket_id: TicketId) {
    if let Some(removed) = state.comments.remove(&ticket_id) {
        for comment in removed {
            state.comment_ids.remove(&comment.id());
        }
    }
    state.reflections.remove(&ticket_id);
    state.tickets.remove(&ticket_id);
}

#[async_trait]
impl<C: Clock + Send + Sync> TicketRepository for InMemoryTicketStore<C> {
    async fn store_ticket(&self, ticket: &Ticket) -> TicketRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        if state.tickets.contains_key(&ticket.id()) {
            return Err(TicketRepositoryError::DuplicateRecord(
                ticket.id().into_inner(),
            ));
        }
        state.tickets.insert(ticket.id(), ticket.clone());
        Ok(())
    }

    async fn find_ticket(&self, id: TicketId) -> TicketRepositoryResult<Option<Ticket>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.tickets.get(&id).cloned())
    }

    async fn update_ticket(&self, ticket: &Ticket) -> TicketRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        if !state.tickets.contains_key(&ticket.id()) {
            return Err(TicketRepositoryError::TicketNotFound(ticket.id()));
        }
        state.tickets.insert(ticket.id(), ticket.clone());
        Ok(())
    }

    async fn transition_status(
        &self,
        id: TicketId,
        from: TicketStatus,
        to: TicketStatus,
    ) -> TicketRepositoryResult<bool> {
        let mut state = self.state.write().map_err(poisoned)?;
        let Some(ticket) = state.tickets.get_mut(&id) else {
            return Ok(false);
        };
        if ticket.status() != from {
            return Ok(false);
        }
        ticket
            .transition_to(to, &self.clock)
            .map_err(TicketRepositoryError::persistence)?;
        Ok(true)
    }

    async fn mark_needs_reflection(&self, id: TicketId) -> TicketRepositoryResult<bool> {
        let mut state = self.state.write().map_err(poisoned)?;
        let Some(ticket) = state.tickets.get_mut(&id) else {
            return Ok(false);
        };
        if ticket.status() == TicketStatus::Resolved {
            return Ok(false);
        }
        if ticket.status() != TicketStatus::NeedsReflection {
            ticket
                .transition_to(TicketStatus::NeedsReflection, &self.clock)
                .map_err(TicketRepositoryError::persistence)?;
        }
        Ok(true)
    }

    async fn delete_ticket(&self, id: TicketId) -> TicketRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        remove_ticket_records(&mut state, id);
        Ok(())
    }

    async fn delete_board_tickets(&self, board_id: BoardId) -> TicketRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        let doomed: Vec<TicketId> = state
            .tickets
            .values()
            .filter(|ticket| ticket.board_id() == board_id)
            .map(Ticket::id)
            .collect();
        for ticket_id in doomed {
            remove_ticket_records(&mut state, ticket_id);
        }
        Ok(())
    }

    async fn list_tickets(
        &self,
        board_id: BoardId,
        filter: &TicketFilter,
        page: PageNumber,
    ) -> TicketRepositoryResult<TicketPage> {
        let state = self.state.read().map_err(poisoned)?;
        let mut matching: Vec<Ticket> = state
            .tickets
            .values()
            .filter(|ticket| ticket.board_id() == board_id && filter.matches(ticket))
            .cloned()
            .collect();
        matching.sort_by_key(|ticket| std::cmp::Reverse(ticket.created_at()));
        let (items, has_next_page, remaining) = paginate(&matching, page, TICKET_PAGE_SIZE);
        Ok(TicketPage {
            items,
            has_next_page,
            remaining,
        })
    }
}

#[async_trait]
impl<C: Clock + Send + Sync> CommentRepository for InMemoryTicketStore<C> {
    async fn append_comment(&self, comment: &Comment) -> TicketRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        if !state.tickets.contains_key(&comment.ticket_id()) {
            return Err(TicketRepositoryError::TicketNotFound(comment.ticket_id()));
        }
        if !state.comment_ids.insert(comment.id()) {
            return Err(TicketRepositoryError::DuplicateRecord(
                comment.id().into_inner(),
            ));
        }
        state
            .comments
            .entry(comment.ticket_id())
            .or_default()
            .push(comment.clone());
        Ok(())
    }

    async fn list_comments(
        &self,
        ticket_id: TicketId,
        page: PageNumber,
    ) -> TicketRepositoryResult<CommentPage> {
        let state = self.state.read().map_err(poisoned)?;
        let mut entries: Vec<Comment> = state
            .comments
            .get(&ticket_id)
            .cloned()
            .unwrap_or_default();
        entries.sort_by_key(|comment| std::cmp::Reverse(comment.created_at()));
        let (items, has_next_page, remaining) = paginate(&entries, page, COMMENT_PAGE_SIZE);
        Ok(CommentPage {
            items,
            has_next_page,
            remaining,
        })
    }
}

#[async_trait]
impl<C: Clock + Send + Sync> ReflectionRepository for InMemoryTicketStore<C> {
    async fn record_reflection(&self, reflection: &Reflection) -> TicketRepositoryResult<u64> {
        let mut state = self.state.write().map_err(poisoned)?;
        if !state.tickets.contains_key(&reflection.ticket_id()) {
            return Err(TicketRepositoryError::TicketNotFound(
                reflection.ticket_id(),
            ));
        }
        let ticket_reflections = state
            .reflections
            .entry(reflection.ticket_id())
            .or_default();
        let already_reflected = ticket_reflections
            .iter()
            .any(|existing| existing.author_id() == reflection.author_id());
        if already_reflected {
            return Err(TicketRepositoryError::DuplicateReflection {
                ticket_id: reflection.ticket_id(),
                author_id: reflection.author_id(),
            });
        }
        ticket_reflections.push(reflection.clone());
        Ok(distinct_reflection_authors(&state, reflection.ticket_id()))
    }
}
