//! Repository port for close-out reflections.

use super::TicketRepositoryResult;
use crate::ticket::domain::Reflection;
use async_trait::async_trait;

/// Reflection persistence contract.
#[async_trait]
pub trait ReflectionRepository: Send + Sync {
    /// Records a reflection and returns the ticket's distinct-author
    /// reflection count *after* the insert.
    ///
    /// The insert and the count happen in one critical section so two
    /// partners racing each other observe counts of 1 and 2 in some order,
    /// never 2 and 2. The (ticket, author) uniqueness guard makes a repeat
    /// submission by the same author fail instead of inflating the count.
    ///
    /// # Errors
    ///
    /// Returns [`super::TicketRepositoryError::DuplicateReflection`] when
    /// this author already reflected on the ticket.
    async fn record_reflection(&self, reflection: &Reflection) -> TicketRepositoryResult<u64>;
}
