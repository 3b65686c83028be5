//! Domain model for the ticket lifecycle.
//!
//! Models tickets with their forward-only status machine, the orthogonal
//! archived flag, append-only comments, and per-partner reflections.

mod comment;
mod error;
mod ids;
mod paging;
mod patch;
mod reflection;
mod ticket;

pub use comment::{Comment, PersistedCommentData};
pub use error::{
    ParseTicketCategoryError, ParseTicketPriorityError, ParseTicketStatusError, TicketDomainError,
};
pub use ids::{CommentId, ReflectionId, TicketId};
pub use paging::PageNumber;
pub use patch::TicketPatch;
pub use reflection::Reflection;
pub use ticket::{PersistedTicketData, Ticket, TicketCategory, TicketPriority, TicketStatus};
