//! In-memory ticket store for tests and embedding.

mod store;

pub use store::InMemoryTicketStore;
