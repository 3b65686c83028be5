//! In-memory partnership store for tests and embedding.

mod store;

pub use store::InMemoryPartnershipStore;
