//! `PostgreSQL` adapters for partnership persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PartnershipPgPool, PostgresPartnershipRepository};
