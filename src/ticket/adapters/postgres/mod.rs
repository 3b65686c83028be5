//! `PostgreSQL` adapters for ticket, comment, and reflection persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresTicketRepository, TicketPgPool};
