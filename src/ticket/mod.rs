//! Ticket lifecycle management for Tandem.
//!
//! This bounded context owns the ticket status machine
//! (`open → in_talks → needs_reflection → resolved`), the append-only
//! comment log that feeds it, and the reflection gate that requires one
//! reflection from each partner before a ticket resolves. Board membership
//! checks are delegated to the partnership context. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
