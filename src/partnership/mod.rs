//! Partnership management for Tandem.
//!
//! This bounded context covers the identity store, the invite handshake that
//! turns a pairing request into a committed partnership, and the single
//! shared board each partnership owns. The invite engine is the sole writer
//! of partner links; boards are created only as a side effect of invite
//! acceptance and destroyed only when a partnership breaks. The module
//! follows hexagonal architecture:
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
