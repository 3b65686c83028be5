//! Tandem: relationship and ticket lifecycle engine.
//!
//! Tandem models a two-person partnership formed through an invite/accept
//! handshake, the single shared board that partnership owns, and the tickets
//! the pair works through together. A ticket closes only after a reflection
//! from *each* partner has been recorded.
//!
//! # Architecture
//!
//! Tandem follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, in-memory)
//!
//! # Modules
//!
//! - [`partnership`]: Identity, invite handshake, and board ownership
//! - [`ticket`]: Ticket lifecycle, comment log, and the reflection gate
//! - [`error`]: Transport-facing error taxonomy
//!
//! Callers arrive already authenticated; every operation takes the caller's
//! [`partnership::domain::UserId`] explicitly rather than reading ambient
//! state.

pub mod error;
pub mod partnership;
pub mod ticket;
