//! Orchestration services for the partnership context.

pub mod boards;
pub mod pairing;

pub use boards::{BoardError, BoardOverview, BoardResult, BoardService};
pub use pairing::{PairingError, PairingResult, PairingService};
