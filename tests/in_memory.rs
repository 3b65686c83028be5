//! In-memory adapter integration tests.
//!
//! Tests are organized into modules by flow:
//! - `pairing_tests`: The invite handshake and break-up cascade
//! - `board_tests`: Overview and renaming across both partners
//! - `lifecycle_tests`: The full ticket journey from filing to resolution

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]
#![expect(
    clippy::indexing_slicing,
    reason = "Test code uses indexing after length checks"
)]

mod in_memory {
    pub mod helpers;

    mod board_tests;
    mod lifecycle_tests;
    mod pairing_tests;
}
