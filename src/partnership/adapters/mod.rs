//! Adapter implementations for partnership persistence.

pub mod memory;
pub mod postgres;
