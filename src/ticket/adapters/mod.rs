//! Adapter implementations for ticket lifecycle persistence.

pub mod memory;
pub mod postgres;
