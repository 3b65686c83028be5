//! Port contracts for partnership management.
//!
//! Ports define infrastructure-agnostic interfaces used by partnership
//! services.

pub mod repository;

pub use repository::{
    PartnershipRepository, PartnershipRepositoryError, PartnershipRepositoryResult,
};
