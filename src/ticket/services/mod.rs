//! Orchestration services for the ticket context.

pub mod lifecycle;

pub use lifecycle::{
    CreateTicketRequest, ReflectionOutcome, TicketLifecycleError, TicketLifecycleResult,
    TicketLifecycleService, TicketView,
};
