//! Domain model for partnership management.
//!
//! Models users with their symmetric partner link, pending invites, and the
//! shared board owned by a committed partnership, keeping all infrastructure
//! concerns outside of the domain boundary.

mod board;
mod error;
mod ids;
mod invite;
mod user;

pub use board::{Board, BoardName, PartnerPair, PersistedBoardData};
pub use error::{ParseInviteStatusError, PartnershipDomainError};
pub use ids::{BoardId, InviteId, UserId};
pub use invite::{Invite, InviteStatus, PersistedInviteData};
pub use user::{EmailAddress, PersistedUserData, User};
