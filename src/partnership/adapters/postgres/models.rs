//! Diesel row models for partnership persistence.

use super::schema::{boards, invites, users};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for user records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// Internal user identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Normalised e-mail address.
    pub email: String,
    /// Current partner, when the user is in a partnership.
    pub partner_id: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    /// Internal user identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Normalised e-mail address.
    pub email: String,
    /// Current partner, when the user is in a partnership.
    pub partner_id: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query result row for invite records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = invites)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InviteRow {
    /// Internal invite identifier.
    pub id: uuid::Uuid,
    /// User who sent the invite.
    pub inviter_id: uuid::Uuid,
    /// User the invite is addressed to.
    pub invitee_id: uuid::Uuid,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for invite records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = invites)]
pub struct NewInviteRow {
    /// Internal invite identifier.
    pub id: uuid::Uuid,
    /// User who sent the invite.
    pub inviter_id: uuid::Uuid,
    /// User the invite is addressed to.
    pub invitee_id: uuid::Uuid,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query result row for board records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = boards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BoardRow {
    /// Internal board identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Lower member of the normalised pair.
    pub first_member_id: uuid::Uuid,
    /// Upper member of the normalised pair.
    pub second_member_id: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for board records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = boards)]
pub struct NewBoardRow {
    /// Internal board identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Lower member of the normalised pair.
    pub first_member_id: uuid::Uuid,
    /// Upper member of the normalised pair.
    pub second_member_id: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
