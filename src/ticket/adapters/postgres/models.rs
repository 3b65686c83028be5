//! Diesel row models for ticket persistence.

use super::schema::{comments, reflections, tickets};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for ticket records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tickets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TicketRow {
    /// Internal ticket identifier.
    pub id: uuid::Uuid,
    /// Owning board.
    pub board_id: uuid::Uuid,
    /// Authoring user.
    pub author_id: uuid::Uuid,
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Category.
    pub category: String,
    /// Priority.
    pub priority: String,
    /// Lifecycle status.
    pub status: String,
    /// Archived flag.
    pub archived: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for ticket records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tickets)]
pub struct NewTicketRow {
    /// Internal ticket identifier.
    pub id: uuid::Uuid,
    /// Owning board.
    pub board_id: uuid::Uuid,
    /// Authoring user.
    pub author_id: uuid::Uuid,
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Category.
    pub category: String,
    /// Priority.
    pub priority: String,
    /// Lifecycle status.
    pub status: String,
    /// Archived flag.
    pub archived: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for comment records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentRow {
    /// Internal comment identifier.
    pub id: uuid::Uuid,
    /// Owning ticket.
    pub ticket_id: uuid::Uuid,
    /// Authoring user.
    pub author_id: uuid::Uuid,
    /// Body text.
    pub body: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for comment records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub struct NewCommentRow {
    /// Internal comment identifier.
    pub id: uuid::Uuid,
    /// Owning ticket.
    pub ticket_id: uuid::Uuid,
    /// Authoring user.
    pub author_id: uuid::Uuid,
    /// Body text.
    pub body: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for reflection records.
///
/// Reflections are write-only at this layer; the ports expose only the
/// insert and a distinct-author count, so no query row model exists.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reflections)]
pub struct NewReflectionRow {
    /// Internal reflection identifier.
    pub id: uuid::Uuid,
    /// Owning ticket.
    pub ticket_id: uuid::Uuid,
    /// Authoring user.
    pub author_id: uuid::Uuid,
    /// Body text.
    pub body: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
