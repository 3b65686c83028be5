//! `PostgreSQL` repository implementation for tickets, comments, and
//! reflections.
//!
//! Status moves are compare-and-set `UPDATE ... WHERE status = ...`
//! statements, so a racing writer observes zero affected rows instead of
//! clobbering a transition. The reflection insert and its distinct-author
//! count share one transaction for the same reason.

use super::{
    models::{CommentRow, NewCommentRow, NewReflectionRow, NewTicketRow, TicketRow},
    schema::{comments, reflections, tickets},
};
use crate::partnership::domain::{BoardId, UserId};
use crate::ticket::domain::{
    Comment, CommentId, PageNumber, PersistedCommentData, PersistedTicketData, Reflection,
    Ticket, TicketCategory, TicketId, TicketPriority, TicketStatus,
};
use crate::ticket::ports::{
    COMMENT_PAGE_SIZE, CommentPage, CommentRepository, ReflectionRepository, TICKET_PAGE_SIZE,
    TicketFilter, TicketPage, TicketRepository, TicketRepositoryError, TicketRepositoryResult,
};
use async_trait::async_trait;
use diesel::dsl::count_distinct;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by ticket adapters.
pub type TicketPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed store implementing the ticket, comment, and
/// reflection ports over one schema.
#[derive(Debug, Clone)]
pub struct PostgresTicketRepository {
    pool: TicketPgPool,
}

impl From<DieselError> for TicketRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

impl PostgresTicketRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TicketPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TicketRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TicketRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TicketRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TicketRepositoryError::persistence)?
    }
}

#[async_trait]
impl TicketRepository for PostgresTicketRepository {
    async fn store_ticket(&self, ticket: &Ticket) -> TicketRepositoryResult<()> {
        let record_id = ticket.id().into_inner();
        let new_row = ticket_to_new_row(ticket);

        self.run_blocking(move |connection| {
            diesel::insert_into(tickets::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TicketRepositoryError::DuplicateRecord(record_id)
                    }
                    _ => TicketRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_ticket(&self, id: TicketId) -> TicketRepositoryResult<Option<Ticket>> {
        self.run_blocking(move |connection| {
            let row = tickets::table
                .filter(tickets::id.eq(id.into_inner()))
                .select(TicketRow::as_select())
                .first::<TicketRow>(connection)
                .optional()
                .map_err(TicketRepositoryError::persistence)?;
            row.map(row_to_ticket).transpose()
        })
        .await
    }

    async fn update_ticket(&self, ticket: &Ticket) -> TicketRepositoryResult<()> {
        let ticket_id = ticket.id();
        let row = ticket_to_new_row(ticket);

        self.run_blocking(move |connection| {
            let updated =
                diesel::update(tickets::table.filter(tickets::id.eq(ticket_id.into_inner())))
                    .set((
                        tickets::title.eq(&row.title),
                        tickets::description.eq(&row.description),
                        tickets::category.eq(&row.category),
                        tickets::priority.eq(&row.priority),
                        tickets::status.eq(&row.status),
                        tickets::archived.eq(row.archived),
                        tickets::updated_at.eq(row.updated_at),
                    ))
                    .execute(connection)
                    .map_err(TicketRepositoryError::persistence)?;
            if updated == 0 {
                return Err(TicketRepositoryError::TicketNotFound(ticket_id));
            }
            Ok(())
        })
        .await
    }

    async fn transition_status(
        &self,
        id: TicketId,
        from: TicketStatus,
        to: TicketStatus,
    ) -> TicketRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                tickets::table
                    .filter(tickets::id.eq(id.into_inner()))
                    .filter(tickets::status.eq(from.as_str())),
            )
            .set((
                tickets::status.eq(to.as_str()),
                tickets::updated_at.eq(diesel::dsl::now),
            ))
            .execute(connection)
            .map_err(TicketRepositoryError::persistence)?;
            Ok(updated > 0)
        })
        .await
    }

    async fn mark_needs_reflection(&self, id: TicketId) -> TicketRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                tickets::table
                    .filter(tickets::id.eq(id.into_inner()))
                    .filter(tickets::status.ne(TicketStatus::Resolved.as_str())),
            )
            .set((
                tickets::status.eq(TicketStatus::NeedsReflection.as_str()),
                tickets::updated_at.eq(diesel::dsl::now),
            ))
            .execute(connection)
            .map_err(TicketRepositoryError::persistence)?;
            Ok(updated > 0)
        })
        .await
    }

    async fn delete_ticket(&self, id: TicketId) -> TicketRepositoryResult<()> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TicketRepositoryError, _>(|tx_conn| {
                let ticket_uuid = id.into_inner();
                diesel::delete(comments::table.filter(comments::ticket_id.eq(ticket_uuid)))
                    .execute(tx_conn)?;
                diesel::delete(reflections::table.filter(reflections::ticket_id.eq(ticket_uuid)))
                    .execute(tx_conn)?;
                diesel::delete(tickets::table.filter(tickets::id.eq(ticket_uuid)))
                    .execute(tx_conn)?;
                Ok(())
            })
        })
        .await
    }

    async fn delete_board_tickets(&self, board_id: BoardId) -> TicketRepositoryResult<()> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TicketRepositoryError, _>(|tx_conn| {
                let ticket_ids: Vec<uuid::Uuid> = tickets::table
                    .filter(tickets::board_id.eq(board_id.into_inner()))
                    .select(tickets::id)
                    .load(tx_conn)?;
                if ticket_ids.is_empty() {
                    return Ok(());
                }
                diesel::delete(
                    comments::table.filter(comments::ticket_id.eq_any(ticket_ids.clone())),
                )
                .execute(tx_conn)?;
                diesel::delete(
                    reflections::table.filter(reflections::ticket_id.eq_any(ticket_ids)),
                )
                .execute(tx_conn)?;
                diesel::delete(tickets::table.filter(tickets::board_id.eq(board_id.into_inner())))
                    .execute(tx_conn)?;
                Ok(())
            })
        })
        .await
    }

    async fn list_tickets(
        &self,
        board_id: BoardId,
        filter: &TicketFilter,
        page: PageNumber,
    ) -> TicketRepositoryResult<TicketPage> {
        let criteria = *filter;
        self.run_blocking(move |connection| {
            let offset = page.offset(TICKET_PAGE_SIZE);
            let sql_offset =
                i64::try_from(offset).map_err(TicketRepositoryError::persistence)?;

            let total: i64 = filtered_tickets(board_id, criteria)
                .count()
                .get_result(connection)
                .map_err(TicketRepositoryError::persistence)?;

            let rows = filtered_tickets(board_id, criteria)
                .order(tickets::created_at.desc())
                .offset(sql_offset)
                .limit(i64::from(TICKET_PAGE_SIZE))
                .select(TicketRow::as_select())
                .load::<TicketRow>(connection)
                .map_err(TicketRepositoryError::persistence)?;

            let items = rows
                .into_iter()
                .map(row_to_ticket)
                .collect::<TicketRepositoryResult<Vec<Ticket>>>()?;
            let matching = u64::try_from(total).unwrap_or_default();
            let fetched = u64::try_from(items.len()).unwrap_or_default();
            let remaining = matching.saturating_sub(offset.saturating_add(fetched));

            Ok(TicketPage {
                items,
                has_next_page: remaining > 0,
                remaining,
            })
        })
        .await
    }
}

#[async_trait]
impl CommentRepository for PostgresTicketRepository {
    async fn append_comment(&self, comment: &Comment) -> TicketRepositoryResult<()> {
        let record_id = comment.id().into_inner();
        let ticket_id = comment.ticket_id();
        let new_row = comment_to_new_row(comment);

        self.run_blocking(move |connection| {
            diesel::insert_into(comments::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TicketRepositoryError::DuplicateRecord(record_id)
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        TicketRepositoryError::TicketNotFound(ticket_id)
                    }
                    _ => TicketRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn list_comments(
        &self,
        ticket_id: TicketId,
        page: PageNumber,
    ) -> TicketRepositoryResult<CommentPage> {
        self.run_blocking(move |connection| {
            let offset = page.offset(COMMENT_PAGE_SIZE);
            let sql_offset =
                i64::try_from(offset).map_err(TicketRepositoryError::persistence)?;

            let total: i64 = comments::table
                .filter(comments::ticket_id.eq(ticket_id.into_inner()))
                .count()
                .get_result(connection)
                .map_err(TicketRepositoryError::persistence)?;

            let rows = comments::table
                .filter(comments::ticket_id.eq(ticket_id.into_inner()))
                .order(comments::created_at.desc())
                .offset(sql_offset)
                .limit(i64::from(COMMENT_PAGE_SIZE))
                .select(CommentRow::as_select())
                .load::<CommentRow>(connection)
                .map_err(TicketRepositoryError::persistence)?;

            let items: Vec<Comment> = rows.into_iter().map(row_to_comment).collect();
            let matching = u64::try_from(total).unwrap_or_default();
            let fetched = u64::try_from(items.len()).unwrap_or_default();
            let remaining = matching.saturating_sub(offset.saturating_add(fetched));

            Ok(CommentPage {
                items,
                has_next_page: remaining > 0,
                remaining,
            })
        })
        .await
    }
}

#[async_trait]
impl ReflectionRepository for PostgresTicketRepository {
    async fn record_reflection(&self, reflection: &Reflection) -> TicketRepositoryResult<u64> {
        let ticket_id = reflection.ticket_id();
        let author_id = reflection.author_id();
        let new_row = reflection_to_new_row(reflection);

        self.run_blocking(move |connection| {
            connection.transaction::<_, TicketRepositoryError, _>(|tx_conn| {
                diesel::insert_into(reflections::table)
                    .values(&new_row)
                    .execute(tx_conn)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(
                            DatabaseErrorKind::UniqueViolation,
                            ref info,
                        ) if is_ticket_author_unique_violation(info.as_ref()) => {
                            TicketRepositoryError::DuplicateReflection {
                                ticket_id,
                                author_id,
                            }
                        }
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            TicketRepositoryError::DuplicateRecord(new_row.id)
                        }
                        DieselError::DatabaseError(
                            DatabaseErrorKind::ForeignKeyViolation,
                            _,
                        ) => TicketRepositoryError::TicketNotFound(ticket_id),
                        _ => TicketRepositoryError::persistence(err),
                    })?;
                distinct_author_count(tx_conn, ticket_id)
            })
        })
        .await
    }
}

type BoxedTicketQuery<'a> = tickets::BoxedQuery<'a, diesel::pg::Pg>;

fn filtered_tickets<'a>(board_id: BoardId, filter: TicketFilter) -> BoxedTicketQuery<'a> {
    let mut query = tickets::table
        .filter(tickets::board_id.eq(board_id.into_inner()))
        .filter(tickets::archived.eq(filter.archived))
        .into_boxed();
    if let Some(status) = filter.status {
        query = query.filter(tickets::status.eq(status.as_str()));
    }
    if let Some(priority) = filter.priority {
        query = query.filter(tickets::priority.eq(priority.as_str()));
    }
    if let Some(category) = filter.category {
        query = query.filter(tickets::category.eq(category.as_str()));
    }
    query
}

fn distinct_author_count(
    connection: &mut PgConnection,
    ticket_id: TicketId,
) -> TicketRepositoryResult<u64> {
    let count: i64 = reflections::table
        .filter(reflections::ticket_id.eq(ticket_id.into_inner()))
        .select(count_distinct(reflections::author_id))
        .get_result(connection)?;
    Ok(u64::try_from(count).unwrap_or_default())
}

fn ticket_to_new_row(ticket: &Ticket) -> NewTicketRow {
    NewTicketRow {
        id: ticket.id().into_inner(),
        board_id: ticket.board_id().into_inner(),
        author_id: ticket.author_id().into_inner(),
        title: ticket.title().to_owned(),
        description: ticket.description().map(str::to_owned),
        category: ticket.category().as_str().to_owned(),
        priority: ticket.priority().as_str().to_owned(),
        status: ticket.status().as_str().to_owned(),
        archived: ticket.archived(),
        created_at: ticket.created_at(),
        updated_at: ticket.updated_at(),
    }
}

fn row_to_ticket(row: TicketRow) -> TicketRepositoryResult<Ticket> {
    let category = TicketCategory::try_from(row.category.as_str())
        .map_err(TicketRepositoryError::persistence)?;
    let priority = TicketPriority::try_from(row.priority.as_str())
        .map_err(TicketRepositoryError::persistence)?;
    let status = TicketStatus::try_from(row.status.as_str())
        .map_err(TicketRepositoryError::persistence)?;

    Ok(Ticket::from_persisted(PersistedTicketData {
        id: TicketId::from_uuid(row.id),
        board_id: BoardId::from_uuid(row.board_id),
        author_id: UserId::from_uuid(row.author_id),
        title: row.title,
        description: row.description,
        category,
        priority,
        status,
        archived: row.archived,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn comment_to_new_row(comment: &Comment) -> NewCommentRow {
    NewCommentRow {
        id: comment.id().into_inner(),
        ticket_id: comment.ticket_id().into_inner(),
        author_id: comment.author_id().into_inner(),
        body: comment.body().to_owned(),
        created_at: comment.created_at(),
    }
}

fn row_to_comment(row: CommentRow) -> Comment {
    Comment::from_persisted(PersistedCommentData {
        id: CommentId::from_uuid(row.id),
        ticket_id: TicketId::from_uuid(row.ticket_id),
        author_id: UserId::from_uuid(row.author_id),
        body: row.body,
        created_at: row.created_at,
    })
}

fn reflection_to_new_row(reflection: &Reflection) -> NewReflectionRow {
    NewReflectionRow {
        id: reflection.id().into_inner(),
        ticket_id: reflection.ticket_id().into_inner(),
        author_id: reflection.author_id().into_inner(),
        body: reflection.body().to_owned(),
        created_at: reflection.created_at(),
    }
}

fn is_ticket_author_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == "idx_reflections_ticket_author")
}
