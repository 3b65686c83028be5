//! `PostgreSQL` repository implementation for partnership storage.
//!
//! The handshake-critical writes (`commit_acceptance`, `dissolve`) run inside
//! a single transaction and guard partner-link updates with conditional
//! `WHERE partner_id IS NULL` filters, so a lost race surfaces as zero
//! affected rows rather than a silently overwritten link.

use super::{
    models::{BoardRow, InviteRow, NewBoardRow, NewInviteRow, NewUserRow, UserRow},
    schema::{boards, invites, users},
};
use crate::partnership::domain::{
    Board, BoardId, BoardName, EmailAddress, Invite, InviteId, InviteStatus, PartnerPair,
    PersistedBoardData, PersistedInviteData, PersistedUserData, User, UserId,
};
use crate::partnership::ports::{
    PartnershipRepository, PartnershipRepositoryError, PartnershipRepositoryResult,
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by partnership adapters.
pub type PartnershipPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed partnership repository.
#[derive(Debug, Clone)]
pub struct PostgresPartnershipRepository {
    pool: PartnershipPgPool,
}

impl From<DieselError> for PartnershipRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

impl PostgresPartnershipRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PartnershipPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> PartnershipRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> PartnershipRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(PartnershipRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(PartnershipRepositoryError::persistence)?
    }
}

#[async_trait]
impl PartnershipRepository for PostgresPartnershipRepository {
    async fn store_user(&self, user: &User) -> PartnershipRepositoryResult<()> {
        let user_id = user.id();
        let email = user.email().clone();
        let new_row = user_to_new_row(user);

        self.run_blocking(move |connection| {
            diesel::insert_into(users::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_email_unique_violation(info.as_ref()) =>
                    {
                        PartnershipRepositoryError::DuplicateEmail(email.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        PartnershipRepositoryError::DuplicateUser(user_id)
                    }
                    _ => PartnershipRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_user(&self, id: UserId) -> PartnershipRepositoryResult<Option<User>> {
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::id.eq(id.into_inner()))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(PartnershipRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> PartnershipRepositoryResult<Option<User>> {
        let lookup = email.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::email.eq(&lookup))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(PartnershipRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn store_invite(&self, invite: &Invite) -> PartnershipRepositoryResult<()> {
        let invite_id = invite.id();
        let inviter_id = invite.inviter_id();
        let invitee_id = invite.invitee_id();
        let new_row = invite_to_new_row(invite);

        self.run_blocking(move |connection| {
            diesel::insert_into(invites::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_pending_pair_unique_violation(info.as_ref()) =>
                    {
                        PartnershipRepositoryError::DuplicatePendingInvite {
                            inviter_id,
                            invitee_id,
                        }
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        PartnershipRepositoryError::DuplicateInvite(invite_id)
                    }
                    _ => PartnershipRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_invite(&self, id: InviteId) -> PartnershipRepositoryResult<Option<Invite>> {
        self.run_blocking(move |connection| {
            let row = invites::table
                .filter(invites::id.eq(id.into_inner()))
                .select(InviteRow::as_select())
                .first::<InviteRow>(connection)
                .optional()
                .map_err(PartnershipRepositoryError::persistence)?;
            row.map(row_to_invite).transpose()
        })
        .await
    }

    async fn pending_invites_for(
        &self,
        invitee_id: UserId,
    ) -> PartnershipRepositoryResult<Vec<Invite>> {
        self.run_blocking(move |connection| {
            let rows = invites::table
                .filter(invites::invitee_id.eq(invitee_id.into_inner()))
                .filter(invites::status.eq(InviteStatus::Pending.as_str()))
                .order(invites::created_at.desc())
                .select(InviteRow::as_select())
                .load::<InviteRow>(connection)
                .map_err(PartnershipRepositoryError::persistence)?;
            rows.into_iter().map(row_to_invite).collect()
        })
        .await
    }

    async fn count_pending_invites_for(
        &self,
        invitee_id: UserId,
    ) -> PartnershipRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let count: i64 = invites::table
                .filter(invites::invitee_id.eq(invitee_id.into_inner()))
                .filter(invites::status.eq(InviteStatus::Pending.as_str()))
                .count()
                .get_result(connection)
                .map_err(PartnershipRepositoryError::persistence)?;
            Ok(u64::try_from(count).unwrap_or_default())
        })
        .await
    }

    async fn delete_invite(&self, id: InviteId) -> PartnershipRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(invites::table.filter(invites::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(PartnershipRepositoryError::persistence)?;
            if deleted == 0 {
                return Err(PartnershipRepositoryError::InviteNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn commit_acceptance(
        &self,
        invite_id: InviteId,
        board: &Board,
    ) -> PartnershipRepositoryResult<Board> {
        let new_board_row = board_to_new_row(board);
        let pair = board.members();

        self.run_blocking(move |connection| {
            connection.transaction::<_, PartnershipRepositoryError, _>(|tx_conn| {
                // Conditional transition closes the double-accept race: only
                // one transaction observes the pending row.
                let accepted = diesel::update(
                    invites::table
                        .filter(invites::id.eq(invite_id.into_inner()))
                        .filter(invites::status.eq(InviteStatus::Pending.as_str())),
                )
                .set(invites::status.eq(InviteStatus::Accepted.as_str()))
                .execute(tx_conn)?;
                if accepted == 0 {
                    let exists = invite_exists(tx_conn, invite_id)?;
                    return Err(if exists {
                        PartnershipRepositoryError::InviteNotPending(invite_id)
                    } else {
                        PartnershipRepositoryError::InviteNotFound(invite_id)
                    });
                }

                link_partner_guarded(tx_conn, pair.first(), pair.second())?;
                link_partner_guarded(tx_conn, pair.second(), pair.first())?;

                let member_ids = vec![pair.first().into_inner(), pair.second().into_inner()];
                diesel::delete(
                    invites::table
                        .filter(invites::id.ne(invite_id.into_inner()))
                        .filter(invites::status.eq(InviteStatus::Pending.as_str()))
                        .filter(
                            invites::inviter_id
                                .eq_any(member_ids.clone())
                                .or(invites::invitee_id.eq_any(member_ids)),
                        ),
                )
                .execute(tx_conn)?;

                diesel::insert_into(boards::table)
                    .values(&new_board_row)
                    .on_conflict_do_nothing()
                    .execute(tx_conn)?;

                let row = boards::table
                    .filter(boards::first_member_id.eq(pair.first().into_inner()))
                    .filter(boards::second_member_id.eq(pair.second().into_inner()))
                    .select(BoardRow::as_select())
                    .first::<BoardRow>(tx_conn)
                    .optional()?
                    .ok_or_else(|| {
                        PartnershipRepositoryError::persistence(std::io::Error::other(
                            "board row missing immediately after insert",
                        ))
                    })?;
                row_to_board(row)
            })
        })
        .await
    }

    async fn dissolve(&self, pair: PartnerPair) -> PartnershipRepositoryResult<Option<BoardId>> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, PartnershipRepositoryError, _>(|tx_conn| {
                ensure_mutually_linked(tx_conn, pair)?;

                let member_ids = vec![pair.first().into_inner(), pair.second().into_inner()];
                diesel::update(users::table.filter(users::id.eq_any(member_ids)))
                    .set(users::partner_id.eq(None::<uuid::Uuid>))
                    .execute(tx_conn)?;

                let deleted_board: Option<uuid::Uuid> = diesel::delete(
                    boards::table
                        .filter(boards::first_member_id.eq(pair.first().into_inner()))
                        .filter(boards::second_member_id.eq(pair.second().into_inner())),
                )
                .returning(boards::id)
                .get_result(tx_conn)
                .optional()?;

                Ok(deleted_board.map(BoardId::from_uuid))
            })
        })
        .await
    }

    async fn find_board(&self, id: BoardId) -> PartnershipRepositoryResult<Option<Board>> {
        self.run_blocking(move |connection| {
            let row = boards::table
                .filter(boards::id.eq(id.into_inner()))
                .select(BoardRow::as_select())
                .first::<BoardRow>(connection)
                .optional()
                .map_err(PartnershipRepositoryError::persistence)?;
            row.map(row_to_board).transpose()
        })
        .await
    }

    async fn find_board_for_member(
        &self,
        user_id: UserId,
    ) -> PartnershipRepositoryResult<Option<Board>> {
        self.run_blocking(move |connection| {
            let member = user_id.into_inner();
            let row = boards::table
                .filter(
                    boards::first_member_id
                        .eq(member)
                        .or(boards::second_member_id.eq(member)),
                )
                .select(BoardRow::as_select())
                .first::<BoardRow>(connection)
                .optional()
                .map_err(PartnershipRepositoryError::persistence)?;
            row.map(row_to_board).transpose()
        })
        .await
    }

    async fn rename_board(
        &self,
        id: BoardId,
        name: &BoardName,
    ) -> PartnershipRepositoryResult<()> {
        let new_name = name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let updated = diesel::update(boards::table.filter(boards::id.eq(id.into_inner())))
                .set(boards::name.eq(&new_name))
                .execute(connection)
                .map_err(PartnershipRepositoryError::persistence)?;
            if updated == 0 {
                return Err(PartnershipRepositoryError::BoardNotFound(id));
            }
            Ok(())
        })
        .await
    }
}

/// Sets `member`'s partner link only while it is still unset, then reports
/// why a zero-row outcome happened.
fn link_partner_guarded(
    connection: &mut PgConnection,
    member: UserId,
    partner: UserId,
) -> PartnershipRepositoryResult<()> {
    let updated = diesel::update(
        users::table
            .filter(users::id.eq(member.into_inner()))
            .filter(users::partner_id.is_null()),
    )
    .set(users::partner_id.eq(partner.into_inner()))
    .execute(connection)?;
    if updated == 0 {
        let exists = user_exists(connection, member)?;
        return Err(if exists {
            PartnershipRepositoryError::AlreadyPartnered(member)
        } else {
            PartnershipRepositoryError::UserNotFound(member)
        });
    }
    Ok(())
}

fn ensure_mutually_linked(
    connection: &mut PgConnection,
    pair: PartnerPair,
) -> PartnershipRepositoryResult<()> {
    let first = load_user(connection, pair.first())?;
    let second = load_user(connection, pair.second())?;
    if !first.is_partner_of(&second) {
        return Err(PartnershipRepositoryError::NotMutuallyLinked(pair));
    }
    Ok(())
}

fn load_user(connection: &mut PgConnection, id: UserId) -> PartnershipRepositoryResult<User> {
    let row = users::table
        .filter(users::id.eq(id.into_inner()))
        .select(UserRow::as_select())
        .first::<UserRow>(connection)
        .optional()?
        .ok_or(PartnershipRepositoryError::UserNotFound(id))?;
    row_to_user(row)
}

fn user_exists(connection: &mut PgConnection, id: UserId) -> PartnershipRepositoryResult<bool> {
    let count: i64 = users::table
        .filter(users::id.eq(id.into_inner()))
        .count()
        .get_result(connection)?;
    Ok(count > 0)
}

fn invite_exists(connection: &mut PgConnection, id: InviteId) -> PartnershipRepositoryResult<bool> {
    let count: i64 = invites::table
        .filter(invites::id.eq(id.into_inner()))
        .count()
        .get_result(connection)?;
    Ok(count > 0)
}

fn user_to_new_row(user: &User) -> NewUserRow {
    NewUserRow {
        id: user.id().into_inner(),
        name: user.name().to_owned(),
        email: user.email().as_str().to_owned(),
        partner_id: user.partner_id().map(UserId::into_inner),
        created_at: user.created_at(),
    }
}

fn row_to_user(row: UserRow) -> PartnershipRepositoryResult<User> {
    let email =
        EmailAddress::new(row.email).map_err(PartnershipRepositoryError::persistence)?;
    Ok(User::from_persisted(PersistedUserData {
        id: UserId::from_uuid(row.id),
        name: row.name,
        email,
        partner_id: row.partner_id.map(UserId::from_uuid),
        created_at: row.created_at,
    }))
}

fn invite_to_new_row(invite: &Invite) -> NewInviteRow {
    NewInviteRow {
        id: invite.id().into_inner(),
        inviter_id: invite.inviter_id().into_inner(),
        invitee_id: invite.invitee_id().into_inner(),
        status: invite.status().as_str().to_owned(),
        created_at: invite.created_at(),
    }
}

fn row_to_invite(row: InviteRow) -> PartnershipRepositoryResult<Invite> {
    let status = InviteStatus::try_from(row.status.as_str())
        .map_err(PartnershipRepositoryError::persistence)?;
    Ok(Invite::from_persisted(PersistedInviteData {
        id: InviteId::from_uuid(row.id),
        inviter_id: UserId::from_uuid(row.inviter_id),
        invitee_id: UserId::from_uuid(row.invitee_id),
        status,
        created_at: row.created_at,
    }))
}

fn board_to_new_row(board: &Board) -> NewBoardRow {
    let members = board.members();
    NewBoardRow {
        id: board.id().into_inner(),
        name: board.name().as_str().to_owned(),
        first_member_id: members.first().into_inner(),
        second_member_id: members.second().into_inner(),
        created_at: board.created_at(),
    }
}

fn row_to_board(row: BoardRow) -> PartnershipRepositoryResult<Board> {
    let members = PartnerPair::new(
        UserId::from_uuid(row.first_member_id),
        UserId::from_uuid(row.second_member_id),
    )
    .map_err(PartnershipRepositoryError::persistence)?;
    let name = BoardName::new(row.name).map_err(PartnershipRepositoryError::persistence)?;
    Ok(Board::from_persisted(PersistedBoardData {
        id: BoardId::from_uuid(row.id),
        name,
        members,
        created_at: row.created_at,
    }))
}

fn is_email_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == "idx_users_email_unique")
}

fn is_pending_pair_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == "idx_invites_pending_pair")
}
