use diesel::prelude::*;
use thiserror::Error;
use uuid::Uuid;

use crate::db::connection::models::Connection;
use crate::db::{connection::models::*, schema::connections::dsl::*, DbError};

/// Connections where `login` is either side, newest first.
pub fn list_for_user(conn: &mut PgConnection, login: &str) -> QueryResult<Vec<Connection>> {
    connections
        .filter(requester_github_login.eq(login).or(recipient_github_login.eq(login)))
        .order(created_at.desc())
        .select(Connection::as_select())
        .load(conn)
}

/// Any connection between the two logins, in either direction.
pub fn find_between(conn: &mut PgConnection, a: &str, b: &str) -> QueryResult<Option<Connection>> {
    connections
        .filter(
            requester_github_login
                .eq(a)
                .and(recipient_github_login.eq(b))
                .or(requester_github_login.eq(b).and(recipient_github_login.eq(a))),
        )
        .select(Connection::as_select())
        .first(conn)
        .optional()
}

#[derive(Debug, Error)]
pub enum InsertConnectionError {
    #[error("InsertConnection: {source}")]
    InsertConnection {
        #[from]
        source: diesel::result::Error,
    },
}

impl From<InsertConnectionError> for DbError {
    fn from(err: InsertConnectionError) -> Self {
        let InsertConnectionError::InsertConnection { source } = err;
        DbError::Write {
            operation: "InsertConnection",
            source,
        }
    }
}

pub fn insert_connection(conn: &mut PgConnection, new: &NewConnection) -> Result<Connection, InsertConnectionError> {
    diesel::insert_into(connections)
        .values(new)
        .returning(Connection::as_returning())
        .get_result(conn)
        .map_err(|source| InsertConnectionError::InsertConnection { source })
}

#[derive(Debug, Error)]
pub enum UpdateConnectionStatusError {
    #[error("UpdateConnectionStatus: {source}")]
    UpdateConnectionStatus {
        #[from]
        source: diesel::result::Error,
    },
}

impl From<UpdateConnectionStatusError> for DbError {
    fn from(err: UpdateConnectionStatusError) -> Self {
        let UpdateConnectionStatusError::UpdateConnectionStatus { source } = err;
        DbError::Write {
            operation: "UpdateConnectionStatus",
            source,
        }
    }
}

/// Sets `status` only when `recipient` is the recipient of connection `id`.
pub fn update_status_as_recipient(
    conn: &mut PgConnection,
    connection_id: Uuid,
    recipient: &str,
    new_status: &str,
) -> Result<Option<Connection>, UpdateConnectionStatusError> {
    diesel::update(
        connections
            .filter(id.eq(connection_id))
            .filter(recipient_github_login.eq(recipient)),
    )
    .set(status.eq(new_status))
    .returning(Connection::as_returning())
    .get_result(conn)
    .optional()
    .map_err(|source| UpdateConnectionStatusError::UpdateConnectionStatus { source })
}

pub fn list_pending_for_recipient(conn: &mut PgConnection, login: &str) -> QueryResult<Vec<Connection>> {
    connections
        .filter(recipient_github_login.eq(login))
        .filter(status.eq(PENDING))
        .order(created_at.desc())
        .select(Connection::as_select())
        .load(conn)
}
