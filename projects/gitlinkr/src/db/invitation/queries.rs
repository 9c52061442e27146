use chrono::{DateTime, Utc};
use diesel::prelude::*;
use thiserror::Error;

use crate::db::{invitation::models::*, schema::invitations::dsl::*, DbError};

pub fn list_by_inviter(conn: &mut PgConnection, inviter: &str) -> QueryResult<Vec<Invitation>> {
    invitations
        .filter(inviter_github_login.eq(inviter))
        .order(created_at.desc())
        .select(Invitation::as_select())
        .load(conn)
}

#[derive(Debug, Error)]
pub enum InsertInvitationsError {
    #[error("InsertInvitations: {source}")]
    InsertInvitations {
        #[from]
        source: diesel::result::Error,
    },
}

impl From<InsertInvitationsError> for DbError {
    fn from(err: InsertInvitationsError) -> Self {
        let InsertInvitationsError::InsertInvitations { source } = err;
        DbError::Write {
            operation: "InsertInvitations",
            source,
        }
    }
}

pub fn insert_invitations(conn: &mut PgConnection, rows: &[NewInvitation]) -> Result<Vec<Invitation>, InsertInvitationsError> {
    diesel::insert_into(invitations)
        .values(rows)
        .returning(Invitation::as_returning())
        .get_results(conn)
        .map_err(|source| InsertInvitationsError::InsertInvitations { source })
}

#[derive(Debug, Error)]
pub enum AcceptInvitationError {
    #[error("AcceptInvitation: {source}")]
    AcceptInvitation {
        #[from]
        source: diesel::result::Error,
    },
}

impl From<AcceptInvitationError> for DbError {
    fn from(err: AcceptInvitationError) -> Self {
        let AcceptInvitationError::AcceptInvitation { source } = err;
        DbError::Write {
            operation: "AcceptInvitation",
            source,
        }
    }
}

/// `None` when no invitation carries `invite_code`.
pub fn accept_invitation(
    conn: &mut PgConnection,
    invite_code: &str,
    at: DateTime<Utc>,
) -> Result<Option<Invitation>, AcceptInvitationError> {
    diesel::update(invitations.filter(code.eq(invite_code)))
        .set((status.eq(ACCEPTED), accepted_at.eq(Some(at))))
        .returning(Invitation::as_returning())
        .get_result(conn)
        .optional()
        .map_err(|source| AcceptInvitationError::AcceptInvitation { source })
}
