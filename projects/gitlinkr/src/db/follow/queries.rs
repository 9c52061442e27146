use diesel::prelude::*;
use thiserror::Error;

use crate::db::{follow::models::*, schema::follows::dsl::*, DbError};

#[derive(Debug, Error)]
pub enum InsertFollowsError {
    #[error("InsertFollows: {source}")]
    InsertFollows {
        #[from]
        source: diesel::result::Error,
    },
}

impl From<InsertFollowsError> for DbError {
    fn from(err: InsertFollowsError) -> Self {
        let InsertFollowsError::InsertFollows { source } = err;
        DbError::Write {
            operation: "InsertFollows",
            source,
        }
    }
}

/// Idempotent: an existing pair is left untouched.
pub fn insert_follows(conn: &mut PgConnection, rows: &[NewFollow]) -> Result<usize, InsertFollowsError> {
    diesel::insert_into(follows)
        .values(rows)
        .on_conflict((follower_github_login, target_github_login))
        .do_nothing()
        .execute(conn)
        .map_err(|source| InsertFollowsError::InsertFollows { source })
}

pub fn delete_follow(conn: &mut PgConnection, follower: &str, target: &str) -> QueryResult<usize> {
    diesel::delete(
        follows
            .filter(follower_github_login.eq(follower))
            .filter(target_github_login.eq(target)),
    )
    .execute(conn)
}

pub fn followers_of(conn: &mut PgConnection, target: &str) -> QueryResult<Vec<String>> {
    follows
        .filter(target_github_login.eq(target))
        .select(follower_github_login)
        .load(conn)
}

pub fn following_of(conn: &mut PgConnection, follower: &str) -> QueryResult<Vec<String>> {
    follows
        .filter(follower_github_login.eq(follower))
        .select(target_github_login)
        .load(conn)
}
