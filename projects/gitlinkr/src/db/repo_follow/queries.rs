use diesel::prelude::*;
use thiserror::Error;

use crate::db::{repo_follow::models::*, schema::repo_follows::dsl::*, DbError};

pub fn repos_followed_by(conn: &mut PgConnection, follower: &str) -> QueryResult<Vec<String>> {
    repo_follows
        .filter(follower_github_login.eq(follower))
        .order(created_at.asc())
        .select(repo_full_name)
        .load(conn)
}

#[derive(Debug, Error)]
pub enum InsertRepoFollowError {
    #[error("InsertRepoFollow: {source}")]
    InsertRepoFollow {
        #[from]
        source: diesel::result::Error,
    },
}

impl From<InsertRepoFollowError> for DbError {
    fn from(err: InsertRepoFollowError) -> Self {
        let InsertRepoFollowError::InsertRepoFollow { source } = err;
        DbError::Write {
            operation: "InsertRepoFollow",
            source,
        }
    }
}

pub fn insert_repo_follow(conn: &mut PgConnection, new: &NewRepoFollow) -> Result<usize, InsertRepoFollowError> {
    diesel::insert_into(repo_follows)
        .values(new)
        .on_conflict((follower_github_login, repo_full_name))
        .do_nothing()
        .execute(conn)
        .map_err(|source| InsertRepoFollowError::InsertRepoFollow { source })
}

pub fn delete_repo_follow(conn: &mut PgConnection, follower: &str, repo: &str) -> QueryResult<usize> {
    diesel::delete(
        repo_follows
            .filter(follower_github_login.eq(follower))
            .filter(repo_full_name.eq(repo)),
    )
    .execute(conn)
}
