use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use thiserror::Error;

use crate::db::{post::models::*, schema::posts::dsl::*, DbError};

pub fn list_by_author(conn: &mut PgConnection, author: &str) -> QueryResult<Vec<Post>> {
    posts
        .filter(author_github_login.eq(author))
        .order(created_at.desc())
        .select(Post::as_select())
        .load(conn)
}

pub fn list_recent_by_authors(conn: &mut PgConnection, authors: &[String], limit: i64) -> QueryResult<Vec<Post>> {
    posts
        .filter(author_github_login.eq_any(authors))
        .order(created_at.desc())
        .limit(limit)
        .select(Post::as_select())
        .load(conn)
}

#[derive(Debug, Error)]
pub enum InsertPostsError {
    #[error("InsertPosts: {source}")]
    InsertPosts {
        #[from]
        source: diesel::result::Error,
    },
}

impl From<InsertPostsError> for DbError {
    fn from(err: InsertPostsError) -> Self {
        let InsertPostsError::InsertPosts { source } = err;
        DbError::Write {
            operation: "InsertPosts",
            source,
        }
    }
}

pub fn insert_posts(conn: &mut PgConnection, rows: &[NewPost]) -> Result<Vec<Post>, InsertPostsError> {
    diesel::insert_into(posts)
        .values(rows)
        .returning(Post::as_returning())
        .get_results(conn)
        .map_err(|source| InsertPostsError::InsertPosts { source })
}

/// Post count per author since `since`, busiest first.
pub fn post_counts_since(
    conn: &mut PgConnection,
    since: DateTime<Utc>,
    limit: i64,
) -> QueryResult<Vec<(String, i64)>> {
    posts
        .filter(created_at.ge(since))
        .group_by(author_github_login)
        .select((author_github_login, count_star()))
        .order((count_star().desc(), author_github_login.asc()))
        .limit(limit)
        .load(conn)
}
