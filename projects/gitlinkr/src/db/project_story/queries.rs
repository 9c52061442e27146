use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use thiserror::Error;

use crate::db::{project_story::models::*, schema::project_stories::dsl::*, DbError};

/// Stories of `user` still valid at `now`, latest period first.
pub fn list_fresh(
    conn: &mut PgConnection,
    user: &str,
    now: DateTime<Utc>,
    limit: i64,
) -> QueryResult<Vec<ProjectStory>> {
    project_stories
        .filter(username.eq(user))
        .filter(expires_at.gt(now))
        .order(period_end.desc())
        .limit(limit)
        .select(ProjectStory::as_select())
        .load(conn)
}

#[derive(Debug, Error)]
pub enum UpsertStoriesError {
    #[error("UpsertStories: {source}")]
    UpsertStories {
        #[from]
        source: diesel::result::Error,
    },
}

impl From<UpsertStoriesError> for DbError {
    fn from(err: UpsertStoriesError) -> Self {
        let UpsertStoriesError::UpsertStories { source } = err;
        DbError::Write {
            operation: "UpsertStories",
            source,
        }
    }
}

pub fn upsert_stories(conn: &mut PgConnection, rows: &[NewProjectStory]) -> Result<usize, UpsertStoriesError> {
    diesel::insert_into(project_stories)
        .values(rows)
        .on_conflict((username, repo, period_end))
        .do_update()
        .set((
            period_start.eq(excluded(period_start)),
            headline.eq(excluded(headline)),
            bullets.eq(excluded(bullets)),
            next_steps.eq(excluded(next_steps)),
            context_hash.eq(excluded(context_hash)),
            expires_at.eq(excluded(expires_at)),
        ))
        .execute(conn)
        .map_err(|source| UpsertStoriesError::UpsertStories { source })
}
