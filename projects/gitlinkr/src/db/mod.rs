pub mod schema;
pub mod connection;
pub mod custom_profile;
pub mod follow;
pub mod invitation;
pub mod linkedin_profile;
pub mod post;
pub mod product;
pub mod project_story;
pub mod reaction;
pub mod repo_follow;

use std::time::Duration;

use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::PgConnection;
use thiserror::Error;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds the pool without opening a connection, so the server starts even
/// when Postgres is down. Checkouts give up after five seconds.
pub fn connect(database_url: &str) -> PgPool {
    Pool::builder()
        .connection_timeout(Duration::from_secs(5))
        .build_unchecked(ConnectionManager::new(database_url))
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database not configured")]
    NotConfigured,

    #[error("GetConnectionFromPool: {source}")]
    GetConnectionFromPool {
        #[from]
        source: r2d2::Error,
    },

    #[error("Query: {source}")]
    Query {
        #[from]
        source: DieselError,
    },

    /// A failed insert or update, named after its statement.
    #[error("{operation}: {source}")]
    Write {
        operation: &'static str,
        #[source]
        source: DieselError,
    },

    #[error("Join: {source}")]
    Join {
        #[from]
        source: tokio::task::JoinError,
    },
}

impl DbError {
    /// A UNIQUE constraint rejected the row.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            DbError::Query {
                source: DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
            } | DbError::Write {
                source: DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _),
                ..
            }
        )
    }
}

/// Runs a blocking diesel closure on the blocking pool with a pooled connection.
/// The closure may fail with a bare diesel error or a per-statement error.
pub async fn interact<F, T, E>(pool: Option<&PgPool>, f: F) -> Result<T, DbError>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    DbError: From<E>,
{
    let pool = pool.ok_or(DbError::NotConfigured)?.clone();

    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get()?;
        f(&mut conn).map_err(DbError::from)
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique(message: &str) -> DieselError {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, Box::new(message.to_string()))
    }

    #[test]
    fn unique_violations_are_recognised_on_reads_and_writes() {
        assert!(DbError::Query { source: unique("dup") }.is_unique_violation());
        assert!(DbError::Write {
            operation: "InsertConnection",
            source: unique("dup"),
        }
        .is_unique_violation());
        assert!(!DbError::Query {
            source: DieselError::NotFound
        }
        .is_unique_violation());
        assert!(!DbError::NotConfigured.is_unique_violation());
    }

    #[test]
    fn write_errors_name_their_statement() {
        let err = DbError::Write {
            operation: "InsertPosts",
            source: DieselError::NotFound,
        };
        assert!(err.to_string().starts_with("InsertPosts: "));
    }
}
