//! One router per REST resource, merged by [`crate::app`].

pub mod apify;
pub mod auth;
pub mod connections;
pub mod feed;
pub mod follows;
pub mod invitations;
pub mod linkedin_data;
pub mod people;
pub mod posts;
pub mod products;
pub mod profile;
pub mod profiles;
pub mod reactions;
pub mod recommendations;
pub mod repo_follows;
pub mod search;
pub mod service;
pub mod stories;

use diesel::PgConnection;

use crate::db::{self, DbError};
use crate::error::ApiError;
use crate::state::State;

/// Runs `f` on a pooled connection; any failure becomes `context`.
pub(crate) async fn query<F, T, E>(state: &State, context: &'static str, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    DbError: From<E>,
{
    db::interact(state.pool(), f)
        .await
        .map_err(ApiError::database(context))
}

/// `Some` only for a non-blank string.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
