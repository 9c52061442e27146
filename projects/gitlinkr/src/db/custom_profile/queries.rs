use diesel::prelude::*;
use thiserror::Error;

use crate::db::{custom_profile::models::*, schema::custom_profiles::dsl::*, DbError};

pub fn get_custom_profile(conn: &mut PgConnection, login: &str) -> QueryResult<Option<CustomProfile>> {
    custom_profiles
        .find(login)
        .select(CustomProfile::as_select())
        .first(conn)
        .optional()
}

#[derive(Debug, Error)]
pub enum UpsertCustomProfileError {
    #[error("UpsertCustomProfile: {source}")]
    UpsertCustomProfile {
        #[from]
        source: diesel::result::Error,
    },
}

impl From<UpsertCustomProfileError> for DbError {
    fn from(err: UpsertCustomProfileError) -> Self {
        let UpsertCustomProfileError::UpsertCustomProfile { source } = err;
        DbError::Write {
            operation: "UpsertCustomProfile",
            source,
        }
    }
}

pub fn upsert_custom_profile(conn: &mut PgConnection, row: &CustomProfileUpsert) -> Result<CustomProfile, UpsertCustomProfileError> {
    diesel::insert_into(custom_profiles)
        .values(row)
        .on_conflict(github_login)
        .do_update()
        .set(row)
        .returning(CustomProfile::as_returning())
        .get_result(conn)
        .map_err(|source| UpsertCustomProfileError::UpsertCustomProfile { source })
}
