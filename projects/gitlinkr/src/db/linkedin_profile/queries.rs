use diesel::prelude::*;
use thiserror::Error;

use crate::db::{linkedin_profile::models::*, schema::linkedin_profiles::dsl::*, DbError};

pub fn get_linkedin_profile(conn: &mut PgConnection, login: &str) -> QueryResult<Option<LinkedInProfile>> {
    linkedin_profiles
        .find(login)
        .select(LinkedInProfile::as_select())
        .first(conn)
        .optional()
}

#[derive(Debug, Error)]
pub enum UpsertLinkedInProfileError {
    #[error("UpsertLinkedInProfile: {source}")]
    UpsertLinkedInProfile {
        #[from]
        source: diesel::result::Error,
    },
}

impl From<UpsertLinkedInProfileError> for DbError {
    fn from(err: UpsertLinkedInProfileError) -> Self {
        let UpsertLinkedInProfileError::UpsertLinkedInProfile { source } = err;
        DbError::Write {
            operation: "UpsertLinkedInProfile",
            source,
        }
    }
}

pub fn upsert_linkedin_profile(
    conn: &mut PgConnection,
    row: &LinkedInProfileUpsert,
) -> Result<LinkedInProfile, UpsertLinkedInProfileError> {
    diesel::insert_into(linkedin_profiles)
        .values(row)
        .on_conflict(github_login)
        .do_update()
        .set(row)
        .returning(LinkedInProfile::as_returning())
        .get_result(conn)
        .map_err(|source| UpsertLinkedInProfileError::UpsertLinkedInProfile { source })
}

pub fn delete_linkedin_profile(conn: &mut PgConnection, login: &str) -> QueryResult<usize> {
    diesel::delete(linkedin_profiles.find(login)).execute(conn)
}
