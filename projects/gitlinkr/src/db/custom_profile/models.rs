use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema::custom_profiles;

/// Display overrides a user sets on top of their GitHub profile.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = custom_profiles, primary_key(github_login))]
pub struct CustomProfile {
    pub github_login: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = custom_profiles, primary_key(github_login), treat_none_as_null = true)]
pub struct CustomProfileUpsert {
    pub github_login: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub updated_at: DateTime<Utc>,
}
