use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use serde_json::Value;

use crate::db::schema::linkedin_profiles;

/// LinkedIn identity linked to a GitHub login.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = linkedin_profiles, primary_key(github_login))]
pub struct LinkedInProfile {
    pub github_login: String,
    pub linkedin_id: Option<String>,
    pub vanity_name: Option<String>,
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub email: Option<String>,
    pub picture_url: Option<String>,
    pub profile_url: Option<String>,
    pub raw: Option<Value>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = linkedin_profiles, primary_key(github_login), treat_none_as_null = true)]
pub struct LinkedInProfileUpsert {
    pub github_login: String,
    pub linkedin_id: Option<String>,
    pub vanity_name: Option<String>,
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub email: Option<String>,
    pub picture_url: Option<String>,
    pub profile_url: Option<String>,
    pub raw: Option<Value>,
    pub updated_at: DateTime<Utc>,
}
