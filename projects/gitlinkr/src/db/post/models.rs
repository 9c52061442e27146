use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::db::schema::posts;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = posts)]
pub struct Post {
    pub id: Uuid,
    pub author_github_login: String,
    pub title: String,
    pub body: Option<String>,
    pub artifacts: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = posts)]
pub struct NewPost {
    pub author_github_login: String,
    pub title: String,
    pub body: Option<String>,
    pub artifacts: Value,
    pub created_at: Option<DateTime<Utc>>,
}
