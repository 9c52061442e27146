use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::db::schema::project_stories;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = project_stories)]
pub struct ProjectStory {
    pub id: Uuid,
    pub username: String,
    pub repo: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub headline: String,
    pub bullets: Value,
    pub next_steps: Option<Value>,
    pub context_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = project_stories)]
pub struct NewProjectStory {
    pub username: String,
    pub repo: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub headline: String,
    pub bullets: Value,
    pub next_steps: Option<Value>,
    pub context_hash: String,
    pub expires_at: DateTime<Utc>,
}
