use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::db::schema::connections;

pub const PENDING: &str = "pending";
pub const ACCEPTED: &str = "accepted";
pub const DECLINED: &str = "declined";

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = connections)]
pub struct Connection {
    pub id: Uuid,
    pub requester_github_login: String,
    pub recipient_github_login: String,
    pub status: String,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = connections)]
pub struct NewConnection<'a> {
    pub requester_github_login: &'a str,
    pub recipient_github_login: &'a str,
    pub message: Option<&'a str>,
    pub status: &'a str,
}
