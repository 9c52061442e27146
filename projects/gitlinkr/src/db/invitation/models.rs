use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::db::schema::invitations;

pub const SENT: &str = "sent";
pub const ACCEPTED: &str = "accepted";

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = invitations)]
pub struct Invitation {
    pub id: Uuid,
    pub code: String,
    pub inviter_github_login: String,
    pub invitee_email: Option<String>,
    pub invitee_github_login: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = invitations)]
pub struct NewInvitation {
    pub id: Uuid,
    pub code: String,
    pub inviter_github_login: String,
    pub invitee_email: Option<String>,
    pub invitee_github_login: Option<String>,
    pub status: String,
}
