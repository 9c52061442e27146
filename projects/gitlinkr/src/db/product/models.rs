use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::db::schema::products;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = products)]
pub struct Product {
    pub id: Uuid,
    pub owner_github_login: String,
    pub name: String,
    pub tagline: Option<String>,
    pub repo_url: Option<String>,
    pub website: Option<String>,
    pub mrr_usd: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = products)]
pub struct NewProduct {
    pub owner_github_login: String,
    pub name: String,
    pub tagline: Option<String>,
    pub repo_url: Option<String>,
    pub website: Option<String>,
    pub mrr_usd: Option<f64>,
}

/// Outer `None` leaves a column untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub tagline: Option<Option<String>>,
    pub repo_url: Option<Option<String>>,
    pub website: Option<Option<String>>,
    pub mrr_usd: Option<Option<f64>>,
    pub updated_at: Option<DateTime<Utc>>,
}
