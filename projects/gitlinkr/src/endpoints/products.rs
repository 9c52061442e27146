use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::db::product::{
    models::{NewProduct, Product, ProductChanges},
    queries,
};
use crate::endpoints::{non_blank, query};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list).post(create))
        .route("/api/products/{id}", get(fetch).put(update).delete(remove))
        .route("/api/products/{id}/revenue/manual", post(set_mrr))
}

#[derive(Deserialize)]
pub struct CreateProduct {
    owner: Option<String>,
    name: Option<String>,
    tagline: Option<String>,
    repo_url: Option<String>,
    website: Option<String>,
    mrr_usd: Option<f64>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    owner: Option<String>,
}

/// Only these columns can change; a key set to `null` clears the column.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProduct {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    tagline: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    repo_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    website: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    mrr_usd: Option<Option<f64>>,
}

#[derive(Deserialize)]
pub struct ManualRevenue {
    mrr_usd: Option<f64>,
}

/// Distinguishes an explicit `null` (`Some(None)`) from a missing key (`None`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateProduct {
    fn into_changes(self) -> Option<ProductChanges> {
        let changes = ProductChanges {
            name: self.name,
            tagline: self.tagline,
            repo_url: self.repo_url,
            website: self.website,
            mrr_usd: self.mrr_usd,
            updated_at: None,
        };
        let touched = changes.name.is_some()
            || changes.tagline.is_some()
            || changes.repo_url.is_some()
            || changes.website.is_some()
            || changes.mrr_usd.is_some();

        touched.then(|| ProductChanges {
            updated_at: Some(Utc::now()),
            ..changes
        })
    }
}

fn product_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("Product not found"))
}

async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let (Some(owner), Some(name)) = (non_blank(body.owner), non_blank(body.name)) else {
        return Err(ApiError::bad_request("owner and name are required"));
    };
    let new = NewProduct {
        owner_github_login: owner,
        name,
        tagline: body.tagline,
        repo_url: body.repo_url,
        website: body.website,
        mrr_usd: body.mrr_usd,
    };

    let product = query(&state, "Failed to create product", move |conn| {
        queries::insert_product(conn, &new)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn list(State(state): State<AppState>, Query(params): Query<ListQuery>) -> Result<Json<Vec<Product>>, ApiError> {
    let owner = non_blank(params.owner);
    let rows = query(&state, "Failed to list products", move |conn| {
        queries::list_products(conn, owner.as_deref())
    })
    .await?;
    Ok(Json(rows))
}

async fn fetch(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>, ApiError> {
    let id = product_id(&id)?;
    query(&state, "Failed to fetch product", move |conn| queries::get_product(conn, id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product not found"))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateProduct>,
) -> Result<Json<Product>, ApiError> {
    let changes = body
        .into_changes()
        .ok_or_else(|| ApiError::bad_request("No updatable fields provided"))?;
    let id = product_id(&id)?;

    query(&state, "Failed to update product", move |conn| {
        queries::update_product(conn, id, &changes)
    })
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::not_found("Product not found"))
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let id = product_id(&id)?;
    query(&state, "Failed to delete product", move |conn| queries::delete_product(conn, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_mrr(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ManualRevenue>,
) -> Result<Json<Product>, ApiError> {
    let id = product_id(&id)?;
    let changes = ProductChanges {
        mrr_usd: Some(body.mrr_usd),
        updated_at: Some(Utc::now()),
        ..ProductChanges::default()
    };

    query(&state, "Failed to update MRR", move |conn| {
        queries::update_product(conn, id, &changes)
    })
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::not_found("Product not found"))
}
