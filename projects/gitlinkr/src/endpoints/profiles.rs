//! Profile data the user edits or links themselves, keyed by GitHub login.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::db::custom_profile::{
    models::{CustomProfile, CustomProfileUpsert},
    queries as custom,
};
use crate::db::linkedin_profile::{
    models::{LinkedInProfile, LinkedInProfileUpsert},
    queries as linkedin,
};
use crate::endpoints::{non_blank, query};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/custom-profiles/{login}", get(get_custom).put(put_custom))
        .route(
            "/api/linkedin-profiles/{login}",
            get(get_linkedin).put(put_linkedin).delete(delete_linkedin),
        )
}

#[derive(Deserialize)]
pub struct CustomProfileBody {
    display_name: Option<String>,
    bio: Option<String>,
    location: Option<String>,
    website: Option<String>,
}

#[derive(Deserialize)]
pub struct LinkedInProfileBody {
    linkedin_id: Option<String>,
    vanity_name: Option<String>,
    full_name: Option<String>,
    headline: Option<String>,
    email: Option<String>,
    picture_url: Option<String>,
    profile_url: Option<String>,
    raw: Option<Value>,
}

async fn get_custom(State(state): State<AppState>, Path(login): Path<String>) -> Result<Json<CustomProfile>, ApiError> {
    query(&state, "Failed to fetch custom profile", move |conn| {
        custom::get_custom_profile(conn, &login)
    })
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::not_found("Custom profile not found"))
}

/// Replaces every field; omitted fields are cleared.
async fn put_custom(
    State(state): State<AppState>,
    Path(login): Path<String>,
    Json(body): Json<CustomProfileBody>,
) -> Result<Json<CustomProfile>, ApiError> {
    let row = CustomProfileUpsert {
        github_login: login,
        display_name: non_blank(body.display_name),
        bio: non_blank(body.bio),
        location: non_blank(body.location),
        website: non_blank(body.website),
        updated_at: Utc::now(),
    };
    let saved = query(&state, "Failed to save custom profile", move |conn| {
        custom::upsert_custom_profile(conn, &row)
    })
    .await?;
    Ok(Json(saved))
}

async fn get_linkedin(State(state): State<AppState>, Path(login): Path<String>) -> Result<Json<LinkedInProfile>, ApiError> {
    query(&state, "Failed to fetch LinkedIn profile", move |conn| {
        linkedin::get_linkedin_profile(conn, &login)
    })
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::not_found("LinkedIn profile not found"))
}

async fn put_linkedin(
    State(state): State<AppState>,
    Path(login): Path<String>,
    Json(body): Json<LinkedInProfileBody>,
) -> Result<Json<LinkedInProfile>, ApiError> {
    let row = LinkedInProfileUpsert {
        github_login: login,
        linkedin_id: non_blank(body.linkedin_id),
        vanity_name: non_blank(body.vanity_name),
        full_name: non_blank(body.full_name),
        headline: non_blank(body.headline),
        email: non_blank(body.email),
        picture_url: non_blank(body.picture_url),
        profile_url: non_blank(body.profile_url),
        raw: body.raw,
        updated_at: Utc::now(),
    };
    let saved = query(&state, "Failed to save LinkedIn profile", move |conn| {
        linkedin::upsert_linkedin_profile(conn, &row)
    })
    .await?;
    Ok(Json(saved))
}

async fn delete_linkedin(State(state): State<AppState>, Path(login): Path<String>) -> Result<StatusCode, ApiError> {
    query(&state, "Failed to delete LinkedIn profile", move |conn| {
        linkedin::delete_linkedin_profile(conn, &login)
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
