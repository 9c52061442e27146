use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use urlencoding::encode;
use uuid::Uuid;

use crate::db::invitation::{
    models::{Invitation, NewInvitation, SENT},
    queries,
};
use crate::endpoints::{non_blank, query};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/invitations/mine", get(mine))
        .route("/api/invitations/create", post(create))
        .route("/api/invitations/accept", post(accept))
}

#[derive(Deserialize)]
pub struct MineQuery {
    inviter: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitations {
    inviter: Option<String>,
    #[serde(default)]
    emails: Vec<String>,
    #[serde(default)]
    github_usernames: Vec<String>,
}

#[derive(Deserialize)]
pub struct AcceptInvitation {
    code: Option<String>,
    acceptor: Option<String>,
}

#[derive(Serialize)]
pub struct SentInvitation {
    #[serde(flatten)]
    invitation: Invitation,
    link: String,
}

async fn mine(State(state): State<AppState>, Query(params): Query<MineQuery>) -> Result<Json<Vec<Invitation>>, ApiError> {
    let inviter = non_blank(params.inviter).ok_or_else(|| ApiError::bad_request("inviter query required"))?;
    let rows = query(&state, "Failed to list invitations", move |conn| {
        queries::list_by_inviter(conn, &inviter)
    })
    .await?;
    Ok(Json(rows))
}

/// One row per non-blank email or GitHub login, each with its own code.
fn invitation_rows(inviter: &str, emails: Vec<String>, logins: Vec<String>) -> Vec<NewInvitation> {
    let row = |email: Option<String>, login: Option<String>| NewInvitation {
        id: Uuid::new_v4(),
        code: Uuid::new_v4().to_string(),
        inviter_github_login: inviter.to_string(),
        invitee_email: email,
        invitee_github_login: login,
        status: SENT.to_string(),
    };

    let by_email = emails
        .into_iter()
        .filter_map(|email| non_blank(Some(email)))
        .map(|email| row(Some(email), None));
    let by_login = logins
        .into_iter()
        .filter_map(|login| non_blank(Some(login)))
        .map(|login| row(None, Some(login)));

    by_email.chain(by_login).collect()
}

async fn create(State(state): State<AppState>, Json(body): Json<CreateInvitations>) -> Result<Response, ApiError> {
    let inviter = non_blank(body.inviter).ok_or_else(|| ApiError::bad_request("inviter is required"))?;

    let rows = invitation_rows(&inviter, body.emails, body.github_usernames);
    if rows.is_empty() {
        return Ok(Json(Vec::<SentInvitation>::new()).into_response());
    }

    let inserted = query(&state, "Failed to create invitations", move |conn| {
        queries::insert_invitations(conn, &rows)
    })
    .await?;

    let frontend = state.config.frontend_url.trim_end_matches('/');
    let sent: Vec<SentInvitation> = inserted
        .into_iter()
        .map(|invitation| SentInvitation {
            link: format!("{frontend}/login?invite={}", encode(&invitation.code)),
            invitation,
        })
        .collect();

    Ok((StatusCode::CREATED, Json(sent)).into_response())
}

async fn accept(State(state): State<AppState>, Json(body): Json<AcceptInvitation>) -> Result<Response, ApiError> {
    let code = non_blank(body.code).ok_or_else(|| ApiError::bad_request("code is required"))?;

    let accepted = query(&state, "Failed to accept invitation", move |conn| {
        queries::accept_invitation(conn, &code, Utc::now())
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Invitation not found"))?;

    Ok(Json(json!({ "ok": true, "invitation": accepted, "acceptor": body.acceptor })).into_response())
}
