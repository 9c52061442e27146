use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::connection::{
    models::{Connection, NewConnection, ACCEPTED, DECLINED, PENDING},
    queries,
};
use crate::db::{self, DbError};
use crate::endpoints::{non_blank, query};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/connections", post(create))
        // `{key}` is a login for GET and a connection id for PUT.
        .route("/api/connections/{key}", get(list).put(update_status))
        .route("/api/connections/{key}/pending", get(pending))
}

#[derive(Deserialize)]
pub struct CreateConnection {
    requester: Option<String>,
    recipient: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateConnection {
    status: Option<String>,
    username: Option<String>,
}

async fn list(State(state): State<AppState>, Path(username): Path<String>) -> Result<Json<Vec<Connection>>, ApiError> {
    let rows = query(&state, "Failed to fetch connections", move |conn| {
        queries::list_for_user(conn, &username)
    })
    .await?;
    Ok(Json(rows))
}

async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateConnection>,
) -> Result<(StatusCode, Json<Connection>), ApiError> {
    let (Some(requester), Some(recipient)) = (non_blank(body.requester), non_blank(body.recipient)) else {
        return Err(ApiError::bad_request("Requester and recipient are required"));
    };
    if requester == recipient {
        return Err(ApiError::bad_request("Cannot send connection request to yourself"));
    }
    let message = non_blank(body.message);

    let created = db::interact(state.pool(), move |conn| {
        if queries::find_between(conn, &requester, &recipient)?.is_some() {
            return Ok(None);
        }
        let new = NewConnection {
            requester_github_login: &requester,
            recipient_github_login: &recipient,
            message: message.as_deref(),
            status: PENDING,
        };
        queries::insert_connection(conn, &new).map(Some)
    })
    .await;

    created_or_duplicate(created).map(|connection| (StatusCode::CREATED, Json(connection)))
}

/// A concurrent duplicate passes the lookup and then trips the UNIQUE pair,
/// so both paths answer the same 400.
fn created_or_duplicate(created: Result<Option<Connection>, DbError>) -> Result<Connection, ApiError> {
    let duplicate = || ApiError::bad_request("Connection request already exists");
    match created {
        Ok(Some(connection)) => Ok(connection),
        Ok(None) => Err(duplicate()),
        Err(err) if err.is_unique_violation() => Err(duplicate()),
        Err(err) => Err(ApiError::database("Failed to send connection request")(err)),
    }
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateConnection>,
) -> Result<Json<Connection>, ApiError> {
    let status = match body.status.as_deref() {
        Some(ACCEPTED) => ACCEPTED,
        Some(DECLINED) => DECLINED,
        _ => return Err(ApiError::bad_request("Status must be \"accepted\" or \"declined\"")),
    };
    let not_found = || ApiError::not_found("Connection request not found or not authorized");

    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    let username = body.username.unwrap_or_default();

    query(&state, "Failed to update connection", move |conn| {
        queries::update_status_as_recipient(conn, id, &username, status)
    })
    .await?
    .map(Json)
    .ok_or_else(not_found)
}

async fn pending(State(state): State<AppState>, Path(username): Path<String>) -> Result<Json<Vec<Connection>>, ApiError> {
    let rows = query(&state, "Failed to fetch pending connections", move |conn| {
        queries::list_pending_for_recipient(conn, &username)
    })
    .await?;
    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    fn unique_violation() -> DbError {
        DbError::Write {
            operation: "InsertConnection",
            source: DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                Box::new("duplicate key value violates unique constraint".to_string()),
            ),
        }
    }

    #[test]
    fn racing_duplicate_is_a_bad_request() {
        let err = created_or_duplicate(Err(unique_violation())).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Connection request already exists");
    }

    #[test]
    fn existing_pair_is_a_bad_request() {
        let err = created_or_duplicate(Ok(None)).unwrap_err();
        assert_eq!(err.to_string(), "Connection request already exists");
    }

    #[test]
    fn other_failures_stay_server_errors() {
        let err = created_or_duplicate(Err(DbError::NotConfigured)).unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
