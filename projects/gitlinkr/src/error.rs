use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;

use crate::db::DbError;

/// Error type shared by all handlers. Renders `{ "error": .. }` plus
/// `details` when an upstream body or cause is relayed.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    Forbidden { message: String },

    #[error("{message}")]
    NotFound { message: String },

    /// A 500 with a fixed message and no cause to relay.
    #[error("{message}")]
    Server { message: String },

    #[error("{what} not configured")]
    NotConfigured { what: &'static str },

    #[error("{context}: {source}")]
    Database {
        context: &'static str,
        source: DbError,
    },

    #[error("{context}: {details}")]
    Internal {
        context: &'static str,
        details: String,
    },

    /// Non-2xx answer from a proxied API, relayed with its status.
    #[error("{error} ({status})")]
    Upstream {
        status: StatusCode,
        error: &'static str,
        details: Value,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound {
            message: message.into(),
        }
    }

    /// Wraps a database failure; a missing pool keeps its own message.
    pub fn database(context: &'static str) -> impl FnOnce(DbError) -> Self {
        move |source| ApiError::Database { context, source }
    }

    pub fn server(message: impl Into<String>) -> Self {
        ApiError::Server {
            message: message.into(),
        }
    }

    pub fn internal(context: &'static str) -> impl FnOnce(String) -> Self {
        move |details| ApiError::Internal { context, details }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Upstream { status, .. } => *status,
            ApiError::Server { .. }
            | ApiError::NotConfigured { .. }
            | ApiError::Database { .. }
            | ApiError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        }

        let body = match self {
            ApiError::Database {
                source: DbError::NotConfigured,
                ..
            } => json!({ "error": "Database not configured" }),
            ApiError::Database { context, .. } => json!({ "error": context }),
            ApiError::Internal { context, details } => json!({ "error": context, "details": details }),
            ApiError::Upstream { error, details, .. } => json!({ "error": error, "details": details }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
