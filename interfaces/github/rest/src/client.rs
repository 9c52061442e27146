use chrono::DateTime;
use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::error;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const USER_AGENT: &str = "GitLinkr";

/// Thin handle over the REST API. Cheap to clone; the token is passed per call
/// because it comes from the caller's `Authorization` header.
#[derive(Debug, Clone)]
pub struct GitHubApi {
    client: Client,
    api_url: String,
}

impl GitHubApi {
    pub fn new(client: Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into();
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub(crate) fn get(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        let request = self
            .client
            .get(format!("{}{}", self.api_url, path))
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT, "application/vnd.github+json");

        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, GitHubRequestError> {
        let response = request
            .send()
            .await
            .map_err(|source| GitHubRequestError::RequestSend { source })?;

        let status = response.status();

        if !status.is_success() {
            let rate_limit_reset = response
                .headers()
                .get("x-ratelimit-reset")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<i64>().ok())
                .and_then(|secs| DateTime::from_timestamp(secs, 0));

            let body = response.text().await.unwrap_or_default();

            if let (StatusCode::FORBIDDEN, Some(reset_at)) = (status, rate_limit_reset) {
                error!(reset_at = %reset_at.to_rfc3339(), "GitHub rate limit exceeded");
            }

            return Err(GitHubRequestError::UnexpectedStatus { status, body });
        }

        let body = response
            .text()
            .await
            .map_err(|source| GitHubRequestError::ResponseRead { source })?;

        serde_json::from_str(&body)
            .map_err(|source| GitHubRequestError::DeserializeResponseBody { source })
    }
}

#[derive(Debug, Error)]
pub enum GitHubRequestError {
    #[error("RequestSend: {source}")]
    RequestSend { source: reqwest::Error },

    #[error("ResponseRead: {source}")]
    ResponseRead { source: reqwest::Error },

    #[error("UnexpectedStatus: {status}")]
    UnexpectedStatus { status: StatusCode, body: String },

    #[error("DeserializeResponseBody: {source}")]
    DeserializeResponseBody { source: serde_json::Error },
}

impl GitHubRequestError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GitHubRequestError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
