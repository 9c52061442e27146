//! Proxy for the LinkedIn data API published on RapidAPI.

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "linkedin-data-api.p.rapidapi.com";

#[derive(Debug, Clone)]
pub struct LinkedInDataApi {
    client: Client,
    key: String,
    host: String,
    base_url: String,
}

/// Upstream answer, relayed as-is by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReply {
    pub status: StatusCode,
    pub body: ReplyBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    Json(Value),
    Text(String),
}

impl RawReply {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// JSON bodies pass through, anything else is wrapped as `{ "raw": text }`.
    pub fn into_json(self) -> Value {
        match self.body {
            ReplyBody::Json(value) => value,
            ReplyBody::Text(text) => serde_json::json!({ "raw": text }),
        }
    }
}

impl LinkedInDataApi {
    pub fn new(client: Client, key: impl Into<String>, host: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            client,
            key: key.into(),
            base_url: format!("https://{host}"),
            host,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub async fn company_by_domain(&self, domain: &str) -> Result<RawReply, RapidApiError> {
        self.get("/get-company-by-domain", &[("domain", domain)]).await
    }

    pub async fn profile(&self, profile_url: &str) -> Result<RawReply, RapidApiError> {
        self.get("/get-profile", &[("profile_url", profile_url)]).await
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<RawReply, RapidApiError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .header("x-rapidapi-key", &self.key)
            .header("x-rapidapi-host", &self.host)
            .send()
            .await
            .map_err(|source| RapidApiError::RequestSend { source })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| RapidApiError::ResponseRead { source })?;

        Ok(RawReply {
            status,
            body: parse_body(text),
        })
    }
}

fn parse_body(text: String) -> ReplyBody {
    match serde_json::from_str(&text) {
        Ok(value) => ReplyBody::Json(value),
        Err(_) => ReplyBody::Text(text),
    }
}

#[derive(Debug, Error)]
pub enum RapidApiError {
    #[error("RequestSend: {source}")]
    RequestSend { source: reqwest::Error },

    #[error("ResponseRead: {source}")]
    ResponseRead { source: reqwest::Error },
}
