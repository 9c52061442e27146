//! Apify actor runs: start, poll until terminal, read the default dataset.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};
use urlencoding::encode;

pub const DEFAULT_BASE_URL: &str = "https://api.apify.com/v2";
pub const DEFAULT_ACTOR: &str = "apimaestro~linkedin-profile-search-scraper";

const TERMINAL_STATUSES: [&str; 4] = ["SUCCEEDED", "FAILED", "ABORTED", "TIMED-OUT"];

#[derive(Debug, Clone)]
pub struct ApifyClient {
    client: Client,
    base_url: String,
    token: String,
    actor: String,
}

/// Status and body of a relayed call. Bodies that are not JSON are kept as a
/// JSON string.
#[derive(Debug, Clone, PartialEq)]
pub struct ApifyReply {
    pub status: StatusCode,
    pub body: Value,
}

impl ApifyReply {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PollOptions {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            interval: Duration::from_millis(1500),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActorRun {
    /// Run accepted, caller did not ask to wait.
    Started { run_id: Option<String>, start: Value },
    /// Terminal without usable results (non-success status or no dataset).
    Finished { run_id: String, status: String, run: Value },
    Succeeded {
        run_id: String,
        status: String,
        run: Value,
        items: Value,
    },
    PollTimeout { run_id: String },
}

impl ActorRun {
    pub fn status(&self) -> &str {
        match self {
            ActorRun::Started { .. } => "STARTED",
            ActorRun::Finished { status, .. } | ActorRun::Succeeded { status, .. } => status,
            ActorRun::PollTimeout { .. } => "POLL_TIMEOUT",
        }
    }

    pub fn run_id(&self) -> Option<&str> {
        match self {
            ActorRun::Started { run_id, .. } => run_id.as_deref(),
            ActorRun::Finished { run_id, .. }
            | ActorRun::Succeeded { run_id, .. }
            | ActorRun::PollTimeout { run_id } => Some(run_id),
        }
    }

    pub fn items(&self) -> &[Value] {
        match self {
            ActorRun::Succeeded {
                items: Value::Array(items),
                ..
            } => items,
            _ => &[],
        }
    }
}

impl ApifyClient {
    pub fn new(client: Client, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            token: token.into(),
            actor: DEFAULT_ACTOR.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    pub async fn list_runs(&self, limit: u32) -> Result<ApifyReply, ApifyError> {
        let limit = limit.to_string();
        let request = self
            .client
            .get(self.url(&format!("/acts/{}/runs", self.actor)))
            .query(&[("token", self.token.as_str()), ("limit", limit.as_str())]);
        self.send(request).await
    }

    pub async fn start_run(&self, input: &Value) -> Result<ApifyReply, ApifyError> {
        let request = self
            .client
            .post(self.url(&format!("/acts/{}/runs", self.actor)))
            .query(&[("token", self.token.as_str())])
            .json(input);
        self.send(request).await
    }

    pub async fn get_run(&self, run_id: &str) -> Result<ApifyReply, ApifyError> {
        let request = self
            .client
            .get(self.url(&format!("/actor-runs/{}", encode(run_id))))
            .query(&[("token", self.token.as_str())]);
        self.send(request).await
    }

    pub async fn dataset_items(&self, dataset_id: &str) -> Result<ApifyReply, ApifyError> {
        let request = self
            .client
            .get(self.url(&format!("/datasets/{}/items", encode(dataset_id))))
            .query(&[("token", self.token.as_str())]);
        self.send(request).await
    }

    /// Starts the actor with `input`. With `wait`, polls the run until it
    /// reaches a terminal status or the deadline passes, then reads the
    /// dataset of a successful run. A dataset error body is passed through
    /// as the items. Dropping the future stops the polling.
    pub async fn run_actor(
        &self,
        input: &Value,
        wait: Option<PollOptions>,
    ) -> Result<ActorRun, ApifyError> {
        let start = into_success(self.start_run(input).await?)?;

        let Some(options) = wait else {
            return Ok(ActorRun::Started {
                run_id: envelope_str(&start, "id").map(str::to_string),
                start,
            });
        };

        let run_id = envelope_str(&start, "id")
            .map(str::to_string)
            .ok_or(ApifyError::MissingRunId)?;
        info!(run_id, actor = %self.actor, "Apify run started");

        let deadline = Instant::now() + options.timeout;
        while Instant::now() < deadline {
            let run = into_success(self.get_run(&run_id).await?)?;
            let status = envelope_str(&run, "status").unwrap_or("RUNNING").to_string();
            debug!(run_id, status, "Apify run polled");

            if TERMINAL_STATUSES.contains(&status.as_str()) {
                let dataset_id = envelope_str(&run, "defaultDatasetId").map(str::to_string);
                return match dataset_id {
                    Some(dataset_id) if status == "SUCCEEDED" => {
                        let dataset = self.dataset_items(&dataset_id).await?;
                        if !dataset.is_success() {
                            warn!(run_id, dataset_id, status = %dataset.status, "Apify dataset read failed");
                        }
                        Ok(ActorRun::Succeeded {
                            run_id,
                            status,
                            run,
                            items: dataset.body,
                        })
                    }
                    _ => Ok(ActorRun::Finished { run_id, status, run }),
                };
            }

            sleep(options.interval).await;
        }

        info!(run_id, "Apify run still running at poll deadline");
        Ok(ActorRun::PollTimeout { run_id })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<ApifyReply, ApifyError> {
        let response = request
            .send()
            .await
            .map_err(|source| ApifyError::RequestSend { source })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| ApifyError::ResponseRead { source })?;

        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok(ApifyReply { status, body })
    }
}

fn into_success(reply: ApifyReply) -> Result<Value, ApifyError> {
    if reply.is_success() {
        Ok(reply.body)
    } else {
        Err(ApifyError::Upstream {
            status: reply.status,
            body: reply.body,
        })
    }
}

/// Apify wraps most payloads in `{ "data": { .. } }`; some replies are flat.
pub fn envelope_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get("data")
        .and_then(|data| data.get(key))
        .and_then(Value::as_str)
        .or_else(|| value.get(key).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Error)]
pub enum ApifyError {
    #[error("RequestSend: {source}")]
    RequestSend { source: reqwest::Error },

    #[error("ResponseRead: {source}")]
    ResponseRead { source: reqwest::Error },

    #[error("Apify answered {status}")]
    Upstream { status: StatusCode, body: Value },

    #[error("Missing run id from Apify")]
    MissingRunId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_enveloped_and_flat_fields() {
        assert_eq!(envelope_str(&json!({ "data": { "id": "r1" } }), "id"), Some("r1"));
        assert_eq!(envelope_str(&json!({ "id": "r2" }), "id"), Some("r2"));
        assert_eq!(envelope_str(&json!({ "data": { "id": "" } }), "id"), None);
        assert_eq!(envelope_str(&json!({ "data": {} }), "status"), None);
    }

    #[test]
    fn status_labels() {
        let timeout = ActorRun::PollTimeout { run_id: "r".into() };
        assert_eq!(timeout.status(), "POLL_TIMEOUT");
        assert_eq!(timeout.run_id(), Some("r"));
        assert!(timeout.items().is_empty());

        let started = ActorRun::Started {
            run_id: None,
            start: json!({}),
        };
        assert_eq!(started.status(), "STARTED");
    }
}
