//! Minimal OpenAI-compatible chat completions client.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Clone)]
pub struct ChatRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatClient {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Trimmed content of the first choice; `None` when it is missing or blank.
    pub async fn complete(&self, request: ChatRequest<'_>) -> Result<Option<String>, ChatError> {
        let body = CompletionBody {
            model: &self.model,
            messages: [
                Message {
                    role: "system",
                    content: request.system,
                },
                Message {
                    role: "user",
                    content: request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|source| ChatError::RequestSend { source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::UnexpectedStatus { status, body });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|source| ChatError::ResponseRead { source })?;

        Ok(first_content(completion))
    }
}

fn first_content(completion: CompletionResponse) -> Option<String> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("RequestSend: {source}")]
    RequestSend { source: reqwest::Error },

    #[error("ResponseRead: {source}")]
    ResponseRead { source: reqwest::Error },

    #[error("UnexpectedStatus: {status}")]
    UnexpectedStatus { status: StatusCode, body: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Option<String> {
        first_content(serde_json::from_str(raw).unwrap())
    }

    #[test]
    fn takes_trimmed_first_choice() {
        let raw = r#"{"choices":[{"message":{"content":"  Cuts p99 latency in half. \n"}},{"message":{"content":"other"}}]}"#;
        assert_eq!(parse(raw).as_deref(), Some("Cuts p99 latency in half."));
    }

    #[test]
    fn blank_or_missing_content_is_none() {
        assert_eq!(parse(r#"{"choices":[]}"#), None);
        assert_eq!(parse(r#"{"choices":[{"message":{"content":"   "}}]}"#), None);
        assert_eq!(parse(r#"{}"#), None);
    }
}
