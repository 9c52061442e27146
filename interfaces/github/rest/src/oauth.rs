use reqwest::{header, Client};
use serde::Deserialize;
use thiserror::Error;
use urlencoding::encode;

pub const DEFAULT_WEB_URL: &str = "https://github.com";
pub const SCOPE: &str = "read:user user:email repo";

/// Registered OAuth app credentials.
#[derive(Debug, Clone)]
pub struct GitHubOAuthApp {
    client: Client,
    web_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl GitHubOAuthApp {
    pub fn new(
        client: Client,
        web_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        let web_url = web_url.into();
        Self {
            client,
            web_url: web_url.trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Consent screen URL for step one of the flow.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}/login/oauth/authorize?client_id={}&redirect_uri={}&scope={}",
            self.web_url,
            encode(&self.client_id),
            encode(&self.redirect_uri),
            encode(SCOPE),
        )
    }

    pub async fn exchange_code_for_token(&self, code: &str) -> Result<String, OAuthExchangeError> {
        let payload = serde_json::json!({
            "client_id": self.client_id,
            "client_secret": self.client_secret,
            "code": code,
            "redirect_uri": self.redirect_uri,
        });

        let response = self
            .client
            .post(format!("{}/login/oauth/access_token", self.web_url))
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, crate::client::USER_AGENT)
            .json(&payload)
            .send()
            .await
            .map_err(|source| OAuthExchangeError::RequestSend { source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(OAuthExchangeError::Rejected {
                reason: format!("token endpoint answered {status}"),
            });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|source| OAuthExchangeError::ResponseRead { source })?;

        match body.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(OAuthExchangeError::Rejected {
                reason: body
                    .error_description
                    .or(body.error)
                    .unwrap_or_else(|| "no access_token in response".to_string()),
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum OAuthExchangeError {
    #[error("RequestSend: {source}")]
    RequestSend { source: reqwest::Error },

    #[error("ResponseRead: {source}")]
    ResponseRead { source: reqwest::Error },

    #[error("GitHub token exchange failed: {reason}")]
    Rejected { reason: String },
}
