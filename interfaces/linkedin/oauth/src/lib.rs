//! LinkedIn "Sign In with LinkedIn using OpenID Connect" client.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;
use urlencoding::encode;

pub const DEFAULT_AUTH_URL: &str = "https://www.linkedin.com";
pub const DEFAULT_API_URL: &str = "https://api.linkedin.com";
pub const SCOPE: &str = "openid profile email";

#[derive(Debug, Clone)]
pub struct LinkedInOAuthApp {
    client: Client,
    auth_url: String,
    api_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MeResponse {
    id: Option<String>,
    vanity_name: Option<String>,
    localized_headline: Option<String>,
}

impl LinkedInOAuthApp {
    pub fn new(
        client: Client,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client,
            auth_url: DEFAULT_AUTH_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }

    pub fn with_urls(mut self, auth_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into().trim_end_matches('/').to_string();
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}/oauth/v2/authorization?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}",
            self.auth_url,
            encode(&self.client_id),
            encode(&self.redirect_uri),
            encode(SCOPE),
            encode(state),
        )
    }

    pub async fn exchange_code_for_token(&self, code: &str) -> Result<String, LinkedInError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self
            .client
            .post(format!("{}/oauth/v2/accessToken", self.auth_url))
            .form(&form)
            .send()
            .await
            .map_err(|source| LinkedInError::RequestSend { source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LinkedInError::UnexpectedStatus {
                endpoint: "accessToken",
                status,
                body,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|source| LinkedInError::ResponseRead { source })?;

        Ok(token.access_token)
    }

    /// OpenID userinfo (name, email, picture) merged with `headline`,
    /// `vanityName` and `id` from `/v2/me` when the token allows it.
    pub async fn fetch_profile(&self, token: &str) -> Result<Value, LinkedInError> {
        let userinfo = self
            .client
            .get(format!("{}/v2/userinfo", self.api_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|source| LinkedInError::RequestSend { source })?;

        let status = userinfo.status();
        if !status.is_success() {
            let body = userinfo.text().await.unwrap_or_default();
            return Err(LinkedInError::UnexpectedStatus {
                endpoint: "userinfo",
                status,
                body,
            });
        }

        let userinfo: Value = userinfo
            .json()
            .await
            .map_err(|source| LinkedInError::ResponseRead { source })?;

        let me = self.fetch_me(token).await;
        Ok(merge_profile(userinfo, me))
    }

    async fn fetch_me(&self, token: &str) -> Option<MeResponse> {
        let response = self
            .client
            .get(format!(
                "{}/v2/me?projection=(id,vanityName,localizedHeadline)",
                self.api_url
            ))
            .bearer_auth(token)
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "LinkedIn /v2/me unavailable");
            return None;
        }

        response.json().await.ok()
    }
}

fn merge_profile(userinfo: Value, me: Option<MeResponse>) -> Value {
    let mut profile = match userinfo {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    if let Some(me) = me {
        if let Some(headline) = me.localized_headline {
            profile.insert("headline".to_string(), Value::String(headline));
        }
        if let Some(vanity) = me.vanity_name {
            profile.insert("vanityName".to_string(), Value::String(vanity));
        }
        if let Some(id) = me.id {
            profile.insert("id".to_string(), Value::String(id));
        }
    }

    Value::Object(profile)
}

#[derive(Debug, Error)]
pub enum LinkedInError {
    #[error("RequestSend: {source}")]
    RequestSend { source: reqwest::Error },

    #[error("ResponseRead: {source}")]
    ResponseRead { source: reqwest::Error },

    #[error("LinkedIn {endpoint} failed with {status}: {body}")]
    UnexpectedStatus {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },
}
