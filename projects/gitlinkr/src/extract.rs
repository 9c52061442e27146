use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};

/// Token from `Authorization: Bearer <token>`, if any. Never rejects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BearerToken(pub Option<String>);

impl BearerToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// The caller's token, else `fallback` (the configured service token).
    pub fn or_fallback<'a>(&'a self, fallback: Option<&'a str>) -> Option<&'a str> {
        self.as_deref().or(fallback)
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string);

        Ok(BearerToken(token))
    }
}
