use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::{Config, LOCAL_FRONTEND};

/// Origins allowed to call the API with credentials.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    exact: Vec<String>,
    suffixes: Vec<String>,
}

impl OriginPolicy {
    pub fn from_config(config: &Config) -> Self {
        let mut exact = vec![LOCAL_FRONTEND.to_string(), config.frontend_url.clone()];
        exact.extend(config.allowed_origins.iter().cloned());
        exact.dedup();

        Self {
            exact,
            suffixes: config.allowed_origin_suffixes.clone(),
        }
    }

    pub fn allows(&self, origin: &str) -> bool {
        self.exact.iter().any(|allowed| allowed == origin)
            || self.suffixes.iter().any(|suffix| origin.ends_with(suffix.as_str()))
    }

    /// Requests without an `Origin` header never reach the predicate and pass.
    pub fn layer(self) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
                origin.to_str().map(|origin| self.allows(origin)).unwrap_or(false)
            }))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[test]
    fn allows_configured_origins_and_suffixes() {
        let mut config = test_config();
        config.frontend_url = "https://gitlinkr.app".into();
        config.allowed_origins = vec!["https://staging.gitlinkr.app".into()];
        config.allowed_origin_suffixes = vec![".vercel.app".into()];
        let policy = OriginPolicy::from_config(&config);

        assert!(policy.allows("http://localhost:5173"));
        assert!(policy.allows("https://gitlinkr.app"));
        assert!(policy.allows("https://staging.gitlinkr.app"));
        assert!(policy.allows("https://preview-42.vercel.app"));
        assert!(!policy.allows("https://evil.example"));
        assert!(!policy.allows("http://localhost:3000"));
    }
}
