use std::{env, fmt::Display, str::FromStr};

use interfaces_apify_actors::{DEFAULT_ACTOR, DEFAULT_BASE_URL as APIFY_BASE_URL};
use interfaces_github_rest::{client::DEFAULT_API_URL as GITHUB_API_URL, oauth::DEFAULT_WEB_URL as GITHUB_WEB_URL};
use interfaces_linkedin_rapidapi::DEFAULT_HOST as RAPIDAPI_HOST;
use interfaces_openai_chat::{DEFAULT_BASE_URL as OPENAI_BASE_URL, DEFAULT_MODEL as OPENAI_MODEL};
use thiserror::Error;
use tracing::info;
use utils_trace::{TraceFormat, TraceSettings};

pub const LOCAL_FRONTEND: &str = "http://localhost:5173";
/// Upper bound for `CURATED_MAX_AGE_DAYS`, ten years.
pub const MAX_CURATED_AGE_DAYS: i64 = 3650;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub frontend_url: String,
    pub allowed_origins: Vec<String>,
    pub allowed_origin_suffixes: Vec<String>,
    pub database_url: Option<String>,
    pub github: GitHubConfig,
    pub linkedin: LinkedInConfig,
    pub apify: ApifyConfig,
    pub openai: OpenAiConfig,
    pub rapidapi: RapidApiConfig,
    pub curated_max_age_days: i64,
    pub use_dummy_data: bool,
    pub allow_seed: bool,
    pub app_env: String,
    pub trace: TraceSettings,
}

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    /// Used when a request carries no bearer token.
    pub fallback_token: Option<String>,
    pub api_url: String,
    pub web_url: String,
}

#[derive(Debug, Clone)]
pub struct LinkedInConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApifyConfig {
    pub token: Option<String>,
    pub base_url: String,
    pub actor: String,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct RapidApiConfig {
    pub key: Option<String>,
    pub host: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl Config {
    /// Reads the process environment (after `.env` has been loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let frontend_url = or("FRONTEND_URL", LOCAL_FRONTEND);

        let trace = TraceSettings {
            level: or("LOG_LEVEL", "info"),
            format: match var("LOG_FORMAT") {
                Some(raw) => raw.parse::<TraceFormat>().map_err(|err| ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    value: raw.clone(),
                    reason: err.to_string(),
                })?,
                None => TraceFormat::Compact,
            },
        };

        let github = GitHubConfig {
            client_id: var("GITHUB_CLIENT_ID"),
            client_secret: var("GITHUB_CLIENT_SECRET"),
            redirect_uri: var("GITHUB_REDIRECT_URI"),
            fallback_token: var("GITHUB_FALLBACK_TOKEN"),
            api_url: or("GITHUB_API_URL", GITHUB_API_URL),
            web_url: or("GITHUB_WEB_URL", GITHUB_WEB_URL),
        };

        Ok(Self {
            port: parse(&var, "PORT", 4000)?,
            allowed_origins: list(var("ALLOWED_ORIGINS")),
            allowed_origin_suffixes: list(var("ALLOWED_ORIGIN_SUFFIXES")),
            database_url: var("DATABASE_URL"),
            github,
            linkedin: LinkedInConfig {
                client_id: var("LINKEDIN_CLIENT_ID"),
                client_secret: var("LINKEDIN_CLIENT_SECRET"),
                redirect_uri: var("LINKEDIN_REDIRECT_URI"),
            },
            apify: ApifyConfig {
                token: var("APIFY_TOKEN"),
                base_url: or("APIFY_BASE_URL", APIFY_BASE_URL),
                actor: or("APIFY_ACTOR", DEFAULT_ACTOR),
            },
            openai: OpenAiConfig {
                api_key: var("OPENAI_API_KEY"),
                model: or("OPENAI_MODEL", OPENAI_MODEL),
                base_url: or("OPENAI_BASE_URL", OPENAI_BASE_URL),
            },
            rapidapi: RapidApiConfig {
                key: var("RAPIDAPI_KEY"),
                host: or("RAPIDAPI_HOST", RAPIDAPI_HOST),
            },
            curated_max_age_days: parse(&var, "CURATED_MAX_AGE_DAYS", 14)?.clamp(1, MAX_CURATED_AGE_DAYS),
            use_dummy_data: parse(&var, "USE_DUMMY_DATA", false)?,
            allow_seed: parse(&var, "ALLOW_SEED", false)?,
            app_env: or("APP_ENV", "development"),
            frontend_url,
            trace,
        })
    }

    /// Seeding is open outside production, or when explicitly allowed.
    pub fn seeding_allowed(&self) -> bool {
        self.allow_seed || self.app_env != "production"
    }

    pub fn log_summary(&self) {
        info!(
            port = self.port,
            database = self.database_url.is_some(),
            github_oauth = self.github.client_id.is_some(),
            linkedin_oauth = self.linkedin.client_id.is_some(),
            apify = self.apify.token.is_some(),
            openai = self.openai.api_key.is_some(),
            rapidapi = self.rapidapi.key.is_some(),
            dummy_data = self.use_dummy_data,
            "configuration loaded"
        );
    }
}

fn parse<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw.parse().map_err(|err: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: err.to_string(),
        }),
        None => Ok(default),
    }
}

fn list(raw: Option<String>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config::from_lookup(|_| None).expect("empty environment is valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_to_an_empty_environment() {
        let config = test_config();

        assert_eq!(config.port, 4000);
        assert_eq!(config.frontend_url, LOCAL_FRONTEND);
        assert_eq!(config.curated_max_age_days, 14);
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.rapidapi.host, "linkedin-data-api.p.rapidapi.com");
        assert_eq!(config.apify.actor, "apimaestro~linkedin-profile-search-scraper");
        assert!(config.database_url.is_none());
        assert!(!config.use_dummy_data);
        assert!(config.seeding_allowed());
    }

    #[test]
    fn splits_origin_lists_and_drops_blanks() {
        let config = config_from(&[
            ("ALLOWED_ORIGINS", " https://a.dev, ,https://b.dev"),
            ("ALLOWED_ORIGIN_SUFFIXES", ".vercel.app"),
        ])
        .unwrap();

        assert_eq!(config.allowed_origins, vec!["https://a.dev", "https://b.dev"]);
        assert_eq!(config.allowed_origin_suffixes, vec![".vercel.app"]);
    }

    #[test]
    fn production_disables_seeding_unless_allowed() {
        let prod = config_from(&[("APP_ENV", "production")]).unwrap();
        assert!(!prod.seeding_allowed());

        let allowed = config_from(&[("APP_ENV", "production"), ("ALLOW_SEED", "true")]).unwrap();
        assert!(allowed.seeding_allowed());
    }

    #[test]
    fn rejects_malformed_numbers_and_flags() {
        assert!(matches!(
            config_from(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));
        assert!(matches!(
            config_from(&[("USE_DUMMY_DATA", "yes")]),
            Err(ConfigError::Invalid { key: "USE_DUMMY_DATA", .. })
        ));
        assert!(matches!(
            config_from(&[("LOG_FORMAT", "xml")]),
            Err(ConfigError::Invalid { key: "LOG_FORMAT", .. })
        ));
    }

    #[test]
    fn curated_age_is_clamped() {
        let huge = config_from(&[("CURATED_MAX_AGE_DAYS", "9223372036854775807")]).unwrap();
        assert_eq!(huge.curated_max_age_days, MAX_CURATED_AGE_DAYS);

        let negative = config_from(&[("CURATED_MAX_AGE_DAYS", "-5")]).unwrap();
        assert_eq!(negative.curated_max_age_days, 1);
    }

    #[test]
    fn blank_credentials_count_as_unset() {
        let config = config_from(&[("APIFY_TOKEN", "  "), ("DATABASE_URL", "")]).unwrap();
        assert!(config.apify.token.is_none());
        assert!(config.database_url.is_none());
    }
}
