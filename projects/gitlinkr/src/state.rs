use std::sync::Arc;
use std::time::{Duration, Instant};

use interfaces_apify_actors::ApifyClient;
use interfaces_github_rest::{oauth::GitHubOAuthApp, GitHubApi};
use interfaces_linkedin_oauth::LinkedInOAuthApp;
use interfaces_linkedin_rapidapi::LinkedInDataApi;
use interfaces_openai_chat::ChatClient;
use reqwest::Client;
use utils_cache::TtlCache;

use crate::config::Config;
use crate::db::{self, PgPool};
use crate::fallback::{MemoryReactions, MemoryRepoFollows};
use crate::feed::curated::CuratedFeed;
use crate::recommendations::{Candidate, CACHE_TTL as RECOMMENDATIONS_TTL};
use crate::summaries::Summarizer;

pub type AppState = Arc<State>;

/// Everything handlers share for the lifetime of the process.
pub struct State {
    pub config: Config,
    pub pool: Option<PgPool>,
    pub github: GitHubApi,
    pub github_oauth: Option<GitHubOAuthApp>,
    pub linkedin_oauth: Option<LinkedInOAuthApp>,
    pub linkedin_data: Option<LinkedInDataApi>,
    pub apify: Option<ApifyClient>,
    pub summarizer: Summarizer,
    pub curated: CuratedFeed,
    pub recommendations: TtlCache<String, Vec<Candidate>>,
    pub reactions: MemoryReactions,
    pub repo_follows: MemoryRepoFollows,
    pub started_at: Instant,
}

impl State {
    pub fn new(config: Config) -> AppState {
        let pool = config.database_url.as_deref().map(db::connect);
        Self::with_pool(config, pool)
    }

    /// Builds the shared clients once; integrations without credentials stay `None`.
    pub fn with_pool(config: Config, pool: Option<PgPool>) -> AppState {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        let github = GitHubApi::new(http.clone(), config.github.api_url.clone());

        let github_oauth = match (
            &config.github.client_id,
            &config.github.client_secret,
            &config.github.redirect_uri,
        ) {
            (Some(id), Some(secret), Some(redirect)) => Some(GitHubOAuthApp::new(
                http.clone(),
                config.github.web_url.clone(),
                id.clone(),
                secret.clone(),
                redirect.clone(),
            )),
            _ => None,
        };

        let linkedin_oauth = match (
            &config.linkedin.client_id,
            &config.linkedin.client_secret,
            &config.linkedin.redirect_uri,
        ) {
            (Some(id), Some(secret), Some(redirect)) => Some(LinkedInOAuthApp::new(
                http.clone(),
                id.clone(),
                secret.clone(),
                redirect.clone(),
            )),
            _ => None,
        };

        let linkedin_data = config
            .rapidapi
            .key
            .as_ref()
            .map(|key| LinkedInDataApi::new(http.clone(), key.clone(), config.rapidapi.host.clone()));

        let apify = config.apify.token.as_ref().map(|token| {
            ApifyClient::new(http.clone(), token.clone())
                .with_base_url(config.apify.base_url.clone())
                .with_actor(config.apify.actor.clone())
        });

        let chat = config.openai.api_key.as_ref().map(|key| {
            ChatClient::new(
                http.clone(),
                config.openai.base_url.clone(),
                key.clone(),
                config.openai.model.clone(),
            )
        });

        Arc::new(Self {
            curated: CuratedFeed::new(config.curated_max_age_days),
            config,
            pool,
            github,
            github_oauth,
            linkedin_oauth,
            linkedin_data,
            apify,
            summarizer: Summarizer::new(chat),
            recommendations: TtlCache::new(RECOMMENDATIONS_TTL),
            reactions: MemoryReactions::default(),
            repo_follows: MemoryRepoFollows::default(),
            started_at: Instant::now(),
        })
    }

    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }
}
