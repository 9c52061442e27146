//! GitLinkr backend: a developer social network on top of GitHub.
//!
//! - REST routers in `endpoints/`, one per resource
//! - PostgreSQL models and queries in `db/`
//! - Feed, discovery, people search and recommendation logic alongside
//! - Configuration comes from the environment, see [`config::Config`]

pub mod config;
pub mod cors;
pub mod db;
pub mod discovery;
pub mod dummy;
pub mod endpoints;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod feed;
pub mod people;
pub mod recommendations;
pub mod state;
pub mod stories;
pub mod summaries;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::cors::OriginPolicy;
use crate::state::AppState;

/// The full HTTP surface with CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = OriginPolicy::from_config(&state.config).layer();

    Router::new()
        .merge(endpoints::service::router())
        .merge(endpoints::auth::router())
        .merge(endpoints::profile::router())
        .merge(endpoints::recommendations::router())
        .merge(endpoints::connections::router())
        .merge(endpoints::invitations::router())
        .merge(endpoints::posts::router())
        .merge(endpoints::feed::router())
        .merge(endpoints::products::router())
        .merge(endpoints::follows::router())
        .merge(endpoints::stories::router())
        .merge(endpoints::search::router())
        .merge(endpoints::reactions::router())
        .merge(endpoints::repo_follows::router())
        .merge(endpoints::apify::router())
        .merge(endpoints::people::router())
        .merge(endpoints::linkedin_data::router())
        .merge(endpoints::profiles::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
