//! GitHub REST client for the GitLinkr backend
//!
//! - Profiles, followers and OAuth in `users` / `oauth`
//! - Repositories, pull requests and compares in `repos`
//! - Public activity in `events`
//! - User and repository search in `search`

pub mod client;
pub mod events;
pub mod models;
pub mod oauth;
pub mod repos;
pub mod search;
pub mod users;

pub use client::{GitHubApi, GitHubRequestError};
