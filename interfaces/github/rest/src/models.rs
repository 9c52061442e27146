//! Response shapes. Fields the backend reads are typed; everything else is
//! kept in `extra` so passthrough endpoints return GitHub's payload intact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub html_url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub login: String,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicProfile {
    pub login: String,
    pub company: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoOwner {
    pub login: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoSearchItem {
    pub full_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub html_url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    pub homepage: Option<String>,
    pub pushed_at: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub owner: Option<RepoOwner>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoMetadata {
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub stargazers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub open_issues_count: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct PullRequestDetails {
    pub title: Option<String>,
    pub body: Option<String>,
    pub patch_summary: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CompareDetails {
    pub messages: Vec<String>,
    pub patch_summary: Option<String>,
}

/// A public event from `/users/{login}/events/public`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub actor: Option<EventActor>,
    pub repo: Option<EventRepo>,
    #[serde(default)]
    pub payload: EventPayload,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventActor {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRepo {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPayload {
    pub action: Option<String>,
    #[serde(default)]
    pub commits: Vec<PushCommit>,
    pub before: Option<String>,
    pub head: Option<String>,
    pub pull_request: Option<PullRequestRef>,
    pub review: Option<Review>,
    pub comment: Option<Comment>,
    pub issue: Option<IssueRef>,
    pub release: Option<Release>,
    pub forkee: Option<Forkee>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushCommit {
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PullRequestRef {
    pub number: Option<u64>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Review {
    pub body: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Comment {
    pub body: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueRef {
    pub number: Option<u64>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Release {
    pub tag_name: Option<String>,
    pub name: Option<String>,
    pub body: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Forkee {
    pub full_name: Option<String>,
    pub html_url: Option<String>,
}

impl Event {
    pub fn repo_name(&self) -> Option<&str> {
        self.repo.as_ref().map(|repo| repo.name.as_str())
    }

    /// Headline used for story bullets: PR title, issue title or first commit message.
    pub fn headline(&self) -> String {
        let payload = &self.payload;
        let text = payload
            .pull_request
            .as_ref()
            .and_then(|pr| pr.title.clone())
            .or_else(|| payload.issue.as_ref().and_then(|issue| issue.title.clone()))
            .or_else(|| payload.commits.first().and_then(|c| c.message.clone()))
            .unwrap_or_default();
        format!("{}: {}", self.kind, text)
    }
}
