//! Short per-repository narratives of a user's recent public activity.

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use interfaces_github_rest::{
    models::{Event, RepoMetadata},
    GitHubApi, GitHubRequestError,
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::db::project_story::models::NewProjectStory;
use crate::summaries::{ChangeInput, ProjectInput, RepoStats, Summarizer};

pub const PERIOD_DAYS: i64 = 3;
pub const STORY_TTL_HOURS: i64 = 24;
pub const MAX_STORIES: usize = 5;

const HEADLINE_TITLES: usize = 20;
const NARRATIVE_TITLES: usize = 10;
const BULLETS: usize = 3;
const PERIOD_LABEL: &str = "last 3 days";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bullet {
    #[serde(rename = "type")]
    pub kind: String,
    pub at: Option<DateTime<Utc>>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Story {
    pub username: String,
    pub repo: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub headline: String,
    pub bullets: Vec<Bullet>,
    pub next_steps: Option<Value>,
    pub context_hash: String,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

impl Story {
    /// Stored form; the narrative is regenerated and never persisted.
    pub fn to_row(&self) -> NewProjectStory {
        NewProjectStory {
            username: self.username.clone(),
            repo: self.repo.clone(),
            period_start: self.period_start,
            period_end: self.period_end,
            headline: self.headline.clone(),
            bullets: serde_json::to_value(&self.bullets).unwrap_or(Value::Array(Vec::new())),
            next_steps: self.next_steps.clone(),
            context_hash: self.context_hash.clone(),
            expires_at: self.expires_at,
        }
    }
}

/// Events grouped by repository, repositories in first-seen order.
pub fn group_by_repo(events: &[Event]) -> Vec<(&str, Vec<&Event>)> {
    let mut groups: Vec<(&str, Vec<&Event>)> = Vec::new();
    for event in events {
        let Some(repo) = event.repo_name() else {
            continue;
        };
        match groups.iter_mut().find(|(name, _)| *name == repo) {
            Some((_, members)) => members.push(event),
            None => groups.push((repo, vec![event])),
        }
    }
    groups
}

/// PR link, else issue link, else the repository page.
pub fn bullet(event: &Event) -> Bullet {
    let payload = &event.payload;
    let link = payload
        .pull_request
        .as_ref()
        .and_then(|pr| pr.html_url.clone())
        .or_else(|| payload.issue.as_ref().and_then(|issue| issue.html_url.clone()))
        .or_else(|| event.repo_name().map(|repo| format!("https://github.com/{repo}")));

    Bullet {
        kind: event.kind.clone(),
        at: event.created_at,
        link,
    }
}

/// Counters for the narrative prompt, blank when metadata is unavailable.
pub fn repo_stats(meta: Option<&RepoMetadata>) -> RepoStats {
    meta.map(|m| RepoStats {
        stars: m.stargazers_count,
        forks: m.forks_count,
        open_issues: m.open_issues_count,
    })
    .unwrap_or_default()
}

async fn story_for_repo(
    github: &GitHubApi,
    summarizer: &Summarizer,
    username: &str,
    repo: &str,
    events: &[&Event],
    token: Option<&str>,
    now: DateTime<Utc>,
) -> Story {
    let titles: Vec<String> = events.iter().take(HEADLINE_TITLES).map(|e| e.headline()).collect();
    let joined = titles.join("\n");
    let headline_title = format!("Recent work in {repo}");
    let headline = summarizer
        .summarize_change(&ChangeInput {
            repo,
            title: Some(&headline_title),
            body: Some(&joined),
            diff: None,
        })
        .await;

    let meta = github.fetch_repo_metadata(repo, token).await.ok();
    let recent: Vec<String> = titles.iter().take(NARRATIVE_TITLES).cloned().collect();
    let narrative = summarizer
        .summarize_project(&ProjectInput {
            repo,
            description: meta.as_ref().and_then(|m| m.description.as_deref()),
            topics: meta.as_ref().map(|m| m.topics.as_slice()).unwrap_or_default(),
            language: meta.as_ref().and_then(|m| m.language.as_deref()),
            stats: Some(repo_stats(meta.as_ref())),
            period: Some(PERIOD_LABEL),
            recent_titles: &recent,
        })
        .await;

    Story {
        username: username.to_string(),
        repo: repo.to_string(),
        period_start: now - Duration::days(PERIOD_DAYS),
        period_end: now,
        headline: headline.unwrap_or_else(|| format!("Recent progress in {repo}")),
        bullets: events.iter().take(BULLETS).map(|e| bullet(e)).collect(),
        next_steps: None,
        context_hash: events.len().to_string(),
        expires_at: now + Duration::hours(STORY_TTL_HOURS),
        narrative,
    }
}

/// One story per repository the user recently touched.
pub async fn build_stories(
    github: &GitHubApi,
    summarizer: &Summarizer,
    username: &str,
    token: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Vec<Story>, GitHubRequestError> {
    let events = github.fetch_public_events(username, token).await?;
    let groups = group_by_repo(&events);
    debug!(username, repos = groups.len(), "building stories");

    Ok(join_all(
        groups
            .iter()
            .map(|(repo, members)| story_for_repo(github, summarizer, username, repo, members, token, now)),
    )
    .await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summaries::project_prompt;
    use chrono::TimeZone;
    use serde_json::json;

    fn event(id: &str, kind: &str, repo: Option<&str>, payload: Value) -> Event {
        let mut value = json!({ "id": id, "type": kind, "payload": payload, "created_at": "2024-05-01T10:00:00Z" });
        if let Some(repo) = repo {
            value["repo"] = json!({ "name": repo });
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn groups_keep_first_seen_order_and_skip_repoless_events() {
        let events = vec![
            event("1", "PushEvent", Some("o/b"), json!({})),
            event("2", "WatchEvent", None, json!({})),
            event("3", "IssuesEvent", Some("o/a"), json!({})),
            event("4", "PushEvent", Some("o/b"), json!({})),
        ];

        let groups = group_by_repo(&events);
        let names: Vec<&str> = groups.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["o/b", "o/a"]);
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn bullets_prefer_pull_request_then_issue_then_repo_links() {
        let pr = event("1", "PullRequestEvent", Some("o/a"), json!({ "pull_request": { "html_url": "https://github.com/o/a/pull/1" } }));
        let issue = event("2", "IssuesEvent", Some("o/a"), json!({ "issue": { "html_url": "https://github.com/o/a/issues/2" } }));
        let push = event("3", "PushEvent", Some("o/a"), json!({}));

        assert_eq!(bullet(&pr).link.as_deref(), Some("https://github.com/o/a/pull/1"));
        assert_eq!(bullet(&issue).link.as_deref(), Some("https://github.com/o/a/issues/2"));
        assert_eq!(bullet(&push).link.as_deref(), Some("https://github.com/o/a"));
        assert_eq!(bullet(&push).kind, "PushEvent");
    }

    #[test]
    fn stats_line_survives_missing_metadata() {
        let stats = repo_stats(None);
        assert_eq!((stats.stars, stats.forks, stats.open_issues), (None, None, None));

        let prompt = project_prompt(&ProjectInput {
            repo: "o/a",
            stats: Some(stats),
            ..Default::default()
        });
        assert!(prompt.contains("Stats: ⭐ -  Forks -  Open issues -"));

        let meta: RepoMetadata = serde_json::from_value(json!({ "stargazers_count": 7, "forks_count": 1 })).unwrap();
        let stats = repo_stats(Some(&meta));
        assert_eq!((stats.stars, stats.forks, stats.open_issues), (Some(7), Some(1), None));
    }

    #[test]
    fn stored_rows_drop_the_narrative() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let story = Story {
            username: "ada".into(),
            repo: "o/a".into(),
            period_start: now - Duration::days(PERIOD_DAYS),
            period_end: now,
            headline: "Recent progress in o/a".into(),
            bullets: vec![],
            next_steps: None,
            context_hash: "4".into(),
            expires_at: now + Duration::hours(STORY_TTL_HOURS),
            narrative: Some("A story".into()),
        };

        let row = story.to_row();
        assert_eq!(row.context_hash, "4");
        assert_eq!(row.bullets, json!([]));
        assert_eq!(row.expires_at - row.period_end, Duration::hours(24));
    }
}
