//! GitHub events rendered as feed cards.

use chrono::{DateTime, Utc};
use interfaces_github_rest::{models::Event, GitHubApi};
use tracing::debug;

use crate::feed::item::{Artifact, FeedItem, ItemKind};
use crate::feed::why::derive_why;
use crate::summaries::{ChangeInput, Summarizer};

const OG_ROTATION_SECS: i64 = 10 * 60;

/// Follow-up AI work for a mapped event, run by [`enrich`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enrichment {
    /// Summarise the commits between `before` and `head`.
    Compare {
        repo: String,
        before: String,
        head: String,
        title: String,
    },
    /// Summarise a pull request from its changed files. `title` and `body`
    /// are used where the pull request has none; with `prefer_event_body`
    /// the event text wins over the pull request description.
    PullRequest {
        repo: String,
        number: u64,
        title: Option<String>,
        body: Option<String>,
        prefer_event_body: bool,
    },
    /// Summarise free text only.
    Text {
        repo: String,
        title: String,
        body: Option<String>,
    },
}

/// OpenGraph preview of `repo`; the salt changes every ten minutes.
pub fn og_image(repo: &str, suffix: &str, now: DateTime<Utc>) -> String {
    let salt = now.timestamp().div_euclid(OG_ROTATION_SECS);
    format!("https://opengraph.githubassets.com/gl{salt}/{repo}{suffix}")
}

/// First non-empty line of `text` (trimmed), cut to 200 chars.
fn first_line_summary(text: &str) -> Option<String> {
    let line = text.trim().lines().find(|line| !line.is_empty())?;
    if line.chars().count() > 200 {
        let mut cut: String = line.chars().take(197).collect();
        cut.push('…');
        Some(cut)
    } else {
        Some(line.to_string())
    }
}

/// First line of a comment, at most 200 chars, untrimmed.
fn comment_summary(text: &str) -> String {
    text.split('\n').next().unwrap_or_default().chars().take(200).collect()
}

fn number_label(number: Option<u64>) -> String {
    number.map(|n| n.to_string()).unwrap_or_default()
}

/// Maps one event without any network access.
pub fn map_event(event: &Event, now: DateTime<Utc>) -> (FeedItem, Option<Enrichment>) {
    let repo = event.repo_name();
    let repo_label = repo.unwrap_or("a repository");
    let kind = event.kind.as_str();
    let payload = &event.payload;

    let og = |suffix: &str| repo.map(|repo| og_image(repo, suffix, now));
    let repo_artifact = || repo.map(Artifact::repo);

    let mut title = format!("{kind} in {repo_label}");
    let mut body = None;
    let mut summary = None;
    let mut why = None;
    let mut artifacts = Vec::new();
    let mut image_url = None;
    let mut enrichment = None;

    match kind {
        "PushEvent" => {
            let count = payload.commits.len();
            let first = payload
                .commits
                .first()
                .and_then(|c| c.message.clone())
                .filter(|m| !m.trim().is_empty());
            title = format!(
                "Pushed {count} commit{} to {repo_label}",
                if count == 1 { "" } else { "s" }
            );
            summary = first
                .as_deref()
                .and_then(|m| m.split('\n').next())
                .map(|line| line.trim().to_string())
                .filter(|line| !line.is_empty());
            why = derive_why(kind, &title, first.as_deref().or(summary.as_deref()));
            body = first;

            if let (Some(repo), Some(before), Some(head)) = (repo, &payload.before, &payload.head) {
                artifacts.push(Artifact::new(
                    "compare",
                    format!("https://github.com/{repo}/compare/{before}...{head}"),
                ));
                image_url = og(&format!("/compare/{before}...{head}"));
                enrichment = Some(Enrichment::Compare {
                    repo: repo.to_string(),
                    before: before.clone(),
                    head: head.clone(),
                    title: title.clone(),
                });
            }
            artifacts.extend(repo_artifact());
        }
        "PullRequestEvent" => {
            let pr = payload.pull_request.clone().unwrap_or_default();
            let pr_title = pr.title.clone().unwrap_or_default();
            let action = payload.action.as_deref().unwrap_or("updated");
            title = format!("{action} PR #{}: {pr_title}", number_label(pr.number))
                .trim()
                .to_string();

            if pr_title.split_whitespace().count() > 10 {
                summary = Some(pr_title.trim().to_string());
            } else if let Some(text) = pr.body.as_deref() {
                summary = first_line_summary(text);
            }

            artifacts.extend(pr.html_url.clone().map(|url| Artifact::new("pr", url)));
            artifacts.extend(repo_artifact());
            why = derive_why(kind, &title, summary.as_deref().or(pr.body.as_deref()));

            if let (Some(repo), Some(number)) = (repo, pr.number) {
                enrichment = Some(Enrichment::PullRequest {
                    repo: repo.to_string(),
                    number,
                    title: None,
                    body: None,
                    prefer_event_body: false,
                });
            }
            image_url = pr.number.and_then(|n| og(&format!("/pull/{n}")));
        }
        "PullRequestReviewEvent" => {
            let pr = payload.pull_request.clone().unwrap_or_default();
            let review = payload.review.clone().unwrap_or_default();
            title = format!(
                "Reviewed PR #{}: {}",
                number_label(pr.number),
                pr.title.as_deref().unwrap_or_default()
            )
            .trim()
            .to_string();

            if let Some(text) = review.body.as_deref().filter(|b| !b.trim().is_empty()) {
                summary = first_line_summary(text);
                body = Some(text.to_string());
            }

            artifacts.extend(review.html_url.map(|url| Artifact::new("review", url)));
            artifacts.extend(pr.html_url.clone().map(|url| Artifact::new("pr", url)));
            artifacts.extend(repo_artifact());
            why = derive_why(
                "PullRequestEvent",
                &title,
                summary.as_deref().or(body.as_deref()).or(pr.body.as_deref()),
            );

            if let (Some(repo), Some(number)) = (repo, pr.number) {
                enrichment = Some(Enrichment::PullRequest {
                    repo: repo.to_string(),
                    number,
                    title: Some(title.clone()),
                    body: body.clone(),
                    prefer_event_body: false,
                });
            }
            image_url = pr.number.and_then(|n| og(&format!("/pull/{n}")));
        }
        "PullRequestReviewCommentEvent" => {
            let pr = payload.pull_request.clone().unwrap_or_default();
            let comment = payload.comment.clone().unwrap_or_default();
            title = format!(
                "PR comment on #{}: {}",
                number_label(pr.number),
                pr.title.as_deref().unwrap_or_default()
            )
            .trim()
            .to_string();

            if let Some(text) = comment.body.as_deref() {
                body = Some(text.to_string());
                summary = Some(comment_summary(text));
            }

            artifacts.extend(comment.html_url.map(|url| Artifact::new("comment", url)));
            artifacts.extend(pr.html_url.clone().map(|url| Artifact::new("pr", url)));
            artifacts.extend(repo_artifact());
            why = derive_why("PullRequestEvent", &title, body.as_deref());

            if summary.is_none() {
                if let (Some(repo), Some(number)) = (repo, pr.number) {
                    enrichment = Some(Enrichment::PullRequest {
                        repo: repo.to_string(),
                        number,
                        title: Some(title.clone()),
                        body: body.clone(),
                        prefer_event_body: true,
                    });
                }
            }
            image_url = pr.number.and_then(|n| og(&format!("/pull/{n}")));
        }
        "IssuesEvent" => {
            let issue = payload.issue.clone().unwrap_or_default();
            let action = payload.action.as_deref().unwrap_or("updated");
            title = format!(
                "{action} issue #{}: {}",
                number_label(issue.number),
                issue.title.as_deref().unwrap_or_default()
            )
            .trim()
            .to_string();

            summary = issue.title.clone().filter(|t| !t.is_empty());
            artifacts.extend(issue.html_url.clone().map(|url| Artifact::new("issue", url)));
            artifacts.extend(repo_artifact());
            why = derive_why(kind, &title, summary.as_deref().or(issue.body.as_deref()));

            if summary.is_none() {
                enrichment = Some(Enrichment::Text {
                    repo: repo.unwrap_or("repo").to_string(),
                    title: title.clone(),
                    body: issue.body.clone(),
                });
            }
            image_url = issue.number.and_then(|n| og(&format!("/issues/{n}")));
        }
        "IssueCommentEvent" => {
            let issue = payload.issue.clone().unwrap_or_default();
            let comment = payload.comment.clone().unwrap_or_default();
            title = format!(
                "Commented on #{}: {}",
                number_label(issue.number),
                issue.title.as_deref().unwrap_or_default()
            )
            .trim()
            .to_string();

            if let Some(text) = comment.body.as_deref() {
                body = Some(text.to_string());
                summary = Some(comment_summary(text));
            }

            artifacts.extend(comment.html_url.map(|url| Artifact::new("comment", url)));
            artifacts.extend(issue.html_url.clone().map(|url| Artifact::new("issue", url)));
            why = derive_why(kind, &title, body.as_deref());

            if summary.is_none() {
                enrichment = Some(Enrichment::Text {
                    repo: repo.unwrap_or("repo").to_string(),
                    title: title.clone(),
                    body: body.clone(),
                });
            }
            image_url = issue.number.and_then(|n| og(&format!("/issues/{n}")));
        }
        "ReleaseEvent" => {
            let release = payload.release.clone().unwrap_or_default();
            title = format!(
                "Released {} in {repo_label}",
                release.tag_name.as_deref().unwrap_or_default()
            )
            .trim()
            .to_string();

            summary = release.name.clone().filter(|n| !n.is_empty());
            artifacts.extend(release.html_url.map(|url| Artifact::new("release", url)));
            artifacts.extend(repo_artifact());
            why = derive_why(kind, &title, summary.as_deref().or(release.body.as_deref()));
        }
        "WatchEvent" => {
            title = format!("Starred {repo_label}");
            summary = Some(format!("Gave a star to {repo_label}"));
            artifacts.extend(repo_artifact());
            why = Some("Signals quality or usefulness of the repository.".to_string());
        }
        "ForkEvent" => {
            let forkee = payload.forkee.clone().unwrap_or_default();
            title = format!(
                "Forked {repo_label} → {}",
                forkee.full_name.as_deref().unwrap_or_default()
            )
            .trim()
            .to_string();
            summary = Some(format!("Forked {repo_label}"));
            artifacts.extend(forkee.html_url.map(|url| Artifact::new("repo", url)));
            artifacts.extend(repo_artifact());
            why = Some("Enables experimentation or new direction built on the original project.".to_string());
        }
        _ => {
            artifacts.extend(repo_artifact());
        }
    }

    if image_url.is_none() && is_mapped_kind(kind) {
        image_url = og("");
    }

    let author = event
        .actor
        .as_ref()
        .map(|actor| actor.login.clone())
        .filter(|login| !login.is_empty())
        .or_else(|| repo.and_then(|r| r.split('/').next()).map(str::to_string))
        .unwrap_or_else(|| "github".to_string());

    let item = FeedItem {
        id: format!("event-{}", event.id),
        author_github_login: author,
        title,
        body,
        artifacts,
        created_at: event.created_at.unwrap_or(now),
        kind: ItemKind::Event,
        subtype: Some(event.kind.clone()),
        summary,
        why,
        image_url,
        items: Vec::new(),
    };

    (item, enrichment)
}

fn is_mapped_kind(kind: &str) -> bool {
    matches!(
        kind,
        "PushEvent"
            | "PullRequestEvent"
            | "PullRequestReviewEvent"
            | "PullRequestReviewCommentEvent"
            | "IssuesEvent"
            | "IssueCommentEvent"
            | "ReleaseEvent"
            | "WatchEvent"
            | "ForkEvent"
    )
}

/// Replaces the heuristic summary when the summarizer returns text.
pub async fn enrich(
    item: &mut FeedItem,
    enrichment: Enrichment,
    github: &GitHubApi,
    summarizer: &Summarizer,
    token: Option<&str>,
) {
    if !summarizer.is_enabled() {
        return;
    }

    let summary = match enrichment {
        Enrichment::Compare {
            repo,
            before,
            head,
            title,
        } => match github.fetch_compare(&repo, &before, &head, token).await {
            Ok(compare) => {
                let messages = compare.messages.join("\n");
                summarizer
                    .summarize_change(&ChangeInput {
                        repo: &repo,
                        title: Some(&title),
                        body: Some(&messages),
                        diff: compare.patch_summary.as_deref(),
                    })
                    .await
            }
            Err(err) => {
                debug!(repo, error = %err, "compare unavailable");
                None
            }
        },
        Enrichment::PullRequest {
            repo,
            number,
            title,
            body,
            prefer_event_body,
        } => {
            let details = github
                .fetch_pull_request_details(&repo, number, token)
                .await
                .unwrap_or_else(|err| {
                    debug!(repo, number, error = %err, "pull request details unavailable");
                    Default::default()
                });
            let body = if prefer_event_body {
                body.or(details.body)
            } else {
                details.body.or(body)
            };
            summarizer
                .summarize_change(&ChangeInput {
                    repo: &repo,
                    title: details.title.as_deref().or(title.as_deref()),
                    body: body.as_deref(),
                    diff: details.patch_summary.as_deref(),
                })
                .await
        }
        Enrichment::Text { repo, title, body } => {
            summarizer
                .summarize_change(&ChangeInput {
                    repo: &repo,
                    title: Some(&title),
                    body: body.as_deref(),
                    diff: None,
                })
                .await
        }
    };

    if let Some(summary) = summary {
        item.summary = Some(summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn event(value: serde_json::Value) -> Event {
        serde_json::from_value(value).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn push_events_link_the_compare_view() {
        let (item, enrichment) = map_event(
            &event(json!({
                "id": "1",
                "type": "PushEvent",
                "actor": { "login": "ada" },
                "repo": { "name": "octo/app" },
                "payload": {
                    "before": "abc",
                    "head": "def",
                    "commits": [{ "message": "Add retry budget\n\nlong text" }]
                },
                "created_at": "2024-05-01T10:00:00Z"
            })),
            now(),
        );

        assert_eq!(item.id, "event-1");
        assert_eq!(item.title, "Pushed 1 commit to octo/app");
        assert_eq!(item.summary.as_deref(), Some("Add retry budget"));
        assert_eq!(item.body.as_deref(), Some("Add retry budget\n\nlong text"));
        assert_eq!(item.why.as_deref(), Some("Adds or enables a new capability."));
        assert_eq!(item.artifacts[0].url, "https://github.com/octo/app/compare/abc...def");
        assert_eq!(item.repo_full_name(), Some("octo/app"));
        let salt = now().timestamp() / 600;
        assert_eq!(
            item.image_url,
            Some(format!("https://opengraph.githubassets.com/gl{salt}/octo/app/compare/abc...def"))
        );
        assert!(matches!(enrichment, Some(Enrichment::Compare { .. })));
    }

    #[test]
    fn blank_commit_messages_leave_no_summary() {
        let push = |message: &str| {
            map_event(
                &event(json!({
                    "id": "2",
                    "type": "PushEvent",
                    "actor": { "login": "ada" },
                    "repo": { "name": "octo/app" },
                    "payload": { "commits": [{ "message": message }] },
                    "created_at": "2024-05-01T10:00:00Z"
                })),
                now(),
            )
            .0
        };

        let empty = push("");
        assert_eq!(empty.summary, None);
        assert_eq!(empty.body, None);

        let leading_blank = push("\nFix flaky test");
        assert_eq!(leading_blank.summary, None);
        assert_eq!(leading_blank.body.as_deref(), Some("\nFix flaky test"));
    }

    #[test]
    fn pull_requests_use_long_titles_or_the_body() {
        let (item, enrichment) = map_event(
            &event(json!({
                "id": "2",
                "type": "PullRequestEvent",
                "actor": { "login": "ada" },
                "repo": { "name": "octo/app" },
                "payload": {
                    "action": "opened",
                    "pull_request": {
                        "number": 7,
                        "title": "Speed up cache",
                        "body": "\n\nMakes reads lock-free.\nMore.",
                        "html_url": "https://github.com/octo/app/pull/7"
                    }
                },
                "created_at": "2024-05-01T10:00:00Z"
            })),
            now(),
        );

        assert_eq!(item.title, "opened PR #7: Speed up cache");
        assert_eq!(item.summary.as_deref(), Some("Makes reads lock-free."));
        assert_eq!(item.artifacts.len(), 2);
        assert!(item.image_url.as_deref().unwrap().ends_with("/octo/app/pull/7"));
        assert_eq!(
            enrichment,
            Some(Enrichment::PullRequest {
                repo: "octo/app".into(),
                number: 7,
                title: None,
                body: None,
                prefer_event_body: false,
            })
        );
    }

    #[test]
    fn issue_comments_only_enrich_without_text() {
        let (item, enrichment) = map_event(
            &event(json!({
                "id": "3",
                "type": "IssueCommentEvent",
                "actor": { "login": "ada" },
                "repo": { "name": "octo/app" },
                "payload": {
                    "issue": { "number": 9, "title": "Crash on start", "html_url": "https://github.com/octo/app/issues/9" },
                    "comment": { "body": "Repro attached\nsteps", "html_url": "https://github.com/octo/app/issues/9#c1" }
                },
                "created_at": "2024-05-01T10:00:00Z"
            })),
            now(),
        );

        assert_eq!(item.title, "Commented on #9: Crash on start");
        assert_eq!(item.summary.as_deref(), Some("Repro attached"));
        assert!(item.repo_full_name().is_none());
        assert!(enrichment.is_none());
    }

    #[test]
    fn unknown_events_fall_back_to_repo_link() {
        let (item, enrichment) = map_event(
            &event(json!({
                "id": "4",
                "type": "GollumEvent",
                "repo": { "name": "octo/wiki" },
                "payload": {}
            })),
            now(),
        );

        assert_eq!(item.title, "GollumEvent in octo/wiki");
        assert_eq!(item.author_github_login, "octo");
        assert_eq!(item.created_at, now());
        assert_eq!(item.image_url, None);
        assert_eq!(item.why, None);
        assert!(enrichment.is_none());
    }

    #[test]
    fn stars_and_releases_get_fixed_copy() {
        let (star, _) = map_event(
            &event(json!({ "id": "5", "type": "WatchEvent", "actor": { "login": "ada" }, "repo": { "name": "octo/app" }, "payload": { "action": "started" } })),
            now(),
        );
        assert_eq!(star.title, "Starred octo/app");
        assert_eq!(star.summary.as_deref(), Some("Gave a star to octo/app"));

        let (release, _) = map_event(
            &event(json!({ "id": "6", "type": "ReleaseEvent", "actor": { "login": "ada" }, "repo": { "name": "octo/app" }, "payload": { "release": { "tag_name": "v1.0.0", "name": "" } } })),
            now(),
        );
        assert_eq!(release.title, "Released v1.0.0 in octo/app");
        assert_eq!(release.why.as_deref(), Some("Delivers a new version with fixes or features."));
    }
}
