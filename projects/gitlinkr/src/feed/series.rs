//! Folds bursts of pull request activity into one card.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};

use crate::feed::events::og_image;
use crate::feed::item::{Artifact, FeedItem, ItemKind, SeriesChild};
use crate::summaries::{ChangeInput, Summarizer};

const WINDOW_SECS: i64 = 6 * 60 * 60;

const PULL_REQUEST_KINDS: [&str; 3] = [
    "PullRequestEvent",
    "PullRequestReviewEvent",
    "PullRequestReviewCommentEvent",
];

fn is_pull_request_like(item: &FeedItem) -> bool {
    item.kind == ItemKind::Event
        && item
            .subtype
            .as_deref()
            .is_some_and(|subtype| PULL_REQUEST_KINDS.contains(&subtype))
}

/// Groups pull request events by author, repository and six-hour bucket.
/// Groups of two or more are replaced by a `pr_series` card appended at the
/// end; card summaries are left empty for [`summarize_series`].
pub fn cluster_pull_request_series(items: Vec<FeedItem>, now: DateTime<Utc>) -> Vec<FeedItem> {
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();

    for (index, item) in items.iter().enumerate() {
        if !is_pull_request_like(item) || item.author_github_login.is_empty() {
            continue;
        }
        let Some(repo) = item.repo_full_name() else {
            continue;
        };
        let bucket = item.created_at.timestamp_millis().div_euclid(WINDOW_SECS * 1000) * WINDOW_SECS * 1000;
        let key = format!("{}|{repo}|{bucket}", item.author_github_login);
        groups.entry(key).or_default().push(index);
    }

    let mut removed = HashSet::new();
    let mut cards = Vec::new();

    for (key, mut members) in groups {
        if members.len() < 2 {
            continue;
        }
        members.sort_by(|a, b| items[*b].created_at.cmp(&items[*a].created_at));

        let newest = &items[members[0]];
        let repo = newest.repo_full_name().unwrap_or_default().to_string();
        let children: Vec<SeriesChild> = members
            .iter()
            .map(|&index| {
                let member = &items[index];
                SeriesChild {
                    id: member.id.clone(),
                    title: member.title.clone(),
                    summary: member.summary.clone(),
                    artifacts: member.artifacts.clone(),
                    created_at: member.created_at,
                }
            })
            .collect();

        cards.push(FeedItem {
            id: format!("series-{key}"),
            author_github_login: newest.author_github_login.clone(),
            title: format!("PR series in {repo} ({} updates)", children.len()),
            body: None,
            artifacts: vec![Artifact::repo(&repo)],
            created_at: newest.created_at,
            kind: ItemKind::Series,
            subtype: Some("pr_series".to_string()),
            summary: None,
            why: None,
            image_url: Some(og_image(&repo, "", now)),
            items: children,
        });
        removed.extend(members);
    }

    if cards.is_empty() {
        return items;
    }

    items
        .into_iter()
        .enumerate()
        .filter(|(index, _)| !removed.contains(index))
        .map(|(_, item)| item)
        .chain(cards)
        .collect()
}

/// One-line summary of each series card from its member titles.
pub async fn summarize_series(items: &mut [FeedItem], summarizer: &Summarizer) {
    if !summarizer.is_enabled() {
        return;
    }

    for card in items.iter_mut().filter(|item| item.kind == ItemKind::Series) {
        let Some(repo) = card.repo_full_name().map(str::to_string) else {
            continue;
        };
        let titles: Vec<&str> = card
            .items
            .iter()
            .map(|child| child.title.as_str())
            .filter(|title| !title.is_empty())
            .collect();
        let title = format!("PR series in {repo}");
        let body = titles.join("\n");

        card.summary = summarizer
            .summarize_change(&ChangeInput {
                repo: &repo,
                title: Some(&title),
                body: Some(&body),
                diff: None,
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn pr_event(id: &str, author: &str, repo: &str, at: DateTime<Utc>) -> FeedItem {
        FeedItem {
            id: id.into(),
            author_github_login: author.into(),
            title: format!("opened PR #{id}"),
            body: None,
            artifacts: vec![
                Artifact::new("pr", format!("https://github.com/{repo}/pull/{id}")),
                Artifact::repo(repo),
            ],
            created_at: at,
            kind: ItemKind::Event,
            subtype: Some("PullRequestEvent".into()),
            summary: Some(format!("summary {id}")),
            why: None,
            image_url: None,
            items: Vec::new(),
        }
    }

    fn bucket_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap()
    }

    #[test]
    fn groups_events_in_the_same_window() {
        let t0 = bucket_start();
        let mut push = pr_event("p", "ada", "octo/app", t0 + Duration::minutes(30));
        push.subtype = Some("PushEvent".into());

        let items = vec![
            pr_event("1", "ada", "octo/app", t0 + Duration::minutes(10)),
            push,
            pr_event("2", "ada", "octo/app", t0 + Duration::hours(2)),
            pr_event("3", "ada", "octo/other", t0 + Duration::hours(1)),
        ];

        let out = cluster_pull_request_series(items, t0);
        let ids: Vec<&str> = out.iter().map(|item| item.id.as_str()).collect();
        let series_id = format!("series-ada|octo/app|{}", t0.timestamp_millis());

        assert_eq!(ids, vec!["p", "3", series_id.as_str()]);

        let card = &out[2];
        assert_eq!(card.kind, ItemKind::Series);
        assert_eq!(card.title, "PR series in octo/app (2 updates)");
        assert_eq!(card.created_at, t0 + Duration::hours(2));
        assert_eq!(card.items[0].id, "2");
        assert_eq!(card.items[1].id, "1");
        assert_eq!(card.artifacts, vec![Artifact::repo("octo/app")]);
        assert_eq!(card.summary, None);
    }

    #[test]
    fn separate_windows_and_authors_stay_apart() {
        let t0 = bucket_start();
        let items = vec![
            pr_event("1", "ada", "octo/app", t0 + Duration::minutes(10)),
            pr_event("2", "ada", "octo/app", t0 + Duration::hours(7)),
            pr_event("3", "grace", "octo/app", t0 + Duration::minutes(20)),
        ];

        let out = cluster_pull_request_series(items, t0);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|item| item.kind == ItemKind::Event));
    }
}
