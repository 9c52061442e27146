//! Repository discovery on top of GitHub search.

pub mod categories;
pub mod startups;

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use interfaces_github_rest::{models::RepoSearchItem, GitHubApi};
use serde::Serialize;
use tracing::warn;

pub const DEFAULT_WINDOW_DAYS: i64 = 14;

/// Repository as shown on discovery pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepoCard {
    pub full_name: String,
    pub html_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stars: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pushed_at: Option<String>,
    pub topics: Vec<String>,
}

impl RepoCard {
    /// Card with a name and link only.
    pub fn bare(full_name: &str) -> Self {
        Self {
            full_name: full_name.to_string(),
            html_url: format!("https://github.com/{full_name}"),
            description: None,
            language: None,
            stars: None,
            homepage: None,
            pushed_at: None,
            topics: Vec::new(),
        }
    }
}

impl From<RepoSearchItem> for RepoCard {
    fn from(item: RepoSearchItem) -> Self {
        Self {
            full_name: item.full_name,
            html_url: item.html_url,
            description: item.description,
            language: item.language,
            stars: Some(item.stargazers_count),
            homepage: item.homepage,
            pushed_at: item.pushed_at,
            topics: item.topics,
        }
    }
}

/// Days from the first run of digits in `window` (`"30d"` is 30), else 14.
/// Numbers too large for `i64` saturate.
pub fn parse_window_days(window: Option<&str>) -> i64 {
    window
        .and_then(|raw| {
            let digits: String = raw
                .chars()
                .skip_while(|c| !c.is_ascii_digit())
                .take_while(|c| c.is_ascii_digit())
                .collect();
            (!digits.is_empty()).then(|| digits.parse().unwrap_or(i64::MAX))
        })
        .unwrap_or(DEFAULT_WINDOW_DAYS)
}

/// `YYYY-MM-DD` of `now - days`, for `pushed:>` and `created:>` qualifiers.
/// `None` when that day is outside the representable calendar.
pub fn since_date(now: DateTime<Utc>, days: i64) -> Option<String> {
    let since = now.checked_sub_signed(Duration::try_days(days)?)?;
    Some(since.format("%Y-%m-%d").to_string())
}

/// Runs every query concurrently; failed queries contribute nothing.
/// Results are deduplicated by full name, first occurrence wins.
pub async fn search_all(github: &GitHubApi, queries: &[String], per_page: u32, token: Option<&str>) -> Vec<RepoSearchItem> {
    let results = join_all(queries.iter().map(|query| async move {
        match github.search_repositories(query, per_page, token).await {
            Ok(items) => items,
            Err(err) => {
                warn!(query, error = %err, "repository search failed");
                Vec::new()
            }
        }
    }))
    .await;

    dedupe_by_full_name(results.into_iter().flatten())
}

pub fn dedupe_by_full_name(items: impl IntoIterator<Item = RepoSearchItem>) -> Vec<RepoSearchItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.full_name.clone()))
        .collect()
}

#[cfg(test)]
pub(crate) fn search_item(value: serde_json::Value) -> RepoSearchItem {
    serde_json::from_value(value).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn window_reads_the_first_number() {
        assert_eq!(parse_window_days(Some("30d")), 30);
        assert_eq!(parse_window_days(Some("last-7-days")), 7);
        assert_eq!(parse_window_days(Some("week")), 14);
        assert_eq!(parse_window_days(None), 14);
    }

    #[test]
    fn since_date_is_a_calendar_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
        assert_eq!(since_date(now, 14).as_deref(), Some("2024-02-25"));
    }

    #[test]
    fn huge_windows_have_no_since_date() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
        assert_eq!(parse_window_days(Some("99999999999999999999999d")), i64::MAX);
        assert_eq!(since_date(now, 100_000_000), None);
        assert_eq!(since_date(now, i64::MAX), None);
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let a = search_item(json!({ "full_name": "o/a", "name": "a", "html_url": "u1", "stargazers_count": 1 }));
        let b = search_item(json!({ "full_name": "o/a", "name": "a", "html_url": "u2", "stargazers_count": 2 }));
        let c = search_item(json!({ "full_name": "o/c", "name": "c", "html_url": "u3", "stargazers_count": 3 }));

        let out = dedupe_by_full_name(vec![a, b, c]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].html_url, "u1");
    }

    #[test]
    fn bare_cards_omit_unknown_fields() {
        let json = serde_json::to_value(RepoCard::bare("astral-sh/uv")).unwrap();
        assert_eq!(json, json!({ "full_name": "astral-sh/uv", "html_url": "https://github.com/astral-sh/uv", "topics": [] }));
    }
}
