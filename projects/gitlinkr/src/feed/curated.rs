use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use interfaces_github_rest::{models::Event, GitHubApi};
use tracing::{debug, warn};
use utils_cache::TtlCache;

pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Below this many recent events, older ones are kept too.
const MIN_RECENT_EVENTS: usize = 20;
const MAX_EVENTS: usize = 100;

/// Accounts whose public activity fills an otherwise empty feed.
pub const CURATED_USERS: [&str; 30] = [
    "sindresorhus",
    "gaearon",
    "addyosmani",
    "rauchg",
    "torvalds",
    "yyx990803",
    "kentcdodds",
    "tannerlinsley",
    "tj",
    "mitchellh",
    "ry",
    "mxstbr",
    "evanw",
    "Rich-Harris",
    "mrdoob",
    "ljharb",
    "antirez",
    "feross",
    "thepracticaldev",
    "swyxio",
    "sokra",
    "thejameskyle",
    "mjackson",
    "zkat",
    "zloirock",
    "bkeepers",
    "orta",
    "kdy1",
    "shuding",
    "paulirish",
];

pub struct CuratedFeed {
    max_age: chrono::Duration,
    cache: TtlCache<(), Vec<Event>>,
}

impl CuratedFeed {
    pub fn new(max_age_days: i64) -> Self {
        Self {
            max_age: chrono::Duration::days(max_age_days),
            cache: TtlCache::new(CACHE_TTL),
        }
    }

    /// Cached for five minutes. A user whose events cannot be fetched
    /// contributes nothing.
    pub async fn events(&self, github: &GitHubApi, token: Option<&str>, now: DateTime<Utc>) -> Vec<Event> {
        if let Some(events) = self.cache.get(&()) {
            return events;
        }

        let batches = join_all(CURATED_USERS.iter().map(|user| async move {
            match github.fetch_public_events(user, token).await {
                Ok(events) => events,
                Err(err) => {
                    warn!(user, error = %err, "curated events unavailable");
                    Vec::new()
                }
            }
        }))
        .await;

        let events = select_recent(batches, now - self.max_age);
        debug!(count = events.len(), "curated events refreshed");
        self.cache.insert((), events.clone());
        events
    }
}

/// Keeps events newer than `cutoff`, or all of them when fewer than twenty
/// are that recent. At most one hundred, in fetch order.
pub fn select_recent(batches: Vec<Vec<Event>>, cutoff: DateTime<Utc>) -> Vec<Event> {
    let all: Vec<Event> = batches.into_iter().flatten().collect();
    let recent = all
        .iter()
        .filter(|event| event.created_at.is_some_and(|at| at >= cutoff))
        .count();

    let mut events: Vec<Event> = if recent < MIN_RECENT_EVENTS {
        all
    } else {
        all.into_iter()
            .filter(|event| event.created_at.is_some_and(|at| at >= cutoff))
            .collect()
    };
    events.truncate(MAX_EVENTS);
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn event(id: usize, at: DateTime<Utc>) -> Event {
        serde_json::from_value(json!({
            "id": id.to_string(),
            "type": "WatchEvent",
            "payload": {},
            "created_at": at.to_rfc3339(),
        }))
        .unwrap()
    }

    #[test]
    fn keeps_old_events_when_too_few_are_recent() {
        let now = Utc.with_ymd_and_hms(2024, 5, 20, 0, 0, 0).unwrap();
        let cutoff = now - chrono::Duration::days(14);
        let batches = vec![
            vec![event(1, now), event(2, now - chrono::Duration::days(30))],
            vec![event(3, now - chrono::Duration::days(1))],
        ];

        let events = select_recent(batches, cutoff);
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn drops_stale_events_and_caps_the_total() {
        let now = Utc.with_ymd_and_hms(2024, 5, 20, 0, 0, 0).unwrap();
        let cutoff = now - chrono::Duration::days(14);
        let fresh: Vec<Event> = (0..120).map(|i| event(i, now)).collect();
        let stale = vec![event(999, now - chrono::Duration::days(40))];

        let events = select_recent(vec![stale, fresh], cutoff);
        assert_eq!(events.len(), 100);
        assert!(events.iter().all(|e| e.id != "999"));
        assert_eq!(events[0].id, "0");
    }

    #[test]
    fn curated_list_has_thirty_accounts() {
        assert_eq!(CURATED_USERS.len(), 30);
        assert!(CURATED_USERS.contains(&"torvalds"));
    }
}
