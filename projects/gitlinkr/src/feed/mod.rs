//! Home feed: stored posts, product updates and curated GitHub activity.

pub mod curated;
pub mod events;
pub mod item;
pub mod series;
pub mod why;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use interfaces_github_rest::GitHubApi;

use crate::feed::curated::CuratedFeed;
use crate::feed::events::{enrich, map_event, Enrichment};
use crate::feed::item::FeedItem;
use crate::feed::series::{cluster_pull_request_series, summarize_series};
use crate::summaries::Summarizer;

pub const FEED_LIMIT: usize = 100;
/// Feeds shorter than this are topped up with curated activity.
pub const CURATED_THRESHOLD: usize = 10;

const ENRICH_CONCURRENCY: usize = 8;

/// Curated events as cards: mapped, enriched, then folded into PR series.
pub async fn curated_items(
    curated: &CuratedFeed,
    github: &GitHubApi,
    summarizer: &Summarizer,
    token: Option<&str>,
    now: DateTime<Utc>,
) -> Vec<FeedItem> {
    let events = curated.events(github, token, now).await;

    // Owned inputs keep the buffered futures free of borrows into `events`.
    let mapped: Vec<(FeedItem, Option<Enrichment>)> = events.iter().map(|event| map_event(event, now)).collect();

    let items: Vec<FeedItem> = stream::iter(mapped)
        .map(|(mut item, enrichment)| async move {
            if let Some(enrichment) = enrichment {
                enrich(&mut item, enrichment, github, summarizer, token).await;
            }
            item
        })
        .buffered(ENRICH_CONCURRENCY)
        .collect()
        .await;

    let mut items = cluster_pull_request_series(items, now);
    summarize_series(&mut items, summarizer).await;
    items
}
