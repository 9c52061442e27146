use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use tracing::{debug, warn};

use crate::db::{follow::queries as follows, post::queries as posts, product::queries as products};
use crate::endpoints::query;
use crate::extract::BearerToken;
use crate::feed::item::{merge_newest_first, post_item, product_item, FeedItem};
use crate::feed::{curated_items, CURATED_THRESHOLD, FEED_LIMIT};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/feed/{username}", get(feed))
}

/// Posts and product updates of the user and everyone they follow,
/// topped up with curated GitHub activity when sparse. Never fails.
async fn feed(State(state): State<AppState>, Path(username): Path<String>, token: BearerToken) -> Json<Vec<FeedItem>> {
    let mut targets = vec![username.clone()];
    let user = username.clone();
    match query(&state, "Failed to load follows", move |conn| follows::following_of(conn, &user)).await {
        Ok(following) => targets.extend(following),
        Err(err) => warn!(error = %err, "feed: follows unavailable"),
    }

    let mut items = Vec::new();

    let authors = targets.clone();
    match query(&state, "Failed to load posts", move |conn| {
        posts::list_recent_by_authors(conn, &authors, FEED_LIMIT as i64)
    })
    .await
    {
        Ok(rows) => items.extend(rows.into_iter().map(post_item)),
        Err(err) => warn!(error = %err, "feed: posts unavailable"),
    }

    match query(&state, "Failed to load products", move |conn| {
        products::list_recent_by_owners(conn, &targets, FEED_LIMIT as i64)
    })
    .await
    {
        Ok(rows) => items.extend(rows.into_iter().map(product_item)),
        Err(err) => warn!(error = %err, "feed: products unavailable"),
    }

    let mut items = merge_newest_first(items, FEED_LIMIT);

    if items.len() < CURATED_THRESHOLD {
        let curated = curated_items(
            &state.curated,
            &state.github,
            &state.summarizer,
            token.as_deref(),
            Utc::now(),
        )
        .await;
        debug!(own = items.len(), curated = curated.len(), "feed: topping up with curated activity");
        items.extend(curated);
        items = merge_newest_first(items, FEED_LIMIT);
    }

    Json(items)
}
