use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::warn;

use crate::db::reaction::{models::NewReaction, queries};
use crate::endpoints::{non_blank, query};
use crate::error::ApiError;
use crate::fallback::ReactionCounts;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/reactions", get(counts).post(add).delete(remove))
}

#[derive(Deserialize)]
pub struct CountsQuery {
    ids: Option<String>,
}

#[derive(Deserialize)]
pub struct ReactionBody {
    item_id: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    user: Option<String>,
}

struct Reaction {
    item_id: String,
    kind: String,
    user: String,
}

impl ReactionBody {
    fn validate(self) -> Result<Reaction, ApiError> {
        let (Some(item_id), Some(kind), Some(user)) = (non_blank(self.item_id), non_blank(self.kind), non_blank(self.user))
        else {
            return Err(ApiError::bad_request("item_id, type, user required"));
        };
        Ok(Reaction { item_id, kind, user })
    }
}

fn split_ids(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

fn group_counts(rows: Vec<(String, String, i64)>) -> ReactionCounts {
    let mut counts = ReactionCounts::new();
    for (item_id, kind, count) in rows {
        counts.entry(item_id).or_default().insert(kind, count);
    }
    counts
}

/// `{ item_id: { type: count } }`; items without reactions are absent.
async fn counts(State(state): State<AppState>, Query(params): Query<CountsQuery>) -> Json<ReactionCounts> {
    let ids = split_ids(params.ids.as_deref());
    if ids.is_empty() {
        return Json(ReactionCounts::new());
    }

    let lookup = ids.clone();
    match query(&state, "Failed to count reactions", move |conn| {
        queries::count_for_items(conn, &lookup)
    })
    .await
    {
        Ok(rows) => Json(group_counts(rows)),
        Err(err) => {
            warn!(error = %err, "reactions table unavailable, using memory store");
            Json(state.reactions.counts(&ids))
        }
    }
}

async fn add(State(state): State<AppState>, Json(body): Json<ReactionBody>) -> Result<StatusCode, ApiError> {
    let Reaction { item_id, kind, user } = body.validate()?;

    let (i, k, u) = (item_id.clone(), kind.clone(), user.clone());
    let stored = query(&state, "Failed to add reaction", move |conn| {
        let row = NewReaction {
            item_id: &i,
            reaction_type: &k,
            user: &u,
        };
        queries::insert_reaction(conn, &row)
    })
    .await;

    if let Err(err) = stored {
        warn!(error = %err, "reactions table unavailable, using memory store");
        state.reactions.add(&item_id, &kind, &user);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn remove(State(state): State<AppState>, Json(body): Json<ReactionBody>) -> Result<StatusCode, ApiError> {
    let Reaction { item_id, kind, user } = body.validate()?;

    let (i, k, u) = (item_id.clone(), kind.clone(), user.clone());
    let deleted = query(&state, "Failed to remove reaction", move |conn| {
        let row = NewReaction {
            item_id: &i,
            reaction_type: &k,
            user: &u,
        };
        queries::delete_reaction(conn, &row)
    })
    .await;

    if let Err(err) = deleted {
        warn!(error = %err, "reactions table unavailable, using memory store");
        state.reactions.remove(&item_id, &kind, &user);
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_split_and_trimmed() {
        assert_eq!(split_ids(Some("a, b,,c")), vec!["a", "b", "c"]);
        assert!(split_ids(Some("  ")).is_empty());
        assert!(split_ids(None).is_empty());
    }

    #[test]
    fn grouped_counts_nest_by_item() {
        let counts = group_counts(vec![
            ("e1".into(), "like".into(), 3),
            ("e1".into(), "fire".into(), 1),
            ("e2".into(), "like".into(), 2),
        ]);
        assert_eq!(counts["e1"]["like"], 3);
        assert_eq!(counts["e1"]["fire"], 1);
        assert_eq!(counts["e2"].len(), 1);
    }

    #[test]
    fn any_non_blank_reaction_type_is_stored() {
        let body = ReactionBody {
            item_id: Some("e1".into()),
            kind: Some("rocket".into()),
            user: Some("ada".into()),
        };
        let reaction = body.validate().unwrap();
        assert_eq!(reaction.kind, "rocket");

        let blank = ReactionBody {
            item_id: Some("e1".into()),
            kind: Some(" ".into()),
            user: Some("ada".into()),
        };
        assert!(matches!(blank.validate(), Err(ApiError::BadRequest { .. })));
    }
}
