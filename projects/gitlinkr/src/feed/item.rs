use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::{post::models::Post, product::models::Product};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

impl Artifact {
    pub fn new(kind: &str, url: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            url: url.into(),
        }
    }

    pub fn repo(full_name: &str) -> Self {
        Self::new("repo", format!("https://github.com/{full_name}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Post,
    Product,
    Event,
    Series,
}

/// One card of the home feed.
#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    pub id: String,
    pub author_github_login: String,
    pub title: String,
    pub body: Option<String>,
    pub artifacts: Vec<Artifact>,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "_type")]
    pub kind: ItemKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub why: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<SeriesChild>,
}

/// A member event folded into a series card.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesChild {
    pub id: String,
    pub title: String,
    pub summary: Option<String>,
    pub artifacts: Vec<Artifact>,
    pub created_at: DateTime<Utc>,
}

impl FeedItem {
    /// Full name of the first `repo` artifact pointing at github.com.
    pub fn repo_full_name(&self) -> Option<&str> {
        self.artifacts
            .iter()
            .find(|artifact| artifact.kind == "repo")
            .and_then(|artifact| artifact.url.strip_prefix("https://github.com/"))
            .filter(|name| !name.is_empty())
    }
}

/// Post rows keep only the artifacts shaped like `{type, url}`.
pub fn post_item(row: Post) -> FeedItem {
    let artifacts = match row.artifacts {
        Value::Array(values) => values
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect(),
        _ => Vec::new(),
    };

    FeedItem {
        id: row.id.to_string(),
        author_github_login: row.author_github_login,
        title: row.title,
        body: row.body,
        artifacts,
        created_at: row.created_at,
        kind: ItemKind::Post,
        subtype: None,
        summary: None,
        why: None,
        image_url: None,
        items: Vec::new(),
    }
}

pub fn product_item(row: Product) -> FeedItem {
    FeedItem {
        id: format!("prod-{}-{}", row.id, row.updated_at.to_rfc3339()),
        author_github_login: row.owner_github_login,
        title: format!("Updated {}", row.name),
        body: row.tagline.map(|tagline| format!("\"{tagline}\"")),
        artifacts: vec![Artifact::new("product", format!("/product/{}", row.id))],
        created_at: row.updated_at,
        kind: ItemKind::Product,
        subtype: Some("product_update".to_string()),
        summary: None,
        why: None,
        image_url: None,
        items: Vec::new(),
    }
}

/// Newest first, truncated to `limit`.
pub fn merge_newest_first(mut items: Vec<FeedItem>, limit: usize) -> Vec<FeedItem> {
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    items.truncate(limit);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use uuid::Uuid;

    fn product(tagline: Option<&str>) -> Product {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Product {
            id: Uuid::nil(),
            owner_github_login: "ada".into(),
            name: "Ledger".into(),
            tagline: tagline.map(str::to_string),
            repo_url: None,
            website: None,
            mrr_usd: Some(1200.0),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn product_rows_become_update_cards() {
        let item = product_item(product(Some("Books for devs")));
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["id"], "prod-00000000-0000-0000-0000-000000000000-2024-05-01T12:00:00+00:00");
        assert_eq!(json["title"], "Updated Ledger");
        assert_eq!(json["body"], "\"Books for devs\"");
        assert_eq!(json["_type"], "product");
        assert_eq!(json["subtype"], "product_update");
        assert_eq!(json["artifacts"], json!([{ "type": "product", "url": "/product/00000000-0000-0000-0000-000000000000" }]));
        assert!(json.get("items").is_none());

        assert_eq!(product_item(product(None)).body, None);
    }

    #[test]
    fn post_artifacts_skip_malformed_entries() {
        let item = post_item(Post {
            id: Uuid::nil(),
            author_github_login: "ada".into(),
            title: "Hello".into(),
            body: None,
            artifacts: json!([{ "type": "pr", "url": "https://github.com/a/b/pull/1" }, "junk"]),
            created_at: Utc::now(),
        });

        assert_eq!(item.artifacts, vec![Artifact::new("pr", "https://github.com/a/b/pull/1")]);
        assert_eq!(item.kind, ItemKind::Post);
    }

    #[test]
    fn repo_full_name_reads_the_repo_artifact() {
        let mut item = post_item(Post {
            id: Uuid::nil(),
            author_github_login: "ada".into(),
            title: "Hello".into(),
            body: None,
            artifacts: json!([]),
            created_at: Utc::now(),
        });
        assert_eq!(item.repo_full_name(), None);

        item.artifacts = vec![
            Artifact::new("pr", "https://github.com/octo/app/pull/1"),
            Artifact::repo("octo/app"),
        ];
        assert_eq!(item.repo_full_name(), Some("octo/app"));
    }
}
