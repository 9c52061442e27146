use futures::future::join_all;
use interfaces_github_rest::GitHubApi;
use serde::Serialize;

use crate::discovery::{search_all, RepoCard};

const PER_BUCKET: usize = 12;

/// A themed list of repositories on the explore page.
pub struct Bucket {
    pub key: &'static str,
    queries: fn(&str) -> Vec<String>,
    fallback: &'static [&'static str],
}

pub static BUCKETS: [Bucket; 10] = [
    Bucket {
        key: "ai_ml",
        queries: |since| {
            vec![
                format!("topic:ai pushed:>{since} sort:stars"),
                format!("topic:machine-learning pushed:>{since} sort:stars"),
                format!("topic:llm pushed:>{since} sort:stars"),
            ]
        },
        fallback: &["langchain-ai/langchain", "huggingface/transformers", "ollama/ollama"],
    },
    Bucket {
        key: "dev_tools",
        queries: |since| {
            vec![
                format!("topic:devtools pushed:>{since} sort:stars"),
                format!("devtools in:description pushed:>{since} sort:stars"),
                format!("topic:cli pushed:>{since} sort:stars"),
            ]
        },
        fallback: &["withastro/astro", "biomejs/biome", "eslint/eslint"],
    },
    Bucket {
        key: "frameworks",
        queries: |since| {
            vec![
                format!("topic:framework pushed:>{since} sort:stars"),
                format!("topic:nextjs pushed:>{since} sort:stars"),
                format!("topic:remix pushed:>{since} sort:stars"),
            ]
        },
        fallback: &["vercel/next.js", "remix-run/remix", "nuxt/nuxt"],
    },
    Bucket {
        key: "databases",
        queries: |since| {
            vec![
                format!("topic:database pushed:>{since} sort:stars"),
                format!("topic:postgres pushed:>{since} sort:stars"),
                format!("topic:sqlite pushed:>{since} sort:stars"),
            ]
        },
        fallback: &["supabase/supabase", "prisma/prisma", "postgres/postgres"],
    },
    Bucket {
        key: "new_and_noteworthy",
        queries: |since| vec![format!("created:>{since} stars:>50 sort:stars")],
        fallback: &["openstatusHQ/openstatus", "windmill-labs/windmill", "langfuse/langfuse"],
    },
    Bucket {
        key: "js_ts",
        queries: |since| {
            vec![
                format!("language:TypeScript pushed:>{since} topic:saas sort:stars"),
                format!("language:JavaScript pushed:>{since} topic:startup sort:stars"),
            ]
        },
        fallback: &["denoland/deno", "sveltejs/svelte", "angular/angular"],
    },
    Bucket {
        key: "python",
        queries: |since| vec![format!("language:Python pushed:>{since} sort:stars")],
        fallback: &["fastapi/fastapi", "pydantic/pydantic"],
    },
    Bucket {
        key: "rust",
        queries: |since| vec![format!("language:Rust pushed:>{since} sort:stars")],
        fallback: &["rust-lang/rust", "astral-sh/uv"],
    },
    Bucket {
        key: "go",
        queries: |since| vec![format!("language:Go pushed:>{since} sort:stars")],
        fallback: &["gin-gonic/gin", "gofiber/fiber"],
    },
    Bucket {
        key: "payments_saas",
        queries: |since| {
            vec![
                format!("stripe in:description pushed:>{since} sort:stars"),
                format!("subscription in:description pushed:>{since} sort:stars"),
                format!("topic:stripe pushed:>{since} sort:stars"),
            ]
        },
        fallback: &["stripe/stripe-cli", "medusajs/medusa"],
    },
];

impl Bucket {
    pub fn queries(&self, since: &str) -> Vec<String> {
        (self.queries)(since)
    }

    pub fn fallback_cards(&self) -> Vec<RepoCard> {
        self.fallback.iter().map(|full| RepoCard::bare(full)).collect()
    }

    /// Up to twelve deduplicated repositories, or the fallback list.
    pub async fn load(&self, github: &GitHubApi, since: &str, token: Option<&str>) -> Vec<RepoCard> {
        let repos = search_all(github, &self.queries(since), PER_BUCKET as u32, token).await;
        let cards: Vec<RepoCard> = repos.into_iter().take(PER_BUCKET).map(RepoCard::from).collect();
        if cards.is_empty() {
            self.fallback_cards()
        } else {
            cards
        }
    }
}

/// Every bucket keyed by name, in a fixed order.
#[derive(Debug, Default, Serialize)]
pub struct Categories {
    pub ai_ml: Vec<RepoCard>,
    pub dev_tools: Vec<RepoCard>,
    pub frameworks: Vec<RepoCard>,
    pub databases: Vec<RepoCard>,
    pub new_and_noteworthy: Vec<RepoCard>,
    pub js_ts: Vec<RepoCard>,
    pub python: Vec<RepoCard>,
    pub rust: Vec<RepoCard>,
    pub go: Vec<RepoCard>,
    pub payments_saas: Vec<RepoCard>,
}

impl Categories {
    fn slot(&mut self, key: &str) -> Option<&mut Vec<RepoCard>> {
        Some(match key {
            "ai_ml" => &mut self.ai_ml,
            "dev_tools" => &mut self.dev_tools,
            "frameworks" => &mut self.frameworks,
            "databases" => &mut self.databases,
            "new_and_noteworthy" => &mut self.new_and_noteworthy,
            "js_ts" => &mut self.js_ts,
            "python" => &mut self.python,
            "rust" => &mut self.rust,
            "go" => &mut self.go,
            "payments_saas" => &mut self.payments_saas,
            _ => return None,
        })
    }
}

pub async fn load_categories(github: &GitHubApi, since: &str, token: Option<&str>) -> Categories {
    let loaded = join_all(BUCKETS.iter().map(|bucket| bucket.load(github, since, token))).await;

    let mut categories = Categories::default();
    for (bucket, cards) in BUCKETS.iter().zip(loaded) {
        if let Some(slot) = categories.slot(bucket.key) {
            *slot = cards;
        }
    }
    categories
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_bucket_has_a_slot_and_fallback() {
        let mut categories = Categories::default();
        for bucket in &BUCKETS {
            assert!(categories.slot(bucket.key).is_some(), "{}", bucket.key);
            assert!(!bucket.fallback_cards().is_empty());
            assert!(!bucket.queries("2024-01-01").is_empty());
        }
    }

    #[test]
    fn queries_embed_the_since_date() {
        let rust = BUCKETS.iter().find(|b| b.key == "rust").unwrap();
        assert_eq!(rust.queries("2024-06-01"), vec!["language:Rust pushed:>2024-06-01 sort:stars"]);
    }
}
