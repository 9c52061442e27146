//! Open-source startups and SaaS products by momentum heuristics.

use std::sync::OnceLock;

use interfaces_github_rest::{models::RepoSearchItem, GitHubApi};
use regex::Regex;

use crate::discovery::{search_all, RepoCard};

const PER_QUERY: u32 = 20;
const MAX_ITEMS: usize = 30;
const MIN_STARS: u64 = 200;

const EXCLUDED_OWNERS: [&str; 18] = [
    "vercel",
    "facebook",
    "reactjs",
    "angular",
    "vuejs",
    "sveltejs",
    "nuxt",
    "denoland",
    "nodejs",
    "rust-lang",
    "golang",
    "tensorflow",
    "pytorch",
    "huggingface",
    "microsoft",
    "apple",
    "google",
    "openai",
];

const EXCLUDED_NAMES: [&str; 8] = [
    "next.js",
    "react",
    "angular",
    "vue",
    "svelte",
    "nuxt",
    "remix",
    "transformers",
];

const NEGATIVE_PATTERN: &str = r"template|starter|boilerplate|sdk|framework|library|plugin|theme|cookbook|awesome|example|samples?|eslint|prettier|config|types?|docs?|tutorial|playground";

const POSITIVE_PATTERN: &str = r"self[- ]?hosted|saas|analytics|crm|cms|monitoring|observability|status[- ]?page|helpdesk|support|ticket|chat|inbox|forms?|feedback|billing|subscription|email|dashboard|platform|alternative|open[- ]?core|product";

const SIGNAL_TOPICS: [&str; 22] = [
    "startup",
    "saas",
    "open-core",
    "product",
    "self-hosted",
    "opensource",
    "open-source",
    "openstartup",
    "status-page",
    "analytics",
    "cms",
    "crm",
    "billing",
    "subscription",
    "email",
    "forms",
    "helpdesk",
    "support",
    "ticketing",
    "chat",
    "monitoring",
    "observability",
];

pub const FALLBACK_REPOS: [&str; 11] = [
    "supabase/supabase",
    "calcom/cal.com",
    "PostHog/posthog",
    "appwrite/appwrite",
    "nocodb/nocodb",
    "umami-software/umami",
    "outline/outline",
    "plane-dev/plane",
    "medusajs/medusa",
    "openstatusHQ/openstatus",
    "windmill-labs/windmill",
];

fn keyword_patterns() -> &'static (Option<Regex>, Option<Regex>) {
    static PATTERNS: OnceLock<(Option<Regex>, Option<Regex>)> = OnceLock::new();
    PATTERNS.get_or_init(|| (Regex::new(NEGATIVE_PATTERN).ok(), Regex::new(POSITIVE_PATTERN).ok()))
}

fn matches(pattern: &Option<Regex>, text: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(text))
}

/// Search queries for repositories pushed after `since` (`YYYY-MM-DD`).
pub fn queries(since: &str, saas_only: bool) -> Vec<String> {
    if saas_only {
        vec![
            format!("topic:saas pushed:>{since} sort:stars"),
            format!("saas in:description pushed:>{since} sort:stars"),
            format!("subscription billing in:description pushed:>{since} sort:stars"),
            format!("topic:stripe topic:subscription pushed:>{since} sort:stars"),
        ]
    } else {
        vec![
            format!("topic:startup pushed:>{since} sort:stars"),
            format!("topic:saas pushed:>{since} sort:stars"),
            format!("created:>{since} stars:>50 sort:stars"),
        ]
    }
}

/// A product-shaped repository: not a framework or a big-vendor project,
/// at least 200 stars, two of (topic signal, keyword signal, product
/// homepage), and owned by an organisation or backed by a homepage.
pub fn looks_like_startup(repo: &RepoSearchItem) -> bool {
    let (negative, positive) = keyword_patterns();

    let owner = repo.owner.as_ref();
    let owner_login = owner.map(|o| o.login.to_lowercase()).unwrap_or_default();
    let owner_kind = owner
        .and_then(|o| o.kind.as_deref())
        .map(str::to_lowercase)
        .unwrap_or_default();
    let name = repo.name.to_lowercase();
    let description = repo.description.as_deref().unwrap_or_default().to_lowercase();
    let homepage = repo.homepage.as_deref().unwrap_or_default().to_lowercase();

    let excluded = EXCLUDED_OWNERS.contains(&owner_login.as_str())
        || EXCLUDED_NAMES.contains(&name.as_str())
        || matches(negative, &name)
        || matches(negative, &description);
    if excluded || repo.stargazers_count < MIN_STARS {
        return false;
    }

    let topic_signal = repo
        .topics
        .iter()
        .any(|topic| SIGNAL_TOPICS.contains(&topic.to_lowercase().as_str()));
    let keyword_signal = matches(positive, &description) || matches(positive, &name);
    let product_homepage = !homepage.is_empty()
        && !homepage.contains("github.com")
        && !homepage.contains("readthedocs")
        && !homepage.contains("npmjs.com");
    let positives = [topic_signal, keyword_signal, product_homepage]
        .iter()
        .filter(|signal| **signal)
        .count();

    positives >= 2 && (owner_kind == "organization" || product_homepage)
}

/// Top startup repositories, or the fixed fallback list when none qualify.
pub async fn find_startups(github: &GitHubApi, since: &str, saas_only: bool, token: Option<&str>) -> Vec<RepoCard> {
    let repos = search_all(github, &queries(since, saas_only), PER_QUERY, token).await;
    let cards: Vec<RepoCard> = repos
        .into_iter()
        .filter(looks_like_startup)
        .take(MAX_ITEMS)
        .map(RepoCard::from)
        .collect();

    if cards.is_empty() {
        return FALLBACK_REPOS.iter().map(|full| RepoCard::bare(full)).collect();
    }
    cards
}
