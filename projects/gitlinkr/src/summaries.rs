use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use interfaces_openai_chat::{ChatClient, ChatRequest};
use tracing::warn;
use utils_cache::TtlCache;

pub const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const CHANGE_SYSTEM_PROMPT: &str = "You write concise, one-line developer summaries. Focus on impact (performance, correctness, security, DX). Avoid buzzwords. No preamble. 12-20 words ideally.";
const NARRATIVE_SYSTEM_PROMPT: &str = "You are an expert technical writer for developers. Be precise and concrete.";
const NARRATIVE_TASK: &str = "Task: Write a concise, 2-3 sentence narrative that a developer would find engaging.\n- Explain the overall direction and user impact.\n- Avoid fluff; be specific.\n- No preamble labels.\n";

/// A code change to summarise in one line.
#[derive(Debug, Clone, Default)]
pub struct ChangeInput<'a> {
    pub repo: &'a str,
    pub title: Option<&'a str>,
    pub body: Option<&'a str>,
    pub diff: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RepoStats {
    pub stars: Option<u64>,
    pub forks: Option<u64>,
    pub open_issues: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectInput<'a> {
    pub repo: &'a str,
    pub description: Option<&'a str>,
    pub topics: &'a [String],
    pub language: Option<&'a str>,
    pub stats: Option<RepoStats>,
    pub period: Option<&'a str>,
    pub recent_titles: &'a [String],
}

/// AI summaries with a 24 h cache. Without an API key every summary is `None`.
pub struct Summarizer {
    chat: Option<ChatClient>,
    cache: TtlCache<u64, String>,
}

impl Summarizer {
    pub fn new(chat: Option<ChatClient>) -> Self {
        Self {
            chat,
            cache: TtlCache::new(CACHE_TTL),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.chat.is_some()
    }

    pub async fn summarize_change(&self, input: &ChangeInput<'_>) -> Option<String> {
        let prompt = change_prompt(input);
        self.complete(CHANGE_SYSTEM_PROMPT, &prompt, 0.2, 64).await
    }

    pub async fn summarize_project(&self, input: &ProjectInput<'_>) -> Option<String> {
        let prompt = project_prompt(input);
        self.complete(NARRATIVE_SYSTEM_PROMPT, &prompt, 0.3, 220).await
    }

    async fn complete(&self, system: &str, prompt: &str, temperature: f32, max_tokens: u32) -> Option<String> {
        let chat = self.chat.as_ref()?;
        let key = cache_key(chat.model(), prompt);

        if let Some(hit) = self.cache.get(&key) {
            return Some(hit);
        }

        let request = ChatRequest {
            system,
            user: prompt,
            temperature,
            max_tokens,
        };

        match chat.complete(request).await {
            Ok(Some(text)) => {
                self.cache.insert(key, text.clone());
                Some(text)
            }
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "summary request failed");
                None
            }
        }
    }
}

fn cache_key(model: &str, prompt: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    model.hash(&mut hasher);
    '|'.hash(&mut hasher);
    prompt.hash(&mut hasher);
    hasher.finish()
}

pub fn change_prompt(input: &ChangeInput<'_>) -> String {
    let mut parts = vec![format!("Repository: {}", input.repo)];
    if let Some(title) = non_empty(input.title) {
        parts.push(format!("PR Title: {title}"));
    }
    if let Some(body) = non_empty(input.body) {
        parts.push(format!("PR Description: {}", truncate(body, 1200)));
    }
    if let Some(diff) = non_empty(input.diff) {
        parts.push(format!("Diff Summary (truncated):\n{}", truncate(diff, 2000)));
    }
    parts.push("Write one line that explains why this change matters for developers.".to_string());
    parts.join("\n\n")
}

pub fn project_prompt(input: &ProjectInput<'_>) -> String {
    let mut parts = vec![format!("Repository: {}", input.repo)];
    if let Some(description) = non_empty(input.description) {
        parts.push(format!("Description: {}", truncate(description, 400)));
    }
    if let Some(language) = non_empty(input.language) {
        parts.push(format!("Primary language: {language}"));
    }
    if !input.topics.is_empty() {
        let topics: Vec<&str> = input.topics.iter().take(8).map(String::as_str).collect();
        parts.push(format!("Topics: {}", topics.join(", ")));
    }
    if let Some(stats) = input.stats {
        parts.push(format!(
            "Stats: ⭐ {}  Forks {}  Open issues {}",
            dash(stats.stars),
            dash(stats.forks),
            dash(stats.open_issues)
        ));
    }
    if let Some(period) = non_empty(input.period) {
        parts.push(format!("Period: {period}"));
    }
    let titles: Vec<&str> = input.recent_titles.iter().take(12).map(String::as_str).collect();
    parts.push(format!("Recent highlights (titles):\n- {}", titles.join("\n- ")));

    format!("{}\n\n{}", parts.join("\n\n"), NARRATIVE_TASK)
}

/// Strings longer than `max` chars keep `max - 1` chars plus an ellipsis.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn dash(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
