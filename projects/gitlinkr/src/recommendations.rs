//! People-to-follow suggestions from shared languages and company.

use std::collections::HashSet;
use std::time::Duration;

use futures::future::join_all;
use interfaces_github_rest::models::{Repository, UserSummary};
use interfaces_github_rest::{GitHubApi, GitHubRequestError};
use serde::Serialize;
use tracing::debug;

pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);
pub const CACHE_VERSION: &str = "2";
pub const MAX_RECOMMENDATIONS: usize = 24;

const COMPANY_SCORE: i64 = 5;
const LANGUAGE_SCORE: i64 = 2;
const CURATED_SCORE: i64 = 4;

pub const CURATED_LOGINS: [&str; 32] = [
    "yyx990803",
    "gaearon",
    "sindresorhus",
    "tj",
    "addyosmani",
    "simonw",
    "mxstbr",
    "shadcn",
    "tannerlinsley",
    "kentcdodds",
    "anuraghazra",
    "withastro",
    "ruanyf",
    "bradtraversy",
    "hiteshchoudhary",
    "getify",
    "ThePrimeagen",
    "lucidrains",
    "deepseek-ai",
    "swyx",
    "t3dotgg",
    "rauchg",
    "arunoda",
    "amasad",
    "vercel",
    "brycew",
    "danielgross",
    "steveruizok",
    "hakimel",
    "wongmjane",
    "jerrylin",
    "lunasec-io",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub login: String,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
    pub score: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl Candidate {
    fn from_user(user: &UserSummary, score: i64) -> Self {
        Self {
            login: user.login.clone(),
            avatar_url: user.avatar_url.clone(),
            html_url: user.html_url.clone(),
            score,
            company: None,
        }
    }

    pub fn curated(login: &str) -> Self {
        Self {
            login: login.to_string(),
            avatar_url: Some(format!("https://github.com/{login}.png?size=80")),
            html_url: Some(format!("https://github.com/{login}")),
            score: CURATED_SCORE,
            company: None,
        }
    }
}

pub fn cache_key(username: &str, company: Option<&str>, langs: Option<&str>) -> String {
    format!(
        "{CACHE_VERSION}-{username}-{}-{}",
        company.unwrap_or_default(),
        langs.unwrap_or_default()
    )
}

/// Most used repository languages, ties in first-seen order.
pub fn top_languages(repos: &[Repository], limit: usize) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for language in repos.iter().filter_map(|repo| repo.language.as_deref()) {
        match counts.iter_mut().find(|(name, _)| name == language) {
            Some((_, count)) => *count += 1,
            None => counts.push((language.to_string(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(limit).map(|(name, _)| name).collect()
}

/// Comma list override: trimmed, blanks dropped.
pub fn parse_langs(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
        .collect()
}

/// Company matches score 5, users found only by a language search score 2.
/// Each login is scored once, on first sighting. `username` is never
/// suggested. Highest score first, ties in discovery order.
pub fn rank_candidates(username: &str, company_users: &[UserSummary], language_users: &[Vec<UserSummary>]) -> Vec<Candidate> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut ranked: Vec<Candidate> = Vec::new();

    let sightings = company_users
        .iter()
        .map(|user| (user, COMPANY_SCORE))
        .chain(language_users.iter().flatten().map(|user| (user, LANGUAGE_SCORE)));

    for (user, score) in sightings {
        if user.login == username || !seen.insert(user.login.as_str()) {
            continue;
        }
        ranked.push(Candidate::from_user(user, score));
    }

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// Fills up to [`MAX_RECOMMENDATIONS`] with curated logins not already listed.
pub fn top_up(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    for login in CURATED_LOGINS {
        if candidates.len() >= MAX_RECOMMENDATIONS {
            break;
        }
        if candidates.iter().any(|c| c.login == login) {
            continue;
        }
        candidates.push(Candidate::curated(login));
    }
    candidates.truncate(MAX_RECOMMENDATIONS);
    candidates
}

pub fn curated_candidates() -> Vec<Candidate> {
    CURATED_LOGINS
        .iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|login| Candidate::curated(login))
        .collect()
}

/// Sets `company` from each public profile; lookups that fail leave it empty.
pub async fn with_companies(github: &GitHubApi, candidates: Vec<Candidate>, token: Option<&str>) -> Vec<Candidate> {
    join_all(candidates.into_iter().map(|mut candidate| async move {
        match github.fetch_public_profile(&candidate.login, token).await {
            Ok(profile) => candidate.company = profile.company.filter(|c| !c.is_empty()),
            Err(err) => debug!(login = candidate.login, error = %err, "profile lookup failed"),
        }
        candidate
    }))
    .await
}

/// Fails only when the user's repositories cannot be listed.
pub async fn recommend(
    github: &GitHubApi,
    username: &str,
    company: Option<&str>,
    langs_override: Option<&str>,
    token: Option<&str>,
) -> Result<Vec<Candidate>, GitHubRequestError> {
    let repos = github.fetch_user_repos(token, username).await?;
    let langs = match langs_override {
        Some(raw) => parse_langs(raw),
        None => top_languages(&repos, 3),
    };

    let company_users = match company {
        Some(company) => github.search_users_by_company(company, token).await,
        None => Vec::new(),
    };

    let mut language_users = Vec::with_capacity(langs.len());
    for lang in &langs {
        language_users.push(github.search_users_by_language(lang, token).await);
    }

    let ranked = top_up(rank_candidates(username, &company_users, &language_users));
    Ok(with_companies(github, ranked, token).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(login: &str) -> UserSummary {
        serde_json::from_value(json!({ "login": login, "avatar_url": null, "html_url": null })).unwrap()
    }

    fn repo(language: Option<&str>) -> Repository {
        serde_json::from_value(json!({
            "id": 1,
            "name": "r",
            "full_name": "o/r",
            "html_url": "https://github.com/o/r",
            "description": null,
            "language": language,
            "stargazers_count": 0,
            "forks_count": 0
        }))
        .unwrap()
    }

    #[test]
    fn top_languages_counts_and_limits() {
        let repos = vec![
            repo(Some("Rust")),
            repo(Some("Go")),
            repo(Some("Rust")),
            repo(None),
            repo(Some("TypeScript")),
            repo(Some("Go")),
            repo(Some("Rust")),
        ];
        assert_eq!(top_languages(&repos, 2), vec!["Rust", "Go"]);
    }

    #[test]
    fn each_login_is_scored_once() {
        let ranked = rank_candidates(
            "me",
            &[user("co"), user("me")],
            &[vec![user("rust1"), user("co"), user("both")], vec![user("both"), user("me")]],
        );

        let scores: Vec<(&str, i64)> = ranked.iter().map(|c| (c.login.as_str(), c.score)).collect();
        assert_eq!(scores, vec![("co", 5), ("rust1", 2), ("both", 2)]);
    }

    #[test]
    fn polyglots_do_not_outrank_company_matches() {
        let ranked = rank_candidates(
            "me",
            &[user("co")],
            &[vec![user("polyglot")], vec![user("polyglot"), user("co")], vec![user("polyglot")]],
        );

        let scores: Vec<(&str, i64)> = ranked.iter().map(|c| (c.login.as_str(), c.score)).collect();
        assert_eq!(scores, vec![("co", 5), ("polyglot", 2)]);
    }

    #[test]
    fn top_up_fills_with_curated_logins() {
        let ranked = vec![Candidate::curated("gaearon"), Candidate::from_user(&user("ada"), 6)];
        let filled = top_up(ranked);

        assert_eq!(filled.len(), MAX_RECOMMENDATIONS);
        assert_eq!(filled.iter().filter(|c| c.login == "gaearon").count(), 1);
        assert_eq!(filled[2].login, "yyx990803");
        assert_eq!(filled[2].score, 4);
    }

    #[test]
    fn cache_key_is_versioned() {
        assert_eq!(cache_key("ada", Some("acme"), None), "2-ada-acme-");
        assert_eq!(parse_langs(" Rust, ,Go"), vec!["Rust", "Go"]);
    }
}
