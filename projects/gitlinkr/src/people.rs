//! People search across GitHub and LinkedIn (through an Apify actor).

use std::collections::HashMap;

use interfaces_apify_actors::{ActorRun, ApifyClient, ApifyError, PollOptions};
use interfaces_github_rest::models::UserSummary;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

pub const COMPANY_WEIGHT: i64 = 2;
pub const LANGUAGE_WEIGHT: i64 = 1;
/// Upper bound for `maxResults` sent to the actor.
pub const MAX_RESULTS: u64 = 100;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeopleSearch {
    pub keywords: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub lang: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub max_results: Option<u64>,
    pub wait: Option<bool>,
}

impl PeopleSearch {
    pub fn company(&self) -> Option<&str> {
        non_empty(self.company.as_deref())
    }

    pub fn lang(&self) -> Option<&str> {
        non_empty(self.lang.as_deref())
    }

    /// LinkedIn is only searched with keywords, a location or a company.
    pub fn wants_linkedin(&self) -> bool {
        non_empty(self.keywords.as_deref()).is_some()
            || non_empty(self.location.as_deref()).is_some()
            || self.company().is_some()
    }

    /// Actor input. A title is sent under the three names actors accept.
    pub fn actor_input(&self) -> Value {
        let mut input = Map::new();
        if let Some(keywords) = non_empty(self.keywords.as_deref()) {
            input.insert("keywords".into(), json!(keywords));
        }
        if let Some(location) = non_empty(self.location.as_deref()) {
            input.insert("location".into(), json!(location));
        }
        if let Some(company) = self.company() {
            input.insert("company".into(), json!(company));
        }
        if let Some(title) = non_empty(self.title.as_deref()) {
            input.insert("current_job_title".into(), json!(title));
            input.insert("jobTitle".into(), json!(title));
            input.insert("title".into(), json!(title));
        }
        input.insert("maxResults".into(), json!(self.max_results.unwrap_or(10)));
        Value::Object(input)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeopleEnrich {
    pub name: Option<String>,
    pub vanity: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub max_results: Option<u64>,
}

impl PeopleEnrich {
    /// `None` when neither a name, a vanity name nor a company is given.
    pub fn actor_input(&self) -> Option<Value> {
        let parts: Vec<&str> = [&self.name, &self.vanity, &self.company]
            .into_iter()
            .filter_map(|part| non_empty(part.as_deref()))
            .collect();
        if parts.is_empty() {
            return None;
        }

        let mut input = Map::new();
        input.insert("keywords".into(), json!(parts.join(" ").trim()));
        if let Some(location) = non_empty(self.location.as_deref()) {
            input.insert("location".into(), json!(location));
        }
        input.insert("maxResults".into(), json!(self.max_results.unwrap_or(3)));
        Some(Value::Object(input))
    }
}

/// Accepts integers, floats and numeric strings, clamped to `1..=MAX_RESULTS`.
/// Anything else counts as absent.
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(count_from_value))
}

fn count_from_value(value: &Value) -> Option<u64> {
    let count = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    count
        .is_finite()
        .then(|| count.clamp(1.0, MAX_RESULTS as f64) as u64)
}

/// Normalised LinkedIn person from an actor dataset item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub source: &'static str,
    pub full_name: Option<Value>,
    pub headline: Option<Value>,
    pub profile_url: Option<Value>,
    pub location: Option<Value>,
    pub company: Option<Value>,
    pub position: Option<Value>,
    pub raw: Value,
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => true,
    }
}

fn first_truthy<'a>(candidates: impl IntoIterator<Item = Option<&'a Value>>) -> Option<Value> {
    candidates.into_iter().flatten().find(|value| truthy(value)).cloned()
}

/// Accepts both flat items and the nested `basic_info` layout.
pub fn map_apify_person(item: &Value) -> Person {
    let basic = item.get("basic_info");
    let from_basic = |key: &str| basic.and_then(|b| b.get(key));
    let field = |key: &str| item.get(key);

    Person {
        source: "linkedin",
        full_name: first_truthy([from_basic("fullname"), field("fullName"), field("name"), field("profileName")]),
        headline: first_truthy([from_basic("headline"), field("headline"), field("title")]),
        profile_url: first_truthy([
            from_basic("profile_url"),
            field("linkedinUrl"),
            field("profileUrl"),
            field("url"),
        ]),
        location: first_truthy([
            from_basic("location").and_then(|l| l.get("full")),
            field("location"),
            field("city"),
        ]),
        company: first_truthy([from_basic("current_company"), field("company"), field("companyName")]),
        position: first_truthy([field("position"), field("jobTitle")]),
        raw: item.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GitHubPerson {
    pub source: &'static str,
    pub login: String,
    pub html_url: Option<String>,
    pub avatar_url: Option<String>,
    pub score: i64,
}

/// Sums `weight` per login over every list; highest score first, ties in
/// discovery order.
pub fn boost(lists: &[(&[UserSummary], i64)]) -> Vec<GitHubPerson> {
    let mut order: Vec<GitHubPerson> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for (users, weight) in lists {
        for user in users.iter().filter(|user| !user.login.is_empty()) {
            let slot = *index.entry(user.login.as_str()).or_insert_with(|| {
                order.push(GitHubPerson {
                    source: "github",
                    login: user.login.clone(),
                    html_url: user.html_url.clone(),
                    avatar_url: user.avatar_url.clone(),
                    score: 0,
                });
                order.len() - 1
            });
            order[slot].score += weight;
        }
    }

    order.sort_by(|a, b| b.score.cmp(&a.score));
    order
}

/// The `linkedin` half of a people search answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkedInSection {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Person>>,
    #[serde(rename = "rawItems", skip_serializing_if = "Option::is_none")]
    pub raw_items: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<Value>,
    #[serde(rename = "runId", skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl LinkedInSection {
    fn status(status: &str) -> Self {
        Self {
            status: status.to_string(),
            ..Default::default()
        }
    }

    pub fn skipped() -> Self {
        Self {
            items: Some(Vec::new()),
            ..Self::status("SKIPPED")
        }
    }

    pub fn disabled() -> Self {
        Self {
            items: Some(Vec::new()),
            error: Some(json!("APIFY_TOKEN not configured")),
            ..Self::status("DISABLED")
        }
    }

    pub fn from_error(err: ApifyError) -> Self {
        let error = match err {
            ApifyError::Upstream { body, .. } => body,
            ApifyError::MissingRunId => json!("missing run id"),
            other => json!(other.to_string()),
        };
        Self {
            error: Some(error),
            ..Self::status("ERROR")
        }
    }

    pub fn from_run(run: ActorRun) -> Self {
        match run {
            ActorRun::Started { start, .. } => Self {
                run: Some(start),
                ..Self::status("STARTED")
            },
            ActorRun::Finished { status, run, .. } => Self {
                run: Some(run),
                ..Self::status(&status)
            },
            ActorRun::Succeeded { status, items, .. } => {
                let people = items
                    .as_array()
                    .map(|items| items.iter().map(map_apify_person).collect())
                    .unwrap_or_default();
                Self {
                    items: Some(people),
                    raw_items: Some(items),
                    ..Self::status(&status)
                }
            }
            ActorRun::PollTimeout { run_id } => Self {
                run_id: Some(run_id),
                ..Self::status("POLL_TIMEOUT")
            },
        }
    }
}

/// Runs the LinkedIn half of a search; never fails.
pub async fn search_linkedin(apify: Option<&ApifyClient>, search: &PeopleSearch) -> LinkedInSection {
    if !search.wants_linkedin() {
        return LinkedInSection::skipped();
    }
    let Some(apify) = apify else {
        return LinkedInSection::disabled();
    };

    let wait = search.wait.unwrap_or(true).then(PollOptions::default);
    match apify.run_actor(&search.actor_input(), wait).await {
        Ok(run) => LinkedInSection::from_run(run),
        Err(err) => {
            warn!(error = %err, "LinkedIn people search failed");
            LinkedInSection::from_error(err)
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(login: &str) -> UserSummary {
        serde_json::from_value(json!({ "login": login, "html_url": format!("https://github.com/{login}") })).unwrap()
    }

    #[test]
    fn maps_nested_and_flat_items() {
        let nested = map_apify_person(&json!({
            "basic_info": {
                "fullname": "Ada Lovelace",
                "headline": "Engineer",
                "profile_url": "https://linkedin.com/in/ada",
                "location": { "full": "London" },
                "current_company": "Analytical Engines"
            }
        }));
        assert_eq!(nested.full_name, Some(json!("Ada Lovelace")));
        assert_eq!(nested.location, Some(json!("London")));
        assert_eq!(nested.company, Some(json!("Analytical Engines")));
        assert_eq!(nested.position, None);

        let flat = map_apify_person(&json!({ "name": "", "profileName": "Grace", "url": "https://linkedin.com/in/grace", "jobTitle": "Admiral" }));
        assert_eq!(flat.full_name, Some(json!("Grace")));
        assert_eq!(flat.profile_url, Some(json!("https://linkedin.com/in/grace")));
        assert_eq!(flat.position, Some(json!("Admiral")));

        let json = serde_json::to_value(&flat).unwrap();
        assert_eq!(json["source"], "linkedin");
        assert!(json.get("fullName").is_some());
    }

    #[test]
    fn boost_sums_weights_per_login() {
        let company = vec![user("ada"), user("grace")];
        let lang = vec![user("linus"), user("ada")];

        let ranked = boost(&[(company.as_slice(), COMPANY_WEIGHT), (lang.as_slice(), LANGUAGE_WEIGHT)]);
        let scores: Vec<(&str, i64)> = ranked.iter().map(|p| (p.login.as_str(), p.score)).collect();

        assert_eq!(scores, vec![("ada", 3), ("grace", 2), ("linus", 1)]);
    }

    #[test]
    fn search_input_carries_title_aliases() {
        let search = PeopleSearch {
            keywords: Some("rust".into()),
            title: Some("CTO".into()),
            ..Default::default()
        };
        assert!(search.wants_linkedin());
        assert_eq!(
            search.actor_input(),
            json!({ "keywords": "rust", "current_job_title": "CTO", "jobTitle": "CTO", "title": "CTO", "maxResults": 10 })
        );

        assert!(!PeopleSearch { lang: Some("Go".into()), ..Default::default() }.wants_linkedin());
    }

    #[test]
    fn enrich_input_needs_an_identifier() {
        assert_eq!(PeopleEnrich { location: Some("Paris".into()), ..Default::default() }.actor_input(), None);

        let input = PeopleEnrich {
            name: Some("Ada".into()),
            company: Some("Acme".into()),
            location: Some("Paris".into()),
            ..Default::default()
        }
        .actor_input();
        assert_eq!(input, Some(json!({ "keywords": "Ada Acme", "location": "Paris", "maxResults": 3 })));
    }

    #[test]
    fn max_results_are_read_leniently_and_clamped() {
        let max = |body: Value| serde_json::from_value::<PeopleSearch>(body).unwrap().max_results;

        assert_eq!(max(json!({ "maxResults": 12.7 })), Some(12));
        assert_eq!(max(json!({ "maxResults": "25" })), Some(25));
        assert_eq!(max(json!({ "maxResults": 5000 })), Some(MAX_RESULTS));
        assert_eq!(max(json!({ "maxResults": -3 })), Some(1));
        assert_eq!(max(json!({ "maxResults": "lots" })), None);
        assert_eq!(max(json!({ "maxResults": null })), None);
        assert_eq!(max(json!({})), None);

        let enrich: PeopleEnrich = serde_json::from_value(json!({ "name": "Ada", "maxResults": "2.0" })).unwrap();
        assert_eq!(enrich.max_results, Some(2));
    }

    #[tokio::test]
    async fn linkedin_section_reports_skipped_and_disabled() {
        let skipped = search_linkedin(None, &PeopleSearch::default()).await;
        assert_eq!(serde_json::to_value(&skipped).unwrap(), json!({ "status": "SKIPPED", "items": [] }));

        let disabled = search_linkedin(None, &PeopleSearch { company: Some("acme".into()), ..Default::default() }).await;
        assert_eq!(disabled.status, "DISABLED");
        assert_eq!(disabled.error, Some(json!("APIFY_TOKEN not configured")));
    }

    #[test]
    fn runs_map_to_sections() {
        let timeout = LinkedInSection::from_run(ActorRun::PollTimeout { run_id: "r1".into() });
        assert_eq!(serde_json::to_value(&timeout).unwrap(), json!({ "status": "POLL_TIMEOUT", "runId": "r1" }));

        let done = LinkedInSection::from_run(ActorRun::Succeeded {
            run_id: "r2".into(),
            status: "SUCCEEDED".into(),
            run: json!({}),
            items: json!([{ "fullName": "Ada" }]),
        });
        assert_eq!(done.items.as_ref().map(Vec::len), Some(1));
        assert_eq!(done.raw_items, Some(json!([{ "fullName": "Ada" }])));
    }
}
