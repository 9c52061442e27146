//! Keyword classifier explaining why an activity matters.

use std::sync::OnceLock;

use regex::Regex;

/// Checked in order; the first match wins.
const RULES: &[(&str, &str)] = &[
    (
        r"perf|optimi[sz]e|faster|latency|throughput|idle|poll|cache|memory|cpu|gc",
        "Improves performance or efficiency for end users.",
    ),
    (
        r"fix|bug|crash|error|regression|fails?|broken|null ref|undefined",
        "Fixes a user-visible bug to increase stability.",
    ),
    (
        r"security|cve|xss|csrf|injection|vuln|patch",
        "Addresses a security risk to protect users and data.",
    ),
    (
        r"feature|add|support|enable|implement|introduc",
        "Adds or enables a new capability.",
    ),
    (
        r"refactor|cleanup|restructure|internal|simplif|maintain",
        "Improves code maintainability for faster future changes.",
    ),
    (
        r"doc|readme|typo|guide|example",
        "Improves documentation to make the project easier to use.",
    ),
    (
        r"test|coverage|ci|workflow|pipeline|build",
        "Strengthens reliability via build/test improvements.",
    ),
    (
        r"type|typing|ts\b|typescript",
        "Improves type safety and developer experience.",
    ),
];

fn rules() -> &'static [(Regex, &'static str)] {
    static COMPILED: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        RULES
            .iter()
            .filter_map(|(pattern, reason)| Regex::new(pattern).ok().map(|re| (re, *reason)))
            .collect()
    })
}

/// `event_type` picks the fallback when no keyword matches.
pub fn derive_why(event_type: &str, title: &str, text: Option<&str>) -> Option<String> {
    let haystack = format!("{title}\n{}", text.unwrap_or_default()).to_lowercase();

    if let Some((_, reason)) = rules().iter().find(|(re, _)| re.is_match(&haystack)) {
        return Some(reason.to_string());
    }

    let fallback = match event_type {
        "ReleaseEvent" => "Delivers a new version with fixes or features.",
        "PullRequestEvent" => "Proposes a change with user-facing impact.",
        "PushEvent" => "Moves the project forward with fresh commits.",
        _ => return None,
    };
    Some(fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_rule_compiles() {
        assert_eq!(rules().len(), RULES.len());
    }

    #[test]
    fn earlier_rules_take_precedence() {
        assert_eq!(
            derive_why("PushEvent", "Fix cache stampede", None).as_deref(),
            Some("Improves performance or efficiency for end users.")
        );
        assert_eq!(
            derive_why("PushEvent", "Fix login crash", None).as_deref(),
            Some("Fixes a user-visible bug to increase stability.")
        );
        assert_eq!(
            derive_why("IssuesEvent", "Bump", Some("Update README")).as_deref(),
            Some("Improves documentation to make the project easier to use.")
        );
    }

    #[test]
    fn falls_back_by_event_type() {
        assert_eq!(
            derive_why("ReleaseEvent", "v1", None).as_deref(),
            Some("Delivers a new version with fixes or features.")
        );
        assert_eq!(
            derive_why("PullRequestEvent", "Bump", None).as_deref(),
            Some("Proposes a change with user-facing impact.")
        );
        assert_eq!(derive_why("GollumEvent", "Bump", None), None);
    }
}
