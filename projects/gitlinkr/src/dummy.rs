//! Canned GitHub data served when `USE_DUMMY_DATA=true`.

use serde_json::{json, Value};

pub const DUMMY_TOKEN: &str = "dummy-access-token";

pub fn user() -> Value {
    json!({
        "login": "octocat",
        "name": "The Octocat",
        "avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4",
        "bio": "Living out my days in test fixtures 🐙",
        "location": "Internet",
    })
}

pub fn repos() -> Value {
    json!([
        {
            "id": 1,
            "name": "Hello-World",
            "stargazers_count": 1500,
            "forks_count": 300,
            "language": "JavaScript",
            "html_url": "https://github.com/octocat/Hello-World",
            "description": "My first repository on GitHub!",
        },
        {
            "id": 2,
            "name": "Spoon-Knife",
            "stargazers_count": 800,
            "forks_count": 120,
            "language": "HTML",
            "html_url": "https://github.com/octocat/Spoon-Knife",
            "description": "This repo is for demonstration purposes only.",
        },
    ])
}

/// Body of `GET /api/profile/{username}`.
pub fn profile_response() -> Value {
    json!({ "user": user(), "repos": repos() })
}

/// Body of the GitHub OAuth callback.
pub fn auth_response() -> Value {
    json!({ "token": DUMMY_TOKEN, "user": user(), "repos": repos() })
}
