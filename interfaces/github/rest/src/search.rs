use tracing::{debug, warn};
use urlencoding::encode;

use crate::client::{GitHubApi, GitHubRequestError};
use crate::models::{RepoSearchItem, SearchResponse, UserSummary};

impl GitHubApi {
    /// Users with more than five repositories in `lang`. Failures are logged
    /// and yield an empty list.
    pub async fn search_users_by_language(&self, lang: &str, token: Option<&str>) -> Vec<UserSummary> {
        let query = format!("language:{lang} repos:>5");
        match self.search_users(&query, token).await {
            Ok(users) => users,
            Err(err) => {
                warn!(lang, error = %err, "GitHub language search failed");
                Vec::new()
            }
        }
    }

    /// Users whose profile names `company`. When that finds nothing and the
    /// name looks like an organisation slug, falls back to the organisation's
    /// public members, then to an `org:` search. Never fails.
    pub async fn search_users_by_company(&self, company: &str, token: Option<&str>) -> Vec<UserSummary> {
        let by_company = match self.search_users(&format!("company:\"{company}\""), token).await {
            Ok(users) => users,
            Err(err) => {
                warn!(company, error = %err, "GitHub company search failed");
                Vec::new()
            }
        };

        if !by_company.is_empty() || !is_org_slug(company) {
            return by_company;
        }

        let members_path = format!("/orgs/{}/members", encode(company));
        let members_request = self.get(&members_path, token).query(&[("per_page", "30")]);
        match self.send_json::<Vec<UserSummary>>(members_request).await {
            Ok(members) => return members,
            Err(err) => debug!(company, error = %err, "organisation members unavailable"),
        }

        match self.search_users(&format!("org:{company}"), token).await {
            Ok(users) => users,
            Err(err) => {
                warn!(company, error = %err, "GitHub org search failed");
                Vec::new()
            }
        }
    }

    pub async fn search_repositories(
        &self,
        query: &str,
        per_page: u32,
        token: Option<&str>,
    ) -> Result<Vec<RepoSearchItem>, GitHubRequestError> {
        let per_page = per_page.to_string();
        let request = self
            .get("/search/repositories", token)
            .query(&[("q", query), ("per_page", per_page.as_str())]);
        let response: SearchResponse<RepoSearchItem> = self.send_json(request).await?;
        Ok(response.items)
    }

    async fn search_users(
        &self,
        query: &str,
        token: Option<&str>,
    ) -> Result<Vec<UserSummary>, GitHubRequestError> {
        let request = self
            .get("/search/users", token)
            .query(&[("q", query), ("per_page", "30")]);
        let response: SearchResponse<UserSummary> = self.send_json(request).await?;
        Ok(response.items)
    }
}

/// `[A-Za-z0-9-]+`
pub fn is_org_slug(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_org_slugs() {
        assert!(is_org_slug("vercel"));
        assert!(is_org_slug("windmill-labs"));
        assert!(!is_org_slug("Acme Corp"));
        assert!(!is_org_slug("@acme"));
        assert!(!is_org_slug(""));
    }
}
