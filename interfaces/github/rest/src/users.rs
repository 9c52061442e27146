use serde_json::Value;
use urlencoding::encode;

use crate::client::{GitHubApi, GitHubRequestError};
use crate::models::PublicProfile;

impl GitHubApi {
    /// `GET /user` for the owner of `token`, returned verbatim.
    pub async fn fetch_authenticated_user(&self, token: &str) -> Result<Value, GitHubRequestError> {
        self.send_json(self.get("/user", Some(token))).await
    }

    pub async fn fetch_public_profile(
        &self,
        username: &str,
        token: Option<&str>,
    ) -> Result<PublicProfile, GitHubRequestError> {
        let path = format!("/users/{}", encode(username));
        self.send_json(self.get(&path, token)).await
    }

    pub async fn fetch_followers(&self, token: &str) -> Result<Vec<Value>, GitHubRequestError> {
        let request = self
            .get("/user/followers", Some(token))
            .query(&[("per_page", "100")]);
        self.send_json(request).await
    }

    pub async fn fetch_following(&self, token: &str) -> Result<Vec<Value>, GitHubRequestError> {
        let request = self
            .get("/user/following", Some(token))
            .query(&[("per_page", "100")]);
        self.send_json(request).await
    }
}
