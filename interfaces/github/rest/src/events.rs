use serde_json::Value;
use tracing::debug;
use urlencoding::encode;

use crate::client::{GitHubApi, GitHubRequestError};
use crate::models::Event;

impl GitHubApi {
    /// Latest public events of `username`. Events whose payload does not
    /// decode are skipped rather than failing the whole page.
    pub async fn fetch_public_events(
        &self,
        username: &str,
        token: Option<&str>,
    ) -> Result<Vec<Event>, GitHubRequestError> {
        let path = format!("/users/{}/events/public", encode(username));
        let request = self.get(&path, token).query(&[("per_page", "20")]);
        let raw: Vec<Value> = self.send_json(request).await?;

        Ok(raw
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<Event>(value) {
                Ok(event) => Some(event),
                Err(err) => {
                    debug!(username, error = %err, "skipping undecodable event");
                    None
                }
            })
            .collect())
    }
}
