use serde::Deserialize;
use tracing::debug;
use urlencoding::encode;

use crate::client::{GitHubApi, GitHubRequestError};
use crate::models::{CompareDetails, PullRequestDetails, RepoMetadata, Repository};

/// Patches beyond this many files are left out of AI prompts.
const MAX_PATCHED_FILES: usize = 10;

#[derive(Deserialize)]
struct PullRequestBody {
    title: Option<String>,
    body: Option<String>,
}

#[derive(Deserialize)]
struct ChangedFile {
    patch: Option<String>,
}

#[derive(Deserialize)]
struct CompareBody {
    #[serde(default)]
    commits: Vec<CompareCommit>,
    #[serde(default)]
    files: Vec<ChangedFile>,
}

#[derive(Deserialize)]
struct CompareCommit {
    commit: Option<CommitBody>,
}

#[derive(Deserialize)]
struct CommitBody {
    message: Option<String>,
}

impl GitHubApi {
    pub async fn fetch_user_repos(
        &self,
        token: Option<&str>,
        username: &str,
    ) -> Result<Vec<Repository>, GitHubRequestError> {
        let path = format!("/users/{}/repos", encode(username));
        let request = self.get(&path, token).query(&[("per_page", "100")]);
        self.send_json(request).await
    }

    /// `full_name` is `owner/repo` and is used as a raw path.
    pub async fn fetch_repo_metadata(
        &self,
        full_name: &str,
        token: Option<&str>,
    ) -> Result<RepoMetadata, GitHubRequestError> {
        self.send_json(self.get(&format!("/repos/{full_name}"), token))
            .await
    }

    /// Title, body and the first patches of a pull request. A failed files
    /// listing still returns the title and body.
    pub async fn fetch_pull_request_details(
        &self,
        repo_full_name: &str,
        number: u64,
        token: Option<&str>,
    ) -> Result<PullRequestDetails, GitHubRequestError> {
        let pr: PullRequestBody = self
            .send_json(self.get(&format!("/repos/{repo_full_name}/pulls/{number}"), token))
            .await?;

        let files_request = self
            .get(&format!("/repos/{repo_full_name}/pulls/{number}/files"), token)
            .query(&[("per_page", "100")]);

        let patch_summary = match self.send_json::<Vec<ChangedFile>>(files_request).await {
            Ok(files) => Some(join_patches(files)),
            Err(err) => {
                debug!(repo = repo_full_name, number, error = %err, "pull request files unavailable");
                None
            }
        };

        Ok(PullRequestDetails {
            title: pr.title,
            body: pr.body,
            patch_summary,
        })
    }

    pub async fn fetch_compare(
        &self,
        repo_full_name: &str,
        base_sha: &str,
        head_sha: &str,
        token: Option<&str>,
    ) -> Result<CompareDetails, GitHubRequestError> {
        let path = format!("/repos/{repo_full_name}/compare/{base_sha}...{head_sha}");
        let body: CompareBody = self.send_json(self.get(&path, token)).await?;

        let messages = body
            .commits
            .into_iter()
            .filter_map(|c| c.commit.and_then(|commit| commit.message))
            .collect();

        let patch_summary = if body.files.is_empty() {
            None
        } else {
            Some(join_patches(body.files))
        };

        Ok(CompareDetails {
            messages,
            patch_summary,
        })
    }
}

fn join_patches(files: Vec<ChangedFile>) -> String {
    files
        .into_iter()
        .filter_map(|file| file.patch)
        .filter(|patch| !patch.is_empty())
        .take(MAX_PATCHED_FILES)
        .collect::<Vec<_>>()
        .join("\n\n")
}
