//! Pull request operations, authenticated with the installation token.

use serde_json::Value;
use tracing::debug;

use crate::client::{ApiRequest, GitHubAppClient};
use crate::error::ApiError;

impl GitHubAppClient {
    /// List pull requests in a repository.
    pub async fn list_pull_requests(&self, owner: &str, repo: &str) -> Result<Value, ApiError> {
        debug!(owner, repo, "Listing pull requests");
        self.execute(ApiRequest::get(format!("repos/{}/{}/pulls", owner, repo)).as_installation())
            .await
    }

    /// Get a specific pull request by number.
    pub async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pull_number: u64,
    ) -> Result<Value, ApiError> {
        debug!(owner, repo, pull_number, "Getting pull request");
        self.execute(
            ApiRequest::get(format!("repos/{}/{}/pulls/{}", owner, repo, pull_number))
                .as_installation(),
        )
        .await
    }
}

#[cfg(test)]
#[path = "pull_request_tests.rs"]
mod tests;
