//! App-level operations, authenticated with the application token.

use serde_json::Value;
use tracing::debug;

use crate::client::{ApiRequest, GitHubAppClient};
use crate::error::ApiError;

impl GitHubAppClient {
    /// List all installations of this GitHub App.
    ///
    /// Returns the response body as received: a JSON array on success, or
    /// GitHub's error object otherwise.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use github_app_client::client::GitHubAppClient;
    /// # async fn example(client: &GitHubAppClient) -> Result<(), Box<dyn std::error::Error>> {
    /// let installations = client.list_installations().await?;
    /// for installation in installations.as_array().into_iter().flatten() {
    ///     println!("{} -> {}", installation["id"], installation["account"]["login"]);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_installations(&self) -> Result<Value, ApiError> {
        debug!("Listing app installations");
        self.execute(ApiRequest::get("app/installations")).await
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
