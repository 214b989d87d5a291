//! Credential state held by a `GitHubAppClient`.

use crate::auth::{GitHubAppId, InstallationId, InstallationToken, JsonWebToken};
use crate::client::TokenScope;

/// The credentials a client currently holds.
///
/// At most one application token and one installation token are held at a
/// time. Nothing here expires on its own: the application token is dropped
/// when GitHub reports it expired, and the installation token is replaced
/// when the installation is authenticated again.
///
/// The client keeps this behind a lock; callers get copies through
/// [`GitHubAppClient::credentials`](crate::client::GitHubAppClient::credentials).
#[derive(Debug, Clone)]
pub struct CredentialStore {
    app_id: GitHubAppId,
    app_token: Option<JsonWebToken>,
    installation_id: Option<InstallationId>,
    installation_token: Option<InstallationToken>,
}

impl CredentialStore {
    /// Create an empty store for the given app.
    pub fn new(app_id: GitHubAppId) -> Self {
        Self {
            app_id,
            app_token: None,
            installation_id: None,
            installation_token: None,
        }
    }

    /// The app these credentials belong to.
    pub fn app_id(&self) -> GitHubAppId {
        self.app_id
    }

    /// The cached application token.
    pub fn app_token(&self) -> Option<&JsonWebToken> {
        self.app_token.as_ref()
    }

    /// The installation last authenticated successfully.
    pub fn installation_id(&self) -> Option<InstallationId> {
        self.installation_id
    }

    /// The installation token from the last successful exchange.
    pub fn installation_token(&self) -> Option<&InstallationToken> {
        self.installation_token.as_ref()
    }

    /// Bearer value for a request in the given scope.
    ///
    /// Empty when the credential has not been obtained; GitHub then answers
    /// with an authentication error which is handed back to the caller.
    pub(crate) fn bearer_for(&self, scope: TokenScope) -> &str {
        let token = match scope {
            TokenScope::App => self.app_token.as_ref().map(JsonWebToken::token),
            TokenScope::Installation => self
                .installation_token
                .as_ref()
                .map(InstallationToken::token),
        };
        token.unwrap_or_default()
    }

    pub(crate) fn set_app_token(&mut self, token: JsonWebToken) {
        self.app_token = Some(token);
    }

    pub(crate) fn clear_app_token(&mut self) {
        self.app_token = None;
    }

    pub(crate) fn set_installation(&mut self, token: InstallationToken) {
        self.installation_id = Some(token.installation_id());
        self.installation_token = Some(token);
    }
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
