//! Installation authentication.
//!
//! Exchanges the application token for an installation access token through
//! `POST /app/installations/{installation_id}/access_tokens`.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::auth::{InstallationId, InstallationToken};
use crate::client::credentials::CredentialStore;
use crate::client::{ApiRequest, GitHubAppClient};
use crate::error::ApiError;

/// Outcome of an installation token exchange.
#[derive(Debug, Clone)]
pub enum InstallationAuth {
    /// GitHub issued a token; the client now acts as this installation.
    Authenticated(InstallationToken),
    /// GitHub returned no token. Holds the response body as received; the
    /// client's credentials are unchanged.
    Rejected(Value),
}

impl InstallationAuth {
    /// The issued token, if the exchange succeeded.
    pub fn token(&self) -> Option<&InstallationToken> {
        match self {
            Self::Authenticated(token) => Some(token),
            Self::Rejected(_) => None,
        }
    }

    /// Check whether GitHub issued a token.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

impl GitHubAppClient {
    /// Authenticate as an installation of this app.
    ///
    /// On success the installation and its token are stored and used by all
    /// installation-scoped requests that follow.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the application token cannot be signed or the
    /// exchange fails in transport. A response without a token is not an
    /// error; see [`InstallationAuth::Rejected`].
    pub async fn authenticate_installation(
        &self,
        installation_id: InstallationId,
    ) -> Result<InstallationAuth, ApiError> {
        let mut credentials = self.credentials.lock().await;
        self.exchange_installation_token(&mut credentials, installation_id)
            .await
    }

    /// Run the token exchange under an already-held credential lock.
    ///
    /// The exchange is app-scoped, so the only renewal that applies to it is
    /// signing a new application token.
    pub(crate) async fn exchange_installation_token(
        &self,
        credentials: &mut CredentialStore,
        installation_id: InstallationId,
    ) -> Result<InstallationAuth, ApiError> {
        let request = ApiRequest::post(
            format!("app/installations/{}/access_tokens", installation_id),
            json!({}),
        );
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        let body = loop {
            let response = self.send_once(credentials, &request).await?;

            if attempt >= max_attempts || !self.is_expiration_signal(&response) {
                break response.body;
            }

            debug!(installation_id = %installation_id, "Requesting new app token");
            credentials.clear_app_token();
            attempt += 1;
        };

        let token = body.get("token").and_then(Value::as_str).map(str::to_owned);
        let Some(token) = token else {
            error!(
                installation_id = %installation_id,
                response = %body,
                "Unable to authenticate as installation"
            );
            return Ok(InstallationAuth::Rejected(body));
        };

        let expires_at = body
            .get("expires_at")
            .and_then(Value::as_str)
            .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
            .map(|value| value.with_timezone(&Utc));

        let token = InstallationToken::new(token, installation_id, expires_at);
        credentials.set_installation(token.clone());

        info!(installation_id = %installation_id, "Using installation");
        debug!(
            installation_id = %installation_id,
            token_prefix = %token.token().chars().take(4).collect::<String>(),
            expires_at = ?token.expires_at(),
            "Using installation token"
        );

        Ok(InstallationAuth::Authenticated(token))
    }
}

#[cfg(test)]
#[path = "installation_tests.rs"]
mod tests;
