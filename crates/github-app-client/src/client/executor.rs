//! Request execution with reactive credential renewal.
//!
//! Each attempt signs an application token if none is cached, sends the
//! request with the bearer token for its scope, and inspects the response.
//! When the response signals expiration and attempts remain, one credential is
//! renewed and the identical request is sent again. The credential lock is
//! held for the whole sequence.

use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::credentials::CredentialStore;
use crate::client::{ApiRequest, GitHubAppClient, Renewal};
use crate::error::ApiError;

/// Status and decoded body of one HTTP exchange.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub(crate) status: u16,
    pub(crate) body: Value,
}

impl GitHubAppClient {
    /// Execute a request, renewing credentials reported as expired.
    ///
    /// Returns the decoded JSON body of the final response whatever its
    /// status; an empty body decodes to `null`. Callers inspect the body for
    /// GitHub error fields.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if an application token cannot be signed, the
    /// request fails in transport, or the response body is not JSON.
    pub async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let mut credentials = self.credentials.lock().await;
        self.execute_locked(&mut credentials, &request).await
    }

    async fn execute_locked(
        &self,
        credentials: &mut CredentialStore,
        request: &ApiRequest,
    ) -> Result<Value, ApiError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let response = self.send_once(credentials, request).await?;

            if attempt >= max_attempts || !self.is_expiration_signal(&response) {
                return Ok(response.body);
            }

            match self.renewal_policy.renewal_for(request.scope) {
                Renewal::ResignAppToken => {
                    debug!(endpoint = %request.endpoint, "Requesting new app token");
                    credentials.clear_app_token();
                }
                Renewal::ReauthenticateInstallation => {
                    let Some(installation_id) = credentials.installation_id() else {
                        warn!(
                            endpoint = %request.endpoint,
                            "Credential expired but no installation has been authenticated"
                        );
                        return Ok(response.body);
                    };

                    debug!(
                        endpoint = %request.endpoint,
                        installation_id = %installation_id,
                        "Requesting new installation token"
                    );
                    self.exchange_installation_token(credentials, installation_id)
                        .await?;
                }
            }

            attempt += 1;
            debug!(
                method = %request.method,
                endpoint = %request.endpoint,
                attempt,
                "Retrying request with renewed credentials"
            );
        }
    }

    /// Send one attempt of `request`, signing an application token first if
    /// none is cached.
    pub(crate) async fn send_once(
        &self,
        credentials: &mut CredentialStore,
        request: &ApiRequest,
    ) -> Result<RawResponse, ApiError> {
        if credentials.app_token().is_none() {
            debug!("Signing new app token");
            let jwt = self.signer.generate_jwt(credentials.app_id()).await?;
            credentials.set_app_token(jwt);
        }

        let url = self.endpoint_url(&request.endpoint);
        let accept = request
            .accept
            .as_deref()
            .unwrap_or(&self.config.default_accept);
        let authorization = format!("Bearer {}", credentials.bearer_for(request.scope));

        let mut builder = self
            .http_client
            .request(request.method.clone(), &url)
            .header(AUTHORIZATION, authorization)
            .header(ACCEPT, accept);
        if let Some(payload) = &request.payload {
            builder = builder.json(payload);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        debug!(
            method = %request.method,
            endpoint = %request.endpoint,
            status,
            "GitHub API response"
        );

        Ok(RawResponse { status, body })
    }

    pub(crate) fn is_expiration_signal(&self, response: &RawResponse) -> bool {
        self.detector
            .is_expiration_signal(response.status, &response.body)
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        let base = self.config.github_api_url.trim_end_matches('/');
        let path = endpoint.strip_prefix('/').unwrap_or(endpoint);
        format!("{}/{}", base, path)
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
