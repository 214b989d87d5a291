//! Shared fixtures for client tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::auth::{GitHubAppId, JsonWebToken, JwtGenerator};
use crate::client::{ClientConfig, GitHubAppClient, GitHubAppClientBuilder};
use crate::error::AuthError;

pub(crate) const APP_ID: u64 = 1234;

/// Signer producing `jwt-1`, `jwt-2`, ... and counting how often it ran.
#[derive(Clone, Default)]
pub(crate) struct CountingSigner {
    calls: Arc<AtomicUsize>,
}

impl CountingSigner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl JwtGenerator for CountingSigner {
    async fn generate_jwt(&self, app_id: GitHubAppId) -> Result<JsonWebToken, AuthError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        Ok(JsonWebToken::new(
            format!("jwt-{}", n),
            app_id,
            now,
            now + Duration::minutes(10),
        ))
    }
}

/// Signer that always fails as if the key were malformed.
pub(crate) struct FailingSigner;

#[async_trait::async_trait]
impl JwtGenerator for FailingSigner {
    async fn generate_jwt(&self, _app_id: GitHubAppId) -> Result<JsonWebToken, AuthError> {
        Err(AuthError::InvalidPrivateKey {
            message: "malformed key".to_string(),
        })
    }
}

/// Builder pointed at the mock server.
pub(crate) fn builder_for(
    server: &MockServer,
    signer: impl JwtGenerator + 'static,
) -> GitHubAppClientBuilder {
    GitHubAppClient::builder(GitHubAppId::new(APP_ID), signer)
        .config(ClientConfig::default().with_github_api_url(server.uri()))
}

/// Client pointed at the mock server.
pub(crate) fn client_for(server: &MockServer, signer: impl JwtGenerator + 'static) -> GitHubAppClient {
    builder_for(server, signer)
        .build()
        .expect("Client should build")
}

/// The response GitHub gives for a token whose `exp` claim has passed.
pub(crate) fn expired_response() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({
        "message": "'Expiration' claim ('exp') must be a numeric value representing the future time at which the assertion expires",
        "documentation_url": "https://docs.github.com/rest"
    }))
}

/// Mount an installation token exchange that answers once with `token`.
pub(crate) async fn mount_exchange_once(server: &MockServer, installation_id: u64, token: &str) {
    Mock::given(method("POST"))
        .and(path(format!(
            "/app/installations/{}/access_tokens",
            installation_id
        )))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "token": token,
            "expires_at": "2030-01-01T00:00:00Z"
        })))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

/// Requests the server received for `request_path`.
pub(crate) async fn requests_to(server: &MockServer, request_path: &str) -> Vec<wiremock::Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == request_path)
        .collect()
}

/// The Authorization header of a received request.
pub(crate) fn bearer_of(request: &wiremock::Request) -> String {
    request
        .headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
