//! GitHub API client for authenticated operations.
//!
//! This module provides the main `GitHubAppClient` for making authenticated API
//! calls to GitHub as a GitHub App. It supports both app-level operations
//! (using JWT tokens) and installation-level operations (using installation
//! tokens), and renews whichever credential GitHub reports as expired.

mod app;
mod check_run;
mod credentials;
mod executor;
mod expiration;
mod installation;
mod pull_request;

#[cfg(test)]
mod test_support;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::auth::{
    GitHubAppId, InstallationId, InstallationToken, JwtGenerator, PrivateKey, RS256JwtGenerator,
};
use crate::error::{ApiError, AuthError};

pub use check_run::{
    AnnotationLevel, CheckRunAnnotation, CheckRunConclusion, CheckRunOutput, CheckRunStatus,
    CreateCheckRun, UpdateCheckRun, MAX_ANNOTATIONS_PER_REQUEST,
};
pub use credentials::CredentialStore;
pub use expiration::{
    ExpirationClaimDetector, ExpirationDetector, Renewal, RenewalPolicy, EXPIRATION_CLAIM_MARKER,
};
pub use installation::InstallationAuth;

/// Media type GitHub required for GitHub App endpoints while they were in preview.
pub const MACHINE_MAN_PREVIEW: &str = "application/vnd.github.machine-man-preview+json";

/// Media type GitHub required for the Checks API while it was in preview.
pub const ANTIOPE_PREVIEW: &str = "application/vnd.github.antiope-preview+json";

/// Configuration for GitHub API client behavior.
///
/// # Examples
///
/// ```
/// use github_app_client::client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(60))
///     .with_max_attempts(3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// User agent string for API requests (required by GitHub)
    pub user_agent: String,
    /// Request timeout duration
    pub timeout: Duration,
    /// GitHub API base URL
    pub github_api_url: String,
    /// Accept header used when a request does not choose its own
    pub default_accept: String,
    /// Attempts per request, counting the first one. An expired credential is
    /// renewed between attempts.
    pub max_attempts: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("github-app-client/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            github_api_url: "https://api.github.com".to_string(),
            default_accept: MACHINE_MAN_PREVIEW.to_string(),
            max_attempts: 2,
        }
    }
}

impl ClientConfig {
    /// Create a new builder for client configuration.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the GitHub API base URL.
    pub fn with_github_api_url(mut self, url: impl Into<String>) -> Self {
        self.github_api_url = url.into();
        self
    }

    /// Set the default Accept header.
    pub fn with_default_accept(mut self, accept: impl Into<String>) -> Self {
        self.default_accept = accept.into();
        self
    }

    /// Set the number of attempts per request. Values below 1 are raised to 1.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

/// Builder for constructing `ClientConfig` instances.
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new configuration builder with defaults.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the GitHub API base URL.
    pub fn github_api_url(mut self, url: impl Into<String>) -> Self {
        self.config.github_api_url = url.into();
        self
    }

    /// Set the default Accept header.
    pub fn default_accept(mut self, accept: impl Into<String>) -> Self {
        self.config.default_accept = accept.into();
        self
    }

    /// Set the number of attempts per request.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.max_attempts = max_attempts.max(1);
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Which credential authenticates a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenScope {
    /// Application token (JWT).
    App,
    /// Installation access token.
    Installation,
}

/// Description of a single API call.
///
/// The same description is replayed unchanged when a retry is needed.
///
/// # Examples
///
/// ```
/// use github_app_client::client::{ApiRequest, TokenScope};
///
/// let request = ApiRequest::get("repos/octo/hello/pulls").as_installation();
/// assert_eq!(request.scope, TokenScope::Installation);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL; a leading slash is ignored.
    pub endpoint: String,
    pub payload: Option<Value>,
    pub scope: TokenScope,
    /// Accept header override. `None` uses `ClientConfig::default_accept`.
    pub accept: Option<String>,
}

impl ApiRequest {
    fn new(method: Method, endpoint: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            payload,
            scope: TokenScope::App,
            accept: None,
        }
    }

    /// Create an app-scoped GET request.
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint, None)
    }

    /// Create an app-scoped POST request with a JSON body.
    pub fn post(endpoint: impl Into<String>, payload: Value) -> Self {
        Self::new(Method::POST, endpoint, Some(payload))
    }

    /// Create an app-scoped PATCH request with a JSON body.
    pub fn patch(endpoint: impl Into<String>, payload: Value) -> Self {
        Self::new(Method::PATCH, endpoint, Some(payload))
    }

    /// Authenticate this request with the installation token.
    pub fn as_installation(mut self) -> Self {
        self.scope = TokenScope::Installation;
        self
    }

    /// Use a specific Accept header for this request.
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }
}

/// GitHub API client acting as a GitHub App.
///
/// Holds the app's credentials and renews them reactively: an application
/// token is signed when none is cached, and a request that GitHub rejects
/// with an expiration signal is retried after renewing a credential.
///
/// Clones share the same credentials. Requests through one client are
/// serialized by a lock around the credential store.
///
/// # Examples
///
/// ```no_run
/// # use github_app_client::client::GitHubAppClient;
/// # use github_app_client::auth::{GitHubAppId, InstallationId};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GitHubAppClient::from_key_file(GitHubAppId::new(1234), "app-key.pem")?
///     .installation_id(InstallationId::new(42))
///     .connect()
///     .await?;
///
/// let pulls = client.list_pull_requests("octo", "hello").await?;
/// println!("{}", pulls);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GitHubAppClient {
    signer: Arc<dyn JwtGenerator>,
    detector: Arc<dyn ExpirationDetector>,
    renewal_policy: RenewalPolicy,
    credentials: Arc<Mutex<CredentialStore>>,
    http_client: reqwest::Client,
    config: ClientConfig,
}

impl GitHubAppClient {
    /// Create a new builder for a client signing with the given generator.
    pub fn builder(
        app_id: GitHubAppId,
        signer: impl JwtGenerator + 'static,
    ) -> GitHubAppClientBuilder {
        GitHubAppClientBuilder::new(app_id, signer)
    }

    /// Create a builder that signs with the RSA key stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the key file is unreadable or malformed.
    pub fn from_key_file(
        app_id: GitHubAppId,
        path: impl AsRef<Path>,
    ) -> Result<GitHubAppClientBuilder, AuthError> {
        let key = PrivateKey::from_file(path)?;
        Ok(Self::builder(app_id, RS256JwtGenerator::new(key)))
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the renewal policy in effect.
    pub fn renewal_policy(&self) -> RenewalPolicy {
        self.renewal_policy
    }

    /// Get a copy of the current credential state.
    pub async fn credentials(&self) -> CredentialStore {
        self.credentials.lock().await.clone()
    }

    /// Get the installation this client is currently authenticated as.
    pub async fn installation_id(&self) -> Option<InstallationId> {
        self.credentials.lock().await.installation_id()
    }

    /// Get the current installation token, if one has been obtained.
    pub async fn installation_token(&self) -> Option<InstallationToken> {
        self.credentials.lock().await.installation_token().cloned()
    }

    /// Make an app-scoped GET request.
    pub async fn get(&self, endpoint: &str) -> Result<Value, ApiError> {
        self.execute(ApiRequest::get(endpoint)).await
    }

    /// Make an installation-scoped GET request.
    pub async fn get_as_installation(&self, endpoint: &str) -> Result<Value, ApiError> {
        self.execute(ApiRequest::get(endpoint).as_installation()).await
    }

    /// Make an app-scoped POST request.
    pub async fn post(&self, endpoint: &str, payload: Value) -> Result<Value, ApiError> {
        self.execute(ApiRequest::post(endpoint, payload)).await
    }

    /// Make an installation-scoped POST request.
    pub async fn post_as_installation(
        &self,
        endpoint: &str,
        payload: Value,
    ) -> Result<Value, ApiError> {
        self.execute(ApiRequest::post(endpoint, payload).as_installation()).await
    }

    /// Make an installation-scoped PATCH request.
    pub async fn patch_as_installation(
        &self,
        endpoint: &str,
        payload: Value,
    ) -> Result<Value, ApiError> {
        self.execute(ApiRequest::patch(endpoint, payload).as_installation()).await
    }
}

impl std::fmt::Debug for GitHubAppClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubAppClient")
            .field("config", &self.config)
            .field("renewal_policy", &self.renewal_policy)
            .field("signer", &"<JwtGenerator>")
            .finish()
    }
}

/// Builder for constructing `GitHubAppClient` instances.
pub struct GitHubAppClientBuilder {
    app_id: GitHubAppId,
    signer: Arc<dyn JwtGenerator>,
    detector: Option<Arc<dyn ExpirationDetector>>,
    renewal_policy: RenewalPolicy,
    installation_id: Option<InstallationId>,
    config: Option<ClientConfig>,
}

impl GitHubAppClientBuilder {
    fn new(app_id: GitHubAppId, signer: impl JwtGenerator + 'static) -> Self {
        Self {
            app_id,
            signer: Arc::new(signer),
            detector: None,
            renewal_policy: RenewalPolicy::default(),
            installation_id: None,
            config: None,
        }
    }

    /// Set the client configuration.
    ///
    /// If not set, uses `ClientConfig::default()`.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the expiration detector.
    ///
    /// If not set, uses `ExpirationClaimDetector::default()`.
    pub fn expiration_detector(mut self, detector: impl ExpirationDetector + 'static) -> Self {
        self.detector = Some(Arc::new(detector));
        self
    }

    /// Choose which credential is renewed when a request reports expiration.
    pub fn renewal_policy(mut self, policy: RenewalPolicy) -> Self {
        self.renewal_policy = policy;
        self
    }

    /// Installation to authenticate as when the client connects.
    pub fn installation_id(mut self, installation_id: InstallationId) -> Self {
        self.installation_id = Some(installation_id);
        self
    }

    /// Build the client without contacting GitHub.
    ///
    /// An installation set with [`installation_id`](Self::installation_id) is
    /// ignored here; use [`connect`](Self::connect) to authenticate it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Configuration` if the HTTP client cannot be created.
    pub fn build(self) -> Result<GitHubAppClient, ApiError> {
        let config = self.config.unwrap_or_default();

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(GitHubAppClient {
            signer: self.signer,
            detector: self
                .detector
                .unwrap_or_else(|| Arc::new(ExpirationClaimDetector::default())),
            renewal_policy: self.renewal_policy,
            credentials: Arc::new(Mutex::new(CredentialStore::new(self.app_id))),
            http_client,
            config,
        })
    }

    /// Build the client and authenticate as the configured installation.
    ///
    /// A rejected installation exchange is logged and the client is still
    /// returned, unauthenticated as any installation.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the client cannot be built, the app token cannot
    /// be signed, or the exchange request fails in transport.
    pub async fn connect(self) -> Result<GitHubAppClient, ApiError> {
        let installation_id = self.installation_id;
        let client = self.build()?;

        if let Some(installation_id) = installation_id {
            client.authenticate_installation(installation_id).await?;
        }

        Ok(client)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
