//! Detection of expired credentials and the choice of what to renew.
//!
//! GitHub does not return a machine-readable code for an expired JWT; it
//! answers `401 Unauthorized` with a message mentioning the `'Expiration'
//! claim`. Detection is therefore a pluggable predicate over the response.

use serde_json::Value;

use crate::client::TokenScope;

/// Message fragment GitHub uses when a token's `exp` claim has passed.
pub const EXPIRATION_CLAIM_MARKER: &str = "'Expiration' claim";

/// Decides whether a response reports an expired credential.
///
/// Implemented for any `Fn(u16, &Value) -> bool`, so tests can pass a closure.
///
/// # Examples
///
/// ```
/// use github_app_client::client::ExpirationDetector;
/// use serde_json::json;
///
/// let detector = |status: u16, _body: &serde_json::Value| status == 419;
/// assert!(detector.is_expiration_signal(419, &json!({})));
/// ```
pub trait ExpirationDetector: Send + Sync {
    /// Return true if `body`, received with `status`, signals expiration.
    fn is_expiration_signal(&self, status: u16, body: &Value) -> bool;
}

impl<F> ExpirationDetector for F
where
    F: Fn(u16, &Value) -> bool + Send + Sync,
{
    fn is_expiration_signal(&self, status: u16, body: &Value) -> bool {
        self(status, body)
    }
}

/// Default detector: `401` with a `message` containing a marker string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpirationClaimDetector {
    marker: String,
}

impl ExpirationClaimDetector {
    /// Create a detector matching a custom message fragment.
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// The message fragment this detector looks for.
    pub fn marker(&self) -> &str {
        &self.marker
    }
}

impl Default for ExpirationClaimDetector {
    fn default() -> Self {
        Self::new(EXPIRATION_CLAIM_MARKER)
    }
}

impl ExpirationDetector for ExpirationClaimDetector {
    fn is_expiration_signal(&self, status: u16, body: &Value) -> bool {
        status == 401
            && body
                .get("message")
                .and_then(Value::as_str)
                .is_some_and(|message| message.contains(&self.marker))
    }
}

/// Credential renewal performed before a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Renewal {
    /// Drop the cached application token so the retry signs a new one.
    ResignAppToken,
    /// Exchange a new installation token for the current installation.
    ReauthenticateInstallation,
}

/// Which credential to renew when a request reports expiration.
///
/// The installation token exchange itself always renews the application
/// token, whatever the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenewalPolicy {
    /// Renew the credential the request was sent with.
    #[default]
    ByCredential,
    /// Renew the *other* credential: installation-scoped requests drop the
    /// application token and app-scoped requests re-authenticate the
    /// installation. Kept for compatibility with clients that depend on it;
    /// an expired installation token is never replaced under this policy.
    Legacy,
}

impl RenewalPolicy {
    /// The renewal to perform for an expired request in `scope`.
    pub fn renewal_for(&self, scope: TokenScope) -> Renewal {
        match (self, scope) {
            (Self::ByCredential, TokenScope::App) => Renewal::ResignAppToken,
            (Self::ByCredential, TokenScope::Installation) => Renewal::ReauthenticateInstallation,
            (Self::Legacy, TokenScope::App) => Renewal::ReauthenticateInstallation,
            (Self::Legacy, TokenScope::Installation) => Renewal::ResignAppToken,
        }
    }
}

#[cfg(test)]
#[path = "expiration_tests.rs"]
mod tests;
