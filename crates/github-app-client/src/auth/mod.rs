//! GitHub App authentication types.
//!
//! This module provides the credential types used by the client:
//! - ID types (GitHubAppId, InstallationId)
//! - Token types (JsonWebToken, InstallationToken)
//! - Private key material and the JWT signer (see [`jwt`])
//!
//! Token lifetimes are recorded for diagnostics only. The client never checks
//! them before a request; expiration is discovered from GitHub's responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use zeroize::Zeroizing;

use crate::error::ValidationError;

pub mod jwt;

pub use jwt::{JwtGenerator, RS256JwtGenerator};

// ============================================================================
// Core ID Types
// ============================================================================

/// GitHub App identifier assigned during app registration.
///
/// Used as the `iss` claim of every application token.
///
/// # Examples
///
/// ```
/// use github_app_client::auth::GitHubAppId;
///
/// let app_id = GitHubAppId::new(123456);
/// assert_eq!(app_id.as_u64(), 123456);
/// assert_eq!(app_id.to_string(), "123456");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GitHubAppId(u64);

impl GitHubAppId {
    /// Create a new GitHub App ID.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw u64 value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for GitHubAppId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GitHubAppId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<u64>()
            .map_err(|_| ValidationError::InvalidFormat {
                field: "github_app_id".to_string(),
                message: "must be a positive integer".to_string(),
            })?;
        if id == 0 {
            return Err(ValidationError::OutOfRange {
                field: "github_app_id".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }
        Ok(Self::new(id))
    }
}

/// GitHub App installation identifier.
///
/// When a GitHub App is installed on an organization or user account, GitHub
/// assigns an installation ID. Installation tokens are minted per installation.
///
/// # Examples
///
/// ```
/// use github_app_client::auth::InstallationId;
///
/// let installation = InstallationId::new(98765);
/// assert_eq!(installation.as_u64(), 98765);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstallationId(u64);

impl InstallationId {
    /// Create a new installation ID.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw u64 value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for InstallationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InstallationId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<u64>()
            .map_err(|_| ValidationError::InvalidFormat {
                field: "installation_id".to_string(),
                message: "must be a positive integer".to_string(),
            })?;
        if id == 0 {
            return Err(ValidationError::OutOfRange {
                field: "installation_id".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }
        Ok(Self::new(id))
    }
}

// ============================================================================
// Token Types
// ============================================================================

/// Signed application token (JWT) identifying the GitHub App.
///
/// GitHub accepts these for at most 10 minutes. They authenticate app-level
/// endpoints and the installation token exchange.
///
/// The token string is never exposed in Debug output.
///
/// # Examples
///
/// ```
/// use github_app_client::auth::{JsonWebToken, GitHubAppId};
/// use chrono::{Utc, Duration};
///
/// let app_id = GitHubAppId::new(123);
/// let issued_at = Utc::now();
/// let jwt = JsonWebToken::new("encoded.jwt.token".to_string(), app_id, issued_at, issued_at + Duration::minutes(10));
///
/// assert_eq!(jwt.app_id(), app_id);
/// assert_eq!(jwt.token(), "encoded.jwt.token");
/// ```
#[derive(Clone)]
pub struct JsonWebToken {
    token: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    app_id: GitHubAppId,
}

impl JsonWebToken {
    /// Create a new JWT token.
    ///
    /// # Arguments
    ///
    /// * `token` - The encoded JWT string
    /// * `app_id` - The GitHub App ID this token represents
    /// * `issued_at` - The `iat` claim
    /// * `expires_at` - The `exp` claim
    pub fn new(
        token: String,
        app_id: GitHubAppId,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            token,
            issued_at,
            expires_at,
            app_id,
        }
    }

    /// Get the token string for the `Authorization: Bearer <token>` header.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Get the GitHub App ID this token represents.
    pub fn app_id(&self) -> GitHubAppId {
        self.app_id
    }

    /// Get when this token was issued.
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Get the expiration claim of this token.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

// Security: Don't expose token in debug output
impl std::fmt::Debug for JsonWebToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonWebToken")
            .field("app_id", &self.app_id)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

/// Installation-scoped access token returned by the token exchange.
///
/// The token string is never exposed in Debug output.
///
/// # Examples
///
/// ```
/// use github_app_client::auth::{InstallationToken, InstallationId};
///
/// let token = InstallationToken::new("ghs_token".to_string(), InstallationId::new(456), None);
///
/// assert_eq!(token.installation_id(), InstallationId::new(456));
/// assert_eq!(token.token(), "ghs_token");
/// ```
#[derive(Clone)]
pub struct InstallationToken {
    token: String,
    installation_id: InstallationId,
    issued_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl InstallationToken {
    /// Create a new installation token.
    ///
    /// # Arguments
    ///
    /// * `token` - The token string from the GitHub API
    /// * `installation_id` - The installation this token is for
    /// * `expires_at` - Expiry reported by GitHub, when present
    pub fn new(
        token: String,
        installation_id: InstallationId,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            token,
            installation_id,
            issued_at: Utc::now(),
            expires_at,
        }
    }

    /// Get the token string for the `Authorization: Bearer <token>` header.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Get the installation ID this token is for.
    pub fn installation_id(&self) -> InstallationId {
        self.installation_id
    }

    /// Get when this token was received.
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Get the expiry GitHub reported for this token, if any.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

// Security: Redact token in debug output
impl std::fmt::Debug for InstallationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallationToken")
            .field("installation_id", &self.installation_id)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

// ============================================================================
// Key Material
// ============================================================================

/// Private key for JWT signing.
///
/// Holds the PEM bytes of the app's RSA key. The bytes are zeroed on drop and
/// never exposed in Debug output.
#[derive(Clone)]
pub struct PrivateKey {
    key_data: Zeroizing<Vec<u8>>,
    algorithm: KeyAlgorithm,
}

impl PrivateKey {
    /// Get the key data.
    pub fn key_data(&self) -> &[u8] {
        &self.key_data
    }

    /// Get the signing algorithm.
    pub fn algorithm(&self) -> &KeyAlgorithm {
        &self.algorithm
    }
}

// Security: Don't expose key data in debug output
impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm)
            .field("key_data", &"<REDACTED>")
            .finish()
    }
}

/// Key algorithm for JWT signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    RS256,
}

/// JWT claims structure for GitHub App authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Issuer (GitHub App ID)
    pub iss: GitHubAppId,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp, max 10 minutes from iat)
    pub exp: i64,
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
