//! JWT (JSON Web Token) generation for GitHub App authentication.
//!
//! Application tokens are how a GitHub App proves its identity. They are used
//! directly on app-level endpoints and exchanged for installation tokens.
//!
//! # GitHub Requirements
//!
//! - JWTs must use RS256 algorithm (RSA Signature with SHA-256)
//! - Maximum expiration time is 10 minutes from issuance
//! - Claims must include `iss` (app ID), `iat` (issued at), and `exp` (expiration)

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;
use tracing::debug;
use zeroize::Zeroizing;

use crate::auth::{GitHubAppId, JsonWebToken, JwtClaims, KeyAlgorithm, PrivateKey};
use crate::error::{AuthError, ValidationError};

/// Interface for application token generation.
///
/// The client holds one of these and calls it whenever it has no cached
/// application token. Tests substitute counting or failing generators.
#[async_trait::async_trait]
pub trait JwtGenerator: Send + Sync {
    /// Generate a signed JWT for the given app.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the private key is unusable or encoding fails.
    async fn generate_jwt(&self, app_id: GitHubAppId) -> Result<JsonWebToken, AuthError>;
}

/// RS256 JWT generator using an RSA private key.
///
/// # Examples
///
/// ```no_run
/// # use github_app_client::auth::{PrivateKey, RS256JwtGenerator};
/// let private_key = PrivateKey::from_file("app-key.pem").unwrap();
/// let generator = RS256JwtGenerator::new(private_key);
/// ```
pub struct RS256JwtGenerator {
    private_key: PrivateKey,
    expiration_duration: Duration,
}

impl RS256JwtGenerator {
    /// Create a new RS256 JWT generator with GitHub's maximum lifetime of
    /// 10 minutes.
    pub fn new(private_key: PrivateKey) -> Self {
        Self {
            private_key,
            expiration_duration: Duration::minutes(10),
        }
    }

    /// Create a new RS256 JWT generator with a custom expiration duration.
    ///
    /// # Panics
    ///
    /// Panics if `expiration_duration` exceeds 10 minutes.
    pub fn with_expiration(private_key: PrivateKey, expiration_duration: Duration) -> Self {
        assert!(
            expiration_duration <= Duration::minutes(10),
            "JWT expiration cannot exceed 10 minutes (GitHub requirement)"
        );

        Self {
            private_key,
            expiration_duration,
        }
    }

    /// Lifetime of the tokens this generator signs.
    pub fn expiration_duration(&self) -> Duration {
        self.expiration_duration
    }

    /// Build JWT claims for the given app ID at the given instant.
    pub(crate) fn build_claims(&self, app_id: GitHubAppId, now: DateTime<Utc>) -> JwtClaims {
        JwtClaims {
            iss: app_id,
            iat: now.timestamp(),
            exp: (now + self.expiration_duration).timestamp(),
        }
    }
}

#[async_trait::async_trait]
impl JwtGenerator for RS256JwtGenerator {
    async fn generate_jwt(&self, app_id: GitHubAppId) -> Result<JsonWebToken, AuthError> {
        let now = Utc::now();
        let claims = self.build_claims(app_id, now);

        let encoding_key = EncodingKey::from_rsa_pem(self.private_key.key_data()).map_err(|e| {
            AuthError::InvalidPrivateKey {
                message: format!("Failed to create encoding key: {}", e),
            }
        })?;

        let token_string = encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
            .map_err(|e| AuthError::JwtGenerationFailed {
                message: format!("Failed to encode JWT: {}", e),
            })?;

        debug!(app_id = %app_id, "Signed new app token");

        Ok(JsonWebToken::new(
            token_string,
            app_id,
            now,
            now + self.expiration_duration,
        ))
    }

}

impl PrivateKey {
    /// Load a PEM-encoded private key from disk.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::KeyFile` if the file cannot be read and
    /// `AuthError::InvalidPrivateKey` if it does not hold an RSA key.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let path = path.as_ref();
        let bytes = Zeroizing::new(std::fs::read(path).map_err(|source| AuthError::KeyFile {
            path: path.to_path_buf(),
            source,
        })?);

        let pem = std::str::from_utf8(&bytes).map_err(|_| AuthError::InvalidPrivateKey {
            message: format!("{} is not a UTF-8 PEM file", path.display()),
        })?;

        Ok(Self::from_pem(pem)?)
    }

    /// Create a private key from a PEM-encoded string.
    ///
    /// Both PKCS#1 (`BEGIN RSA PRIVATE KEY`, as downloaded from GitHub) and
    /// PKCS#8 (`BEGIN PRIVATE KEY`) encodings are accepted.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the PEM is empty, lacks markers, or does
    /// not parse as an RSA private key.
    pub fn from_pem(pem: &str) -> Result<Self, ValidationError> {
        let pem = pem.trim();

        if pem.is_empty() {
            return Err(ValidationError::InvalidFormat {
                field: "private_key".to_string(),
                message: "PEM string cannot be empty".to_string(),
            });
        }

        if !pem.contains("-----BEGIN") || !pem.contains("-----END") {
            return Err(ValidationError::InvalidFormat {
                field: "private_key".to_string(),
                message: "Invalid PEM format: missing BEGIN/END markers".to_string(),
            });
        }

        let parsed = if pem.contains("BEGIN RSA PRIVATE KEY") {
            RsaPrivateKey::from_pkcs1_pem(pem).map_err(|e| e.to_string())
        } else {
            RsaPrivateKey::from_pkcs8_pem(pem).map_err(|e| e.to_string())
        };

        parsed.map_err(|e| ValidationError::InvalidFormat {
            field: "private_key".to_string(),
            message: format!("Failed to parse RSA private key: {}", e),
        })?;

        Ok(Self {
            key_data: Zeroizing::new(pem.as_bytes().to_vec()),
            algorithm: KeyAlgorithm::RS256,
        })
    }
}

#[cfg(test)]
#[path = "jwt_tests.rs"]
mod tests;
