//! Error types for GitHub App client operations.
//!
//! Fatal setup problems (unreadable or malformed keys) surface as [`AuthError`].
//! Request-level failures surface as [`ApiError`]. Non-2xx responses from GitHub
//! are *not* errors: their bodies are handed back to the caller verbatim.

use std::path::PathBuf;

use thiserror::Error;

/// Authentication setup errors.
///
/// None of these are retried; they indicate broken credentials or key material.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The private key file could not be read.
    #[error("Failed to read private key file {path}: {source}")]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid private key format or data.
    #[error("Invalid private key: {message}")]
    InvalidPrivateKey { message: String },

    /// JWT generation failed.
    #[error("JWT generation failed: {message}")]
    JwtGenerationFailed { message: String },
}

impl From<ValidationError> for AuthError {
    fn from(e: ValidationError) -> Self {
        Self::InvalidPrivateKey {
            message: e.to_string(),
        }
    }
}

/// Errors during GitHub API operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Signing a new application token failed.
    #[error("Token generation failed: {0}")]
    TokenGenerationFailed(#[from] AuthError),

    /// The request could not be built from the supplied input.
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    /// The HTTP client could not be configured.
    #[error("Client configuration error: {message}")]
    Configuration { message: String },

    /// Failed to parse a JSON response from GitHub.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// HTTP client error (network, TLS, timeout, etc.).
    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),
}

impl ApiError {
    /// Check if this error represents a transient condition that may succeed if retried.
    ///
    /// Only transport failures qualify. Token expiration is handled inside the
    /// client and never reaches the caller as an error.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpClientError(e) => e.is_timeout() || e.is_connect(),
            Self::TokenGenerationFailed(_) => false,
            Self::InvalidRequest(_) => false,
            Self::Configuration { .. } => false,
            Self::JsonError(_) => false,
        }
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("Required field missing: {field}")]
    Required { field: String },

    /// A field has an invalid format.
    #[error("Invalid format for {field}: {message}")]
    InvalidFormat { field: String, message: String },

    /// A field value is out of the acceptable range.
    #[error("Value out of range for {field}: {message}")]
    OutOfRange { field: String, message: String },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
