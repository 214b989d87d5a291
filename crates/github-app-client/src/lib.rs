//! # GitHub App Client
//!
//! Authentication and request client for the GitHub REST API acting as a
//! GitHub App.
//!
//! This crate provides:
//! - RS256 application token (JWT) signing from the app's private key
//! - Exchange of application tokens for installation access tokens
//! - Transparent renewal of either credential when GitHub reports it expired
//! - GET/POST/PATCH requests plus helpers for installations, pull requests
//!   and check runs
//!
//! # Examples
//!
//! ```rust,no_run
//! use github_app_client::auth::{GitHubAppId, InstallationId};
//! use github_app_client::client::{CheckRunStatus, CreateCheckRun, GitHubAppClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GitHubAppClient::from_key_file(GitHubAppId::new(123456), "app-key.pem")?
//!     .installation_id(InstallationId::new(789012))
//!     .connect()
//!     .await?;
//!
//! let check = CreateCheckRun::new("pytest", "ca3944e").with_status(CheckRunStatus::InProgress);
//! let created = client.create_check_run("octo", "hello", &check).await?;
//! println!("check run {}", created["id"]);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;

// Re-export commonly used types at crate root for convenience
pub use error::{ApiError, AuthError, ValidationError};

pub use auth::{
    GitHubAppId, InstallationId, InstallationToken, JsonWebToken, JwtClaims, JwtGenerator,
    KeyAlgorithm, PrivateKey, RS256JwtGenerator,
};

pub use client::{
    ApiRequest, ClientConfig, CredentialStore, ExpirationClaimDetector, ExpirationDetector,
    GitHubAppClient, InstallationAuth, RenewalPolicy, TokenScope,
};
