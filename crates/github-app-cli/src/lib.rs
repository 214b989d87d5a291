//! # GitHub App CLI
//!
//! Command-line interface for acting as a GitHub App.
//!
//! This module provides CLI commands for:
//! - Listing the installations of an app
//! - Listing the pull requests of a repository as an installation
//!
//! Responses are printed to stdout as pretty JSON, exactly as GitHub returned
//! them. Logs go to stderr.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use github_app_client::{
    ApiError, AuthError, ClientConfig, GitHubAppClient, GitHubAppId, InstallationAuth,
    InstallationId,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// ============================================================================
// CLI Structure
// ============================================================================

/// GitHub App CLI - act as a GitHub App against the REST API
#[derive(Parser, Debug)]
#[command(name = "github-app")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Authenticate as a GitHub App and query the GitHub API")]
pub struct Cli {
    /// Settings file (TOML, YAML or JSON) for API URL, user agent, timeout
    /// and attempts
    #[arg(short, long, global = true, env = "GITHUB_APP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging, also when RUST_LOG sets a lower level
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Enable JSON logging
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List resources visible to the app
    List {
        #[command(subcommand)]
        target: ListTarget,
    },
}

/// Resources that can be listed
#[derive(Subcommand, Debug)]
pub enum ListTarget {
    /// List the installations of the app
    Installations {
        #[command(flatten)]
        auth: AuthArgs,
    },

    /// List the pull requests of a repository, as an installation
    Pulls {
        #[command(flatten)]
        auth: AuthArgs,

        /// Repository owner
        owner: String,

        /// Repository name
        repo: String,
    },
}

/// Credentials identifying the app
#[derive(Args, Debug, Clone)]
pub struct AuthArgs {
    /// GitHub App ID
    #[arg(long, env = "GITHUB_APP_ID")]
    pub app_id: GitHubAppId,

    /// Path to the app's PEM private key
    #[arg(short, long, env = "GITHUB_APP_PRIVATE_KEY_PATH")]
    pub key: PathBuf,

    /// Installation to authenticate as
    #[arg(long = "install-id", env = "GITHUB_APP_INSTALLATION_ID")]
    pub install_id: Option<InstallationId>,
}

// ============================================================================
// Settings
// ============================================================================

/// Client settings loaded from a file and the environment.
///
/// Every field has a default, so no settings source is required.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CliSettings {
    /// GitHub API base URL
    pub api_url: String,
    /// User agent sent with every request
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Attempts per request, counting the first
    pub max_attempts: u32,
}

impl Default for CliSettings {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            api_url: client.github_api_url,
            user_agent: format!("github-app-cli/{}", env!("CARGO_PKG_VERSION")),
            timeout_seconds: client.timeout.as_secs(),
            max_attempts: client.max_attempts,
        }
    }
}

impl CliSettings {
    /// Load settings from an optional file, then `GITHUB_APP__*` environment
    /// variables (e.g. `GITHUB_APP__API_URL`). Later sources win.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading settings file");
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("GITHUB_APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    /// Client configuration for these settings.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_github_api_url(&self.api_url)
            .with_user_agent(&self.user_agent)
            .with_timeout(Duration::from_secs(self.timeout_seconds))
            .with_max_attempts(self.max_attempts)
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// CLI-specific errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("GitHub API error: {0}")]
    Api(#[from] ApiError),

    #[error("Command failed: {message}")]
    CommandFailed { message: String },

    #[error("Invalid argument: {arg} - {message}")]
    InvalidArgument { arg: String, message: String },

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),

    #[error("Logging setup failed: {message}")]
    Logging { message: String },
}

// ============================================================================
// Main Entry Point
// ============================================================================

/// Main CLI entry point
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();

    initialize_logging(cli.debug, cli.json_logs)?;

    let settings = CliSettings::load(cli.config.as_deref())?;
    let body = execute_command(&cli.command, &settings).await?;

    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

/// Initialize logging to stderr.
pub fn initialize_logging(debug: bool, json: bool) -> Result<(), CliError> {
    let env_directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(debug, env_directives.as_deref());

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| CliError::Logging {
        message: e.to_string(),
    })
}

/// Log filter from `RUST_LOG`-style directives, defaulting to `info`.
///
/// `debug` raises the default level to `debug` even when directives are
/// given; target-specific directives still apply.
pub fn log_filter(debug: bool, directives: Option<&str>) -> EnvFilter {
    let filter = directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    if debug {
        filter.add_directive(LevelFilter::DEBUG.into())
    } else {
        filter
    }
}

/// Run a command and return the response body to print.
pub async fn execute_command(command: &Commands, settings: &CliSettings) -> Result<Value, CliError> {
    match command {
        Commands::List { target } => execute_list_command(target, settings).await,
    }
}

async fn execute_list_command(target: &ListTarget, settings: &CliSettings) -> Result<Value, CliError> {
    match target {
        ListTarget::Installations { auth } => {
            info!(app_id = %auth.app_id, "Listing installations");
            let client = build_client(auth, settings)?;

            if let Some(installation_id) = auth.install_id {
                if let Err(message) = authenticate(&client, installation_id).await? {
                    warn!(installation_id = %installation_id, "Continuing without installation");
                    eprintln!("{}", message);
                }
            }

            Ok(client.list_installations().await?)
        }
        ListTarget::Pulls { auth, owner, repo } => {
            let Some(installation_id) = auth.install_id else {
                return Err(CliError::InvalidArgument {
                    arg: "--install-id".to_string(),
                    message: "listing pull requests requires an installation".to_string(),
                });
            };

            info!(
                app_id = %auth.app_id,
                installation_id = %installation_id,
                owner = %owner,
                repo = %repo,
                "Listing pull requests"
            );
            let client = build_client(auth, settings)?;
            if let Err(message) = authenticate(&client, installation_id).await? {
                return Err(CliError::CommandFailed { message });
            }

            Ok(client.list_pull_requests(owner, repo).await?)
        }
    }
}

/// Build a client for the given credentials without contacting GitHub.
fn build_client(auth: &AuthArgs, settings: &CliSettings) -> Result<GitHubAppClient, CliError> {
    let client = GitHubAppClient::from_key_file(auth.app_id, &auth.key)?
        .config(settings.client_config())
        .build()?;

    Ok(client)
}

/// Authenticate as an installation.
///
/// The inner `Err` carries a message with the response GitHub returned when
/// it issued no token.
async fn authenticate(
    client: &GitHubAppClient,
    installation_id: InstallationId,
) -> Result<Result<(), String>, CliError> {
    match client.authenticate_installation(installation_id).await? {
        InstallationAuth::Authenticated(_) => Ok(Ok(())),
        InstallationAuth::Rejected(body) => Ok(Err(format!(
            "Unable to authenticate as installation {}: {}",
            installation_id, body
        ))),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
