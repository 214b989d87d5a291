use github_app_cli::{run_cli, CliError};
use tracing::error;

#[tokio::main]
async fn main() {
    if let Err(e) = run_cli().await {
        error!("CLI error: {}", e);
        eprintln!("Error: {}", e);

        // Exit with appropriate code based on error type
        let exit_code = match e {
            CliError::Configuration(_) => 1,
            CliError::Auth(_) => 2,
            CliError::Api(_) => 3,
            CliError::CommandFailed { .. } => 4,
            CliError::InvalidArgument { .. } => 5,
            CliError::Output(_) => 6,
            CliError::Logging { .. } => 7,
        };

        std::process::exit(exit_code);
    }
}
