use clap::Parser as _;
use dotenvy::dotenv;
use schema_bootstrapper::cli::{Cli, Commands};
use schema_bootstrapper::setup::{setup, verify};
use schema_bootstrapper::utils::logging::init_logging;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    init_logging();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Setup { setup_command } => {
            info!(collection = %setup_command.collection, "Executing setup command");
            match setup(setup_command).await {
                Ok(report) => {
                    info!(collection = %report.collection, "Schema bootstrap completed successfully");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!(
                        error = %e,
                        error_chain = ?e,
                        partial = e.is_partial(),
                        untouched = e.left_collection_untouched(),
                        "Failed to bootstrap schema"
                    );
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Verify { verify_command } => {
            info!(collection = %verify_command.collection, "Executing verify command");
            match verify(verify_command).await {
                Ok(_) => ExitCode::SUCCESS,
                Err(e) => {
                    error!(error = %e, error_chain = ?e, "Schema verification failed");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
