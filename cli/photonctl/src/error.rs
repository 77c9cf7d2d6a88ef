//! Error handling and display for the CLI.

use colored::Colorize;
use thiserror::Error;

use crate::poll::TaskError;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Client(#[from] photon_sdk::ApiClientError),

    #[error(transparent)]
    Task(#[from] TaskError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);

    // Check for specific error types and provide hints
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        match cli_err {
            CliError::Client(client_err) => print_client_hint(client_err),
            CliError::Task(TaskError::Timeout { task_id, .. }) => {
                eprintln!(
                    "\n{}",
                    format!(
                        "Hint: The operation may still be running. Check `photon task show {task_id}`."
                    )
                    .yellow()
                );
            }
            _ => {}
        }
    } else if let Some(client_err) = err.downcast_ref::<photon_sdk::ApiClientError>() {
        print_client_hint(client_err);
    }
}

fn print_client_hint(err: &photon_sdk::ApiClientError) {
    match err {
        photon_sdk::ApiClientError::Api { status: 401, .. } => {
            eprintln!(
                "\n{}",
                "Hint: Your session may have expired. Run `photon target login`.".yellow()
            );
        }
        photon_sdk::ApiClientError::Api { status: 403, .. } => {
            eprintln!(
                "\n{}",
                "Hint: You may not have permission for this operation.".yellow()
            );
        }
        photon_sdk::ApiClientError::Transport(_) => {
            eprintln!(
                "\n{}",
                "Hint: Check your network connection and the configured target.".yellow()
            );
        }
        _ => {}
    }
}
