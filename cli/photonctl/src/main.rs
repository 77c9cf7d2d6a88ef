//! photonctl (photon) - CLI for the Photon controller.
//!
//! Turns subcommands into controller API calls and tracks the resulting
//! asynchronous tasks to completion.

use anyhow::Result;
use clap::Parser;

mod commands;
mod config;
mod error;
mod logging;
mod output;
mod poll;
mod progress;
mod resolve;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose());

    // Run the command
    if let Err(e) = cli.run().await {
        // Print error in a user-friendly way
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
