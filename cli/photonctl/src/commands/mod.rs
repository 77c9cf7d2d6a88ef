//! CLI commands.

mod disks;
mod hosts;
mod projects;
mod target;
mod tasks;
mod tenants;
mod vms;

use anyhow::Result;
use clap::{Parser, Subcommand};
use photon_sdk::Client;

use crate::config::Config;
use crate::error::CliError;
use crate::output::OutputMode;

/// Photon CLI - manage tenants, projects, and resources on the controller.
#[derive(Debug, Parser)]
#[command(name = "photon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Machine-parseable single-line output, no progress animation.
    #[arg(short = 'n', long, global = true, env = "PHOTON_NON_INTERACTIVE")]
    non_interactive: bool,

    /// Tenant ID or name.
    #[arg(long, global = true, env = "PHOTON_TENANT")]
    tenant: Option<String>,

    /// Project ID or name.
    #[arg(long, global = true, env = "PHOTON_PROJECT")]
    project: Option<String>,

    /// Enable verbose (debug) logging.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage the controller target and authentication.
    Target(target::TargetCommand),

    /// Manage tenants.
    Tenant(tenants::TenantCommand),

    /// Manage projects.
    Project(projects::ProjectCommand),

    /// Manage persistent disks.
    Disk(disks::DiskCommand),

    /// Manage VMs.
    Vm(vms::VmCommand),

    /// Manage hosts (infrastructure).
    Host(hosts::HostCommand),

    /// Inspect and monitor tasks.
    Task(tasks::TaskCommand),

    /// Show CLI version.
    Version,
}

impl Cli {
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        let mode = if self.non_interactive {
            OutputMode::Scripting
        } else {
            OutputMode::Interactive
        };

        let config = Config::load()?;

        // Build context from flags and config
        let ctx = CommandContext {
            config,
            mode,
            tenant: self.tenant,
            project: self.project,
        };

        match self.command {
            Commands::Target(cmd) => cmd.run(ctx).await,
            Commands::Tenant(cmd) => cmd.run(ctx).await,
            Commands::Project(cmd) => cmd.run(ctx).await,
            Commands::Disk(cmd) => cmd.run(ctx).await,
            Commands::Vm(cmd) => cmd.run(ctx).await,
            Commands::Host(cmd) => cmd.run(ctx).await,
            Commands::Task(cmd) => cmd.run(ctx).await,
            Commands::Version => {
                println!("photon {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub config: Config,
    pub mode: OutputMode,
    pub tenant: Option<String>,
    pub project: Option<String>,
}

impl CommandContext {
    /// Get a client for the configured target.
    pub fn client(&self) -> Result<Client> {
        Ok(Client::new(self.config.target(), self.config.token.as_deref())
            .map_err(CliError::Client)?)
    }

    /// Resolve the current tenant, preferring flag over config.
    pub fn resolve_tenant(&self) -> Option<&str> {
        self.tenant.as_deref().or(self.config.tenant.as_deref())
    }

    /// Resolve the current project, preferring flag over config.
    pub fn resolve_project(&self) -> Option<&str> {
        self.project.as_deref().or(self.config.project.as_deref())
    }

    /// Require a tenant to be specified.
    pub fn require_tenant(&self) -> Result<&str> {
        self.resolve_tenant().ok_or_else(|| {
            anyhow::anyhow!("No tenant specified. Use --tenant or `photon tenant set`.")
        })
    }

    /// Require a project to be specified.
    pub fn require_project(&self) -> Result<&str> {
        self.resolve_project().ok_or_else(|| {
            anyhow::anyhow!("No project specified. Use --project or `photon project set`.")
        })
    }
}
