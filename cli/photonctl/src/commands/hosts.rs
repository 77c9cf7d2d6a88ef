//! Host commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use photon_api::{Host, HostCreateSpec};
use tabled::Tabled;

use crate::error::CliError;
use crate::output::{print_machine_row, print_table};
use crate::poll::wait_on_task_operation;

use super::CommandContext;

/// Host commands.
#[derive(Debug, Args)]
pub struct HostCommand {
    #[command(subcommand)]
    command: HostSubcommand,
}

#[derive(Debug, Subcommand)]
enum HostSubcommand {
    /// List registered hosts.
    List,

    /// Register a new host.
    Create(CreateHostArgs),

    /// Deregister a host.
    Delete(HostRefArgs),

    /// Show host details.
    Show(HostRefArgs),
}

#[derive(Debug, Args)]
struct CreateHostArgs {
    /// Host management address.
    #[arg(long)]
    address: String,

    /// Management username.
    #[arg(long)]
    username: String,

    /// Management password.
    #[arg(long)]
    password: String,

    /// Usage tags (repeatable).
    #[arg(long = "tag")]
    tags: Vec<String>,
}

#[derive(Debug, Args)]
struct HostRefArgs {
    /// Host ID.
    host: String,
}

impl HostCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            HostSubcommand::List => list_hosts(ctx).await,
            HostSubcommand::Create(args) => create_host(ctx, args).await,
            HostSubcommand::Delete(args) => delete_host(ctx, args).await,
            HostSubcommand::Show(args) => show_host(ctx, args).await,
        }
    }
}

#[derive(Debug, Tabled)]
struct HostRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Address")]
    address: String,

    #[tabled(rename = "State")]
    state: String,

    #[tabled(rename = "Tags")]
    tags: String,
}

impl From<Host> for HostRow {
    fn from(host: Host) -> Self {
        Self {
            id: host.id,
            address: host.address,
            state: host.state,
            tags: host.tags.join(","),
        }
    }
}

fn not_found(e: photon_sdk::ApiClientError, host: &str) -> CliError {
    match e {
        photon_sdk::ApiClientError::Api { status: 404, .. } => {
            CliError::NotFound(format!("Host '{host}' not found"))
        }
        other => CliError::Client(other),
    }
}

/// List registered hosts.
async fn list_hosts(ctx: CommandContext) -> Result<()> {
    let client = ctx.client()?;

    let response = client.list_hosts().await.map_err(CliError::Client)?;

    if ctx.mode.is_scripting() {
        for host in &response.items {
            print_machine_row(&[&host.id, &host.address, &host.state, &host.tags.join(",")]);
        }
        return Ok(());
    }

    let rows: Vec<HostRow> = response.items.into_iter().map(Into::into).collect();
    print_table(&rows);
    Ok(())
}

/// Register a new host.
async fn create_host(ctx: CommandContext, args: CreateHostArgs) -> Result<()> {
    let client = ctx.client()?;

    let spec = HostCreateSpec {
        address: args.address,
        username: args.username,
        password: args.password,
        tags: args.tags,
    };
    let task = client.create_host(&spec).await.map_err(CliError::Client)?;

    wait_on_task_operation(&client, &task.id, ctx.mode)
        .await
        .map_err(CliError::Task)?;
    Ok(())
}

/// Deregister a host.
async fn delete_host(ctx: CommandContext, args: HostRefArgs) -> Result<()> {
    let client = ctx.client()?;

    let task = client
        .delete_host(&args.host)
        .await
        .map_err(|e| not_found(e, &args.host))?;

    wait_on_task_operation(&client, &task.id, ctx.mode)
        .await
        .map_err(CliError::Task)?;
    Ok(())
}

/// Show host details.
async fn show_host(ctx: CommandContext, args: HostRefArgs) -> Result<()> {
    let client = ctx.client()?;

    let host = client
        .get_host(&args.host)
        .await
        .map_err(|e| not_found(e, &args.host))?;

    if ctx.mode.is_scripting() {
        print_machine_row(&[&host.id, &host.address, &host.state, &host.tags.join(",")]);
        return Ok(());
    }

    println!("id: {}", host.id);
    println!("address: {}", host.address);
    println!("state: {}", host.state);
    println!("tags: {}", host.tags.join(","));
    Ok(())
}
