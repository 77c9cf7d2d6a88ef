//! Persistent disk commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use photon_api::{DiskCreateSpec, PersistentDisk};
use tabled::Tabled;

use crate::error::CliError;
use crate::output::{print_machine_row, print_table};
use crate::poll::wait_on_task_operation;
use crate::resolve::{resolve_project_id, resolve_tenant_id};

use super::CommandContext;

/// Disk commands.
#[derive(Debug, Args)]
pub struct DiskCommand {
    #[command(subcommand)]
    command: DiskSubcommand,
}

#[derive(Debug, Subcommand)]
enum DiskSubcommand {
    /// List disks in the current project.
    List,

    /// Create a new persistent disk.
    Create(CreateDiskArgs),

    /// Delete a disk.
    Delete(DeleteDiskArgs),

    /// Show disk details.
    Show(ShowDiskArgs),
}

#[derive(Debug, Args)]
struct CreateDiskArgs {
    /// Disk name.
    name: String,

    /// Disk flavor.
    #[arg(long)]
    flavor: String,

    /// Capacity in GB.
    #[arg(long)]
    capacity_gb: u64,

    /// Tags to attach (repeatable).
    #[arg(long = "tag")]
    tags: Vec<String>,
}

#[derive(Debug, Args)]
struct DeleteDiskArgs {
    /// Disk ID.
    disk: String,
}

#[derive(Debug, Args)]
struct ShowDiskArgs {
    /// Disk ID.
    disk: String,
}

impl DiskCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            DiskSubcommand::List => list_disks(ctx).await,
            DiskSubcommand::Create(args) => create_disk(ctx, args).await,
            DiskSubcommand::Delete(args) => delete_disk(ctx, args).await,
            DiskSubcommand::Show(args) => show_disk(ctx, args).await,
        }
    }
}

#[derive(Debug, Tabled)]
struct DiskRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Name")]
    name: String,

    #[tabled(rename = "Flavor")]
    flavor: String,

    #[tabled(rename = "GB")]
    capacity_gb: u64,

    #[tabled(rename = "State")]
    state: String,
}

impl From<PersistentDisk> for DiskRow {
    fn from(disk: PersistentDisk) -> Self {
        Self {
            id: disk.id,
            name: disk.name,
            flavor: disk.flavor,
            capacity_gb: disk.capacity_gb,
            state: disk.state,
        }
    }
}

/// Resolve the project scope for disk operations.
async fn require_project_id(ctx: &CommandContext) -> Result<String> {
    let client = ctx.client()?;
    let tenant_id = resolve_tenant_id(&client, ctx.require_tenant()?).await?;
    resolve_project_id(&client, &tenant_id, ctx.require_project()?).await
}

/// List disks in the current project.
async fn list_disks(ctx: CommandContext) -> Result<()> {
    let project_id = require_project_id(&ctx).await?;
    let client = ctx.client()?;

    let response = client
        .list_disks(&project_id)
        .await
        .map_err(CliError::Client)?;

    if ctx.mode.is_scripting() {
        for disk in &response.items {
            print_machine_row(&[
                &disk.id,
                &disk.name,
                &disk.flavor,
                &disk.capacity_gb.to_string(),
                &disk.state,
            ]);
        }
        return Ok(());
    }

    let rows: Vec<DiskRow> = response.items.into_iter().map(Into::into).collect();
    print_table(&rows);
    Ok(())
}

/// Create a new persistent disk.
async fn create_disk(ctx: CommandContext, args: CreateDiskArgs) -> Result<()> {
    let project_id = require_project_id(&ctx).await?;
    let client = ctx.client()?;

    let spec = DiskCreateSpec {
        name: args.name,
        flavor: args.flavor,
        capacity_gb: args.capacity_gb,
        tags: args.tags,
    };
    let task = client
        .create_disk(&project_id, &spec)
        .await
        .map_err(CliError::Client)?;

    wait_on_task_operation(&client, &task.id, ctx.mode)
        .await
        .map_err(CliError::Task)?;
    Ok(())
}

/// Delete a disk.
async fn delete_disk(ctx: CommandContext, args: DeleteDiskArgs) -> Result<()> {
    let client = ctx.client()?;

    let task = client
        .delete_disk(&args.disk)
        .await
        .map_err(|e| match e {
            photon_sdk::ApiClientError::Api { status: 404, .. } => {
                CliError::NotFound(format!("Disk '{}' not found", args.disk))
            }
            other => CliError::Client(other),
        })?;

    wait_on_task_operation(&client, &task.id, ctx.mode)
        .await
        .map_err(CliError::Task)?;
    Ok(())
}

/// Show disk details.
async fn show_disk(ctx: CommandContext, args: ShowDiskArgs) -> Result<()> {
    let client = ctx.client()?;

    let disk = client.get_disk(&args.disk).await.map_err(|e| match e {
        photon_sdk::ApiClientError::Api { status: 404, .. } => {
            CliError::NotFound(format!("Disk '{}' not found", args.disk))
        }
        other => CliError::Client(other),
    })?;

    if ctx.mode.is_scripting() {
        print_machine_row(&[
            &disk.id,
            &disk.name,
            &disk.flavor,
            &disk.capacity_gb.to_string(),
            &disk.state,
        ]);
        return Ok(());
    }

    println!("id: {}", disk.id);
    println!("name: {}", disk.name);
    println!("flavor: {}", disk.flavor);
    println!("capacity_gb: {}", disk.capacity_gb);
    println!("state: {}", disk.state);
    Ok(())
}
