//! VM commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use photon_api::{AttachedDiskSpec, Vm, VmCreateSpec};
use tabled::Tabled;

use crate::error::CliError;
use crate::output::{print_machine_row, print_table};
use crate::poll::wait_on_task_operation;
use crate::resolve::{resolve_project_id, resolve_tenant_id};

use super::CommandContext;

/// VM commands.
#[derive(Debug, Args)]
pub struct VmCommand {
    #[command(subcommand)]
    command: VmSubcommand,
}

#[derive(Debug, Subcommand)]
enum VmSubcommand {
    /// List VMs in the current project.
    List,

    /// Create a new VM.
    Create(CreateVmArgs),

    /// Delete a VM.
    Delete(VmRefArgs),

    /// Show VM details.
    Show(VmRefArgs),

    /// Power on a VM.
    Start(VmRefArgs),

    /// Power off a VM.
    Stop(VmRefArgs),
}

#[derive(Debug, Args)]
struct CreateVmArgs {
    /// VM name.
    name: String,

    /// VM flavor.
    #[arg(long)]
    flavor: String,

    /// Source image ID.
    #[arg(long)]
    image: String,

    /// Boot disk flavor.
    #[arg(long)]
    boot_disk_flavor: String,

    /// Boot disk capacity in GB.
    #[arg(long, default_value = "16")]
    boot_disk_capacity_gb: u64,
}

#[derive(Debug, Args)]
struct VmRefArgs {
    /// VM ID.
    vm: String,
}

impl VmCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            VmSubcommand::List => list_vms(ctx).await,
            VmSubcommand::Create(args) => create_vm(ctx, args).await,
            VmSubcommand::Delete(args) => delete_vm(ctx, args).await,
            VmSubcommand::Show(args) => show_vm(ctx, args).await,
            VmSubcommand::Start(args) => start_vm(ctx, args).await,
            VmSubcommand::Stop(args) => stop_vm(ctx, args).await,
        }
    }
}

#[derive(Debug, Tabled)]
struct VmRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Name")]
    name: String,

    #[tabled(rename = "Flavor")]
    flavor: String,

    #[tabled(rename = "State")]
    state: String,

    #[tabled(rename = "Host")]
    host: String,
}

impl From<Vm> for VmRow {
    fn from(vm: Vm) -> Self {
        Self {
            id: vm.id,
            name: vm.name,
            flavor: vm.flavor,
            state: vm.state,
            host: vm.host.unwrap_or_else(|| "-".to_string()),
        }
    }
}

fn not_found(e: photon_sdk::ApiClientError, vm: &str) -> CliError {
    match e {
        photon_sdk::ApiClientError::Api { status: 404, .. } => {
            CliError::NotFound(format!("VM '{vm}' not found"))
        }
        other => CliError::Client(other),
    }
}

/// Resolve the project scope for VM operations.
async fn require_project_id(ctx: &CommandContext) -> Result<String> {
    let client = ctx.client()?;
    let tenant_id = resolve_tenant_id(&client, ctx.require_tenant()?).await?;
    resolve_project_id(&client, &tenant_id, ctx.require_project()?).await
}

/// List VMs in the current project.
async fn list_vms(ctx: CommandContext) -> Result<()> {
    let project_id = require_project_id(&ctx).await?;
    let client = ctx.client()?;

    let response = client
        .list_vms(&project_id)
        .await
        .map_err(CliError::Client)?;

    if ctx.mode.is_scripting() {
        for vm in &response.items {
            print_machine_row(&[
                &vm.id,
                &vm.name,
                &vm.flavor,
                &vm.state,
                vm.host.as_deref().unwrap_or("-"),
            ]);
        }
        return Ok(());
    }

    let rows: Vec<VmRow> = response.items.into_iter().map(Into::into).collect();
    print_table(&rows);
    Ok(())
}

/// Create a new VM with a boot disk.
async fn create_vm(ctx: CommandContext, args: CreateVmArgs) -> Result<()> {
    let project_id = require_project_id(&ctx).await?;
    let client = ctx.client()?;

    let spec = VmCreateSpec {
        name: args.name.clone(),
        flavor: args.flavor,
        source_image_id: args.image,
        attached_disks: vec![AttachedDiskSpec {
            name: format!("{}-boot", args.name),
            flavor: args.boot_disk_flavor,
            capacity_gb: args.boot_disk_capacity_gb,
            boot_disk: true,
        }],
    };
    let task = client
        .create_vm(&project_id, &spec)
        .await
        .map_err(CliError::Client)?;

    wait_on_task_operation(&client, &task.id, ctx.mode)
        .await
        .map_err(CliError::Task)?;
    Ok(())
}

/// Delete a VM.
async fn delete_vm(ctx: CommandContext, args: VmRefArgs) -> Result<()> {
    let client = ctx.client()?;

    let task = client
        .delete_vm(&args.vm)
        .await
        .map_err(|e| not_found(e, &args.vm))?;

    wait_on_task_operation(&client, &task.id, ctx.mode)
        .await
        .map_err(CliError::Task)?;
    Ok(())
}

/// Show VM details.
async fn show_vm(ctx: CommandContext, args: VmRefArgs) -> Result<()> {
    let client = ctx.client()?;

    let vm = client
        .get_vm(&args.vm)
        .await
        .map_err(|e| not_found(e, &args.vm))?;

    if ctx.mode.is_scripting() {
        print_machine_row(&[
            &vm.id,
            &vm.name,
            &vm.flavor,
            &vm.state,
            vm.host.as_deref().unwrap_or("-"),
        ]);
        return Ok(());
    }

    println!("id: {}", vm.id);
    println!("name: {}", vm.name);
    println!("flavor: {}", vm.flavor);
    println!("state: {}", vm.state);
    println!("image: {}", vm.source_image_id);
    println!("host: {}", vm.host.as_deref().unwrap_or("-"));
    Ok(())
}

/// Power on a VM.
async fn start_vm(ctx: CommandContext, args: VmRefArgs) -> Result<()> {
    let client = ctx.client()?;

    let task = client
        .start_vm(&args.vm)
        .await
        .map_err(|e| not_found(e, &args.vm))?;

    wait_on_task_operation(&client, &task.id, ctx.mode)
        .await
        .map_err(CliError::Task)?;
    Ok(())
}

/// Power off a VM.
async fn stop_vm(ctx: CommandContext, args: VmRefArgs) -> Result<()> {
    let client = ctx.client()?;

    let task = client
        .stop_vm(&args.vm)
        .await
        .map_err(|e| not_found(e, &args.vm))?;

    wait_on_task_operation(&client, &task.id, ctx.mode)
        .await
        .map_err(CliError::Task)?;
    Ok(())
}
