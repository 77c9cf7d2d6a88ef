//! Tenant commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use photon_api::{Tenant, TenantCreateSpec};
use tabled::Tabled;

use crate::error::CliError;
use crate::output::{print_machine_row, print_success, print_table};
use crate::poll::wait_on_task_operation;
use crate::resolve::resolve_tenant_id;

use super::CommandContext;

/// Tenant commands.
#[derive(Debug, Args)]
pub struct TenantCommand {
    #[command(subcommand)]
    command: TenantSubcommand,
}

#[derive(Debug, Subcommand)]
enum TenantSubcommand {
    /// List tenants.
    List,

    /// Create a new tenant.
    Create(CreateTenantArgs),

    /// Delete a tenant.
    Delete(DeleteTenantArgs),

    /// Select the default tenant for subsequent commands.
    Set(SetTenantArgs),

    /// Show tenant details.
    Show(ShowTenantArgs),
}

#[derive(Debug, Args)]
struct CreateTenantArgs {
    /// Tenant name.
    name: String,
}

#[derive(Debug, Args)]
struct DeleteTenantArgs {
    /// Tenant ID or name.
    tenant: String,
}

#[derive(Debug, Args)]
struct SetTenantArgs {
    /// Tenant name.
    name: String,
}

#[derive(Debug, Args)]
struct ShowTenantArgs {
    /// Tenant ID or name (defaults to the selected tenant).
    tenant: Option<String>,
}

impl TenantCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            TenantSubcommand::List => list_tenants(ctx).await,
            TenantSubcommand::Create(args) => create_tenant(ctx, args).await,
            TenantSubcommand::Delete(args) => delete_tenant(ctx, args).await,
            TenantSubcommand::Set(args) => set_tenant(ctx, args).await,
            TenantSubcommand::Show(args) => show_tenant(ctx, args).await,
        }
    }
}

#[derive(Debug, Tabled)]
struct TenantRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Name")]
    name: String,
}

impl From<Tenant> for TenantRow {
    fn from(tenant: Tenant) -> Self {
        Self {
            id: tenant.id,
            name: tenant.name,
        }
    }
}

/// List all tenants.
async fn list_tenants(ctx: CommandContext) -> Result<()> {
    let client = ctx.client()?;

    let response = client.list_tenants().await.map_err(CliError::Client)?;

    if ctx.mode.is_scripting() {
        for tenant in &response.items {
            print_machine_row(&[&tenant.id, &tenant.name]);
        }
        return Ok(());
    }

    let rows: Vec<TenantRow> = response.items.into_iter().map(Into::into).collect();
    print_table(&rows);
    Ok(())
}

/// Create a new tenant.
async fn create_tenant(ctx: CommandContext, args: CreateTenantArgs) -> Result<()> {
    let client = ctx.client()?;

    let spec = TenantCreateSpec { name: args.name };
    let task = client.create_tenant(&spec).await.map_err(CliError::Client)?;

    wait_on_task_operation(&client, &task.id, ctx.mode)
        .await
        .map_err(CliError::Task)?;
    Ok(())
}

/// Delete a tenant.
async fn delete_tenant(ctx: CommandContext, args: DeleteTenantArgs) -> Result<()> {
    let client = ctx.client()?;

    let tenant_id = resolve_tenant_id(&client, &args.tenant).await?;
    let task = client
        .delete_tenant(&tenant_id)
        .await
        .map_err(CliError::Client)?;

    wait_on_task_operation(&client, &task.id, ctx.mode)
        .await
        .map_err(CliError::Task)?;
    Ok(())
}

/// Select the default tenant.
async fn set_tenant(mut ctx: CommandContext, args: SetTenantArgs) -> Result<()> {
    let client = ctx.client()?;

    // Verify the tenant exists before saving it.
    resolve_tenant_id(&client, &args.name).await?;

    ctx.config.tenant = Some(args.name.clone());
    // A project selection only makes sense within its tenant.
    ctx.config.project = None;
    ctx.config.save()?;

    if !ctx.mode.is_scripting() {
        print_success(&format!("Tenant set to '{}'", args.name));
    }
    Ok(())
}

/// Show tenant details.
async fn show_tenant(ctx: CommandContext, args: ShowTenantArgs) -> Result<()> {
    let client = ctx.client()?;

    let ident = match args.tenant.as_deref() {
        Some(ident) => ident,
        None => ctx.require_tenant()?,
    };
    let tenant_id = resolve_tenant_id(&client, ident).await?;

    let response = client.list_tenants().await.map_err(CliError::Client)?;
    let tenant = response
        .items
        .into_iter()
        .find(|t| t.id == tenant_id)
        .ok_or_else(|| CliError::NotFound(format!("Tenant '{ident}' not found")))?;

    if ctx.mode.is_scripting() {
        print_machine_row(&[&tenant.id, &tenant.name]);
        return Ok(());
    }

    println!("id: {}", tenant.id);
    println!("name: {}", tenant.name);
    Ok(())
}
