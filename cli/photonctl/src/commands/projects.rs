//! Project commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use photon_api::{Project, ProjectCreateSpec};
use tabled::Tabled;

use crate::error::CliError;
use crate::output::{print_machine_row, print_success, print_table};
use crate::poll::wait_on_task_operation;
use crate::resolve::{resolve_project_id, resolve_tenant_id};

use super::CommandContext;

/// Project commands.
#[derive(Debug, Args)]
pub struct ProjectCommand {
    #[command(subcommand)]
    command: ProjectSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProjectSubcommand {
    /// List projects in the current tenant.
    List,

    /// Create a new project.
    Create(CreateProjectArgs),

    /// Delete a project.
    Delete(DeleteProjectArgs),

    /// Select the default project for subsequent commands.
    Set(SetProjectArgs),

    /// Show project details.
    Show(ShowProjectArgs),
}

#[derive(Debug, Args)]
struct CreateProjectArgs {
    /// Project name.
    name: String,
}

#[derive(Debug, Args)]
struct DeleteProjectArgs {
    /// Project ID or name.
    project: String,
}

#[derive(Debug, Args)]
struct SetProjectArgs {
    /// Project name.
    name: String,
}

#[derive(Debug, Args)]
struct ShowProjectArgs {
    /// Project ID or name (defaults to the selected project).
    project: Option<String>,
}

impl ProjectCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            ProjectSubcommand::List => list_projects(ctx).await,
            ProjectSubcommand::Create(args) => create_project(ctx, args).await,
            ProjectSubcommand::Delete(args) => delete_project(ctx, args).await,
            ProjectSubcommand::Set(args) => set_project(ctx, args).await,
            ProjectSubcommand::Show(args) => show_project(ctx, args).await,
        }
    }
}

#[derive(Debug, Tabled)]
struct ProjectRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Name")]
    name: String,
}

impl From<Project> for ProjectRow {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
        }
    }
}

/// List projects in the current tenant.
async fn list_projects(ctx: CommandContext) -> Result<()> {
    let client = ctx.client()?;

    let tenant_id = resolve_tenant_id(&client, ctx.require_tenant()?).await?;
    let response = client
        .list_projects(&tenant_id)
        .await
        .map_err(CliError::Client)?;

    if ctx.mode.is_scripting() {
        for project in &response.items {
            print_machine_row(&[&project.id, &project.name]);
        }
        return Ok(());
    }

    let rows: Vec<ProjectRow> = response.items.into_iter().map(Into::into).collect();
    print_table(&rows);
    Ok(())
}

/// Create a new project in the current tenant.
async fn create_project(ctx: CommandContext, args: CreateProjectArgs) -> Result<()> {
    let client = ctx.client()?;

    let tenant_id = resolve_tenant_id(&client, ctx.require_tenant()?).await?;
    let spec = ProjectCreateSpec { name: args.name };
    let task = client
        .create_project(&tenant_id, &spec)
        .await
        .map_err(CliError::Client)?;

    wait_on_task_operation(&client, &task.id, ctx.mode)
        .await
        .map_err(CliError::Task)?;
    Ok(())
}

/// Delete a project.
async fn delete_project(ctx: CommandContext, args: DeleteProjectArgs) -> Result<()> {
    let client = ctx.client()?;

    let tenant_id = resolve_tenant_id(&client, ctx.require_tenant()?).await?;
    let project_id = resolve_project_id(&client, &tenant_id, &args.project).await?;
    let task = client
        .delete_project(&project_id)
        .await
        .map_err(CliError::Client)?;

    wait_on_task_operation(&client, &task.id, ctx.mode)
        .await
        .map_err(CliError::Task)?;
    Ok(())
}

/// Select the default project within the current tenant.
async fn set_project(mut ctx: CommandContext, args: SetProjectArgs) -> Result<()> {
    let client = ctx.client()?;

    let tenant_id = resolve_tenant_id(&client, ctx.require_tenant()?).await?;
    // Verify the project exists before saving it.
    resolve_project_id(&client, &tenant_id, &args.name).await?;

    ctx.config.project = Some(args.name.clone());
    ctx.config.save()?;

    if !ctx.mode.is_scripting() {
        print_success(&format!("Project set to '{}'", args.name));
    }
    Ok(())
}

/// Show project details.
async fn show_project(ctx: CommandContext, args: ShowProjectArgs) -> Result<()> {
    let client = ctx.client()?;

    let tenant_id = resolve_tenant_id(&client, ctx.require_tenant()?).await?;
    let ident = match args.project.as_deref() {
        Some(ident) => ident,
        None => ctx.require_project()?,
    };
    let project_id = resolve_project_id(&client, &tenant_id, ident).await?;

    let response = client
        .list_projects(&tenant_id)
        .await
        .map_err(CliError::Client)?;
    let project = response
        .items
        .into_iter()
        .find(|p| p.id == project_id)
        .ok_or_else(|| CliError::NotFound(format!("Project '{ident}' not found")))?;

    if ctx.mode.is_scripting() {
        print_machine_row(&[&project.id, &project.name]);
        return Ok(());
    }

    println!("id: {}", project.id);
    println!("name: {}", project.name);
    Ok(())
}
