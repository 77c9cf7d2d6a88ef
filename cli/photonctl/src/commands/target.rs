//! Target and authentication commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

use crate::output::{print_info, print_machine_row, print_success};

use super::CommandContext;

/// Target commands.
#[derive(Debug, Args)]
pub struct TargetCommand {
    #[command(subcommand)]
    command: TargetSubcommand,
}

#[derive(Debug, Subcommand)]
enum TargetSubcommand {
    /// Set the controller endpoint.
    Set(SetTargetArgs),

    /// Show the current target and selected scope.
    Show,

    /// Store an auth token for the current target.
    Login(LoginArgs),

    /// Forget the stored auth token.
    Logout,
}

#[derive(Debug, Args)]
struct SetTargetArgs {
    /// Controller URL, e.g. https://controller.example.com:443.
    url: String,
}

#[derive(Debug, Args)]
struct LoginArgs {
    /// API token (for non-interactive login).
    #[arg(long, env = "PHOTON_TOKEN")]
    token: Option<String>,
}

impl TargetCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            TargetSubcommand::Set(args) => set_target(ctx, args).await,
            TargetSubcommand::Show => show_target(ctx).await,
            TargetSubcommand::Login(args) => login(ctx, args).await,
            TargetSubcommand::Logout => logout(ctx).await,
        }
    }
}

/// Set the controller endpoint.
async fn set_target(mut ctx: CommandContext, args: SetTargetArgs) -> Result<()> {
    let url = args.url.trim_end_matches('/');
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("Target must be an http:// or https:// URL");
    }

    // A token issued by one controller is meaningless against another.
    ctx.config.target = url.to_string();
    ctx.config.token = None;
    ctx.config.save()?;

    print_success(&format!("Target set to '{url}'"));
    Ok(())
}

/// Show the current target and selected scope.
async fn show_target(ctx: CommandContext) -> Result<()> {
    if ctx.mode.is_scripting() {
        print_machine_row(&[
            ctx.config.target(),
            ctx.config.tenant.as_deref().unwrap_or("-"),
            ctx.config.project.as_deref().unwrap_or("-"),
        ]);
        return Ok(());
    }

    println!("target: {}", ctx.config.target());
    println!("tenant: {}", ctx.config.tenant.as_deref().unwrap_or("-"));
    println!("project: {}", ctx.config.project.as_deref().unwrap_or("-"));

    if ctx.config.token.is_some() {
        println!("auth: token stored");
    } else {
        println!("auth: none (run {})", "photon target login".cyan());
    }

    Ok(())
}

/// Store an auth token for the current target.
async fn login(mut ctx: CommandContext, args: LoginArgs) -> Result<()> {
    let Some(token) = args.token else {
        print_info("Use --token or set the PHOTON_TOKEN environment variable.");
        return Ok(());
    };

    ctx.config.token = Some(token);
    ctx.config.save()?;

    print_success(&format!("Token stored for target '{}'", ctx.config.target()));
    Ok(())
}

/// Forget the stored auth token.
async fn logout(mut ctx: CommandContext) -> Result<()> {
    ctx.config.token = None;
    ctx.config.save()?;

    print_success("Logged out.");
    Ok(())
}
