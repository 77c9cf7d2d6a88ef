//! Task inspection and monitoring commands.

use std::time::Duration;

use anyhow::Result;
use chrono::DateTime;
use clap::{Args, Subcommand};
use photon_api::Task;
use tabled::Tabled;

use crate::error::CliError;
use crate::output::{print_machine_row, print_success, print_table};
use crate::poll::{TaskPoller, DEFAULT_TIMEOUT};

use super::CommandContext;

/// Task commands.
#[derive(Debug, Args)]
pub struct TaskCommand {
    #[command(subcommand)]
    command: TaskSubcommand,
}

#[derive(Debug, Subcommand)]
enum TaskSubcommand {
    /// List tasks, optionally filtered.
    List(ListTaskArgs),

    /// Show task details, including steps and errors.
    Show(TaskRefArgs),

    /// Track a task until it reaches a terminal state.
    Monitor(MonitorTaskArgs),
}

#[derive(Debug, Args)]
struct ListTaskArgs {
    /// Filter by affected entity ID.
    #[arg(long)]
    entity_id: Option<String>,

    /// Filter by affected entity kind (e.g. vm, persistent-disk).
    #[arg(long)]
    entity_kind: Option<String>,

    /// Filter by task state (e.g. QUEUED, STARTED, COMPLETED, ERROR).
    #[arg(long)]
    state: Option<String>,
}

#[derive(Debug, Args)]
struct TaskRefArgs {
    /// Task ID.
    task: String,
}

#[derive(Debug, Args)]
struct MonitorTaskArgs {
    /// Task ID.
    task: String,

    /// Give up after this many seconds (default 30 minutes).
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl TaskCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            TaskSubcommand::List(args) => list_tasks(ctx, args).await,
            TaskSubcommand::Show(args) => show_task(ctx, args).await,
            TaskSubcommand::Monitor(args) => monitor_task(ctx, args).await,
        }
    }
}

#[derive(Debug, Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Operation")]
    operation: String,

    #[tabled(rename = "State")]
    state: String,

    #[tabled(rename = "Started")]
    started: String,

    #[tabled(rename = "Duration")]
    duration: String,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            operation: task.operation.clone(),
            state: task.state.clone(),
            started: format_time(task.started_time),
            duration: format_duration_ms(task.duration_ms()),
        }
    }
}

fn format_time(millis: i64) -> String {
    if millis <= 0 {
        return "-".to_string();
    }
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn format_duration_ms(millis: i64) -> String {
    if millis <= 0 {
        return "-".to_string();
    }
    format!("{:.1}s", millis as f64 / 1000.0)
}

/// List tasks, optionally filtered.
async fn list_tasks(ctx: CommandContext, args: ListTaskArgs) -> Result<()> {
    let client = ctx.client()?;

    let response = client
        .list_tasks(
            args.entity_id.as_deref(),
            args.entity_kind.as_deref(),
            args.state.as_deref(),
        )
        .await
        .map_err(CliError::Client)?;

    if ctx.mode.is_scripting() {
        for task in &response.items {
            print_machine_row(&[&task.id, &task.operation, &task.state]);
        }
        return Ok(());
    }

    let rows: Vec<TaskRow> = response.items.iter().map(Into::into).collect();
    print_table(&rows);
    Ok(())
}

/// Show task details, including steps and errors.
async fn show_task(ctx: CommandContext, args: TaskRefArgs) -> Result<()> {
    let client = ctx.client()?;

    let task = client.get_task(&args.task).await.map_err(|e| match e {
        photon_sdk::ApiClientError::Api { status: 404, .. } => {
            CliError::NotFound(format!("Task '{}' not found", args.task))
        }
        other => CliError::Client(other),
    })?;

    if ctx.mode.is_scripting() {
        print_machine_row(&[&task.id, &task.operation, &task.state]);
        for step in &task.steps {
            for error in &step.errors {
                print_machine_row(&[&task.id, &step.operation, &error.code, &error.message]);
            }
        }
        return Ok(());
    }

    println!("id: {}", task.id);
    println!("operation: {}", task.operation);
    println!("state: {}", task.state);
    if let Some(entity) = &task.entity {
        println!("entity: {} ({})", entity.id, entity.kind);
    }
    println!("started: {}", format_time(task.started_time));
    println!("duration: {}", format_duration_ms(task.duration_ms()));

    for step in &task.steps {
        println!("  step {}: {} [{}]", step.sequence, step.operation, step.state);
        for error in &step.errors {
            println!("    error: {error}");
        }
    }
    Ok(())
}

/// Track a task until it reaches a terminal state.
async fn monitor_task(ctx: CommandContext, args: MonitorTaskArgs) -> Result<()> {
    let client = ctx.client()?;

    let timeout = args
        .timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);

    let mut poller = TaskPoller::new(&client);
    if ctx.mode.is_scripting() {
        poller = poller.without_animation();
    }

    let task = poller
        .poll_task_with_timeout(&args.task, timeout)
        .await
        .map_err(CliError::Task)?;

    if ctx.mode.is_scripting() {
        print_machine_row(&[&task.id, &task.operation, &task.state]);
        return Ok(());
    }

    match &task.entity {
        Some(entity) => print_success(&format!(
            "{} completed for '{}' entity {}",
            task.operation, entity.kind, entity.id
        )),
        None => print_success(&format!("{} completed", task.operation)),
    }
    Ok(())
}
