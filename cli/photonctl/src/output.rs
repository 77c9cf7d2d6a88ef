//! Output formatting for CLI commands.

use colored::Colorize;
use tabled::{Table, Tabled};

/// Output mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable tables and confirmation sentences.
    #[default]
    Interactive,

    /// Machine-parseable single lines, no decoration.
    Scripting,
}

impl OutputMode {
    pub fn is_scripting(&self) -> bool {
        matches!(self, Self::Scripting)
    }
}

/// Print rows as a table.
pub fn print_table<T: Tabled>(rows: &[T]) {
    if rows.is_empty() {
        println!("{}", "No items found.".dimmed());
    } else {
        println!("{}", Table::new(rows));
    }
}

/// Print one tab-separated record line for scripting consumers.
pub fn print_machine_row(fields: &[&str]) {
    println!("{}", fields.join("\t"));
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", "Success:".green().bold(), message);
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", "Info:".blue().bold(), message);
}
