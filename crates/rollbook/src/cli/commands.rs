//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::service::NewStudent;
use crate::student::{parse_gpa, StudentPatch};

/// `add` command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Unique roll number
    pub roll_number: String,

    /// Full name
    #[arg(short, long)]
    pub name: String,

    /// Email address
    #[arg(short, long, default_value = "")]
    pub email: String,

    /// Grade point average
    #[arg(short, long, value_parser = gpa_arg, allow_negative_numbers = true)]
    pub gpa: f64,

    /// Course code (e.g. CSE, ECE, ME, CE)
    #[arg(long)]
    pub course: String,
}

impl From<AddCommand> for NewStudent {
    fn from(cmd: AddCommand) -> Self {
        Self {
            roll_number: cmd.roll_number,
            name: cmd.name,
            email: cmd.email,
            gpa: cmd.gpa,
            course: cmd.course,
        }
    }
}

/// `list` command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// `show` command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Roll number to look up
    pub roll_number: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// `update` command arguments.
///
/// Fields left out keep their current value.
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Roll number of the student to change
    pub roll_number: String,

    /// New name
    #[arg(short, long)]
    pub name: Option<String>,

    /// New email address
    #[arg(short, long)]
    pub email: Option<String>,

    /// New grade point average
    #[arg(short, long, value_parser = gpa_arg, allow_negative_numbers = true)]
    pub gpa: Option<f64>,

    /// New course code
    #[arg(long)]
    pub course: Option<String>,
}

impl UpdateCommand {
    /// The requested edit.
    #[must_use]
    pub fn patch(&self) -> StudentPatch {
        StudentPatch {
            name: self.name.clone(),
            email: self.email.clone(),
            gpa: self.gpa,
            course: self.course.clone(),
        }
    }
}

/// `delete` command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Roll number of the student to remove
    pub roll_number: String,
}

/// `filter` command arguments.
#[derive(Debug, Args)]
pub struct FilterCommand {
    /// Course to match (case-insensitive)
    pub course: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// `stats` command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Numbered one-line-per-student output
    #[default]
    Plain,
    /// Aligned columns
    Table,
    /// JSON output
    Json,
}

fn gpa_arg(input: &str) -> Result<f64, String> {
    parse_gpa(input).map_err(|e| e.to_string())
}
