//! Command-line interface for rollbook.
//!
//! This module provides the CLI structure and command handlers for the
//! `rollbook` binary.

mod commands;
pub mod render;
pub mod shell;

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::service::{RecordService, Reply, Request, Status};

pub use commands::{
    AddCommand, ConfigCommand, DeleteCommand, FilterCommand, ListCommand, OutputFormat,
    ShowCommand, StatsCommand, UpdateCommand,
};

/// rollbook - Keep student records in a single file
///
/// Runs an interactive menu when no command is given.
#[derive(Debug, Parser)]
#[command(name = "rollbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the data file (overrides configuration)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the interactive menu
    Shell,

    /// Add a student
    Add(AddCommand),

    /// List all students
    List(ListCommand),

    /// Show one student
    Show(ShowCommand),

    /// Change a student's details
    Update(UpdateCommand),

    /// Remove a student
    Delete(DeleteCommand),

    /// List students in a course
    Filter(FilterCommand),

    /// Show totals and average GPA
    Stats(StatsCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

/// Run a one-shot record command and print its reply.
///
/// Returns the reply status so the caller can pick an exit code. `Shell`
/// and `Config` are not record commands and yield `None`.
///
/// # Errors
///
/// Returns an error if writing the output fails.
pub fn run_command(
    service: &mut RecordService,
    command: Command,
    precision: usize,
    out: &mut dyn Write,
) -> io::Result<Option<Status>> {
    let (reply, format) = match command {
        Command::Shell | Command::Config(_) => return Ok(None),
        Command::Add(cmd) => (
            service.handle(Request::Create(cmd.into())),
            OutputFormat::Plain,
        ),
        Command::List(cmd) => (service.handle(Request::List), cmd.format),
        Command::Show(cmd) => (
            service.handle(Request::Search {
                roll_number: cmd.roll_number,
            }),
            cmd.format,
        ),
        Command::Update(cmd) => (update(service, &cmd), OutputFormat::Plain),
        Command::Delete(cmd) => (
            service.handle(Request::Delete {
                roll_number: cmd.roll_number,
            }),
            OutputFormat::Plain,
        ),
        Command::Filter(cmd) => (
            service.handle(Request::FilterByCourse { course: cmd.course }),
            cmd.format,
        ),
        Command::Stats(cmd) => (service.handle(Request::Statistics), cmd.format),
    };

    let text = render::render_reply(&reply, format, precision).map_err(io::Error::other)?;
    write!(out, "{text}")?;
    if format == OutputFormat::Json {
        writeln!(out)?;
    }
    Ok(Some(reply.status))
}

fn update(service: &mut RecordService, cmd: &UpdateCommand) -> Reply {
    let Some(current) = service.store().find_by_key(&cmd.roll_number) else {
        return service.search_student(&cmd.roll_number);
    };

    let patch = cmd.patch();
    if patch.is_empty() {
        return Reply {
            status: Status::Failure,
            message: "Nothing to update: pass --name, --email, --gpa or --course.".to_string(),
            records: vec![current],
            stats: None,
        };
    }

    service.handle(Request::Update {
        roll_number: cmd.roll_number.clone(),
        fields: patch.resolve(&current),
    })
}
