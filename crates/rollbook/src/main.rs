//! `rollbook` - CLI for the student record keeper
//!
//! With no subcommand this runs the interactive menu; otherwise it performs
//! one record operation and exits.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use rollbook::cli::{self, shell, Cli, Command, ConfigCommand};
use rollbook::{init_logging, Config, RecordService, RecordStore, Status};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let mut config =
        Config::load_from(cli.config.clone()).context("failed to load configuration")?;
    if let Some(data) = cli.data {
        config.storage.data_path = Some(data);
        config.validate().context("invalid --data path")?;
    }

    let command = cli.command.unwrap_or(Command::Shell);
    if let Command::Config(config_cmd) = command {
        handle_config(&config, config_cmd)?;
        return Ok(ExitCode::SUCCESS);
    }

    let data_path = config.data_path();
    tracing::debug!(path = %data_path.display(), "opening record store");
    let mut service = RecordService::new(RecordStore::open(&data_path, config.store_options()));
    let precision = config.display.gpa_precision;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if matches!(command, Command::Shell) {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        shell::run(&mut service, &mut input, &mut out, precision)
            .context("interactive session failed")?;
        return Ok(ExitCode::SUCCESS);
    }

    let status = cli::run_command(&mut service, command, precision, &mut out)
        .context("failed to write output")?;
    out.flush()?;
    Ok(exit_code(status))
}

fn exit_code(status: Option<Status>) -> ExitCode {
    match status {
        None | Some(Status::Success) => ExitCode::SUCCESS,
        Some(Status::Failure) => ExitCode::from(1),
        Some(Status::NotFound) => ExitCode::from(2),
    }
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Data path:          {}", config.data_path().display());
                println!("  Pretty JSON:        {}", config.storage.pretty);
                println!(
                    "  Rollback on fail:   {}",
                    config.storage.rollback_on_write_failure
                );
                println!();
                println!("[Display]");
                println!("  GPA precision:      {}", config.display.gpa_precision);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
