use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use log::info;
use std::process::ExitCode;

use pentaho_postgres::cli::{Cli, Report};
use pentaho_postgres::configure::{self, RunOptions};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    if cli.no_color {
        colored::control::set_override(false);
    }

    info!("Starting configure-postgres");

    let config = match cli.connection_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let options = RunOptions {
        server_path: cli.server_path.clone(),
        config,
        dry_run: cli.dry_run,
    };

    let mut report = Report::new(std::io::stdout().lock());
    let status = configure::run(&options, &mut report)?;

    Ok(if status.success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_logging(cli: &Cli) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(cli.log_level()).parse_default_env();

    if let Some(path) = &cli.log_file {
        // Truncate on each run
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }

    builder.init();
    Ok(())
}
