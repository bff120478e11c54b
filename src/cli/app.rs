use crate::connection::ConnectionConfig;
use anyhow::Result;
use clap::{ArgAction, Parser};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "configure-postgres", version)]
#[command(about = "Configure a Pentaho Server installation to use PostgreSQL instead of HSQLDB")]
pub struct Cli {
    /// Path to the pentaho-server directory
    pub server_path: PathBuf,

    /// PostgreSQL host
    #[arg(long, help = "PostgreSQL host (default: localhost)")]
    pub host: Option<String>,

    /// PostgreSQL port
    #[arg(long, help = "PostgreSQL port (default: 5432)")]
    pub port: Option<u16>,

    /// TOML file overriding database names and credentials
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show what would be changed without modifying files
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Write log output to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Defaults, then the optional config file, then `--host`/`--port`
    pub fn connection_config(&self) -> Result<ConnectionConfig> {
        let base = match &self.config {
            Some(path) => ConnectionConfig::load(path)?,
            None => ConnectionConfig::default(),
        };
        Ok(base.with_endpoint(self.host.clone(), self.port))
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
