//! Runs the three rewriters against a server installation
//!
//! All targets always run, in [`Target::ALL`] order. A missing primary file or a
//! failed rewrite marks the run as failed without stopping the remaining
//! targets. Files rewritten before a failure stay rewritten; the `.bak` copies
//! are the only way back.

use crate::cli::Report;
use crate::connection::ConnectionConfig;
use crate::rewrite::{Target, TargetOutcome};
use anyhow::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Everything a run needs, resolved from the command line
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub server_path: PathBuf,
    pub config: ConnectionConfig,
    pub dry_run: bool,
}

/// Outcome of one target
#[derive(Debug)]
pub struct TargetResult {
    pub target: Target,
    pub outcome: Result<TargetOutcome>,
}

impl TargetResult {
    pub fn is_success(&self) -> bool {
        self.outcome.as_ref().is_ok_and(TargetOutcome::is_success)
    }
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub results: Vec<TargetResult>,
}

impl RunSummary {
    pub fn success(&self) -> bool {
        self.results.iter().all(TargetResult::is_success)
    }

    pub fn get(&self, target: Target) -> Option<&TargetResult> {
        self.results.iter().find(|result| result.target == target)
    }
}

#[derive(Debug)]
pub enum RunStatus {
    /// The server path is not a directory; nothing was touched
    RootMissing,
    /// Dry run requested; nothing was read or written
    DryRun,
    Completed(RunSummary),
}

impl RunStatus {
    pub fn success(&self) -> bool {
        match self {
            RunStatus::RootMissing => false,
            RunStatus::DryRun => true,
            RunStatus::Completed(summary) => summary.success(),
        }
    }
}

fn apply(target: Target, root: &Path, config: &ConnectionConfig) -> TargetResult {
    let outcome = target.apply(root, config);
    if let Err(e) = &outcome {
        log::error!("{} failed: {:#}", target.label(), e);
    }
    TargetResult { target, outcome }
}

/// Run every target without reporting
pub fn configure_all(root: &Path, config: &ConnectionConfig) -> RunSummary {
    RunSummary {
        results: Target::ALL
            .into_iter()
            .map(|target| apply(target, root, config))
            .collect(),
    }
}

/// Run every target, printing progress as each one finishes
///
/// Only errors writing the report itself are returned as `Err`.
pub fn run<W: Write>(options: &RunOptions, report: &mut Report<W>) -> Result<RunStatus> {
    let root = options.server_path.as_path();
    if !root.is_dir() {
        log::error!("Server path is not a directory: {:?}", root);
        report.root_missing(root)?;
        return Ok(RunStatus::RootMissing);
    }

    report.banner(root, &options.config)?;

    if options.dry_run {
        log::info!("Dry run, skipping all rewriters");
        report.dry_run()?;
        return Ok(RunStatus::DryRun);
    }

    let mut summary = RunSummary::default();
    for target in Target::ALL {
        report.target_started(target)?;
        let result = apply(target, root, &options.config);
        report.target_finished(&result)?;
        summary.results.push(result);
    }

    report.footer(summary.success())?;
    Ok(RunStatus::Completed(summary))
}
