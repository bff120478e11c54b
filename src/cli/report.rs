//! Human-readable progress report

use crate::backup::BackupOutcome;
use crate::configure::TargetResult;
use crate::connection::ConnectionConfig;
use crate::rewrite::{FileChange, Target, TargetOutcome, display_name};
use colored::*;
use std::io::{self, Write};
use std::path::Path;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Writes the run report to any writer (stdout in the binary)
pub struct Report<W: Write> {
    out: W,
}

impl<W: Write> Report<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn root_missing(&mut self, root: &Path) -> io::Result<()> {
        writeln!(
            self.out,
            "{} Server path not found: {}",
            "Error:".bright_red().bold(),
            root.display()
        )
    }

    pub fn banner(&mut self, root: &Path, config: &ConnectionConfig) -> io::Result<()> {
        writeln!(self.out, "{}", RULE.bright_blue())?;
        writeln!(
            self.out,
            "{}",
            "Pentaho Server PostgreSQL Configuration".bright_white().bold()
        )?;
        writeln!(self.out, "{}", RULE.bright_blue())?;
        writeln!(self.out, "{}: {}", "Server".dimmed(), root.display())?;
        writeln!(
            self.out,
            "{}: {}",
            "PostgreSQL".dimmed(),
            format!("{}:{}", config.host, config.port).cyan()
        )?;
        writeln!(self.out)
    }

    pub fn dry_run(&mut self) -> io::Result<()> {
        writeln!(
            self.out,
            "{}",
            "DRY-RUN MODE - No files will be modified".bright_yellow().bold()
        )?;
        writeln!(self.out)
    }

    pub fn target_started(&mut self, target: Target) -> io::Result<()> {
        writeln!(self.out, "Configuring {}...", target.label().bright_white().bold())
    }

    pub fn target_finished(&mut self, result: &TargetResult) -> io::Result<()> {
        match &result.outcome {
            Ok(TargetOutcome::Configured { files, skipped }) => {
                for change in files {
                    self.file_change(change)?;
                }
                for path in skipped {
                    writeln!(
                        self.out,
                        "  {} {}",
                        "- Skipped (not present):".dimmed(),
                        display_name(path)
                    )?;
                }
            }
            Ok(TargetOutcome::NotFound(path)) => {
                writeln!(
                    self.out,
                    "  {} {}",
                    "✗ Not found:".bright_red().bold(),
                    path.display()
                )?;
            }
            Err(e) => {
                writeln!(
                    self.out,
                    "  {} {}",
                    "✗ Failed:".bright_red().bold(),
                    format!("{:#}", e).red()
                )?;
            }
        }
        writeln!(self.out)
    }

    fn file_change(&mut self, change: &FileChange) -> io::Result<()> {
        match &change.backup {
            BackupOutcome::Created(_) => {
                writeln!(self.out, "  {} {}", "✓ Backed up:".green(), change.file_name())?
            }
            BackupOutcome::AlreadyPresent(path) => writeln!(
                self.out,
                "  {} {}",
                "• Existing backup kept:".dimmed(),
                display_name(path)
            )?,
            BackupOutcome::SourceMissing => {}
        }

        if change.nothing_matched() {
            writeln!(
                self.out,
                "  {} {} {}",
                "⚠ Nothing matched:".bright_yellow().bold(),
                change.file_name(),
                "(written back unchanged)".dimmed()
            )
        } else {
            writeln!(
                self.out,
                "  {} {} {}",
                "✓ Configured:".bright_green().bold(),
                change.file_name(),
                format!("({} field(s))", change.fields).dimmed()
            )
        }
    }

    pub fn footer(&mut self, success: bool) -> io::Result<()> {
        writeln!(self.out, "{}", RULE.bright_blue())?;
        if success {
            writeln!(self.out, "{}", "✓ Configuration complete!".bright_green().bold())?;
            writeln!(self.out)?;
            writeln!(
                self.out,
                "{}",
                "IMPORTANT: You must restart Pentaho Server for changes to take effect"
                    .bright_yellow()
            )?;
            writeln!(self.out)?;
            writeln!(self.out, "Backup files created with .bak extension")?;
            writeln!(self.out, "To restore original configuration, copy .bak files back")
        } else {
            writeln!(
                self.out,
                "{}",
                "✗ Configuration failed - check errors above".bright_red().bold()
            )
        }
    }
}
