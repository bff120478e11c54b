//! Field-rewrite engine
//!
//! One rewriter per configuration document:
//! - `repository`: Jackrabbit `repository.xml`
//! - `quartz`: Quartz `quartz.properties`
//! - `hibernate`: `hibernate-settings.xml` and the PostgreSQL Hibernate fragment
//!
//! Each rewriter locates its file(s), backs them up, rewrites the recognised
//! fields and writes the result over the original.

pub mod embedded;
pub mod hibernate;
pub mod quartz;
pub mod repository;

use crate::backup::{self, BackupOutcome};
use crate::connection::ConnectionConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// The configuration documents this tool rewrites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Jackrabbit content repository
    Repository,
    /// Quartz job scheduler
    Scheduler,
    /// Hibernate object repository
    Settings,
}

impl Target {
    /// Fixed run order
    pub const ALL: [Target; 3] = [Target::Repository, Target::Scheduler, Target::Settings];

    pub fn label(self) -> &'static str {
        match self {
            Target::Repository => "Jackrabbit (JCR)",
            Target::Scheduler => "Quartz (Scheduler)",
            Target::Settings => "Hibernate (Repository)",
        }
    }

    /// Locate, back up and rewrite this target's files under `root`
    pub fn apply(self, root: &Path, config: &ConnectionConfig) -> Result<TargetOutcome> {
        log::info!("Configuring {}", self.label());
        match self {
            Target::Repository => repository::configure(root, config),
            Target::Scheduler => quartz::configure(root, config),
            Target::Settings => hibernate::configure(root, config),
        }
    }
}

/// Result of rewriting one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
    pub backup: BackupOutcome,
    /// Number of fields written; zero means the document had nothing we recognise
    pub fields: usize,
}

impl FileChange {
    pub fn nothing_matched(&self) -> bool {
        self.fields == 0
    }

    pub fn file_name(&self) -> String {
        display_name(&self.path)
    }
}

/// What a rewriter did with its target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    /// Primary file rewritten; optional files that were absent are listed in `skipped`
    Configured {
        files: Vec<FileChange>,
        skipped: Vec<PathBuf>,
    },
    /// Primary file missing; holds the (last) path searched
    NotFound(PathBuf),
}

impl TargetOutcome {
    pub fn configured(files: Vec<FileChange>) -> Self {
        TargetOutcome::Configured {
            files,
            skipped: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TargetOutcome::Configured { .. })
    }
}

/// Final path component, falling back to the whole path
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Back up `path`, run `transform` over its contents and write the result back
///
/// `transform` returns the new contents and the number of fields it wrote.
pub(crate) fn rewrite_file<F>(path: &Path, transform: F) -> Result<FileChange>
where
    F: FnOnce(&str) -> Result<(String, usize)>,
{
    rewrite_file_bytes(path, |content| {
        let text = std::str::from_utf8(content).context("File is not valid UTF-8")?;
        let (output, fields) = transform(text)?;
        Ok((output.into_bytes(), fields))
    })
}

/// Like [`rewrite_file`], for files in no particular encoding
pub(crate) fn rewrite_file_bytes<F>(path: &Path, transform: F) -> Result<FileChange>
where
    F: FnOnce(&[u8]) -> Result<(Vec<u8>, usize)>,
{
    let backup = backup::backup(path)?;

    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let (output, fields) =
        transform(&content).with_context(|| format!("Failed to rewrite {}", path.display()))?;

    fs::write(path, output).with_context(|| format!("Failed to write {}", path.display()))?;

    if fields == 0 {
        log::warn!("No recognised fields in {:?}; file written back unchanged", path);
    } else {
        log::info!("Rewrote {} field(s) in {:?}", fields, path);
    }

    Ok(FileChange {
        path: path.to_path_buf(),
        backup,
        fields,
    })
}
