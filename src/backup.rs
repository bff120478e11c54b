//! One-time `.bak` snapshots of files before they are rewritten

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// What [`backup`] did for a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// A fresh copy was written
    Created(PathBuf),
    /// A backup from an earlier run exists and was left alone
    AlreadyPresent(PathBuf),
    /// The source file does not exist; nothing was copied
    SourceMissing,
}

/// `<path>.bak`, keeping the full original file name
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

/// Copy `path` to `<path>.bak` unless that backup already exists
///
/// The copy keeps the original bytes and, where the platform allows, its
/// modification time. Calling this twice is a no-op the second time, so the
/// backup always reflects the file as it was before the first rewrite.
pub fn backup(path: &Path) -> Result<BackupOutcome> {
    let target = backup_path(path);
    if target.exists() {
        log::debug!("Backup already present: {:?}", target);
        return Ok(BackupOutcome::AlreadyPresent(target));
    }
    if !path.exists() {
        log::debug!("Nothing to back up, source missing: {:?}", path);
        return Ok(BackupOutcome::SourceMissing);
    }

    fs::copy(path, &target)
        .with_context(|| format!("Failed to back up {} to {}", path.display(), target.display()))?;
    preserve_mtime(path, &target);

    log::info!("Backed up {:?} to {:?}", path, target);
    Ok(BackupOutcome::Created(target))
}

fn preserve_mtime(source: &Path, target: &Path) {
    let result = fs::metadata(source)
        .and_then(|meta| meta.modified())
        .and_then(|mtime| {
            fs::File::options()
                .write(true)
                .open(target)
                .and_then(|file| file.set_modified(mtime))
        });
    if let Err(e) = result {
        log::warn!("Could not copy modification time to {:?}: {}", target, e);
    }
}
