//! Hibernate settings rewriter
//!
//! Points `hibernate-settings.xml` at the PostgreSQL configuration fragment and,
//! when that fragment ships with the server, fills in its connection properties.

use super::{FileChange, TargetOutcome, rewrite_file};
use crate::connection::{ConnectionConfig, POSTGRES_DRIVER};
use crate::locator::{self, HIBERNATE_SETTINGS, POSTGRES_HIBERNATE_CFG};
use crate::backup::BackupOutcome;
use crate::xml::{self, XmlEditor, descendants_below_root};
use anyhow::{Context, Result};
use std::path::Path;

/// Fragment path as written inside `hibernate-settings.xml`
pub const POSTGRES_FRAGMENT: &str = "system/hibernate/postgresql.hibernate.cfg.xml";

const CONFIG_FILE_TAG: &str = "config-file";
const PROPERTY_TAG: &str = "property";

/// Point the first `<config-file>` below the root at the PostgreSQL fragment
///
/// Returns the new text and the number of fields written (0 or 1).
pub fn rewrite_settings(source: &str) -> Result<(String, usize)> {
    let source = xml::strip_bom(source);
    let doc = xml::parse(source)?;
    let mut editor = XmlEditor::new(source);

    match descendants_below_root(&doc).find(|node| node.has_tag_name(CONFIG_FILE_TAG)) {
        Some(config_file) => {
            log::debug!("Replacing config-file {:?}", config_file.text());
            editor.set_text(config_file, POSTGRES_FRAGMENT);
        }
        None => log::warn!("No <{}> element in Hibernate settings", CONFIG_FILE_TAG),
    }

    let fields = editor.len();
    Ok((editor.finish(), fields))
}

fn property_value(name: &str, config: &ConnectionConfig) -> Option<String> {
    let credentials = &config.hibernate;
    match name {
        "connection.url" => Some(config.jdbc_url(credentials)),
        "connection.username" => Some(credentials.username.clone()),
        "connection.password" => Some(credentials.password.clone()),
        "connection.driver_class" => Some(POSTGRES_DRIVER.to_string()),
        _ => None,
    }
}

/// Fill in the connection properties of a Hibernate configuration fragment
///
/// Every `<property>` below the root whose `name` is a recognised connection
/// property gets its text replaced; other properties are left alone.
pub fn rewrite_fragment(source: &str, config: &ConnectionConfig) -> Result<(String, usize)> {
    let source = xml::strip_bom(source);
    let doc = xml::parse(source)?;
    let mut editor = XmlEditor::new(source);

    for property in descendants_below_root(&doc).filter(|node| node.has_tag_name(PROPERTY_TAG)) {
        let Some(name) = property.attribute("name") else {
            continue;
        };
        if let Some(value) = property_value(name, config) {
            log::trace!("Setting property {}", name);
            editor.set_text(property, &value);
        }
    }

    let fields = editor.len();
    Ok((editor.finish(), fields))
}

/// Locate, back up and rewrite the Hibernate settings (and fragment) under `root`
pub fn configure(root: &Path, config: &ConnectionConfig) -> Result<TargetOutcome> {
    let Some(settings) = locator::locate(root, &[HIBERNATE_SETTINGS]) else {
        return Ok(TargetOutcome::NotFound(root.join(HIBERNATE_SETTINGS)));
    };

    let settings_change = rewrite_file(&settings, rewrite_settings)?;
    let restore_hint = match &settings_change.backup {
        BackupOutcome::Created(backup) | BackupOutcome::AlreadyPresent(backup) => {
            format!("restore it from {}", backup.display())
        }
        BackupOutcome::SourceMissing => "no backup was taken".to_string(),
    };
    let mut files: Vec<FileChange> = vec![settings_change];
    let mut skipped = Vec::new();

    match locator::locate(root, &[POSTGRES_HIBERNATE_CFG]) {
        Some(fragment) => {
            let change = rewrite_file(&fragment, |content| rewrite_fragment(content, config))
                .with_context(|| {
                    format!(
                        "{} was already rewritten; {}",
                        settings.display(),
                        restore_hint
                    )
                })?;
            files.push(change);
        }
        None => {
            log::info!("PostgreSQL Hibernate fragment not present, skipping");
            skipped.push(root.join(POSTGRES_HIBERNATE_CFG));
        }
    }

    Ok(TargetOutcome::Configured { files, skipped })
}
