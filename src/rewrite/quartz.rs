//! Quartz `quartz.properties` rewriter
//!
//! A single forward pass over the file's lines. Each line is classified on its
//! own by key prefix; HSQLDB driver, URL and delegate lines are kept as comments
//! and followed by their PostgreSQL replacement, credentials are replaced in
//! place, and everything else is copied through byte for byte. The pass works
//! on raw bytes since properties files are often ISO-8859-1, not UTF-8.

use super::embedded;
use super::{TargetOutcome, rewrite_file_bytes};
use crate::connection::{ConnectionConfig, POSTGRES_DRIVER};
use crate::locator::{self, QUARTZ_PROPERTIES, QUARTZ_PROPERTIES_PLUGIN};
use anyhow::Result;
use std::path::Path;

pub const DRIVER_KEY: &str = "org.quartz.dataSource.myDS.driver";
pub const URL_KEY: &str = "org.quartz.dataSource.myDS.URL";
pub const USER_KEY: &str = "org.quartz.dataSource.myDS.user";
pub const PASSWORD_KEY: &str = "org.quartz.dataSource.myDS.password";
pub const DELEGATE_KEY: &str = "org.quartz.jobStore.driverDelegateClass";

pub const POSTGRES_DELEGATE: &str = "org.quartz.impl.jdbcjobstore.PostgreSQLDelegate";

const CANDIDATES: [&str; 2] = [QUARTZ_PROPERTIES, QUARTZ_PROPERTIES_PLUGIN];

#[derive(Debug, Clone, PartialEq, Eq)]
enum LineAction {
    Keep,
    /// Write this line instead of the original
    Replace(String),
    /// Comment the original out and follow it with this line
    CommentOut(String),
}

#[derive(Debug, Clone, Default)]
pub struct QuartzRewrite {
    pub output: Vec<u8>,
    pub commented: usize,
    pub replaced: usize,
}

impl QuartzRewrite {
    pub fn fields(&self) -> usize {
        self.commented + self.replaced
    }
}

fn assignment(key: &str, value: &str) -> String {
    format!("{} = {}", key, value)
}

/// Checked in this order; the first rule that matches wins
fn classify(line: &[u8], config: &ConnectionConfig) -> LineAction {
    // Keys and markers are ASCII, so a lossy view is enough to match on.
    let text = String::from_utf8_lossy(line.trim_ascii());
    let trimmed: &str = &text;

    if trimmed.starts_with(DRIVER_KEY) && embedded::mentions_embedded_driver(trimmed) {
        LineAction::CommentOut(assignment(DRIVER_KEY, POSTGRES_DRIVER))
    } else if trimmed.starts_with(URL_KEY) && embedded::mentions_embedded_driver(trimmed) {
        LineAction::CommentOut(assignment(URL_KEY, &config.jdbc_url(&config.quartz)))
    } else if trimmed.starts_with(USER_KEY) {
        LineAction::Replace(assignment(USER_KEY, &config.quartz.username))
    } else if trimmed.starts_with(PASSWORD_KEY) {
        LineAction::Replace(assignment(PASSWORD_KEY, &config.quartz.password))
    } else if trimmed.starts_with(DELEGATE_KEY) && embedded::mentions_embedded_delegate(trimmed) {
        LineAction::CommentOut(assignment(DELEGATE_KEY, POSTGRES_DELEGATE))
    } else {
        LineAction::Keep
    }
}

/// Split a line into its content and its terminator (`\r\n`, `\n` or nothing)
fn split_line_ending(line: &[u8]) -> (&[u8], &[u8]) {
    if let Some(body) = line.strip_suffix(b"\r\n") {
        (body, &b"\r\n"[..])
    } else if let Some(body) = line.strip_suffix(b"\n") {
        (body, &b"\n"[..])
    } else {
        (line, &b""[..])
    }
}

/// Rewrite the contents of a properties file
pub fn rewrite_properties(source: &[u8], config: &ConnectionConfig) -> QuartzRewrite {
    let mut rewrite = QuartzRewrite {
        output: Vec::with_capacity(source.len() + 256),
        ..QuartzRewrite::default()
    };

    for line in source.split_inclusive(|byte| *byte == b'\n') {
        let (body, ending) = split_line_ending(line);
        match classify(body, config) {
            LineAction::Keep => rewrite.output.extend_from_slice(line),
            LineAction::Replace(replacement) => {
                log::debug!("Replacing: {}", String::from_utf8_lossy(body.trim_ascii()));
                rewrite.output.extend_from_slice(replacement.as_bytes());
                rewrite.output.extend_from_slice(ending);
                rewrite.replaced += 1;
            }
            LineAction::CommentOut(replacement) => {
                log::debug!("Commenting out: {}", String::from_utf8_lossy(body.trim_ascii()));
                rewrite.output.push(b'#');
                rewrite.output.extend_from_slice(body);
                rewrite.output.extend_from_slice(if ending.is_empty() { &b"\n"[..] } else { ending });
                rewrite.output.extend_from_slice(replacement.as_bytes());
                rewrite.output.extend_from_slice(ending);
                rewrite.commented += 1;
            }
        }
    }

    rewrite
}

/// Locate, back up and rewrite `quartz.properties` under `root`
pub fn configure(root: &Path, config: &ConnectionConfig) -> Result<TargetOutcome> {
    let Some(path) = locator::locate(root, &CANDIDATES) else {
        return Ok(TargetOutcome::NotFound(locator::last_candidate(root, &CANDIDATES)));
    };

    let change = rewrite_file_bytes(&path, |content| {
        let rewrite = rewrite_properties(content, config);
        let fields = rewrite.fields();
        Ok((rewrite.output, fields))
    })?;
    Ok(TargetOutcome::configured(vec![change]))
}
