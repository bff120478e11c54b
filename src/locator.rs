//! Fixed locations of the Pentaho configuration files

use std::path::{Path, PathBuf};

/// Jackrabbit repository descriptor
pub const REPOSITORY_XML: &str = "pentaho-solutions/system/jackrabbit/repository.xml";

/// Quartz properties, primary location
pub const QUARTZ_PROPERTIES: &str = "pentaho-solutions/system/quartz/quartz.properties";

/// Quartz properties as shipped inside the scheduler plugin
pub const QUARTZ_PROPERTIES_PLUGIN: &str =
    "pentaho-solutions/system/scheduler-plugin/quartz/quartz.properties";

/// Hibernate settings selecting the active configuration fragment
pub const HIBERNATE_SETTINGS: &str = "pentaho-solutions/system/hibernate/hibernate-settings.xml";

/// PostgreSQL Hibernate fragment, relative to the server root
pub const POSTGRES_HIBERNATE_CFG: &str =
    "pentaho-solutions/system/hibernate/postgresql.hibernate.cfg.xml";

/// Return the first candidate under `root` that exists as a file
pub fn locate(root: &Path, candidates: &[&str]) -> Option<PathBuf> {
    let found = candidates
        .iter()
        .map(|relative| root.join(relative))
        .find(|path| path.is_file());

    match &found {
        Some(path) => log::debug!("Located {:?}", path),
        None => log::debug!("None of {:?} exist under {:?}", candidates, root),
    }
    found
}

/// Path reported when nothing was found: the last candidate tried
pub fn last_candidate(root: &Path, candidates: &[&str]) -> PathBuf {
    candidates
        .last()
        .map(|relative| root.join(relative))
        .unwrap_or_else(|| root.to_path_buf())
}
