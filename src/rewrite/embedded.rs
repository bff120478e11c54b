//! Checks that recognise the bundled HSQLDB configuration
//!
//! Each check is tied to the exact text Pentaho ships with. Support for another
//! embedded database variant belongs here, not in the rewriters.

/// File system adapter used by the stock repository descriptor
pub const DB_FILESYSTEM_CLASS: &str = "org.apache.jackrabbit.core.fs.db.DbFileSystem";

/// Persistence manager the repository descriptor should end up with
pub const POSTGRES_PERSISTENCE_MANAGER: &str =
    "org.apache.jackrabbit.core.persistence.pool.PostgreSQLPersistenceManager";

const EMBEDDED_DRIVER_MARKER: &str = "hsqldb";
const EMBEDDED_DELEGATE_MARKER: &str = "HSQL";

/// Whether a `FileSystem` class attribute names the stock database-backed adapter
pub fn is_default_db_filesystem(class: &str) -> bool {
    class == DB_FILESYSTEM_CLASS
}

/// Whether a `PersistenceManager` class attribute already names the PostgreSQL manager
pub fn is_postgres_persistence_manager(class: &str) -> bool {
    class == POSTGRES_PERSISTENCE_MANAGER
}

/// Whether a line mentions the HSQLDB driver or URL scheme, in any case
pub fn mentions_embedded_driver(text: &str) -> bool {
    text.to_lowercase().contains(EMBEDDED_DRIVER_MARKER)
}

/// Whether a line mentions the HSQLDB Quartz delegate (case-sensitive)
pub fn mentions_embedded_delegate(text: &str) -> bool {
    text.contains(EMBEDDED_DELEGATE_MARKER)
}
