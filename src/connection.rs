//! PostgreSQL connection settings shared by every rewriter
//!
//! A [`ConnectionConfig`] is built once per run from the built-in defaults,
//! an optional TOML override file, and the `--host`/`--port` arguments, and is
//! then handed to each rewriter by reference.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5432;

/// JDBC driver class written wherever a driver is configured
pub const POSTGRES_DRIVER: &str = "org.postgresql.Driver";

/// Name, user and password of one logical database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseCredentials {
    pub database: String,
    pub username: String,
    pub password: String,
}

impl DatabaseCredentials {
    fn new(database: &str, username: &str, password: &str) -> Self {
        Self {
            database: database.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// Target database server plus credentials for the three stores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    /// Object repository store (Hibernate)
    pub hibernate: DatabaseCredentials,
    /// Repository version store (Jackrabbit)
    pub jackrabbit: DatabaseCredentials,
    /// Job scheduler store (Quartz)
    pub quartz: DatabaseCredentials,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            hibernate: DatabaseCredentials::new("hibernate", "hibuser", "password"),
            jackrabbit: DatabaseCredentials::new("jackrabbit", "jcr_user", "password"),
            quartz: DatabaseCredentials::new("quartz", "pentaho_user", "password"),
        }
    }
}

impl ConnectionConfig {
    /// `jdbc:postgresql://{host}:{port}/{database}` for the given store
    pub fn jdbc_url(&self, credentials: &DatabaseCredentials) -> String {
        format!(
            "jdbc:postgresql://{}:{}/{}",
            self.host, self.port, credentials.database
        )
    }

    /// Replace host and/or port, keeping everything else
    pub fn with_endpoint(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// Parse TOML overrides on top of the defaults
    ///
    /// Any key may be omitted; omitted keys keep their default value:
    ///
    /// ```toml
    /// host = "db1"
    /// port = 5433
    ///
    /// [jackrabbit]
    /// username = "jcr_admin"
    /// password = "secret"
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let overrides: ConfigOverrides =
            toml::from_str(content).context("Failed to parse connection config TOML")?;
        Ok(overrides.apply(Self::default()))
    }

    /// Load TOML overrides from a file
    pub fn load(path: &Path) -> Result<Self> {
        log::debug!("Loading connection config from: {:?}", path);
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigOverrides {
    host: Option<String>,
    port: Option<u16>,
    hibernate: Option<CredentialOverrides>,
    jackrabbit: Option<CredentialOverrides>,
    quartz: Option<CredentialOverrides>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CredentialOverrides {
    database: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

impl ConfigOverrides {
    fn apply(self, config: ConnectionConfig) -> ConnectionConfig {
        let mut config = config.with_endpoint(self.host, self.port);
        if let Some(overrides) = self.hibernate {
            overrides.apply(&mut config.hibernate);
        }
        if let Some(overrides) = self.jackrabbit {
            overrides.apply(&mut config.jackrabbit);
        }
        if let Some(overrides) = self.quartz {
            overrides.apply(&mut config.quartz);
        }
        config
    }
}

impl CredentialOverrides {
    fn apply(self, credentials: &mut DatabaseCredentials) {
        if let Some(database) = self.database {
            credentials.database = database;
        }
        if let Some(username) = self.username {
            credentials.username = username;
        }
        if let Some(password) = self.password {
            credentials.password = password;
        }
    }
}
