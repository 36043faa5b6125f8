//! YAML configuration.
//!
//! ```yaml
//! database:
//!   host: db.internal
//!   port: 5432
//!   user: auditor
//!   password: secret
//!   database: inventory
//! ```

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

use crate::error::{ProvenanceError, Result};

/// Default config path, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "local.yaml";

/// Top-level configuration document.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Connection parameters.
    pub database: DatabaseConfig,
}

impl Config {
    /// Reads and parses a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ProvenanceError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Parses a configuration document.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Replaces the configured database name when `database` is given.
    #[must_use]
    pub fn with_database(mut self, database: Option<String>) -> Self {
        if let Some(name) = database {
            self.database.database = Some(name);
        }
        self
    }
}

/// Connection parameters for the PostgreSQL server.
#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Server host.
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Login role.
    #[serde(default)]
    pub user: Option<String>,
    /// Login password.
    #[serde(default)]
    pub password: Option<String>,
    /// Database name.
    #[serde(default, alias = "dbname")]
    pub database: Option<String>,
    /// Reported `application_name`; each command supplies its own otherwise.
    #[serde(default)]
    pub application_name: Option<String>,
}

fn default_host() -> String {
    "localhost".to_string()
}

const fn default_port() -> u16 {
    5432
}

impl DatabaseConfig {
    /// Builds connection options, tagging the session with `application`
    /// unless the config names one.
    #[must_use]
    pub fn connect_options(&self, application: &str) -> PgConnectOptions {
        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .application_name(self.application_name.as_deref().unwrap_or(application));
        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        if let Some(database) = &self.database {
            options = options.database(database);
        }
        options
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("application_name", &self.application_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "
database:
  host: db.internal
  port: 6543
  user: auditor
  password: hunter2
  dbname: inventory
";

    #[test]
    fn test_parse_full_section() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.database.user.as_deref(), Some("auditor"));
        assert_eq!(config.database.database.as_deref(), Some("inventory"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml("database: {}\n").unwrap();
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert!(config.database.database.is_none());
    }

    #[test]
    fn test_missing_database_section() {
        let err = Config::from_yaml("logging: {}\n").unwrap_err();
        assert!(matches!(err, ProvenanceError::Config(_)));
    }

    #[test]
    fn test_database_override() {
        let config = Config::from_yaml(SAMPLE)
            .unwrap()
            .with_database(Some("staging".to_string()));
        assert_eq!(config.database.database.as_deref(), Some("staging"));

        let unchanged = Config::from_yaml(SAMPLE).unwrap().with_database(None);
        assert_eq!(unchanged.database.database.as_deref(), Some("inventory"));
    }

    #[test]
    fn test_debug_hides_password() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        let debug = format!("{:?}", config.database);
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.database.port, 6543);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ProvenanceError::ConfigRead { .. }));
    }

    #[test]
    fn test_connect_options() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        let options = config.database.connect_options("provenance audit");
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_database(), Some("inventory"));
        assert_eq!(options.get_application_name(), Some("provenance audit"));
    }
}
