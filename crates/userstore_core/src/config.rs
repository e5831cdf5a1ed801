//! Runtime settings sourced from the process environment.
//!
//! # Responsibility
//! - Read backend selection and connection settings once, up front.
//! - Reject unknown backend selectors at load time instead of first use.
//!
//! # Invariants
//! - There is no global settings object; callers pass `Settings` explicitly.
//!
//! # Variables
//! - `REPOSITORY_TYPE`: `local` (default) or `sqlite`.
//! - `DB_URL`: SQLite file path, `sqlite://<path>`, or `:memory:`.
//! - `LOG_LEVEL`: `trace|debug|info|warn|error`.
//! - `LOG_DIR`: absolute directory for rolling log files (stderr when unset).

use crate::logging::default_log_level;
use crate::repo::factory::BackendKind;
use config::{Config, Environment};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const DEFAULT_BACKEND: &str = "local";
const DEFAULT_DB_URL: &str = "userstore.sqlite3";

/// Configuration loading/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Backend selector is not one of the known values.
    UnknownBackend(String),
    /// Database URL is empty or whitespace.
    EmptyDatabaseUrl,
    /// Underlying configuration source failed.
    Source(config::ConfigError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownBackend(value) => write!(
                f,
                "unknown repository type `{value}`; expected local|sqlite"
            ),
            Self::EmptyDatabaseUrl => write!(f, "database url cannot be empty"),
            Self::Source(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Source(err) => Some(err),
            Self::UnknownBackend(_) | Self::EmptyDatabaseUrl => None,
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(value: config::ConfigError) -> Self {
        Self::Source(value)
    }
}

/// Validated runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub backend: BackendKind,
    pub db_url: String,
    pub log_level: String,
    pub log_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    repository_type: String,
    db_url: String,
    log_level: String,
    log_dir: Option<String>,
}

impl Settings {
    /// Settings for the in-memory backend with defaults elsewhere.
    pub fn local() -> Self {
        Self {
            backend: BackendKind::Local,
            db_url: DEFAULT_DB_URL.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }

    /// Settings for the SQLite backend at `db_url`.
    pub fn sqlite(db_url: impl Into<String>) -> Self {
        Self {
            backend: BackendKind::Sqlite,
            db_url: db_url.into(),
            ..Self::local()
        }
    }

    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Environment::default())
    }

    /// Reads settings from an explicit variable map instead of the process
    /// environment. Keys use the same names as the environment variables.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let source: config::Map<String, String> = vars
            .into_iter()
            .map(|(key, value)| (Into::<String>::into(key).to_lowercase(), value.into()))
            .collect();
        Self::load(Environment::default().source(Some(source)))
    }

    fn load(environment: Environment) -> Result<Self, ConfigError> {
        let raw: RawSettings = Config::builder()
            .set_default("repository_type", DEFAULT_BACKEND)?
            .set_default("db_url", DEFAULT_DB_URL)?
            .set_default("log_level", default_log_level())?
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        let backend = raw.repository_type.parse::<BackendKind>()?;
        let db_url = raw.db_url.trim().to_string();
        if backend == BackendKind::Sqlite && db_url.is_empty() {
            return Err(ConfigError::EmptyDatabaseUrl);
        }

        Ok(Self {
            backend,
            db_url,
            log_level: raw.log_level,
            log_dir: raw.log_dir.filter(|dir| !dir.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, Settings};
    use crate::repo::factory::BackendKind;

    #[test]
    fn defaults_select_local_backend() {
        let settings = Settings::from_vars(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(settings.backend, BackendKind::Local);
        assert_eq!(settings.db_url, "userstore.sqlite3");
        assert_eq!(settings.log_dir, None);
    }

    #[test]
    fn reads_backend_and_url_from_variables() {
        let settings =
            Settings::from_vars([("REPOSITORY_TYPE", "sqlite"), ("DB_URL", " :memory: ")])
                .unwrap();
        assert_eq!(settings.backend, BackendKind::Sqlite);
        assert_eq!(settings.db_url, ":memory:");
    }

    #[test]
    fn unknown_backend_fails_at_load_time() {
        let err = Settings::from_vars([("REPOSITORY_TYPE", "mongo")]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBackend(value) if value == "mongo"));
    }

    #[test]
    fn sqlite_backend_requires_url() {
        let err = Settings::from_vars([("REPOSITORY_TYPE", "sqlite"), ("DB_URL", "  ")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyDatabaseUrl));
    }
}
