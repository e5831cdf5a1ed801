//! Runtime backend selection.
//!
//! # Responsibility
//! - Turn validated `Settings` into one concrete backend, once.
//! - Hand callers a backend-agnostic `Repository` for each unit of work.
//!
//! # Invariants
//! - Unknown selectors fail while parsing settings, never on first use.
//! - SQLite connections are opened and migrated inside `resolve`, so
//!   connectivity failures surface there.
//! - A SQLite unit of work commits only when the caller's closure succeeds.

use crate::config::{ConfigError, Settings};
use crate::db::{open_db_url, run_in_session, DbError};
use crate::repo::in_memory::InMemoryRepository;
use crate::repo::sqlite::{SqliteRepository, StoredRecord};
use crate::repo::user_record::UserRecord;
use crate::repo::{RepoResult, Repository};
use log::{error, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Closed set of storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Process-local `InMemoryRepository`.
    Local,
    /// SQLite-backed `SqliteRepository`.
    Sqlite,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Sqlite => "sqlite",
        }
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" | "memory" | "in_memory" => Ok(Self::Local),
            "sqlite" | "persistent" => Ok(Self::Sqlite),
            _ => Err(ConfigError::UnknownBackend(value.trim().to_string())),
        }
    }
}

/// Errors raised while resolving a backend.
#[derive(Debug)]
pub enum FactoryError {
    Config(ConfigError),
    Db(DbError),
}

impl Display for FactoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FactoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<ConfigError> for FactoryError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for FactoryError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

enum Backend<R: StoredRecord> {
    Local(InMemoryRepository<R::Domain>),
    Sqlite(Connection),
}

/// Owner of the resolved backend for one stored-record type.
pub struct RepositoryFactory<R: StoredRecord> {
    backend: Backend<R>,
}

/// Factory for the `users` repository.
pub type UserRepositoryFactory = RepositoryFactory<UserRecord>;

impl<R> RepositoryFactory<R>
where
    R: StoredRecord + 'static,
    R::Domain: 'static,
{
    /// Builds the backend selected by `settings`.
    ///
    /// # Errors
    /// - `FactoryError::Db` when the SQLite database cannot be opened or
    ///   migrated.
    pub fn resolve(settings: &Settings) -> Result<Self, FactoryError> {
        let backend = match settings.backend {
            BackendKind::Local => Backend::Local(InMemoryRepository::new()),
            BackendKind::Sqlite => match open_db_url(&settings.db_url) {
                Ok(conn) => Backend::Sqlite(conn),
                Err(err) => {
                    error!(
                        "event=repo_resolve module=repo status=error backend=sqlite table={} error={}",
                        R::TABLE,
                        err
                    );
                    return Err(err.into());
                }
            },
        };

        info!(
            "event=repo_resolve module=repo status=ok backend={} table={}",
            settings.backend,
            R::TABLE
        );
        Ok(Self { backend })
    }

    /// Wraps an already opened and migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            backend: Backend::Sqlite(conn),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self.backend {
            Backend::Local(_) => BackendKind::Local,
            Backend::Sqlite(_) => BackendKind::Sqlite,
        }
    }

    /// Runs `work` as one unit of work against the resolved backend.
    ///
    /// The SQLite backend opens a transaction, commits when `work` returns
    /// `Ok` and rolls back otherwise. The local backend applies writes
    /// immediately and has nothing to roll back.
    pub fn with_repository<T, F>(&mut self, work: F) -> RepoResult<T>
    where
        F: FnOnce(&mut dyn Repository<R::Domain>) -> RepoResult<T>,
    {
        match &mut self.backend {
            Backend::Local(repo) => work(repo),
            Backend::Sqlite(conn) => run_in_session(conn, |tx| {
                let mut repo = SqliteRepository::<R>::try_new(tx)?;
                work(&mut repo)
            }),
        }
    }
}
