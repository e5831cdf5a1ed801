//! Repository contract, backends and backend selection.
//!
//! # Responsibility
//! - Define one CRUD contract that every storage backend satisfies.
//! - Keep storage details (SQL, in-memory bookkeeping) behind that contract.
//!
//! # Invariants
//! - "Not found" is a normal result: `None` from `get`/`update`/`patch`,
//!   `false` from `delete`. It is never a `RepoError`.
//! - Store failures surface to the caller as-is; nothing here retries.
//! - `get(id)` right after a write observes that write; after `delete` it
//!   returns `None`.

use crate::db::DbError;
use crate::model::{Entity, EntityId};
use crate::model::user::User;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod factory;
pub mod in_memory;
pub mod sqlite;
pub mod user_record;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors raised by repository backends.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error not covered by a narrower variant.
    Db(DbError),
    /// Uniqueness or integrity rule rejected the write.
    ConstraintViolation(String),
    /// Store could not be opened or reached.
    Connectivity(String),
    /// Persisted data cannot be converted to the domain record.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::ConstraintViolation(message) => write!(f, "constraint violation: {message}"),
            Self::Connectivity(message) => write!(f, "store unavailable: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => Self::from(err),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match value.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => Self::ConstraintViolation(value.to_string()),
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::NotADatabase,
            ) => Self::Connectivity(value.to_string()),
            _ => Self::Db(DbError::Sqlite(value)),
        }
    }
}

/// CRUD contract shared by every backend.
///
/// Reads take `&self`; writes take `&mut self` so a single owner mutates the
/// repository at a time.
pub trait Repository<E: Entity> {
    /// Returns every record currently held, in backend-defined order.
    fn list(&self) -> RepoResult<Vec<E>>;
    /// Returns the record with `id`, or `None`.
    fn get(&self, id: EntityId) -> RepoResult<Option<E>>;
    /// Assigns a fresh id, stores the record and returns it.
    fn create(&mut self, payload: &E::Create) -> RepoResult<E>;
    /// Full replace. Absent payload fields are written as unset.
    fn update(&mut self, id: EntityId, payload: &E::Update) -> RepoResult<Option<E>>;
    /// Partial merge. Absent payload fields keep their stored value.
    fn patch(&mut self, id: EntityId, payload: &E::Update) -> RepoResult<Option<E>>;
    /// Removes the record with `id`; returns whether anything was removed.
    fn delete(&mut self, id: EntityId) -> RepoResult<bool>;
}

/// Backend-agnostic user repository.
pub type UserRepository<'a> = dyn Repository<User> + 'a;

#[cfg(test)]
mod tests {
    use super::RepoError;
    use crate::db::DbError;
    use rusqlite::ffi;

    fn sqlite_failure(code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(code), Some("boom".to_string()))
    }

    #[test]
    fn constraint_codes_map_to_constraint_violation() {
        let err = RepoError::from(sqlite_failure(ffi::SQLITE_CONSTRAINT_UNIQUE));
        assert!(matches!(err, RepoError::ConstraintViolation(_)));
    }

    #[test]
    fn open_and_lock_codes_map_to_connectivity() {
        for code in [ffi::SQLITE_CANTOPEN, ffi::SQLITE_BUSY, ffi::SQLITE_LOCKED] {
            let err = RepoError::from(sqlite_failure(code));
            assert!(matches!(err, RepoError::Connectivity(_)), "code {code}");
        }
    }

    #[test]
    fn other_errors_stay_db_errors() {
        let err = RepoError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, RepoError::Db(DbError::Sqlite(_))));

        let err = RepoError::from(DbError::UnsupportedSchemaVersion {
            db_version: 9,
            latest_supported: 1,
        });
        assert!(matches!(err, RepoError::Db(DbError::UnsupportedSchemaVersion { .. })));
    }
}
