//! Stored shape of the `users` table.

use crate::model::user::{User, UserCreate, UserUpdate};
use crate::model::EntityId;
use crate::repo::sqlite::{SqliteRepository, StoredRecord};
use crate::repo::RepoResult;
use rusqlite::types::Value;
use rusqlite::Row;

/// One row of `users`, including store-managed timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: EntityId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    /// Epoch milliseconds, set by the store on insert.
    pub created_at: i64,
    /// Epoch milliseconds, bumped on every update/patch.
    pub updated_at: i64,
}

/// SQLite user repository bound to one connection or transaction.
pub type SqliteUserRepository<'conn> = SqliteRepository<'conn, UserRecord>;

impl StoredRecord for UserRecord {
    type Domain = User;

    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &["first_name", "last_name", "username", "email"];

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            username: row.get("username")?,
            email: row.get("email")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn to_domain(&self) -> User {
        User {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }

    fn create_values(payload: &UserCreate) -> Vec<Value> {
        vec![
            Value::Text(payload.first_name.clone()),
            Value::Text(payload.last_name.clone()),
            Value::Text(payload.username.clone()),
            Value::Text(payload.email.clone()),
        ]
    }

    fn update_values(payload: &UserUpdate) -> Vec<Option<Value>> {
        [
            &payload.first_name,
            &payload.last_name,
            &payload.username,
            &payload.email,
        ]
        .into_iter()
        .map(|value| value.clone().map(Value::Text))
        .collect()
    }
}
