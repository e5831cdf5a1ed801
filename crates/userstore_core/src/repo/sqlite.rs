//! SQLite repository backend.
//!
//! # Responsibility
//! - Translate repository calls into SQL against one open transaction.
//! - Keep table/column knowledge in `StoredRecord` implementations.
//!
//! # Invariants
//! - The repository never commits or rolls back; the session owner does.
//! - Every write reloads the affected row before converting to the domain,
//!   so returned records include store-generated values.
//! - Handles must be migrated to the latest schema before use.

use crate::db::migrations::latest_version;
use crate::model::{Entity, EntityId};
use crate::repo::{RepoError, RepoResult, Repository};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::marker::PhantomData;

const UPDATED_AT_ASSIGNMENT: &str = "updated_at = (strftime('%s', 'now') * 1000)";
const BOOKKEEPING_COLUMNS: &[&str] = &["id", "created_at", "updated_at"];

/// Table-row shape owned by the SQLite backend.
///
/// `COLUMNS` lists the data columns in payload order; `id`, `created_at` and
/// `updated_at` are managed by the store and must not appear in it.
pub trait StoredRecord: Sized {
    type Domain: Entity;

    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    /// Decodes one row selected with `id`, `COLUMNS`, `created_at`, `updated_at`.
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;

    /// Converts the stored shape into the domain record.
    fn to_domain(&self) -> Self::Domain;

    /// Values for `COLUMNS`, in order, taken from a create payload.
    fn create_values(payload: &<Self::Domain as Entity>::Create) -> Vec<Value>;

    /// Values for `COLUMNS`, in order, taken from an update payload.
    /// `None` marks an absent field.
    fn update_values(payload: &<Self::Domain as Entity>::Update) -> Vec<Option<Value>>;
}

/// Repository over a borrowed, migrated SQLite connection or transaction.
pub struct SqliteRepository<'conn, R: StoredRecord> {
    conn: &'conn Connection,
    record: PhantomData<R>,
}

impl<'conn, R: StoredRecord> SqliteRepository<'conn, R> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// Pass a `rusqlite::Transaction` (it derefs to `Connection`) to scope
    /// every write to one unit of work.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready::<R>(conn)?;
        Ok(Self {
            conn,
            record: PhantomData,
        })
    }

    fn select_sql() -> String {
        format!(
            "SELECT id, {}, created_at, updated_at FROM {}",
            R::COLUMNS.join(", "),
            R::TABLE
        )
    }

    fn load(&self, id: EntityId) -> RepoResult<Option<R>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE id = ?1;", Self::select_sql()))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(R::from_row(row)?));
        }

        Ok(None)
    }

    fn refresh(&self, id: EntityId) -> RepoResult<R> {
        self.load(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "row {id} missing from `{}` right after write",
                R::TABLE
            ))
        })
    }

    fn write_columns(
        &self,
        op: &'static str,
        id: EntityId,
        assignments: Vec<(&'static str, Value)>,
    ) -> RepoResult<Option<R::Domain>> {
        if self.load(id)?.is_none() {
            debug!(
                "event=repo_{op} module=repo backend=sqlite table={} status=not_found id={id}",
                R::TABLE
            );
            return Ok(None);
        }

        let mut set_clauses: Vec<String> = assignments
            .iter()
            .enumerate()
            .map(|(index, (column, _))| format!("{column} = ?{}", index + 2))
            .collect();
        set_clauses.push(UPDATED_AT_ASSIGNMENT.to_string());

        let mut bind_values = Vec::with_capacity(assignments.len() + 1);
        bind_values.push(Value::Integer(id));
        bind_values.extend(assignments.into_iter().map(|(_, value)| value));

        self.conn.execute(
            &format!(
                "UPDATE {} SET {} WHERE id = ?1;",
                R::TABLE,
                set_clauses.join(", ")
            ),
            params_from_iter(bind_values),
        )?;

        let record = self.refresh(id)?;
        debug!(
            "event=repo_{op} module=repo backend=sqlite table={} status=ok id={id}",
            R::TABLE
        );
        Ok(Some(record.to_domain()))
    }
}

impl<R: StoredRecord> Repository<R::Domain> for SqliteRepository<'_, R> {
    fn list(&self) -> RepoResult<Vec<R::Domain>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY id ASC;", Self::select_sql()))?;
        let mut rows = stmt.query([])?;
        let mut entities = Vec::new();

        while let Some(row) = rows.next()? {
            entities.push(R::from_row(row)?.to_domain());
        }

        Ok(entities)
    }

    fn get(&self, id: EntityId) -> RepoResult<Option<R::Domain>> {
        Ok(self.load(id)?.map(|record| record.to_domain()))
    }

    fn create(&mut self, payload: &<R::Domain as Entity>::Create) -> RepoResult<R::Domain> {
        let values = R::create_values(payload);
        if values.len() != R::COLUMNS.len() {
            return Err(RepoError::InvalidData(format!(
                "create payload for `{}` has {} values, expected {}",
                R::TABLE,
                values.len(),
                R::COLUMNS.len()
            )));
        }

        let placeholders = (1..=values.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        self.conn.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES ({placeholders});",
                R::TABLE,
                R::COLUMNS.join(", ")
            ),
            params_from_iter(values),
        )?;

        let id = self.conn.last_insert_rowid();
        let record = self.refresh(id)?;
        debug!(
            "event=repo_create module=repo backend=sqlite table={} status=ok id={id}",
            R::TABLE
        );
        Ok(record.to_domain())
    }

    fn update(
        &mut self,
        id: EntityId,
        payload: &<R::Domain as Entity>::Update,
    ) -> RepoResult<Option<R::Domain>> {
        let assignments = R::COLUMNS
            .iter()
            .copied()
            .zip(R::update_values(payload))
            .map(|(column, value)| (column, value.unwrap_or(Value::Null)))
            .collect();
        self.write_columns("update", id, assignments)
    }

    fn patch(
        &mut self,
        id: EntityId,
        payload: &<R::Domain as Entity>::Update,
    ) -> RepoResult<Option<R::Domain>> {
        let assignments = R::COLUMNS
            .iter()
            .copied()
            .zip(R::update_values(payload))
            .filter_map(|(column, value)| value.map(|value| (column, value)))
            .collect();
        self.write_columns("patch", id, assignments)
    }

    fn delete(&mut self, id: EntityId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute(&format!("DELETE FROM {} WHERE id = ?1;", R::TABLE), [id])?;
        let status = if changed > 0 { "ok" } else { "not_found" };
        debug!(
            "event=repo_delete module=repo backend=sqlite table={} status={status} id={id}",
            R::TABLE
        );
        Ok(changed > 0)
    }
}

fn ensure_connection_ready<R: StoredRecord>(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, R::TABLE)? {
        return Err(RepoError::MissingRequiredTable(R::TABLE));
    }

    for column in BOOKKEEPING_COLUMNS.iter().chain(R::COLUMNS).copied() {
        if !table_has_column(conn, R::TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: R::TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
