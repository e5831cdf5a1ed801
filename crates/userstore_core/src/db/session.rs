//! Scoped unit-of-work over one SQLite transaction.
//!
//! # Invariants
//! - The transaction is committed only when the unit of work returns `Ok`.
//! - Every other exit path (error, panic, early drop) rolls back, so no
//!   partial write is visible afterwards.
//! - Callers never commit from inside the unit of work.

use log::{debug, error};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::time::Instant;

/// Runs `work` inside one immediate transaction.
///
/// Commits when `work` succeeds and rolls back when it fails. The error type
/// only needs to absorb `rusqlite::Error` for begin/commit failures.
pub fn run_in_session<T, E, F>(conn: &mut Connection, work: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<rusqlite::Error>,
{
    let started_at = Instant::now();
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    match work(&tx) {
        Ok(value) => {
            tx.commit()?;
            debug!(
                "event=session_commit module=db status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                error!(
                    "event=session_rollback module=db status=error error={}",
                    rollback_err
                );
            } else {
                debug!(
                    "event=session_rollback module=db status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
            }
            Err(err)
        }
    }
}
