//! SQLite-backed record of ticket ids that were already reported.

use std::collections::HashSet;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, Transaction, params};
use tracing::{debug, info};

use crate::Result;
use crate::dedup::Reconciliation;
use crate::error::StoreError;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS tickets (id TEXT PRIMARY KEY, first_seen TEXT)";

pub struct SeenStore {
    conn: Connection,
}

/// Seen-set mutations applied inside an open transaction.
///
/// Dropping it without calling [`PendingCommit::commit`] rolls everything
/// back.
pub struct PendingCommit<'a> {
    tx: Transaction<'a>,
    summary: CommitSummary,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CommitSummary {
    pub inserted: usize,
    pub dropped: usize,
}

impl SeenStore {
    /// Open (or create) the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Open`] when the database cannot be opened or the
    /// schema cannot be set up.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .and_then(|conn| {
                prepare_schema(&conn)?;
                Ok(conn)
            })
            .map_err(|source| StoreError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), "opened seen-ticket store");
        Ok(Self { conn })
    }

    /// # Errors
    ///
    /// Fails only if SQLite cannot allocate the in-memory database.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StoreError::from)?;
        prepare_schema(&conn).map_err(StoreError::from)?;
        Ok(Self { conn })
    }

    /// All ids currently recorded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Sqlite`] if the table cannot be read.
    pub fn ids(&self) -> Result<HashSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT CAST(id AS TEXT) FROM tickets")
            .map_err(StoreError::from)?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(StoreError::from)?
            .collect::<std::result::Result<HashSet<_>, _>>()
            .map_err(StoreError::from)?;
        Ok(ids)
    }

    /// Apply a run's insertions and deletions in one transaction, without
    /// committing it yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Sqlite`] if any statement fails; nothing is
    /// written in that case.
    pub fn stage(&mut self, reconciliation: &Reconciliation) -> Result<PendingCommit<'_>> {
        let tx = self.conn.transaction().map_err(StoreError::from)?;
        let summary = apply(&tx, reconciliation).map_err(StoreError::from)?;
        Ok(PendingCommit { tx, summary })
    }

    /// Stage and commit in one go.
    ///
    /// # Errors
    ///
    /// See [`SeenStore::stage`] and [`PendingCommit::commit`].
    pub fn apply(&mut self, reconciliation: &Reconciliation) -> Result<CommitSummary> {
        self.stage(reconciliation)?.commit()
    }
}

impl PendingCommit<'_> {
    #[must_use]
    pub const fn summary(&self) -> CommitSummary {
        self.summary
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Sqlite`] if SQLite refuses the commit.
    pub fn commit(self) -> Result<CommitSummary> {
        self.tx.commit().map_err(StoreError::from)?;
        info!(
            inserted = self.summary.inserted,
            dropped = self.summary.dropped,
            "seen-ticket store updated"
        );
        Ok(self.summary)
    }
}

fn prepare_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(SCHEMA, [])?;

    // Stores created by earlier tooling only carry the id column.
    let has_first_seen = conn
        .prepare("SELECT 1 FROM pragma_table_info('tickets') WHERE name = 'first_seen'")?
        .exists([])?;
    if !has_first_seen {
        conn.execute("ALTER TABLE tickets ADD COLUMN first_seen TEXT", [])?;
    }
    Ok(())
}

fn apply(tx: &Transaction<'_>, reconciliation: &Reconciliation) -> rusqlite::Result<CommitSummary> {
    let mut summary = CommitSummary::default();

    let mut delete = tx.prepare_cached("DELETE FROM tickets WHERE CAST(id AS TEXT) = ?1")?;
    for id in &reconciliation.to_drop {
        summary.dropped += delete.execute(params![id])?;
    }

    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut insert =
        tx.prepare_cached("INSERT OR IGNORE INTO tickets (id, first_seen) VALUES (?1, ?2)")?;
    for id in reconciliation.new_ids() {
        summary.inserted += insert.execute(params![id, now])?;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::SeenStore;
    use crate::dedup::Reconciliation;
    use crate::ggus::Ticket;

    fn insert(ids: &[&str]) -> Reconciliation {
        Reconciliation {
            newly_seen: ids.iter().map(|id| Ticket::new(*id)).collect(),
            ..Reconciliation::default()
        }
    }

    fn forget(ids: &[&str]) -> Reconciliation {
        Reconciliation {
            to_drop: ids.iter().map(|id| (*id).to_string()).collect(),
            ..Reconciliation::default()
        }
    }

    #[test]
    fn committed_mutations_are_visible() {
        let mut store = SeenStore::in_memory().unwrap();
        let summary = store.apply(&insert(&["100", "101"])).unwrap();
        assert_eq!(summary.inserted, 2);

        let summary = store.apply(&forget(&["100"])).unwrap();
        assert_eq!(summary.dropped, 1);
        assert_eq!(store.ids().unwrap(), ["101".to_string()].into());
    }

    #[test]
    fn uncommitted_stage_rolls_back() {
        let mut store = SeenStore::in_memory().unwrap();
        {
            let pending = store.stage(&insert(&["300"])).unwrap();
            assert_eq!(pending.summary().inserted, 1);
        }
        assert!(store.ids().unwrap().is_empty());
    }

    #[test]
    fn deleting_unknown_id_is_a_noop() {
        let mut store = SeenStore::in_memory().unwrap();
        let summary = store.apply(&forget(&["404"])).unwrap();
        assert_eq!(summary.dropped, 0);
    }

    #[test]
    fn reinserting_known_id_is_ignored() {
        let mut store = SeenStore::in_memory().unwrap();
        store.apply(&insert(&["1"])).unwrap();
        assert_eq!(store.apply(&insert(&["1"])).unwrap().inserted, 0);
    }

    #[test]
    fn legacy_integer_table_is_migrated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ggus.db");
        {
            let conn = rusqlite::Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE tickets (id); INSERT INTO tickets (id) VALUES (163201);")
                .unwrap();
        }

        let mut store = SeenStore::open(&path).unwrap();
        assert!(store.ids().unwrap().contains("163201"));
        assert_eq!(store.apply(&forget(&["163201"])).unwrap().dropped, 1);
        assert!(store.ids().unwrap().is_empty());
    }
}
