//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the RecordSink trait.

use crate::storage::records::Record;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecordSink, StorageResult};
use crate::storage::{CommunityDetail, RecordBatch, RecordTable};
use crate::SweepError;
use rusqlite::{params, Connection, Transaction};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(SweepError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, SweepError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA mmap_size = 268435456;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, SweepError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Builds the upsert statement of a record type
///
/// Non-key columns are overwritten on conflict and `updated_at` is bumped.
/// A record made only of key columns has nothing to overwrite, so a repeat
/// is ignored.
fn upsert_sql<R: Record>() -> String {
    let columns = R::COLUMNS.join(", ");
    let placeholders = (1..=R::COLUMNS.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let keys = R::KEY_COLUMNS.join(", ");

    let updates: Vec<String> = R::COLUMNS
        .iter()
        .filter(|column| !R::KEY_COLUMNS.contains(column))
        .map(|column| format!("{0} = excluded.{0}", column))
        .collect();

    let conflict = if updates.is_empty() {
        "DO NOTHING".to_string()
    } else {
        format!(
            "DO UPDATE SET {}, updated_at = datetime('now')",
            updates.join(", ")
        )
    };

    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT({}) {}",
        R::TABLE,
        columns,
        placeholders,
        keys,
        conflict
    )
}

fn write_records<R: Record>(tx: &Transaction<'_>, records: &[R]) -> StorageResult<usize> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut stmt = tx.prepare_cached(&upsert_sql::<R>())?;
    for record in records {
        stmt.execute(&record.values()[..])?;
    }

    Ok(records.len())
}

impl RecordSink for SqliteStorage {
    fn upsert(&mut self, batches: &[RecordBatch]) -> StorageResult<usize> {
        if batches.iter().all(RecordBatch::is_empty) {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        let mut written = 0;

        for batch in batches {
            written += match batch {
                RecordBatch::Communities(records) => write_records(&tx, records)?,
                RecordBatch::Houses(records) => write_records(&tx, records)?,
                RecordBatch::HistoricalPrices(records) => write_records(&tx, records)?,
                RecordBatch::Sales(records) => write_records(&tx, records)?,
                RecordBatch::Rentals(records) => write_records(&tx, records)?,
                RecordBatch::SubwayCommunities(records) => write_records(&tx, records)?,
            };
        }

        tx.commit()?;
        Ok(written)
    }

    fn update_community_detail(
        &mut self,
        community_id: &str,
        detail: &CommunityDetail,
    ) -> StorageResult<bool> {
        let updated = self.conn.execute(
            "UPDATE community SET
                year = COALESCE(?1, year),
                house_type = COALESCE(?2, house_type),
                cost = COALESCE(?3, cost),
                service = COALESCE(?4, service),
                company = COALESCE(?5, company),
                building_num = COALESCE(?6, building_num),
                house_num = COALESCE(?7, house_num),
                updated_at = datetime('now')
             WHERE id = ?8",
            params![
                detail.year,
                detail.house_type,
                detail.cost,
                detail.service,
                detail.company,
                detail.building_num,
                detail.house_num,
                community_id
            ],
        )?;

        Ok(updated > 0)
    }

    fn community_links(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT link FROM community ORDER BY id")?;

        let links = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(links)
    }

    fn count_records(&self, table: RecordTable) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.table_name()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
