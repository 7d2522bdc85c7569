//! Statistics generation from the record store
//!
//! This module provides functionality for extracting and displaying
//! per-table row counts from the storage layer.

use crate::storage::{RecordSink, RecordTable, StorageResult};

/// Row counts of the record tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStatistics {
    /// Count per table, in [`RecordTable::ALL`] order
    pub tables: Vec<(RecordTable, u64)>,
}

impl TableStatistics {
    /// Total number of rows across all tables
    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|(_, count)| count).sum()
    }

    /// Returns the row count of `table`
    pub fn count(&self, table: RecordTable) -> u64 {
        self.tables
            .iter()
            .find(|(t, _)| *t == table)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The record store to query
///
/// # Returns
///
/// * `Ok(TableStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to count a table
pub fn load_statistics(storage: &dyn RecordSink) -> StorageResult<TableStatistics> {
    let tables = RecordTable::ALL
        .iter()
        .map(|&table| Ok((table, storage.count_records(table)?)))
        .collect::<StorageResult<Vec<_>>>()?;

    Ok(TableStatistics { tables })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &TableStatistics) {
    println!("=== Record Statistics ===\n");

    for (table, count) in &stats.tables {
        println!("  {:<18} {:>10}", table.table_name(), count);
    }

    println!();
    println!("  {:<18} {:>10}", "total", stats.total_rows());
}
