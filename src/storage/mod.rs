//! Storage module for persisting extracted records
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Idempotent upserts of listing records
//! - Partial updates of community details
//! - Row counts for reporting

mod records;
mod schema;
mod sqlite;
mod traits;

pub use records::{
    Community, CommunityDetail, HistoricalPrice, HouseInfo, Record, RecordBatch, RecordTable,
    RentInfo, SellInfo, SubwayCommunity,
};
pub use sqlite::SqliteStorage;
pub use traits::{RecordSink, StorageError, StorageResult};

use crate::SweepError;

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(SweepError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, SweepError> {
    SqliteStorage::new(path)
}
