//! Storage traits and error types
//!
//! This module defines the trait interface for record sinks and the
//! associated error types.

use crate::storage::{CommunityDetail, RecordBatch, RecordTable};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for record sink implementations
///
/// A sink persists the records extracted from listing and detail pages.
/// Writes are idempotent: storing the same batch twice leaves the store in
/// the same state as storing it once.
pub trait RecordSink {
    /// Upserts every batch of one page
    ///
    /// All non-empty batches are written in one transaction; if any row fails
    /// nothing of the call is kept.
    ///
    /// # Arguments
    ///
    /// * `batches` - The record batches extracted from one page
    ///
    /// # Returns
    ///
    /// The number of rows written
    fn upsert(&mut self, batches: &[RecordBatch]) -> StorageResult<usize>;

    /// Fills the detail columns of an existing community
    ///
    /// Fields that are `None` keep their stored value.
    ///
    /// # Returns
    ///
    /// `true` if a community with that id exists
    fn update_community_detail(
        &mut self,
        community_id: &str,
        detail: &CommunityDetail,
    ) -> StorageResult<bool>;

    /// Links of every stored community, in id order
    fn community_links(&self) -> StorageResult<Vec<String>>;

    /// Counts the rows of a record table
    fn count_records(&self, table: RecordTable) -> StorageResult<u64>;
}
