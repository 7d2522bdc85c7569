//! Listing-Sweep: a resumable property-listing crawler
//!
//! This crate crawls the listing indexes of a property portal region by region,
//! splitting oversized result sets with the portal's own filters until every
//! query fits under the visible-page cap, and upserts the extracted records
//! into SQLite. Crawl progress is kept in per-day frontier files so a killed
//! run picks up where it stopped.

pub mod cache;
pub mod config;
pub mod crawler;
pub mod listing;
pub mod output;
pub mod parser;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Listing-Sweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Frontier cache error at {path}: {source}")]
    Cache {
        path: String,
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Worker task failed: {0}")]
    Worker(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Page fetch failures
///
/// Every variant carries the URL so region-level retries can log what broke.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Blocked by verification page at {url}")]
    Blocked { url: String },
}

impl FetchError {
    /// Returns the URL the failed fetch was aimed at
    pub fn url(&self) -> &str {
        match self {
            Self::Network { url, .. }
            | Self::Timeout { url }
            | Self::Status { url, .. }
            | Self::Blocked { url } => url,
        }
    }
}

/// Result type alias for Listing-Sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use listing::{ListingEndpoint, ListingKind};
pub use url::build_listing_url;
