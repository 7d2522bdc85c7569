use crate::listing::{ListingEndpoint, ListingKind};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Listing-Sweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Region tokens to crawl, in order
    pub regions: Vec<String>,

    /// Listing kinds to crawl, in order
    #[serde(default = "default_listings")]
    pub listings: Vec<ListingKind>,

    pub crawler: CrawlerConfig,

    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,

    pub output: OutputConfig,
}

impl Config {
    /// The listing index of `kind` on the configured site
    ///
    /// Applies the configured page cap, if any, over the kind's default.
    pub fn endpoint(&self, kind: ListingKind) -> ListingEndpoint {
        let endpoint = ListingEndpoint::new(kind, &self.crawler.base_url);
        match self.crawler.page_cap {
            Some(cap) => endpoint.with_page_cap(cap),
            None => endpoint,
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Root URL of the city site, e.g. `https://sh.lianjia.com`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// City code stored with community records
    pub city: String,

    /// Pause after every fetch of the listing crawl (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Pause before a failed region is retried (milliseconds)
    #[serde(
        rename = "region-retry-delay-ms",
        default = "default_region_retry_delay_ms"
    )]
    pub region_retry_delay_ms: u64,

    /// Attempts per region before it is abandoned, 0 for unlimited
    #[serde(
        rename = "max-region-attempts",
        default = "default_max_region_attempts"
    )]
    pub max_region_attempts: u32,

    /// Whole-request timeout (seconds)
    #[serde(
        rename = "request-timeout-secs",
        default = "default_request_timeout_secs"
    )]
    pub request_timeout_secs: u64,

    /// Overrides the visible-page cap of every listing kind
    #[serde(rename = "page-cap", default)]
    pub page_cap: Option<u32>,

    /// Concurrent workers of the detail crawl
    #[serde(rename = "detail-workers", default = "default_detail_workers")]
    pub detail_workers: u32,

    /// Detail completions between two frontier checkpoints
    #[serde(
        rename = "detail-checkpoint-every",
        default = "default_detail_checkpoint_every"
    )]
    pub detail_checkpoint_every: usize,
}

impl CrawlerConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn region_retry_delay(&self) -> Duration {
        Duration::from_millis(self.region_retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// User-Agent rotation pool
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserAgentConfig {
    /// Browser User-Agent strings; one is picked at random per request.
    /// A built-in pool is used when empty.
    #[serde(default)]
    pub agents: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Directory of the per-day frontier files
    #[serde(rename = "cache-dir", default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

fn default_listings() -> Vec<ListingKind> {
    ListingKind::ALL.to_vec()
}

fn default_request_delay_ms() -> u64 {
    1000
}

fn default_region_retry_delay_ms() -> u64 {
    10_000
}

fn default_max_region_attempts() -> u32 {
    5
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_detail_workers() -> u32 {
    1
}

fn default_detail_checkpoint_every() -> usize {
    10
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".cache")
}
