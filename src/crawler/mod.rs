//! Crawler module for listing enumeration and page processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with User-Agent rotation
//! - Partitioning listing queries under the page cap
//! - Region-by-region crawl coordination with retries
//! - The community detail worker pool

mod coordinator;
mod detail;
mod fetcher;
mod frontier;
mod partition;

pub use coordinator::{run_crawl, AbandonedRegion, Coordinator, CrawlReport, RegionSummary};
pub use detail::{DetailCrawler, DetailReport};
pub use fetcher::{build_http_client, HttpFetcher, PageFetcher, DEFAULT_USER_AGENTS};
pub use frontier::SharedFrontier;
pub use partition::{CandidateUrl, Enumeration, Leaf, ListingIndex, Partitioner};

use crate::config::Config;
use crate::Result;

/// Runs the community detail crawl
///
/// Seeds today's URL list from the stored communities (unless a cached list
/// exists) and drains it with `detail-workers` concurrent workers.
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `fresh` - Whether to discard today's cached URL list
///
/// # Returns
///
/// * `Ok(DetailReport)` - The URL list was drained
/// * `Err(SweepError)` - Crawl failed to start or a worker panicked
pub async fn crawl_details(config: Config, fresh: bool) -> Result<DetailReport> {
    DetailCrawler::new(config, fresh)?.run().await
}
