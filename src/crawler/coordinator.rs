//! Crawler coordinator - listing crawl orchestration
//!
//! This module contains the listing crawl loop, including:
//! - Loading a region's frontier from today's cache or enumerating it
//! - Fetching and extracting every candidate page in order
//! - Upserting the records and shrinking the persisted frontier
//! - Re-queueing failed regions behind the others

use crate::cache::{FrontierCache, RunKey};
use crate::config::Config;
use crate::crawler::{HttpFetcher, PageFetcher, Partitioner};
use crate::listing::ListingKind;
use crate::parser::{extract_listing, PageContext};
use crate::storage::{RecordSink, SqliteStorage, StorageError};
use crate::Result;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Outcome of one successfully crawled region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSummary {
    pub kind: ListingKind,
    pub region: String,

    /// True if the frontier came from today's cache
    pub resumed: bool,

    /// Candidate pages processed in this attempt
    pub pages: usize,

    /// Rows written
    pub records: usize,

    /// Items the extractors skipped
    pub skipped: usize,

    /// Queries that hit the page cap with every filter applied; `None` when
    /// the frontier was resumed, since the enumeration did not run
    pub incomplete_leaves: Option<usize>,
}

/// A region given up on after too many failed attempts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbandonedRegion {
    pub kind: ListingKind,
    pub region: String,
    pub attempts: u32,
    pub last_error: String,
}

/// Summary of a listing crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    pub completed: Vec<RegionSummary>,
    pub abandoned: Vec<AbandonedRegion>,
}

impl CrawlReport {
    pub fn total_records(&self) -> usize {
        self.completed.iter().map(|r| r.records).sum()
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<F: PageFetcher> {
    config: Arc<Config>,
    storage: Arc<Mutex<SqliteStorage>>,
    cache: FrontierCache,
    fetcher: F,
    fresh: bool,
}

impl Coordinator<HttpFetcher> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `fresh` - Whether to discard today's cached frontiers
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(SweepError)` - Failed to open storage or build the client
    pub fn new(config: Config, fresh: bool) -> Result<Self> {
        let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
        let fetcher = HttpFetcher::from_config(&config.crawler, &config.user_agent)?;

        Ok(Self::with_fetcher(
            config,
            Arc::new(Mutex::new(storage)),
            fetcher,
            fresh,
        ))
    }
}

impl<F: PageFetcher> Coordinator<F> {
    /// Creates a coordinator over an existing store and fetcher
    pub fn with_fetcher(
        config: Config,
        storage: Arc<Mutex<SqliteStorage>>,
        fetcher: F,
        fresh: bool,
    ) -> Self {
        let cache = FrontierCache::new(config.output.cache_dir.clone());
        Self {
            config: Arc::new(config),
            storage,
            cache,
            fetcher,
            fresh,
        }
    }

    /// Crawls every configured listing kind over every configured region
    ///
    /// Kinds are processed one after another. Within a kind, a region whose
    /// crawl fails is put back at the end of the queue after the retry delay;
    /// once it has failed `max-region-attempts` times it is abandoned.
    pub async fn run(&self) -> Result<CrawlReport> {
        let mut report = CrawlReport::default();
        let start_time = Instant::now();
        tracing::debug!("Frontier cache at {}", self.cache.dir().display());

        for &kind in &self.config.listings {
            if self.fresh {
                for region in &self.config.regions {
                    self.cache
                        .clear(&RunKey::today(kind.cache_prefix(), region.as_str()))?;
                }
            }

            self.run_kind(kind, &mut report).await;
        }

        tracing::info!(
            "Listing crawl finished in {:.1}s: {} regions done, {} abandoned, {} records written",
            start_time.elapsed().as_secs_f64(),
            report.completed.len(),
            report.abandoned.len(),
            report.total_records()
        );

        Ok(report)
    }

    async fn run_kind(&self, kind: ListingKind, report: &mut CrawlReport) {
        let max_attempts = self.config.crawler.max_region_attempts;
        let mut queue: VecDeque<(String, u32)> = self
            .config
            .regions
            .iter()
            .map(|region| (region.clone(), 0))
            .collect();

        while let Some((region, attempts)) = queue.pop_front() {
            match self.crawl_region(kind, &region).await {
                Ok(summary) => report.completed.push(summary),
                Err(e) => {
                    let attempts = attempts + 1;
                    if max_attempts > 0 && attempts >= max_attempts {
                        tracing::error!(
                            "Abandoning {} {} after {} attempts: {}",
                            kind,
                            region,
                            attempts,
                            e
                        );
                        report.abandoned.push(AbandonedRegion {
                            kind,
                            region,
                            attempts,
                            last_error: e.to_string(),
                        });
                        continue;
                    }

                    tracing::warn!(
                        "{} {} failed (attempt {}): {}; retrying after the other regions",
                        kind,
                        region,
                        attempts,
                        e
                    );
                    tokio::time::sleep(self.config.crawler.region_retry_delay()).await;
                    queue.push_back((region, attempts));
                }
            }
        }
    }

    /// Crawls one region of one listing kind
    ///
    /// Resumes from today's frontier file when there is one, otherwise
    /// enumerates the region and persists the full frontier first. After every
    /// page the records are upserted and the frontier file is rewritten with
    /// the pages still to do.
    ///
    /// # Returns
    ///
    /// * `Ok(RegionSummary)` - Every candidate page was processed
    /// * `Err(SweepError)` - A fetch, write or cache save failed; the frontier
    ///   file holds the pages still to do
    pub async fn crawl_region(&self, kind: ListingKind, region: &str) -> Result<RegionSummary> {
        let endpoint = self.config.endpoint(kind);
        let key = RunKey::today(kind.cache_prefix(), region);
        let delay = self.config.crawler.request_delay();
        tracing::debug!("Crawling {} {} from {}", endpoint.kind(), region, endpoint.base());

        let (frontier, resumed, incomplete_leaves) = match self.cache.load(&key) {
            Some(frontier) => {
                tracing::info!(
                    "Resuming {} {} with {} cached pages (incomplete leaves unknown)",
                    kind,
                    region,
                    frontier.len()
                );
                (frontier, true, None)
            }
            None => {
                let enumeration = Partitioner::new(&self.fetcher, delay)
                    .enumerate(&endpoint, region)
                    .await?;
                let incomplete = enumeration.incomplete_leaves().count();
                tracing::info!(
                    "Enumerated {} {}: {} pages from {} queries ({} incomplete leaves)",
                    kind,
                    region,
                    enumeration.candidates.len(),
                    enumeration.queries,
                    incomplete
                );

                let frontier = enumeration.urls();
                self.cache.save(&key, &frontier)?;
                (frontier, false, Some(incomplete))
            }
        };

        let ctx = PageContext {
            region,
            city: &self.config.crawler.city,
            endpoint: endpoint.base(),
            date: key.date,
        };

        let mut summary = RegionSummary {
            kind,
            region: region.to_string(),
            resumed,
            pages: 0,
            records: 0,
            skipped: 0,
            incomplete_leaves,
        };

        for (i, url) in frontier.iter().enumerate() {
            let html = self.fetcher.fetch(url).await?;
            let page = extract_listing(kind, &html, &ctx);
            tracing::debug!("{}: {} records", url, page.record_count());

            if !page.skipped.is_empty() {
                tracing::warn!("{}: skipped {} items", url, page.skipped.len());
                for skipped in &page.skipped {
                    tracing::debug!("  item {}: {}", skipped.index, skipped.reason);
                }
            }

            let written = {
                let mut storage = self
                    .storage
                    .lock()
                    .map_err(|_| StorageError::LockPoisoned)?;
                storage.upsert(&page.batches)?
            };

            self.cache.save(&key, &frontier[i + 1..])?;

            summary.pages += 1;
            summary.records += written;
            summary.skipped += page.skipped.len();

            if summary.pages % 10 == 0 || summary.pages == frontier.len() {
                tracing::info!(
                    "{} {}: {}/{} pages, {} records",
                    kind,
                    region,
                    summary.pages,
                    frontier.len(),
                    summary.records
                );
            }

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        Ok(summary)
    }
}

/// Runs a complete listing crawl
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `fresh` - Whether to discard today's cached frontiers
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished; some regions may have been abandoned
/// * `Err(SweepError)` - Crawl could not start
///
/// # Example
///
/// ```no_run
/// use listing_sweep::config::load_config;
/// use listing_sweep::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let report = run_crawl(config, false).await?;
/// println!("{} records", report.total_records());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, fresh: bool) -> Result<CrawlReport> {
    let coordinator = Coordinator::new(config, fresh)?;
    coordinator.run().await
}
