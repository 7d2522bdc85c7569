//! Community detail crawl
//!
//! Visits the detail page of every stored community with a small pool of
//! workers, fills in the community's detail columns and records the nearby
//! subway stops. The URL list is seeded once per day from the community table
//! and checkpointed to the frontier cache while the pool drains it.

use crate::cache::{FrontierCache, RunKey};
use crate::config::Config;
use crate::crawler::{HttpFetcher, PageFetcher, SharedFrontier};
use crate::parser::{parse_community_detail, DetailPage};
use crate::storage::{RecordBatch, RecordSink, SqliteStorage, StorageError};
use crate::url::listing_id_from_url;
use crate::{FetchError, Result, SweepError};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Cache prefix and region of the detail frontier file
const DETAIL_CACHE_PREFIX: &str = "xiaoqu";
const DETAIL_CACHE_REGION: &str = "detail";

/// Per-worker outcome counts, summed into [`DetailReport`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    updated: usize,
    subways: usize,
    blocked: usize,
    failed: usize,
}

impl Tally {
    fn add(&mut self, other: Tally) {
        self.updated += other.updated;
        self.subways += other.subways;
        self.blocked += other.blocked;
        self.failed += other.failed;
    }
}

/// Summary of a detail crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailReport {
    /// True if the URL list came from today's cache
    pub resumed: bool,

    /// URLs the pool started with
    pub seeded: usize,

    /// Pages processed, whatever their outcome
    pub processed: usize,

    /// Communities whose detail columns were written
    pub updated: usize,

    /// Subway rows written
    pub subways: usize,

    /// Pages answered with a verification interstitial
    pub blocked: usize,

    /// Pages that failed to fetch or store
    pub failed: usize,
}

enum Outcome {
    Stored { detail: bool, subways: usize },
    Blocked,
}

/// State shared by the workers of one run
struct WorkerContext {
    frontier: SharedFrontier,
    storage: Arc<Mutex<SqliteStorage>>,
    cache: FrontierCache,
    key: RunKey,
    delay: Duration,
}

/// Runs the community detail crawl
pub struct DetailCrawler<F> {
    config: Arc<Config>,
    storage: Arc<Mutex<SqliteStorage>>,
    cache: FrontierCache,
    fetcher: F,
    fresh: bool,
}

impl DetailCrawler<HttpFetcher> {
    /// Opens the store and builds the HTTP fetcher from `config`
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

impl<F> DetailCrawler<F>
where
    F: PageFetcher + Clone + 'static,
{
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

    /// Key of today's detail frontier file
    pub fn run_key() -> RunKey {
        RunKey::today(DETAIL_CACHE_PREFIX, DETAIL_CACHE_REGION)
    }

    /// Returns today's URL list, seeding it from the community table if needed
    fn seed(&self, key: &RunKey) -> Result<(Vec<String>, bool)> {
        if self.fresh {
            self.cache.clear(key)?;
        }

        if let Some(urls) = self.cache.load(key) {
            info!("Resuming detail crawl with {} cached URLs", urls.len());
            return Ok((urls, true));
        }

        let urls = self
            .storage
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?
            .community_links()?;
        self.cache.save(key, &urls)?;
        info!("Seeded detail crawl with {} community URLs", urls.len());
        Ok((urls, false))
    }

    /// Frontier over `urls`, checkpointed every `detail-checkpoint-every`
    /// completions
    fn frontier(&self, urls: Vec<String>) -> SharedFrontier {
        SharedFrontier::new(urls, self.config.crawler.detail_checkpoint_every)
    }

    /// Crawls every pending detail page
    ///
    /// Failures of single pages are logged and counted; they never stop the
    /// pool. The frontier file is rewritten every `detail-checkpoint-every`
    /// completions and once more when the pool has drained.
    ///
    /// # Returns
    ///
    /// * `Ok(DetailReport)` - The pool drained
    /// * `Err(SweepError)` - Seeding failed or a worker task panicked
    pub async fn run(&self) -> Result<DetailReport> {
        let start_time = Instant::now();
        let key = Self::run_key();
        let (urls, resumed) = self.seed(&key)?;
        let seeded = urls.len();

        let context = Arc::new(WorkerContext {
            frontier: self.frontier(urls),
            storage: Arc::clone(&self.storage),
            cache: self.cache.clone(),
            key,
            delay: self.config.crawler.request_delay(),
        });

        let workers = (self.config.crawler.detail_workers as usize).min(seeded);
        let mut pool = JoinSet::new();
        for worker_id in 0..workers {
            let context = Arc::clone(&context);
            let fetcher = self.fetcher.clone();
            pool.spawn(async move { detail_worker(worker_id, fetcher, context).await });
        }

        let mut tally = Tally::default();
        while let Some(joined) = pool.join_next().await {
            let worker_tally = joined.map_err(|e| SweepError::Worker(e.to_string()))?;
            tally.add(worker_tally);
        }

        context.frontier.checkpoint(&context.cache, &context.key)?;

        let report = DetailReport {
            resumed,
            seeded,
            processed: context.frontier.completed(),
            updated: tally.updated,
            subways: tally.subways,
            blocked: tally.blocked,
            failed: tally.failed,
        };

        info!(
            "Detail crawl finished in {:.1}s: {} pages, {} updated, {} blocked, {} failed",
            start_time.elapsed().as_secs_f64(),
            report.processed,
            report.updated,
            report.blocked,
            report.failed
        );

        Ok(report)
    }
}

async fn detail_worker<F: PageFetcher>(
    worker_id: usize,
    fetcher: F,
    context: Arc<WorkerContext>,
) -> Tally {
    let mut tally = Tally::default();

    while let Some(url) = context.frontier.pop() {
        match crawl_detail(&fetcher, &context.storage, &url).await {
            Ok(Outcome::Stored { detail, subways }) => {
                debug!("[worker {}] {}: {} subway stops", worker_id, url, subways);
                if detail {
                    tally.updated += 1;
                }
                tally.subways += subways;
            }
            Ok(Outcome::Blocked) | Err(SweepError::Fetch(FetchError::Blocked { .. })) => {
                warn!("[worker {}] {} answered with a verification page", worker_id, url);
                tally.blocked += 1;
            }
            Err(e) => {
                warn!("[worker {}] {} failed: {}", worker_id, url, e);
                tally.failed += 1;
            }
        }

        match context.frontier.finish_one(&context.cache, &context.key) {
            Ok(true) => info!(
                "Detail crawl: {} done, {} left",
                context.frontier.completed(),
                context.frontier.remaining()
            ),
            Ok(false) => {}
            Err(e) => warn!("Failed to checkpoint detail frontier: {}", e),
        }

        if !context.delay.is_zero() {
            tokio::time::sleep(context.delay).await;
        }
    }

    tally
}

/// Fetches and stores the detail page of one community
async fn crawl_detail<F: PageFetcher>(
    fetcher: &F,
    storage: &Mutex<SqliteStorage>,
    url: &str,
) -> Result<Outcome> {
    let html = fetcher.fetch(url).await?;

    let community_id = listing_id_from_url(url).ok_or_else(|| {
        SweepError::Fetch(FetchError::Network {
            url: url.to_string(),
            message: "no community id in URL".to_string(),
        })
    })?;

    let (detail, subways) = match parse_community_detail(&html, &community_id) {
        DetailPage::Blocked => return Ok(Outcome::Blocked),
        DetailPage::Parsed { detail, subways } => (detail, subways),
    };

    debug!(
        "{}: {} subway items, {} skipped",
        url,
        subways.items(),
        subways.skipped.len()
    );
    for skipped in &subways.skipped {
        debug!("{}: subway item {}: {}", url, skipped.index, skipped.reason);
    }

    let mut storage = storage.lock().map_err(|_| StorageError::LockPoisoned)?;

    let subway_count = subways.records.len();
    if subway_count > 0 {
        storage.upsert(&[RecordBatch::SubwayCommunities(subways.records)])?;
    }

    let detail_written = if detail.is_empty() {
        false
    } else {
        storage.update_community_detail(&community_id, &detail)?
    };

    Ok(Outcome::Stored {
        detail: detail_written,
        subways: subway_count,
    })
}
