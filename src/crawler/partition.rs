//! Adaptive filter partitioning
//!
//! The portal never shows more than a fixed number of result pages for one
//! query. When a query reports that many pages or more, it is split along the
//! next filter dimension and each narrower query is explored in turn, until
//! every query fits under the cap or the dimensions run out.
//!
//! Exploration is a depth-first walk with an explicit stack: all children of a
//! node are visited, in token order, before the node's next sibling.

use crate::crawler::PageFetcher;
use crate::listing::{FilterDimension, FilterPath};
use crate::FetchError;
use std::time::Duration;
use tracing::{debug, warn};

/// A listing index the partitioner can explore
pub trait ListingIndex: Send + Sync {
    /// Filter dimensions, applied in order, one token per level
    fn filter_dimensions(&self) -> &[FilterDimension];

    /// Largest number of result pages the portal shows for one query
    fn page_cap(&self) -> u32;

    /// URL of the unpaginated query for `path`
    fn query_url(&self, region: &str, path: &FilterPath) -> String;

    /// URL of result page `page` of the query for `path`
    fn page_url(&self, region: &str, path: &FilterPath, page: u32) -> String;

    /// Total number of result pages a query page announces, 0 if unknown
    fn page_count(&self, html: &str) -> u32;
}

/// One result page to crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateUrl {
    pub url: String,
    pub filter_path: FilterPath,
    pub page: u32,
}

/// A query that was not split further
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub path: FilterPath,

    /// Page count the query reported
    pub pages: u32,

    /// False if the query still hit the cap with no dimension left to split on
    pub complete: bool,
}

/// Result of exploring one region
#[derive(Debug, Clone, Default)]
pub struct Enumeration {
    pub candidates: Vec<CandidateUrl>,
    pub leaves: Vec<Leaf>,

    /// Number of query pages fetched
    pub queries: usize,
}

impl Enumeration {
    /// Candidate URLs in crawl order
    pub fn urls(&self) -> Vec<String> {
        self.candidates.iter().map(|c| c.url.clone()).collect()
    }

    /// Leaves whose results could not all be reached
    pub fn incomplete_leaves(&self) -> impl Iterator<Item = &Leaf> {
        self.leaves.iter().filter(|leaf| !leaf.complete)
    }
}

/// Explores listing indexes through a [`PageFetcher`]
pub struct Partitioner<'a, F: PageFetcher> {
    fetcher: &'a F,
    delay: Duration,
}

impl<'a, F: PageFetcher> Partitioner<'a, F> {
    /// Creates a partitioner pausing `delay` after every query fetch
    pub fn new(fetcher: &'a F, delay: Duration) -> Self {
        Self { fetcher, delay }
    }

    /// Enumerates every result page of `region` on `index`
    ///
    /// # Arguments
    ///
    /// * `index` - The listing index to explore
    /// * `region` - The region token
    ///
    /// # Returns
    ///
    /// * `Ok(Enumeration)` - The candidate pages, in crawl order
    /// * `Err(FetchError)` - A query page could not be fetched; nothing of the
    ///   partial enumeration is returned
    pub async fn enumerate<I: ListingIndex>(
        &self,
        index: &I,
        region: &str,
    ) -> Result<Enumeration, FetchError> {
        let dimensions = index.filter_dimensions();
        let cap = index.page_cap();
        let mut enumeration = Enumeration::default();
        let mut stack = vec![FilterPath::root()];

        while let Some(path) = stack.pop() {
            let level = path.depth();
            let url = index.query_url(region, &path);

            let html = self.fetcher.fetch(&url).await?;
            enumeration.queries += 1;
            let pages = index.page_count(&html);
            debug!("{} reports {} pages", url, pages);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            if pages >= cap && level < dimensions.len() {
                // Reversed so the first token is popped first
                for token in dimensions[level].tokens.iter().rev() {
                    stack.push(path.with(token));
                }
                continue;
            }

            let complete = pages < cap;
            if !complete {
                warn!(
                    "{} still reports {} pages with every filter applied, only {} are reachable",
                    url, pages, cap
                );
            }

            for page in 1..=pages.min(cap) {
                enumeration.candidates.push(CandidateUrl {
                    url: index.page_url(region, &path, page),
                    filter_path: path.clone(),
                    page,
                });
            }
            enumeration.leaves.push(Leaf {
                path,
                pages,
                complete,
            });
        }

        Ok(enumeration)
    }
}
