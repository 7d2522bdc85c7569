//! HTML extractors for listing and detail pages
//!
//! Each listing kind has one extractor turning an index page into records.
//! Extraction is per item: an item whose markup does not match is skipped with
//! a typed [`SkipReason`] and the rest of the page is kept. Nothing in here
//! returns an error to the caller; a page that yields nothing is just empty.

mod block;
mod community;
mod detail;
mod pagination;
mod rent;
mod sale;
mod transaction;

pub use block::is_block_page;
pub use community::parse_community_page;
pub use detail::{parse_community_detail, DetailPage};
pub use pagination::{page_count, PaginationStyle};
pub use rent::parse_rent_page;
pub use sale::parse_sale_page;
pub use transaction::parse_transaction_page;

use crate::listing::ListingKind;
use crate::storage::{HistoricalPrice, RecordBatch};
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use std::fmt;

/// Why an item of a page was not turned into a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A required element or attribute is absent
    MissingField(&'static str),

    /// A field is present but does not have the expected shape
    Malformed { field: &'static str, value: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing {}", field),
            Self::Malformed { field, value } => write!(f, "malformed {}: {:?}", field, value),
        }
    }
}

/// A skipped item and its position on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub index: usize,
    pub reason: SkipReason,
}

/// Records extracted from one page plus the items that were skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted<T> {
    pub records: Vec<T>,
    pub skipped: Vec<Skipped>,
}

impl<T> Default for Extracted<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T> Extracted<T> {
    /// Records the outcome of extracting the item at `index`
    pub fn push(&mut self, index: usize, item: Result<T, SkipReason>) {
        match item {
            Ok(record) => self.records.push(record),
            Err(reason) => self.skipped.push(Skipped { index, reason }),
        }
    }

    /// Number of items seen, extracted or not
    pub fn items(&self) -> usize {
        self.records.len() + self.skipped.len()
    }
}

/// Values shared by every record of a page
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    /// Region token the page was crawled for
    pub region: &'a str,

    /// City code of the site
    pub city: &'a str,

    /// Endpoint URL of the listing index, used to resolve relative links
    pub endpoint: &'a str,

    /// Calendar date of the crawl
    pub date: NaiveDate,
}

/// Everything one listing page produced
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    /// Record batches, all to be written in one transaction
    pub batches: Vec<RecordBatch>,

    /// Items that could not be extracted
    pub skipped: Vec<Skipped>,
}

impl ListingPage {
    /// Number of records across all batches
    pub fn record_count(&self) -> usize {
        self.batches.iter().map(RecordBatch::len).sum()
    }

    fn from_extracted<T>(extracted: Extracted<T>, wrap: fn(Vec<T>) -> RecordBatch) -> Self {
        Self {
            batches: vec![wrap(extracted.records)],
            skipped: extracted.skipped,
        }
    }
}

/// Runs the extractor matching `kind` over a listing index page
///
/// Sale pages additionally produce one [`HistoricalPrice`] per listing, dated
/// with the crawl date.
pub fn extract_listing(kind: ListingKind, html: &str, ctx: &PageContext<'_>) -> ListingPage {
    match kind {
        ListingKind::Sale => {
            let houses = parse_sale_page(html, ctx);
            let date = ctx.date.format("%Y-%m-%d").to_string();
            let prices = houses
                .records
                .iter()
                .map(|house| HistoricalPrice {
                    house_id: house.house_id.clone(),
                    total_price: house.total_price.clone(),
                    date: date.clone(),
                })
                .collect();

            ListingPage {
                batches: vec![
                    RecordBatch::Houses(houses.records),
                    RecordBatch::HistoricalPrices(prices),
                ],
                skipped: houses.skipped,
            }
        }
        ListingKind::Rent => {
            ListingPage::from_extracted(parse_rent_page(html, ctx), RecordBatch::Rentals)
        }
        ListingKind::Community => {
            ListingPage::from_extracted(parse_community_page(html, ctx), RecordBatch::Communities)
        }
        ListingKind::Transaction => {
            ListingPage::from_extracted(parse_transaction_page(html, ctx), RecordBatch::Sales)
        }
    }
}

// ===== Shared DOM helpers =====

/// Selects every element of the document matching `css`
pub(crate) fn select_all<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Selects every descendant of `scope` matching `css`
pub(crate) fn select_within<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => scope.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Selects the first descendant of `scope` matching `css`
pub(crate) fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    scope.select(&selector).next()
}

/// Like [`select_first`] but reports a missing element as a skip reason
pub(crate) fn require<'a>(
    scope: ElementRef<'a>,
    css: &str,
    field: &'static str,
) -> Result<ElementRef<'a>, SkipReason> {
    select_first(scope, css).ok_or(SkipReason::MissingField(field))
}

/// Reads a required attribute
pub(crate) fn require_attr<'a>(
    element: ElementRef<'a>,
    attr: &str,
    field: &'static str,
) -> Result<&'a str, SkipReason> {
    element
        .value()
        .attr(attr)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(SkipReason::MissingField(field))
}

/// Concatenated text of an element, whitespace collapsed
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    clean(&element.text().collect::<String>())
}

/// Collapses runs of whitespace into single spaces and trims the ends
pub(crate) fn clean(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
