use crate::crawler::ListingIndex;
use crate::listing::{FilterDimension, FilterPath, ListingKind};
use crate::parser::page_count;
use crate::url::{build_listing_url, page_token};

/// A listing index of one city site, ready to be partitioned
#[derive(Debug, Clone)]
pub struct ListingEndpoint {
    kind: ListingKind,
    base: String,
    page_cap: u32,
    filters: Vec<FilterDimension>,
}

impl ListingEndpoint {
    /// Creates the endpoint of `kind` under a city site
    ///
    /// # Examples
    ///
    /// ```
    /// use listing_sweep::{ListingEndpoint, ListingKind};
    ///
    /// let endpoint = ListingEndpoint::new(ListingKind::Rent, "https://sh.lianjia.com/");
    /// assert_eq!(endpoint.base(), "https://sh.lianjia.com/zufang/");
    /// ```
    pub fn new(kind: ListingKind, site_url: &str) -> Self {
        Self {
            kind,
            base: format!(
                "{}/{}/",
                site_url.trim_end_matches('/'),
                kind.path_segment()
            ),
            page_cap: kind.default_page_cap(),
            filters: kind.filter_dimensions(),
        }
    }

    /// Overrides the page cap of this index
    pub fn with_page_cap(mut self, page_cap: u32) -> Self {
        self.page_cap = page_cap;
        self
    }

    pub fn kind(&self) -> ListingKind {
        self.kind
    }

    /// Endpoint URL, always ending with `/`
    pub fn base(&self) -> &str {
        &self.base
    }
}

impl ListingIndex for ListingEndpoint {
    fn filter_dimensions(&self) -> &[FilterDimension] {
        &self.filters
    }

    fn page_cap(&self) -> u32 {
        self.page_cap
    }

    fn query_url(&self, region: &str, path: &FilterPath) -> String {
        build_listing_url(&self.base, region, path.tokens())
    }

    fn page_url(&self, region: &str, path: &FilterPath, page: u32) -> String {
        let mut tokens = Vec::with_capacity(path.depth() + 1);
        tokens.push(page_token(page));
        tokens.extend(path.tokens().iter().cloned());
        build_listing_url(&self.base, region, &tokens)
    }

    fn page_count(&self, html: &str) -> u32 {
        page_count(self.kind.pagination_style(), html)
    }
}
