//! Listing types and their filter dimensions
//!
//! Each listing index of the portal (second-hand sales, rentals, communities,
//! closed transactions) has its own URL segment, page cap, pagination widget
//! and set of filters usable to split an oversized query.

mod endpoint;
mod filters;

pub use endpoint::ListingEndpoint;
pub use filters::{FilterDimension, FilterPath};

use crate::parser::PaginationStyle;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Page cap the portal applies to most listing indexes
pub const DEFAULT_PAGE_CAP: u32 = 100;

/// Page cap of the community index
pub const COMMUNITY_PAGE_CAP: u32 = 30;

/// The listing indexes this crawler knows how to walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    /// Second-hand homes for sale
    Sale,
    /// Rentals
    Rent,
    /// Residential communities
    Community,
    /// Closed transactions
    Transaction,
}

impl ListingKind {
    /// Every kind, in the order a full run crawls them
    pub const ALL: [ListingKind; 4] = [Self::Sale, Self::Rent, Self::Community, Self::Transaction];

    /// URL path segment of the listing index
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::Sale => "ershoufang",
            Self::Rent => "zufang",
            Self::Community => "xiaoqu",
            Self::Transaction => "chengjiao",
        }
    }

    /// Prefix of this kind's frontier cache files
    pub fn cache_prefix(&self) -> &'static str {
        self.path_segment()
    }

    pub fn default_page_cap(&self) -> u32 {
        match self {
            Self::Community => COMMUNITY_PAGE_CAP,
            _ => DEFAULT_PAGE_CAP,
        }
    }

    pub fn pagination_style(&self) -> PaginationStyle {
        match self {
            Self::Rent => PaginationStyle::TotalPageAttr,
            _ => PaginationStyle::PageData,
        }
    }

    /// Filter dimensions in the order they are applied when splitting a query
    pub fn filter_dimensions(&self) -> Vec<FilterDimension> {
        match self {
            Self::Sale => vec![
                FilterDimension::banded("price", "p", 7),
                FilterDimension::banded("rooms", "l", 6),
            ],
            Self::Rent => vec![FilterDimension::banded("rent", "rp", 7)],
            Self::Community => vec![FilterDimension::banded("unit-price", "p", 7)],
            Self::Transaction => vec![
                FilterDimension::banded("price", "p", 7),
                FilterDimension::banded("area", "a", 7),
                FilterDimension::banded("rooms", "l", 6),
                FilterDimension::banded("facing", "f", 5),
            ],
        }
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sale => "sale",
            Self::Rent => "rent",
            Self::Community => "community",
            Self::Transaction => "transaction",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ListingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sale" | "ershoufang" => Ok(Self::Sale),
            "rent" | "zufang" => Ok(Self::Rent),
            "community" | "xiaoqu" => Ok(Self::Community),
            "transaction" | "chengjiao" => Ok(Self::Transaction),
            other => Err(format!(
                "unknown listing kind '{}', expected one of: sale, rent, community, transaction",
                other
            )),
        }
    }
}
