//! URL handling module for Listing-Sweep
//!
//! This module composes listing-index URLs out of an endpoint, a region and
//! filter tokens, and provides the small link helpers the extractors and the
//! detail crawl need.

mod builder;
mod links;

// Re-export main functions
pub use builder::{build_listing_url, page_token};
pub use links::{listing_id_from_url, resolve_link, strip_trailing_slash};
