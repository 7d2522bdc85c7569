//! Output module for crawl summaries and statistics
//!
//! This module handles:
//! - Printing the outcome of listing and detail crawls
//! - Per-table record statistics for `--stats`

pub mod stats;

pub use stats::{load_statistics, print_statistics, TableStatistics};

use crate::crawler::{CrawlReport, DetailReport};

/// Prints the outcome of a listing crawl to stdout
pub fn print_crawl_report(report: &CrawlReport) {
    println!("=== Listing Crawl Summary ===\n");

    for region in &report.completed {
        println!(
            "  {:<12} {:<12} {:>5} pages {:>7} records {:>4} skipped{}{}",
            region.kind.to_string(),
            region.region,
            region.pages,
            region.records,
            region.skipped,
            if region.resumed { "  (resumed)" } else { "" },
            match region.incomplete_leaves {
                Some(0) => String::new(),
                Some(n) => format!("  ({} incomplete leaves)", n),
                None => "  (incomplete leaves unknown)".to_string(),
            }
        );
    }

    if !report.abandoned.is_empty() {
        println!("\nAbandoned:");
        for region in &report.abandoned {
            println!(
                "  {} {} after {} attempts: {}",
                region.kind, region.region, region.attempts, region.last_error
            );
        }
    }

    println!("\nTotal records written: {}", report.total_records());
}

/// Prints the outcome of a detail crawl to stdout
pub fn print_detail_report(report: &DetailReport) {
    println!("=== Detail Crawl Summary ===\n");
    println!(
        "  URLs: {}{}",
        report.seeded,
        if report.resumed { " (resumed)" } else { "" }
    );
    println!("  Processed: {}", report.processed);
    println!("  Communities updated: {}", report.updated);
    println!("  Subway stops: {}", report.subways);
    println!("  Blocked: {}", report.blocked);
    println!("  Failed: {}", report.failed);
}
