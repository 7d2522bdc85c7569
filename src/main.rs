//! Listing-Sweep main entry point
//!
//! This is the command-line interface for the Listing-Sweep crawler.

use anyhow::{bail, Context};
use clap::Parser;
use listing_sweep::config::{load_config_with_hash, Config};
use listing_sweep::crawler::{crawl_details, run_crawl};
use listing_sweep::output::{
    load_statistics, print_crawl_report, print_detail_report, print_statistics,
};
use listing_sweep::storage::open_storage;
use listing_sweep::ListingKind;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Listing-Sweep: a resumable property-listing crawler
///
/// Listing-Sweep walks the listing indexes of a city site region by region,
/// narrowing oversized queries with the site's filters until every result
/// page is reachable, and stores the records in SQLite. Interrupted runs
/// resume from today's frontier files.
#[derive(Parser, Debug)]
#[command(name = "listing-sweep")]
#[command(version = "1.0.0")]
#[command(about = "A resumable property-listing crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Only crawl this listing kind (sale, rent, community, transaction); repeatable
    #[arg(long = "listing", value_name = "KIND")]
    listings: Vec<ListingKind>,

    /// Only crawl this region; repeatable
    #[arg(long = "region", value_name = "REGION")]
    regions: Vec<String>,

    /// Run the community detail crawl instead of the listing crawl
    #[arg(long)]
    detail: bool,

    /// Discard today's cached frontiers before crawling
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "detail"])]
    dry_run: bool,

    /// Show per-table record counts and exit
    #[arg(long, conflicts_with_all = ["dry_run", "detail"])]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let config = restrict(config, &cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.detail {
        let report = crawl_details(config, cli.fresh).await?;
        print_detail_report(&report);
    } else {
        handle_crawl(config, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_sweep=info,warn"),
            1 => EnvFilter::new("listing_sweep=debug,info"),
            2 => EnvFilter::new("listing_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies the `--listing` and `--region` filters to the configuration
fn restrict(mut config: Config, cli: &Cli) -> anyhow::Result<Config> {
    if !cli.listings.is_empty() {
        config.listings = cli.listings.clone();
    }

    if !cli.regions.is_empty() {
        for region in &cli.regions {
            if !config.regions.contains(region) {
                bail!("region '{}' is not listed in the configuration", region);
            }
        }
        config.regions = cli.regions.clone();
    }

    Ok(config)
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Listing-Sweep Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Site: {} (city {})", config.crawler.base_url, config.crawler.city);
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!(
        "  Region retry delay: {}ms",
        config.crawler.region_retry_delay_ms
    );
    println!(
        "  Max region attempts: {}",
        match config.crawler.max_region_attempts {
            0 => "unlimited".to_string(),
            n => n.to_string(),
        }
    );
    println!("  Detail workers: {}", config.crawler.detail_workers);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Cache dir: {}", config.output.cache_dir.display());

    println!("\nListing indexes ({}):", config.listings.len());
    for &kind in &config.listings {
        let endpoint = config.endpoint(kind);
        println!(
            "  - {} {} (page cap {})",
            kind,
            endpoint.base(),
            listing_sweep::crawler::ListingIndex::page_cap(&endpoint)
        );
    }

    println!("\nRegions ({}):", config.regions.len());
    for region in &config.regions {
        println!("  - {}", region);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl {} region/index combinations",
        config.listings.len() * config.regions.len()
    );
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring today's frontiers)");
    } else {
        tracing::info!("Starting crawl (will resume today's frontiers)");
    }

    tracing::info!(
        "Listing kinds: {}, regions: {}",
        config.listings.len(),
        config.regions.len()
    );

    let report = run_crawl(config, fresh).await?;
    print_crawl_report(&report);

    if !report.abandoned.is_empty() {
        bail!("{} regions were abandoned", report.abandoned.len());
    }

    Ok(())
}
