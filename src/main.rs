//! # Tilecrawl CLI
//!
//! Command-line interface for the tilecrawl library.
//! Crawls the target tile mosaic and renders the discovered tiles into a
//! single index.html reproducing the image.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::{error, info, LevelFilter};
use tilecrawl::{CrawlOptions, Crawler, Result, TileSource, PLACEHOLDER_SEEDS, SEEDS};

mod cli;

/// Command-line interface for tilecrawl
#[derive(Parser)]
#[command(name = "tilecrawl")]
#[command(about = "Flood-fill crawler and mosaic renderer for grid-addressed image tiles")]
#[command(long_about = "Discovers and downloads a tiled image mosaic by flood-fill:
  tilecrawl                        # Crawl into ./out and render out/index.html
  tilecrawl -d mosaic              # Crawl into ./mosaic
  tilecrawl --local                # Re-render from tiles already on disk
  tilecrawl -vv                    # Trace dedup and expansion decisions

The grid's extent is unknown; the crawler expands outward from known-good
seed coordinates and prunes wherever the server answers 404. Missing tiles
render as placeholders, never as errors.")]
#[command(version)]
struct Cli {
    /// Directory for downloaded tiles and the rendered index.html
    #[arg(short, long, default_value = "out")]
    dir: PathBuf,

    /// Only examine local files; never touch the network
    #[arg(long)]
    local: bool,

    /// Increase log verbosity (-v: 404s, -vv: render and expansion traces)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Maximum number of tile downloads in flight
    #[arg(long, default_value_t = tilecrawl::DEFAULT_MAX_IN_FLIGHT)]
    concurrency: usize,

    /// Override the tile server base URL
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("❌ Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr; -v sets the default level, RUST_LOG wins
    let default_level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    let source = match &cli.base_url {
        Some(url) => TileSource::with_base_url(url.clone()),
        None => TileSource::default(),
    };

    if cli.local {
        eprintln!("🧩 Re-rendering from local tiles in {}", cli.dir.display());
    } else {
        eprintln!("🧩 Crawling {} into {}", source.base_url, cli.dir.display());
    }

    // Fail on an unwritable destination before any fetch is attempted
    let mut index = tilecrawl::create_index_file(&cli.dir).await?;

    let options = CrawlOptions {
        output_dir: cli.dir.clone(),
        local_only: cli.local,
        max_in_flight: cli.concurrency,
        source,
    };
    let crawler = Crawler::new(options);

    for seed in SEEDS {
        crawler.seed(seed);
    }
    for seed in PLACEHOLDER_SEEDS {
        crawler.seed(seed);
    }

    // Background reporter: one status line per second until the crawl settles
    let progress = cli::ProgressManager::new("starting crawl...");
    let reporter = {
        let crawler = crawler.clone();
        let spinner = cli::ProgressManager {
            pb: progress.pb.clone(),
        };
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            loop {
                ticker.tick().await;
                let stats = crawler.stats();
                info!(
                    "Downloaded: {}, Attempted: {}, Pending: {}",
                    stats.found, stats.tried, stats.in_flight
                );
                spinner.update(stats);
            }
        })
    };

    crawler.wait().await;
    reporter.abort();
    progress.finish(crawler.stats());

    let report = crawler.report();
    tilecrawl::write_index(&mut index, &report).await?;

    eprintln!(
        "📁 Wrote {}",
        cli.dir.join(tilecrawl::INDEX_NAME).display()
    );

    Ok(())
}
