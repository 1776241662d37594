//! Flood-fill discovery engine for tilecrawl.
//!
//! Every coordinate visit runs as its own tokio task. Visits deduplicate
//! against a shared tried-set, confirm the tile either from the local cache
//! or over HTTP, and on confirmation schedule all neighboring coordinates.
//! Expansion prunes itself at coordinates whose tile does not exist, so the
//! crawl terminates without anyone knowing the true extent of the grid.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::{FutureExt, TryStreamExt};
use log::{debug, info, trace, warn};
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder, StatusCode};
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio::sync::Semaphore;
use tokio_util::io::StreamReader;
use tokio_util::task::TaskTracker;

use crate::core::coord::TileCoord;
use crate::core::error::{Error, Result};
use crate::core::source::TileSource;

/// Default number of tile fetches allowed in flight at once
pub const DEFAULT_MAX_IN_FLIGHT: usize = 10;

/// Global HTTP client with connection pooling and timeouts
static GLOBAL_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .tcp_keepalive(Duration::from_secs(60))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(20)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(format!("tilecrawl/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to create HTTP client")
});

/// Options for a crawl run
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Directory holding downloaded tiles and the rendered index
    pub output_dir: PathBuf,

    /// Never touch the network; only tiles already on disk count as found
    pub local_only: bool,

    /// Capacity of the fetch concurrency limiter
    pub max_in_flight: usize,

    /// Tile server the canonical names resolve against
    pub source: TileSource,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("out"),
            local_only: false,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            source: TileSource::default(),
        }
    }
}

/// Memoization tables shared by all visit tasks.
///
/// Found is always a subset of Tried; both only ever grow during a run.
#[derive(Debug, Default)]
struct CrawlState {
    tried: HashSet<String>,
    found: HashSet<String>,
}

/// Owned snapshot of the discovery result, taken after [`Crawler::wait`].
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Every tile name the engine began work on
    pub tried: HashSet<String>,
    /// Every tile name confirmed to exist
    pub found: HashSet<String>,
}

/// Point-in-time counters for progress reporting
#[derive(Debug, Clone, Copy)]
pub struct CrawlStats {
    pub found: usize,
    pub tried: usize,
    /// Visit tasks currently scheduled or running
    pub in_flight: usize,
}

struct Shared {
    state: Mutex<CrawlState>,
    limit: Semaphore,
    tracker: TaskTracker,
    options: CrawlOptions,
}

impl Shared {
    /// Atomic tried-check-and-insert. Returns false if the tile was already
    /// claimed by another task.
    fn begin(&self, name: &str) -> bool {
        let mut state = self.state.lock().expect("crawl state poisoned");
        if state.tried.contains(name) {
            return false;
        }
        state.tried.insert(name.to_string());
        true
    }

    fn mark_found(&self, name: &str) {
        let mut state = self.state.lock().expect("crawl state poisoned");
        state.found.insert(name.to_string());
    }
}

/// Concurrent flood-fill crawler over the tile coordinate space.
///
/// Seed it with coordinates known to exist (and any placeholder anchors),
/// then [`wait`](Crawler::wait) for quiescence before reading results.
#[derive(Clone)]
pub struct Crawler {
    shared: Arc<Shared>,
}

impl Crawler {
    /// Create a crawler with the given options.
    ///
    /// # Panics
    ///
    /// Panics if `max_in_flight` is 0.
    pub fn new(options: CrawlOptions) -> Self {
        assert!(options.max_in_flight > 0, "max_in_flight must be > 0");

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(CrawlState::default()),
                limit: Semaphore::new(options.max_in_flight),
                tracker: TaskTracker::new(),
                options,
            }),
        }
    }

    /// Schedule a coordinate for discovery.
    ///
    /// Seeds follow the same path as coordinates reached by expansion, so
    /// seeding something the crawl would find anyway is harmless. Seeding a
    /// coordinate known *not* to exist is legitimate too: it lands in Tried
    /// without Found, which the renderer turns into a placeholder reference.
    pub fn seed(&self, coord: TileCoord) {
        self.shared
            .tracker
            .spawn(visit(Arc::clone(&self.shared), coord));
    }

    /// Block until all scheduled work and all transitively expanded work has
    /// completed. Children are registered with the tracker before their
    /// parent task returns, so this cannot return while live work remains.
    pub async fn wait(&self) {
        self.shared.tracker.close();
        self.shared.tracker.wait().await;
    }

    /// Whether the tile was confirmed to exist. Meaningful after [`wait`](Crawler::wait).
    pub fn is_found(&self, name: &str) -> bool {
        let state = self.shared.state.lock().expect("crawl state poisoned");
        state.found.contains(name)
    }

    /// Whether the engine began work on the tile. Meaningful after [`wait`](Crawler::wait).
    pub fn is_tried(&self, name: &str) -> bool {
        let state = self.shared.state.lock().expect("crawl state poisoned");
        state.tried.contains(name)
    }

    /// Current counters, safe to poll from a background reporter.
    pub fn stats(&self) -> CrawlStats {
        let state = self.shared.state.lock().expect("crawl state poisoned");
        CrawlStats {
            found: state.found.len(),
            tried: state.tried.len(),
            in_flight: self.shared.tracker.len(),
        }
    }

    /// Owned snapshot of the Tried and Found sets.
    pub fn report(&self) -> CrawlReport {
        let state = self.shared.state.lock().expect("crawl state poisoned");
        CrawlReport {
            tried: state.tried.clone(),
            found: state.found.clone(),
        }
    }
}

/// One coordinate visit. Boxed so visits can recursively schedule visits.
fn visit(shared: Arc<Shared>, coord: TileCoord) -> BoxFuture<'static, ()> {
    async move {
        let image = coord.name();

        if !shared.begin(&image) {
            trace!("already tried {image}");
            return;
        }

        let path = shared.options.output_dir.join(&image);

        // A non-empty file from a previous run counts as found without any
        // network I/O. Empty files are partial leftovers and get refetched.
        let cached = matches!(tokio::fs::metadata(&path).await, Ok(md) if md.len() > 0);

        if cached {
            info!("Existing {image}...");
        } else if shared.options.local_only {
            return;
        } else {
            match fetch_tile(&shared, &image, &path).await {
                Ok(()) => {}
                Err(Error::TileMissing(_)) => {
                    debug!("fetch({image:?}): 404 Not Found");
                    return;
                }
                Err(e) => {
                    warn!("fetch({image:?}): {e}");
                    return;
                }
            }
        }

        shared.mark_found(&image);

        // Expansion happens only from confirmed tiles, and every neighbor is
        // registered with the tracker before this task completes.
        for neighbor in coord.neighbors() {
            trace!("{image}: considering {neighbor}");
            shared
                .tracker
                .spawn(visit(Arc::clone(&shared), neighbor));
        }
    }
    .boxed()
}

/// Download a single tile to `path`.
///
/// Holds a limiter permit for the duration of the request and body streaming;
/// the permit is released before the caller marks the tile found.
async fn fetch_tile(shared: &Shared, image: &str, path: &Path) -> Result<()> {
    let _permit = shared
        .limit
        .acquire()
        .await
        .expect("semaphore closed unexpectedly");

    let url = shared.options.source.tile_url(image);
    let response = GLOBAL_CLIENT.get(&url).send().await?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(Error::TileMissing(image.to_string()));
    }
    if !status.is_success() {
        return Err(Error::HttpError(format!("GET {url}: {status}")));
    }

    info!("Fetched {image}...");

    let mut file = tokio::fs::File::create(path).await?;
    let mut body = tile_stream(response);
    tokio::io::copy(&mut body, &mut file).await?;
    file.flush().await?;

    Ok(())
}

/// Adapts a response body into an AsyncRead for streaming to disk
fn tile_stream(response: reqwest::Response) -> impl AsyncRead + Unpin {
    StreamReader::new(
        response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coord::{EastWest::*, NorthSouth::*};
    use std::collections::HashMap;
    use tempfile::tempdir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nnot-a-real-png";

    async fn tile_server(tiles: &[&str]) -> MockServer {
        let server = MockServer::start().await;
        for tile in tiles {
            Mock::given(method("GET"))
                .and(path(format!("/clickdrag/{tile}")))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(FAKE_PNG))
                .mount(&server)
                .await;
        }
        server
    }

    fn options_for(server: &MockServer, dir: &Path) -> CrawlOptions {
        CrawlOptions {
            output_dir: dir.to_path_buf(),
            local_only: false,
            max_in_flight: 10,
            source: TileSource::with_base_url(format!("{}/clickdrag", server.uri())),
        }
    }

    async fn request_counts(server: &MockServer) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for request in server.received_requests().await.unwrap_or_default() {
            *counts.entry(request.url.path().to_string()).or_insert(0) += 1;
        }
        counts
    }

    #[tokio::test]
    async fn test_isolated_seed() {
        let server = tile_server(&["1n1e.png"]).await;
        let dir = tempdir().unwrap();

        let crawler = Crawler::new(options_for(&server, dir.path()));
        crawler.seed(TileCoord::new(1, North, 1, East));
        crawler.wait().await;

        let report = crawler.report();
        assert_eq!(report.found.len(), 1);
        assert!(report.found.contains("1n1e.png"));

        // Seed plus the 8 in-quadrant neighbors of (1,n,1,e)
        assert_eq!(report.tried.len(), 9);
        for m in 1..=3u32 {
            for n in 1..=3u32 {
                assert!(report.tried.contains(&format!("{m}n{n}e.png")));
            }
        }

        // Exactly one GET per tried name
        let counts = request_counts(&server).await;
        assert_eq!(counts.len(), 9);
        assert!(counts.values().all(|&c| c == 1));
    }

    #[tokio::test]
    async fn test_linear_chain_jumps_single_gaps() {
        let server = tile_server(&[
            "1n1e.png", "1n2e.png", "1n3e.png", "1n4e.png", "1n5e.png",
        ])
        .await;
        let dir = tempdir().unwrap();

        let crawler = Crawler::new(options_for(&server, dir.path()));
        crawler.seed(TileCoord::new(1, North, 1, East));
        crawler.wait().await;

        let report = crawler.report();
        for n in 1..=5u32 {
            assert!(report.found.contains(&format!("1n{n}e.png")));
        }
        assert_eq!(report.found.len(), 5);

        // The +2 offset from 1n5e probes 1n6e and 1n7e, which do not exist;
        // nothing found reaches 1n8e.
        assert!(report.tried.contains("1n6e.png"));
        assert!(report.tried.contains("1n7e.png"));
        assert!(!report.found.contains("1n6e.png"));
        assert!(!report.found.contains("1n7e.png"));
        assert!(!report.tried.contains("1n8e.png"));

        // Rows m=1..3 over columns n=1..7 were all probed
        assert_eq!(report.tried.len(), 21);
    }

    #[tokio::test]
    async fn test_dedup_under_converging_seeds() {
        let server = tile_server(&["1n1e.png", "1n3e.png"]).await;
        let dir = tempdir().unwrap();

        let crawler = Crawler::new(options_for(&server, dir.path()));
        crawler.seed(TileCoord::new(1, North, 1, East));
        crawler.seed(TileCoord::new(1, North, 3, East));
        crawler.wait().await;

        // Both seeds reach each other's neighborhoods; no tile may be fetched
        // twice regardless.
        let counts = request_counts(&server).await;
        for (url_path, count) in &counts {
            assert_eq!(*count, 1, "{url_path} fetched {count} times");
        }
    }

    #[tokio::test]
    async fn test_local_only_uses_cache_without_network() {
        let server = tile_server(&["1n1e.png", "1n2e.png"]).await;
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("1n1e.png"), FAKE_PNG).unwrap();
        std::fs::write(dir.path().join("1n2e.png"), FAKE_PNG).unwrap();

        let mut options = options_for(&server, dir.path());
        options.local_only = true;

        let crawler = Crawler::new(options);
        crawler.seed(TileCoord::new(1, North, 1, East));
        crawler.wait().await;

        let report = crawler.report();
        assert_eq!(report.found.len(), 2);
        assert!(report.found.contains("1n1e.png"));
        assert!(report.found.contains("1n2e.png"));

        let requests = server.received_requests().await.unwrap_or_default();
        assert!(requests.is_empty(), "local-only run touched the network");
    }

    #[tokio::test]
    async fn test_second_run_does_not_refetch_cached_tiles() {
        let server = tile_server(&["1n1e.png"]).await;
        let dir = tempdir().unwrap();

        let first = Crawler::new(options_for(&server, dir.path()));
        first.seed(TileCoord::new(1, North, 1, East));
        first.wait().await;
        let first_report = first.report();

        let second = Crawler::new(options_for(&server, dir.path()));
        second.seed(TileCoord::new(1, North, 1, East));
        second.wait().await;
        let second_report = second.report();

        // Same server state produces the same sets
        assert_eq!(first_report.tried, second_report.tried);
        assert_eq!(first_report.found, second_report.found);

        // The tile landed on disk in run one, so run two never refetches it.
        // The 404-probed neighbors leave nothing behind and are probed again.
        let counts = request_counts(&server).await;
        assert_eq!(counts.get("/clickdrag/1n1e.png"), Some(&1));
        assert_eq!(counts.get("/clickdrag/2n2e.png"), Some(&2));
    }

    #[tokio::test]
    async fn test_found_tiles_are_nonempty_files() {
        let server = tile_server(&["3s7e.png", "3s8e.png"]).await;
        let dir = tempdir().unwrap();

        let crawler = Crawler::new(options_for(&server, dir.path()));
        crawler.seed(TileCoord::new(3, South, 7, East));
        crawler.wait().await;

        let report = crawler.report();
        for name in &report.found {
            let md = std::fs::metadata(dir.path().join(name)).unwrap();
            assert!(md.len() > 0, "{name} is empty on disk");
        }
    }

    #[tokio::test]
    async fn test_found_subset_of_tried_and_quadrant_invariant() {
        let server = tile_server(&["15s1w.png", "14s2w.png"]).await;
        let dir = tempdir().unwrap();

        let crawler = Crawler::new(options_for(&server, dir.path()));
        crawler.seed(TileCoord::new(15, South, 1, West));
        crawler.wait().await;

        let report = crawler.report();
        assert!(report.found.is_subset(&report.tried));

        // Expansion never crosses quadrants: every tried name carries the
        // seed's direction labels.
        for name in &report.tried {
            assert!(name.contains('s') && name.ends_with("w.png"), "{name}");
        }

        assert!(crawler.is_found("15s1w.png"));
        assert!(crawler.is_tried("15s3w.png"));
        assert!(!crawler.is_found("15s3w.png"));
    }

    #[tokio::test]
    async fn test_nonexistent_seed_lands_in_tried_only() {
        let server = tile_server(&[]).await;
        let dir = tempdir().unwrap();

        let crawler = Crawler::new(options_for(&server, dir.path()));
        crawler.seed(TileCoord::placeholder(North, East));
        crawler.wait().await;

        let report = crawler.report();
        assert_eq!(report.tried.len(), 1);
        assert!(report.tried.contains("11n11e.png"));
        assert!(report.found.is_empty());
    }

    #[tokio::test]
    async fn test_single_permit_still_terminates() {
        let server = tile_server(&["1n1e.png", "2n2e.png"]).await;
        let dir = tempdir().unwrap();

        let mut options = options_for(&server, dir.path());
        options.max_in_flight = 1;

        let crawler = Crawler::new(options);
        crawler.seed(TileCoord::new(1, North, 1, East));
        crawler.wait().await;

        let report = crawler.report();
        assert_eq!(report.found.len(), 2);
    }

    #[test]
    #[should_panic(expected = "max_in_flight must be > 0")]
    fn test_zero_permits_panics() {
        Crawler::new(CrawlOptions {
            max_in_flight: 0,
            ..CrawlOptions::default()
        });
    }
}
