//! CLI-specific progress handling for tilecrawl
//!
//! The crawl has no knowable total, so progress is a spinner carrying the
//! live found/tried/pending counters rather than a byte bar.

use indicatif::{ProgressBar, ProgressStyle};
use tilecrawl::CrawlStats;

/// Creates the crawl status spinner
pub fn create_status_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .expect("Failed to create progress style"),
    );
    pb
}

/// Progress manager driving the status spinner from crawl counters
pub struct ProgressManager {
    pub pb: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(message: &str) -> Self {
        let pb = create_status_spinner();
        pb.set_message(message.to_string());
        Self { pb }
    }

    /// Refresh the spinner with the latest counters
    pub fn update(&self, stats: CrawlStats) {
        self.pb.set_message(format!(
            "{} downloaded / {} attempted / {} pending",
            stats.found, stats.tried, stats.in_flight
        ));
        self.pb.tick();
    }

    /// Stop the spinner, leaving the final counts on screen
    pub fn finish(&self, stats: CrawlStats) {
        self.pb.finish_with_message(format!(
            "✅ {} tiles downloaded, {} attempted",
            stats.found, stats.tried
        ));
    }
}
