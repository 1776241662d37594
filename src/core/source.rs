//! Tile source resolution for tilecrawl.
//!
//! Maps canonical tile names to the URLs they are served from. The base URL
//! is configurable so tests and mirrors can point the engine elsewhere.

/// Configuration for the tile server
#[derive(Debug, Clone, PartialEq)]
pub struct TileSource {
    /// Base URL the tile names are appended to, without a trailing slash
    pub base_url: String,
}

impl Default for TileSource {
    fn default() -> Self {
        Self {
            base_url: "http://imgs.xkcd.com/clickdrag".to_string(),
        }
    }
}

impl TileSource {
    /// Create a source rooted at a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Resolves a canonical tile name to its download URL
    pub fn tile_url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }
}
