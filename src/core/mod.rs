//! Core library modules for tilecrawl
//!
//! This module contains the internal implementation details of the tilecrawl library.

pub mod coord;
pub mod crawler;
pub mod error;
pub mod render;
pub mod source;

// Re-export main types for internal use
pub use crawler::{CrawlOptions, CrawlReport, Crawler};
pub use source::TileSource;
