//! Sitemap generation for directories of static HTML pages.
//!
//! The site root is walked once. Every page is parsed for `img` and `video`
//! references and streamed into numbered `<prefix>-<n>.xml` parts of bounded
//! size, followed by a `sitemap_index.xml` that lists them. A media URL is
//! emitted only under the first page (in walk order) that references it.

// Re-export modules
pub mod config;
pub mod crawlers;
pub mod dedup;
pub mod error;
pub mod filter;
pub mod generator;
pub mod parsers;
pub mod reclaim;
pub mod results;
pub mod utils;
pub mod writers;

// Re-export commonly used types for convenience
pub use config::SitemapConfig;
pub use error::SitemapError;
pub use generator::Sitemap;
pub use results::{CleanupReport, PageRecord, Part, RunSummary, VideoRef};
