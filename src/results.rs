use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::error::SitemapError;

/// A video embedded in a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef {
    /// Absolute URL of the video file
    pub content_url: String,

    /// Title from `title` / `data-title`, or "Untitled"
    pub title: String,

    /// Description from `description` / `data-description`, or the title
    pub description: String,
}

/// One discovered HTML page and the media it references
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    /// Absolute URL of the page
    pub url: String,

    /// Last modification time, ISO-8601 with offset, whole seconds
    pub last_modified: String,

    /// Absolute image URLs. The ordered set gives lexicographic emission order.
    pub images: BTreeSet<String>,

    /// Videos in document order
    pub videos: Vec<VideoRef>,
}

impl PageRecord {
    /// Create a new page record instance
    pub fn new(
        url: String,
        last_modified: String,
        images: BTreeSet<String>,
        videos: Vec<VideoRef>,
    ) -> Self {
        Self {
            url,
            last_modified,
            images,
            videos,
        }
    }
}

/// A finalized sitemap part file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// 1-based, contiguous
    pub sequence_number: usize,

    /// File name inside the output directory, e.g. `sitemap-3.xml`
    pub filename: String,

    /// Number of `url` entries written
    pub page_count: usize,
}

/// Outcome of reclaiming stale part files
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Files that were deleted
    pub removed: Vec<PathBuf>,

    /// Files that matched but could not be deleted
    pub failures: Vec<SitemapError>,
}

/// Final counts of a sitemap run
#[derive(Debug)]
pub struct RunSummary {
    pub parts: Vec<Part>,
    pub index_path: PathBuf,
    /// URL to submit to search engines
    pub index_url: String,
    pub files_scanned: usize,
    pub pages_written: usize,
    pub pages_skipped: usize,
    pub unique_images: usize,
    pub unique_videos: usize,
    pub cleanup: CleanupReport,
}
