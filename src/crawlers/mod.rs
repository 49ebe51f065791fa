pub mod crawler;
pub mod filesystem;

use crate::error::SitemapError;
use crate::results::PageRecord;
use std::path::PathBuf;

/// One outcome of the page scan, in discovery order
#[derive(Debug)]
pub enum ScanEvent {
    /// A page was read and its media extracted
    Page(PageRecord),
    /// A file or directory entry could not be read
    Skipped { path: PathBuf, error: SitemapError },
}
