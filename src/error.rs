use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while assembling a sitemap
#[derive(Error, Debug)]
pub enum SitemapError {
    /// A page could not be read. The page is skipped.
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A part or index file could not be written. Fatal for the run.
    #[error("Failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stale part file could not be deleted
    #[error("Failed to delete {path}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The page scan ended abnormally, so the page set is incomplete
    #[error("Page scan aborted: {0}")]
    ScanAborted(String),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid path pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SitemapError>;
