use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{Result, SitemapError};

/// Configuration for a sitemap run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapConfig {
    /// Public URL the site root is served from
    pub site_base_url: String,

    /// Directory holding the site's HTML files
    pub site_root: PathBuf,

    /// Index file path. A bare file name is placed inside `site_root`.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Maximum number of pages per part
    #[serde(default = "default_split_limit")]
    pub split_limit: usize,

    /// Part files are named `<prefix>-<n>.xml`
    #[serde(default = "default_part_prefix")]
    pub part_prefix: String,

    /// `href` of the `xml-stylesheet` instruction, or `None` to omit it
    #[serde(default = "default_stylesheet_href")]
    pub stylesheet_href: Option<String>,

    /// Base for part locations in the index (defaults to the site origin)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sitemap_base_url: Option<String>,

    /// Regex patterns for relative page paths to include
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for relative page paths to exclude (take precedence)
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Page records buffered between the scanner and the writer
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_INDEX_FILENAME)
}

fn default_split_limit() -> usize {
    1000
}

fn default_part_prefix() -> String {
    "sitemap".to_string()
}

fn default_stylesheet_href() -> Option<String> {
    Some("/sitemap-style.xsl".to_string())
}

fn default_channel_capacity() -> usize {
    64
}

pub const DEFAULT_INDEX_FILENAME: &str = "sitemap_index.xml";

impl SitemapConfig {
    /// Create a new configuration with default values
    pub fn new(site_base_url: &str, site_root: impl Into<PathBuf>) -> Self {
        Self {
            site_base_url: site_base_url.to_string(),
            site_root: site_root.into(),
            output: default_output(),
            split_limit: default_split_limit(),
            part_prefix: default_part_prefix(),
            stylesheet_href: default_stylesheet_href(),
            sitemap_base_url: None,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            channel_capacity: default_channel_capacity(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut contents = String::new();
        File::open(path)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .map_err(|source| SitemapError::ConfigFile {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.split_limit == 0 {
            return Err(SitemapError::InvalidConfig(
                "split limit must be at least 1".to_string(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(SitemapError::InvalidConfig(
                "channel capacity must be at least 1".to_string(),
            ));
        }
        if self.part_prefix.is_empty() || self.part_prefix.contains(['/', '\\']) {
            return Err(SitemapError::InvalidConfig(format!(
                "invalid part prefix {:?}",
                self.part_prefix
            )));
        }
        if self.index_filename().is_empty() {
            return Err(SitemapError::InvalidConfig(format!(
                "output {} has no file name",
                self.output.display()
            )));
        }
        self.base_url()?;
        self.sitemap_base_url()?;
        Ok(())
    }

    /// Site base URL with a guaranteed trailing slash, so relative paths join beneath it
    pub fn base_url(&self) -> Result<Url> {
        let normalized = format!("{}/", self.site_base_url.trim_end_matches('/'));
        Url::parse(&normalized).map_err(|source| SitemapError::InvalidBaseUrl {
            url: self.site_base_url.clone(),
            source,
        })
    }

    /// Base that part file names and the index file name are resolved against
    pub fn sitemap_base_url(&self) -> Result<Url> {
        if let Some(explicit) = &self.sitemap_base_url {
            let normalized = format!("{}/", explicit.trim_end_matches('/'));
            return Url::parse(&normalized).map_err(|source| SitemapError::InvalidBaseUrl {
                url: explicit.clone(),
                source,
            });
        }

        let base = self.base_url()?;
        let origin = base.origin();
        if !origin.is_tuple() {
            return Ok(base);
        }
        let root = format!("{}/", origin.ascii_serialization());
        Url::parse(&root).map_err(|source| SitemapError::InvalidBaseUrl {
            url: self.site_base_url.clone(),
            source,
        })
    }

    /// Directory where parts and the index are written
    pub fn output_dir(&self) -> PathBuf {
        match self.output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && parent != Path::new(".") => {
                parent.to_path_buf()
            }
            _ => self.site_root.clone(),
        }
    }

    /// File name the copied stylesheet must have for the `xml-stylesheet` href to find it.
    ///
    /// This is the last path segment of the href, or `<prefix>-style.xsl` when no
    /// href is set.
    pub fn stylesheet_file_name(&self) -> String {
        self.stylesheet_href
            .as_deref()
            .map(|href| href.split(['?', '#']).next().unwrap_or(href))
            .and_then(|path| path.rsplit('/').next())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}-style.xsl", self.part_prefix))
    }

    /// File name of the index document
    pub fn index_filename(&self) -> String {
        self.output
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
