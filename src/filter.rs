use regex::Regex;
use std::path::Path;

use crate::config::SitemapConfig;
use crate::error::Result;

/// File suffixes treated as HTML pages (matched case-insensitively)
pub const HTML_EXTENSIONS: [&str; 2] = ["htm", "html"];

/// Decides which files under the site root become sitemap pages
#[derive(Debug, Default)]
pub struct PageFilter {
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl PageFilter {
    /// Compile the include/exclude patterns of a configuration
    pub fn new(include_patterns: &[String], exclude_patterns: &[String]) -> Result<Self> {
        let mut include_regexes = Vec::with_capacity(include_patterns.len());
        for pattern in include_patterns {
            include_regexes.push(Regex::new(pattern)?);
        }

        let mut exclude_regexes = Vec::with_capacity(exclude_patterns.len());
        for pattern in exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            include_regexes,
            exclude_regexes,
        })
    }

    pub fn from_config(config: &SitemapConfig) -> Result<Self> {
        Self::new(&config.include_patterns, &config.exclude_patterns)
    }

    /// Whether the path has an HTML suffix
    pub fn is_html(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                HTML_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false)
    }

    /// Determine if a file belongs in the sitemap.
    ///
    /// `rel_path` is the forward-slash path relative to the site root.
    pub fn should_include(&self, path: &Path, rel_path: &str) -> bool {
        if !Self::is_html(path) {
            return false;
        }

        // Exclusions take precedence
        if self.exclude_regexes.iter().any(|re| re.is_match(rel_path)) {
            ::log::trace!("Excluded by pattern: {}", rel_path);
            return false;
        }

        if !self.include_regexes.is_empty()
            && !self.include_regexes.iter().any(|re| re.is_match(rel_path))
        {
            ::log::trace!("Not matched by any include pattern: {}", rel_path);
            return false;
        }

        true
    }
}

/// Matches generated part file names of the form `<prefix>-<n>.xml`
#[derive(Debug)]
pub struct PartNamePattern {
    regex: Regex,
}

impl PartNamePattern {
    pub fn new(prefix: &str) -> Result<Self> {
        let regex = Regex::new(&format!(r"^{}-[1-9][0-9]*\.xml$", regex::escape(prefix)))?;
        Ok(Self { regex })
    }

    pub fn matches(&self, filename: &str) -> bool {
        self.regex.is_match(filename)
    }
}
