use chrono::{DateTime, SecondsFormat, Utc};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use url::Url;

/// Format a timestamp as ISO-8601 with a UTC offset, truncated to whole seconds
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Format a filesystem modification time for `lastmod`
pub fn format_system_time(time: SystemTime) -> String {
    format_timestamp(DateTime::<Utc>::from(time))
}

/// Join the normal components of a relative path with forward slashes
pub fn to_posix_path(rel_path: &Path) -> String {
    rel_path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Build the page URL for a path relative to the site root.
///
/// Each path component becomes one URL segment, so characters such as `#`
/// or `?` in file names are percent-encoded instead of being interpreted.
pub fn page_url(base_url: &Url, rel_path: &Path) -> Option<Url> {
    let mut url = base_url.clone();
    {
        let mut segments = url.path_segments_mut().ok()?;
        segments.pop_if_empty();
        for component in rel_path.components() {
            if let Component::Normal(part) = component {
                segments.push(&part.to_string_lossy());
            }
        }
    }
    Some(url)
}

/// Read a file as text, replacing invalid UTF-8 sequences
pub fn read_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Copy an XSL stylesheet next to the generated sitemap files
pub fn copy_stylesheet(source: &Path, output_dir: &Path, file_name: &str) -> io::Result<PathBuf> {
    let destination = output_dir.join(file_name);
    fs::copy(source, &destination)?;
    Ok(destination)
}
