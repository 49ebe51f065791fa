pub mod html;


use crate::results::VideoRef;
use std::collections::BTreeSet;
use std::path::Path;
use url::Url;

/// Extensions of video files that get a `video:video` entry
pub const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "webm", "mov", "wmv"];

/// Title used when a video element carries none
pub const UNTITLED_VIDEO: &str = "Untitled";

/// Media references found in one page
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MediaSet {
    /// Absolute image URLs, deduplicated and sorted
    pub images: BTreeSet<String>,
    /// Videos in document order
    pub videos: Vec<VideoRef>,
}

/// Determines whether a resolved media URL points at a recognized video file.
///
/// Only the path is inspected, so query strings and fragments are ignored.
pub fn is_video_url(url: &Url) -> bool {
    Path::new(url.path())
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Resolve a possibly-relative reference against the page URL
pub fn resolve(page_url: &Url, reference: &str) -> Option<Url> {
    match page_url.join(reference) {
        Ok(url) => Some(url),
        Err(e) => {
            ::log::debug!(
                "Skipping unresolvable reference {:?} on {}: {}",
                reference,
                page_url,
                e
            );
            None
        }
    }
}

/// Main parser entry point
pub struct Parser;

impl Parser {
    /// Extract the media of an HTML page served at `page_url`
    pub fn parse(content: &str, page_url: &Url) -> MediaSet {
        html::parse(content, page_url)
    }
}
