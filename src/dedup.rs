use std::collections::HashSet;

/// Kind of media a URL is claimed as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// Run-scoped record of media URLs already assigned to a page.
///
/// The first page to claim a URL owns it for the whole run, across every part.
/// Images and videos are tracked independently.
#[derive(Debug, Default)]
pub struct DedupTracker {
    seen_images: HashSet<String>,
    seen_videos: HashSet<String>,
}

impl DedupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time `url` is claimed for `kind`, false afterwards
    pub fn claim(&mut self, url: &str, kind: MediaKind) -> bool {
        let seen = match kind {
            MediaKind::Image => &mut self.seen_images,
            MediaKind::Video => &mut self.seen_videos,
        };
        if seen.contains(url) {
            return false;
        }
        seen.insert(url.to_string())
    }

    pub fn unique_images(&self) -> usize {
        self.seen_images.len()
    }

    pub fn unique_videos(&self) -> usize {
        self.seen_videos.len()
    }
}
