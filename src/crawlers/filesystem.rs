use crate::crawlers::ScanEvent;
use crate::crawlers::crawler::Crawler;
use crate::error::{Result, SitemapError};
use crate::filter::PageFilter;
use crate::parsers::Parser;
use crate::results::PageRecord;
use crate::utils;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;
use walkdir::WalkDir;

/// Scans a directory tree of static HTML pages
#[derive(Debug)]
pub struct FilesystemCrawler {
    root: PathBuf,
    base_url: Url,
    filter: PageFilter,
}

impl FilesystemCrawler {
    /// `base_url` must end with a slash; see [`crate::config::SitemapConfig::base_url`]
    pub fn new(root: impl Into<PathBuf>, base_url: Url, filter: PageFilter) -> Self {
        Self {
            root: root.into(),
            base_url,
            filter,
        }
    }

    /// Lazily lists the HTML files under the root in walk order.
    ///
    /// Directory entries are sorted by file name so repeated runs see the same order.
    pub fn html_files(&self) -> impl Iterator<Item = Result<PathBuf>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    let path = entry.into_path();
                    let rel = utils::to_posix_path(self.relative(&path));
                    self.filter.should_include(&path, &rel).then_some(Ok(path))
                }
                Ok(entry) if entry.path_is_symlink() => {
                    ::log::debug!("Not following symlink {}", entry.path().display());
                    None
                }
                Ok(_) => None,
                Err(e) => Some(Err(SitemapError::from(e))),
            })
    }

    /// Read one page and extract its media
    pub fn read_page(&self, path: &Path) -> Result<PageRecord> {
        let read_error = |source: std::io::Error| SitemapError::FileRead {
            path: path.to_path_buf(),
            source,
        };

        let rel_path = self.relative(path);
        let page_url = utils::page_url(&self.base_url, rel_path).ok_or_else(|| {
            read_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("cannot build a page URL under {}", self.base_url),
            ))
        })?;

        let modified = fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map_err(read_error)?;
        let content = utils::read_lossy(path).map_err(read_error)?;

        let media = Parser::parse(&content, &page_url);
        Ok(PageRecord::new(
            page_url.into(),
            utils::format_system_time(modified),
            media.images,
            media.videos,
        ))
    }

    fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

impl Crawler for FilesystemCrawler {
    fn crawl(&self, emit: &mut dyn FnMut(ScanEvent) -> bool) {
        for entry in self.html_files() {
            let event = match entry {
                Ok(path) => match self.read_page(&path) {
                    Ok(record) => {
                        ::log::trace!("Scanned {} -> {}", path.display(), record.url);
                        ScanEvent::Page(record)
                    }
                    Err(error) => ScanEvent::Skipped { path, error },
                },
                Err(error) => {
                    let path = match &error {
                        SitemapError::Walk(walk) => walk.path().map(Path::to_path_buf),
                        _ => None,
                    }
                    .unwrap_or_else(|| self.root.clone());
                    ScanEvent::Skipped { path, error }
                }
            };

            if !emit(event) {
                ::log::debug!("Scan receiver closed, stopping walk of {}", self.root.display());
                return;
            }
        }
    }
}

/// Run a crawler on the blocking pool, streaming its events through a bounded channel.
///
/// Must be called from within a tokio runtime. Dropping the receiver stops the walk.
/// The returned handle resolves once the crawler returns and must be checked: a
/// panicking crawler closes the channel just like a finished one.
pub fn start<C>(crawler: C, capacity: usize) -> (mpsc::Receiver<ScanEvent>, JoinHandle<()>)
where
    C: Crawler + Send + 'static,
{
    let (tx, rx) = mpsc::channel(capacity.max(1));

    let handle = tokio::task::spawn_blocking(move || {
        crawler.crawl(&mut |event| tx.blocking_send(event).is_ok());
        ::log::debug!("Page scan finished");
    });

    (rx, handle)
}
