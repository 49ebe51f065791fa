use crate::config::SitemapConfig;
use crate::crawlers::ScanEvent;
use crate::crawlers::crawler::Crawler;
use crate::crawlers::filesystem::{self, FilesystemCrawler};
use crate::dedup::DedupTracker;
use crate::error::{Result, SitemapError};
use crate::filter::{PageFilter, PartNamePattern};
use crate::reclaim;
use crate::results::RunSummary;
use crate::writers::{PartWriter, write_index};
use chrono::Utc;
use std::fs;
use std::path::Path;

/// Main builder for a sitemap run
pub struct Sitemap {
    config: SitemapConfig,
}

impl Sitemap {
    /// Create a new Sitemap builder for a site
    pub fn new(site_base_url: &str, site_root: impl AsRef<Path>) -> Self {
        Self {
            config: SitemapConfig::new(site_base_url, site_root.as_ref()),
        }
    }

    /// Create a builder from a complete configuration
    pub fn from_config(config: SitemapConfig) -> Self {
        Self { config }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: SitemapConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let config = SitemapConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Set the maximum number of pages per part
    pub fn with_split_limit(mut self, split_limit: usize) -> Self {
        self.config.split_limit = split_limit;
        self
    }

    /// Set the part file name prefix
    pub fn with_part_prefix(mut self, prefix: &str) -> Self {
        self.config.part_prefix = prefix.to_string();
        self
    }

    /// Set the index file path
    pub fn with_output(mut self, output: impl AsRef<Path>) -> Self {
        self.config.output = output.as_ref().to_path_buf();
        self
    }

    /// Set or clear the `xml-stylesheet` href
    pub fn with_stylesheet_href(mut self, href: Option<&str>) -> Self {
        self.config.stylesheet_href = href.map(str::to_string);
        self
    }

    /// Scan the site, write every part and the index, then reclaim stale parts.
    ///
    /// The index is only written after all parts are finalized. Unreadable pages
    /// are skipped and counted; write failures abort the run.
    pub async fn generate(self) -> Result<RunSummary> {
        let config = self.config;
        config.validate()?;

        let crawler = FilesystemCrawler::new(
            &config.site_root,
            config.base_url()?,
            PageFilter::from_config(&config)?,
        );
        run(config, crawler).await
    }
}

/// Drive one run over any page source
pub(crate) async fn run<C>(config: SitemapConfig, crawler: C) -> Result<RunSummary>
where
    C: Crawler + Send + 'static,
{
    config.validate()?;

    let sitemap_base_url = config.sitemap_base_url()?;
    let output_dir = config.output_dir();
    let index_filename = config.index_filename();

    if PartNamePattern::new(&config.part_prefix)?.matches(&index_filename) {
        return Err(SitemapError::InvalidConfig(format!(
            "index file name {} collides with the part naming pattern",
            index_filename
        )));
    }

    fs::create_dir_all(&output_dir).map_err(|source| SitemapError::FileWrite {
        path: output_dir.clone(),
        source,
    })?;

    ::log::info!(
        "Generating sitemap for {} from {}",
        config.site_base_url,
        config.site_root.display()
    );

    let (mut rx, scan) = filesystem::start(crawler, config.channel_capacity);

    let mut dedup = DedupTracker::new();
    let mut writer = PartWriter::new(
        &output_dir,
        &config.part_prefix,
        config.split_limit,
        config.stylesheet_href.clone(),
    );
    let mut pages_written = 0;
    let mut pages_skipped = 0;

    while let Some(event) = rx.recv().await {
        match event {
            ScanEvent::Page(record) => {
                writer.write_page(&record, &mut dedup)?;
                pages_written += 1;
            }
            ScanEvent::Skipped { path, error } => {
                ::log::warn!("Skipping {}: {}", path.display(), error);
                pages_skipped += 1;
            }
        }
    }

    // The channel also closes when the scanner panics
    if let Err(e) = scan.await {
        ::log::error!("Page scan did not complete: {}", e);
        return Err(SitemapError::ScanAborted(e.to_string()));
    }

    let parts = writer.finish()?;

    let index_path = output_dir.join(&index_filename);
    write_index(
        &index_path,
        &parts,
        &sitemap_base_url,
        config.stylesheet_href.as_deref(),
        Utc::now(),
    )?;
    let index_url = sitemap_base_url
        .join(&index_filename)
        .map(String::from)
        .unwrap_or_else(|_| index_filename.clone());

    let cleanup = reclaim::reclaim_stale_parts(&output_dir, &config.part_prefix, &parts)?;

    ::log::info!(
        "Sitemap complete - {} pages in {} parts ({} skipped)",
        pages_written,
        parts.len(),
        pages_skipped
    );

    Ok(RunSummary {
        parts,
        index_path,
        index_url,
        files_scanned: pages_written + pages_skipped,
        pages_written,
        pages_skipped,
        unique_images: dedup.unique_images(),
        unique_videos: dedup.unique_videos(),
        cleanup,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::PageRecord;
    use std::collections::BTreeSet;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Scripted page source for exercising the driver without a filesystem walk
    enum Step {
        Page(&'static str),
        Skip(&'static str),
        Panic,
    }

    struct ScriptedCrawler {
        steps: Vec<Step>,
    }

    impl Crawler for ScriptedCrawler {
        fn crawl(&self, emit: &mut dyn FnMut(ScanEvent) -> bool) {
            for step in &self.steps {
                let event = match step {
                    Step::Page(url) => ScanEvent::Page(PageRecord::new(
                        url.to_string(),
                        "2024-01-01T00:00:00+00:00".to_string(),
                        BTreeSet::from([format!("{}.jpg", url)]),
                        Vec::new(),
                    )),
                    Step::Skip(path) => ScanEvent::Skipped {
                        path: PathBuf::from(path),
                        error: SitemapError::FileRead {
                            path: PathBuf::from(path),
                            source: std::io::Error::other("unreadable"),
                        },
                    },
                    Step::Panic => panic!("scanner failed"),
                };
                if !emit(event) {
                    return;
                }
            }
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn read(path: PathBuf) -> String {
        fs::read_to_string(path).unwrap()
    }

    /// Split a part document into its `<url>` blocks
    fn url_blocks(xml: &str) -> Vec<&str> {
        xml.split("<url>").skip(1).collect()
    }

    #[tokio::test]
    async fn test_first_page_owns_shared_image() {
        let site = TempDir::new().unwrap();
        write(site.path(), "a.html", r#"<img src="x.jpg">"#);
        write(site.path(), "sub/b.html", r#"<img src="/x.jpg"><img src="y.jpg">"#);

        let summary = Sitemap::new("https://example.com", site.path())
            .generate()
            .await
            .unwrap();

        assert_eq!(summary.parts.len(), 1);
        assert_eq!(summary.pages_written, 2);
        assert_eq!(summary.unique_images, 2);

        let xml = read(site.path().join("sitemap-1.xml"));
        let blocks = url_blocks(&xml);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].contains("<loc>https://example.com/a.html</loc>"));
        assert!(blocks[0].contains("<image:loc>https://example.com/x.jpg</image:loc>"));
        assert!(blocks[1].contains("<loc>https://example.com/sub/b.html</loc>"));
        assert!(!blocks[1].contains("https://example.com/x.jpg"));
        assert!(blocks[1].contains("<image:loc>https://example.com/sub/y.jpg</image:loc>"));
    }

    #[tokio::test]
    async fn test_parts_split_at_capacity() {
        let site = TempDir::new().unwrap();
        for i in 0..2500 {
            write(site.path(), &format!("p{:04}.html", i), "<p>page</p>");
        }

        let summary = Sitemap::new("https://example.com", site.path())
            .generate()
            .await
            .unwrap();

        let sizes: Vec<usize> = summary.parts.iter().map(|p| p.page_count).collect();
        assert_eq!(sizes, vec![1000, 1000, 500]);
        for (i, part) in summary.parts.iter().enumerate() {
            assert_eq!(part.sequence_number, i + 1);
            let xml = read(site.path().join(&part.filename));
            assert_eq!(url_blocks(&xml).len(), part.page_count);
        }

        let index = read(summary.index_path.clone());
        assert_eq!(index.matches("<sitemap>").count(), 3);
        let one = index.find("https://example.com/sitemap-1.xml").unwrap();
        let two = index.find("https://example.com/sitemap-2.xml").unwrap();
        let three = index.find("https://example.com/sitemap-3.xml").unwrap();
        assert!(one < two && two < three);
        assert_eq!(summary.index_url, "https://example.com/sitemap_index.xml");
    }

    #[tokio::test]
    async fn test_media_unique_across_parts() {
        let site = TempDir::new().unwrap();
        for i in 0..5 {
            write(
                site.path(),
                &format!("page{}.html", i),
                r#"<img src="/logo.png"><video src="/intro.mp4" title="Intro"></video>"#,
            );
        }

        let summary = Sitemap::new("https://example.com", site.path())
            .with_split_limit(2)
            .generate()
            .await
            .unwrap();
        assert_eq!(summary.parts.len(), 3);

        let combined: String = summary
            .parts
            .iter()
            .map(|p| read(site.path().join(&p.filename)))
            .collect();
        assert_eq!(combined.matches("https://example.com/logo.png").count(), 1);
        assert_eq!(combined.matches("https://example.com/intro.mp4").count(), 1);
        assert_eq!(summary.unique_images, 1);
        assert_eq!(summary.unique_videos, 1);
    }

    #[tokio::test]
    async fn test_rerun_is_byte_identical() {
        let site = TempDir::new().unwrap();
        write(site.path(), "index.html", r#"<img src="b.jpg"><img src="a.jpg">"#);
        write(site.path(), "docs/guide.html", r#"<video><source src="g.webm"></video>"#);

        let first = Sitemap::new("https://example.com", site.path())
            .generate()
            .await
            .unwrap();
        let before = read(site.path().join(&first.parts[0].filename));

        let second = Sitemap::new("https://example.com", site.path())
            .generate()
            .await
            .unwrap();
        let after = read(site.path().join(&second.parts[0].filename));

        assert_eq!(before, after);
        assert!(second.cleanup.removed.is_empty());
    }

    #[tokio::test]
    async fn test_rerun_reclaims_stale_parts() {
        let site = TempDir::new().unwrap();
        for i in 0..6 {
            write(site.path(), &format!("p{}.html", i), "<p>page</p>");
        }
        write(site.path(), "sitemap-style.xml", "<xsl/>");

        let first = Sitemap::new("https://example.com", site.path())
            .with_split_limit(2)
            .generate()
            .await
            .unwrap();
        assert_eq!(first.parts.len(), 3);

        let second = Sitemap::new("https://example.com", site.path())
            .with_split_limit(4)
            .generate()
            .await
            .unwrap();
        assert_eq!(second.parts.len(), 2);

        assert_eq!(second.cleanup.removed, vec![site.path().join("sitemap-3.xml")]);
        assert!(site.path().join("sitemap-1.xml").exists());
        assert!(site.path().join("sitemap-2.xml").exists());
        assert!(!site.path().join("sitemap-3.xml").exists());
        assert!(site.path().join("sitemap-style.xml").exists());

        let index = read(second.index_path);
        assert!(!index.contains("sitemap-3.xml"));
    }

    #[tokio::test]
    async fn test_separate_output_dir_and_prefix() {
        let site = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(site.path(), "a.htm", "<p>a</p>");
        write(site.path(), "readme.txt", "not a page");

        let summary = Sitemap::new("https://example.com/docs/", site.path())
            .with_output(out.path().join("maps.xml"))
            .with_part_prefix("docs")
            .with_stylesheet_href(None)
            .generate()
            .await
            .unwrap();

        assert_eq!(summary.files_scanned, 1);
        assert_eq!(summary.index_path, out.path().join("maps.xml"));
        assert_eq!(summary.index_url, "https://example.com/maps.xml");
        let part = read(out.path().join("docs-1.xml"));
        assert!(part.contains("<loc>https://example.com/docs/a.htm</loc>"));
        assert!(!part.contains("xml-stylesheet"));
        assert!(!site.path().join("docs-1.xml").exists());
    }

    #[tokio::test]
    async fn test_empty_site_writes_empty_index() {
        let site = TempDir::new().unwrap();
        write(site.path(), "sitemap-1.xml", "<urlset/>");

        let summary = Sitemap::new("https://example.com", site.path())
            .generate()
            .await
            .unwrap();

        assert!(summary.parts.is_empty());
        assert!(summary.index_path.exists());
        assert_eq!(summary.cleanup.removed, vec![site.path().join("sitemap-1.xml")]);
    }

    #[tokio::test]
    async fn test_invalid_split_limit_is_rejected() {
        let site = TempDir::new().unwrap();
        let result = Sitemap::new("https://example.com", site.path())
            .with_split_limit(0)
            .generate()
            .await;
        assert!(matches!(result, Err(SitemapError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_index_name_colliding_with_parts_is_rejected() {
        let site = TempDir::new().unwrap();
        let result = Sitemap::new("https://example.com", site.path())
            .with_output("sitemap-1.xml")
            .generate()
            .await;
        assert!(matches!(result, Err(SitemapError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_skipped_files_are_counted_and_run_continues() {
        let site = TempDir::new().unwrap();
        let crawler = ScriptedCrawler {
            steps: vec![
                Step::Page("https://example.com/a.html"),
                Step::Skip("broken.html"),
                Step::Page("https://example.com/b.html"),
            ],
        };

        let config = SitemapConfig::new("https://example.com", site.path());
        let summary = run(config, crawler).await.unwrap();

        assert_eq!(summary.pages_written, 2);
        assert_eq!(summary.pages_skipped, 1);
        assert_eq!(summary.files_scanned, 3);
        assert_eq!(summary.unique_images, 2);

        let xml = read(site.path().join("sitemap-1.xml"));
        assert!(xml.contains("<loc>https://example.com/a.html</loc>"));
        assert!(xml.contains("<loc>https://example.com/b.html</loc>"));
        assert!(!xml.contains("broken.html"));
    }

    #[tokio::test]
    async fn test_panicking_scanner_fails_without_touching_index_or_parts() {
        let site = TempDir::new().unwrap();
        write(site.path(), "sitemap-1.xml", "<urlset>previous 1</urlset>");
        write(site.path(), "sitemap-2.xml", "<urlset>previous 2</urlset>");
        write(site.path(), "sitemap_index.xml", "<sitemapindex>previous</sitemapindex>");

        let crawler = ScriptedCrawler {
            steps: vec![Step::Page("https://example.com/a.html"), Step::Panic],
        };
        let config = SitemapConfig::new("https://example.com", site.path());
        let result = run(config, crawler).await;

        assert!(matches!(result, Err(SitemapError::ScanAborted(_))));
        assert_eq!(read(site.path().join("sitemap-1.xml")), "<urlset>previous 1</urlset>");
        assert_eq!(read(site.path().join("sitemap-2.xml")), "<urlset>previous 2</urlset>");
        assert_eq!(
            read(site.path().join("sitemap_index.xml")),
            "<sitemapindex>previous</sitemapindex>"
        );
        assert!(!site.path().join("sitemap-1.xml.tmp").exists());
    }
}
