use crate::dedup::{DedupTracker, MediaKind};
use crate::error::{Result, SitemapError};
use crate::results::{PageRecord, Part};
use crate::writers::{
    IMAGE_NS, SITEMAP_NS, VIDEO_NS, write_prolog, write_text_element, xml_writer,
};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const CHANGEFREQ: &str = "weekly";
const PRIORITY: &str = "0.5";

/// Lifecycle of the writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartState {
    /// No part has been opened yet
    Empty,
    /// A part file is open and accepting pages
    Open,
    /// The last part was finalized and no new one is open yet
    Closed,
}

struct ActivePart {
    part: Part,
    /// Final location, only populated by the rename in `end_part`
    path: PathBuf,
    /// Where the document is written while the part is open
    tmp_path: PathBuf,
    writer: Writer<BufWriter<File>>,
}

/// Streams page records into numbered `urlset` documents of bounded size.
///
/// Only one part file is open at a time. A part is closed as soon as it holds
/// `capacity` pages and the next one is opened lazily on the following page,
/// so there is never an empty trailing part.
///
/// Open parts live in `<name>.tmp` and are renamed into place when closed. A
/// part that fails or is dropped while open is removed, so a `<prefix>-<n>.xml`
/// on disk is always a complete document.
pub struct PartWriter {
    output_dir: PathBuf,
    prefix: String,
    capacity: usize,
    stylesheet_href: Option<String>,
    active: Option<ActivePart>,
    finished: Vec<Part>,
}

impl PartWriter {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        prefix: &str,
        capacity: usize,
        stylesheet_href: Option<String>,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            prefix: prefix.to_string(),
            capacity: capacity.max(1),
            stylesheet_href,
            active: None,
            finished: Vec::new(),
        }
    }

    pub fn state(&self) -> PartState {
        match (&self.active, self.finished.is_empty()) {
            (Some(_), _) => PartState::Open,
            (None, true) => PartState::Empty,
            (None, false) => PartState::Closed,
        }
    }

    /// Parts finalized so far, in sequence order
    pub fn finished_parts(&self) -> &[Part] {
        &self.finished
    }

    /// Open the next part file, finalizing the current one first
    pub fn begin_part(&mut self) -> Result<()> {
        if self.active.is_some() {
            self.end_part()?;
        }

        let sequence_number = self.finished.len() + 1;
        let filename = format!("{}-{}.xml", self.prefix, sequence_number);
        let path = self.output_dir.join(&filename);
        let tmp_path = self.output_dir.join(format!("{}.tmp", filename));

        let file = File::create(&tmp_path).map_err(|source| SitemapError::FileWrite {
            path: tmp_path.clone(),
            source,
        })?;
        let mut writer = xml_writer(BufWriter::new(file));
        if let Err(source) = write_urlset_start(&mut writer, self.stylesheet_href.as_deref()) {
            drop(writer);
            discard(&tmp_path);
            return Err(SitemapError::FileWrite { path, source });
        }

        ::log::info!("Opened sitemap part {}", path.display());
        self.active = Some(ActivePart {
            part: Part {
                sequence_number,
                filename,
                page_count: 0,
            },
            path,
            tmp_path,
            writer,
        });
        Ok(())
    }

    /// Append one page, claiming its media in `dedup`.
    ///
    /// Images are emitted in lexicographic order and videos in document order,
    /// each only if no earlier page in the run has claimed it.
    pub fn write_page(&mut self, record: &PageRecord, dedup: &mut DedupTracker) -> Result<()> {
        if self.active.is_none() {
            self.begin_part()?;
        }

        let written = match self.active.as_mut() {
            Some(active) => write_url(&mut active.writer, record, dedup).map(|_| {
                active.part.page_count += 1;
                ::log::debug!(
                    "Wrote {} to {} ({}/{})",
                    record.url,
                    active.part.filename,
                    active.part.page_count,
                    self.capacity
                );
                active.part.page_count >= self.capacity
            }),
            None => Ok(false),
        };

        match written {
            Ok(true) => {
                self.end_part()?;
            }
            Ok(false) => {}
            Err(source) => {
                let path = self.abort().unwrap_or_else(|| self.output_dir.clone());
                return Err(SitemapError::FileWrite { path, source });
            }
        }
        Ok(())
    }

    /// Close the open part, if any, and return its descriptor
    pub fn end_part(&mut self) -> Result<Option<Part>> {
        let Some(ActivePart {
            part,
            path,
            tmp_path,
            mut writer,
        }) = self.active.take()
        else {
            return Ok(None);
        };

        let closed = writer
            .write_event(Event::End(BytesEnd::new("urlset")))
            .and_then(|_| writer.get_mut().write_all(b"\n"))
            .and_then(|_| writer.get_mut().flush());
        drop(writer);

        if let Err(source) = closed.and_then(|_| fs::rename(&tmp_path, &path)) {
            discard(&tmp_path);
            return Err(SitemapError::FileWrite { path, source });
        }

        ::log::info!(
            "Closed sitemap part {} with {} pages",
            path.display(),
            part.page_count
        );
        self.finished.push(part.clone());
        Ok(Some(part))
    }

    /// Close any open part and return every finalized part in order
    pub fn finish(mut self) -> Result<Vec<Part>> {
        self.end_part()?;
        Ok(std::mem::take(&mut self.finished))
    }

    /// Throw away the open part, returning its final path
    fn abort(&mut self) -> Option<PathBuf> {
        let active = self.active.take()?;
        drop(active.writer);
        discard(&active.tmp_path);
        ::log::warn!("Discarded unfinished sitemap part {}", active.path.display());
        Some(active.path)
    }
}

impl Drop for PartWriter {
    fn drop(&mut self) {
        self.abort();
    }
}

fn discard(tmp_path: &Path) {
    if let Err(e) = fs::remove_file(tmp_path) {
        ::log::warn!("Failed to remove {}: {}", tmp_path.display(), e);
    }
}

fn write_urlset_start<W: Write>(
    writer: &mut Writer<W>,
    stylesheet_href: Option<&str>,
) -> io::Result<()> {
    write_prolog(writer, stylesheet_href)?;
    let urlset = BytesStart::new("urlset").with_attributes([
        ("xmlns", SITEMAP_NS),
        ("xmlns:image", IMAGE_NS),
        ("xmlns:video", VIDEO_NS),
    ]);
    writer.write_event(Event::Start(urlset))
}

fn write_url<W: Write>(
    writer: &mut Writer<W>,
    record: &PageRecord,
    dedup: &mut DedupTracker,
) -> io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new("url")))?;
    write_text_element(writer, "loc", &record.url)?;
    write_text_element(writer, "lastmod", &record.last_modified)?;
    write_text_element(writer, "changefreq", CHANGEFREQ)?;
    write_text_element(writer, "priority", PRIORITY)?;

    for image in &record.images {
        if !dedup.claim(image, MediaKind::Image) {
            continue;
        }
        writer.write_event(Event::Start(BytesStart::new("image:image")))?;
        write_text_element(writer, "image:loc", image)?;
        writer.write_event(Event::End(BytesEnd::new("image:image")))?;
    }

    for video in &record.videos {
        if !dedup.claim(&video.content_url, MediaKind::Video) {
            continue;
        }
        writer.write_event(Event::Start(BytesStart::new("video:video")))?;
        write_text_element(writer, "video:content_loc", &video.content_url)?;
        write_text_element(writer, "video:title", &video.title)?;
        write_text_element(writer, "video:description", &video.description)?;
        writer.write_event(Event::End(BytesEnd::new("video:video")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("url")))
}
