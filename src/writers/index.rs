use crate::error::{Result, SitemapError};
use crate::results::Part;
use crate::utils;
use crate::writers::{SITEMAP_NS, write_prolog, write_text_element, xml_writer};
use chrono::{DateTime, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use url::Url;

/// Write the `sitemapindex` document listing every finalized part.
///
/// All entries share one `lastmod`, the `generated_at` time. The document is
/// written to a temporary file and renamed into place, so an interrupted run
/// never leaves a truncated index behind.
pub fn write_index(
    path: &Path,
    parts: &[Part],
    sitemap_base_url: &Url,
    stylesheet_href: Option<&str>,
    generated_at: DateTime<Utc>,
) -> Result<()> {
    let write_error = |source: io::Error| SitemapError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    let lastmod = utils::format_timestamp(generated_at);
    let mut locations = Vec::with_capacity(parts.len());
    for part in parts {
        let loc = sitemap_base_url.join(&part.filename).map_err(|e| {
            write_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cannot resolve {} against {}: {}", part.filename, sitemap_base_url, e),
            ))
        })?;
        locations.push(loc);
    }

    let tmp_path = path.with_extension("xml.tmp");
    let file = File::create(&tmp_path).map_err(write_error)?;
    let mut writer = xml_writer(BufWriter::new(file));
    write_document(&mut writer, &locations, &lastmod, stylesheet_href)
        .and_then(|_| writer.get_mut().flush())
        .map_err(write_error)?;
    drop(writer);

    fs::rename(&tmp_path, path).map_err(write_error)?;
    ::log::info!(
        "Wrote sitemap index {} listing {} parts",
        path.display(),
        parts.len()
    );
    Ok(())
}

fn write_document<W: Write>(
    writer: &mut Writer<W>,
    locations: &[Url],
    lastmod: &str,
    stylesheet_href: Option<&str>,
) -> io::Result<()> {
    write_prolog(writer, stylesheet_href)?;
    let root = BytesStart::new("sitemapindex").with_attributes([("xmlns", SITEMAP_NS)]);
    writer.write_event(Event::Start(root))?;

    for loc in locations {
        writer.write_event(Event::Start(BytesStart::new("sitemap")))?;
        write_text_element(writer, "loc", loc.as_str())?;
        write_text_element(writer, "lastmod", lastmod)?;
        writer.write_event(Event::End(BytesEnd::new("sitemap")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("sitemapindex")))?;
    writer.get_mut().write_all(b"\n")
}
