pub mod index;
pub mod part;

pub use index::write_index;
pub use part::{PartState, PartWriter};

use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use std::io::{self, Write};

pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
pub const IMAGE_NS: &str = "http://www.google.com/schemas/sitemap-image/1.1";
pub const VIDEO_NS: &str = "http://www.google.com/schemas/sitemap-video/1.1";

/// Indentation used by every generated document
const INDENT_SIZE: usize = 2;

/// Create an indenting XML writer over `inner`
pub(crate) fn xml_writer<W: Write>(inner: W) -> Writer<W> {
    Writer::new_with_indent(inner, b' ', INDENT_SIZE)
}

/// XML declaration followed by the optional stylesheet instruction
pub(crate) fn write_prolog<W: Write>(
    writer: &mut Writer<W>,
    stylesheet_href: Option<&str>,
) -> io::Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    if let Some(href) = stylesheet_href {
        let content = format!(r#"xml-stylesheet type="text/xsl" href="{}""#, escape(href));
        writer.write_event(Event::PI(BytesPI::new(content)))?;
    }
    Ok(())
}

/// `<name>text</name>` with the text escaped
pub(crate) fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))
}
