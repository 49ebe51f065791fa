use crate::parsers::{MediaSet, UNTITLED_VIDEO, is_video_url, resolve};
use crate::results::VideoRef;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use std::sync::LazyLock;
use url::Url;

static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("valid img selector"));
static VIDEO_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("video").expect("valid video selector"));
static SOURCE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("source").expect("valid source selector"));

/// Parses HTML content to extract image and video references
pub fn parse(html: &str, page_url: &Url) -> MediaSet {
    let doc = Html::parse_document(html);

    let images = parse_images(&doc, page_url);
    let videos = parse_videos(&doc, page_url);

    ::log::debug!(
        "HTML parser found {} images and {} videos on {}",
        images.len(),
        videos.len(),
        page_url
    );

    MediaSet { images, videos }
}

/// Collects every non-empty `img[src]`, resolved against the page
pub fn parse_images(doc: &Html, page_url: &Url) -> BTreeSet<String> {
    doc.select(&IMG_SELECTOR)
        .filter_map(|e| non_empty_attr(e, "src"))
        .filter_map(|src| resolve(page_url, src))
        .map(String::from)
        .collect()
}

/// Collects `video` elements whose source is a recognized video file
pub fn parse_videos(doc: &Html, page_url: &Url) -> Vec<VideoRef> {
    doc.select(&VIDEO_SELECTOR)
        .filter_map(|video| video_ref(video, page_url))
        .collect()
}

fn video_ref(video: ElementRef<'_>, page_url: &Url) -> Option<VideoRef> {
    // Own src first, then the first nested <source>
    let src = non_empty_attr(video, "src").or_else(|| {
        video
            .select(&SOURCE_SELECTOR)
            .next()
            .and_then(|source| non_empty_attr(source, "src"))
    })?;

    let content_url = resolve(page_url, src)?;
    if !is_video_url(&content_url) {
        ::log::trace!("Ignoring video with unrecognized extension: {}", content_url);
        return None;
    }

    let title = non_empty_attr(video, "title")
        .or_else(|| non_empty_attr(video, "data-title"))
        .unwrap_or(UNTITLED_VIDEO)
        .to_string();
    let description = non_empty_attr(video, "description")
        .or_else(|| non_empty_attr(video, "data-description"))
        .map(str::to_string)
        .unwrap_or_else(|| title.clone());

    Some(VideoRef {
        content_url: content_url.into(),
        title,
        description,
    })
}

fn non_empty_attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name).filter(|value| !value.is_empty())
}
