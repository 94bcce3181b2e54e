//! XML sitemap assembly.

use std::borrow::Cow;

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use reqwest::Url;
use tracing::warn;

use super::blog_service::SitemapContent;
use crate::domain::content::ContentRecord;
use crate::domain::error::AssemblyError;
use crate::domain::site::SiteConfig;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const IMAGE_NS: &str = "http://www.google.com/schemas/sitemap-image/1.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChangeFreq {
    Weekly,
    Monthly,
}

impl ChangeFreq {
    fn as_str(self) -> &'static str {
        match self {
            ChangeFreq::Weekly => "weekly",
            ChangeFreq::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SitemapImage {
    pub(crate) loc: String,
    pub(crate) title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SitemapEntry {
    pub(crate) loc: Url,
    pub(crate) lastmod: DateTime<Utc>,
    pub(crate) changefreq: ChangeFreq,
    pub(crate) priority: f32,
    pub(crate) image: Option<SitemapImage>,
}

struct StaticPage {
    path: &'static str,
    changefreq: ChangeFreq,
    priority: f32,
}

const STATIC_PAGES: [StaticPage; 6] = [
    StaticPage { path: "", changefreq: ChangeFreq::Weekly, priority: 1.0 },
    StaticPage { path: "service", changefreq: ChangeFreq::Monthly, priority: 0.8 },
    StaticPage { path: "case", changefreq: ChangeFreq::Monthly, priority: 0.8 },
    StaticPage { path: "team", changefreq: ChangeFreq::Monthly, priority: 0.7 },
    StaticPage { path: "blog", changefreq: ChangeFreq::Weekly, priority: 0.9 },
    StaticPage { path: "contact", changefreq: ChangeFreq::Monthly, priority: 0.6 },
];

/// Served when the content store cannot be reached.
const FALLBACK_PAGES: [StaticPage; 2] = [
    StaticPage { path: "", changefreq: ChangeFreq::Weekly, priority: 1.0 },
    StaticPage { path: "blog", changefreq: ChangeFreq::Weekly, priority: 0.9 },
];

const POST_PRIORITY: f32 = 0.7;
const CATEGORY_PRIORITY: f32 = 0.6;

pub(crate) fn build_sitemap(
    site: &SiteConfig,
    content: &SitemapContent,
    now: DateTime<Utc>,
) -> Result<String, AssemblyError> {
    let mut entries = static_entries(site, &STATIC_PAGES, now);

    let newest = content.posts.iter().map(ContentRecord::last_modified).max();
    for category in &content.categories {
        match site.category_url(&category.slug) {
            Ok(loc) => entries.push(SitemapEntry {
                loc,
                lastmod: newest.unwrap_or(now),
                changefreq: ChangeFreq::Weekly,
                priority: CATEGORY_PRIORITY,
                image: None,
            }),
            Err(err) => warn!(category = %category.slug, error = %err, "skipping category in sitemap"),
        }
    }

    for post in &content.posts {
        match post_entry(site, post) {
            Ok(entry) => entries.push(entry),
            Err(err) => warn!(post = %post.id, error = %err, "skipping post in sitemap"),
        }
    }

    render_urlset(&entries)
}

pub(crate) fn fallback_sitemap(site: &SiteConfig, now: DateTime<Utc>) -> Result<String, AssemblyError> {
    render_urlset(&static_entries(site, &FALLBACK_PAGES, now))
}

fn static_entries(site: &SiteConfig, pages: &[StaticPage], now: DateTime<Utc>) -> Vec<SitemapEntry> {
    pages
        .iter()
        .filter_map(|page| {
            let loc = if page.path.is_empty() {
                site.home()
            } else {
                site.url_for(page.path).ok()?
            };
            Some(SitemapEntry {
                loc,
                lastmod: now,
                changefreq: page.changefreq,
                priority: page.priority,
                image: None,
            })
        })
        .collect()
}

fn post_entry(site: &SiteConfig, post: &ContentRecord) -> Result<SitemapEntry, AssemblyError> {
    let loc = site.post_url(&post.slug)?;
    let image = post.main_image.as_ref().map(|image| SitemapImage {
        loc: image.url.clone(),
        title: post.title.clone(),
    });
    Ok(SitemapEntry {
        loc,
        lastmod: post.last_modified(),
        changefreq: ChangeFreq::Monthly,
        priority: POST_PRIORITY,
        image,
    })
}

pub(crate) fn render_urlset(entries: &[SitemapEntry]) -> Result<String, AssemblyError> {
    write_urlset(entries)
        .map_err(|err| AssemblyError::invalid("sitemap", err.to_string()))
        .and_then(|bytes| {
            String::from_utf8(bytes).map_err(|err| AssemblyError::invalid("sitemap", err.to_string()))
        })
}

fn write_urlset(entries: &[SitemapEntry]) -> Result<Vec<u8>, quick_xml::Error> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("urlset").with_attributes([("xmlns", SITEMAP_NS), ("xmlns:image", IMAGE_NS)]),
    ))?;

    for entry in entries {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        write_text_element(&mut writer, "loc", entry.loc.as_str())?;
        write_text_element(
            &mut writer,
            "lastmod",
            &entry.lastmod.to_rfc3339_opts(SecondsFormat::Secs, true),
        )?;
        write_text_element(&mut writer, "changefreq", entry.changefreq.as_str())?;
        write_text_element(&mut writer, "priority", &format!("{:.1}", entry.priority))?;
        if let Some(image) = &entry.image {
            writer.write_event(Event::Start(BytesStart::new("image:image")))?;
            write_text_element(&mut writer, "image:loc", &image.loc)?;
            write_text_element(&mut writer, "image:title", &image.title)?;
            writer.write_event(Event::End(BytesEnd::new("image:image")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

/// The writer escapes markup characters; characters XML 1.0 cannot carry at
/// all are dropped first.
fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(&xml_chars_only(text))))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

pub(crate) fn xml_chars_only(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|ch| is_xml_char(*ch)).collect())
    }
}

/// The `Char` production of XML 1.0.
fn is_xml_char(ch: char) -> bool {
    matches!(ch,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}
