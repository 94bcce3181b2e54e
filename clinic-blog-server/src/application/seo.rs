//! Per-post SEO metadata and structured data.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::domain::content::{ContentRecord, strip_tags};
use crate::domain::error::AssemblyError;
use crate::domain::site::SiteConfig;

const DESCRIPTION_LIMIT: usize = 160;
const OG_IMAGE_WIDTH: u32 = 1200;
const OG_IMAGE_HEIGHT: u32 = 630;
const DEFAULT_OG_IMAGE: &str = "images/blog-og.jpg";

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostMetadata {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) canonical_url: String,
    pub(crate) keywords: Vec<String>,
    pub(crate) open_graph: OpenGraph,
    pub(crate) twitter: TwitterCard,
    /// `BlogPosting` and `BreadcrumbList` documents.
    #[schema(value_type = Vec<Object>)]
    pub(crate) json_ld: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OpenGraph {
    pub(crate) title: String,
    pub(crate) description: String,
    #[serde(rename = "type")]
    pub(crate) kind: String,
    pub(crate) url: String,
    pub(crate) site_name: String,
    pub(crate) images: Vec<OgImage>,
    pub(crate) published_time: DateTime<Utc>,
    pub(crate) modified_time: DateTime<Utc>,
    pub(crate) authors: Vec<String>,
    pub(crate) tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub(crate) struct OgImage {
    pub(crate) url: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) alt: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub(crate) struct TwitterCard {
    pub(crate) card: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) site: Option<String>,
}

pub(crate) fn post_metadata(
    site: &SiteConfig,
    post: &ContentRecord,
) -> Result<PostMetadata, AssemblyError> {
    let canonical = site.post_url(&post.slug)?;
    let title = format!("{} | {}", post.title, site.name);
    let description = describe(post, site);
    let image_url = match &post.main_image {
        Some(image) => image.url.clone(),
        None => site.url_for(DEFAULT_OG_IMAGE)?.to_string(),
    };
    let author = post
        .author
        .as_ref()
        .map(|author| author.name.clone())
        .unwrap_or_else(|| site.name.clone());
    let category_titles: Vec<String> = post.categories.iter().map(|c| c.title.clone()).collect();
    let mut keywords = category_titles.clone();
    for tag in &post.tags {
        if !keywords.contains(tag) {
            keywords.push(tag.clone());
        }
    }

    let json_ld = vec![
        blog_posting(site, post, canonical.as_str(), &description, &image_url, &author),
        breadcrumbs(site, post, canonical.as_str())?,
    ];

    Ok(PostMetadata {
        open_graph: OpenGraph {
            title: title.clone(),
            description: description.clone(),
            kind: "article".to_string(),
            url: canonical.to_string(),
            site_name: site.name.clone(),
            images: vec![OgImage {
                url: image_url.clone(),
                width: OG_IMAGE_WIDTH,
                height: OG_IMAGE_HEIGHT,
                alt: post.title.clone(),
            }],
            published_time: post.published_at,
            modified_time: post.last_modified(),
            authors: vec![author],
            tags: category_titles,
        },
        twitter: TwitterCard {
            card: "summary_large_image".to_string(),
            title: title.clone(),
            description: description.clone(),
            images: vec![image_url],
            site: site.twitter_handle.clone(),
        },
        title,
        description,
        canonical_url: canonical.to_string(),
        keywords,
        json_ld,
    })
}

/// Excerpt, else the start of the body, else a site-wide line.
fn describe(post: &ContentRecord, site: &SiteConfig) -> String {
    let excerpt = strip_tags(&post.excerpt);
    let source = if !excerpt.trim().is_empty() {
        excerpt
    } else {
        strip_tags(&post.body_text())
    };
    let collapsed = source.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return format!("Clinic marketing insights from {}", site.name);
    }
    truncate(&collapsed, DESCRIPTION_LIMIT)
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let cut: String = text.chars().take(limit.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}

fn blog_posting(
    site: &SiteConfig,
    post: &ContentRecord,
    canonical: &str,
    description: &str,
    image_url: &str,
    author: &str,
) -> Value {
    json!({
        "@context": "https://schema.org",
        "@type": "BlogPosting",
        "headline": post.title,
        "description": description,
        "image": image_url,
        "url": canonical,
        "mainEntityOfPage": { "@type": "WebPage", "@id": canonical },
        "datePublished": post.published_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        "dateModified": post.last_modified().to_rfc3339_opts(SecondsFormat::Secs, true),
        "author": { "@type": "Person", "name": author },
        "publisher": {
            "@type": "Organization",
            "name": site.name,
            "url": site.home().as_str(),
        },
        "keywords": post.tags.join(", "),
        "timeRequired": format!("PT{}M", post.reading_minutes()),
    })
}

fn breadcrumbs(site: &SiteConfig, post: &ContentRecord, canonical: &str) -> Result<Value, AssemblyError> {
    let mut trail = vec![
        ("Home".to_string(), site.home().to_string()),
        ("Blog".to_string(), site.url_for("blog")?.to_string()),
    ];
    if let Some(category) = post.categories.first() {
        trail.push((category.title.clone(), site.category_url(&category.slug)?.to_string()));
    }
    trail.push((post.title.clone(), canonical.to_string()));

    let items: Vec<Value> = trail
        .into_iter()
        .enumerate()
        .map(|(index, (name, item))| {
            json!({
                "@type": "ListItem",
                "position": index + 1,
                "name": name,
                "item": item,
            })
        })
        .collect();

    Ok(json!({
        "@context": "https://schema.org",
        "@type": "BreadcrumbList",
        "itemListElement": items,
    }))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::domain::content::{AuthorRef, CategoryRef};

    fn site() -> SiteConfig {
        SiteConfig::new("https://www.aideamed.com", "Aidea:Med", Some("@aideamed".to_string()))
            .expect("valid site")
    }

    fn post() -> ContentRecord {
        ContentRecord {
            id: "p1".to_string(),
            slug: "dental-seo".to_string(),
            title: "Dental SEO".to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            updated_at: None,
            categories: vec![CategoryRef {
                id: "c1".to_string(),
                slug: "seo".to_string(),
                title: "SEO".to_string(),
            }],
            author: Some(AuthorRef {
                id: "a1".to_string(),
                name: "Dr. Lin".to_string(),
                slug: None,
            }),
            excerpt: "<p>How clinics get <b>found</b></p>".to_string(),
            body: None,
            tags: vec!["seo".to_string(), "local".to_string()],
            main_image: None,
            popularity: None,
        }
    }

    #[test]
    fn title_and_description() {
        let meta = post_metadata(&site(), &post()).expect("metadata");
        assert_eq!(meta.title, "Dental SEO | Aidea:Med");
        assert_eq!(meta.description, "How clinics get found");
        assert_eq!(meta.canonical_url, "https://www.aideamed.com/blog/dental-seo");
        assert_eq!(meta.twitter.site.as_deref(), Some("@aideamed"));
        assert_eq!(
            meta.open_graph.images[0].url,
            "https://www.aideamed.com/images/blog-og.jpg"
        );
    }

    #[test]
    fn description_falls_back_to_body_and_is_truncated() {
        let mut post = post();
        post.excerpt = String::new();
        post.body = Some(json!("word ".repeat(100)));
        let meta = post_metadata(&site(), &post).expect("metadata");
        assert!(meta.description.ends_with("..."));
        assert!(meta.description.chars().count() <= DESCRIPTION_LIMIT);
    }

    #[test]
    fn json_ld_has_posting_and_breadcrumbs() {
        let meta = post_metadata(&site(), &post()).expect("metadata");
        assert_eq!(meta.json_ld.len(), 2);
        assert_eq!(meta.json_ld[0]["@type"], "BlogPosting");
        assert_eq!(meta.json_ld[0]["author"]["name"], "Dr. Lin");
        let crumbs = meta.json_ld[1]["itemListElement"]
            .as_array()
            .expect("breadcrumb items");
        assert_eq!(crumbs.len(), 4);
        assert_eq!(crumbs[2]["item"], "https://www.aideamed.com/blog/category/seo");
        assert_eq!(crumbs[3]["position"], 4);
    }

    #[test]
    fn keywords_merge_categories_and_tags() {
        let meta = post_metadata(&site(), &post()).expect("metadata");
        assert_eq!(meta.keywords, vec!["SEO", "seo", "local"]);
    }
}
