use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Listing sort key.
pub enum SortKey {
    /// Newest first by publish date.
    Latest,
    /// By popularity score.
    Popular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Listing sort direction.
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Listing query. Unset fields are left to the server defaults.
pub struct ListQuery {
    /// 1-based page number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Category slug.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Free-text search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Sort key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortKey>,
    /// Sort direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Category reference embedded in a post.
pub struct CategoryRef {
    /// CMS document id.
    pub id: String,
    /// URL slug.
    pub slug: String,
    /// Display title.
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Post author.
pub struct Author {
    /// Display name.
    pub name: String,
    /// Author page slug.
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Post cover image.
pub struct Image {
    /// Absolute image url.
    pub url: String,
    /// Alternative text.
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Post as shown in listings.
pub struct PostSummary {
    /// CMS document id.
    pub id: String,
    /// URL slug.
    pub slug: String,
    /// Title.
    pub title: String,
    /// Publish timestamp (UTC).
    pub published_at: DateTime<Utc>,
    /// Last edit timestamp (UTC).
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Short summary.
    #[serde(default)]
    pub excerpt: String,
    /// Categories the post belongs to.
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
    /// Author, when known.
    #[serde(default)]
    pub author: Option<Author>,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Cover image.
    #[serde(default)]
    pub main_image: Option<Image>,
    /// Estimated reading time in minutes.
    pub reading_minutes: u32,
    /// Popularity score, when the server tracks one.
    #[serde(default)]
    pub popularity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Full post including its rich-text body.
pub struct Post {
    /// Listing fields.
    #[serde(flatten)]
    pub summary: PostSummary,
    /// Rich text as stored in the CMS.
    #[serde(default)]
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Blog-wide settings.
pub struct BlogSettings {
    /// Listing heading.
    pub title: Option<String>,
    /// Listing description.
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One page of posts.
pub struct ListPostsResponse {
    /// Posts on this page.
    pub posts: Vec<PostSummary>,
    /// Posts matching the filters across all pages.
    pub total: u64,
    /// Current page.
    pub page: u32,
    /// Number of pages.
    pub total_pages: u32,
    /// Whether a later page exists.
    pub has_more: bool,
    /// Blog settings, when available.
    #[serde(default)]
    pub settings: Option<BlogSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Blog category.
pub struct Category {
    /// CMS document id.
    pub id: String,
    /// URL slug.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
}
