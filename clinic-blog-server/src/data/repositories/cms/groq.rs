//! Rendering of [`ContentQuery`] into GROQ for the hosted CMS.
//!
//! User input only ever travels as bound `$parameters`; the query text is
//! assembled from fixed fragments and the configured popularity field.

use serde_json::{Value, json};

use crate::data::content_query::{ContentQuery, SortField};
use crate::domain::query::SortOrder;

const PUBLISHED_POSTS: &str =
    r#"_type == "post" && defined(slug.current) && (!defined(status) || status == "published")"#;

const CARD_PROJECTION: &str = r#"
    _id,
    title,
    "slug": slug.current,
    publishedAt,
    "updatedAt": coalesce(updatedAt, _updatedAt),
    excerpt,
    tags,
    "mainImage": mainImage{ "url": asset->url, alt },
    "categories": categories[]->{ _id, title, "slug": slug.current },
    "author": author->{ _id, name, "slug": slug.current }"#;

pub(crate) const CATEGORIES_QUERY: &str = r#"*[_type == "category" && defined(slug.current)] | order(title asc) {
    _id,
    title,
    "slug": slug.current,
    description,
    order
}"#;

pub(crate) const SETTINGS_QUERY: &str = r#"*[_type == "blogSettings"][0] { title, description }"#;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GroqQuery {
    pub(crate) query: String,
    pub(crate) params: Vec<(String, Value)>,
}

impl GroqQuery {
    fn new(query: String) -> Self {
        Self {
            query,
            params: Vec::new(),
        }
    }

    fn bind(mut self, name: &str, value: Value) -> Self {
        self.params.push((name.to_string(), value));
        self
    }
}

/// `{ "total": count(..), "posts": [..] }` for one page of posts.
pub(crate) fn listing(query: &ContentQuery, popularity_field: Option<&str>) -> GroqQuery {
    let mut filter = PUBLISHED_POSTS.to_string();
    if query.category_filter.is_some() {
        filter.push_str(" && $category in categories[]->slug.current");
    }
    if query.search_filter.is_some() {
        filter.push_str(
            " && (title match $search || excerpt match $search || pt::text(body) match $search)",
        );
    }

    let direction = match query.sort_direction {
        SortOrder::Asc => "asc",
        SortOrder::Desc => "desc",
    };
    let order = match (query.sort_field, popularity_field) {
        (SortField::Popularity, Some(field)) => {
            format!("coalesce({field}, 0) {direction}, publishedAt desc")
        }
        _ => format!("publishedAt {direction}"),
    };

    let mut projection = CARD_PROJECTION.to_string();
    if let Some(field) = popularity_field {
        projection.push_str(&format!(",\n    \"popularity\": {field}"));
    }

    let text = format!(
        "{{\n  \"total\": count(*[{filter}]),\n  \"posts\": *[{filter}] | order({order}) [$start...$end] {{{projection}\n  }}\n}}"
    );

    let mut groq = GroqQuery::new(text)
        .bind("start", json!(query.offset))
        .bind("end", json!(query.end()));
    if let Some(category) = &query.category_filter {
        groq = groq.bind("category", json!(category));
    }
    if let Some(search) = &query.search_filter {
        groq = groq.bind("search", json!(format!("{search}*")));
    }
    groq
}

pub(crate) fn post_by_slug(slug: &str, popularity_field: Option<&str>) -> GroqQuery {
    let mut projection = CARD_PROJECTION.to_string();
    projection.push_str(",\n    body");
    if let Some(field) = popularity_field {
        projection.push_str(&format!(",\n    \"popularity\": {field}"));
    }
    let text = format!("*[{PUBLISHED_POSTS} && slug.current == $slug][0] {{{projection}\n}}");
    GroqQuery::new(text).bind("slug", json!(slug))
}

pub(crate) fn categories() -> GroqQuery {
    GroqQuery::new(CATEGORIES_QUERY.to_string())
}

pub(crate) fn settings() -> GroqQuery {
    GroqQuery::new(SETTINGS_QUERY.to_string())
}

/// Field names are spliced into the query text, so only plain identifiers
/// and dotted paths are accepted.
pub(crate) fn is_valid_field_path(field: &str) -> bool {
    !field.is_empty()
        && field.split('.').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(ch) if ch.is_ascii_alphabetic() || ch == '_')
                && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        })
}
