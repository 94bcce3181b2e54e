use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const WORDS_PER_MINUTE: usize = 200;

/// A published blog post as read from the content store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ContentRecord {
    pub(crate) id: String,
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) published_at: DateTime<Utc>,
    pub(crate) updated_at: Option<DateTime<Utc>>,
    pub(crate) categories: Vec<CategoryRef>,
    pub(crate) author: Option<AuthorRef>,
    pub(crate) excerpt: String,
    pub(crate) body: Option<Value>,
    pub(crate) tags: Vec<String>,
    pub(crate) main_image: Option<ImageRef>,
    pub(crate) popularity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CategoryRef {
    pub(crate) id: String,
    pub(crate) slug: String,
    pub(crate) title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct AuthorRef {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ImageRef {
    pub(crate) url: String,
    pub(crate) alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Category {
    pub(crate) id: String,
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) order: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct BlogSettings {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
}

impl ContentRecord {
    /// Timestamp used for `lastmod` and cache validators.
    pub(crate) fn last_modified(&self) -> DateTime<Utc> {
        self.updated_at
            .filter(|updated| *updated > self.published_at)
            .unwrap_or(self.published_at)
    }

    pub(crate) fn has_category(&self, slug: &str) -> bool {
        self.categories.iter().any(|category| category.slug == slug)
    }

    /// Plain text of the rich body. Accepts either a string or a list of
    /// portable-text blocks.
    pub(crate) fn body_text(&self) -> String {
        match &self.body {
            Some(body) => rich_text_to_plain(body),
            None => String::new(),
        }
    }

    pub(crate) fn reading_minutes(&self) -> u32 {
        let text = if self.body.is_some() {
            self.body_text()
        } else {
            self.excerpt.clone()
        };
        reading_minutes(&text)
    }

    /// Case-insensitive substring match against title, excerpt and body.
    pub(crate) fn matches_search(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.excerpt.to_lowercase().contains(&needle)
            || self.body_text().to_lowercase().contains(&needle)
    }

    pub(crate) fn shared_tags(&self, other: &ContentRecord) -> usize {
        self.tags
            .iter()
            .filter(|tag| other.tags.contains(tag))
            .count()
    }

    pub(crate) fn shares_category(&self, other: &ContentRecord) -> bool {
        self.categories
            .iter()
            .any(|category| other.has_category(&category.slug))
    }
}

/// Slugs end up verbatim in URL paths, so anything that would change the
/// path structure is refused.
pub(crate) fn is_url_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|ch| ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.' | '~'))
        && slug != "."
        && slug != ".."
}

pub(crate) fn reading_minutes(text: &str) -> u32 {
    minutes_for_words(strip_tags(text).split_whitespace().count())
}

/// Saturates at `u32::MAX` instead of wrapping.
fn minutes_for_words(words: usize) -> u32 {
    u32::try_from(words.div_ceil(WORDS_PER_MINUTE).max(1)).unwrap_or(u32::MAX)
}

pub(crate) fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

fn rich_text_to_plain(body: &Value) -> String {
    match body {
        Value::String(text) => text.clone(),
        Value::Array(blocks) => blocks
            .iter()
            .filter_map(block_text)
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

fn block_text(block: &Value) -> Option<String> {
    let children = block.get("children")?.as_array()?;
    let text = children
        .iter()
        .filter_map(|span| span.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("");
    Some(text)
}
