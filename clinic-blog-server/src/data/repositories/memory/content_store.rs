use std::cmp::Ordering;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::data::content_query::{ContentQuery, SortField};
use crate::data::content_store::{ContentPage, ContentStore};
use crate::data::raw_record::{decode_categories, decode_records, decode_settings};
use crate::domain::content::{BlogSettings, Category, ContentRecord};
use crate::domain::error::FetchError;
use crate::domain::query::SortOrder;

/// Content store holding every post in memory, loaded from a JSON fixture
/// shaped like the CMS documents.
#[derive(Debug, Clone, Default)]
pub(crate) struct InMemoryContentStore {
    posts: Vec<ContentRecord>,
    categories: Vec<Category>,
    settings: Option<BlogSettings>,
}

#[derive(Debug, Deserialize)]
struct Fixture {
    #[serde(default)]
    posts: Vec<Value>,
    #[serde(default)]
    categories: Vec<Value>,
    #[serde(default)]
    settings: Value,
}

impl InMemoryContentStore {
    pub(crate) fn new(
        posts: Vec<ContentRecord>,
        categories: Vec<Category>,
        settings: Option<BlogSettings>,
    ) -> Self {
        Self {
            posts,
            categories,
            settings,
        }
    }

    pub(crate) fn from_json(raw: &str) -> Result<Self> {
        let fixture: Fixture = serde_json::from_str(raw).context("invalid content fixture")?;
        Ok(Self::new(
            decode_records(fixture.posts),
            decode_categories(fixture.categories),
            decode_settings(fixture.settings),
        ))
    }

    pub(crate) async fn from_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read content fixture {}", path.display()))?;
        let store = Self::from_json(&raw)?;
        info!(
            posts = store.posts.len(),
            categories = store.categories.len(),
            "loaded content fixture from {}",
            path.display()
        );
        Ok(store)
    }

    fn matches(record: &ContentRecord, query: &ContentQuery) -> bool {
        let category_ok = query
            .category_filter
            .as_deref()
            .is_none_or(|slug| record.has_category(slug));
        let search_ok = query
            .search_filter
            .as_deref()
            .is_none_or(|term| record.matches_search(term));
        category_ok && search_ok
    }

    fn compare(a: &ContentRecord, b: &ContentRecord, query: &ContentQuery) -> Ordering {
        let primary = match query.sort_field {
            SortField::PublishedAt => a.published_at.cmp(&b.published_at),
            SortField::Popularity => a.popularity.unwrap_or(0).cmp(&b.popularity.unwrap_or(0)),
        };
        let primary = match query.sort_direction {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary
            .then_with(|| b.published_at.cmp(&a.published_at))
            .then_with(|| a.id.cmp(&b.id))
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    fn supports_popularity(&self) -> bool {
        true
    }

    async fn query_posts(&self, query: &ContentQuery) -> Result<ContentPage, FetchError> {
        let mut matching: Vec<&ContentRecord> = self
            .posts
            .iter()
            .filter(|record| Self::matches(record, query))
            .collect();
        matching.sort_by(|a, b| Self::compare(a, b, query));

        let total_count = matching.len() as u64;
        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let records = matching
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .cloned()
            .collect();

        Ok(ContentPage {
            records,
            total_count,
        })
    }

    async fn get_post(&self, slug: &str) -> Result<Option<ContentRecord>, FetchError> {
        Ok(self.posts.iter().find(|post| post.slug == slug).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, FetchError> {
        let mut categories = self.categories.clone();
        categories.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(categories)
    }

    async fn blog_settings(&self) -> Result<Option<BlogSettings>, FetchError> {
        Ok(self.settings.clone())
    }
}
