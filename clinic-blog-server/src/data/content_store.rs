use std::sync::Arc;

use async_trait::async_trait;

use crate::data::content_query::ContentQuery;
use crate::domain::content::{BlogSettings, Category, ContentRecord};
use crate::domain::error::FetchError;

#[derive(Debug, Clone, Default)]
pub(crate) struct ContentPage {
    pub(crate) records: Vec<ContentRecord>,
    pub(crate) total_count: u64,
}

/// Read-only access to the external content store.
#[async_trait]
pub(crate) trait ContentStore: Send + Sync {
    /// Whether `SortField::Popularity` can be honored.
    fn supports_popularity(&self) -> bool;

    async fn query_posts(&self, query: &ContentQuery) -> Result<ContentPage, FetchError>;
    async fn get_post(&self, slug: &str) -> Result<Option<ContentRecord>, FetchError>;
    async fn list_categories(&self) -> Result<Vec<Category>, FetchError>;
    async fn blog_settings(&self) -> Result<Option<BlogSettings>, FetchError>;
}

#[async_trait]
impl<T: ContentStore + ?Sized> ContentStore for Arc<T> {
    fn supports_popularity(&self) -> bool {
        (**self).supports_popularity()
    }

    async fn query_posts(&self, query: &ContentQuery) -> Result<ContentPage, FetchError> {
        (**self).query_posts(query).await
    }

    async fn get_post(&self, slug: &str) -> Result<Option<ContentRecord>, FetchError> {
        (**self).get_post(slug).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, FetchError> {
        (**self).list_categories().await
    }

    async fn blog_settings(&self) -> Result<Option<BlogSettings>, FetchError> {
        (**self).blog_settings().await
    }
}
