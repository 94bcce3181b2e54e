//! Client library for the clinic-blog-server REST API.
//!
//! [`BlogClient`] wraps the listing, post, related-posts, category and sitemap
//! endpoints. Reader-side state (read history, liked posts) lives in
//! [`ReadHistory`] and [`LikedPosts`] over any [`KeyValueStore`].
#![warn(missing_docs)]

mod error;
mod history;
mod http_client;
mod models;

pub use error::{BlogClientError, BlogClientResult};
pub use history::{KeyValueStore, LikedPosts, MemoryStore, READ_HISTORY_LIMIT, ReadHistory};
pub use models::{
    Author, BlogSettings, Category, CategoryRef, Image, ListPostsResponse, ListQuery, Post,
    PostSummary, SortKey, SortOrder,
};

use http_client::HttpClient;

#[derive(Debug, Clone)]
/// Read-only client for the blog API.
pub struct BlogClient {
    http: HttpClient,
}

impl BlogClient {
    /// Creates a client for the server at `base_url`, e.g. `http://127.0.0.1:8080`.
    pub fn new(base_url: &str) -> BlogClientResult<Self> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
        })
    }

    /// Returns one page of posts. Unset query fields use the server defaults.
    pub async fn list_posts(&self, query: &ListQuery) -> BlogClientResult<ListPostsResponse> {
        self.http.list_posts(query).await
    }

    /// Returns the post with `slug`, or [`BlogClientError::NotFound`].
    pub async fn get_post(&self, slug: &str) -> BlogClientResult<Post> {
        let slug = non_empty_slug(slug)?;
        self.http.get_post(slug).await
    }

    /// Returns posts related to `slug`.
    pub async fn related_posts(&self, slug: &str) -> BlogClientResult<Vec<PostSummary>> {
        let slug = non_empty_slug(slug)?;
        self.http.related_posts(slug).await
    }

    /// Returns all categories in display order.
    pub async fn categories(&self) -> BlogClientResult<Vec<Category>> {
        self.http.categories().await
    }

    /// Returns the raw `sitemap.xml` document.
    pub async fn sitemap(&self) -> BlogClientResult<String> {
        self.http.sitemap().await
    }
}

fn non_empty_slug(slug: &str) -> BlogClientResult<&str> {
    let slug = slug.trim();
    if slug.is_empty() {
        return Err(BlogClientError::InvalidRequest(
            "slug must not be empty".to_string(),
        ));
    }
    Ok(slug)
}
