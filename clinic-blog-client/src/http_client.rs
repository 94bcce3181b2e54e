use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{BlogClientError, BlogClientResult};
use crate::models::{Category, ListPostsResponse, ListQuery, Post, PostSummary};

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    error: Option<String>,
    details: Option<String>,
}

#[derive(Debug, Clone)]
/// HTTP client for the `clinic-blog-server` REST API.
pub(crate) struct HttpClient {
    base_url: Url,
    client: Client,
}

impl HttpClient {
    pub(crate) fn new(base_url: &str) -> BlogClientResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| BlogClientError::InvalidRequest(format!("invalid base url: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BlogClientError::InvalidRequest(format!(
                "base url '{base_url}' cannot have a path"
            )));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(BlogClientError::Http)?;

        Ok(Self { base_url, client })
    }

    /// Appends percent-encoded path segments to the base url.
    fn endpoint(&self, segments: &[&str]) -> BlogClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BlogClientError::InvalidRequest("base url cannot have a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn decode_error(response: reqwest::Response) -> BlogClientError {
        let status = response.status();
        match response.json::<ErrorResponseDto>().await {
            Ok(body) => BlogClientError::from_http_status(status, body.error, body.details),
            Err(_) => BlogClientError::from_http_status(status, None, None),
        }
    }

    async fn send(
        &self,
        segments: &[&str],
        query: Option<&(impl Serialize + ?Sized)>,
    ) -> BlogClientResult<reqwest::Response> {
        let mut request = self.client.get(self.endpoint(segments)?);
        if let Some(query) = query {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(BlogClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: Option<&ListQuery>,
    ) -> BlogClientResult<T> {
        self.send(segments, query)
            .await?
            .json::<T>()
            .await
            .map_err(BlogClientError::from_reqwest)
    }

    pub(crate) async fn list_posts(&self, query: &ListQuery) -> BlogClientResult<ListPostsResponse> {
        self.get_json(&["api", "blog"], Some(query)).await
    }

    pub(crate) async fn get_post(&self, slug: &str) -> BlogClientResult<Post> {
        self.get_json(&["api", "blog", slug], None).await
    }

    pub(crate) async fn related_posts(&self, slug: &str) -> BlogClientResult<Vec<PostSummary>> {
        self.get_json(&["api", "blog", slug, "related"], None).await
    }

    pub(crate) async fn categories(&self) -> BlogClientResult<Vec<Category>> {
        self.get_json(&["api", "categories"], None).await
    }

    pub(crate) async fn sitemap(&self) -> BlogClientResult<String> {
        self.send(&["sitemap.xml"], None::<&ListQuery>)
            .await?
            .text()
            .await
            .map_err(BlogClientError::from_reqwest)
    }
}
