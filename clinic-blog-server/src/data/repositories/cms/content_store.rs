use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, warn};

use super::groq::{self, GroqQuery};
use crate::data::content_query::ContentQuery;
use crate::data::content_store::{ContentPage, ContentStore};
use crate::data::raw_record::{decode_categories, decode_record, decode_records, decode_settings};
use crate::domain::content::{BlogSettings, Category, ContentRecord};
use crate::domain::error::FetchError;

#[derive(Debug, Clone)]
pub(crate) struct CmsConfig {
    pub(crate) project_id: String,
    pub(crate) dataset: String,
    pub(crate) api_version: String,
    pub(crate) token: Option<String>,
    pub(crate) popularity_field: Option<String>,
    pub(crate) use_cdn: bool,
    pub(crate) timeout: Duration,
}

/// Content store backed by the hosted CMS HTTP query API.
#[derive(Debug, Clone)]
pub(crate) struct CmsContentStore {
    client: Client,
    endpoint: Url,
    token: Option<String>,
    popularity_field: Option<String>,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct ListingResult {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    posts: Vec<Value>,
}

impl CmsContentStore {
    pub(crate) fn new(config: CmsConfig) -> Result<Self> {
        if let Some(field) = &config.popularity_field
            && !groq::is_valid_field_path(field)
        {
            return Err(anyhow!("invalid popularity field '{field}'"));
        }

        let host = if config.use_cdn {
            "apicdn.sanity.io"
        } else {
            "api.sanity.io"
        };
        let api_version = config.api_version.trim_start_matches('v');
        let endpoint = Url::parse(&format!(
            "https://{}.{host}/v{api_version}/data/query/{}",
            config.project_id, config.dataset
        ))
        .context("failed to build CMS endpoint")?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(config.timeout)
            .build()
            .context("failed to build CMS http client")?;

        Ok(Self {
            client,
            endpoint,
            token: config.token,
            popularity_field: config.popularity_field,
            timeout: config.timeout,
        })
    }

    fn query_url(&self, groq: &GroqQuery) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", &groq.query);
            for (name, value) in &groq.params {
                pairs.append_pair(&format!("${name}"), &value.to_string());
            }
        }
        url
    }

    async fn fetch<T: DeserializeOwned>(&self, groq: GroqQuery) -> Result<T, FetchError> {
        let url = self.query_url(&groq);
        debug!(endpoint = %self.endpoint, "querying CMS");

        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| self.map_transport_error(err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<Value>().await.ok();
            return Err(map_status(status, body.as_ref().and_then(error_message)));
        }

        response
            .json::<QueryResponse<T>>()
            .await
            .map(|body| body.result)
            .map_err(|err| FetchError::Unknown(format!("invalid CMS response: {err}")))
    }

    fn map_transport_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else if err.is_connect() {
            FetchError::Connectivity(err.to_string())
        } else {
            FetchError::Unknown(err.to_string())
        }
    }
}

#[async_trait]
impl ContentStore for CmsContentStore {
    fn supports_popularity(&self) -> bool {
        self.popularity_field.is_some()
    }

    async fn query_posts(&self, query: &ContentQuery) -> Result<ContentPage, FetchError> {
        let groq = groq::listing(query, self.popularity_field.as_deref());
        let result: ListingResult = self.fetch(groq).await?;
        Ok(ContentPage {
            records: decode_records(result.posts),
            total_count: result.total,
        })
    }

    async fn get_post(&self, slug: &str) -> Result<Option<ContentRecord>, FetchError> {
        let groq = groq::post_by_slug(slug, self.popularity_field.as_deref());
        let result: Value = self.fetch(groq).await?;
        Ok(decode_post(slug, result))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, FetchError> {
        let result: Vec<Value> = self.fetch(groq::categories()).await?;
        Ok(decode_categories(result))
    }

    async fn blog_settings(&self) -> Result<Option<BlogSettings>, FetchError> {
        let result: Value = self.fetch(groq::settings()).await?;
        Ok(decode_settings(result))
    }
}

/// A malformed document is skipped like any other bad record, so the caller
/// sees a missing post rather than a fetch failure.
fn decode_post(slug: &str, document: Value) -> Option<ContentRecord> {
    if document.is_null() {
        return None;
    }
    match decode_record(document) {
        Ok(record) => Some(record),
        Err(err) => {
            warn!(post = %slug, error = %err, "skipping malformed post");
            None
        }
    }
}

fn map_status(status: StatusCode, message: Option<String>) -> FetchError {
    let message = message.unwrap_or_else(|| format!("http status {status}"));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::Authorization(message),
        StatusCode::BAD_REQUEST => FetchError::Rejected(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            FetchError::Connectivity(message)
        }
        _ => FetchError::Unknown(message),
    }
}

/// Pulls a human-readable message out of the CMS error body, which is either
/// `{"error": {"description": ..}}` or `{"error": "..", "message": ".."}`.
fn error_message(body: &Value) -> Option<String> {
    body.pointer("/error/description")
        .or_else(|| body.get("message"))
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
