use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use crate::application::blog_service::ListingConfig;
use crate::data::repositories::cms::content_store::CmsConfig;
use crate::domain::query::PageSizePolicy;
use crate::domain::site::SiteConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBackend {
    Cms,
    Fixture(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub http_addr: String,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub http_concurrency_limit: usize,
    pub http_request_timeout_secs: u64,
    pub site_url: String,
    pub site_name: String,
    pub site_twitter: Option<String>,
    pub content_backend: ContentBackend,
    pub cms_project_id: Option<String>,
    pub cms_dataset: String,
    pub cms_api_version: String,
    pub cms_token: Option<String>,
    pub cms_popularity_field: Option<String>,
    pub content_fetch_timeout_secs: u64,
    pub blog_page_size: u32,
    pub blog_max_page_size: u32,
    pub pagination_max_visible: u32,
    pub list_revalidate_secs: u64,
    pub sitemap_revalidate_secs: u64,
    pub sitemap_max_posts: u32,
}

/// `Cache-Control` lifetimes handed to the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub list_max_age: u64,
    pub sitemap_max_age: u64,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            list_max_age: 60,
            sitemap_max_age: 3600,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup; unset and blank values fall back
    /// to defaults.
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env = Source(lookup);

        let http_addr = env.string_or("HTTP_ADDR", "0.0.0.0:8080");
        let cors_origins = parse_cors_origins(
            &env.string_or("CORS_ORIGINS", "http://localhost:3000,http://127.0.0.1:3000"),
        );
        let log_level = env
            .get("LOG_LEVEL")
            .or_else(|| env.get("RUST_LOG"))
            .unwrap_or_else(|| "info".to_string());
        let http_concurrency_limit = env.positive("HTTP_CONCURRENCY_LIMIT", 256usize)?;
        let http_request_timeout_secs = env.positive("HTTP_REQUEST_TIMEOUT_SECS", 10u64)?;

        let site_url = env.string_or("SITE_URL", "https://www.aideamed.com");
        let site_name = env.string_or("SITE_NAME", "Aidea:Med");
        let site_twitter = Some(env.string_or("SITE_TWITTER", "@aideamed"));

        let content_backend = match env.string_or("CONTENT_BACKEND", "cms").to_lowercase().as_str() {
            "cms" => ContentBackend::Cms,
            "fixture" => ContentBackend::Fixture(PathBuf::from(
                env.get("CONTENT_FIXTURE_PATH")
                    .context("CONTENT_FIXTURE_PATH is required for the fixture backend")?,
            )),
            other => return Err(anyhow!("unknown CONTENT_BACKEND '{other}', expected cms or fixture")),
        };
        let cms_project_id = env.get("CMS_PROJECT_ID");
        if content_backend == ContentBackend::Cms && cms_project_id.is_none() {
            return Err(anyhow!("CMS_PROJECT_ID is required for the cms backend"));
        }

        let blog_page_size = env.positive("BLOG_PAGE_SIZE", 9u32)?;
        let blog_max_page_size = env.positive("BLOG_MAX_PAGE_SIZE", 50u32)?;
        if blog_page_size > blog_max_page_size {
            return Err(anyhow!("BLOG_PAGE_SIZE must not exceed BLOG_MAX_PAGE_SIZE"));
        }

        Ok(Self {
            http_addr,
            cors_origins,
            log_level,
            http_concurrency_limit,
            http_request_timeout_secs,
            site_url,
            site_name,
            site_twitter,
            content_backend,
            cms_project_id,
            cms_dataset: env.string_or("CMS_DATASET", "production"),
            cms_api_version: env.string_or("CMS_API_VERSION", "2023-05-03"),
            cms_token: env.get("CMS_TOKEN"),
            cms_popularity_field: env.get("CMS_POPULARITY_FIELD"),
            content_fetch_timeout_secs: env.positive("CONTENT_FETCH_TIMEOUT_SECS", 8u64)?,
            blog_page_size,
            blog_max_page_size,
            pagination_max_visible: env.positive("PAGINATION_MAX_VISIBLE", 5u32)?,
            list_revalidate_secs: env.positive("LIST_REVALIDATE_SECS", 60u64)?,
            sitemap_revalidate_secs: env.positive("SITEMAP_REVALIDATE_SECS", 3600u64)?,
            sitemap_max_posts: env.positive("SITEMAP_MAX_POSTS", 1000u32)?,
        })
    }

    pub(crate) fn listing_config(&self) -> ListingConfig {
        ListingConfig {
            page_size: PageSizePolicy {
                default: self.blog_page_size,
                max: self.blog_max_page_size,
            },
            max_visible: self.pagination_max_visible,
            fetch_timeout: self.fetch_timeout(),
            sitemap_limit: self.sitemap_max_posts,
            ..ListingConfig::default()
        }
    }

    pub(crate) fn site_config(&self) -> Result<SiteConfig> {
        SiteConfig::new(&self.site_url, self.site_name.clone(), self.site_twitter.clone())
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            list_max_age: self.list_revalidate_secs,
            sitemap_max_age: self.sitemap_revalidate_secs,
        }
    }

    pub(crate) fn cms_config(&self) -> Result<CmsConfig> {
        let project_id = self
            .cms_project_id
            .clone()
            .context("CMS_PROJECT_ID is required for the cms backend")?;
        Ok(CmsConfig {
            project_id,
            dataset: self.cms_dataset.clone(),
            api_version: self.cms_api_version.clone(),
            // Authenticated reads bypass the CDN.
            use_cdn: self.cms_token.is_none(),
            token: self.cms_token.clone(),
            popularity_field: self.cms_popularity_field.clone(),
            timeout: self.fetch_timeout(),
        })
    }

    fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.content_fetch_timeout_secs)
    }
}

struct Source<F>(F);

impl<F: Fn(&str) -> Option<String>> Source<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn string_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn positive<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr + PartialEq + Default,
    {
        let Some(raw) = self.get(key) else {
            return Ok(default);
        };
        let value = raw
            .parse::<T>()
            .map_err(|_| anyhow!("Failed to parse {key}, expecting positive integer"))?;
        if value == T::default() {
            return Err(anyhow!("{key} must be > 0"));
        }
        Ok(value)
    }
}

fn parse_cors_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
