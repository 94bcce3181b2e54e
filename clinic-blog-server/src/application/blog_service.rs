use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::data::content_query::ContentQuery;
use crate::data::content_store::ContentStore;
use crate::domain::content::{BlogSettings, Category, ContentRecord, is_url_safe_slug};
use crate::domain::error::{DomainError, FetchError};
use crate::domain::pagination::{DEFAULT_MAX_VISIBLE, PaginationResult};
use crate::domain::query::{PageSizePolicy, QueryParameters, RawListingParams};

/// How many recent posts are scored when picking related posts.
const RELATED_CANDIDATES: u32 = 50;

#[derive(Debug, Clone, Copy)]
pub(crate) struct ListingConfig {
    pub(crate) page_size: PageSizePolicy,
    pub(crate) max_visible: u32,
    pub(crate) fetch_timeout: Duration,
    pub(crate) sitemap_limit: u32,
    pub(crate) related_limit: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: PageSizePolicy::default(),
            max_visible: DEFAULT_MAX_VISIBLE,
            fetch_timeout: Duration::from_secs(8),
            sitemap_limit: 1000,
            related_limit: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ListPostsResult {
    pub(crate) posts: Vec<ContentRecord>,
    pub(crate) params: QueryParameters,
    pub(crate) pagination: PaginationResult,
    pub(crate) settings: Option<BlogSettings>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SitemapContent {
    pub(crate) posts: Vec<ContentRecord>,
    pub(crate) categories: Vec<Category>,
}

pub(crate) struct BlogService<S: ContentStore> {
    store: S,
    config: ListingConfig,
}

impl<S: ContentStore> BlogService<S> {
    pub(crate) fn new(store: S, config: ListingConfig) -> Self {
        Self { store, config }
    }

    pub(crate) fn config(&self) -> &ListingConfig {
        &self.config
    }

    /// Normalize → translate → fetch → paginate.
    pub(crate) async fn list_posts(
        &self,
        raw: &RawListingParams,
    ) -> Result<ListPostsResult, DomainError> {
        let params = QueryParameters::normalize(raw, self.config.page_size);
        let query = ContentQuery::translate(&params, self.store.supports_popularity());
        debug!(?query, "listing posts");

        let (page, settings) = tokio::join!(
            self.within_deadline(self.store.query_posts(&query)),
            self.within_deadline(self.store.blog_settings()),
        );
        let page = page?;
        let settings = settings.unwrap_or_else(|err| {
            warn!(error = %err, kind = err.kind(), "blog settings unavailable");
            None
        });

        let pagination = PaginationResult::compute(
            params.page,
            page.total_count,
            params.page_size,
            self.config.max_visible,
        );

        Ok(ListPostsResult {
            posts: page.records,
            params,
            pagination,
            settings,
        })
    }

    pub(crate) async fn get_post(&self, slug: &str) -> Result<ContentRecord, DomainError> {
        if !is_url_safe_slug(slug) {
            return Err(DomainError::NotFound(format!("post slug: {slug}")));
        }
        self.within_deadline(self.store.get_post(slug))
            .await?
            .ok_or(DomainError::NotFound(format!("post slug: {slug}")))
    }

    /// Categories ordered by weight (unweighted last), then title.
    pub(crate) async fn categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut categories = self.within_deadline(self.store.list_categories()).await?;
        categories.sort_by(|a, b| {
            a.order
                .unwrap_or(i64::MAX)
                .cmp(&b.order.unwrap_or(i64::MAX))
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(categories)
    }

    /// Same category scores 3, each shared tag 1; unrelated slots are filled
    /// with the latest posts.
    pub(crate) async fn related_posts(&self, slug: &str) -> Result<Vec<ContentRecord>, DomainError> {
        let current = self.get_post(slug).await?;
        let latest = ContentQuery::latest(RELATED_CANDIDATES);
        let candidates = self
            .within_deadline(self.store.query_posts(&latest))
            .await?
            .records
            .into_iter()
            .filter(|post| post.slug != current.slug)
            .collect::<Vec<_>>();

        let limit = self.config.related_limit;
        let mut scored = candidates
            .iter()
            .map(|post| {
                let category_score = if post.shares_category(&current) { 3 } else { 0 };
                (category_score + post.shared_tags(&current), post)
            })
            .filter(|(score, _)| *score > 0)
            .collect::<Vec<_>>();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let mut related: Vec<ContentRecord> = scored
            .into_iter()
            .take(limit)
            .map(|(_, post)| post.clone())
            .collect();

        if related.len() < limit {
            let fill = candidates
                .iter()
                .filter(|post| !related.iter().any(|picked| picked.slug == post.slug))
                .take(limit - related.len())
                .cloned()
                .collect::<Vec<_>>();
            related.extend(fill);
        }
        Ok(related)
    }

    /// Posts and categories for the sitemap. Only a post fetch failure is
    /// fatal; categories are optional.
    pub(crate) async fn sitemap_content(&self) -> Result<SitemapContent, FetchError> {
        let latest = ContentQuery::latest(self.config.sitemap_limit);
        let (posts, categories) = tokio::join!(
            self.within_deadline(self.store.query_posts(&latest)),
            self.within_deadline(self.store.list_categories()),
        );
        let posts = posts?.records;
        let categories = categories.unwrap_or_else(|err| {
            warn!(error = %err, kind = err.kind(), "categories unavailable for sitemap");
            Vec::new()
        });
        Ok(SitemapContent { posts, categories })
    }

    async fn within_deadline<T>(
        &self,
        fetch: impl Future<Output = Result<T, FetchError>>,
    ) -> Result<T, FetchError> {
        let deadline = self.config.fetch_timeout;
        match tokio::time::timeout(deadline, fetch).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(deadline)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use super::{BlogService, ListingConfig};
    use crate::data::content_query::{ContentQuery, SortField};
    use crate::data::content_store::{ContentPage, ContentStore};
    use crate::data::repositories::memory::content_store::InMemoryContentStore;
    use crate::domain::content::{BlogSettings, Category, CategoryRef, ContentRecord};
    use crate::domain::error::{DomainError, FetchError};
    use crate::domain::query::{RawListingParams, SortOrder};

    #[derive(Clone)]
    struct FakeContentStore {
        popularity: bool,
        last_query: Arc<Mutex<Option<ContentQuery>>>,
        page_result: Arc<Mutex<Option<ContentPage>>>,
        post_result: Arc<Mutex<Option<ContentRecord>>>,
        categories_result: Arc<Mutex<Vec<Category>>>,
        fail_settings: bool,
        fail_categories: bool,
        delay: Option<Duration>,
    }

    impl FakeContentStore {
        fn new() -> Self {
            Self {
                popularity: false,
                last_query: Arc::new(Mutex::new(None)),
                page_result: Arc::new(Mutex::new(Some(ContentPage::default()))),
                post_result: Arc::new(Mutex::new(None)),
                categories_result: Arc::new(Mutex::new(Vec::new())),
                fail_settings: false,
                fail_categories: false,
                delay: None,
            }
        }
    }

    #[async_trait]
    impl ContentStore for FakeContentStore {
        fn supports_popularity(&self) -> bool {
            self.popularity
        }

        async fn query_posts(&self, query: &ContentQuery) -> Result<ContentPage, FetchError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            *self.last_query.lock().expect("last_query mutex poisoned") = Some(query.clone());
            self.page_result
                .lock()
                .expect("page_result mutex poisoned")
                .clone()
                .ok_or_else(|| FetchError::Connectivity("connection refused".to_string()))
        }

        async fn get_post(&self, _slug: &str) -> Result<Option<ContentRecord>, FetchError> {
            Ok(self
                .post_result
                .lock()
                .expect("post_result mutex poisoned")
                .clone())
        }

        async fn list_categories(&self) -> Result<Vec<Category>, FetchError> {
            if self.fail_categories {
                return Err(FetchError::Connectivity("categories down".to_string()));
            }
            Ok(self
                .categories_result
                .lock()
                .expect("categories_result mutex poisoned")
                .clone())
        }

        async fn blog_settings(&self) -> Result<Option<BlogSettings>, FetchError> {
            if self.fail_settings {
                return Err(FetchError::Unknown("boom".to_string()));
            }
            Ok(Some(BlogSettings {
                title: Some("Blog".to_string()),
                description: None,
            }))
        }
    }

    fn raw(pairs: &[(&str, &str)]) -> RawListingParams {
        let mut raw = RawListingParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "page" => raw.page = value,
                "category" => raw.category = value,
                "search" => raw.search = value,
                "sort" => raw.sort = value,
                "order" => raw.order = value,
                "limit" => raw.limit = value,
                _ => {}
            }
        }
        raw
    }

    fn sample_post(i: u32, categories: &[&str], tags: &[&str]) -> ContentRecord {
        ContentRecord {
            id: format!("id-{i}"),
            slug: format!("post-{i}"),
            title: format!("Post {i}"),
            published_at: Utc.with_ymd_and_hms(2024, 1, i.min(28), 0, 0, 0).unwrap(),
            updated_at: None,
            categories: categories
                .iter()
                .map(|slug| CategoryRef {
                    id: slug.to_string(),
                    slug: slug.to_string(),
                    title: slug.to_string(),
                })
                .collect(),
            author: None,
            excerpt: String::new(),
            body: None,
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            main_image: None,
            popularity: Some(i64::from(i)),
        }
    }

    #[tokio::test]
    async fn list_posts_translates_normalized_params() {
        let mut store = FakeContentStore::new();
        store.popularity = true;
        let service = BlogService::new(store.clone(), ListingConfig::default());

        service
            .list_posts(&raw(&[
                ("page", "3"),
                ("category", "branding"),
                ("search", "\"implant*\""),
                ("sort", "popular"),
                ("order", "sideways"),
            ]))
            .await
            .expect("list_posts must succeed");

        let query = store
            .last_query
            .lock()
            .expect("last_query mutex poisoned")
            .clone()
            .expect("query must be captured");
        assert_eq!(query.offset, 18);
        assert_eq!(query.limit, 9);
        assert_eq!(query.category_filter.as_deref(), Some("branding"));
        assert_eq!(query.search_filter.as_deref(), Some("implant"));
        assert_eq!(query.sort_field, SortField::Popularity);
        assert_eq!(query.sort_direction, SortOrder::Desc);
    }

    #[tokio::test]
    async fn end_to_end_second_page_of_category() {
        let mut posts: Vec<ContentRecord> = (1..=15)
            .map(|i| sample_post(i, &["branding"], &[]))
            .collect();
        posts.extend((16..=20).map(|i| sample_post(i, &["seo"], &[])));
        let store = InMemoryContentStore::new(posts, Vec::new(), None);
        let service = BlogService::new(store, ListingConfig::default());

        let result = service
            .list_posts(&raw(&[("page", "2"), ("category", "branding"), ("sort", "popular")]))
            .await
            .expect("list_posts must succeed");

        assert_eq!(result.pagination.current_page, 2);
        assert_eq!(result.pagination.total_pages, 2);
        assert!(!result.pagination.has_more);
        assert_eq!(result.posts.len(), 6);
        assert!(result.posts.iter().all(|post| post.has_category("branding")));
    }

    #[tokio::test]
    async fn list_posts_propagates_fetch_error() {
        let store = FakeContentStore::new();
        *store.page_result.lock().expect("page_result mutex poisoned") = None;
        let service = BlogService::new(store, ListingConfig::default());

        let err = service
            .list_posts(&RawListingParams::default())
            .await
            .expect_err("fetch failure must propagate");
        assert!(matches!(err, DomainError::Fetch(FetchError::Connectivity(_))));
    }

    #[tokio::test]
    async fn settings_failure_does_not_fail_listing() {
        let mut store = FakeContentStore::new();
        store.fail_settings = true;
        let service = BlogService::new(store, ListingConfig::default());

        let result = service
            .list_posts(&RawListingParams::default())
            .await
            .expect("listing must survive settings failure");
        assert!(result.settings.is_none());
    }

    #[tokio::test]
    async fn slow_store_resolves_to_timeout() {
        let mut store = FakeContentStore::new();
        store.delay = Some(Duration::from_secs(5));
        let config = ListingConfig {
            fetch_timeout: Duration::from_millis(20),
            ..ListingConfig::default()
        };
        let service = BlogService::new(store, config);

        let err = service
            .list_posts(&RawListingParams::default())
            .await
            .expect_err("must time out");
        assert!(matches!(err, DomainError::Fetch(FetchError::Timeout(_))));
    }

    #[tokio::test]
    async fn get_post_returns_not_found_when_missing() {
        let service = BlogService::new(FakeContentStore::new(), ListingConfig::default());
        let err = service.get_post("missing").await.expect_err("post must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));

        let err = service.get_post("../etc").await.expect_err("unsafe slug");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn categories_are_ordered_by_weight_then_title() {
        let store = FakeContentStore::new();
        let category = |slug: &str, order: Option<i64>| Category {
            id: slug.to_string(),
            slug: slug.to_string(),
            title: slug.to_string(),
            description: None,
            order,
        };
        *store
            .categories_result
            .lock()
            .expect("categories_result mutex poisoned") = vec![
            category("zeta", None),
            category("beta", Some(2)),
            category("alpha", None),
            category("gamma", Some(1)),
        ];
        let service = BlogService::new(store, ListingConfig::default());

        let slugs: Vec<String> = service
            .categories()
            .await
            .expect("categories must load")
            .into_iter()
            .map(|c| c.slug)
            .collect();
        assert_eq!(slugs, vec!["gamma", "beta", "alpha", "zeta"]);
    }

    #[tokio::test]
    async fn related_posts_prefer_category_then_tags_then_latest() {
        let posts = vec![
            sample_post(1, &["seo"], &["dental"]),
            sample_post(2, &["branding"], &[]),
            sample_post(3, &["ads"], &["dental", "implant"]),
            sample_post(4, &["seo"], &[]),
            sample_post(5, &["ads"], &[]),
            sample_post(6, &["ads"], &["implant"]),
        ];
        let store = InMemoryContentStore::new(posts, Vec::new(), None);
        let config = ListingConfig {
            related_limit: 4,
            ..ListingConfig::default()
        };
        let service = BlogService::new(store, config);

        let related: Vec<String> = service
            .related_posts("post-1")
            .await
            .expect("related must load")
            .into_iter()
            .map(|post| post.slug)
            .collect();
        // post-4: same category (3); post-3: one shared tag (1); then latest fill.
        assert_eq!(related, vec!["post-4", "post-3", "post-6", "post-5"]);
    }

    #[tokio::test]
    async fn sitemap_content_tolerates_missing_categories() {
        let mut store = FakeContentStore::new();
        store.fail_categories = true;
        *store
            .categories_result
            .lock()
            .expect("categories_result mutex poisoned") = vec![Category {
            id: "c".to_string(),
            slug: "branding".to_string(),
            title: "Branding".to_string(),
            description: None,
            order: None,
        }];
        *store.page_result.lock().expect("page_result mutex poisoned") = Some(ContentPage {
            records: vec![sample_post(1, &[], &[])],
            total_count: 1,
        });
        let service = BlogService::new(store, ListingConfig::default());

        let content = service.sitemap_content().await.expect("sitemap content");
        assert_eq!(content.posts.len(), 1);
        assert!(content.categories.is_empty());
    }
}
