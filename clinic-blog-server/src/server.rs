use axum::Router;
use tokio::net::TcpListener;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::infrastructure::settings::Settings;
use crate::presentation::middleware::cors::apply_cors;
use crate::presentation::middleware::limits::apply_limits;
use crate::presentation::middleware::trace::apply_trace;
use crate::presentation::openapi::ApiDoc;
use crate::presentation::{AppState, http_handlers};

pub(crate) async fn run_http(settings: &Settings, state: AppState) -> anyhow::Result<()> {
    let app = build_router(state);
    let app = apply_limits(app, settings);
    let app = apply_trace(app);
    let app = apply_cors(app, settings)?;

    let listener = TcpListener::bind(&settings.http_addr).await?;

    info!("HTTP server listening on {}", settings.http_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub(crate) fn build_router(state: AppState) -> Router {
    http_handlers::routes(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use chrono::{Duration, TimeZone, Utc};
    use quick_xml::Reader;
    use quick_xml::events::Event;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::build_router;
    use crate::application::blog_service::{BlogService, ListingConfig};
    use crate::data::content_query::ContentQuery;
    use crate::data::content_store::{ContentPage, ContentStore};
    use crate::data::repositories::memory::content_store::InMemoryContentStore;
    use crate::domain::content::{BlogSettings, Category, CategoryRef, ContentRecord, ImageRef};
    use crate::domain::error::FetchError;
    use crate::domain::site::SiteConfig;
    use crate::infrastructure::settings::CachePolicy;
    use crate::presentation::AppState;

    struct UnreachableStore;

    #[async_trait]
    impl ContentStore for UnreachableStore {
        fn supports_popularity(&self) -> bool {
            false
        }

        async fn query_posts(&self, _query: &ContentQuery) -> Result<ContentPage, FetchError> {
            Err(FetchError::Connectivity("connection refused".to_string()))
        }

        async fn get_post(&self, _slug: &str) -> Result<Option<ContentRecord>, FetchError> {
            Err(FetchError::Connectivity("connection refused".to_string()))
        }

        async fn list_categories(&self) -> Result<Vec<Category>, FetchError> {
            Err(FetchError::Connectivity("connection refused".to_string()))
        }

        async fn blog_settings(&self) -> Result<Option<BlogSettings>, FetchError> {
            Err(FetchError::Connectivity("connection refused".to_string()))
        }
    }

    fn post(i: i64, category: &str) -> ContentRecord {
        ContentRecord {
            id: format!("id-{i}"),
            slug: format!("post-{i}"),
            title: format!("Post {i}"),
            published_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(i),
            updated_at: None,
            categories: vec![CategoryRef {
                id: category.to_string(),
                slug: category.to_string(),
                title: category.to_string(),
            }],
            author: None,
            excerpt: format!("Excerpt {i}"),
            body: None,
            tags: Vec::new(),
            main_image: None,
            popularity: Some(i),
        }
    }

    fn state_with(store: Arc<dyn ContentStore>) -> AppState {
        let site = SiteConfig::new("https://www.aideamed.com", "Aidea:Med", None).expect("valid site");
        let service = Arc::new(BlogService::new(store, ListingConfig::default()));
        AppState::new(service, site, CachePolicy::default())
    }

    fn fixture_state() -> AppState {
        let mut posts: Vec<ContentRecord> = (1..=15).map(|i| post(i, "branding")).collect();
        posts.extend((16..=20).map(|i| post(i, "seo")));
        state_with(Arc::new(InMemoryContentStore::new(posts, Vec::new(), None)))
    }

    async fn get(state: AppState, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = build_router(state)
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request must build"),
            )
            .await
            .expect("router must respond");
        let status = response.status();
        let cache = response
            .headers()
            .get(header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body must be readable")
            .to_vec();
        (status, cache, body)
    }

    fn json(body: &[u8]) -> Value {
        serde_json::from_slice(body).expect("body must be json")
    }

    #[tokio::test]
    async fn second_page_of_popular_category() {
        let (status, cache, body) =
            get(fixture_state(), "/api/blog?page=2&category=branding&sort=popular").await;
        assert_eq!(status, StatusCode::OK);
        assert!(cache.is_some_and(|value| value.contains("s-maxage=60")));

        let body = json(&body);
        assert_eq!(body["page"], 2);
        assert_eq!(body["totalPages"], 2);
        assert_eq!(body["hasMore"], false);
        assert_eq!(body["total"], 15);
        assert_eq!(body["posts"].as_array().map(Vec::len), Some(6));
        assert_eq!(body["posts"][0]["slug"], "post-6");
    }

    #[tokio::test]
    async fn malformed_params_fall_back_to_defaults() {
        let (status, _, body) = get(fixture_state(), "/api/blog?page=abc&sort=weird&limit=-3").await;
        assert_eq!(status, StatusCode::OK);
        let body = json(&body);
        assert_eq!(body["page"], 1);
        assert_eq!(body["posts"].as_array().map(Vec::len), Some(9));
        assert_eq!(body["posts"][0]["slug"], "post-20");
    }

    #[tokio::test]
    async fn list_failure_is_json_500() {
        let (status, _, body) = get(state_with(Arc::new(UnreachableStore)), "/api/blog").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = json(&body);
        assert_eq!(body["error"], "failed to fetch content");
        assert!(body["timestamp"].is_string());
    }

    /// Parses a sitemap body to the end and returns every `<loc>` value.
    fn sitemap_locs(body: Vec<u8>) -> Vec<String> {
        let xml = String::from_utf8(body).expect("utf-8");
        let mut reader = Reader::from_str(&xml);
        reader.config_mut().trim_text(true);
        let mut in_loc = false;
        let mut locs = Vec::new();
        loop {
            match reader.read_event().expect("sitemap must be well-formed XML") {
                Event::Start(start) => in_loc = start.name().as_ref() == b"loc",
                Event::End(_) => in_loc = false,
                Event::Text(text) if in_loc => {
                    locs.push(text.unescape().expect("valid entities").into_owned());
                }
                Event::Eof => break,
                _ => {}
            }
        }
        locs
    }

    #[tokio::test]
    async fn sitemap_falls_back_with_200() {
        let (status, _, body) = get(state_with(Arc::new(UnreachableStore)), "/sitemap.xml").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            sitemap_locs(body),
            vec!["https://www.aideamed.com/", "https://www.aideamed.com/blog"]
        );
    }

    #[tokio::test]
    async fn sitemap_lists_posts() {
        let (status, cache, body) = get(fixture_state(), "/sitemap.xml").await;
        assert_eq!(status, StatusCode::OK);
        assert!(cache.is_some_and(|value| value.contains("s-maxage=3600")));
        let locs = sitemap_locs(body);
        assert!(locs.iter().any(|loc| loc == "https://www.aideamed.com/blog/post-20"));
    }

    #[tokio::test]
    async fn sitemap_survives_control_characters_in_titles() {
        let mut noisy = post(1, "seo");
        noisy.title = "Clinic\u{000B}SEO & more".to_string();
        noisy.main_image = Some(ImageRef {
            url: "https://cdn.example.com/a.jpg?w=1&h=2".to_string(),
            alt: None,
        });
        let state = state_with(Arc::new(InMemoryContentStore::new(vec![noisy], Vec::new(), None)));

        let (status, _, body) = get(state, "/sitemap.xml").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains(&0x0B));
        assert!(sitemap_locs(body).iter().any(|loc| loc == "https://www.aideamed.com/blog/post-1"));
    }

    #[tokio::test]
    async fn unknown_post_is_404() {
        let (status, _, body) = get(fixture_state(), "/api/blog/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json(&body)["error"], "not found");
    }

    #[tokio::test]
    async fn post_metadata_and_related() {
        let (status, _, body) = get(fixture_state(), "/api/blog/post-3/metadata").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["title"], "Post 3 | Aidea:Med");

        let (status, _, body) = get(fixture_state(), "/api/blog/post-3/related").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body).as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn listing_props_carry_filters_into_links() {
        let (status, _, body) = get(fixture_state(), "/api/blog-listing?category=branding").await;
        assert_eq!(status, StatusCode::OK);
        let body = json(&body);
        assert_eq!(
            body["pagination"]["next"]["href"],
            "https://www.aideamed.com/blog?page=2&category=branding"
        );
        assert_eq!(body["filters"]["category"], "branding");
    }

    #[tokio::test]
    async fn post_slugged_listing_is_reachable() {
        let mut listing = post(1, "seo");
        listing.slug = "listing".to_string();
        let state = state_with(Arc::new(InMemoryContentStore::new(vec![listing], Vec::new(), None)));

        let (status, _, body) = get(state, "/api/blog/listing").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["slug"], "listing");
    }

    #[tokio::test]
    async fn robots_and_health() {
        let (status, _, body) = get(fixture_state(), "/robots.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).expect("utf-8").contains("Sitemap: https://www.aideamed.com/sitemap.xml"));

        let (status, _, body) = get(fixture_state(), "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["status"], "ok");
    }
}
