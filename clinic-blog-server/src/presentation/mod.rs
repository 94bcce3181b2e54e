use std::sync::Arc;

use crate::application::blog_service::BlogService;
use crate::data::content_store::ContentStore;
use crate::domain::site::SiteConfig;
use crate::infrastructure::settings::CachePolicy;

pub(crate) mod app_error;
pub(crate) mod handlers;
pub(crate) mod http_handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

pub(crate) type SharedBlogService = Arc<BlogService<Arc<dyn ContentStore>>>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) blog_service: SharedBlogService,
    pub(crate) site: Arc<SiteConfig>,
    pub(crate) cache: CachePolicy,
}

impl AppState {
    pub(crate) fn new(blog_service: SharedBlogService, site: SiteConfig, cache: CachePolicy) -> Self {
        Self {
            blog_service,
            site: Arc::new(site),
            cache,
        }
    }
}
