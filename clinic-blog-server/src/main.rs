use std::sync::Arc;

use anyhow::Result;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::blog_service::BlogService;
use infrastructure::content_backend::build_content_store;
use infrastructure::logging::{init_logging, log_startup};
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;
    log_startup(&settings);

    let site = settings.site_config()?;
    let store = build_content_store(&settings).await?;
    let blog_service = Arc::new(BlogService::new(store, settings.listing_config()));
    let state = AppState::new(blog_service, site, settings.cache_policy());

    server::run_http(&settings, state).await
}
