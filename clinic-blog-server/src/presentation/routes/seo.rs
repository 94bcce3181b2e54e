use axum::Router;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::handlers::seo::{robots, sitemap};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/sitemap.xml", get(sitemap))
        .route("/robots.txt", get(robots))
}
