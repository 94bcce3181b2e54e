use axum::Router;
use axum::routing::get;

use super::AppState;
use super::handlers::blog::{list_categories, listing_page};

pub(crate) mod blog;
pub(crate) mod seo;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .nest("/api/blog", blog::router())
        .route("/api/blog-listing", get(listing_page))
        .route("/api/categories", get(list_categories))
        .merge(seo::router())
}
