use axum::Router;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::handlers::blog::{
    get_post, get_post_metadata, list_posts, related_posts,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts))
        .route("/{slug}", get(get_post))
        .route("/{slug}/related", get(related_posts))
        .route("/{slug}/metadata", get(get_post_metadata))
}
