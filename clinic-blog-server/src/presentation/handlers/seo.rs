use axum::{
    extract::State,
    http::{HeaderValue, header},
    response::IntoResponse,
};
use chrono::Utc;
use tracing::warn;

use super::cache_control;
use crate::application::robots::render_robots;
use crate::application::sitemap::{build_sitemap, fallback_sitemap};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// A fetch or rendering failure degrades to the static fallback sitemap.
#[utoipa::path(
    get,
    path = "/sitemap.xml",
    tag = "seo",
    responses(
        (status = 200, description = "XML sitemap", content_type = "application/xml", body = String),
        (status = 500, description = "Fallback sitemap could not be rendered")
    )
)]
pub(crate) async fn sitemap(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let rendered = match state.blog_service.sitemap_content().await {
        Ok(content) => build_sitemap(&state.site, &content, now),
        Err(err) => {
            warn!(error = %err, kind = err.kind(), "serving fallback sitemap");
            fallback_sitemap(&state.site, now)
        }
    };
    let xml = match rendered {
        Ok(xml) => xml,
        Err(err) => {
            warn!(error = %err, "sitemap rendering failed, serving fallback");
            fallback_sitemap(&state.site, now)?
        }
    };

    Ok((
        [(header::CONTENT_TYPE, HeaderValue::from_static(XML_CONTENT_TYPE))],
        cache_control(state.cache.sitemap_max_age),
        xml,
    ))
}

#[utoipa::path(
    get,
    path = "/robots.txt",
    tag = "seo",
    responses((status = 200, description = "Crawler policy", content_type = "text/plain", body = String))
)]
pub(crate) async fn robots(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_CONTENT_TYPE))],
        cache_control(state.cache.sitemap_max_age),
        render_robots(&state.site),
    )
}
