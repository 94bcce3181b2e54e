use axum::http::{HeaderValue, header};

pub(crate) mod blog;
pub(crate) mod seo;

/// Shared-cache revalidation window for CDN-cached responses.
pub(crate) fn cache_control(max_age_secs: u64) -> [(header::HeaderName, HeaderValue); 1] {
    let value = format!("public, s-maxage={max_age_secs}, stale-while-revalidate={max_age_secs}");
    let value = HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("no-cache"));
    [(header::CACHE_CONTROL, value)]
}
