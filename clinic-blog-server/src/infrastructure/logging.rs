use anyhow::{Result, anyhow};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use super::settings::{ContentBackend, Settings};

/// `RUST_LOG` wins over `default_level`; an unparsable filter falls back to `info`.
pub fn init_logging(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}

/// Logs the effective configuration. The CMS token is never printed.
pub fn log_startup(settings: &Settings) {
    let backend = match &settings.content_backend {
        ContentBackend::Cms => format!(
            "cms:{}/{}",
            settings.cms_project_id.as_deref().unwrap_or("-"),
            settings.cms_dataset
        ),
        ContentBackend::Fixture(path) => format!("fixture:{}", path.display()),
    };
    info!(
        site = %settings.site_url,
        backend = %backend,
        authenticated = settings.cms_token.is_some(),
        popularity_field = settings.cms_popularity_field.as_deref().unwrap_or("-"),
        page_size = settings.blog_page_size,
        fetch_timeout_secs = settings.content_fetch_timeout_secs,
        "starting clinic blog server"
    );
}
