use std::sync::Arc;

use anyhow::Result;

use super::settings::{ContentBackend, Settings};
use crate::data::content_store::ContentStore;
use crate::data::repositories::cms::content_store::CmsContentStore;
use crate::data::repositories::memory::content_store::InMemoryContentStore;

pub(crate) async fn build_content_store(settings: &Settings) -> Result<Arc<dyn ContentStore>> {
    let store: Arc<dyn ContentStore> = match &settings.content_backend {
        ContentBackend::Cms => Arc::new(CmsContentStore::new(settings.cms_config()?)?),
        ContentBackend::Fixture(path) => Arc::new(InMemoryContentStore::from_file(path).await?),
    };
    Ok(store)
}
