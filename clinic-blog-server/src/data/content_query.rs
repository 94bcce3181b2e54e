use crate::domain::query::{QueryParameters, SortKey, SortOrder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SortField {
    PublishedAt,
    Popularity,
}

/// Backend-neutral description of one listing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ContentQuery {
    pub(crate) offset: u64,
    pub(crate) limit: u32,
    /// Category slug that must be among the record's categories.
    pub(crate) category_filter: Option<String>,
    /// Case-insensitive match against title, excerpt and body.
    pub(crate) search_filter: Option<String>,
    pub(crate) sort_field: SortField,
    pub(crate) sort_direction: SortOrder,
}

impl ContentQuery {
    pub(crate) fn translate(params: &QueryParameters, supports_popularity: bool) -> Self {
        let limit = params.page_size;
        let offset = u64::from(params.page.saturating_sub(1)) * u64::from(limit);

        let sort_field = match params.sort {
            SortKey::Popular if supports_popularity => SortField::Popularity,
            SortKey::Popular | SortKey::Latest => SortField::PublishedAt,
        };

        Self {
            offset,
            limit,
            category_filter: params.category.clone(),
            search_filter: params.search.clone(),
            sort_field,
            sort_direction: params.order,
        }
    }

    /// Newest-first slice of every post, used for sitemaps and related posts.
    pub(crate) fn latest(limit: u32) -> Self {
        Self {
            offset: 0,
            limit,
            category_filter: None,
            search_filter: None,
            sort_field: SortField::PublishedAt,
            sort_direction: SortOrder::Desc,
        }
    }

    pub(crate) fn end(&self) -> u64 {
        self.offset + u64::from(self.limit)
    }
}
