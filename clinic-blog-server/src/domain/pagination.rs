pub(crate) const DEFAULT_MAX_VISIBLE: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PaginationResult {
    pub(crate) current_page: u32,
    pub(crate) total_pages: u32,
    pub(crate) total_count: u64,
    pub(crate) page_size: u32,
    pub(crate) has_more: bool,
    /// Page numbers rendered as direct links.
    pub(crate) window: Vec<u32>,
    /// Set when page 1 is not part of `window`.
    pub(crate) first_page: Option<u32>,
    /// Set when the last page is not part of `window`.
    pub(crate) last_page: Option<u32>,
}

impl PaginationResult {
    /// `current_page` is taken as requested; a page past the end yields an
    /// empty listing and a window anchored on the last page.
    pub(crate) fn compute(
        current_page: u32,
        total_count: u64,
        page_size: u32,
        max_visible: u32,
    ) -> Self {
        let total_pages = total_pages(total_count, page_size);
        let has_more = u64::from(current_page) * u64::from(page_size) < total_count;
        let window = page_window(current_page, total_pages, max_visible);

        let first_page = (total_pages > 0 && !window.contains(&1)).then_some(1);
        let last_page = (total_pages > 0 && !window.contains(&total_pages)).then_some(total_pages);

        Self {
            current_page,
            total_pages,
            total_count,
            page_size,
            has_more,
            window,
            first_page,
            last_page,
        }
    }

    pub(crate) fn previous_page(&self) -> Option<u32> {
        if self.current_page <= 1 || self.total_pages == 0 {
            return None;
        }
        Some((self.current_page - 1).min(self.total_pages))
    }

    pub(crate) fn next_page(&self) -> Option<u32> {
        (self.current_page < self.total_pages).then(|| self.current_page + 1)
    }
}

pub(crate) fn total_pages(total_count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total_count.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Sliding window of page numbers centered on `current_page`.
pub(crate) fn page_window(current_page: u32, total_pages: u32, max_visible: u32) -> Vec<u32> {
    let max_visible = max_visible.max(1);
    if total_pages <= max_visible {
        return (1..=total_pages).collect();
    }

    let current = current_page.clamp(1, total_pages);
    let half = max_visible / 2;

    let start = if current <= half {
        1
    } else if current - half + max_visible - 1 > total_pages {
        total_pages - max_visible + 1
    } else {
        current - half
    };

    (start..start + max_visible).collect()
}
