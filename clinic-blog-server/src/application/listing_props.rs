//! Render-ready props for the blog listing page.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use super::blog_service::ListPostsResult;
use crate::domain::content::ContentRecord;
use crate::domain::error::AssemblyError;
use crate::domain::query::{QueryParameters, SortKey, SortOrder};
use crate::domain::site::SiteConfig;

const BLOG_PATH: &str = "blog";
const DEFAULT_HEADING: &str = "Blog";

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BlogListingProps {
    pub(crate) heading: String,
    pub(crate) description: Option<String>,
    pub(crate) posts: Vec<PostCardProps>,
    pub(crate) pagination: PaginationProps,
    pub(crate) filters: FilterProps,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostCardProps {
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) href: String,
    pub(crate) excerpt: String,
    pub(crate) published_at: DateTime<Utc>,
    pub(crate) reading_minutes: u32,
    pub(crate) categories: Vec<CategoryChipProps>,
    pub(crate) image: Option<CardImageProps>,
    pub(crate) author: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub(crate) struct CategoryChipProps {
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) href: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub(crate) struct CardImageProps {
    pub(crate) url: String,
    pub(crate) alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub(crate) struct PageLinkProps {
    pub(crate) page: u32,
    pub(crate) href: String,
    pub(crate) active: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaginationProps {
    pub(crate) current_page: u32,
    pub(crate) total_pages: u32,
    pub(crate) total_count: u64,
    pub(crate) page_size: u32,
    pub(crate) has_more: bool,
    pub(crate) pages: Vec<PageLinkProps>,
    pub(crate) first: Option<PageLinkProps>,
    pub(crate) last: Option<PageLinkProps>,
    pub(crate) leading_ellipsis: bool,
    pub(crate) trailing_ellipsis: bool,
    pub(crate) previous: Option<PageLinkProps>,
    pub(crate) next: Option<PageLinkProps>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FilterProps {
    pub(crate) category: Option<String>,
    pub(crate) search: Option<String>,
    pub(crate) sort: SortKey,
    pub(crate) order: SortOrder,
    /// Link back to the unfiltered listing; `None` when nothing is filtered.
    pub(crate) clear_href: Option<String>,
}

pub(crate) fn listing_props(
    site: &SiteConfig,
    result: &ListPostsResult,
    default_page_size: u32,
) -> Result<BlogListingProps, AssemblyError> {
    let posts = result
        .posts
        .iter()
        .filter_map(|post| match post_card(site, post) {
            Ok(card) => Some(card),
            Err(err) => {
                warn!(post = %post.id, error = %err, "skipping post card");
                None
            }
        })
        .collect();

    let links = PageLinks {
        site,
        params: &result.params,
        default_page_size,
    };
    let pagination = &result.pagination;
    let current = pagination.current_page;

    let pages = pagination
        .window
        .iter()
        .map(|page| links.link(*page, current))
        .collect::<Result<Vec<_>, _>>()?;
    let first = pagination.first_page.map(|page| links.link(page, current)).transpose()?;
    let last = pagination.last_page.map(|page| links.link(page, current)).transpose()?;
    let leading_ellipsis = first.is_some() && pagination.window.first().is_some_and(|page| *page > 2);
    let trailing_ellipsis = last.is_some()
        && pagination
            .window
            .last()
            .is_some_and(|page| page + 1 < pagination.total_pages);

    let filtered = result.params.category.is_some() || result.params.search.is_some();
    let clear_href = if filtered {
        Some(site.url_for(BLOG_PATH)?.to_string())
    } else {
        None
    };

    let settings = result.settings.as_ref();
    Ok(BlogListingProps {
        heading: settings
            .and_then(|settings| settings.title.clone())
            .unwrap_or_else(|| DEFAULT_HEADING.to_string()),
        description: settings.and_then(|settings| settings.description.clone()),
        posts,
        pagination: PaginationProps {
            current_page: current,
            total_pages: pagination.total_pages,
            total_count: pagination.total_count,
            page_size: pagination.page_size,
            has_more: pagination.has_more,
            pages,
            first,
            last,
            leading_ellipsis,
            trailing_ellipsis,
            previous: pagination.previous_page().map(|page| links.link(page, current)).transpose()?,
            next: pagination.next_page().map(|page| links.link(page, current)).transpose()?,
        },
        filters: FilterProps {
            category: result.params.category.clone(),
            search: result.params.search.clone(),
            sort: result.params.sort,
            order: result.params.order,
            clear_href,
        },
    })
}

struct PageLinks<'a> {
    site: &'a SiteConfig,
    params: &'a QueryParameters,
    default_page_size: u32,
}

impl PageLinks<'_> {
    /// Keeps every non-default filter so paging never drops the user's query.
    fn link(&self, page: u32, current: u32) -> Result<PageLinkProps, AssemblyError> {
        let pairs = self.params.link_pairs(page, self.default_page_size);
        let href = self.site.url_with_query(BLOG_PATH, &pairs)?;
        Ok(PageLinkProps {
            page,
            href: href.to_string(),
            active: page == current,
        })
    }
}

fn post_card(site: &SiteConfig, post: &ContentRecord) -> Result<PostCardProps, AssemblyError> {
    let categories = post
        .categories
        .iter()
        .map(|category| {
            Ok(CategoryChipProps {
                slug: category.slug.clone(),
                title: category.title.clone(),
                href: site.category_url(&category.slug)?.to_string(),
            })
        })
        .collect::<Result<Vec<_>, AssemblyError>>()?;

    Ok(PostCardProps {
        slug: post.slug.clone(),
        title: post.title.clone(),
        href: site.post_url(&post.slug)?.to_string(),
        excerpt: post.excerpt.clone(),
        published_at: post.published_at,
        reading_minutes: post.reading_minutes(),
        categories,
        image: post.main_image.as_ref().map(|image| CardImageProps {
            url: image.url.clone(),
            alt: image.alt.clone().unwrap_or_else(|| post.title.clone()),
        }),
        author: post.author.as_ref().map(|author| author.name.clone()),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::domain::content::BlogSettings;
    use crate::domain::pagination::PaginationResult;
    use crate::domain::query::{PageSizePolicy, RawListingParams};

    fn site() -> SiteConfig {
        SiteConfig::new("https://www.aideamed.com", "Aidea:Med", None).expect("valid site")
    }

    fn post(slug: &str) -> ContentRecord {
        ContentRecord {
            id: slug.to_string(),
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            published_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            updated_at: None,
            categories: Vec::new(),
            author: None,
            excerpt: "short".to_string(),
            body: None,
            tags: Vec::new(),
            main_image: None,
            popularity: None,
        }
    }

    fn result(raw: RawListingParams, total: u64) -> ListPostsResult {
        let params = QueryParameters::normalize(&raw, PageSizePolicy::default());
        let pagination = PaginationResult::compute(params.page, total, params.page_size, 5);
        ListPostsResult {
            posts: vec![post("first"), post("bad/slug"), post("second")],
            params,
            pagination,
            settings: Some(BlogSettings {
                title: Some("Clinic Insights".to_string()),
                description: None,
            }),
        }
    }

    #[test]
    fn hrefs_keep_non_default_filters() {
        let raw = RawListingParams {
            page: Some("5".to_string()),
            category: Some("branding".to_string()),
            sort: Some("popular".to_string()),
            ..RawListingParams::default()
        };
        let props = listing_props(&site(), &result(raw, 90), 9).expect("props");
        let pagination = &props.pagination;

        assert_eq!(
            pagination.pages.iter().map(|link| link.page).collect::<Vec<_>>(),
            vec![3, 4, 5, 6, 7]
        );
        assert!(pagination.pages[2].active);
        assert_eq!(
            pagination.next.as_ref().map(|link| link.href.as_str()),
            Some("https://www.aideamed.com/blog?page=6&category=branding&sort=popular")
        );
        assert_eq!(
            pagination.first.as_ref().map(|link| link.href.as_str()),
            Some("https://www.aideamed.com/blog?category=branding&sort=popular")
        );
        assert!(pagination.leading_ellipsis);
        assert!(pagination.trailing_ellipsis);
        assert_eq!(
            props.filters.clear_href.as_deref(),
            Some("https://www.aideamed.com/blog")
        );
    }

    #[test]
    fn no_ellipsis_when_window_touches_edges() {
        let raw = RawListingParams {
            page: Some("2".to_string()),
            ..RawListingParams::default()
        };
        let props = listing_props(&site(), &result(raw, 54), 9).expect("props");
        let pagination = &props.pagination;
        assert_eq!(pagination.total_pages, 6);
        assert!(pagination.first.is_none());
        assert_eq!(pagination.last.as_ref().map(|link| link.page), Some(6));
        assert!(!pagination.trailing_ellipsis);
        assert_eq!(
            pagination.previous.as_ref().map(|link| link.href.as_str()),
            Some("https://www.aideamed.com/blog")
        );
        assert!(props.filters.clear_href.is_none());
    }

    #[test]
    fn cards_skip_unassemblable_posts_and_use_settings() {
        let props = listing_props(&site(), &result(RawListingParams::default(), 3), 9).expect("props");
        assert_eq!(props.heading, "Clinic Insights");
        let slugs: Vec<&str> = props.posts.iter().map(|card| card.slug.as_str()).collect();
        assert_eq!(slugs, vec!["first", "second"]);
        assert_eq!(props.posts[0].href, "https://www.aideamed.com/blog/first");
        assert_eq!(props.posts[0].reading_minutes, 1);
    }
}
