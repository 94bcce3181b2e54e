use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::cache_control;
use crate::application::blog_service::ListPostsResult;
use crate::application::listing_props::{BlogListingProps, listing_props};
use crate::application::seo::{PostMetadata, post_metadata};
use crate::domain::content::{BlogSettings, Category, ContentRecord};
use crate::domain::query::RawListingParams;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryRefDto {
    pub(crate) id: String,
    pub(crate) slug: String,
    pub(crate) title: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthorDto {
    pub(crate) name: String,
    pub(crate) slug: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ImageDto {
    pub(crate) url: String,
    pub(crate) alt: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostSummaryDto {
    pub(crate) id: String,
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) published_at: DateTime<Utc>,
    pub(crate) updated_at: Option<DateTime<Utc>>,
    pub(crate) excerpt: String,
    pub(crate) categories: Vec<CategoryRefDto>,
    pub(crate) author: Option<AuthorDto>,
    pub(crate) tags: Vec<String>,
    pub(crate) main_image: Option<ImageDto>,
    pub(crate) reading_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) popularity: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostDto {
    #[serde(flatten)]
    pub(crate) summary: PostSummaryDto,
    /// Rich text as stored in the CMS.
    #[schema(value_type = Option<Object>)]
    pub(crate) body: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct BlogSettingsDto {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListPostsResponseDto {
    pub(crate) posts: Vec<PostSummaryDto>,
    pub(crate) total: u64,
    pub(crate) page: u32,
    pub(crate) total_pages: u32,
    pub(crate) has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) settings: Option<BlogSettingsDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryDto {
    pub(crate) id: String,
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
}

impl From<ContentRecord> for PostSummaryDto {
    fn from(post: ContentRecord) -> Self {
        let reading_minutes = post.reading_minutes();
        Self {
            id: post.id,
            slug: post.slug,
            title: post.title,
            published_at: post.published_at,
            updated_at: post.updated_at,
            excerpt: post.excerpt,
            categories: post
                .categories
                .into_iter()
                .map(|category| CategoryRefDto {
                    id: category.id,
                    slug: category.slug,
                    title: category.title,
                })
                .collect(),
            author: post.author.map(|author| AuthorDto {
                name: author.name,
                slug: author.slug,
            }),
            tags: post.tags,
            main_image: post.main_image.map(|image| ImageDto {
                url: image.url,
                alt: image.alt,
            }),
            reading_minutes,
            popularity: post.popularity,
        }
    }
}

impl From<ContentRecord> for PostDto {
    fn from(mut post: ContentRecord) -> Self {
        let reading_minutes = post.reading_minutes();
        let body = post.body.take();
        let mut summary = PostSummaryDto::from(post);
        summary.reading_minutes = reading_minutes;
        Self { summary, body }
    }
}

impl From<BlogSettings> for BlogSettingsDto {
    fn from(settings: BlogSettings) -> Self {
        Self {
            title: settings.title,
            description: settings.description,
        }
    }
}

impl From<ListPostsResult> for ListPostsResponseDto {
    fn from(result: ListPostsResult) -> Self {
        Self {
            posts: result.posts.into_iter().map(PostSummaryDto::from).collect(),
            total: result.pagination.total_count,
            page: result.pagination.current_page,
            total_pages: result.pagination.total_pages,
            has_more: result.pagination.has_more,
            settings: result.settings.map(BlogSettingsDto::from),
        }
    }
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            slug: category.slug,
            title: category.title,
            description: category.description,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/blog",
    tag = "blog",
    params(
        ("page" = Option<String>, Query, description = "1-based page; invalid values fall back to 1"),
        ("category" = Option<String>, Query, description = "Category slug filter"),
        ("search" = Option<String>, Query, description = "Free-text search"),
        ("sort" = Option<String>, Query, description = "latest (default) or popular"),
        ("order" = Option<String>, Query, description = "desc (default) or asc"),
        ("limit" = Option<String>, Query, description = "Page size, up to the configured maximum")
    ),
    responses(
        (status = 200, description = "Posts listed", body = ListPostsResponseDto),
        (status = 500, description = "Content store unavailable", body = crate::presentation::app_error::ErrorBody)
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> AppResult<impl IntoResponse> {
    let result = state
        .blog_service
        .list_posts(&RawListingParams::from(&query))
        .await?;

    Ok((
        cache_control(state.cache.list_max_age),
        Json(ListPostsResponseDto::from(result)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/blog-listing",
    tag = "blog",
    params(
        ("page" = Option<String>, Query, description = "1-based page"),
        ("category" = Option<String>, Query, description = "Category slug filter"),
        ("search" = Option<String>, Query, description = "Free-text search"),
        ("sort" = Option<String>, Query, description = "latest or popular"),
        ("order" = Option<String>, Query, description = "desc or asc"),
        ("limit" = Option<String>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Listing page props", body = BlogListingProps),
        (status = 500, description = "Content store unavailable", body = crate::presentation::app_error::ErrorBody)
    )
)]
pub(crate) async fn listing_page(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> AppResult<impl IntoResponse> {
    let result = state
        .blog_service
        .list_posts(&RawListingParams::from(&query))
        .await?;
    let default_page_size = state.blog_service.config().page_size.default;
    let props = listing_props(&state.site, &result, default_page_size)?;

    Ok((cache_control(state.cache.list_max_age), Json(props)))
}

#[utoipa::path(
    get,
    path = "/api/blog/{slug}",
    tag = "blog",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Post found", body = PostDto),
        (status = 404, description = "Post not found", body = crate::presentation::app_error::ErrorBody),
        (status = 500, description = "Content store unavailable", body = crate::presentation::app_error::ErrorBody)
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let post = state.blog_service.get_post(&slug).await?;
    Ok((cache_control(state.cache.list_max_age), Json(PostDto::from(post))))
}

#[utoipa::path(
    get,
    path = "/api/blog/{slug}/related",
    tag = "blog",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Related posts", body = [PostSummaryDto]),
        (status = 404, description = "Post not found", body = crate::presentation::app_error::ErrorBody),
        (status = 500, description = "Content store unavailable", body = crate::presentation::app_error::ErrorBody)
    )
)]
pub(crate) async fn related_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let posts = state.blog_service.related_posts(&slug).await?;
    let posts: Vec<PostSummaryDto> = posts.into_iter().map(PostSummaryDto::from).collect();
    Ok((cache_control(state.cache.list_max_age), Json(posts)))
}

#[utoipa::path(
    get,
    path = "/api/blog/{slug}/metadata",
    tag = "blog",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "SEO metadata and structured data", body = PostMetadata),
        (status = 404, description = "Post not found", body = crate::presentation::app_error::ErrorBody),
        (status = 500, description = "Content store unavailable", body = crate::presentation::app_error::ErrorBody)
    )
)]
pub(crate) async fn get_post_metadata(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let post = state.blog_service.get_post(&slug).await?;
    let metadata = post_metadata(&state.site, &post)?;
    Ok((cache_control(state.cache.list_max_age), Json(metadata)))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "blog",
    responses(
        (status = 200, description = "Categories ordered by weight", body = [CategoryDto]),
        (status = 500, description = "Content store unavailable", body = crate::presentation::app_error::ErrorBody)
    )
)]
pub(crate) async fn list_categories(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let categories: Vec<CategoryDto> = state
        .blog_service
        .categories()
        .await?
        .into_iter()
        .map(CategoryDto::from)
        .collect();
    Ok((cache_control(state.cache.sitemap_max_age), Json(categories)))
}
