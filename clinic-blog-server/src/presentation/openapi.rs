use utoipa::OpenApi;

use crate::application::listing_props::{
    BlogListingProps, CardImageProps, CategoryChipProps, FilterProps, PageLinkProps,
    PaginationProps, PostCardProps,
};
use crate::application::seo::{OgImage, OpenGraph, PostMetadata, TwitterCard};
use crate::domain::query::{SortKey, SortOrder};
use crate::presentation::app_error::ErrorBody;
use crate::presentation::handlers::blog::{
    AuthorDto, BlogSettingsDto, CategoryDto, CategoryRefDto, ImageDto, ListPostsResponseDto,
    PostDto, PostSummaryDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::blog::list_posts,
        crate::presentation::handlers::blog::listing_page,
        crate::presentation::handlers::blog::get_post,
        crate::presentation::handlers::blog::related_posts,
        crate::presentation::handlers::blog::get_post_metadata,
        crate::presentation::handlers::blog::list_categories,
        crate::presentation::handlers::seo::sitemap,
        crate::presentation::handlers::seo::robots
    ),
    components(
        schemas(
            ErrorBody,
            ListPostsResponseDto,
            PostSummaryDto,
            PostDto,
            CategoryRefDto,
            AuthorDto,
            ImageDto,
            BlogSettingsDto,
            CategoryDto,
            BlogListingProps,
            PostCardProps,
            CategoryChipProps,
            CardImageProps,
            PaginationProps,
            PageLinkProps,
            FilterProps,
            SortKey,
            SortOrder,
            PostMetadata,
            OpenGraph,
            OgImage,
            TwitterCard
        )
    ),
    tags(
        (name = "blog", description = "Blog listing and post endpoints"),
        (name = "seo", description = "Sitemap and crawler policy")
    )
)]
pub(crate) struct ApiDoc;
