pub(crate) mod blog_service;
pub(crate) mod listing_props;
pub(crate) mod robots;
pub(crate) mod seo;
pub(crate) mod sitemap;
