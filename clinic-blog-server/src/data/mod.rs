pub(crate) mod content_query;
pub(crate) mod content_store;
pub(crate) mod raw_record;
pub(crate) mod repositories;
