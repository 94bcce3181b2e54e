pub(crate) mod content;
pub(crate) mod error;
pub(crate) mod pagination;
pub(crate) mod query;
pub(crate) mod site;
