pub(crate) mod content_backend;
pub(crate) mod logging;
pub(crate) mod settings;
