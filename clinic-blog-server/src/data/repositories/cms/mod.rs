pub(crate) mod content_store;
pub(crate) mod groq;
