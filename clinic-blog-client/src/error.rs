use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by `clinic-blog-client`.
pub enum BlogClientError {
    /// Transport failure (`reqwest`): connection, timeout or undecodable body.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The requested post does not exist.
    #[error("not found")]
    NotFound,

    /// The server answered with an error body, usually because the content
    /// store behind it is unavailable.
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// `error` field of the response body.
        message: String,
        /// `details` field of the response body, if any.
        details: Option<String>,
    },

    /// The request could not be built (bad base url, bad slug).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Reading or writing client-local state failed.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result of `clinic-blog-client` operations.
pub type BlogClientResult<T> = Result<T, BlogClientError>;

impl BlogClientError {
    pub(crate) fn from_http_status(
        status: reqwest::StatusCode,
        message: Option<String>,
        details: Option<String>,
    ) -> Self {
        match status {
            reqwest::StatusCode::NOT_FOUND => Self::NotFound,
            _ => Self::Server {
                status: status.as_u16(),
                message: message.unwrap_or_else(|| format!("http status {status}")),
                details,
            },
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None, None);
        }
        Self::Http(err)
    }
}
