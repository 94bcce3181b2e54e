use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Failure talking to the external content store.
///
/// The variant is only used for diagnostics; callers treat every variant the
/// same way and pick a degraded response.
#[derive(Debug, Error)]
pub(crate) enum FetchError {
    #[error("content store unreachable: {0}")]
    Connectivity(String),

    #[error("content store did not respond within {0:?}")]
    Timeout(Duration),

    #[error("content store rejected credentials: {0}")]
    Authorization(String),

    #[error("content store rejected query: {0}")]
    Rejected(String),

    #[error("content store error: {0}")]
    Unknown(String),
}

impl FetchError {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            FetchError::Connectivity(_) | FetchError::Timeout(_) => "connectivity",
            FetchError::Authorization(_) => "authorization",
            FetchError::Rejected(_) => "rejected_query",
            FetchError::Unknown(_) => "unknown",
        }
    }
}

/// A fetched record that cannot be turned into output. Recovered per record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum AssemblyError {
    #[error("record is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("record field '{field}' is invalid: {message}")]
    InvalidField { field: String, message: String },
}

impl AssemblyError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::FetchError;

    #[test]
    fn timeout_is_reported_as_connectivity() {
        let err = FetchError::Timeout(Duration::from_secs(8));
        assert_eq!(err.kind(), "connectivity");
        assert!(err.to_string().contains("8s"));
    }

    #[test]
    fn authorization_kind_is_distinct() {
        let err = FetchError::Authorization("401".to_string());
        assert_eq!(err.kind(), "authorization");
    }
}
