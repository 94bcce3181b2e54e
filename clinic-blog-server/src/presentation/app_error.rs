use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::domain::error::{AssemblyError, DomainError};

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ErrorBody {
    pub(crate) error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) details: Option<String>,
    pub(crate) timestamp: DateTime<Utc>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            AppError::Domain(DomainError::NotFound(what)) => {
                (StatusCode::NOT_FOUND, "not found".to_string(), Some(what))
            }
            AppError::Domain(DomainError::Fetch(err)) => {
                error!(error = %err, kind = err.kind(), "content fetch failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to fetch content".to_string(),
                    Some(err.kind().to_string()),
                )
            }
            AppError::Assembly(err) => {
                warn!(error = %err, "response assembly failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to assemble response".to_string(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            error,
            details,
            timestamp: Utc::now(),
        };
        (status, Json(body)).into_response()
    }
}
