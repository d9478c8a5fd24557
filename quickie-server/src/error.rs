//! HTTP-facing error type

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quickie_providers::ProviderError;
use serde::Serialize;
use thiserror::Error;

const REDACTED_DETAIL: &str = "Internal server error";

/// Failure of a chat operation, rendered as `{"detail": ...}`
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed request or missing prompt
    #[error("{0}")]
    BadRequest(String),

    /// The generative model call failed
    #[error("{0}")]
    Generation(#[from] ProviderError),

    /// The history cache failed
    #[error("{0}")]
    Cache(#[from] quickie_core::Error),

    /// Server error with upstream detail removed
    #[error("{}", REDACTED_DETAIL)]
    Redacted,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Generation(_) | ApiError::Cache(_) | ApiError::Redacted => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Drop upstream detail from server errors; client errors are kept
    pub fn redacted(self) -> Self {
        match self {
            ApiError::BadRequest(_) => self,
            _ => ApiError::Redacted,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ProviderError::ApiError("quota".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(quickie_core::Error::Cache("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_detail_carries_underlying_message() {
        let err = ApiError::from(quickie_core::Error::Cache("connection refused".into()));
        assert_eq!(err.to_string(), "Cache error: connection refused");
    }

    #[test]
    fn test_redaction_keeps_client_errors() {
        let bad = ApiError::BadRequest("prompt must not be empty".into()).redacted();
        assert_eq!(bad.to_string(), "prompt must not be empty");

        let upstream = ApiError::from(ProviderError::ApiError("key=secret".into())).redacted();
        assert_eq!(upstream.to_string(), REDACTED_DETAIL);
        assert_eq!(upstream.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
