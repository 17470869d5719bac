//! HTTP error mapping

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use biolink_domains_core::error::CoreError;

/// Error returned by every handler.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The auth layer did not forward an account
    #[error("Missing X-Account-Id header. Sign in again")]
    Unauthorized,
}

impl ApiError {
    /// Stable machine-readable code for the dashboard
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::Core(err) => match err {
                CoreError::ValidationError(_) => "ValidationError",
                CoreError::DomainConflict { .. } => "DomainConflict",
                CoreError::TransientLookup(_) => "TransientLookup",
                CoreError::AccountNotFound(_) => "AccountNotFound",
                CoreError::DomainNotConfigured(_) => "DomainNotConfigured",
                CoreError::FeatureUnavailable(_) => "FeatureUnavailable",
                CoreError::StorageError(_) => "StorageError",
                CoreError::SerializationError(_) => "SerializationError",
            },
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Core(err) => match err {
                CoreError::ValidationError(_) => StatusCode::BAD_REQUEST,
                CoreError::DomainConflict { .. } => StatusCode::CONFLICT,
                CoreError::AccountNotFound(_) | CoreError::DomainNotConfigured(_) => {
                    StatusCode::NOT_FOUND
                }
                CoreError::FeatureUnavailable(_) => StatusCode::FORBIDDEN,
                CoreError::TransientLookup(_) => StatusCode::SERVICE_UNAVAILABLE,
                CoreError::StorageError(_) | CoreError::SerializationError(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = match self {
            Self::Core(err) if !err.is_expected() => {
                tracing::error!(code = self.code(), "Request failed: {err}");
                "Internal error, try again later".to_string()
            }
            _ => {
                tracing::warn!(code = self.code(), "Request rejected: {self}");
                self.to_string()
            }
        };

        HttpResponse::build(status).json(json!({
            "ok": false,
            "error": { "code": self.code(), "message": message },
        }))
    }
}
