use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::images::validate::ImageRejection;
use crate::store::StoreError;

/// Classified request failure. Every expected domain error is mapped onto one
/// of these kinds at its detection site; only genuinely unanticipated
/// failures end up in `Internal`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<String>,
    },
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: None,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation { message, details } => ErrorBody {
                error: message,
                details,
            },
            // Internal details go to the log, never to the caller.
            ApiError::Internal(source) => {
                error!(error = %source, "unhandled internal error");
                ErrorBody {
                    error: "internal server error".into(),
                    details: None,
                }
            }
            other => ErrorBody {
                error: other.to_string(),
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmailTaken => ApiError::Conflict(err.to_string()),
            StoreError::UserNotFound | StoreError::RequestNotFound => {
                ApiError::NotFound(err.to_string())
            }
            StoreError::AlreadyResolved(_) => ApiError::Conflict(err.to_string()),
        }
    }
}

impl From<ImageRejection> for ApiError {
    fn from(rejection: ImageRejection) -> Self {
        ApiError::Validation {
            message: "invalid profile image".into(),
            details: Some(rejection.to_string()),
        }
    }
}
