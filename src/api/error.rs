use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{ApiResponse, FieldError};
use crate::constants::messages;
use crate::services::{AuthError, CatalogError, ReportError};

/// Development mode logs the error chain with a backtrace for 500s.
static VERBOSE_ERRORS: AtomicBool = AtomicBool::new(false);

pub fn set_verbose_errors(enabled: bool) {
    VERBOSE_ERRORS.store(enabled, Ordering::Relaxed);
}

#[derive(Debug)]
pub enum ApiError {
    Validation(Vec<FieldError>),

    BadRequest(String),

    Unauthorized(String),

    Forbidden(String),

    NotFound(String),

    Conflict(String),

    TooManyRequests { retry_after_secs: u64 },

    DatabaseError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "Validation failed on {} field(s)", errors.len()),
            Self::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::TooManyRequests { retry_after_secs } => {
                write!(f, "Too many requests, retry after {retry_after_secs}s")
            }
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::invalid(messages::VALIDATION_FAILED, errors),
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiResponse::error(msg)),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, ApiResponse::error(msg)),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, ApiResponse::error(msg)),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, ApiResponse::error(msg)),
            Self::Conflict(msg) => (StatusCode::CONFLICT, ApiResponse::error(msg)),
            Self::TooManyRequests { retry_after_secs } => {
                let body = ApiResponse::<()>::error(messages::TOO_MANY_LOGIN_ATTEMPTS);
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(header::RETRY_AFTER, retry_after_secs.to_string())],
                    Json(body),
                )
                    .into_response();
            }
            Self::DatabaseError(detail) => {
                log_server_error("database", &detail);
                server_error()
            }
            Self::InternalError(detail) => {
                log_server_error("internal", &detail);
                server_error()
            }
        };

        (status, Json(body)).into_response()
    }
}

fn server_error() -> (StatusCode, ApiResponse<()>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ApiResponse::error(messages::SERVER_ERROR),
    )
}

fn log_server_error(kind: &str, detail: &str) {
    if VERBOSE_ERRORS.load(Ordering::Relaxed) {
        let backtrace = std::backtrace::Backtrace::force_capture();
        tracing::error!(kind, error = %detail, backtrace = %backtrace, "Request failed");
    } else {
        tracing::error!(kind, error = %detail, "Request failed");
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(format!("{err:#}"))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "Rejected JSON body");
        Self::BadRequest(messages::VALIDATION_FAILED.to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(_) => Self::NotFound(messages::CONTENT_NOT_FOUND.to_string()),
            CatalogError::MissingReference { .. } => Self::NotFound(err.to_string()),
            CatalogError::Duplicate { .. } => Self::Conflict(err.to_string()),
            CatalogError::Validation(msg) => Self::BadRequest(msg),
            CatalogError::Database(msg) => Self::DatabaseError(msg),
            CatalogError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::NotFound(_) => Self::NotFound(err.to_string()),
            ReportError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                Self::Unauthorized(messages::INVALID_CREDENTIALS.to_string())
            }
            AuthError::UserNotFound => Self::Unauthorized(messages::NOT_AUTHENTICATED.to_string()),
            AuthError::Forbidden => Self::Forbidden(messages::FORBIDDEN.to_string()),
            AuthError::Validation(msg) => Self::BadRequest(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl ApiError {
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::Validation(errors)
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized(messages::NOT_AUTHENTICATED.to_string())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// Rounds up so clients never retry a second early.
    pub fn too_many_requests(retry_after: std::time::Duration) -> Self {
        let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
        Self::TooManyRequests {
            retry_after_secs: secs.max(1),
        }
    }
}
