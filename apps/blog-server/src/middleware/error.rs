//! Error handling - RFC 7807 compliant responses.

use actix_web::{
    HttpMessage, HttpRequest, HttpResponse, ResponseError, error::JsonPayloadError,
    http::StatusCode,
};
use inkwell_core::DomainError;
use inkwell_core::error::RepoError;
use inkwell_shared::ErrorResponse;
use std::fmt;

use crate::observability::{RequestId, current_request_id};

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Internal(detail) => {
                // Log internal errors
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };
        if let Some(request_id) = current_request_id() {
            error = error.with_request_id(request_id);
        }

        HttpResponse::build(self.status_code()).json(error)
    }
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, key } => {
                AppError::NotFound(format!("{} '{}' not found", entity_type, key))
            }
            DomainError::Repository(err) => err.into(),
            DomainError::Mail(err) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Constraint(msg) => {
                tracing::warn!("Constraint violation: {}", msg);
                AppError::BadRequest(msg)
            }
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

/// Turn malformed JSON bodies into 400 problem responses carrying the request id.
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    let mut problem = ErrorResponse::bad_request(err.to_string());
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.as_str().to_string())
        .or_else(current_request_id);
    if let Some(request_id) = request_id {
        problem = problem.with_request_id(request_id);
    }

    let response = HttpResponse::BadRequest().json(problem);
    actix_web::error::InternalError::from_response(err, response).into()
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
