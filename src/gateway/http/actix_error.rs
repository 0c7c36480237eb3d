//! Actix Web error adapters for Skipper errors.
//!
//! This module provides implementations of Actix Web error traits
//! for the Skipper error types, allowing them to be used in Actix Web handlers.

use crate::error::Error;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;

fn error_status(error: &Error) -> StatusCode {
    match error {
        Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        Error::ContainerNotFound(_) => StatusCode::NOT_FOUND,
        Error::Serialization(_) => StatusCode::BAD_REQUEST,
        Error::RuntimeUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn json_error(status_code: StatusCode, message: String) -> HttpResponse {
    HttpResponse::build(status_code)
        .content_type("application/json")
        .json(json!({
            "error": message,
            "code": status_code.as_u16()
        }))
}

impl ResponseError for Error {
    fn error_response(&self) -> HttpResponse {
        json_error(self.status_code(), self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        error_status(self)
    }
}

/// Errors raised while accepting a request
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Gateway is shutting down")]
    ShuttingDown,

    #[error("Internal server error: {0}")]
    Internal(#[from] Error),
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        json_error(self.status_code(), self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(e) => error_status(e),
        }
    }
}
