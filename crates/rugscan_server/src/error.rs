//! HTTP error type: `{"error": true, "details": "..."}` bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rugscan::ScanError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Too many requests from this IP, please try again later.")]
    RateLimited,
    #[error("Unauthorized: Invalid API key")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Server error while processing \"{0}\". Please try again.")]
    Internal(String),
}

impl ApiError {
    /// Map a scan failure. Not-found conditions keep their message.
    pub fn from_scan(err: ScanError) -> Self {
        match err {
            ScanError::NotFound(_) | ScanError::NoData(_) => ApiError::NotFound(err.to_string()),
            ScanError::EmptyQuery => ApiError::BadRequest("Invalid coin ID".to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "error": true, "details": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}
