use actix_web::{error::BlockingError, http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ApiResponse;

/// Rejections raised before any image work starts.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("file size of {size} bytes exceeds maximum allowed size of {max} bytes")]
    FileTooLarge { size: u64, max: u64 },
    #[error("unsupported file format '{extension}'. Allowed formats: {}", .allowed.join(", "))]
    UnsupportedFormat {
        extension: String,
        allowed: Vec<String>,
    },
    #[error("No image file provided")]
    MissingFile,
    #[error("Invalid filename")]
    InvalidFilename,
    #[error("malformed upload: {0}")]
    MalformedForm(String),
}

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("failed to read upload: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("failed to encode WebP: {0}")]
    Encode(String),
    #[error("failed to write output file: {0}")]
    Write(#[source] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to compress image: {0}")]
    Processing(#[from] TranscodeError),
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<BlockingError> for ApiError {
    fn from(err: BlockingError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Processing(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiResponse::<()>::failure(self.to_string()))
    }
}
