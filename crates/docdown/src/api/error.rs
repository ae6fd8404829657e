//! Mapping of [`DocdownError`] onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::DocdownError;

use super::types::ErrorResponse;

/// A failed request: the status to answer with and the underlying error.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: DocdownError,
}

impl ApiError {
    pub fn new(status: StatusCode, error: DocdownError) -> Self {
        Self { status, error }
    }

    /// 400 Bad Request.
    pub fn validation(error: DocdownError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// 500 Internal Server Error.
    pub fn internal(error: DocdownError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }
}

/// Unknown formats are 415, known formats that failed to convert are 422.
impl From<DocdownError> for ApiError {
    fn from(error: DocdownError) -> Self {
        let status = match &error {
            DocdownError::Validation { .. } => StatusCode::BAD_REQUEST,
            DocdownError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            DocdownError::FileConversionFailed { .. } | DocdownError::Parsing { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            DocdownError::MissingDependency(_) => StatusCode::NOT_IMPLEMENTED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.error, "Request failed");
        } else {
            tracing::debug!(status = %self.status, error = %self.error, "Request rejected");
        }

        let body = ErrorResponse {
            error_type: error_type_name(&self.error).to_string(),
            message: self.error.to_string(),
            status_code: self.status.as_u16(),
        };
        (self.status, Json(body)).into_response()
    }
}

fn error_type_name(error: &DocdownError) -> &'static str {
    match error {
        DocdownError::Io(_) => "IoError",
        DocdownError::Parsing { .. } => "ParsingError",
        DocdownError::Validation { .. } => "ValidationError",
        DocdownError::Serialization { .. } => "SerializationError",
        DocdownError::MissingDependency(_) => "MissingDependencyError",
        DocdownError::Plugin { .. } => "PluginError",
        DocdownError::UnsupportedFormat(_) => "UnsupportedFormatError",
        DocdownError::FileConversionFailed { .. } => "FileConversionFailedError",
        DocdownError::Other(_) => "Error",
    }
}
