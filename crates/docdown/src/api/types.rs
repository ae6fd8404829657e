//! API request and response types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{ConversionResult, DispatchEngine};

/// Request body size limit.
///
/// Defaults to 50 MB. Override with `DOCDOWN_MAX_REQUEST_BODY_BYTES` (bytes)
/// or `DOCDOWN_MAX_UPLOAD_SIZE_MB` when starting through [`super::serve`].
///
/// # Examples
///
/// ```
/// use docdown::api::ApiSizeLimits;
///
/// let limits = ApiSizeLimits::from_mb(200);
/// assert_eq!(limits.max_request_body_bytes, 200 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiSizeLimits {
    /// Maximum size of a request body, uploads and form fields included.
    pub max_request_body_bytes: usize,
}

impl Default for ApiSizeLimits {
    fn default() -> Self {
        Self::from_mb(50)
    }
}

impl ApiSizeLimits {
    pub fn new(max_request_body_bytes: usize) -> Self {
        Self { max_request_body_bytes }
    }

    pub fn from_mb(max_request_body_mb: usize) -> Self {
        Self::new(max_request_body_mb * 1024 * 1024)
    }
}

/// Shared handler state.
///
/// The engine carries the server's default options; requests may override
/// `keep_data_uris` on a per-call clone.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub engine: DispatchEngine,
    pub limits: ApiSizeLimits,
}

/// Successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub success: bool,
    pub markdown: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Wall-clock seconds spent converting, rounded to milliseconds.
    pub processing_time: f64,
}

impl ConvertResponse {
    pub(crate) fn new(result: ConversionResult, elapsed: Duration) -> Self {
        Self {
            success: true,
            markdown: result.markdown,
            title: result.title,
            processing_time: (elapsed.as_secs_f64() * 1000.0).round() / 1000.0,
        }
    }
}

/// Body of `POST /api/v1/convert/url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertUrlRequest {
    /// `http:`, `https:` or `data:` URL.
    pub url: String,
    #[serde(default)]
    pub keep_data_uris: bool,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// One registered converter, in dispatch order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterInfo {
    pub name: String,
    pub priority: f64,
    pub extensions: Vec<String>,
}

/// Supported formats response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatsResponse {
    /// Sorted, de-duplicated extensions across all converters.
    pub formats: Vec<String>,
    pub count: usize,
    pub converters: Vec<ConverterInfo>,
}

/// One route of the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointInfo {
    pub method: String,
    pub path: String,
    pub description: String,
}

/// Server information response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
    pub endpoints: Vec<EndpointInfo>,
    pub max_request_body_bytes: usize,
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error kind, e.g. `UnsupportedFormatError`
    pub error_type: String,
    pub message: String,
    pub status_code: u16,
}
