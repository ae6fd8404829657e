//! API request handlers.
//!
//! Conversion is synchronous, so every conversion runs on tokio's blocking
//! pool.

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError, rejection::JsonRejection},
};
use std::collections::BTreeSet;
use std::time::Instant;

use crate::core::uri::extension_of;
use crate::{ConversionResult, DispatchEngine, DocdownError, StreamInfo};

use super::{
    error::ApiError,
    server::ENDPOINTS,
    types::{
        ApiState, ConvertResponse, ConvertUrlRequest, ConverterInfo, EndpointInfo, FormatsResponse, HealthResponse,
        InfoResponse,
    },
};

/// Content type browsers send when they do not know better; not a hint.
const OPAQUE_CONTENT_TYPE: &str = "application/octet-stream";

/// Convert an uploaded file.
///
/// POST /api/v1/convert
///
/// Multipart form fields:
/// - `file`: the document. Its file name and content type become hints.
/// - `keep_data_uris` (optional): `true` keeps embedded data URIs
///
/// Unknown formats answer 415, known formats that fail to convert answer 422.
pub async fn convert_handler(
    State(state): State<ApiState>,
    mut multipart: Multipart,
) -> Result<Json<ConvertResponse>, ApiError> {
    let started = Instant::now();
    let mut upload = None;
    let mut keep_data_uris = state.engine.config().keep_data_uris;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(bad_multipart)?;
                upload = Some((data, file_name, content_type));
            }
            "keep_data_uris" => {
                let value = field.text().await.map_err(bad_multipart)?;
                keep_data_uris = value.trim().eq_ignore_ascii_case("true");
            }
            _ => {}
        }
    }

    let Some((data, file_name, content_type)) = upload else {
        return Err(ApiError::validation(DocdownError::validation("No file provided")));
    };

    let hints = upload_hints(file_name.as_deref(), content_type.as_deref());
    let label = hints.filename.clone().unwrap_or_else(|| "<unnamed>".to_string());

    let engine = engine_for(&state, keep_data_uris);
    let result = run_blocking(move || engine.convert_bytes(&data, &hints)).await?;

    tracing::info!(file = %label, elapsed_ms = started.elapsed().as_millis() as u64, "Converted upload");
    Ok(Json(ConvertResponse::new(result, started.elapsed())))
}

/// Convert a remote document or a `data:` URL.
///
/// POST /api/v1/convert/url
///
/// JSON body: `{"url": "...", "keep_data_uris": false}`. `file:` URLs are
/// refused so clients cannot read the server's disk.
pub async fn convert_url_handler(
    State(state): State<ApiState>,
    payload: Result<Json<ConvertUrlRequest>, JsonRejection>,
) -> Result<Json<ConvertResponse>, ApiError> {
    let started = Instant::now();
    let Json(request) = payload.map_err(|rejection| {
        ApiError::validation(DocdownError::validation(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    })?;

    let url = request.url.trim().to_string();
    let scheme = url.split_once(':').map(|(scheme, _)| scheme.to_ascii_lowercase());
    if !matches!(scheme.as_deref(), Some("http" | "https" | "data")) {
        return Err(ApiError::validation(DocdownError::validation(format!(
            "Unsupported URL: {}. Expected an http:, https: or data: URL",
            url
        ))));
    }

    let engine = engine_for(&state, request.keep_data_uris);
    let target = url.clone();
    let result = run_blocking(move || engine.convert_uri(&target, &StreamInfo::new())).await?;

    tracing::info!(scheme = scheme.as_deref().unwrap_or_default(), elapsed_ms = started.elapsed().as_millis() as u64, "Converted URL");
    Ok(Json(ConvertResponse::new(result, started.elapsed())))
}

/// Health check endpoint handler.
///
/// GET /api/v1/health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Registered converters and the extensions they claim.
///
/// GET /api/v1/formats
pub async fn formats_handler(State(state): State<ApiState>) -> Json<FormatsResponse> {
    let converters: Vec<ConverterInfo> = state
        .engine
        .registry()
        .snapshot_sorted()
        .iter()
        .map(|registration| ConverterInfo {
            name: registration.name().to_string(),
            priority: registration.priority(),
            extensions: registration
                .converter()
                .supported_extensions()
                .iter()
                .map(|extension| extension.to_string())
                .collect(),
        })
        .collect();

    let formats: Vec<String> = converters
        .iter()
        .flat_map(|converter| converter.extensions.iter().map(|ext| ext.trim_start_matches('.').to_string()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    Json(FormatsResponse {
        count: formats.len(),
        formats,
        converters,
    })
}

/// Server info endpoint handler.
///
/// GET /api/v1/info
pub async fn info_handler(State(state): State<ApiState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        name: "docdown API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: ENDPOINTS
            .iter()
            .map(|(method, path, description)| EndpointInfo {
                method: method.to_string(),
                path: path.to_string(),
                description: description.to_string(),
            })
            .collect(),
        max_request_body_bytes: state.limits.max_request_body_bytes,
    })
}

/// Keeps the rejection's own status, so oversized uploads answer 413.
fn bad_multipart(err: MultipartError) -> ApiError {
    ApiError::new(err.status(), DocdownError::validation(err.body_text()))
}

/// Hints from the upload's file name (path components stripped) and declared type.
fn upload_hints(file_name: Option<&str>, content_type: Option<&str>) -> StreamInfo {
    let mut hints = StreamInfo::new();

    if let Some(name) = file_name
        .and_then(|name| name.rsplit(['/', '\\']).next())
        .map(str::trim)
        .filter(|name| !name.is_empty())
    {
        hints.extension = extension_of(name);
        hints.filename = Some(name.to_string());
    }

    hints.mimetype = content_type
        .map(str::trim)
        .filter(|mime| !mime.is_empty() && !mime.eq_ignore_ascii_case(OPAQUE_CONTENT_TYPE))
        .map(str::to_string);

    hints
}

fn engine_for(state: &ApiState, keep_data_uris: bool) -> DispatchEngine {
    let mut config = state.engine.config().clone();
    config.keep_data_uris = keep_data_uris;
    state.engine.clone().with_config(config)
}

async fn run_blocking<F>(job: F) -> Result<ConversionResult, ApiError>
where
    F: FnOnce() -> crate::Result<ConversionResult> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| ApiError::internal(DocdownError::Other(format!("Conversion task failed: {}", e))))?
        .map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_hints_strip_paths() {
        let hints = upload_hints(Some("C:\\Users\\me\\report.CSV"), Some("text/csv"));
        assert_eq!(hints.filename.as_deref(), Some("report.CSV"));
        assert_eq!(hints.extension.as_deref(), Some(".CSV"));
        assert_eq!(hints.mimetype.as_deref(), Some("text/csv"));

        let hints = upload_hints(Some("../../etc/passwd"), None);
        assert_eq!(hints.filename.as_deref(), Some("passwd"));
        assert_eq!(hints.extension, None);
    }

    #[test]
    fn test_upload_hints_ignore_opaque_type() {
        let hints = upload_hints(None, Some("application/octet-stream"));
        assert!(hints.is_empty());
    }
}
