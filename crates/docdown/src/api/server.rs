//! API server setup and configuration.

use std::net::{IpAddr, SocketAddr};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::{ConversionConfig, DispatchEngine, DocdownError, Result};

use super::{
    handlers::{convert_handler, convert_url_handler, formats_handler, health_handler, info_handler},
    types::{ApiSizeLimits, ApiState},
};

/// (method, path, description) of every route, as reported by `/api/v1/info`.
pub(crate) const ENDPOINTS: &[(&str, &str, &str)] = &[
    ("POST", "/api/v1/convert", "Upload a file and convert it to Markdown"),
    ("POST", "/api/v1/convert/url", "Convert the document behind a URL to Markdown"),
    ("GET", "/api/v1/health", "Health check"),
    ("GET", "/api/v1/formats", "Registered converters and supported extensions"),
    ("GET", "/api/v1/info", "API information"),
];

/// Size limit from `DOCDOWN_MAX_REQUEST_BODY_BYTES`, else
/// `DOCDOWN_MAX_UPLOAD_SIZE_MB`, else the 50 MB default.
pub fn parse_size_limits_from_env() -> ApiSizeLimits {
    if let Ok(value) = std::env::var("DOCDOWN_MAX_REQUEST_BODY_BYTES") {
        match value.parse::<usize>() {
            Ok(bytes) if bytes > 0 => {
                tracing::info!(bytes, "Request body limit configured from environment");
                return ApiSizeLimits::new(bytes);
            }
            _ => tracing::warn!(
                "Ignoring DOCDOWN_MAX_REQUEST_BODY_BYTES='{}', must be a positive integer",
                value
            ),
        }
    }

    if let Ok(value) = std::env::var("DOCDOWN_MAX_UPLOAD_SIZE_MB") {
        match value.parse::<usize>() {
            Ok(mb) if mb > 0 => {
                tracing::info!(mb, "Upload size limit configured from environment");
                return ApiSizeLimits::from_mb(mb);
            }
            _ => tracing::warn!(
                "Ignoring DOCDOWN_MAX_UPLOAD_SIZE_MB='{}', must be a positive integer",
                value
            ),
        }
    }

    ApiSizeLimits::default()
}

/// Origins from `DOCDOWN_CORS_ORIGINS` (comma separated), else any origin.
fn cors_layer() -> CorsLayer {
    let origins: Vec<_> = std::env::var("DOCDOWN_CORS_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .filter_map(|origin| origin.trim().parse::<axum::http::HeaderValue>().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!(
            "CORS allows all origins. Set DOCDOWN_CORS_ORIGINS to a comma-separated list of origins for production."
        );
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        tracing::info!("CORS configured with {} allowed origin(s)", origins.len());
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Router over `engine` with the default size limit.
///
/// Public so the routes can be nested into another application.
///
/// # Examples
///
/// ```no_run
/// use axum::Router;
/// use docdown::{DispatchEngine, api::create_router};
///
/// # fn main() -> docdown::Result<()> {
/// let docdown_router = create_router(DispatchEngine::with_builtins()?);
/// let app: Router = Router::new().nest("/docdown", docdown_router);
/// # Ok(())
/// # }
/// ```
pub fn create_router(engine: DispatchEngine) -> Router {
    create_router_with_limits(engine, ApiSizeLimits::default())
}

/// Router over `engine` with an explicit size limit.
pub fn create_router_with_limits(engine: DispatchEngine, limits: ApiSizeLimits) -> Router {
    let state = ApiState { engine, limits };

    Router::new()
        .route("/api/v1/convert", post(convert_handler))
        .route("/api/v1/convert/url", post(convert_url_handler))
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/formats", get(formats_handler))
        .route("/api/v1/info", get(info_handler))
        .layer(DefaultBodyLimit::max(limits.max_request_body_bytes))
        .layer(RequestBodyLimitLayer::new(limits.max_request_body_bytes))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server with the built-in converters and a discovered `docdown.toml`.
///
/// # Environment Variables
///
/// ```bash
/// export DOCDOWN_MAX_REQUEST_BODY_BYTES=104857600
/// export DOCDOWN_CORS_ORIGINS="https://app.example.com"
/// ```
pub async fn serve(host: impl AsRef<str>, port: u16) -> Result<()> {
    let config = match ConversionConfig::discover()? {
        Some(config) => {
            tracing::info!("Loaded conversion config from discovered file");
            config
        }
        None => ConversionConfig::default(),
    };

    let engine = DispatchEngine::with_builtins()?.with_config(config);
    serve_with_engine(host, port, engine, parse_size_limits_from_env()).await
}

/// Start the server over an already configured engine.
///
/// # Errors
///
/// `Validation` for an unparsable host, `Io` when binding fails.
pub async fn serve_with_engine(
    host: impl AsRef<str>,
    port: u16,
    engine: DispatchEngine,
    limits: ApiSizeLimits,
) -> Result<()> {
    let ip: IpAddr = host
        .as_ref()
        .parse()
        .map_err(|e| DocdownError::validation(format!("Invalid host address: {}", e)))?;

    let addr = SocketAddr::new(ip, port);
    let app = create_router_with_limits(engine, limits);

    tracing::info!("Starting docdown API server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| DocdownError::Other(e.to_string()))?;

    Ok(())
}
