//! REST API server.
//!
//! An Axum router in front of a [`DispatchEngine`](crate::DispatchEngine).
//!
//! # Endpoints
//!
//! - `POST /api/v1/convert` - convert an uploaded file (multipart field `file`)
//! - `POST /api/v1/convert/url` - convert an `http(s):` or `data:` URL (JSON body)
//! - `GET /api/v1/health` - health check
//! - `GET /api/v1/formats` - registered converters and their extensions
//! - `GET /api/v1/info` - server information
//!
//! # Examples
//!
//! ```no_run
//! use docdown::api::serve;
//!
//! #[tokio::main]
//! async fn main() -> docdown::Result<()> {
//!     serve("127.0.0.1", 8000).await
//! }
//! ```
//!
//! ```bash
//! curl -F "file=@report.csv" http://localhost:8000/api/v1/convert
//! curl -H 'content-type: application/json' \
//!      -d '{"url": "https://example.com/feed.xml"}' \
//!      http://localhost:8000/api/v1/convert/url
//! ```

mod error;
mod handlers;
mod server;
mod types;

pub use error::ApiError;
pub use server::{create_router, create_router_with_limits, parse_size_limits_from_env, serve, serve_with_engine};
pub use types::{
    ApiSizeLimits, ApiState, ConvertResponse, ConvertUrlRequest, ConverterInfo, EndpointInfo, ErrorResponse,
    FormatsResponse, HealthResponse, InfoResponse,
};
