//! Blocking HTTP fetch for `http:` and `https:` sources.

use crate::core::uri::FetchedResponse;
use crate::{DocdownError, Result};
use reqwest::header::{ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap};
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Prefer formats that need the least conversion.
const ACCEPT_HEADER: &str = "text/markdown, text/html;q=0.9, text/plain;q=0.8, */*;q=0.1";

/// GET `url` and buffer the whole body.
///
/// # Errors
///
/// `Io` when the client cannot be built, the request fails, or the server
/// answers with a non-success status.
pub fn fetch(url: &str) -> Result<FetchedResponse> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(concat!("docdown/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| DocdownError::Io(std::io::Error::other(format!("Failed to create HTTP client: {}", e))))?;

    tracing::debug!(url, "Fetching");

    let response = client
        .get(url)
        .header(ACCEPT, ACCEPT_HEADER)
        .send()
        .map_err(|e| DocdownError::Io(std::io::Error::other(format!("Request to {} failed: {}", url, e))))?;

    if !response.status().is_success() {
        return Err(DocdownError::Io(std::io::Error::other(format!(
            "{} returned status: {}",
            url,
            response.status()
        ))));
    }

    let final_url = response.url().to_string();
    let content_type = header_value(response.headers(), CONTENT_TYPE.as_str());
    let content_disposition = header_value(response.headers(), CONTENT_DISPOSITION.as_str());

    let body = response
        .bytes()
        .map_err(|e| DocdownError::Io(std::io::Error::other(format!("Failed to read response body: {}", e))))?;

    Ok(FetchedResponse {
        url: final_url,
        content_type,
        content_disposition,
        body: body.to_vec(),
    })
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
