//! The fetch collaborator: resolves a VAST ad tag URI into document bytes
//! under a caller-supplied deadline. One request, no retries; retry policy
//! belongs to the caller.

use std::path::Path;
use std::time::Duration;

use log::{debug, warn};
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};

use crate::error::{Result, VastError};
use crate::models::Vast;
use crate::parser;

/// Fetch the raw bytes behind an ad tag URI, bounded by `timeout`.
pub async fn fetch(uri: &str, timeout: Duration) -> Result<Vec<u8>> {
    // Short request id so concurrent fetches can be told apart in logs
    let req_id: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();

    let url = url::Url::parse(uri)?;
    debug!("[{req_id}] fetching {url}");

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| VastError::FetchError(format!("failed to build HTTP client: {e}")))?;

    let start_time = std::time::Instant::now();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify(e, timeout, &req_id))?;

    if !response.status().is_success() {
        return Err(VastError::FetchError(format!(
            "HTTP status {}",
            response.status()
        )));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| classify(e, timeout, &req_id))?;
    debug!(
        "[{req_id}] received {} bytes in {:?}",
        body.len(),
        start_time.elapsed()
    );
    Ok(body.to_vec())
}

fn classify(err: reqwest::Error, timeout: Duration, req_id: &str) -> VastError {
    if err.is_timeout() {
        warn!("[{req_id}] request timed out after {timeout:?}");
        VastError::Timeout(timeout)
    } else {
        warn!("[{req_id}] request failed: {err}");
        VastError::FetchError(err.to_string())
    }
}

/// Fetch and parse the VAST document behind an ad tag URI.
pub async fn load_uri(uri: &str, timeout: Duration) -> Result<Vast> {
    let body = fetch(uri, timeout).await?;
    let xml = String::from_utf8(body)
        .map_err(|e| VastError::Other(format!("response body is not UTF-8: {e}")))?;
    parser::parse_vast(&xml)
}

/// Blocking wrapper around [`load_uri`] for callers without a runtime.
pub fn load_uri_blocking(uri: &str, timeout: Duration) -> Result<Vast> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| VastError::Other(format!("failed to create Tokio runtime: {e}")))?;
    rt.block_on(load_uri(uri, timeout))
}

/// Resolve a CLI input to document text: a `file://` URI, a plain file
/// path, or an HTTP(S) URL.
pub async fn fetch_content(input: &str, timeout: Duration) -> Result<String> {
    if let Some(path) = input.strip_prefix("file://") {
        debug!("reading from file {path}");
        return Ok(tokio::fs::read_to_string(path).await?);
    }

    if Path::new(input).exists() {
        debug!("reading from local file {input}");
        return Ok(tokio::fs::read_to_string(input).await?);
    }

    let body = fetch(input, timeout).await?;
    String::from_utf8(body).map_err(|e| VastError::Other(format!("response body is not UTF-8: {e}")))
}
