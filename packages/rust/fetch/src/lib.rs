//! Remote markdown fetcher.
//!
//! A single read-only GET against the configured README URL. No request
//! parameters, no authentication; any non-success answer aborts the build.

use readmepage_shared::{ReadmePageError, Result};
use reqwest::Client;
use tracing::{info, instrument};
use url::Url;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Default timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum response size we accept (10 MB).
const MAX_RESPONSE_SIZE: u64 = 10 * 1024 * 1024;

/// User-Agent string for fetch requests.
const USER_AGENT: &str = concat!("readmepage/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Fetch options
// ---------------------------------------------------------------------------

/// Configuration for the fetch request.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Timeout for the HTTP request in seconds.
    pub timeout_secs: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Fetch the markdown document at `url` and return its text.
///
/// Fails with [`ReadmePageError::Network`] when the request cannot be sent or
/// the server answers with a non-success status, with a validation error for
/// oversized bodies, and with a parse error when the body is not UTF-8.
#[instrument(skip_all, fields(url = %url))]
pub async fn fetch_markdown(url: &Url, opts: &FetchOptions) -> Result<String> {
    info!("fetching markdown source");

    let client = build_client(opts)?;

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| ReadmePageError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ReadmePageError::Network(format!("{url}: HTTP {status}")));
    }

    if let Some(len) = response.content_length() {
        check_size(url, len)?;
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ReadmePageError::Network(format!("{url}: failed to read body: {e}")))?;
    // Chunked responses carry no length up front.
    check_size(url, bytes.len() as u64)?;

    let body = String::from_utf8(bytes.to_vec())
        .map_err(|e| ReadmePageError::parse(format!("{url}: body is not valid UTF-8: {e}")))?;

    info!(bytes = body.len(), "markdown source fetched");
    Ok(body)
}

fn check_size(url: &Url, len: u64) -> Result<()> {
    if len > MAX_RESPONSE_SIZE {
        return Err(ReadmePageError::validation(format!(
            "{url}: response too large ({len} bytes, max {MAX_RESPONSE_SIZE})"
        )));
    }
    Ok(())
}

/// Build a reqwest client with appropriate settings.
fn build_client(opts: &FetchOptions) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(std::time::Duration::from_secs(opts.timeout_secs))
        .build()
        .map_err(|e| ReadmePageError::Network(format!("failed to build HTTP client: {e}")))
}
