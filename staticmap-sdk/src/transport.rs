// ABOUTME: Network transport seam for opening map URLs as readable byte streams
// ABOUTME: Default implementation uses a blocking reqwest client with caching disabled

use crate::constants::transfer::{MAX_DIAGNOSTIC_LEN, MAX_REDIRECTS};
use crate::error::FetchError;
use crate::request::redact_key;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA, USER_AGENT};
use std::io::Read;
use std::time::Duration;

/// Opens a URL and yields its response body.
///
/// Implementations must only return a reader for successful responses.
pub trait Transport: Send + Sync {
    fn open(&self, url: &str) -> Result<Box<dyn Read + Send>, FetchError>;
}

/// HTTP(S) transport backed by `reqwest::blocking`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        // Maps are always fetched fresh from the origin
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent).map_err(|e| {
                FetchError::TransportUnavailable(Some(format!("Invalid user agent: {}", e)))
            })?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| {
                FetchError::TransportUnavailable(Some(format!(
                    "Failed to create HTTP client: {}",
                    e.without_url()
                )))
            })?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn open(&self, url: &str) -> Result<Box<dyn Read + Send>, FetchError> {
        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response_diagnostic(response) {
                Some(body) => format!("HTTP {}: {}", status, body),
                None => format!("HTTP {}", status),
            };
            log::debug!("Map request rejected: {}", detail);
            return Err(FetchError::RequestFailed(Some(detail)));
        }

        Ok(Box::new(response))
    }
}

/// Best available explanation from an error response body
fn response_diagnostic(response: Response) -> Option<String> {
    // Enough bytes for MAX_DIAGNOSTIC_LEN characters of any UTF-8 text
    let mut bytes = Vec::new();
    response
        .take(MAX_DIAGNOSTIC_LEN as u64 * 4)
        .read_to_end(&mut bytes)
        .ok()?;
    let body = String::from_utf8_lossy(&bytes);
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    let truncated: String = body.chars().take(MAX_DIAGNOSTIC_LEN).collect();
    Some(redact_key(&truncated))
}
