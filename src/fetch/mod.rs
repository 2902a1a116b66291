mod basic;
mod client;
#[cfg(test)]
pub(crate) mod fake;

pub use basic::{BasicClient, USER_AGENT};
pub use client::HttpClient;

use tracing::debug;

/// Longest response body excerpt carried in a [`FetchError::Status`].
const BODY_EXCERPT_LEN: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request timed out")]
    Timeout,
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("upstream returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Request(e)
        }
    }
}

/// GETs `url` and returns the body of a successful response.
///
/// # Errors
///
/// Any non-success status is an error; its body is kept (truncated) in the
/// error for logging.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Vec<u8>, FetchError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let resp = client.execute(req).await?;
    let status = resp.status();
    let bytes = resp.bytes().await?;
    debug!(url, %status, bytes = bytes.len(), "Response received");

    if !status.is_success() {
        let body: String = String::from_utf8_lossy(&bytes)
            .chars()
            .take(BODY_EXCERPT_LEN)
            .collect();
        return Err(FetchError::Status { status, body });
    }

    Ok(bytes.to_vec())
}
