use crate::config::Config;
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while retrieving a feed body.
///
/// Any of these makes the feed contribute zero items; the aggregator
/// records it and moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, invalid URL, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with a status other than 200 OK
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Response body exceeded the configured size limit
    #[error("Response too large (limit {0} bytes)")]
    ResponseTooLarge(usize),
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// Performs single-feed HTTP GETs.
///
/// Cloning is cheap: the underlying `reqwest::Client` shares its
/// connection pool between clones.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_body_size: usize,
}

impl Fetcher {
    /// Builds a fetcher with its own HTTP client configured from `config`.
    ///
    /// # Errors
    ///
    /// Fails only if the TLS backend cannot be initialized.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Wraps an existing client (lets callers share one pool across components).
    pub fn with_client(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            timeout: config.request_timeout(),
            max_body_size: config.max_feed_size_bytes,
        }
    }

    /// Fetches `url` and returns the complete response body.
    ///
    /// The URL is handed to reqwest as-is; an empty or relative string
    /// fails as [`FetchError::Network`]. Only `200 OK` is treated as
    /// success. The body is streamed into memory up to the size limit and
    /// the connection is released on every return path when the response
    /// is dropped.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Network`] - connection, DNS, TLS or URL errors
    /// - [`FetchError::Timeout`] - no complete response within the timeout
    /// - [`FetchError::HttpStatus`] - any status other than 200
    /// - [`FetchError::ResponseTooLarge`] - body over the size limit
    /// - [`FetchError::IncompleteResponse`] - body shorter than Content-Length
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        tokio::time::timeout(self.timeout, self.fetch_inner(url))
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))?
    }

    async fn fetch_inner(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        self.read_body(response).await
    }

    /// Streams the body into memory, enforcing the size limit as chunks
    /// arrive and checking the result against any declared Content-Length.
    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
        let limit = self.max_body_size;
        let declared = response.content_length();

        if declared.is_some_and(|len| len > limit as u64) {
            return Err(FetchError::ResponseTooLarge(limit));
        }

        // declared <= limit here, so the reservation is bounded too
        let mut body = Vec::with_capacity(declared.unwrap_or(0) as usize);
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            if body.len().saturating_add(chunk.len()) > limit {
                return Err(FetchError::ResponseTooLarge(limit));
            }
            body.extend_from_slice(&chunk);
        }

        match declared {
            Some(expected) if (body.len() as u64) < expected => {
                Err(FetchError::IncompleteResponse {
                    expected,
                    received: body.len(),
                })
            }
            _ => Ok(body),
        }
    }
}
