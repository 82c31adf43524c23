//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the pipeline, including:
//! - Building HTTP clients with a proper user agent string
//! - GET requests for page text and binary resources
//! - Streaming downloads straight to disk
//! - Bounded retries with a fixed backoff
//! - Run-wide request pacing

use crate::config::{Config, UserAgentConfig};
use crate::crawler::pacer::Pacer;
use crate::DistillError;
use reqwest::{Client, Response};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// What the caller wants back from a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Decoded response text (HTML pages)
    Text,
    /// Raw response bytes
    Binary,
}

/// Payload of a successful fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchBody {
    Text(String),
    Binary(Vec<u8>),
    /// Body was streamed to disk
    Saved { path: PathBuf, bytes: u64 },
}

/// Result of a fetch operation, after all retries
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the resource
    Success {
        /// URL that was requested
        url: String,
        /// HTTP status code
        status_code: u16,
        /// Attempts used, including the successful one
        attempts: u32,
        /// Response payload
        body: FetchBody,
    },

    /// Every attempt failed
    Failed {
        /// URL that was requested
        url: String,
        /// Attempts made
        attempts: u32,
        /// Error from the last attempt
        error: String,
    },
}

impl FetchResult {
    /// Returns true for [`FetchResult::Success`]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Converts into the body, or a [`DistillError::Network`] on failure
    pub fn into_body(self) -> Result<FetchBody, DistillError> {
        match self {
            Self::Success { body, .. } => Ok(body),
            Self::Failed {
                url,
                attempts,
                error,
            } => Err(DistillError::Network {
                url,
                attempts,
                message: error,
            }),
        }
    }

    /// Converts into response text
    pub fn into_text(self) -> Result<String, DistillError> {
        match self.into_body()? {
            FetchBody::Text(text) => Ok(text),
            FetchBody::Binary(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            FetchBody::Saved { path, .. } => Err(DistillError::Shape {
                path: path.display().to_string(),
                message: "body was saved to disk, not fetched as text".to_string(),
            }),
        }
    }
}

/// Bounded retry schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Base delay; every retry waits `base_delay * 2`
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Total attempts, first try included
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (1-based); the same for every retry
    pub fn delay_before_retry(&self, _retry: u32) -> Duration {
        self.base_delay.saturating_mul(2)
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use doc_distiller::config::UserAgentConfig;
/// use doc_distiller::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "DocDistiller".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Where a response body should go
enum Target<'a> {
    Memory(FetchKind),
    File(&'a Path),
}

/// Paced, retrying HTTP fetcher shared by every step of a run
pub struct Fetcher {
    client: Client,
    retry: RetryPolicy,
    pacer: Pacer,
}

impl Fetcher {
    /// Creates a fetcher from the scraper and user agent configuration
    pub fn new(config: &Config) -> Result<Self, DistillError> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.scraper.request_timeout),
        )?;

        Ok(Self::from_parts(
            client,
            RetryPolicy {
                max_retries: config.scraper.max_retries,
                base_delay: Duration::from_millis(config.scraper.retry_base_delay),
            },
            Pacer::new(Duration::from_millis(config.scraper.pacing_delay)),
        ))
    }

    /// Creates a fetcher from already-built parts
    pub fn from_parts(client: Client, retry: RetryPolicy, pacer: Pacer) -> Self {
        Self {
            client,
            retry,
            pacer,
        }
    }

    /// Returns the retry policy
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Fetches a URL into memory
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Transport error (DNS, connect, timeout) | Retry |
    /// | Non-2xx status | Retry |
    /// | Body read error | Retry |
    ///
    /// Every retry waits `base_delay * 2`, then goes through the pacer like
    /// any other request.
    pub async fn fetch(&self, url: &str, kind: FetchKind) -> FetchResult {
        self.fetch_with_retry(url, Target::Memory(kind)).await
    }

    /// Downloads a URL to `dest`
    ///
    /// The body is streamed into `<dest>.part`, flushed and synced, then
    /// renamed into place, so `dest` only ever holds a complete download.
    pub async fn download(&self, url: &str, dest: &Path) -> FetchResult {
        self.fetch_with_retry(url, Target::File(dest)).await
    }

    async fn fetch_with_retry(&self, url: &str, target: Target<'_>) -> FetchResult {
        let max_attempts = self.retry.max_attempts();
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                let retry = attempt - 1;
                let delay = self.retry.delay_before_retry(retry);
                tracing::info!(
                    "Retry {}/{} for {} in {:?}",
                    retry,
                    self.retry.max_retries,
                    url,
                    delay
                );
                tokio::time::sleep(delay).await;
            }

            self.pacer.wait().await;
            tracing::debug!("GET {} (attempt {}/{})", url, attempt, max_attempts);

            let outcome = self.attempt(url, &target).await;
            self.pacer.finish().await;

            match outcome {
                Ok((status_code, body)) => {
                    return FetchResult::Success {
                        url: url.to_string(),
                        status_code,
                        attempts: attempt,
                        body,
                    };
                }
                Err(error) => {
                    tracing::debug!("Attempt {} for {} failed: {}", attempt, url, error);
                    last_error = error;
                }
            }
        }

        tracing::warn!(
            "Giving up on {} after {} attempt(s): {}",
            url,
            max_attempts,
            last_error
        );

        FetchResult::Failed {
            url: url.to_string(),
            attempts: max_attempts,
            error: last_error,
        }
    }

    /// One GET; any error is returned as a message for the retry loop
    async fn attempt(&self, url: &str, target: &Target<'_>) -> Result<(u16, FetchBody), String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(describe_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status));
        }

        let body = match target {
            Target::Memory(FetchKind::Text) => FetchBody::Text(
                response
                    .text()
                    .await
                    .map_err(|e| format!("failed to read body: {}", e))?,
            ),
            Target::Memory(FetchKind::Binary) => FetchBody::Binary(
                response
                    .bytes()
                    .await
                    .map_err(|e| format!("failed to read body: {}", e))?
                    .to_vec(),
            ),
            Target::File(dest) => stream_to_file(response, dest).await?,
        };

        Ok((status.as_u16(), body))
    }
}

fn describe_transport_error(e: reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

async fn stream_to_file(response: Response, dest: &Path) -> Result<FetchBody, String> {
    let partial = partial_path(dest);

    match write_chunks(response, &partial).await {
        Ok(bytes) => {
            tokio::fs::rename(&partial, dest)
                .await
                .map_err(|e| format!("failed to move download into place: {}", e))?;
            Ok(FetchBody::Saved {
                path: dest.to_path_buf(),
                bytes,
            })
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&partial).await;
            Err(e)
        }
    }
}

async fn write_chunks(mut response: Response, path: &Path) -> Result<u64, String> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| format!("failed to create {}: {}", path.display(), e))?;
    let mut written = 0u64;

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| format!("download interrupted: {}", e))?
    {
        file.write_all(&chunk)
            .await
            .map_err(|e| format!("failed to write {}: {}", path.display(), e))?;
        written += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| format!("failed to flush {}: {}", path.display(), e))?;
    file.sync_all()
        .await
        .map_err(|e| format!("failed to sync {}: {}", path.display(), e))?;

    Ok(written)
}
