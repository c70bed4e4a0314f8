//! HTTP client implementation with connection pooling and retry logic

use reqwest::header::ACCEPT;
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::RetrieverResult;
use pkgreg_core::error::RegistryError;

const ACCEPT_JSON: &str = "application/json";
const ACCEPT_BINARY: &str = "application/octet-stream";

/// Configuration for exponential backoff retry logic
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

/// Outcome of a single failed attempt
enum AttemptError {
    /// Transport failures, 5xx and 429
    Retryable(RegistryError),
    /// Any other non-success status
    Fatal(RegistryError),
}

impl AttemptError {
    fn into_inner(self) -> RegistryError {
        match self {
            AttemptError::Retryable(e) | AttemptError::Fatal(e) => e,
        }
    }
}

/// HTTP client shared by all retrievers
///
/// A 404 is never an error here: `get_json` and `get_bytes` return
/// `Ok(None)` so callers can treat "not published" as an ordinary outcome.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
    /// Retry configuration
    retry_config: RetryConfig,
}

impl RegistryClient {
    /// Create new registry client with connection pooling
    pub fn new() -> RetrieverResult<Self> {
        Self::with_retry_config(RetryConfig::default())
    }

    /// Create registry client with custom retry configuration
    pub fn with_retry_config(retry_config: RetryConfig) -> RetrieverResult<Self> {
        let client = ClientBuilder::new()
            // Connection pooling configuration
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            // Request timeout
            .timeout(Duration::from_secs(30))
            // Registries redirect tarball downloads to blob storage
            .redirect(Policy::limited(10))
            .gzip(true)
            .user_agent(concat!("pkgreg/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RegistryError::network("Failed to create HTTP client".to_string(), e))?;

        Ok(Self {
            client,
            retry_config,
        })
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    /// GET a JSON document, `None` on 404
    pub async fn get_json<T>(&self, url: &str, bearer_token: Option<&str>) -> RetrieverResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.with_retry(|| async {
            let response = match self.send(url, ACCEPT_JSON, bearer_token).await? {
                Some(response) => response,
                None => return Ok(None),
            };

            let body = response.json::<T>().await.map_err(|e| {
                AttemptError::Fatal(RegistryError::network(
                    format!("Failed to parse response from {}", url),
                    e,
                ))
            })?;
            Ok::<_, AttemptError>(Some(body))
        })
        .await
    }

    /// GET raw bytes, `None` on 404
    pub async fn get_bytes(&self, url: &str, bearer_token: Option<&str>) -> RetrieverResult<Option<Vec<u8>>> {
        self.with_retry(|| async {
            let response = match self.send(url, ACCEPT_BINARY, bearer_token).await? {
                Some(response) => response,
                None => return Ok(None),
            };

            let bytes = response.bytes().await.map_err(|e| {
                AttemptError::Retryable(RegistryError::network(
                    format!("Failed to read response from {}", url),
                    e,
                ))
            })?;
            Ok::<_, AttemptError>(Some(bytes.to_vec()))
        })
        .await
    }

    async fn send(
        &self,
        url: &str,
        accept: &str,
        bearer_token: Option<&str>,
    ) -> Result<Option<Response>, AttemptError> {
        let mut request = self.client.get(url).header(ACCEPT, accept);
        if let Some(token) = bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            AttemptError::Retryable(RegistryError::network(format!("Request to {} failed", url), e))
        })?;

        let status = response.status();
        debug!(url, status = status.as_u16(), "Registry response");

        if status.is_success() {
            return Ok(Some(response));
        }
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let error = RegistryError::Network {
            message: format!("Registry returned status {} for {}", status, url),
            source: None,
        };
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            Err(AttemptError::Retryable(error))
        } else {
            Err(AttemptError::Fatal(error))
        }
    }

    /// Execute HTTP request with exponential backoff retry logic
    async fn with_retry<F, Fut, T>(&self, operation: F) -> RetrieverResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, AttemptError>>,
    {
        let mut delay = self.retry_config.initial_delay;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(AttemptError::Retryable(error)) if attempt < self.retry_config.max_retries => {
                    attempt += 1;
                    warn!(attempt, error = %error, "Registry request failed, retrying");

                    tokio::time::sleep(delay).await;

                    delay = std::cmp::min(
                        Duration::from_millis(
                            (delay.as_millis() as f64 * self.retry_config.multiplier) as u64,
                        ),
                        self.retry_config.max_delay,
                    );
                },
                Err(error) => return Err(error.into_inner()),
            }
        }
    }
}

#[cfg(test)]
mod tests;
