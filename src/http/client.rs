//! HTTP client with retry and rate limiting
//!
//! Pages are fetched whole: a body that stalls mid-read is retried like a
//! request that never answered.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::error::{Error, Result};
use crate::types::BackoffType;
use reqwest::{Client, Response, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout, covering the body read
    pub timeout: Duration,
    /// Maximum number of retries
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Politeness limit towards the source
    pub rate_limit: RateLimiterConfig,
    /// Headers sent with every request
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            rate_limit: RateLimiterConfig::default(),
            default_headers: HashMap::new(),
            user_agent: format!("salary-harvest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = config;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// A fully read page response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpPage {
    /// URL after redirects
    pub url: String,
    /// `Content-Type` header, if sent
    pub content_type: Option<String>,
    /// Response body
    pub body: String,
}

/// Why one attempt failed, and whether another is worth making
enum Attempt {
    Retry(Error, Duration),
    Fatal(Error),
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: RateLimiter,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = RateLimiter::new(&config.rate_limit);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// GET a page and read its body
    ///
    /// 5xx, 429, connection failures and timeouts are retried with backoff up
    /// to `max_retries` times; other 4xx statuses fail at once. A timeout that
    /// survives every retry is returned as [`Error::Timeout`].
    pub async fn fetch_page(&self, url: &str) -> Result<HttpPage> {
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            if !self.rate_limiter.try_acquire() {
                debug!("Rate limit reached, waiting for a permit");
                self.rate_limiter.wait().await;
            }

            let outcome = match self.send(url, attempt).await {
                Ok(response) => match self.read_page(response, attempt).await {
                    Ok(page) => {
                        debug!("GET {} -> {} bytes", page.url, page.body.len());
                        return Ok(page);
                    }
                    Err(outcome) => outcome,
                },
                Err(outcome) => outcome,
            };

            match outcome {
                Attempt::Retry(err, delay) if attempt < max_retries => {
                    warn!(
                        "{err}, attempt {}/{}, retrying in {delay:?}",
                        attempt + 1,
                        max_retries + 1
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Attempt::Retry(err, _) | Attempt::Fatal(err) => return Err(err),
            }
        }
    }

    /// Send the request, classifying transport failures
    async fn send(&self, url: &str, attempt: u32) -> std::result::Result<Response, Attempt> {
        let mut req = self.client.get(url);
        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }

        req.send().await.map_err(|e| self.classify(e, attempt))
    }

    /// Check the status and read the body
    async fn read_page(
        &self,
        response: Response,
        attempt: u32,
    ) -> std::result::Result<HttpPage, Attempt> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = extract_retry_after(&response);
            return Err(Attempt::Retry(
                Error::RateLimited {
                    retry_after_seconds: retry_after,
                },
                Duration::from_secs(retry_after),
            ));
        }

        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            let err = Error::http_status(status.as_u16(), body);
            return Err(if err.is_retryable() {
                Attempt::Retry(err, self.calculate_backoff(attempt))
            } else {
                Attempt::Fatal(err)
            });
        }

        let url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(|e| self.classify(e, attempt))?;

        Ok(HttpPage {
            url,
            content_type,
            body,
        })
    }

    /// Map a reqwest failure to a retry decision
    fn classify(&self, e: reqwest::Error, attempt: u32) -> Attempt {
        let delay = self.calculate_backoff(attempt);
        if e.is_timeout() {
            Attempt::Retry(
                Error::Timeout {
                    timeout_ms: self.config.timeout.as_millis() as u64,
                },
                delay,
            )
        } else if e.is_connect() {
            Attempt::Retry(Error::Http(e), delay)
        } else {
            Attempt::Fatal(Error::Http(e))
        }
    }

    /// Calculate backoff delay for a given attempt
    pub(crate) fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff_type {
            BackoffType::Constant => self.config.initial_backoff,
            BackoffType::Linear => self.config.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.config.initial_backoff.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.config.max_backoff)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Extract retry-after header value
fn extract_retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(60)
}
