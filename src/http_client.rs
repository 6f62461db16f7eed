// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::{ReconError, SourceError};
use crate::rate_limiter::{RateLimiterConfig, SourceRateLimiter};

/// Realistic browser User-Agents, rotated per session
const BROWSER_USER_AGENTS: &[&str] = &[
    // Chrome on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    // Chrome on macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    // Firefox on Linux
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    // Safari on macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
];

fn get_browser_user_agent() -> &'static str {
    use std::sync::atomic::{AtomicUsize, Ordering};
    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    let index = COUNTER.fetch_add(1, Ordering::Relaxed) % BROWSER_USER_AGENTS.len();
    BROWSER_USER_AGENTS[index]
}

/// Maximum response body size (10MB) to prevent memory exhaustion
const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

const DEFAULT_POOL_IDLE_PER_HOST: usize = 8;

/// Settings shared by every source of one enumeration run
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HTTP or SOCKS5 proxy URL
    pub proxy: Option<String>,

    pub rate_limit: RateLimiterConfig,

    /// Per-request timeout
    pub timeout: Duration,

    /// Extra attempts for transport failures and throttling responses
    pub max_retries: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            rate_limit: RateLimiterConfig::default(),
            timeout: Duration::from_secs(30),
            max_retries: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub body: String,
}

impl HttpResponse {
    /// Decode the body as JSON, attributing failures to `url`
    pub fn json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        serde_json::from_str(&self.body).map_err(|e| SourceError::Parse {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

/// HTTP session handed to every source of a run
pub struct Session {
    client: Client,
    timeout: Duration,
    max_retries: u32,
    rate_limiter: Option<Arc<SourceRateLimiter>>,
    max_body_size: usize,
}

impl Session {
    pub fn new(config: &SessionConfig) -> Result<Self, ReconError> {
        let mut client_builder = Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(get_browser_user_agent())
            .pool_max_idle_per_host(DEFAULT_POOL_IDLE_PER_HOST)
            .tcp_nodelay(true);

        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str()).map_err(|e| {
                ReconError::Configuration(format!("Invalid proxy {}: {}", proxy, e))
            })?;
            client_builder = client_builder.proxy(proxy);
        }

        let client = client_builder.build().map_err(|e| {
            ReconError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        let rate_limiter = (!config.rate_limit.is_unlimited())
            .then(|| Arc::new(SourceRateLimiter::new(config.rate_limit.clone())));

        Ok(Self {
            client,
            timeout: config.timeout,
            max_retries: config.max_retries,
            rate_limiter,
            max_body_size: MAX_BODY_SIZE,
        })
    }

    pub fn rate_limiter(&self) -> Option<&Arc<SourceRateLimiter>> {
        self.rate_limiter.as_ref()
    }

    /// GET `url` on behalf of `source`.
    ///
    /// Waits for a rate limit slot, retries retryable failures with a linear
    /// backoff and gives up with `SourceError::Cancelled` as soon as `cancel`
    /// fires at any of those suspension points.
    pub async fn get(
        &self,
        cancel: &CancellationToken,
        source: &str,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, SourceError> {
        let mut attempts = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(SourceError::Cancelled);
            }

            if let Some(limiter) = &self.rate_limiter {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(SourceError::Cancelled),
                    _ = limiter.wait_for_slot(source) => {}
                }
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => return Err(SourceError::Cancelled),
                result = self.fetch_once(url, headers) => result,
            };

            match result {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempts < self.max_retries => {
                    attempts += 1;
                    debug!("[{}] attempt {} for {} failed: {}", source, attempts, url, e);
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(SourceError::Cancelled),
                        _ = tokio::time::sleep(Duration::from_millis(100 * attempts as u64)) => {}
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, SourceError> {
        let mut request_builder = self.client.get(url);
        for (key, value) in headers {
            request_builder = request_builder.header(*key, *value);
        }

        let response = request_builder.send().await.map_err(|e| self.map_transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::UnexpectedStatus {
                url: url.to_string(),
                status_code: status.as_u16(),
            });
        }

        let body_bytes = response.bytes().await.map_err(|e| self.map_transport_error(url, e))?;
        let body = if body_bytes.len() > self.max_body_size {
            String::from_utf8_lossy(&body_bytes[..self.max_body_size]).to_string()
        } else {
            String::from_utf8_lossy(&body_bytes).to_string()
        };

        Ok(HttpResponse { body })
    }

    fn map_transport_error(&self, url: &str, error: reqwest::Error) -> SourceError {
        if error.is_timeout() {
            SourceError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else {
            SourceError::Request {
                url: url.to_string(),
                reason: error.to_string(),
            }
        }
    }
}
