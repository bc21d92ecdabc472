//! HTTP transport for distribution requests
//!
//! Thin wrapper around a shared `reqwest::Client` with connection pooling
//! and a direct rate limiter, so that concurrent locale downloads cannot
//! stampede the distribution host.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{clock::DefaultClock, state::InMemoryState, Jitter, Quota, RateLimiter};
use reqwest::Client;

use crate::constants::{http, limits};
use crate::errors::{DownloadError, DownloadResult};

/// Shared HTTP client for manifest and locale file requests
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    rate_limiter: RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>,
}

/// Configuration for the HTTP transport
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub request_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,
    /// Maximum number of connections per host
    pub pool_max_per_host: usize,
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            pool_idle_timeout: http::POOL_IDLE_TIMEOUT,
            pool_max_per_host: http::POOL_MAX_PER_HOST,
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
        }
    }
}

impl HttpClient {
    /// Create a client with default configuration
    pub fn new() -> DownloadResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::Http` if the underlying client cannot be built
    pub fn with_config(config: ClientConfig) -> DownloadResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(http::USER_AGENT)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_per_host)
            .build()
            .map_err(DownloadError::Http)?;

        // A zero rate limit collapses to one request per second
        let quota = Quota::per_second(
            NonZeroU32::new(config.rate_limit_rps).unwrap_or(NonZeroU32::MIN),
        );

        Ok(Self {
            client,
            rate_limiter: RateLimiter::direct(quota),
        })
    }

    /// Issue a rate-limited GET request
    ///
    /// Waits for a rate limiter permit, with jitter to avoid thundering herd
    /// across concurrent workers, then sends the request.
    pub async fn get(&self, url: &str) -> reqwest::Result<reqwest::Response> {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
            .await;
        self.client.get(url).send().await
    }
}
