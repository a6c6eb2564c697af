//! Core HTTP operations with rate limiting and retry logic
//!
//! JSON requests against the backend with a shared rate limiter and
//! exponential backoff on transient failures (transport errors, 429, 503).
//! Non-idempotent requests are only retried when the server signalled it did
//! not process them.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{clock::DefaultClock, state::InMemoryState, Jitter, Quota, RateLimiter};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::constants::{api, limits};
use crate::errors::{ConfigError, ConfigResult, SyncError, SyncResult};

/// HTTP operations handler with resilience patterns
#[derive(Debug)]
pub struct HttpHandler {
    client: Client,
    base_url: Url,
    max_retries: u32,
    rate_limiter: RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>,
}

impl HttpHandler {
    /// Creates a new HttpHandler
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the rate limit is zero
    pub fn new(client: Client, base_url: Url, rate_limit_rps: u32, max_retries: u32) -> ConfigResult<Self> {
        let rate_limiter = Self::build_rate_limiter(rate_limit_rps)?;
        Ok(Self {
            client,
            base_url,
            max_retries,
            rate_limiter,
        })
    }

    fn build_rate_limiter(
        rate_limit_rps: u32,
    ) -> ConfigResult<RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>> {
        let quota = Quota::per_second(NonZeroU32::new(rate_limit_rps).ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "client.rate_limit_rps".to_string(),
                value: rate_limit_rps.to_string(),
                reason: "Rate limit must be non-zero".to_string(),
            }
        })?);
        Ok(RateLimiter::direct(quota))
    }

    /// Resolve a backend path against the base URL
    pub fn endpoint(&self, path: &str) -> SyncResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| SyncError::InvalidResponse {
                reason: format!("cannot build URL for {}: {}", path, e),
            })
    }

    /// Resolve an endpoint under one course
    ///
    /// The course id is percent-encoded as a single path segment, so ids
    /// containing `/`, `?` or `#` cannot change the request target.
    pub fn course_endpoint(&self, scope_id: &str, segments: &[&str]) -> SyncResult<Url> {
        let mut url = self.endpoint(api::COURSES_PATH)?;
        url.path_segments_mut()
            .map_err(|_| SyncError::InvalidResponse {
                reason: format!("base URL {} cannot hold a path", self.base_url),
            })?
            .pop_if_empty()
            .push(scope_id)
            .extend(segments);
        Ok(url)
    }

    /// GET a JSON document
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> SyncResult<T> {
        let response = self
            .send_with_retry(Method::GET, url, |request| request)
            .await?;
        Self::decode(response).await
    }

    /// Send a JSON body and decode a JSON response
    pub async fn send_json<B, T>(&self, method: Method, url: Url, body: &B) -> SyncResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .send_with_retry(method, url, |request| request.json(body))
            .await?;
        Self::decode(response).await
    }

    /// Send a JSON body and only check for a 2xx status
    pub async fn send_json_no_content<B>(&self, method: Method, url: Url, body: &B) -> SyncResult<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.send_with_retry(method, url, |request| request.json(body))
            .await
            .map(|_| ())
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> SyncResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| SyncError::InvalidResponse {
                reason: e.to_string(),
            })
    }

    /// Issue a request, retrying transient failures, and require a 2xx status
    async fn send_with_retry<F>(&self, method: Method, url: Url, build: F) -> SyncResult<Response>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        // Apply rate limiting with jitter to avoid thundering herd
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(50)))
            .await;

        let idempotent = method != Method::POST;
        let mut retries = 0;
        loop {
            let request = build(self.client.request(method.clone(), url.clone()));
            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    let transient = status == StatusCode::TOO_MANY_REQUESTS
                        || status == StatusCode::SERVICE_UNAVAILABLE;

                    if transient && retries < self.max_retries {
                        retries += 1;
                        let delay = Self::backoff_delay(retries);
                        tracing::warn!(
                            "Backend responded {} for {} {}. Backing off for {}ms",
                            status.as_u16(),
                            method,
                            url,
                            delay.as_millis()
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        return Err(SyncError::RateLimitExceeded);
                    }
                    if !status.is_success() {
                        tracing::debug!("{} {} failed with HTTP {}", method, url, status.as_u16());
                        return Err(SyncError::Status {
                            status: status.as_u16(),
                        });
                    }

                    tracing::debug!("{} {} succeeded", method, url);
                    return Ok(response);
                }
                Err(e) if idempotent && retries < self.max_retries => {
                    retries += 1;
                    let delay = Self::backoff_delay(retries);
                    tracing::warn!(
                        "Request failed (attempt {}/{}): {}. Retrying in {}ms",
                        retries,
                        self.max_retries,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!("{} {} failed after {} retries: {}", method, url, retries, e);
                    return Err(SyncError::from_transport(&e));
                }
            }
        }
    }

    fn backoff_delay(attempt: u32) -> Duration {
        Duration::from_millis(limits::RETRY_BASE_DELAY_MS * 2_u64.pow(attempt))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}
