//! Shared HTTP fetch helper for provider adapters.
//!
//! Every adapter request goes through one of these: a lazily shared reqwest
//! client with a per-adapter concurrency semaphore, a requests-per-minute
//! quota, a global per-request timeout, and a bounded retry that only fires
//! on transient failures. 4xx responses never retry.

use crate::error::ProviderError;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

type DirectLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Configuration for a provider's HTTP channel.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request cap.
    pub timeout: Duration,
    /// In-flight request cap, enforced with a counting semaphore.
    pub max_concurrent_requests: usize,
    /// Requests-per-minute quota.
    pub requests_per_minute: NonZeroU32,
    /// Total attempts per request, transient failures only.
    pub max_attempts: u32,
    /// Default headers sent with every request.
    pub headers: HeaderMap,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_concurrent_requests: 10,
            requests_per_minute: nonzero!(600u32),
            max_attempts: 3,
            headers: HeaderMap::new(),
        }
    }
}

impl FetchConfig {
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent_requests = max.max(1);
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

/// Rate-limited, retrying JSON fetcher.
pub struct HttpFetcher {
    client: Client,
    semaphore: Arc<Semaphore>,
    limiter: Arc<DirectLimiter>,
    max_attempts: u32,
    requests: AtomicU64,
    errors: AtomicU64,
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("requests", &self.requests.load(Ordering::Relaxed))
            .field("errors", &self.errors.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl HttpFetcher {
    /// Builds the fetcher and its underlying client.
    ///
    /// # Errors
    /// Returns `ProviderError::Configuration` if the client cannot be built.
    pub fn new(config: FetchConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(config.headers)
            .build()
            .map_err(|e| ProviderError::Configuration(format!("http client: {e}")))?;

        let quota = Quota::per_minute(config.requests_per_minute);

        Ok(Self {
            client,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_requests)),
            limiter: Arc::new(RateLimiter::direct(quota)),
            max_attempts: config.max_attempts.max(1),
            requests: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        })
    }

    /// Total requests issued.
    #[must_use]
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Total requests that ultimately failed.
    #[must_use]
    pub fn error_count(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// GET a JSON document.
    ///
    /// # Errors
    /// Returns the final `ProviderError` after bounded retries.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        self.execute(|| self.client.get(url).query(query)).await
    }

    /// POST a JSON body and decode a JSON response.
    ///
    /// # Errors
    /// Returns the final `ProviderError` after bounded retries.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T, ProviderError> {
        self.execute(|| self.client.post(url).json(body)).await
    }

    async fn execute<T, F>(&self, build: F) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::RequestBuilder,
    {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ProviderError::Configuration("semaphore closed".into()))?;

        let mut last_err = ProviderError::Network("no attempt made".into());

        for attempt in 1..=self.max_attempts {
            self.limiter.until_ready().await;
            self.requests.fetch_add(1, Ordering::Relaxed);

            let result: Result<T, ProviderError> = match build().send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        match response.json::<T>().await {
                            Ok(value) => return Ok(value),
                            // Decode failures are upstream bugs, not blips.
                            Err(e) => Err(ProviderError::Parse(e.to_string())),
                        }
                    } else {
                        Err(ProviderError::api(status.as_u16(), "request failed"))
                    }
                }
                Err(e) => Err(ProviderError::from(e)),
            };

            match result {
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    tracing::debug!(attempt, error = %err, "transient fetch failure, retrying");
                    if let Some(delay) = err.retry_delay() {
                        tokio::time::sleep(delay).await;
                    }
                    last_err = err;
                }
                Err(err) => {
                    self.errors.fetch_add(1, Ordering::Relaxed);
                    return Err(err);
                }
                Ok(_) => unreachable!("handled above"),
            }
        }

        self.errors.fetch_add(1, Ordering::Relaxed);
        Err(last_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Payload {
        value: i32,
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(FetchConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_get_json_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": 7})))
            .mount(&server)
            .await;

        let fetcher = fetcher();
        let payload: Payload = fetcher
            .get_json(&format!("{}/data", server.uri()), &[])
            .await
            .unwrap();

        assert_eq!(payload.value, 7);
        assert_eq!(fetcher.request_count(), 1);
        assert_eq!(fetcher.error_count(), 0);
    }

    #[tokio::test]
    async fn test_client_error_does_not_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = fetcher();
        let result: Result<Payload, _> = fetcher
            .get_json(&format!("{}/gone", server.uri()), &[])
            .await;

        assert!(matches!(result, Err(ProviderError::Api { status: 404, .. })));
        assert_eq!(fetcher.request_count(), 1);
        assert_eq!(fetcher.error_count(), 1);
    }

    #[tokio::test]
    async fn test_server_error_retries_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": 1})))
            .mount(&server)
            .await;

        let fetcher = fetcher();
        let payload: Payload = fetcher
            .get_json(&format!("{}/flaky", server.uri()), &[])
            .await
            .unwrap();

        assert_eq!(payload.value, 1);
        assert_eq!(fetcher.request_count(), 2);
        assert_eq!(fetcher.error_count(), 0);
    }

    #[tokio::test]
    async fn test_bad_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>challenge</html>"))
            .mount(&server)
            .await;

        let fetcher = fetcher();
        let result: Result<Payload, _> = fetcher
            .get_json(&format!("{}/html", server.uri()), &[])
            .await;

        assert!(matches!(result, Err(ProviderError::Parse(_))));
    }

    #[tokio::test]
    async fn test_post_json_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": 42})))
            .mount(&server)
            .await;

        let fetcher = fetcher();
        let payload: Payload = fetcher
            .post_json(
                &format!("{}/rpc", server.uri()),
                &serde_json::json!({"sportId": 1}),
            )
            .await
            .unwrap();

        assert_eq!(payload.value, 42);
    }
}
