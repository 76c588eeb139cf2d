//! HTTP client with connection pooling and retry logic

use protoloc_errors::FetchError;
use protoloc_events::{AppEvent, EventEmitter, EventSender, FetchEvent};
use reqwest::{Client, Response};
use std::time::Duration;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300), // 5 minutes for large downloads
            connect_timeout: Duration::from_secs(30),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            retry_count: 3,
            retry_delay: Duration::from_secs(1),
            user_agent: format!("protoloc/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
    event_sender: Option<EventSender>,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| FetchError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config,
            event_sender: None,
        })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(NetConfig::default())
    }

    /// Report retries through the event channel
    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    #[must_use]
    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// Execute a GET request with retries
    ///
    /// Non-success statuses other than 5xx are returned to the caller as a
    /// response, not as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after all retry attempts, including
    /// network timeouts, connection failures, or server errors.
    pub async fn get(&self, url: &str) -> Result<Response, FetchError> {
        self.retry_request(url, || self.client.get(url).send()).await
    }

    /// Execute a request with retries and linear backoff
    async fn retry_request<F, Fut>(&self, url: &str, mut f: F) -> Result<Response, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<Response, reqwest::Error>>,
    {
        let max_attempts = self.config.retry_count + 1;
        let mut last_error = None;

        for attempt in 0..max_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.config.retry_delay * attempt).await;
            }

            match f().await {
                Ok(response) if response.status().is_server_error() => {
                    let status = response.status();
                    if attempt + 1 == max_attempts {
                        return Ok(response);
                    }
                    self.report_retry(url, attempt + 1, max_attempts, &status.to_string());
                    last_error = Some(FetchError::HttpError {
                        status: status.as_u16(),
                        message: status.to_string(),
                    });
                }
                Ok(response) => return Ok(response),
                Err(e) => {
                    let retryable = Self::should_retry(&e);
                    let error = Self::convert_error(url, &e);
                    if !retryable || attempt + 1 == max_attempts {
                        return Err(error);
                    }
                    self.report_retry(url, attempt + 1, max_attempts, &error.to_string());
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::DownloadFailed("Unknown error".to_string())))
    }

    fn report_retry(&self, url: &str, attempt: u32, max_attempts: u32, reason: &str) {
        tracing::debug!(url, attempt, max_attempts, reason, "retrying request");
        self.emit(AppEvent::Fetch(FetchEvent::DownloadRetrying {
            url: url.to_string(),
            attempt,
            max_attempts,
            reason: reason.to_string(),
        }));
    }

    /// Determine if an error should be retried
    fn should_retry(error: &reqwest::Error) -> bool {
        // Retry on timeout, connection errors, and server errors
        error.is_timeout()
            || error.is_connect()
            || error.status().is_some_and(|s| s.is_server_error())
    }

    fn convert_error(url: &str, error: &reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if error.is_connect() {
            FetchError::ConnectionFailed(error.to_string())
        } else {
            FetchError::DownloadFailed(error.to_string())
        }
    }
}

impl EventEmitter for NetClient {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}
