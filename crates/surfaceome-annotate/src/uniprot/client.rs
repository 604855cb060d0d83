//! HTTP client for the UniProt REST service
//!
//! One [`UniProtClient`] is built per run and shared by reference. It owns the
//! connection pool, the per-request timeout and the [`RetryPolicy`].

use crate::error::Result;
use crate::uniprot::endpoints;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

// ============================================================================
// Client Constants
// ============================================================================

/// Default UniProtKB REST base URL
pub const DEFAULT_UNIPROT_URL: &str = "https://rest.uniprot.org/uniprotkb";

/// Per-request deadline in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Statuses that are worth another attempt
pub const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Retry behaviour for idempotent GET requests
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    pub max_retries: u32,

    /// Seconds multiplied into the exponential backoff
    pub backoff_factor: f64,

    /// Upper bound on a single sleep
    pub max_backoff: Duration,

    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_factor: 1.0,
            max_backoff: Duration::from_secs(120),
            retry_statuses: RETRY_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// No retries at all
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff_factor(mut self, backoff_factor: f64) -> Self {
        self.backoff_factor = backoff_factor.max(0.0);
        self
    }

    pub fn should_retry_status(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status.as_u16())
    }

    /// Sleep before retry number `retry` (1-based)
    ///
    /// The first retry is immediate; after that the delay is
    /// `backoff_factor * 2^(retry - 1)` seconds, capped at `max_backoff`.
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry <= 1 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(retry - 1).unwrap_or(i32::MAX);
        let secs = self.backoff_factor * 2f64.powi(exponent);
        if !secs.is_finite() || secs >= self.max_backoff.as_secs_f64() {
            return self.max_backoff;
        }
        Duration::from_secs_f64(secs)
    }
}

/// Client for UniProtKB entry records
#[derive(Debug, Clone)]
pub struct UniProtClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl UniProtClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("surfaceome-annotate/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            retry,
        })
    }

    /// FASTA record for `accession`, or `None` if it could not be retrieved
    pub async fn fetch_fasta(&self, accession: &str) -> Result<Option<String>> {
        self.get_text(&endpoints::fasta_url(&self.base_url, accession))
            .await
    }

    /// Flat-text record for `accession`, or `None` if it could not be retrieved
    pub async fn fetch_entry_text(&self, accession: &str) -> Result<Option<String>> {
        self.get_text(&endpoints::entry_text_url(&self.base_url, accession))
            .await
    }

    /// GET `url` with retries
    ///
    /// `Ok(None)` means the service answered with a non-OK status, or every
    /// attempt failed in transport, including while reading the body. Only a
    /// request that cannot be built is an error.
    async fn get_text(&self, url: &str) -> Result<Option<String>> {
        let mut retries = 0u32;

        loop {
            let attempt = match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();

                    if self.retry.should_retry_status(status) && retries < self.retry.max_retries {
                        retries += 1;
                        let delay = retry_after(&response, status)
                            .map(|delay| delay.min(self.retry.max_backoff))
                            .unwrap_or_else(|| self.retry.backoff(retries));
                        warn!(
                            url,
                            status = status.as_u16(),
                            retry = retries,
                            max_retries = self.retry.max_retries,
                            delay_ms = delay.as_millis() as u64,
                            "Retryable response from UniProt"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    if status != StatusCode::OK {
                        warn!(url, status = status.as_u16(), "UniProt record unavailable");
                        return Ok(None);
                    }

                    response.text().await
                },
                Err(err) if err.is_builder() => return Err(err.into()),
                Err(err) => Err(err),
            };

            match attempt {
                Ok(body) => {
                    debug!(url, retries, "Fetched UniProt record");
                    return Ok(Some(body));
                },
                Err(err) if retries < self.retry.max_retries => {
                    retries += 1;
                    let delay = self.retry.backoff(retries);
                    warn!(
                        url,
                        error = %err,
                        retry = retries,
                        max_retries = self.retry.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "UniProt request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                },
                Err(err) => {
                    warn!(url, error = %err, attempts = retries + 1, "UniProt request failed");
                    return Ok(None);
                },
            }
        }
    }
}

/// Delay requested by a `Retry-After: <seconds>` header on 429/503
fn retry_after(response: &Response, status: StatusCode) -> Option<Duration> {
    if status != StatusCode::TOO_MANY_REQUESTS && status != StatusCode::SERVICE_UNAVAILABLE {
        return None;
    }
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
