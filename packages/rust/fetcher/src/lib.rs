//! Rate-limited, retried HTTP fetching with content validation.
//!
//! The [`Fetcher`] issues GET requests under a global rate gate, retries
//! transport failures with exponential backoff, validates content-type and
//! declared length, and classifies each successful response as HTML or feed.
//! One `Fetcher` is shared by every worker in a retrieval batch; its rate
//! gate is the only clock the batch coordinates on.

pub mod robots;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};
use url::Url;

use freshwire_shared::{ContentKind, FetchConfig, FetchOutcome, FreshwireError, Result};

use crate::robots::RobotsChecker;

// ---------------------------------------------------------------------------
// RateGate
// ---------------------------------------------------------------------------

/// Enforces minimum spacing between request dispatches across all workers.
///
/// The lock is held while waiting, so dispatches are spaced strictly: each
/// caller observes the previous caller's dispatch time, never an older one.
struct RateGate {
    delay: Duration,
    last_dispatch: Mutex<Option<Instant>>,
}

impl RateGate {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_dispatch: Mutex::new(None),
        }
    }

    /// Wait until `delay` has elapsed since the last dispatch, then claim
    /// the current instant as the new dispatch time.
    async fn wait(&self) {
        let mut last = self.last_dispatch.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.delay {
                tokio::time::sleep(self.delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// HTTP fetcher with retry, rate limiting, and response validation.
pub struct Fetcher {
    config: FetchConfig,
    client: Client,
    gate: RateGate,
    robots: RobotsChecker,
}

impl Fetcher {
    /// Create a new fetcher. Fails on invalid configuration or if the HTTP
    /// client cannot be built.
    pub fn new(config: FetchConfig) -> Result<Arc<Self>> {
        config.validate()?;

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FreshwireError::Network(format!("failed to build HTTP client: {e}")))?;

        let gate = RateGate::new(Duration::from_millis(config.request_delay_ms));
        let robots = RobotsChecker::new(client.clone(), config.user_agent.clone());

        Ok(Arc::new(Self {
            config,
            client,
            gate,
            robots,
        }))
    }

    /// The configuration this fetcher was built with.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch a URL, retrying transport failures with exponential backoff.
    ///
    /// Attempts are strictly sequential for one URL; backoff before attempt
    /// `n` (n ≥ 1) is `2^n` seconds, with no delay before the first attempt.
    /// Validation failures (unsupported content type, oversized body,
    /// robots.txt denial) are terminal and never retried.
    pub async fn fetch(&self, url: &Url) -> Result<FetchOutcome> {
        if self.config.respect_robots_txt && !self.robots.is_allowed(url).await {
            return Err(FreshwireError::RobotsDisallowed {
                url: url.to_string(),
            });
        }

        let mut last_error = String::new();

        for attempt in 0..self.config.max_retries {
            if attempt > 0 {
                tokio::time::sleep(backoff_delay(attempt)).await;
            }

            self.gate.wait().await;

            match self.attempt(url).await {
                Ok(outcome) => {
                    debug!(%url, status = outcome.status, kind = ?outcome.kind, "fetched");
                    return Ok(outcome);
                }
                Err(
                    e @ (FreshwireError::UnsupportedContentType { .. }
                    | FreshwireError::ContentTooLarge { .. }),
                ) => return Err(e),
                Err(e) => {
                    warn!(%url, attempt = attempt + 1, error = %e, "fetch attempt failed");
                    last_error = e.to_string();
                }
            }
        }

        Err(FreshwireError::FetchExhausted {
            attempts: self.config.max_retries,
            last_error,
        })
    }

    /// A single GET attempt with response validation and classification.
    async fn attempt(&self, url: &Url) -> Result<FetchOutcome> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| FreshwireError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FreshwireError::Network(format!("{url}: HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if !self
            .config
            .accepted_content_types
            .iter()
            .any(|accepted| content_type.contains(accepted.as_str()))
        {
            return Err(FreshwireError::UnsupportedContentType {
                content_type: content_type.clone(),
            });
        }

        if let Some(declared) = response.content_length() {
            if declared > self.config.max_content_length {
                return Err(FreshwireError::ContentTooLarge {
                    declared,
                    limit: self.config.max_content_length,
                });
            }
        }

        let kind = classify_content_type(&content_type);
        let status_code = status.as_u16();

        let body = response
            .text()
            .await
            .map_err(|e| FreshwireError::Network(format!("{url}: body read failed: {e}")))?;

        Ok(FetchOutcome {
            url: url.to_string(),
            status: status_code,
            body,
            kind,
            fetched_at: Utc::now(),
        })
    }
}

/// Exponential backoff before retry attempt `n`: `2^n` seconds, capped so
/// an extreme `max_retries` cannot overflow the shift.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(16))
}

/// Classify an accepted content-type header into HTML or feed.
fn classify_content_type(content_type: &str) -> ContentKind {
    if content_type.contains("xml") || content_type.contains("rss") || content_type.contains("atom")
    {
        ContentKind::Feed
    } else {
        ContentKind::Html
    }
}
