//! Client-side polling of a donation's status until it settles.

use crate::core::{AppError, Result};
use crate::modules::donations::models::PaymentStatus;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_DURATION: Duration = Duration::from_secs(10 * 60);
/// Shortest interval the poller will wait between checks
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Where the poller reads the current status from
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, order_id: &str) -> Result<PaymentStatus>;
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: PaymentStatus,
}

/// Reads `GET {base_url}/api/payment?order_id=`
pub struct HttpStatusSource {
    client: Client,
    base_url: String,
}

impl HttpStatusSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl StatusSource for HttpStatusSource {
    async fn fetch_status(&self, order_id: &str) -> Result<PaymentStatus> {
        let response = self
            .client
            .get(format!("{}/api/payment", self.base_url))
            .query(&[("order_id", order_id)])
            .send()
            .await
            .map_err(|e| AppError::internal(format!("Status request failed: {}", e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(AppError::not_found("Donation not found")),
            status if !status.is_success() => Err(AppError::internal(format!(
                "Status request returned HTTP {}",
                status.as_u16()
            ))),
            _ => response
                .json::<StatusBody>()
                .await
                .map(|body| body.status)
                .map_err(|e| AppError::internal(format!("Unreadable status response: {}", e))),
        }
    }
}

/// How a poll ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A final status was observed
    Completed(PaymentStatus),
    /// Time ran out; carries the last status read, if any read succeeded
    TimedOut { last_seen: Option<PaymentStatus> },
}

/// Checks immediately, then every `interval`, until the status is final or
/// `max_duration` has passed.
///
/// Read errors are logged and polling continues.
pub struct StatusPoller<S> {
    source: S,
    interval: Duration,
    max_duration: Duration,
}

impl<S: StatusSource> StatusPoller<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            interval: DEFAULT_INTERVAL,
            max_duration: DEFAULT_MAX_DURATION,
        }
    }

    /// Intervals below `MIN_INTERVAL` are raised to it
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_INTERVAL);
        self
    }

    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = max_duration;
        self
    }

    pub async fn poll(&self, order_id: &str) -> PollOutcome {
        let deadline = Instant::now() + self.max_duration;
        let mut last_seen = None;
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if Instant::now() > deadline {
                break;
            }

            match self.source.fetch_status(order_id).await {
                Ok(status) => {
                    tracing::debug!(order_id = %order_id, status = %status, "Polled status");
                    if status.is_final() {
                        return PollOutcome::Completed(status);
                    }
                    last_seen = Some(status);
                }
                Err(e) => {
                    tracing::warn!(order_id = %order_id, error = %e, "Status check failed");
                }
            }
        }

        tracing::info!(order_id = %order_id, last_seen = ?last_seen, "Stopped polling");
        PollOutcome::TimedOut { last_seen }
    }
}
