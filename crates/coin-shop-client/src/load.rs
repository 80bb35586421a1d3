//! Rate-driven load generation.
//!
//! Fires requests at a fixed rate for a fixed duration, each on its own task,
//! and reports throughput, mean latency of successful calls and success rate.

// Report ratios are display values.
#![allow(clippy::cast_precision_loss)]

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;

use crate::client::CoinShopClient;
use crate::error::ClientError;

/// Highest rate whose tick period is still at least one nanosecond.
pub const MAX_REQUESTS_PER_SECOND: u32 = 1_000_000_000;

/// Endpoint exercised by a load run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadTarget {
    /// `GET /api/info`.
    Info,
    /// `GET /api/buy/{item}`.
    Buy(String),
}

impl FromStr for LoadTarget {
    type Err = ClientError;

    /// Parse `info` or `buy:<item>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            None if s == "info" => Ok(Self::Info),
            Some(("buy", item)) if !item.is_empty() => Ok(Self::Buy(item.to_string())),
            _ => Err(ClientError::Configuration(format!(
                "unknown load target {s:?}, expected \"info\" or \"buy:<item>\""
            ))),
        }
    }
}

/// Load run settings.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Endpoint to call.
    pub target: LoadTarget,
    /// Requests started per second.
    pub requests_per_second: u32,
    /// How long to keep starting requests.
    pub duration: Duration,
    /// Items bought before the run so the account view has inventory.
    pub warmup_purchases: Vec<String>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            target: LoadTarget::Info,
            requests_per_second: 1000,
            duration: Duration::from_secs(10),
            warmup_purchases: vec!["cup".into(); 4],
        }
    }
}

/// Outcome of a load run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Requests started.
    pub total: u64,
    /// Requests answered with a success status.
    pub successful: u64,
    /// Requests that failed or were answered with an error status.
    pub failed: u64,
    /// Sum of latencies of successful requests.
    pub total_latency: Duration,
    /// Wall time from the first request to the last response.
    pub elapsed: Duration,
}

impl LoadReport {
    /// Requests per second over the run.
    #[must_use]
    pub fn rps(&self) -> f64 {
        if self.elapsed.is_zero() {
            0.0
        } else {
            self.total as f64 / self.elapsed.as_secs_f64()
        }
    }

    /// Mean latency of successful requests in milliseconds.
    #[must_use]
    pub fn mean_latency_ms(&self) -> f64 {
        if self.successful == 0 {
            0.0
        } else {
            self.total_latency.as_secs_f64() * 1000.0 / self.successful as f64
        }
    }

    /// Share of successful requests, in percent.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.successful as f64 / self.total as f64 * 100.0
        }
    }

    fn record(&mut self, outcome: Result<(), ClientError>, latency: Duration) {
        self.total += 1;
        match outcome {
            Ok(()) => {
                self.successful += 1;
                self.total_latency += latency;
            }
            Err(e) => {
                tracing::debug!(error = %e, "Request failed");
                self.failed += 1;
            }
        }
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Requests: {} ({} failed)", self.total, self.failed)?;
        writeln!(f, "RPS: {:.2}", self.rps())?;
        writeln!(f, "Mean latency (ms): {:.2}", self.mean_latency_ms())?;
        write!(f, "Success rate: {:.4}%", self.success_rate())
    }
}

/// Run a load test with an authenticated client.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the client has no
/// token. Failures of individual requests are counted, not returned.
pub async fn run(client: &CoinShopClient, config: &LoadConfig) -> Result<LoadReport, ClientError> {
    if config.requests_per_second == 0 || config.requests_per_second > MAX_REQUESTS_PER_SECOND {
        return Err(ClientError::Configuration(format!(
            "requests_per_second must be between 1 and {MAX_REQUESTS_PER_SECOND}"
        )));
    }
    if client.token().is_none() {
        return Err(ClientError::NotAuthenticated);
    }

    for item in &config.warmup_purchases {
        if let Err(e) = client.buy(item).await {
            tracing::warn!(item = %item, error = %e, "Warmup purchase failed");
        }
    }

    let period = Duration::from_secs(1) / config.requests_per_second;
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

    tracing::info!(
        load_target = ?config.target,
        rps = config.requests_per_second,
        duration_secs = config.duration.as_secs_f64(),
        "Starting load run"
    );

    let started = Instant::now();
    let deadline = tokio::time::Instant::now() + config.duration;
    let mut tasks = JoinSet::new();

    loop {
        let tick = ticker.tick().await;
        if tick >= deadline {
            break;
        }

        let client = client.clone();
        let target = config.target.clone();
        tasks.spawn(async move {
            let sent = Instant::now();
            let outcome = match &target {
                LoadTarget::Info => client.info().await.map(|_| ()),
                LoadTarget::Buy(item) => client.buy(item).await,
            };
            (outcome, sent.elapsed())
        });
    }

    let mut report = LoadReport::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((outcome, latency)) => report.record(outcome, latency),
            Err(e) => {
                tracing::warn!(error = %e, "Load task panicked");
                report.total += 1;
                report.failed += 1;
            }
        }
    }
    report.elapsed = started.elapsed();

    tracing::info!(
        total = report.total,
        failed = report.failed,
        "Load run finished"
    );

    Ok(report)
}
