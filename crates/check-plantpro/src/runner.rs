//! One probe run: login, scrape, fetch alarms, evaluate.
//!
//! A run is all-or-nothing. Any failure restarts the whole sequence from the
//! login after a fixed backoff, up to the configured number of attempts.

use plantpro::{evaluate, Alarm, Report, SensorMap};
use serde::Serialize;

use crate::config::ProbeConfig;
use crate::error::{ProbeResult, RetriesExhausted};
use crate::scrape::{fetch_alarms, fetch_sensors};
use crate::session::login;
use crate::transport::FormTransport;

/// Everything scraped from the controller in one successful attempt.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub sensors: SensorMap,
    pub alarms: Vec<Alarm>,
}

/// A configured probe bound to a transport.
pub struct Probe<T> {
    transport: T,
    config: ProbeConfig,
}

impl<T: FormTransport> Probe<T> {
    pub fn new(transport: T, config: ProbeConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// A single attempt without retries.
    pub async fn collect_once(&self) -> ProbeResult<Snapshot> {
        login(&self.transport, &self.config.credentials).await?;
        let sensors = fetch_sensors(&self.transport, self.config.max_pages).await?;
        let alarms = fetch_alarms(&self.transport).await?;
        Ok(Snapshot { sensors, alarms })
    }

    /// Attempt the full sequence until it succeeds or attempts run out.
    pub async fn collect(&self) -> Result<Snapshot, RetriesExhausted> {
        let retry = self.config.retry;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let err = match self.collect_once().await {
                Ok(snapshot) => {
                    tracing::debug!(
                        attempt,
                        sensors = snapshot.sensors.len(),
                        alarms = snapshot.alarms.len(),
                        "Collected"
                    );
                    return Ok(snapshot);
                }
                Err(e) => e,
            };

            tracing::warn!(attempt, of = retry.attempts, kind = ?err.kind(), "Attempt failed: {err}");

            if !err.is_retryable() || attempt >= retry.attempts {
                return Err(RetriesExhausted {
                    attempts: attempt,
                    last: err,
                });
            }

            tokio::time::sleep(retry.backoff).await;
        }
    }

    /// Collect and evaluate. Collection failures become an UNKNOWN report.
    pub async fn check(&self) -> Report {
        match self.collect().await {
            Ok(snapshot) => evaluate(&snapshot.sensors, &snapshot.alarms, &self.config.policy),
            Err(e) => Report::unknown(e.to_string()),
        }
    }
}
