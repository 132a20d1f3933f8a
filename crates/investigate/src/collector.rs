//! `TimeRangeCollector` (§4.6): walks fixed-width windows forward from the
//! previous investigation's latest event, waiting for wall-clock to catch
//! up to the window end and fast-forwarding past empty windows. Grounded in
//! `original_source/scrywarden/investigator/collector.py::TimeRangeCollector`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::watch;

use warden_store::models::{AnomalyEventRow, Investigation};
use warden_store::{EventStore, InvestigationEventStore, StoreError};

/// One collected window: its boundaries plus the anomaly rows inside it.
pub struct WindowAnomalies {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub anomalies: Vec<AnomalyEventRow>,
}

pub struct TimeRangeCollector {
    seconds: i64,
    interval: Duration,
    delay: Duration,
}

impl Default for TimeRangeCollector {
    fn default() -> Self {
        Self::new(60, Duration::from_secs(10), Duration::from_secs(0))
    }
}

impl TimeRangeCollector {
    pub fn new(seconds: i64, interval: Duration, delay: Duration) -> Self {
        Self {
            seconds,
            interval,
            delay,
        }
    }

    /// Collects the next window for `profile_id`. Returns `Ok(None)` once
    /// shutdown fires while waiting; the caller treats that the same as "no
    /// window yet" and re-checks its own shutdown flag before looping.
    pub async fn collect(
        &self,
        pool: &PgPool,
        profile_id: i64,
        previous: Option<&Investigation>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<Option<WindowAnomalies>, StoreError> {
        let mut start = match previous {
            Some(investigation) => {
                match InvestigationEventStore::latest_event(pool, investigation.id).await? {
                    Some(event) => event.created_at,
                    None => return Ok(None),
                }
            }
            None => match self.initial_start(pool, profile_id, shutdown).await? {
                Some(start) => start,
                None => return Ok(None),
            },
        };

        loop {
            let end = start + chrono::Duration::seconds(self.seconds);
            if self.wait_for_window_end(end, shutdown).await {
                return Ok(None);
            }

            let anomalies =
                EventStore::fetch_anomalies_in_window(pool, profile_id, start, end).await?;
            if !anomalies.is_empty() {
                return Ok(Some(WindowAnomalies {
                    start,
                    end,
                    anomalies,
                }));
            }

            match EventStore::next_after(pool, profile_id, start).await? {
                Some(event) => start = event.created_at,
                None => {
                    if sleep_or_shutdown(self.interval, shutdown).await {
                        return Ok(None);
                    }
                }
            }
        }
    }

    /// Bootstraps the very first window when no previous investigation
    /// exists: `start` is one second before the earliest event recorded for
    /// this profile, polling until one arrives.
    async fn initial_start(
        &self,
        pool: &PgPool,
        profile_id: i64,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        loop {
            if let Some(event) = EventStore::first_for_profile(pool, profile_id).await? {
                return Ok(Some(event.created_at - chrono::Duration::seconds(1)));
            }
            if sleep_or_shutdown(self.interval, shutdown).await {
                return Ok(None);
            }
        }
    }

    /// Blocks until wall-clock (minus `delay`) reaches `end`. Returns `true`
    /// if shutdown fired first.
    async fn wait_for_window_end(&self, end: DateTime<Utc>, shutdown: &mut watch::Receiver<bool>) -> bool {
        let delay = chrono::Duration::from_std(self.delay).unwrap_or(chrono::Duration::zero());
        loop {
            let now = Utc::now() - delay;
            if now >= end {
                return false;
            }
            let remaining = (end - now).to_std().unwrap_or(Duration::from_millis(0));
            if sleep_or_shutdown(remaining, shutdown).await {
                return true;
            }
        }
    }
}

/// Sleeps for `duration` or until shutdown fires, whichever comes first.
/// Returns `true` if it was shutdown that woke it.
async fn sleep_or_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return true;
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        _ = shutdown.changed() => *shutdown.borrow(),
    }
}
