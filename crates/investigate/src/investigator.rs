//! Per-profile investigator task (§4.6): claims the next index in its
//! profile's investigation group, collects a window of anomalies, filters
//! them through the Analyzer, and emits survivors to the curator.

use sqlx::PgPool;
use tokio::sync::watch;
use uuid::Uuid;

use warden_core::ExponentialBackoff;
use warden_queue::Sender;
use warden_store::models::Investigation;
use warden_store::{
    InvestigationGroupStore, InvestigationStore, InvestigatorStore, StoreError,
};

use crate::analyzer::ExponentialDecayAnalyzer;
use crate::collector::TimeRangeCollector;
use crate::entry::InvestigatorEntry;
use crate::error::InvestigateError;

enum CycleOutcome {
    Continue,
    Shutdown,
}

pub struct Investigator {
    pool: PgPool,
    id: Uuid,
    profile_id: i64,
    profile_name: String,
    collector: TimeRangeCollector,
    analyzer: ExponentialDecayAnalyzer,
    sender: Sender<InvestigatorEntry>,
}

impl Investigator {
    pub fn new(
        pool: PgPool,
        profile_id: i64,
        profile_name: impl Into<String>,
        collector: TimeRangeCollector,
        analyzer: ExponentialDecayAnalyzer,
        sender: Sender<InvestigatorEntry>,
    ) -> Self {
        Self {
            pool,
            id: Uuid::new_v4(),
            profile_id,
            profile_name: profile_name.into(),
            collector,
            analyzer,
            sender,
        }
    }

    /// Registers this investigator, loops cycles until shutdown, then
    /// deregisters and emits its own shutdown entry so the curator can tell
    /// when every investigator has exited (§4.6 end, §4.8).
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        if let Err(error) = InvestigatorStore::register(&self.pool, self.id, self.profile_id).await {
            tracing::error!(profile = self.profile_name, error = %error, "failed to register investigator");
            let _ = self
                .sender
                .send(InvestigatorEntry::Shutdown {
                    profile: self.profile_name.clone(),
                })
                .await;
            return;
        }

        let group = match InvestigationGroupStore::get_or_create(&self.pool, self.profile_id, "").await {
            Ok(group) => group,
            Err(error) => {
                tracing::error!(profile = self.profile_name, error = %error, "failed to sync investigation group");
                let _ = InvestigatorStore::deregister(&self.pool, self.id).await;
                let _ = self
                    .sender
                    .send(InvestigatorEntry::Shutdown {
                        profile: self.profile_name.clone(),
                    })
                    .await;
                return;
            }
        };

        loop {
            if *shutdown.borrow() {
                break;
            }
            match self.cycle(group.id, &mut shutdown).await {
                Ok(CycleOutcome::Shutdown) => break,
                Ok(CycleOutcome::Continue) => {}
                Err(error) => {
                    tracing::warn!(profile = self.profile_name, error = %error, "investigator cycle failed, retrying");
                }
            }
        }

        let _ = InvestigatorStore::deregister(&self.pool, self.id).await;
        let _ = self
            .sender
            .send(InvestigatorEntry::Shutdown {
                profile: self.profile_name.clone(),
            })
            .await;
    }

    /// One claim → collect → analyze → emit pass (§4.6 steps 1-7).
    async fn cycle(
        &mut self,
        group_id: i64,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<CycleOutcome, InvestigateError> {
        let previous = 'fetch: loop {
            match InvestigationStore::latest_in_group(&self.pool, group_id).await? {
                None => break 'fetch None,
                Some(investigation) if investigation.is_assigned => break 'fetch Some(investigation),
                Some(investigation) => {
                    if let Some(outcome) =
                        self.wait_until_assigned(investigation, shutdown).await?
                    {
                        break 'fetch outcome;
                    }
                    continue 'fetch;
                }
            }
        };

        let next_index = previous.as_ref().and_then(|p| p.index).map(|i| i + 1).unwrap_or(1);
        let investigation =
            match InvestigationStore::try_create(&self.pool, group_id, next_index, self.id).await {
                Ok(investigation) => investigation,
                Err(StoreError::IndexConflict { .. }) => return Ok(CycleOutcome::Continue),
                Err(error) => return Err(error.into()),
            };

        let window = self
            .collector
            .collect(&self.pool, self.profile_id, previous.as_ref(), shutdown)
            .await?;

        let Some(window) = window else {
            InvestigationStore::delete(&self.pool, investigation.id).await?;
            if *shutdown.borrow() {
                return Ok(CycleOutcome::Shutdown);
            }
            return Ok(CycleOutcome::Continue);
        };

        let mut event_ids: Vec<i64> = window.anomalies.iter().map(|row| row.event_id).collect();
        event_ids.sort_unstable();
        event_ids.dedup();
        InvestigationStore::assign(&self.pool, investigation.id, &event_ids).await?;

        let malicious = self.analyzer.filter(&window.anomalies);
        InvestigationStore::complete(&self.pool, investigation.id, chrono::Utc::now()).await?;

        self.sender
            .send_with_backoff(InvestigatorEntry::MaliciousActivity {
                investigation,
                anomalies: malicious,
            })
            .await?;

        Ok(CycleOutcome::Continue)
    }

    /// Polls `investigation` until it is assigned, reaping it if its
    /// claiming investigator died first (`created_by` row gone). Returns
    /// `Some(outcome)` once resolved, or `None` to signal the caller should
    /// restart the fetch from scratch (the row was reaped out from under
    /// it).
    async fn wait_until_assigned(
        &self,
        investigation: Investigation,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<Option<Option<Investigation>>, InvestigateError> {
        let mut backoff = ExponentialBackoff::new(2, 1.0);
        loop {
            if *shutdown.borrow() {
                return Ok(Some(Some(investigation)));
            }
            match InvestigationStore::get(&self.pool, investigation.id).await? {
                None => return Ok(None),
                Some(refreshed) if refreshed.is_assigned => return Ok(Some(Some(refreshed))),
                Some(refreshed) if refreshed.created_by.is_none() => {
                    InvestigationStore::delete(&self.pool, refreshed.id).await?;
                    return Ok(None);
                }
                Some(_) => {
                    let delay = backoff.next();
                    if sleep_or_shutdown(delay, shutdown).await {
                        return Ok(Some(Some(investigation)));
                    }
                }
            }
        }
    }
}

async fn sleep_or_shutdown(duration: std::time::Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return true;
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        _ = shutdown.changed() => *shutdown.borrow(),
    }
}
