//! The Pipeline Coordinator (§4.3): the single consumer task that batches
//! messages, drives `identify` → actor upsert → feature fetch → per-profile
//! scoring → feature upsert → event/anomaly write once per cycle.
//!
//! Grounded in the teacher's long-running consumer shape
//! (`crates/segment/src/manager.rs`'s buffer-then-flush loop) generalized
//! to this system's batching triggers (size OR timeout) and its own
//! multi-step write path.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use warden_core::config::Config;
use warden_core::timing::Benchmark;
use warden_core::Message;
use warden_profile::{
    build_profile, identify, process, FeatureRow, IdentifiedRow, ProfileDefinition, ValueRow,
};
use warden_queue::{bounded, Receiver, Sender};
use warden_store::{
    ActorStore, AnomalyStore, EventStore, FeatureStore, FieldStore, MessageStore, NewAnomaly,
    ProfileStore,
};
use warden_transport::{build_transport, run_transport, TransportEntry};

use crate::entry::PipelineEntry;
use crate::error::PipelineError;

struct RegisteredProfile {
    profile_id: i64,
    definition: ProfileDefinition,
    field_ids: Vec<i64>,
    field_index: HashMap<String, i64>,
}

/// One `(field_id, actor_id, value)` row extracted this cycle, with the
/// actor name already resolved to its database id.
struct PendingRow {
    profile_idx: usize,
    message_id: Uuid,
    timestamp: DateTime<Utc>,
    actor_id: i64,
    field_id: i64,
    value: String,
}

/// Syncs every configured profile: get-or-create the `Profile` row, then
/// get-or-create each of its fields in declaration order. Mirrors
/// `Profile.sync` / `Pipeline.start`'s profile-sync pass.
async fn sync_profiles(
    pool: &sqlx::PgPool,
    profiles: &HashMap<String, warden_core::config::ProfileConfigEntry>,
) -> Result<Vec<RegisteredProfile>, PipelineError> {
    let mut registered = Vec::with_capacity(profiles.len());
    for (name, entry) in profiles {
        let raw = warden_core::config::RawPlugin {
            class: entry.class.clone(),
            config: entry.config.clone(),
            limit: None,
        };
        let definition = build_profile(name, &raw)?;
        let profile_row = ProfileStore::get_or_create(pool, &definition.name).await?;

        let mut field_ids = Vec::with_capacity(definition.fields().len());
        let mut field_index = HashMap::with_capacity(definition.fields().len());
        for field in definition.fields() {
            let field_row = FieldStore::get_or_create(pool, profile_row.id, &field.name).await?;
            field_ids.push(field_row.id);
            field_index.insert(field.name.clone(), field_row.id);
        }

        registered.push(RegisteredProfile {
            profile_id: profile_row.id,
            definition,
            field_ids,
            field_index,
        });
    }
    Ok(registered)
}

pub struct Coordinator {
    pool: sqlx::PgPool,
    registered: Vec<RegisteredProfile>,
    queue_size: usize,
    timeout: Duration,
    sender: Sender<PipelineEntry>,
    receiver: Receiver<PipelineEntry>,
    transports: HashSet<String>,
}

impl Coordinator {
    /// Syncs profiles, launches every configured transport, and runs the
    /// main loop to completion (every transport having shut down, or the
    /// process having been asked to stop). `shutdown` is the process-wide
    /// signal (SIGINT/SIGTERM, owned by the CLI binary); it's forwarded to
    /// every transport and also wakes the main loop directly so a shutdown
    /// during an idle wait doesn't have to wait for transport exhaustion.
    pub async fn start(
        pool: sqlx::PgPool,
        config: &Config,
        shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> Result<(), PipelineError> {
        let registered = sync_profiles(&pool, &config.profiles).await?;
        let (sender, receiver) = bounded::<PipelineEntry>(config.pipeline.queue_size);

        let mut transports = HashSet::new();
        let mut handles = Vec::new();

        for (name, raw) in &config.transports {
            let transport = build_transport(name, raw)?;
            transports.insert(name.clone());

            let (bridge_tx, mut bridge_rx) = bounded::<TransportEntry>(config.pipeline.queue_size);
            let forward_to = sender.clone();
            handles.push(tokio::spawn(async move {
                while let Some(entry) = bridge_rx.recv().await {
                    if forward_to.send(PipelineEntry::Transport(entry)).await.is_err() {
                        break;
                    }
                }
            }));
            handles.push(tokio::spawn(run_transport(
                transport,
                bridge_tx,
                shutdown.clone(),
            )));
        }

        let mut coordinator = Coordinator {
            pool,
            registered,
            queue_size: config.pipeline.queue_size,
            timeout: Duration::from_secs_f64(config.pipeline.timeout),
            sender,
            receiver,
            transports,
        };
        coordinator.run(shutdown).await;

        for handle in handles {
            let _ = handle.await;
        }
        Ok(())
    }

    /// Main loop: block on the queue, handle one entry, run a process
    /// cycle once the buffer is full or the timer flag is set (§4.3).
    async fn run(&mut self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        let mut messages: Vec<Message> = Vec::new();
        let mut timeout_flag = false;
        let mut process_id = Uuid::new_v4();
        let active_process_id = Arc::new(Mutex::new(process_id));
        let mut timer_handle: Option<tokio::task::JoinHandle<()>> = None;

        loop {
            if *shutdown.borrow() {
                break;
            }
            let entry = tokio::select! {
                entry = self.receiver.recv() => entry,
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            };
            let Some(entry) = entry else {
                break;
            };

            match entry {
                PipelineEntry::Transport(TransportEntry::Message { message, .. }) => {
                    messages.push(message);
                    if messages.len() == 1 {
                        if let Some(handle) = timer_handle.take() {
                            handle.abort();
                        }
                        timer_handle = Some(self.arm_timer(process_id, active_process_id.clone()));
                    }
                }
                PipelineEntry::Transport(TransportEntry::Shutdown { source }) => {
                    self.transports.remove(&source);
                }
                PipelineEntry::Blip => {
                    timeout_flag = true;
                }
            }

            if messages.len() >= self.queue_size || timeout_flag {
                if let Some(handle) = timer_handle.take() {
                    handle.abort();
                }
                let batch = std::mem::take(&mut messages);
                if let Err(error) = self.process_cycle(batch).await {
                    tracing::error!(error = %error, "process cycle failed");
                }
                timeout_flag = false;
                process_id = Uuid::new_v4();
                *active_process_id.lock().unwrap() = process_id;
            }

            if self.transports.is_empty() {
                break;
            }
        }

        if !messages.is_empty() {
            if let Err(error) = self.process_cycle(messages).await {
                tracing::error!(error = %error, "final process cycle failed");
            }
        }
    }

    /// Arms a one-shot timer that blips the queue after `timeout`, but only
    /// if `captured` is still the active `process_id` when it fires — a
    /// cycle that already ran (and regenerated `process_id`) invalidates any
    /// timer armed before it (§4.3, REDESIGN FLAGS §5).
    fn arm_timer(
        &self,
        captured: Uuid,
        active_process_id: Arc<Mutex<Uuid>>,
    ) -> tokio::task::JoinHandle<()> {
        let timeout = self.timeout;
        let sender = self.sender.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if *active_process_id.lock().unwrap() != captured {
                return;
            }
            let _ = sender.send(PipelineEntry::Blip).await;
        })
    }

    /// One process cycle (§4.3 steps 1–9).
    async fn process_cycle(&mut self, messages: Vec<Message>) -> Result<(), PipelineError> {
        if messages.is_empty() {
            return Ok(());
        }
        let _bench = Benchmark::start("pipeline_process_cycle");

        let messages_by_id: HashMap<Uuid, &Message> =
            messages.iter().map(|m| (m.id, m)).collect();

        // Step 2: identify, per profile.
        let mut identified: Vec<(usize, IdentifiedRow)> = Vec::new();
        for (idx, reg) in self.registered.iter().enumerate() {
            for row in identify(&reg.definition, &messages) {
                identified.push((idx, row));
            }
        }

        // Step 3: sort all profile outputs by timestamp, stable.
        identified.sort_by(|a, b| a.1.timestamp.cmp(&b.1.timestamp));

        // Step 4: actor upsert.
        let mut actor_pairs: HashSet<(i64, String)> = HashSet::new();
        for (idx, row) in &identified {
            actor_pairs.insert((self.registered[*idx].profile_id, row.actor_name.clone()));
        }
        let actor_pairs: Vec<(i64, String)> = actor_pairs.into_iter().collect();
        let actor_index = ActorStore::get_or_create_many(&self.pool, &actor_pairs).await?;

        let mut pending = Vec::with_capacity(identified.len());
        for (idx, row) in identified {
            let reg = &self.registered[idx];
            let Some(&field_id) = reg.field_index.get(&row.field_name) else {
                continue;
            };
            let actor_id = match actor_index.get(&(reg.profile_id, row.actor_name.clone())) {
                Some(id) => *id,
                None => continue,
            };
            pending.push(PendingRow {
                profile_idx: idx,
                message_id: row.message_id,
                timestamp: row.timestamp,
                actor_id,
                field_id,
                value: row.value,
            });
        }

        if pending.is_empty() {
            return Ok(());
        }

        // Step 5: feature fetch, cartesian over every field/actor touched.
        let field_ids: Vec<i64> = pending.iter().map(|r| r.field_id).collect::<HashSet<_>>().into_iter().collect();
        let actor_ids: Vec<i64> = pending.iter().map(|r| r.actor_id).collect::<HashSet<_>>().into_iter().collect();
        let rows = FeatureStore::fetch_for_batch(&self.pool, &field_ids, &actor_ids).await?;
        let mut features: Vec<FeatureRow> = rows
            .into_iter()
            .map(|f| FeatureRow {
                feature_id: f.id,
                field_id: f.field_id,
                actor_id: f.actor_id,
                value: f.value,
                count: f.count,
            })
            .collect();

        // Step 6: score per profile, threading the feature snapshot forward.
        let mut scored = Vec::new();
        for (idx, reg) in self.registered.iter().enumerate() {
            let values: Vec<ValueRow> = pending
                .iter()
                .filter(|r| r.profile_idx == idx)
                .map(|r| ValueRow {
                    message_id: r.message_id,
                    timestamp: r.timestamp,
                    actor_id: r.actor_id,
                    field_id: r.field_id,
                    value: r.value.clone(),
                })
                .collect();
            if values.is_empty() {
                continue;
            }
            let (profile_scored, next_features) =
                process(&reg.definition, &reg.field_ids, values, features);
            features = next_features;
            scored.extend(profile_scored);
        }

        // Step 7: anomalies are the scored rows with a positive score.
        let anomalies: Vec<_> = scored.into_iter().filter(|row| row.score > 0.0).collect();
        if anomalies.is_empty() {
            return Ok(());
        }

        // Step 8: feature upsert — delta is the distinct message_id count
        // per (field_id, actor_id, value) seen anywhere in the batch, not
        // just in the anomaly subset (a score of 0 still updates history).
        let deltas = feature_deltas(&pending);
        let mut feature_ids: HashMap<(i64, i64, String), i64> = HashMap::new();
        for ((field_id, actor_id, value), message_ids) in deltas {
            let feature = FeatureStore::increment(
                &self.pool,
                field_id,
                actor_id,
                &value,
                message_ids.len() as i64,
            )
            .await?;
            feature_ids.insert((field_id, actor_id, value), feature.id);
        }

        // Step 9: event/anomaly write, grouped by (message_id, actor_id).
        let mut groups: HashMap<(Uuid, i64), (DateTime<Utc>, Vec<NewAnomaly>)> = HashMap::new();
        for row in &anomalies {
            let feature_id = feature_ids
                .get(&(row.field_id, row.actor_id, row.value.clone()))
                .copied()
                .unwrap_or(0);
            let entry = groups
                .entry((row.message_id, row.actor_id))
                .or_insert_with(|| (row.timestamp, Vec::new()));
            entry.1.push(NewAnomaly {
                field_id: row.field_id,
                feature_id,
                score: row.score,
            });
        }

        let message_rows: Vec<(Uuid, serde_json::Value)> = groups
            .keys()
            .map(|(message_id, _)| *message_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .filter_map(|id| messages_by_id.get(&id).map(|m| (id, m.data.clone())))
            .collect();
        MessageStore::insert_many(&self.pool, &message_rows).await?;

        for ((message_id, actor_id), (timestamp, group_anomalies)) in groups {
            let event_id = EventStore::insert(&self.pool, message_id, actor_id, timestamp).await?;
            AnomalyStore::insert_many(&self.pool, event_id, &group_anomalies).await?;
        }

        Ok(())
    }
}

/// Groups `pending` by `(field_id, actor_id, value)` and counts the
/// distinct `message_id`s in each group — the per-batch delta the feature
/// upsert adds to the persisted count (§4.3 step 8).
fn feature_deltas(pending: &[PendingRow]) -> HashMap<(i64, i64, String), HashSet<Uuid>> {
    let mut deltas: HashMap<(i64, i64, String), HashSet<Uuid>> = HashMap::new();
    for row in pending {
        deltas
            .entry((row.field_id, row.actor_id, row.value.clone()))
            .or_default()
            .insert(row.message_id);
    }
    deltas
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn pending(field_id: i64, actor_id: i64, value: &str, message_id: Uuid) -> PendingRow {
        PendingRow {
            profile_idx: 0,
            message_id,
            timestamp: Utc::now(),
            actor_id,
            field_id,
            value: value.to_string(),
        }
    }

    #[test]
    fn feature_deltas_counts_distinct_messages_per_triple() {
        let m1 = Uuid::new_v4();
        let m2 = Uuid::new_v4();
        let rows = vec![
            pending(1, 1, "hello", m1),
            pending(1, 1, "hello", m1), // same message, same field/actor/value twice
            pending(1, 1, "hello", m2),
            pending(1, 1, "goodbye", m2),
        ];
        let deltas = feature_deltas(&rows);
        assert_eq!(deltas[&(1, 1, "hello".to_string())].len(), 2);
        assert_eq!(deltas[&(1, 1, "goodbye".to_string())].len(), 1);
    }

    #[test]
    fn feature_deltas_is_empty_for_no_rows() {
        assert!(feature_deltas(&[]).is_empty());
    }
}
