use std::collections::HashMap;

use crate::reporters::{partition_ranks, Reporter};
use crate::row::{FeatureRow, ScoredRow, ValueRow};

/// Reporter that requires a mandatory field (§4.5).
///
/// 1. Unseen value (or empty) ⇒ score 1.
/// 2. `count ≥ mean` ⇒ score 0 (the actor's behavior already matches this
///    value often enough not to be surprising).
/// 3. Otherwise ⇒ `1 - count/total`.
///
/// All multiplied by `weight`.
pub struct Mandatory {
    pub weight: f64,
}

impl Default for Mandatory {
    fn default() -> Self {
        Self { weight: 1.0 }
    }
}

impl Mandatory {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

#[derive(Default, Clone, Copy)]
struct FieldActorAgg {
    groups: i64,
    total: i64,
}

impl Reporter for Mandatory {
    fn score(&self, values: &[ValueRow], features: &[FeatureRow]) -> Vec<ScoredRow> {
        let mut fa_agg: HashMap<i64, FieldActorAgg> = HashMap::new();
        let mut fav_count: HashMap<(i64, String), i64> = HashMap::new();
        for feature in features {
            let agg = fa_agg.entry(feature.actor_id).or_default();
            agg.groups += 1;
            agg.total += feature.count;
            fav_count.insert((feature.actor_id, feature.value.clone()), feature.count);
        }

        let total_rank = partition_ranks(
            values.len(),
            |i| (values[i].actor_id, values[i].timestamp),
            |_| true,
        );
        let count_rank = partition_ranks(
            values.len(),
            |i| ((values[i].actor_id, values[i].value.clone()), values[i].timestamp),
            |_| true,
        );

        let effective_count: Vec<i64> = (0..values.len())
            .map(|i| {
                let base = fav_count
                    .get(&(values[i].actor_id, values[i].value.clone()))
                    .copied()
                    .unwrap_or(0);
                base + count_rank[i]
            })
            .collect();

        let groups_increment = partition_ranks(
            values.len(),
            |i| (values[i].actor_id, values[i].timestamp),
            |i| effective_count[i] == 0,
        );

        values
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let agg = fa_agg.get(&row.actor_id).copied().unwrap_or_default();
                let base_mean = if agg.groups > 0 {
                    agg.total as f64 / agg.groups as f64
                } else {
                    0.0
                };
                let base_count = fav_count
                    .get(&(row.actor_id, row.value.clone()))
                    .copied()
                    .unwrap_or(0);
                let effective_total = agg.total + total_rank[i];
                let effective_groups = agg.groups + groups_increment[i];
                let count = effective_count[i];

                // previous_mean is the leave-one-out mean computed against the
                // pre-batch aggregate (agg.groups, base_count), not the
                // intra-batch-incremented values used below for mean/score.
                let previous_mean = if base_count == 0 {
                    base_mean
                } else if agg.groups > 1 {
                    (base_mean * agg.groups as f64 - base_count as f64) / (agg.groups as f64 - 1.0)
                } else {
                    0.0
                };
                let mean = if effective_groups > 0 {
                    previous_mean + (count as f64 - previous_mean) / effective_groups as f64
                } else {
                    0.0
                };

                let score = if row.value.is_empty() || count == 0 {
                    1.0
                } else if (count as f64) < mean {
                    1.0 - (count as f64 / effective_total as f64)
                } else {
                    0.0
                };

                ScoredRow {
                    message_id: row.message_id,
                    timestamp: row.timestamp,
                    actor_id: row.actor_id,
                    field_id: row.field_id,
                    value: row.value.clone(),
                    score: score * self.weight,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn row(actor_id: i64, field_id: i64, value: &str, secs: i64) -> ValueRow {
        ValueRow {
            message_id: Uuid::new_v4(),
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            actor_id,
            field_id,
            value: value.to_string(),
        }
    }

    fn feature(actor_id: i64, field_id: i64, value: &str, count: i64) -> FeatureRow {
        FeatureRow {
            feature_id: 1,
            field_id,
            actor_id,
            value: value.to_string(),
            count,
        }
    }

    #[test]
    fn unseen_value_scores_one() {
        let values = vec![row(1, 1, "hello", 0)];
        let scored = Mandatory::default().score(&values, &[]);
        assert_eq!(scored[0].score, 1.0);
    }

    #[test]
    fn most_frequent_value_scores_zero() {
        let values = vec![row(1, 1, "hello", 100)];
        let features = vec![feature(1, 1, "hello", 100)];
        let scored = Mandatory::default().score(&values, &features);
        assert_eq!(scored[0].score, 0.0);
    }

    #[test]
    fn boundary_count_equals_mean_scores_zero() {
        // groups=1, total=100, mean=100 -> count(100) >= mean(100) -> 0
        let values = vec![row(1, 1, "hello", 0)];
        let features = vec![feature(1, 1, "hello", 100)];
        let scored = Mandatory::default().score(&values, &features);
        assert_eq!(scored[0].score, 0.0);
    }

    #[test]
    fn drift_to_a_new_value_scores_one_then_recovers() {
        // Actor has 100 "hello"s on record; one "goodbye" arrives, unseen.
        let values = vec![row(1, 1, "goodbye", 0)];
        let features = vec![feature(1, 1, "hello", 100)];
        let scored = Mandatory::default().score(&values, &features);
        assert_eq!(scored[0].score, 1.0);
    }

    #[test]
    fn weight_scales_the_final_score() {
        let values = vec![row(1, 1, "hello", 0)];
        let scored = Mandatory::new(0.5).score(&values, &[]);
        assert_eq!(scored[0].score, 0.5);
    }

    #[test]
    fn intra_batch_repeats_see_rising_counts() {
        // Cold start: three identical messages arrive in the same batch for
        // a brand-new value. The first is unseen (score 1); by the third,
        // count/total have been causally incremented within the batch.
        let values = vec![
            row(1, 1, "hello", 0),
            row(1, 1, "hello", 1),
            row(1, 1, "hello", 2),
        ];
        let scored = Mandatory::default().score(&values, &[]);
        assert_eq!(scored[0].score, 1.0);
        // Second row: count=1 (from first row), groups=1 (still <=1) so
        // previous_mean stays 0, mean becomes 0 + (1-0)/1 = 1. count(1) is
        // not < mean(1), so score falls to the "matches profile" branch: 0.
        assert_eq!(scored[1].score, 0.0);
        assert_eq!(scored[2].score, 0.0);
    }

    #[test]
    fn previous_mean_uses_the_pre_batch_base_not_intra_batch_counts() {
        // History: actor has "a" x3 and "b" x1 (groups=2, total=4, mean=2.0).
        // Batch of two "b"s: previous_mean must be computed from the base
        // groups/count (2, 1), not from the intra-batch-incremented values,
        // or the second row's anomaly gets suppressed.
        let values = vec![row(1, 1, "b", 0), row(1, 1, "b", 1)];
        let features = vec![feature(1, 1, "a", 3), feature(1, 1, "b", 1)];
        let scored = Mandatory::default().score(&values, &features);
        // previous_mean = (2*2 - 1)/1 = 3.0, mean = 3.0 + (2-3.0)/2 = 2.5,
        // count(2) < mean(2.5) -> score = 1 - 2/5 = 0.6
        assert!((scored[1].score - 0.6).abs() < 1e-9);
    }
}
