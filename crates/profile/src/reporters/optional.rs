use std::collections::HashMap;

use crate::reporters::{partition_ranks, Reporter};
use crate::row::{FeatureRow, ScoredRow, ValueRow};

/// Reporter for an optional field (§4.5).
///
/// 1. Value is empty (not reported) ⇒ score 0.
/// 2. Non-empty value seen before (`count > 0`) ⇒ score 0.
/// 3. Unseen non-empty value with no history at all (`total == 0`) ⇒ 1.
/// 4. Otherwise ⇒ the actor's historical null rate `null_count / total`.
///
/// All multiplied by `weight`.
pub struct Optional {
    pub weight: f64,
}

impl Default for Optional {
    fn default() -> Self {
        Self { weight: 1.0 }
    }
}

impl Optional {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

impl Reporter for Optional {
    fn score(&self, values: &[ValueRow], features: &[FeatureRow]) -> Vec<ScoredRow> {
        let mut fa_total: HashMap<i64, i64> = HashMap::new();
        let mut fa_null: HashMap<i64, i64> = HashMap::new();
        let mut fav_count: HashMap<(i64, String), i64> = HashMap::new();
        for feature in features {
            *fa_total.entry(feature.actor_id).or_insert(0) += feature.count;
            if feature.value.is_empty() {
                fa_null.insert(feature.actor_id, feature.count);
            }
            fav_count.insert((feature.actor_id, feature.value.clone()), feature.count);
        }

        let total_rank = partition_ranks(
            values.len(),
            |i| (values[i].actor_id, values[i].timestamp),
            |_| true,
        );
        let null_rank = partition_ranks(
            values.len(),
            |i| (values[i].actor_id, values[i].timestamp),
            |i| values[i].value.is_empty(),
        );
        let count_rank = partition_ranks(
            values.len(),
            |i| ((values[i].actor_id, values[i].value.clone()), values[i].timestamp),
            |_| true,
        );

        values
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let base_total = fa_total.get(&row.actor_id).copied().unwrap_or(0);
                let base_null = fa_null.get(&row.actor_id).copied().unwrap_or(0);
                let base_count = fav_count
                    .get(&(row.actor_id, row.value.clone()))
                    .copied()
                    .unwrap_or(0);

                let effective_total = base_total + total_rank[i];
                let effective_null = base_null + null_rank[i];
                let effective_count = base_count + count_rank[i];

                let score = if row.value.is_empty() {
                    0.0
                } else if effective_count == 0 {
                    if effective_total == 0 {
                        1.0
                    } else {
                        effective_null as f64 / effective_total as f64
                    }
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
    fn empty_value_scores_zero() {
        let values = vec![row(1, 1, "", 0)];
        let scored = Optional::default().score(&values, &[]);
        assert_eq!(scored[0].score, 0.0);
    }

    #[test]
    fn seen_value_scores_zero() {
        let values = vec![row(1, 1, "vpn", 0)];
        let features = vec![feature(1, 1, "vpn", 3)];
        let scored = Optional::default().score(&values, &features);
        assert_eq!(scored[0].score, 0.0);
    }

    #[test]
    fn unseen_value_with_no_history_scores_one() {
        let values = vec![row(1, 1, "vpn", 0)];
        let scored = Optional::default().score(&values, &[]);
        assert_eq!(scored[0].score, 1.0);
    }

    #[test]
    fn unseen_value_with_history_scores_the_null_rate() {
        let values = vec![row(1, 1, "vpn", 0)];
        let features = vec![feature(1, 1, "", 4), feature(1, 1, "proxy", 6)];
        let scored = Optional::default().score(&values, &features);
        // total = 4 + 6 = 10, null_count = 4 -> 0.4
        assert!((scored[0].score - 0.4).abs() < 1e-9);
    }
}
