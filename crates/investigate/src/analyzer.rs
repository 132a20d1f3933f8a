//! `ExponentialDecayAnalyzer` (§4.7): groups a window's anomalies by actor
//! and keeps only the actors whose decayed mean score clears a threshold.
//! Grounded in
//! `original_source/scrywarden/investigator/analyzer.py::ExponentialDecayAnalyzer`.

use std::collections::{HashMap, HashSet};

use warden_store::models::AnomalyEventRow;

pub struct ExponentialDecayAnalyzer {
    weight: f64,
    decay: f64,
    threshold: f64,
}

impl Default for ExponentialDecayAnalyzer {
    fn default() -> Self {
        Self {
            weight: 0.2,
            decay: 0.1,
            threshold: 0.5,
        }
    }
}

impl ExponentialDecayAnalyzer {
    pub fn new(weight: f64, decay: f64, threshold: f64) -> Self {
        Self {
            weight,
            decay,
            threshold,
        }
    }

    /// Returns the subset of `anomalies` whose actor's weighted mean clears
    /// `threshold`. A larger cluster of anomalies for one actor needs a
    /// lower raw mean to pass, since the discount decays with `count`.
    pub fn filter(&self, anomalies: &[AnomalyEventRow]) -> Vec<AnomalyEventRow> {
        let mut groups: HashMap<i64, Vec<&AnomalyEventRow>> = HashMap::new();
        for row in anomalies {
            groups.entry(row.actor_id).or_default().push(row);
        }

        let mut passing: HashSet<i64> = HashSet::new();
        for (actor_id, rows) in &groups {
            let count = rows.len() as i32;
            let mean: f64 = rows.iter().map(|row| row.score).sum::<f64>() / count as f64;
            let weighted_mean = mean - self.weight * (1.0 - self.decay).powi(count - 1);
            if weighted_mean >= self.threshold {
                passing.insert(*actor_id);
            }
        }

        anomalies
            .iter()
            .filter(|row| passing.contains(&row.actor_id))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn row(actor_id: i64, score: f64) -> AnomalyEventRow {
        AnomalyEventRow {
            event_id: 1,
            message_id: Uuid::new_v4(),
            actor_id,
            created_at: Utc::now(),
            anomaly_id: 1,
            field_id: 1,
            feature_id: 1,
            score,
        }
    }

    #[test]
    fn a_small_high_scoring_cluster_and_a_large_one_both_pass() {
        let analyzer = ExponentialDecayAnalyzer::new(0.2, 0.1, 0.5);
        let mut anomalies = vec![row(1, 0.9), row(1, 0.9)];
        anomalies.extend((0..20).map(|_| row(2, 0.9)));

        let kept = analyzer.filter(&anomalies);
        let actors: HashSet<i64> = kept.iter().map(|r| r.actor_id).collect();
        assert!(actors.contains(&1));
        assert!(actors.contains(&2));
    }

    #[test]
    fn a_single_anomaly_at_point_nine_passes_at_threshold_point_seven() {
        let analyzer = ExponentialDecayAnalyzer::new(0.2, 0.1, 0.7);
        let kept = analyzer.filter(&[row(1, 0.9)]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn a_single_anomaly_at_point_six_fails_at_threshold_point_seven() {
        let analyzer = ExponentialDecayAnalyzer::new(0.2, 0.1, 0.7);
        let kept = analyzer.filter(&[row(1, 0.6)]);
        assert!(kept.is_empty());
    }
}
