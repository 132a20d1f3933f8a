//! Reporters: the per-field scoring functions (§4.5), grounded
//! byte-for-byte in `original_source/scrywarden/profile/reporters.py`.

mod mandatory;
mod optional;

pub use mandatory::Mandatory;
pub use optional::Optional;

use crate::row::{FeatureRow, ScoredRow, ValueRow};

/// Assigns an anomaly score in `[0, 1]` to every row in `values`, using the
/// current feature histogram (`features`) plus causally-applied
/// intra-batch increments. `values` contains only rows for the reporter's
/// own field, but may span several actors.
pub trait Reporter: Send + Sync {
    fn score(&self, values: &[ValueRow], features: &[FeatureRow]) -> Vec<ScoredRow>;
}

/// Per-row rank (0-based) within the partition defined by `key_of`, when
/// rows are ordered by `(partition, timestamp)`. Row `i`'s rank equals the
/// number of same-partition rows that sorted strictly before it, so the
/// i-th chronological row in a partition "sees" `i` prior rows from this
/// batch — the incremental-count semantics §4.5 requires.
///
/// `predicate` additionally gates whether a row counts toward the rank
/// seen by *later* rows (used for the groups/null-count counters, which
/// only advance on specific rows rather than every row in the partition).
fn partition_ranks<K: Ord + Clone>(
    len: usize,
    key_of: impl Fn(usize) -> (K, chrono::DateTime<chrono::Utc>),
    predicate: impl Fn(usize) -> bool,
) -> Vec<i64> {
    let mut order: Vec<usize> = (0..len).collect();
    order.sort_by(|&a, &b| key_of(a).cmp(&key_of(b)));

    let mut ranks = vec![0i64; len];
    let mut current_key: Option<K> = None;
    let mut counter = 0i64;
    for idx in order {
        let (key, _) = key_of(idx);
        if current_key.as_ref() != Some(&key) {
            current_key = Some(key);
            counter = 0;
        }
        ranks[idx] = counter;
        if predicate(idx) {
            counter += 1;
        }
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn ranks_restart_at_every_partition_boundary() {
        let ts = |s: i64| Utc.timestamp_opt(s, 0).unwrap();
        let rows = vec![(1, ts(0)), (1, ts(1)), (2, ts(0)), (1, ts(2))];
        let ranks = partition_ranks(
            rows.len(),
            |i| (rows[i].0, rows[i].1),
            |_| true,
        );
        assert_eq!(ranks, vec![0, 1, 0, 2]);
    }
}
