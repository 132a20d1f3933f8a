//! `identify`/`process`: the two profile-engine operations the pipeline
//! coordinator calls once per cycle (§4.3 steps 2 and 6). Grounded in
//! `original_source/scrywarden/profile/base.py`'s `Profile.identify` and
//! `Profile.process`.

use std::collections::HashMap;

use uuid::Uuid;
use warden_core::value::encode_value;
use warden_core::{Message, RowError};

use crate::definition::ProfileDefinition;
use crate::row::{FeatureRow, IdentifiedRow, ScoredRow, ValueRow};

/// Extracts every `(actor, field, value)` row this profile cares about
/// from `messages`. Messages that fail `matches` are skipped; a message
/// whose actor can't be resolved to a non-empty string is logged and
/// dropped in full (§7 `RowError::InvalidActor`).
pub fn identify(profile: &ProfileDefinition, messages: &[Message]) -> Vec<IdentifiedRow> {
    let mut rows = Vec::new();
    for message in messages {
        if !profile.matches(message) {
            continue;
        }
        let actor_name = match profile.get_actor(message) {
            Some(name) if !name.is_empty() => name,
            _ => {
                let error = RowError::InvalidActor {
                    message_id: message.id,
                };
                tracing::warn!(profile = %profile.name, error = %error, "dropping row");
                continue;
            }
        };
        for field in profile.fields() {
            let value = field.extractor.extract(&field.name, message);
            let encoded = encode_value(value.as_ref());
            rows.push(IdentifiedRow {
                message_id: message.id,
                timestamp: message.timestamp,
                actor_name: actor_name.clone(),
                field_name: field.name.clone(),
                value: encoded,
            });
        }
    }
    rows
}

/// Groups `values` by field (in the profile's declared field order) and
/// runs each field's reporter, threading the feature snapshot forward so
/// that count updates from field N are visible to field N+1 (§4.3 step 6).
///
/// `field_ids[i]` must be the database id of `profile.fields()[i]`.
pub fn process(
    profile: &ProfileDefinition,
    field_ids: &[i64],
    values: Vec<ValueRow>,
    mut features: Vec<FeatureRow>,
) -> (Vec<ScoredRow>, Vec<FeatureRow>) {
    let mut by_field: HashMap<i64, Vec<ValueRow>> = HashMap::new();
    for value in values {
        by_field.entry(value.field_id).or_default().push(value);
    }

    let mut results = Vec::new();
    for (field, &field_id) in profile.fields().iter().zip(field_ids) {
        let Some(group) = by_field.remove(&field_id) else {
            continue;
        };
        let scored = field.reporter.score(&group, &features);
        features = update_feature_count(&group, features);
        results.extend(scored);
    }
    (results, features)
}

/// Folds a batch's `(field_id, actor_id, value)` counts into `features`:
/// rows already present get `count` bumped by the number of distinct
/// `message_id`s seen this batch; new triples are appended with
/// `feature_id = 0`, resolved to a real id when the pipeline persists them
/// (§4.4).
pub fn update_feature_count(values: &[ValueRow], mut features: Vec<FeatureRow>) -> Vec<FeatureRow> {
    let mut deltas: HashMap<(i64, i64, String), std::collections::HashSet<Uuid>> = HashMap::new();
    for value in values {
        deltas
            .entry((value.field_id, value.actor_id, value.value.clone()))
            .or_default()
            .insert(value.message_id);
    }

    let mut index: HashMap<(i64, i64, String), usize> = HashMap::new();
    for (i, feature) in features.iter().enumerate() {
        index.insert(
            (feature.field_id, feature.actor_id, feature.value.clone()),
            i,
        );
    }

    for (key, message_ids) in deltas {
        let delta = message_ids.len() as i64;
        if let Some(&i) = index.get(&key) {
            features[i].count += delta;
        } else {
            let (field_id, actor_id, value) = key;
            features.push(FeatureRow {
                feature_id: 0,
                field_id,
                actor_id,
                value,
                count: delta,
            });
        }
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDefinition;
    use crate::reporters::Mandatory;
    use chrono::Utc;
    use serde_json::json;

    fn example_profile() -> ProfileDefinition {
        ProfileDefinition::new(
            "example",
            |m| m.get("greeting").is_some(),
            |m| m.get("person").and_then(|v| v.as_str()).map(str::to_string),
        )
        .with_field(FieldDefinition::single("greeting", Mandatory::default()))
        .unwrap()
    }

    #[test]
    fn identify_skips_messages_that_do_not_match() {
        let profile = example_profile();
        let messages = vec![
            Message::new(Utc::now(), json!({"person": "George", "greeting": "hello"})),
            Message::new(Utc::now(), json!({"person": "George"})),
        ];
        let rows = identify(&profile, &messages);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].actor_name, "George");
        assert_eq!(rows[0].value, "hello");
    }

    #[test]
    fn identify_drops_rows_with_no_actor() {
        let profile = example_profile();
        let messages = vec![Message::new(Utc::now(), json!({"greeting": "hello"}))];
        let rows = identify(&profile, &messages);
        assert!(rows.is_empty());
    }

    #[test]
    fn cold_start_first_message_scores_one_and_seeds_the_feature() {
        let profile = example_profile();
        let value_row = ValueRow {
            message_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id: 1,
            field_id: 1,
            value: "hello".to_string(),
        };
        let (scored, features) = process(&profile, &[1], vec![value_row], Vec::new());
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].score, 1.0);
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].count, 1);
        assert_eq!(features[0].feature_id, 0);
    }

    #[test]
    fn update_feature_count_appends_missing_and_bumps_existing() {
        let features = vec![
            FeatureRow { feature_id: 1, field_id: 1, actor_id: 1, value: "\"Hello\"".into(), count: 4 },
            FeatureRow { feature_id: 2, field_id: 1, actor_id: 2, value: "\"Greetings\"".into(), count: 2 },
        ];
        let m1 = Uuid::new_v4();
        let m2 = Uuid::new_v4();
        let values = vec![
            ValueRow { message_id: m1, timestamp: Utc::now(), actor_id: 2, field_id: 1, value: "\"Greetings\"".into() },
            ValueRow { message_id: m2, timestamp: Utc::now(), actor_id: 1, field_id: 2, value: "\"Whats up?\"".into() },
        ];
        let updated = update_feature_count(&values, features);
        let greetings = updated.iter().find(|f| f.value == "\"Greetings\"").unwrap();
        assert_eq!(greetings.count, 3);
        let new_one = updated.iter().find(|f| f.value == "\"Whats up?\"").unwrap();
        assert_eq!(new_one.feature_id, 0);
        assert_eq!(new_one.count, 1);
    }
}
