use chrono::{DateTime, Utc};
use mnemosyne_entities::semantic_memory;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictType {
  NoConflict,
  ValueMismatch,
  TemporalInconsistency,
  LogicalContradiction,
}

impl ConflictType {
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::NoConflict => "no_conflict",
      Self::ValueMismatch => "value_mismatch",
      Self::TemporalInconsistency => "temporal_inconsistency",
      Self::LogicalContradiction => "logical_contradiction",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
  TrustRecent,
  TrustConfident,
  TrustReinforced,
  RequireClarification,
}

/// Predicate pairs that cannot both hold for the same subject at once, even
/// though they aren't the same predicate string. Configured rather than
/// inferred, since "mutually exclusive" is domain knowledge no heuristic can
/// reconstruct from the text alone.
const MUTUALLY_EXCLUSIVE_PREDICATES: &[(&str, &str)] = &[
  ("payment_terms_net_30", "payment_terms_net_60"),
  ("prefers_pickup", "prefers_delivery"),
];

fn are_mutually_exclusive(a: &str, b: &str) -> bool {
  MUTUALLY_EXCLUSIVE_PREDICATES
    .iter()
    .any(|(x, y)| (x == &a && y == &b) || (x == &b && y == &a))
}

/// Classify the relationship between an existing semantic memory and a
/// freshly extracted `(predicate, object_value)` pair for the same subject.
#[must_use]
pub fn classify(existing: &semantic_memory::Model, new_predicate: &str, new_object: &Value) -> ConflictType {
  if existing.predicate == new_predicate {
    if &existing.object_value == new_object {
      return ConflictType::NoConflict;
    }
    if looks_temporal(&existing.object_value) && looks_temporal(new_object) {
      return ConflictType::TemporalInconsistency;
    }
    return ConflictType::ValueMismatch;
  }

  if are_mutually_exclusive(&existing.predicate, new_predicate) {
    return ConflictType::LogicalContradiction;
  }

  ConflictType::NoConflict
}

fn looks_temporal(value: &Value) -> bool {
  value
    .as_str()
    .is_some_and(|s| DateTime::parse_from_rfc3339(s).is_ok() || chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok())
}

/// Deterministic tie-break between an existing memory and the incoming
/// observation made at `new_confidence`/`new_reinforcement`/`now`.
#[must_use]
pub fn resolve(
  existing: &semantic_memory::Model,
  now: DateTime<Utc>,
  new_confidence: f64,
  new_reinforcement_count: i32,
) -> ResolutionStrategy {
  let age_days = (now - existing.created_at.with_timezone(&Utc)).num_days();
  if age_days > 30 {
    return ResolutionStrategy::TrustRecent;
  }

  if (new_confidence - existing.confidence).abs() > 0.20 {
    return ResolutionStrategy::TrustConfident;
  }

  if (new_reinforcement_count - existing.reinforcement_count).unsigned_abs() > 3 {
    return ResolutionStrategy::TrustReinforced;
  }

  ResolutionStrategy::RequireClarification
}

#[cfg(test)]
mod tests {
  use super::*;
  use sea_orm::prelude::PgVector;
  use serde_json::json;
  use uuid::Uuid;

  fn memory(predicate: &str, object: Value, confidence: f64, reinforcement_count: i32, age_days: i64) -> semantic_memory::Model {
    let created = Utc::now() - chrono::Duration::days(age_days);
    semantic_memory::Model {
      memory_id: Uuid::nil(),
      user_id: Uuid::nil(),
      subject_entity_id: "customer:kai".to_owned(),
      predicate: predicate.to_owned(),
      predicate_type: "preference".to_owned(),
      object_value: object,
      confidence,
      reinforcement_count,
      last_validated_at: created.into(),
      source_event_id: 1,
      status: "active".to_owned(),
      embedding: PgVector::from(vec![0.0_f32; 4]),
      created_at: created.into(),
      updated_at: created.into(),
    }
  }

  #[test]
  fn identical_values_are_no_conflict() {
    let m = memory("prefers_delivery_day", json!("Friday"), 0.7, 1, 5);
    assert_eq!(classify(&m, "prefers_delivery_day", &json!("Friday")), ConflictType::NoConflict);
  }

  #[test]
  fn differing_values_are_value_mismatch() {
    let m = memory("prefers_delivery_day", json!("Thursday"), 0.7, 1, 5);
    assert_eq!(classify(&m, "prefers_delivery_day", &json!("Friday")), ConflictType::ValueMismatch);
  }

  #[test]
  fn old_memory_trusts_recent() {
    let m = memory("prefers_delivery_day", json!("Thursday"), 0.70, 1, 40);
    assert_eq!(resolve(&m, Utc::now(), 0.75, 1), ResolutionStrategy::TrustRecent);
  }

  #[test]
  fn confidence_gap_trusts_confident() {
    let m = memory("prefers_delivery_day", json!("Thursday"), 0.30, 1, 5);
    assert_eq!(resolve(&m, Utc::now(), 0.80, 1), ResolutionStrategy::TrustConfident);
  }

  #[test]
  fn close_values_require_clarification() {
    let m = memory("prefers_delivery_day", json!("Thursday"), 0.70, 2, 5);
    assert_eq!(resolve(&m, Utc::now(), 0.72, 3), ResolutionStrategy::RequireClarification);
  }
}
