use chrono::{DateTime, Utc};
use mnemosyne_entities::semantic_memory;
use mnemosyne_shared::APP_CONFIG;

/// Confidence decayed from the stored value to `now`, using the last time the
/// memory was validated (or created, if never validated). Pure and
/// deterministic: decay is never persisted, only computed on read.
#[must_use]
pub fn effective_confidence(memory: &semantic_memory::Model, now: DateTime<Utc>) -> f64 {
  let last = memory.last_validated_at.with_timezone(&Utc);
  let age_days = (now - last).num_seconds().max(0) as f64 / 86_400.0;
  let decayed = memory.confidence * (-APP_CONFIG.decay_rate_per_day * age_days).exp();
  decayed.clamp(0.0, APP_CONFIG.max_confidence)
}

/// Whether a memory's effective confidence has fallen below the configured
/// floor and should no longer surface in retrieval.
#[must_use]
pub fn should_deactivate(memory: &semantic_memory::Model, now: DateTime<Utc>) -> bool {
  effective_confidence(memory, now) < APP_CONFIG.min_active_confidence
}

/// A diff describing the fields a reinforcement mutates, applied by the
/// repository layer rather than returned as a full new `Model` — aggregates
/// in this crate are plain data, so "apply" functions return what changed
/// instead of reconstructing the whole row.
pub struct ReinforceDiff {
  pub confidence: f64,
  pub reinforcement_count: i32,
  pub last_validated_at: DateTime<Utc>,
}

/// Compute the result of reinforcing a semantic memory with a re-observed
/// fact at `now`. Confidence is bumped by the configured step, capped at the
/// configured ceiling; the reinforcement counter always advances.
#[must_use]
pub fn reinforce(memory: &semantic_memory::Model, now: DateTime<Utc>) -> ReinforceDiff {
  ReinforceDiff {
    confidence: (memory.confidence + APP_CONFIG.reinforcement_step).min(APP_CONFIG.max_confidence),
    reinforcement_count: memory.reinforcement_count + 1,
    last_validated_at: now,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;
  use sea_orm::prelude::PgVector;
  use serde_json::json;
  use uuid::Uuid;

  fn sample(confidence: f64, last_validated_at: DateTime<Utc>) -> semantic_memory::Model {
    semantic_memory::Model {
      memory_id: Uuid::nil(),
      user_id: Uuid::nil(),
      subject_entity_id: "customer:kai".to_owned(),
      predicate: "prefers_delivery_day".to_owned(),
      predicate_type: "preference".to_owned(),
      object_value: json!("Friday"),
      confidence,
      reinforcement_count: 0,
      last_validated_at: last_validated_at.into(),
      source_event_id: 1,
      status: "active".to_owned(),
      embedding: PgVector::from(vec![0.0_f32; 4]),
      created_at: last_validated_at.into(),
      updated_at: last_validated_at.into(),
    }
  }

  #[test]
  fn zero_days_is_identity() {
    let now = Utc::now();
    let m = sample(0.85, now);
    assert!((effective_confidence(&m, now) - 0.85).abs() < 1e-9);
  }

  #[test]
  fn decay_is_monotonically_non_increasing() {
    let now = Utc::now();
    let m = sample(0.85, now - Duration::days(10));
    let earlier = effective_confidence(&m, now - Duration::days(1));
    let later = effective_confidence(&m, now);
    assert!(later <= earlier);
  }

  #[test]
  fn matches_scenario_five_within_tolerance() {
    let now = Utc::now();
    let m = sample(0.85, now - Duration::days(180));
    let conf = effective_confidence(&m, now);
    assert!((conf - 0.107).abs() < 0.01, "got {conf}");
  }

  #[test]
  fn reinforcement_compounds_additively_twice() {
    let now = Utc::now();
    let m = sample(0.5, now);
    let diff1 = reinforce(&m, now);
    let mut m2 = m.clone();
    m2.confidence = diff1.confidence;
    m2.reinforcement_count = diff1.reinforcement_count;
    let diff2 = reinforce(&m2, now);
    assert_eq!(diff2.reinforcement_count, m.reinforcement_count + 2);
  }

  #[test]
  fn never_exceeds_configured_ceiling() {
    let now = Utc::now();
    let m = sample(APP_CONFIG.max_confidence, now);
    let diff = reinforce(&m, now);
    assert!(diff.confidence <= APP_CONFIG.max_confidence);
  }
}
