use std::collections::HashMap;

use chrono::Utc;
use mnemosyne_entities::{episodic_memory, procedural_memory};
use mnemosyne_shared::{AppError, APP_CONFIG};
use sea_orm::prelude::PgVector;
use uuid::Uuid;

use crate::ports::ProceduralMemoryRepository;

/// An episode reduced to the feature vector the miner slides a window over:
/// the episode's intent-like event type plus the sorted set of entity types
/// it touched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EpisodeFeatures {
  pub event_type: String,
  pub entity_types: Vec<String>,
}

#[must_use]
pub fn extract_features(episode: &episodic_memory::Model) -> EpisodeFeatures {
  let mut entity_types: Vec<String> = episode
    .entities
    .as_array()
    .map(|a| a.iter().filter_map(|v| v.get("entity_type")?.as_str().map(str::to_owned)).collect())
    .unwrap_or_default();
  entity_types.sort();
  entity_types.dedup();
  EpisodeFeatures {
    event_type: episode.event_type.clone(),
    entity_types,
  }
}

fn describe(features: &EpisodeFeatures) -> String {
  format!("{}:[{}]", features.event_type, features.entity_types.join(","))
}

fn trigger_pattern(from: &EpisodeFeatures, to: &EpisodeFeatures) -> String {
  format!("when {} then {}", describe(from), describe(to))
}

fn action_hint(to: &EpisodeFeatures) -> serde_json::Value {
  serde_json::json!({
    "suggested_event_type": to.event_type,
    "suggested_entity_types": to.entity_types,
  })
}

/// Slide a window of length two over episodes (assumed chronologically
/// ordered) and count how often each `(features_t, features_t+1)` pair
/// occurs. Pairs meeting the support threshold become or reinforce a
/// `ProceduralMemory`.
pub async fn mine(
  user_id: Uuid,
  episodes: &[episodic_memory::Model],
  embedding_for_pattern: impl Fn(&str) -> PgVector,
  repo: &dyn ProceduralMemoryRepository,
) -> Result<Vec<procedural_memory::Model>, AppError> {
  if episodes.len() < 2 {
    return Ok(Vec::new());
  }

  let features: Vec<EpisodeFeatures> = episodes.iter().map(extract_features).collect();
  let total_windows = features.len() - 1;

  let mut counts: HashMap<(EpisodeFeatures, EpisodeFeatures), usize> = HashMap::new();
  for window in features.windows(2) {
    let key = (window[0].clone(), window[1].clone());
    *counts.entry(key).or_insert(0) += 1;
  }

  let mut mined = Vec::new();
  let mut ranked: Vec<_> = counts.into_iter().filter(|(_, count)| *count >= APP_CONFIG.procedural_support_threshold).collect();
  ranked.sort_by(|a, b| b.1.cmp(&a.1));
  ranked.truncate(APP_CONFIG.procedural_max_patterns);

  for ((from, to), count) in ranked {
    let pattern = trigger_pattern(&from, &to);
    let confidence = (count as f64 / total_windows as f64).min(APP_CONFIG.max_confidence);

    if let Some(existing) = repo.find_by_trigger_pattern(user_id, &pattern).await? {
      repo.reinforce(existing.memory_id, existing.observed_count + count as i32, confidence).await?;
      mined.push(existing);
      continue;
    }

    let model = procedural_memory::Model {
      memory_id: Uuid::new_v4(),
      user_id,
      trigger_pattern: pattern.clone(),
      trigger_features: serde_json::json!({ "intent": from.event_type, "entity_types": from.entity_types }),
      action_structure: action_hint(&to),
      observed_count: count as i32,
      confidence,
      embedding: embedding_for_pattern(&pattern),
      created_at: Utc::now().into(),
    };
    mined.push(repo.insert(model).await?);
  }

  Ok(mined)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn episode(event_type: &str, entity_types: &[&str]) -> episodic_memory::Model {
    episodic_memory::Model {
      memory_id: Uuid::new_v4(),
      user_id: Uuid::nil(),
      session_id: Uuid::nil(),
      event_type: event_type.to_owned(),
      summary: "x".to_owned(),
      source_event_ids: vec![1],
      entities: serde_json::json!(entity_types.iter().map(|t| serde_json::json!({ "entity_type": t })).collect::<Vec<_>>()),
      importance: 0.5,
      embedding: PgVector::from(vec![0.0_f32; 4]),
      created_at: Utc::now().into(),
      archived_at: None,
    }
  }

  #[test]
  fn extracts_sorted_deduped_entity_types() {
    let e = episode("question", &["customer", "order", "customer"]);
    let features = extract_features(&e);
    assert_eq!(features.entity_types, vec!["customer".to_owned(), "order".to_owned()]);
  }

  #[test]
  fn trigger_pattern_is_stable_for_same_features() {
    let a = extract_features(&episode("question", &["customer"]));
    let b = extract_features(&episode("command", &["order"]));
    assert_eq!(trigger_pattern(&a, &b), trigger_pattern(&a, &b));
  }
}
