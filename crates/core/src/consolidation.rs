use chrono::Utc;
use mnemosyne_ai::{EmbeddingPort, LlmPort};
use mnemosyne_entities::{episodic_memory, memory_summary, semantic_memory};
use mnemosyne_shared::{AppError, ErrorKind, APP_CONFIG};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::ports::{EpisodicMemoryRepository, SemanticMemoryRepository, SummaryRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsolidationScope<'a> {
  Entity(&'a str),
  Topic(&'a str),
  SessionWindow(usize),
}

impl ConsolidationScope<'_> {
  fn scope_type(&self) -> &'static str {
    match self {
      Self::Entity(_) => "entity",
      Self::Topic(_) => "topic",
      Self::SessionWindow(_) => "session_window",
    }
  }

  fn scope_identifier(&self, user_id: Uuid) -> String {
    match self {
      Self::Entity(id) => (*id).to_owned(),
      Self::Topic(pattern) => (*pattern).to_owned(),
      Self::SessionWindow(n) => format!("{user_id}:{n}"),
    }
  }
}

#[derive(Debug, Deserialize)]
struct SynthesisResponse {
  summary_text: String,
  #[serde(default)]
  key_facts: Value,
  #[serde(default)]
  interaction_patterns: Vec<String>,
  #[serde(default)]
  needs_validation: Vec<String>,
  #[serde(default)]
  confirmed_memory_ids: Vec<Uuid>,
}

fn synthesis_schema() -> Value {
  json!({
    "type": "object",
    "properties": {
      "summary_text": { "type": "string" },
      "key_facts": { "type": "object" },
      "interaction_patterns": { "type": "array", "items": { "type": "string" } },
      "needs_validation": { "type": "array", "items": { "type": "string" } },
      "confirmed_memory_ids": { "type": "array", "items": { "type": "string" } }
    },
    "required": ["summary_text", "key_facts", "interaction_patterns", "needs_validation", "confirmed_memory_ids"],
    "additionalProperties": false
  })
}

/// Consolidate a user's memories within `scope` into a `MemorySummary`.
/// Entity scope is the only one required to actually run; topic and
/// session-window scopes are accepted by the signature but return
/// `ErrorKind::Domain` as "not implemented" in this deployment, per the
/// component's advertised-but-optional interface.
///
/// Idempotent unless `force` is set: if the active summary for this scope was
/// already built from the exact same set of episodic and semantic memory ids,
/// that summary is returned unchanged rather than superseded.
#[allow(clippy::too_many_arguments)]
pub async fn consolidate(
  user_id: Uuid,
  scope: ConsolidationScope<'_>,
  force: bool,
  llm: &dyn LlmPort,
  embedder: &dyn EmbeddingPort,
  episodic_repo: &dyn EpisodicMemoryRepository,
  semantic_repo: &dyn SemanticMemoryRepository,
  summary_repo: &dyn SummaryRepository,
) -> Result<memory_summary::Model, AppError> {
  let ConsolidationScope::Entity(entity_id) = scope else {
    return Err(AppError::with_kind(
      ErrorKind::Domain,
      anyhow::anyhow!("consolidation scope {:?} is not implemented in this deployment", scope.scope_type()),
    ));
  };

  let episodes = episodic_repo.find_for_entity(user_id, entity_id).await?;
  if !force && episodes.len() < APP_CONFIG.consolidation_min_episodic_for_entity_scope {
    return Err(AppError::with_kind(
      ErrorKind::Domain,
      anyhow::anyhow!(
        "entity {entity_id} has {} episodic memories, below the consolidation threshold of {}",
        episodes.len(),
        APP_CONFIG.consolidation_min_episodic_for_entity_scope
      ),
    ));
  }

  let facts = semantic_repo.find_active_by_subject(user_id, entity_id).await.unwrap_or_default();

  let mut source_memory_ids: Vec<Uuid> = episodes.iter().map(|e| e.memory_id).chain(facts.iter().map(|f| f.memory_id)).collect();
  source_memory_ids.sort_unstable();

  if !force {
    if let Some(prior) = summary_repo.find_active(user_id, scope.scope_type(), &scope.scope_identifier(user_id)).await? {
      let mut prior_ids = prior.source_memory_ids.clone();
      prior_ids.sort_unstable();
      if prior_ids == source_memory_ids {
        return Ok(prior);
      }
    }
  }

  let synthesis = synthesize(llm, entity_id, &episodes, &facts).await;

  let (summary_text, key_facts, source_data, confidence, confirmed_ids) = match synthesis {
    Some(s) => (
      s.summary_text,
      s.key_facts,
      json!({
        "episodic_count": episodes.len(),
        "semantic_count": facts.len(),
        "interaction_patterns": s.interaction_patterns,
        "needs_validation": s.needs_validation,
        "fallback": false,
      }),
      0.8,
      s.confirmed_memory_ids,
    ),
    None => (
      fallback_summary_text(entity_id, &facts),
      json!(facts.iter().map(|f| (f.predicate.clone(), f.object_value.clone())).collect::<serde_json::Map<_, _>>()),
      json!({ "episodic_count": episodes.len(), "semantic_count": facts.len(), "fallback": true }),
      0.6,
      Vec::new(),
    ),
  };

  for memory_id in &confirmed_ids {
    if let Some(memory) = facts.iter().find(|f| &f.memory_id == memory_id) {
      semantic_repo
        .apply_reinforce(
          memory.memory_id,
          crate::validation::ReinforceDiff {
            confidence: (memory.confidence + APP_CONFIG.consolidation_confirmation_boost).min(APP_CONFIG.max_confidence),
            reinforcement_count: memory.reinforcement_count,
            last_validated_at: Utc::now(),
          },
        )
        .await?;
    }
  }

  let embedding = embedder.embed(&summary_text).await?;

  summary_repo
    .supersede_and_insert(memory_summary::Model {
      summary_id: Uuid::new_v4(),
      user_id,
      scope_type: scope.scope_type().to_owned(),
      scope_identifier: scope.scope_identifier(user_id),
      summary_text,
      key_facts,
      source_data,
      source_memory_ids,
      superseded: false,
      confidence,
      embedding,
      created_at: Utc::now().into(),
    })
    .await
}

async fn synthesize(
  llm: &dyn LlmPort,
  entity_id: &str,
  episodes: &[episodic_memory::Model],
  facts: &[semantic_memory::Model],
) -> Option<SynthesisResponse> {
  let system = "You synthesize a durable summary of everything known about one entity from its \
    episodic history and current facts. Reply with summary_text, key_facts (a flat object), \
    interaction_patterns, needs_validation, and confirmed_memory_ids (ids of facts this summary \
    reaffirms).";
  let episode_lines = episodes.iter().map(|e| format!("- {}", e.summary)).collect::<Vec<_>>().join("\n");
  let fact_lines = facts
    .iter()
    .map(|f| format!("- {} (id {}): {}", f.predicate, f.memory_id, f.object_value))
    .collect::<Vec<_>>()
    .join("\n");
  let user = format!("Entity: {entity_id}\nEpisodes:\n{episode_lines}\nFacts:\n{fact_lines}");

  for _ in 0..APP_CONFIG.consolidation_max_retries {
    let Ok(raw) = llm.generate_structured(system, &user, "memory_consolidation", synthesis_schema()).await else {
      continue;
    };
    if let Ok(parsed) = serde_json::from_str::<SynthesisResponse>(&raw) {
      return Some(parsed);
    }
  }
  None
}

fn fallback_summary_text(entity_id: &str, facts: &[semantic_memory::Model]) -> String {
  let high_confidence = facts
    .iter()
    .filter(|f| f.confidence >= 0.6)
    .map(|f| format!("{} is {}", f.predicate, f.object_value))
    .collect::<Vec<_>>()
    .join("; ");
  if high_confidence.is_empty() {
    format!("No high-confidence facts are currently known about {entity_id}.")
  } else {
    format!("Known about {entity_id}: {high_confidence}.")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fallback_text_lists_high_confidence_facts_only() {
    let facts = vec![
      semantic_memory::Model {
        memory_id: Uuid::nil(),
        user_id: Uuid::nil(),
        subject_entity_id: "customer:kai".to_owned(),
        predicate: "prefers_delivery_day".to_owned(),
        predicate_type: "preference".to_owned(),
        object_value: json!("Friday"),
        confidence: 0.8,
        reinforcement_count: 1,
        last_validated_at: Utc::now().into(),
        source_event_id: 1,
        status: "active".to_owned(),
        embedding: sea_orm::prelude::PgVector::from(vec![0.0_f32; 4]),
        created_at: Utc::now().into(),
        updated_at: Utc::now().into(),
      },
      semantic_memory::Model {
        memory_id: Uuid::nil(),
        user_id: Uuid::nil(),
        subject_entity_id: "customer:kai".to_owned(),
        predicate: "low_conf_guess".to_owned(),
        predicate_type: "attribute".to_owned(),
        object_value: json!("maybe"),
        confidence: 0.2,
        reinforcement_count: 0,
        last_validated_at: Utc::now().into(),
        source_event_id: 1,
        status: "active".to_owned(),
        embedding: sea_orm::prelude::PgVector::from(vec![0.0_f32; 4]),
        created_at: Utc::now().into(),
        updated_at: Utc::now().into(),
      },
    ];
    let text = fallback_summary_text("customer:kai", &facts);
    assert!(text.contains("prefers_delivery_day"));
    assert!(!text.contains("low_conf_guess"));
  }
}
