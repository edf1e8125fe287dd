use chrono::Utc;
use mnemosyne_ai::LlmPort;
use mnemosyne_entities::canonical_entity;
use mnemosyne_shared::{AppError, APP_CONFIG};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::errors::learns_alias;
use crate::mention_extractor::EntityMention;
use crate::ports::{DomainDbPort, EntityCandidate, EntityRepository};

/// Stage that produced a resolution, kept for the audit trail and for
/// deciding whether to learn a new alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStage {
  ExactMatch,
  AliasMatch,
  FuzzyMatch,
  LlmCoreference,
  ExternalLazyCreate,
}

/// Outcome of resolving one mention, replacing the exception-style control
/// flow an ambiguous match would otherwise require: callers match on this
/// instead of catching an "ambiguous entity" error.
#[derive(Debug, Clone)]
pub enum ResolutionResult {
  Resolved {
    entity_id: String,
    stage: ResolutionStage,
  },
  NeedsDisambiguation {
    candidates: Vec<EntityCandidate>,
  },
  Failed,
}

#[derive(Debug, Deserialize)]
struct CoreferenceChoice {
  entity_id: Option<String>,
}

fn coreference_schema() -> serde_json::Value {
  json!({
    "type": "object",
    "properties": {
      "entity_id": { "type": ["string", "null"] }
    },
    "required": ["entity_id"],
    "additionalProperties": false
  })
}

/// Resolve one extracted mention against a user's known entities, in stage
/// order: exact canonical name, learned alias, fuzzy trigram similarity, LLM
/// coreference (pronouns only), and finally a lazy-created entity backed by
/// the external business database.
pub async fn resolve_mention(
  mention: &EntityMention,
  user_id: Uuid,
  recent_entities: &[canonical_entity::Model],
  repo: &dyn EntityRepository,
  domain: &dyn DomainDbPort,
  llm: &dyn LlmPort,
) -> Result<ResolutionResult, AppError> {
  if mention.requires_coreference {
    return resolve_coreference(mention, user_id, recent_entities, repo, llm).await;
  }

  if let Some(entity) = repo.find_by_exact_name(user_id, &mention.text).await? {
    return Ok(ResolutionResult::Resolved {
      entity_id: entity.entity_id,
      stage: ResolutionStage::ExactMatch,
    });
  }

  if let Some(alias) = repo.find_alias(user_id, &mention.text).await? {
    repo
      .upsert_alias(&alias.canonical_entity_id, Some(user_id), &mention.text, "alias_reuse", alias.confidence)
      .await?;
    return Ok(ResolutionResult::Resolved {
      entity_id: alias.canonical_entity_id,
      stage: ResolutionStage::AliasMatch,
    });
  }

  let candidates = repo
    .fuzzy_candidates(user_id, &mention.text, APP_CONFIG.fuzzy_match_threshold)
    .await?;
  if let Some(decision) = decide_fuzzy(&candidates) {
    if let ResolutionResult::Resolved { entity_id, .. } = &decision {
      let winner_similarity = candidates.iter().find(|c| &c.entity_id == entity_id).map_or(0.0, |c| c.similarity);
      repo
        .upsert_alias(entity_id, Some(user_id), &mention.text, "fuzzy_match", winner_similarity * 0.9)
        .await?;
    }
    return Ok(decision);
  }

  if let Some((external_id, name)) = domain.find_customer_by_name(&mention.text).await? {
    let entity_id = format!("customer:{external_id}");
    let entity = repo
      .create(canonical_entity::Model {
        entity_id: entity_id.clone(),
        entity_type: "customer".to_owned(),
        canonical_name: name,
        external_ref_table: Some("domain_customer".to_owned()),
        external_ref_id: Some(external_id.to_string()),
        properties: json!({}),
        created_at: Utc::now().into(),
        updated_at: Utc::now().into(),
        owner_user_id: user_id,
      })
      .await?;
    repo
      .upsert_alias(&entity.entity_id, Some(user_id), &mention.text, "external_lazy_create", 0.85)
      .await?;
    return Ok(ResolutionResult::Resolved {
      entity_id: entity.entity_id,
      stage: ResolutionStage::ExternalLazyCreate,
    });
  }

  Ok(ResolutionResult::Failed)
}

/// Stage 3's decision rule: a clear winner (margin over the runner-up) is a
/// resolution; several close candidates are ambiguous; none above threshold
/// falls through to the next stage.
fn decide_fuzzy(candidates: &[EntityCandidate]) -> Option<ResolutionResult> {
  if candidates.is_empty() {
    return None;
  }
  let mut sorted = candidates.to_vec();
  sorted.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

  let top = &sorted[0];
  let runner_up = sorted.get(1);

  let margin_clear = runner_up.is_none_or(|r| top.similarity - r.similarity >= APP_CONFIG.fuzzy_ambiguity_margin);

  if margin_clear {
    Some(ResolutionResult::Resolved {
      entity_id: top.entity_id.clone(),
      stage: ResolutionStage::FuzzyMatch,
    })
  } else {
    Some(ResolutionResult::NeedsDisambiguation { candidates: sorted })
  }
}

async fn resolve_coreference(
  mention: &EntityMention,
  user_id: Uuid,
  recent_entities: &[canonical_entity::Model],
  repo: &dyn EntityRepository,
  llm: &dyn LlmPort,
) -> Result<ResolutionResult, AppError> {
  if recent_entities.is_empty() {
    return Ok(ResolutionResult::Failed);
  }

  let system = "You resolve pronoun references to the entity they point at, given a short list of \
    recently-mentioned entities in this conversation. Reply with the entity_id of the single best \
    match, or null if none plausibly fits.";
  let options = recent_entities
    .iter()
    .map(|e| format!("{}: {} ({})", e.entity_id, e.canonical_name, e.entity_type))
    .collect::<Vec<_>>()
    .join("\n");
  let user = format!("Pronoun: \"{}\"\nCandidates:\n{options}", mention.text);

  let raw = llm
    .generate_structured(system, &user, "coreference_choice", coreference_schema())
    .await?;

  let choice: CoreferenceChoice = serde_json::from_str(&raw).unwrap_or(CoreferenceChoice { entity_id: None });

  match choice.entity_id {
    Some(entity_id) if recent_entities.iter().any(|e| e.entity_id == entity_id) => {
      if learns_alias(ResolutionStage::LlmCoreference) {
        repo.upsert_alias(&entity_id, Some(user_id), &mention.text, "llm_coreference", 0.8).await?;
      }
      Ok(ResolutionResult::Resolved {
        entity_id,
        stage: ResolutionStage::LlmCoreference,
      })
    }
    _ => Ok(ResolutionResult::Failed),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn candidate(id: &str, similarity: f64) -> EntityCandidate {
    EntityCandidate {
      entity_id: id.to_owned(),
      canonical_name: id.to_owned(),
      similarity,
    }
  }

  #[test]
  fn clear_winner_resolves() {
    let candidates = vec![candidate("customer:a", 0.92), candidate("customer:b", 0.40)];
    match decide_fuzzy(&candidates) {
      Some(ResolutionResult::Resolved { entity_id, stage }) => {
        assert_eq!(entity_id, "customer:a");
        assert_eq!(stage, ResolutionStage::FuzzyMatch);
      }
      other => panic!("expected Resolved, got {other:?}"),
    }
  }

  #[test]
  fn close_candidates_need_disambiguation() {
    let candidates = vec![candidate("customer:a", 0.70), candidate("customer:b", 0.68)];
    assert!(matches!(decide_fuzzy(&candidates), Some(ResolutionResult::NeedsDisambiguation { .. })));
  }

  #[test]
  fn no_candidates_falls_through() {
    assert!(decide_fuzzy(&[]).is_none());
  }
}
