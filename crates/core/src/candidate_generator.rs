use std::collections::HashSet;

use chrono::Utc;
use mnemosyne_shared::APP_CONFIG;
use sea_orm::prelude::PgVector;
use tracing::warn;
use uuid::Uuid;

use crate::ports::{EpisodicMemoryRepository, SemanticMemoryRepository, SummaryRepository};
use crate::scorer::{MemoryCandidate, MemoryType};
use crate::validation;

/// Run the three layer retrievals concurrently and merge into one
/// deduplicated candidate list. A failing layer is logged and excluded
/// rather than aborting the other two — partial retrieval beats no
/// retrieval.
pub async fn generate(
  user_id: Uuid,
  embedding: &PgVector,
  semantic_repo: &dyn SemanticMemoryRepository,
  episodic_repo: &dyn EpisodicMemoryRepository,
  summary_repo: &dyn SummaryRepository,
) -> Vec<MemoryCandidate> {
  let now = Utc::now();

  let (semantic, episodic, summary) = tokio::join!(
    semantic_repo.find_similar(user_id, embedding, APP_CONFIG.candidate_limit_semantic as u64),
    episodic_repo.find_similar(user_id, embedding, APP_CONFIG.candidate_limit_episodic as u64),
    summary_repo.find_similar(user_id, embedding, APP_CONFIG.candidate_limit_summary as u64),
  );

  let mut candidates = Vec::new();
  let mut seen: HashSet<(&'static str, String)> = HashSet::new();

  match semantic {
    Ok(rows) => {
      for m in rows {
        let key = ("semantic", m.memory_id.to_string());
        if seen.insert(key) {
          candidates.push(MemoryCandidate {
            memory_id: m.memory_id.to_string(),
            memory_type: MemoryType::Semantic,
            content: format!("{} {} {}", m.subject_entity_id, m.predicate, m.object_value),
            entity_ids: vec![m.subject_entity_id.clone()],
            embedding: m.embedding.clone(),
            created_at: m.created_at.with_timezone(&Utc),
            importance: 0.5,
            effective_confidence: validation::effective_confidence(&m, now),
            reinforcement_count: m.reinforcement_count,
          });
        }
      }
    }
    Err(err) => warn!(layer = "semantic", error = %err, "candidate retrieval failed, skipping layer"),
  }

  match episodic {
    Ok(rows) => {
      for m in rows {
        let key = ("episodic", m.memory_id.to_string());
        if seen.insert(key) {
          let entity_ids = m
            .entities
            .as_array()
            .map(|a| a.iter().filter_map(|v| v.get("entity_id")?.as_str().map(str::to_owned)).collect())
            .unwrap_or_default();
          candidates.push(MemoryCandidate {
            memory_id: m.memory_id.to_string(),
            memory_type: MemoryType::Episodic,
            content: m.summary.clone(),
            entity_ids,
            embedding: m.embedding.clone(),
            created_at: m.created_at.with_timezone(&Utc),
            importance: m.importance,
            effective_confidence: 1.0,
            reinforcement_count: 0,
          });
        }
      }
    }
    Err(err) => warn!(layer = "episodic", error = %err, "candidate retrieval failed, skipping layer"),
  }

  match summary {
    Ok(rows) => {
      for m in rows {
        let key = ("summary", m.summary_id.to_string());
        if seen.insert(key) {
          candidates.push(MemoryCandidate {
            memory_id: m.summary_id.to_string(),
            memory_type: MemoryType::Summary,
            content: m.summary_text.clone(),
            entity_ids: Vec::new(),
            embedding: m.embedding.clone(),
            created_at: m.created_at.with_timezone(&Utc),
            importance: 0.6,
            effective_confidence: m.confidence,
            reinforcement_count: 0,
          });
        }
      }
    }
    Err(err) => warn!(layer = "summary", error = %err, "candidate retrieval failed, skipping layer"),
  }

  candidates
}
