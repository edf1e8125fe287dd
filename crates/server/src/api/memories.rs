use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use mnemosyne_core::ports::{EntityRepository, EpisodicMemoryRepository, ProceduralMemoryRepository, SemanticMemoryRepository};
use mnemosyne_core::repository::PgRepositories;
use mnemosyne_shared::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::utils::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct GetMemoriesRequest {
  pub user_id: Uuid,
  #[serde(default = "default_k")]
  pub k: u64,
  #[serde(default)]
  pub memory_type: Option<String>,
  #[serde(default)]
  pub entity_id: Option<String>,
}

const fn default_k() -> u64 {
  20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MemoryEnvelope {
  pub memory_id: String,
  pub memory_type: String,
  pub content: serde_json::Value,
  pub confidence: f64,
  pub created_at: DateTime<Utc>,
  pub source_event_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GetMemoriesResponse {
  pub total: usize,
  pub items: Vec<MemoryEnvelope>,
}

fn wants(memory_type: Option<&str>, candidate: &str) -> bool {
  memory_type.is_none_or(|t| t.eq_ignore_ascii_case(candidate))
}

/// List stored memories for a user, optionally narrowed to one memory type
/// or one entity, newest first.
#[utoipa::path(
  post,
  path = "/api/v0/memories",
  request_body = GetMemoriesRequest,
  responses((status = 200, description = "Matching memories with provenance", body = GetMemoriesResponse))
)]
#[axum::debug_handler]
pub async fn get_memories(State(state): State<AppState>, Json(req): Json<GetMemoriesRequest>) -> Result<Json<GetMemoriesResponse>, AppError> {
  let repos = PgRepositories::new(state.db.clone());
  let mut items = Vec::new();

  if wants(req.memory_type.as_deref(), "semantic") {
    if let Some(entity_id) = &req.entity_id {
      for m in repos.find_active_by_subject(req.user_id, entity_id).await? {
        items.push(MemoryEnvelope {
          memory_id: m.memory_id.to_string(),
          memory_type: "semantic".to_owned(),
          content: serde_json::json!({ "subject": m.subject_entity_id, "predicate": m.predicate, "object": m.object_value }),
          confidence: m.confidence,
          created_at: m.created_at.with_timezone(&Utc),
          source_event_id: Some(m.source_event_id),
        });
      }
    }
  }

  if wants(req.memory_type.as_deref(), "episodic") {
    let episodes = if let Some(entity_id) = &req.entity_id {
      repos.find_for_entity(req.user_id, entity_id).await?
    } else {
      repos.find_recent_sessions(req.user_id, req.k as usize).await?
    };
    for e in episodes {
      items.push(MemoryEnvelope {
        memory_id: e.memory_id.to_string(),
        memory_type: "episodic".to_owned(),
        content: serde_json::json!({ "summary": e.summary, "event_type": e.event_type }),
        confidence: 1.0,
        created_at: e.created_at.with_timezone(&Utc),
        source_event_id: e.source_event_ids.first().copied(),
      });
    }
  }

  if req.entity_id.is_none() && wants(req.memory_type.as_deref(), "procedural") {
    for p in repos.find_by_user(req.user_id).await? {
      items.push(MemoryEnvelope {
        memory_id: p.memory_id.to_string(),
        memory_type: "procedural".to_owned(),
        content: serde_json::json!({ "trigger_pattern": p.trigger_pattern, "observed_count": p.observed_count }),
        confidence: p.confidence,
        created_at: p.created_at.with_timezone(&Utc),
        source_event_id: None,
      });
    }
  }

  items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
  items.truncate(req.k as usize);

  Ok(Json(GetMemoriesResponse { total: items.len(), items }))
}
