use axum::{Json, extract::State};
use chrono::Utc;
use mnemosyne_core::validation;
use mnemosyne_entities::prelude::{ChatEvent, EpisodicMemory, MemorySummary, ProceduralMemory, SemanticMemory};
use mnemosyne_shared::{AppError, ErrorKind};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::utils::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ExplainRequest {
  pub memory_id: Uuid,
  pub memory_type: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExplainResponse {
  pub memory_id: Uuid,
  pub memory_type: String,
  pub source_event: Option<serde_json::Value>,
  pub confidence_factors: serde_json::Value,
  pub reinforcement_history: serde_json::Value,
}

async fn source_event(state: &AppState, event_id: i32) -> Option<serde_json::Value> {
  let event = ChatEvent::find_by_id(event_id).one(&state.db).await.ok().flatten()?;
  Some(serde_json::json!({
    "event_id": event.event_id,
    "role": event.role,
    "content": event.content,
    "created_at": event.created_at,
  }))
}

fn not_found(memory_type: &str, memory_id: Uuid) -> AppError {
  AppError::with_kind(ErrorKind::NotFound, anyhow::anyhow!("no {memory_type} memory {memory_id}"))
}

/// Provenance bundle for one stored memory: the chat event it came from, the
/// factors behind its current effective confidence, and (where applicable)
/// its reinforcement history.
#[utoipa::path(
  post,
  path = "/api/v0/explain",
  request_body = ExplainRequest,
  responses(
    (status = 200, description = "Provenance bundle", body = ExplainResponse),
    (status = 404, description = "Memory not found"),
    (status = 400, description = "Unknown memory_type")
  )
)]
#[axum::debug_handler]
pub async fn explain(State(state): State<AppState>, Json(req): Json<ExplainRequest>) -> Result<Json<ExplainResponse>, AppError> {
  let now = Utc::now();

  match req.memory_type.as_str() {
    "semantic" => {
      let memory = SemanticMemory::find_by_id(req.memory_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| not_found("semantic", req.memory_id))?;

      let effective = validation::effective_confidence(&memory, now);
      Ok(Json(ExplainResponse {
        memory_id: memory.memory_id,
        memory_type: "semantic".to_owned(),
        source_event: source_event(&state, memory.source_event_id).await,
        confidence_factors: serde_json::json!({
          "stored_confidence": memory.confidence,
          "effective_confidence": effective,
          "last_validated_at": memory.last_validated_at,
          "status": memory.status,
        }),
        reinforcement_history: serde_json::json!({
          "reinforcement_count": memory.reinforcement_count,
        }),
      }))
    }
    "episodic" => {
      let memory = EpisodicMemory::find_by_id(req.memory_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| not_found("episodic", req.memory_id))?;

      let source_event = match memory.source_event_ids.first() {
        Some(id) => source_event(&state, *id).await,
        None => None,
      };

      Ok(Json(ExplainResponse {
        memory_id: memory.memory_id,
        memory_type: "episodic".to_owned(),
        source_event,
        confidence_factors: serde_json::json!({
          "importance": memory.importance,
          "archived": memory.archived_at.is_some(),
        }),
        reinforcement_history: serde_json::json!({ "source_event_ids": memory.source_event_ids }),
      }))
    }
    "procedural" => {
      let memory = ProceduralMemory::find_by_id(req.memory_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| not_found("procedural", req.memory_id))?;

      Ok(Json(ExplainResponse {
        memory_id: memory.memory_id,
        memory_type: "procedural".to_owned(),
        source_event: None,
        confidence_factors: serde_json::json!({ "confidence": memory.confidence }),
        reinforcement_history: serde_json::json!({ "observed_count": memory.observed_count, "trigger_pattern": memory.trigger_pattern }),
      }))
    }
    "summary" => {
      let memory = MemorySummary::find_by_id(req.memory_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| not_found("summary", req.memory_id))?;

      Ok(Json(ExplainResponse {
        memory_id: memory.summary_id,
        memory_type: "summary".to_owned(),
        source_event: None,
        confidence_factors: serde_json::json!({ "confidence": memory.confidence, "superseded": memory.superseded }),
        reinforcement_history: serde_json::json!({ "source_data": memory.source_data }),
      }))
    }
    other => Err(AppError::with_kind(ErrorKind::Domain, anyhow::anyhow!("unknown memory_type \"{other}\""))),
  }
}

