use axum::{Json, extract::State};
use mnemosyne_core::ports::{EntityRepository, EpisodicMemoryRepository};
use mnemosyne_core::repository::PgRepositories;
use mnemosyne_shared::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::utils::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct GetEntitiesRequest {
  pub user_id: Uuid,
  #[serde(default)]
  pub session_id: Option<Uuid>,
  #[serde(default)]
  pub entity_type: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EntityEnvelope {
  pub entity_id: String,
  pub entity_type: String,
  pub canonical_name: String,
  pub external_ref: Option<(String, String)>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GetEntitiesResponse {
  pub entities: Vec<EntityEnvelope>,
}

/// List entities known for a user, optionally narrowed to one session or
/// entity type. There is no standalone "list entities" port, so this walks
/// the entity mentions already carried by recent episodic memories.
#[utoipa::path(
  post,
  path = "/api/v0/entities",
  request_body = GetEntitiesRequest,
  responses((status = 200, description = "Known entities", body = GetEntitiesResponse))
)]
#[axum::debug_handler]
pub async fn get_entities(State(state): State<AppState>, Json(req): Json<GetEntitiesRequest>) -> Result<Json<GetEntitiesResponse>, AppError> {
  let repos = PgRepositories::new(state.db.clone());
  let episodes = repos.find_recent_sessions(req.user_id, 20).await?;
  if episodes.is_empty() {
    return Ok(Json(GetEntitiesResponse { entities: Vec::new() }));
  }

  let mut seen = Vec::new();
  let mut entities = Vec::new();
  for episode in episodes.iter().filter(|e| req.session_id.is_none_or(|sid| sid == e.session_id)) {
    let Some(mentions) = episode.entities.as_array() else { continue };
    for mention in mentions {
      let Some(id) = mention.get("entity_id").and_then(Value::as_str) else { continue };
      if seen.iter().any(|s: &String| s == id) {
        continue;
      }
      seen.push(id.to_owned());

      let Some(model) = repos.get(id).await? else { continue };
      if req.entity_type.as_deref().is_some_and(|t| t != model.entity_type) {
        continue;
      }
      entities.push(EntityEnvelope {
        entity_id: model.entity_id,
        entity_type: model.entity_type,
        canonical_name: model.canonical_name,
        external_ref: model.external_ref_table.zip(model.external_ref_id),
      });
    }
  }

  Ok(Json(GetEntitiesResponse { entities }))
}
