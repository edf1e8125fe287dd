use axum::{Json, extract::State};
use mnemosyne_ai::{EmbeddingPort, LlmPort};
use mnemosyne_core::orchestrator::{self, TurnContext, TurnInput, TurnOutput};
use mnemosyne_core::ports::{EntityRepository, EpisodicMemoryRepository};
use mnemosyne_core::repository::{FixtureDomainDb, PgRepositories};
use mnemosyne_shared::{AppError, ErrorKind};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::utils::AppState;

const DEFAULT_ROLE_DESCRIPTION: &str = "a small business operations assistant";

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessTurnRequest {
  pub user_id: Uuid,
  pub session_id: Option<Uuid>,
  pub content: String,
  #[serde(default)]
  pub role: Option<String>,
  /// Accepted for API-contract parity; the turn pipeline does not yet thread
  /// caller-supplied metadata into the stored chat event.
  #[serde(default)]
  pub metadata: Option<Value>,
}

/// Entities mentioned in this session's recent episodic memories, used to
/// seed pronoun/coreference resolution. There is no dedicated "entities for
/// session" port, so this walks the same entity JSON that episodic memories
/// already carry.
async fn recent_entities_for_session(
  repos: &PgRepositories,
  user_id: Uuid,
  session_id: Uuid,
) -> Vec<mnemosyne_entities::canonical_entity::Model> {
  let episodes = repos.find_recent_sessions(user_id, 5).await.unwrap_or_default();
  let mut ids: Vec<String> = Vec::new();
  for episode in episodes.iter().filter(|e| e.session_id == session_id) {
    if let Some(mentions) = episode.entities.as_array() {
      for mention in mentions {
        if let Some(id) = mention.get("entity_id").and_then(Value::as_str) {
          if !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_owned());
          }
        }
      }
    }
  }

  let mut models = Vec::new();
  for id in ids {
    if let Ok(Some(model)) = repos.get(&id).await {
      models.push(model);
    }
  }
  models
}

/// Process one conversational turn: ingest, resolve entities, extract and
/// reconcile facts, retrieve context, and generate a reply.
#[utoipa::path(
  post,
  path = "/api/v0/process_turn",
  request_body = ProcessTurnRequest,
  responses(
    (status = 200, description = "Turn processed", body = TurnOutput),
    (status = 400, description = "Content was empty or failed a domain invariant"),
    (status = 422, description = "An entity mention is ambiguous and needs disambiguation")
  )
)]
#[axum::debug_handler]
#[tracing::instrument(skip(state, payload), fields(user_id = %payload.user_id))]
pub async fn process_turn(State(state): State<AppState>, Json(payload): Json<ProcessTurnRequest>) -> Result<Json<TurnOutput>, AppError> {
  if payload.content.trim().is_empty() {
    return Err(AppError::with_kind(ErrorKind::Domain, anyhow::anyhow!("content cannot be empty")));
  }

  let repos = PgRepositories::new(state.db.clone());
  let domain = FixtureDomainDb { db: state.db.clone() };
  let llm: &dyn LlmPort = state.llm.as_ref();
  let embedder: &dyn EmbeddingPort = state.llm.as_ref();

  let session_id = payload.session_id.unwrap_or_else(Uuid::new_v4);
  let recent_entities = recent_entities_for_session(&repos, payload.user_id, session_id).await;

  let ctx = TurnContext {
    llm,
    embedder,
    chat_events: &repos,
    entities: &repos,
    semantic_memories: &repos,
    episodic_memories: &repos,
    summaries: &repos,
    conflicts: &repos,
    domain: &domain,
  };

  let input = TurnInput {
    user_id: payload.user_id,
    session_id,
    role_description: payload.role.unwrap_or_else(|| DEFAULT_ROLE_DESCRIPTION.to_owned()),
    content: payload.content,
    recent_turns: Vec::new(),
    recent_entities,
  };

  let output = orchestrator::process_turn(&ctx, input).await?;
  Ok(Json(output))
}
