use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use mnemosyne_ai::{EmbeddingPort, LlmPort};
use mnemosyne_core::consolidation::{self, ConsolidationScope};
use mnemosyne_core::repository::PgRepositories;
use mnemosyne_shared::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::utils::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "scope_type", content = "scope_value", rename_all = "snake_case")]
pub enum ConsolidateScopeDto {
  Entity(String),
  Topic(String),
  SessionWindow(usize),
}

impl ConsolidateScopeDto {
  fn as_scope(&self) -> ConsolidationScope<'_> {
    match self {
      Self::Entity(id) => ConsolidationScope::Entity(id),
      Self::Topic(pattern) => ConsolidationScope::Topic(pattern),
      Self::SessionWindow(n) => ConsolidationScope::SessionWindow(*n),
    }
  }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConsolidateRequest {
  pub user_id: Uuid,
  pub scope: ConsolidateScopeDto,
  #[serde(default)]
  pub force: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConsolidateResponse {
  pub summary_id: Uuid,
  pub scope_type: String,
  pub scope_identifier: String,
  pub summary_text: String,
  pub key_facts: serde_json::Value,
  pub confidence: f64,
  pub created_at: DateTime<Utc>,
}

/// Synchronously consolidate a user's memories within a scope into a
/// `MemorySummary`. Callers are free to treat the response as fire-and-forget.
#[utoipa::path(
  post,
  path = "/api/v0/consolidate",
  request_body = ConsolidateRequest,
  responses(
    (status = 200, description = "Resulting summary", body = ConsolidateResponse),
    (status = 400, description = "Scope is below the consolidation threshold or not implemented")
  )
)]
#[axum::debug_handler]
pub async fn consolidate(State(state): State<AppState>, Json(req): Json<ConsolidateRequest>) -> Result<Json<ConsolidateResponse>, AppError> {
  let repos = PgRepositories::new(state.db.clone());
  let llm: &dyn LlmPort = state.llm.as_ref();
  let embedder: &dyn EmbeddingPort = state.llm.as_ref();

  let summary = consolidation::consolidate(req.user_id, req.scope.as_scope(), req.force, llm, embedder, &repos, &repos, &repos).await?;

  Ok(Json(ConsolidateResponse {
    summary_id: summary.summary_id,
    scope_type: summary.scope_type,
    scope_identifier: summary.scope_identifier,
    summary_text: summary.summary_text,
    key_facts: summary.key_facts,
    confidence: summary.confidence,
    created_at: summary.created_at.with_timezone(&Utc),
  }))
}
