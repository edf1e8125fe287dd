use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use mnemosyne_core::ports::EpisodicMemoryRepository;
use mnemosyne_core::procedural_miner;
use mnemosyne_core::repository::PgRepositories;
use mnemosyne_shared::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::utils::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct DetectPatternsRequest {
  pub user_id: Uuid,
  #[serde(default)]
  pub min_support: Option<usize>,
  #[serde(default)]
  pub max_patterns: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProceduralPatternDto {
  pub memory_id: Uuid,
  pub trigger_pattern: String,
  pub observed_count: i32,
  pub confidence: f64,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DetectPatternsResponse {
  pub patterns: Vec<ProceduralPatternDto>,
}

/// Mine recurring episode-to-episode transitions into `ProceduralMemory`
/// patterns. `min_support`/`max_patterns` only narrow the globally
/// configured thresholds; they never loosen them.
#[utoipa::path(
  post,
  path = "/api/v0/detect_patterns",
  request_body = DetectPatternsRequest,
  responses((status = 200, description = "Mined patterns", body = DetectPatternsResponse))
)]
#[axum::debug_handler]
pub async fn detect_patterns(State(state): State<AppState>, Json(req): Json<DetectPatternsRequest>) -> Result<Json<DetectPatternsResponse>, AppError> {
  let repos = PgRepositories::new(state.db.clone());
  let mut episodes = repos.find_recent_sessions(req.user_id, mnemosyne_shared::APP_CONFIG.candidate_limit_episodic).await?;
  episodes.sort_by_key(|e| e.created_at);

  let mined = procedural_miner::mine(req.user_id, &episodes, mnemosyne_worker::pattern_embedding, &repos).await?;

  let min_support = req.min_support.unwrap_or(0);
  let mut patterns: Vec<ProceduralPatternDto> = mined
    .into_iter()
    .filter(|p| p.observed_count as usize >= min_support)
    .map(|p| ProceduralPatternDto {
      memory_id: p.memory_id,
      trigger_pattern: p.trigger_pattern,
      observed_count: p.observed_count,
      confidence: p.confidence,
      created_at: p.created_at.with_timezone(&Utc),
    })
    .collect();

  if let Some(max_patterns) = req.max_patterns {
    patterns.truncate(max_patterns);
  }

  Ok(Json(DetectPatternsResponse { patterns }))
}
