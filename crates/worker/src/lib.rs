use std::time::Duration;

use apalis::prelude::{Monitor, WorkerBuilder};
use apalis_postgres::PostgresStorage;
use mnemosyne_ai::{EmbeddingPort, LlmPort, OpenAiClient};
use mnemosyne_core::consolidation::{self, ConsolidationScope};
use mnemosyne_core::ports::EpisodicMemoryRepository;
use mnemosyne_core::procedural_miner;
use mnemosyne_core::repository::PgRepositories;
use mnemosyne_shared::{AppError, APP_CONFIG};
use sea_orm::prelude::PgVector;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug)]
pub struct WorkerError(pub AppError);

impl std::fmt::Display for WorkerError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    self.0.fmt(f)
  }
}

impl std::error::Error for WorkerError {}

impl From<AppError> for WorkerError {
  fn from(err: AppError) -> Self {
    Self(err)
  }
}

/// Wire shape of [`ConsolidationScope`], which borrows its identifier and so
/// cannot itself cross a job-queue serialization boundary.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum ConsolidationScopeDto {
  Entity(String),
  Topic(String),
  SessionWindow(usize),
}

impl ConsolidationScopeDto {
  fn as_scope(&self) -> ConsolidationScope<'_> {
    match self {
      Self::Entity(id) => ConsolidationScope::Entity(id),
      Self::Topic(pattern) => ConsolidationScope::Topic(pattern),
      Self::SessionWindow(n) => ConsolidationScope::SessionWindow(*n),
    }
  }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConsolidationJob {
  pub user_id: Uuid,
  pub scope: ConsolidationScopeDto,
  pub force: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProceduralMiningJob {
  pub user_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum WorkerJob {
  Consolidate(ConsolidationJob),
  MinePatterns(ProceduralMiningJob),
}

/// Deterministic stand-in for an embedding call inside the miner's
/// similarity-key generator. `procedural_miner::mine` asks for a synchronous
/// function, and a trigger pattern's embedding only needs to be a stable
/// lookup key, not a semantically rich vector, so this avoids blocking the
/// worker's async runtime on a provider round trip for every mined pattern.
#[must_use]
pub fn pattern_embedding(text: &str) -> PgVector {
  let dims = (APP_CONFIG.embedding_dimensions as usize).max(1);
  let mut v = vec![0.0_f32; dims];
  for (i, byte) in text.bytes().enumerate() {
    let idx = (i + byte as usize) % v.len();
    v[idx] += 1.0;
  }
  let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
  if norm > 0.0 {
    for x in &mut v {
      *x /= norm;
    }
  }
  PgVector::from(v)
}

async fn handle_consolidation_job(job: ConsolidationJob, db: DatabaseConnection, client: std::sync::Arc<OpenAiClient>) -> Result<(), WorkerError> {
  let repos = PgRepositories::new(db);
  let llm: &dyn LlmPort = client.as_ref();
  let embedder: &dyn EmbeddingPort = client.as_ref();

  match consolidation::consolidate(job.user_id, job.scope.as_scope(), job.force, llm, embedder, &repos, &repos, &repos).await {
    Ok(summary) => {
      info!(summary_id = %summary.summary_id, user_id = %job.user_id, "consolidation job produced a summary");
    }
    Err(err) => {
      warn!(user_id = %job.user_id, error = %err, "consolidation job did not produce a summary, skipping");
    }
  }
  Ok(())
}

async fn handle_mining_job(job: ProceduralMiningJob, db: DatabaseConnection) -> Result<(), WorkerError> {
  let repos = PgRepositories::new(db);
  let mut episodes = repos.find_recent_sessions(job.user_id, APP_CONFIG.candidate_limit_episodic).await?;
  episodes.sort_by_key(|e| e.created_at);

  match procedural_miner::mine(job.user_id, &episodes, pattern_embedding, &repos).await {
    Ok(mined) => info!(user_id = %job.user_id, count = mined.len(), "procedural mining run complete"),
    Err(err) => warn!(user_id = %job.user_id, error = %err, "procedural mining run failed"),
  }
  Ok(())
}

/// Runs the background job monitor: consolidation and procedural-pattern
/// mining, both triggered out of band from the per-turn pipeline so a slow
/// LLM synthesis call never blocks a live conversation.
pub async fn worker(db: &DatabaseConnection, backend: PostgresStorage<WorkerJob>) -> Result<(), AppError> {
  let db = db.clone();
  let client = std::sync::Arc::new(OpenAiClient::new());

  Monitor::new()
    .register(move |_run_id| {
      let db = db.clone();
      let client = client.clone();
      let backend = backend.clone();

      WorkerBuilder::new("mnemosyne-worker").backend(backend).build(move |job: WorkerJob| {
        let db = db.clone();
        let client = client.clone();
        async move {
          match job {
            WorkerJob::Consolidate(job) => handle_consolidation_job(job, db, client).await,
            WorkerJob::MinePatterns(job) => handle_mining_job(job, db).await,
          }
        }
      })
    })
    .shutdown_timeout(Duration::from_secs(5))
    .run_with_signal(tokio::signal::ctrl_c())
    .await
    .map_err(|err| AppError::from(anyhow::Error::new(err)))?;

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pattern_embedding_is_deterministic() {
    let a = pattern_embedding("when question:[customer] then command:[order]");
    let b = pattern_embedding("when question:[customer] then command:[order]");
    assert_eq!(a, b);
  }

  #[test]
  fn consolidation_scope_dto_round_trips_into_the_right_variant() {
    let dto = ConsolidationScopeDto::Entity("customer:kai".to_owned());
    assert!(matches!(dto.as_scope(), ConsolidationScope::Entity("customer:kai")));
  }
}
