use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mnemosyne_entities::{canonical_entity, chat_event, entity_alias, episodic_memory, memory_conflict, memory_summary, procedural_memory, semantic_memory};
use mnemosyne_shared::AppError;
use sea_orm::prelude::PgVector;
use serde_json::Value;
use uuid::Uuid;

/// Candidate returned by fuzzy/external lookups, carrying enough to let the
/// resolver decide ambiguity without a second round trip.
#[derive(Debug, Clone)]
pub struct EntityCandidate {
  pub entity_id: String,
  pub canonical_name: String,
  pub similarity: f64,
}

#[async_trait]
pub trait ChatEventRepository: Send + Sync {
  async fn find_by_session_and_hash(
    &self,
    session_id: Uuid,
    content_hash: &str,
  ) -> Result<Option<chat_event::Model>, AppError>;

  async fn insert(&self, model: chat_event::Model) -> Result<chat_event::Model, AppError>;
}

#[async_trait]
pub trait EntityRepository: Send + Sync {
  async fn find_by_exact_name(&self, user_id: Uuid, name: &str) -> Result<Option<canonical_entity::Model>, AppError>;

  async fn find_alias(&self, user_id: Uuid, alias_text: &str) -> Result<Option<entity_alias::Model>, AppError>;

  async fn fuzzy_candidates(&self, user_id: Uuid, text: &str, threshold: f64) -> Result<Vec<EntityCandidate>, AppError>;

  async fn get(&self, entity_id: &str) -> Result<Option<canonical_entity::Model>, AppError>;

  async fn create(&self, model: canonical_entity::Model) -> Result<canonical_entity::Model, AppError>;

  async fn upsert_alias(
    &self,
    canonical_entity_id: &str,
    user_id: Option<Uuid>,
    alias_text: &str,
    source: &str,
    confidence: f64,
  ) -> Result<entity_alias::Model, AppError>;
}

#[async_trait]
pub trait SemanticMemoryRepository: Send + Sync {
  async fn find_active_by_subject_predicate(
    &self,
    user_id: Uuid,
    subject_entity_id: &str,
    predicate: &str,
  ) -> Result<Vec<semantic_memory::Model>, AppError>;

  async fn find_active_by_subject(&self, user_id: Uuid, subject_entity_id: &str) -> Result<Vec<semantic_memory::Model>, AppError>;

  async fn insert(&self, model: semantic_memory::Model) -> Result<semantic_memory::Model, AppError>;

  async fn apply_reinforce(&self, memory_id: Uuid, diff: crate::validation::ReinforceDiff) -> Result<(), AppError>;

  async fn mark_status(&self, memory_id: Uuid, status: &str) -> Result<(), AppError>;

  async fn find_similar(
    &self,
    user_id: Uuid,
    embedding: &PgVector,
    limit: u64,
  ) -> Result<Vec<semantic_memory::Model>, AppError>;

  async fn find_confirmable(&self, memory_ids: &[Uuid]) -> Result<Vec<semantic_memory::Model>, AppError>;
}

#[async_trait]
pub trait EpisodicMemoryRepository: Send + Sync {
  async fn insert(&self, model: episodic_memory::Model) -> Result<episodic_memory::Model, AppError>;

  async fn find_similar(
    &self,
    user_id: Uuid,
    embedding: &PgVector,
    limit: u64,
  ) -> Result<Vec<episodic_memory::Model>, AppError>;

  async fn find_for_entity(&self, user_id: Uuid, entity_id: &str) -> Result<Vec<episodic_memory::Model>, AppError>;

  async fn find_recent_sessions(&self, user_id: Uuid, session_count: usize) -> Result<Vec<episodic_memory::Model>, AppError>;

  async fn mark_archived(&self, memory_ids: &[Uuid], at: DateTime<Utc>) -> Result<(), AppError>;
}

#[async_trait]
pub trait SummaryRepository: Send + Sync {
  async fn find_active(&self, user_id: Uuid, scope_type: &str, scope_identifier: &str) -> Result<Option<memory_summary::Model>, AppError>;

  async fn find_similar(
    &self,
    user_id: Uuid,
    embedding: &PgVector,
    limit: u64,
  ) -> Result<Vec<memory_summary::Model>, AppError>;

  async fn supersede_and_insert(&self, model: memory_summary::Model) -> Result<memory_summary::Model, AppError>;
}

#[async_trait]
pub trait ConflictRepository: Send + Sync {
  async fn insert(&self, model: memory_conflict::Model) -> Result<memory_conflict::Model, AppError>;
}

#[async_trait]
pub trait ProceduralMemoryRepository: Send + Sync {
  async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<procedural_memory::Model>, AppError>;

  async fn find_by_trigger_pattern(&self, user_id: Uuid, trigger_pattern: &str) -> Result<Option<procedural_memory::Model>, AppError>;

  async fn insert(&self, model: procedural_memory::Model) -> Result<procedural_memory::Model, AppError>;

  async fn reinforce(&self, memory_id: Uuid, observed_count: i32, confidence: f64) -> Result<(), AppError>;
}

/// A single typed, provenanced result surfaced by the domain database.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DomainFact {
  pub fact_type: String,
  pub entity_id: String,
  pub content: Value,
  pub metadata: Value,
  pub source_table: String,
  pub source_rows: Vec<String>,
  pub retrieved_at: DateTime<Utc>,
}

/// Read-only port onto the external business database. The core depends only
/// on this trait; a concrete implementation wires it to whatever schema the
/// deployment's domain database actually has.
#[async_trait]
pub trait DomainDbPort: Send + Sync {
  async fn invoice_status(&self, customer_external_id: &str) -> Result<Vec<DomainFact>, AppError>;
  async fn order_chain(&self, order_number: &str) -> Result<Vec<DomainFact>, AppError>;
  async fn sla_risk(&self, customer_external_id: &str, age_threshold_days: i64) -> Result<Vec<DomainFact>, AppError>;
  async fn work_orders(&self, customer_external_id: &str) -> Result<Vec<DomainFact>, AppError>;
  async fn tasks(&self, customer_external_id: &str) -> Result<Vec<DomainFact>, AppError>;
  /// Resolve a free-text name against the domain database's customer table,
  /// used by entity-resolution stage 5.
  async fn find_customer_by_name(&self, name: &str) -> Result<Option<(Uuid, String)>, AppError>;
}
