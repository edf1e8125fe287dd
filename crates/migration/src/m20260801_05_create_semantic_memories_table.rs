use mnemosyne_shared::APP_CONFIG;
use sea_orm_migration::{
  prelude::*,
  schema::{custom, double, integer, json_binary, pk_uuid, string, timestamp_with_time_zone, uuid},
  sea_orm::Statement,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(SemanticMemory::Table)
          .if_not_exists()
          .col(pk_uuid(SemanticMemory::MemoryId))
          .col(uuid(SemanticMemory::UserId))
          .col(string(SemanticMemory::SubjectEntityId))
          .col(string(SemanticMemory::Predicate))
          .col(string(SemanticMemory::PredicateType))
          .col(json_binary(SemanticMemory::ObjectValue))
          .col(double(SemanticMemory::Confidence))
          .col(integer(SemanticMemory::ReinforcementCount).default(0))
          .col(timestamp_with_time_zone(SemanticMemory::LastValidatedAt))
          .col(integer(SemanticMemory::SourceEventId))
          .col(string(SemanticMemory::Status).default("active"))
          .col(custom(
            SemanticMemory::Embedding,
            format!("vector({})", APP_CONFIG.embedding_dimensions),
          ).not_null())
          .col(timestamp_with_time_zone(SemanticMemory::CreatedAt).default(Expr::current_timestamp()))
          .col(timestamp_with_time_zone(SemanticMemory::UpdatedAt).default(Expr::current_timestamp()))
          .to_owned(),
      )
      .await?;

    manager
      .get_connection()
      .execute_raw(Statement::from_string(
        manager.get_database_backend(),
        "CREATE INDEX idx_semantic_memory_embedding ON semantic_memory USING hnsw (embedding vector_cosine_ops);",
      ))
      .await?;

    manager
      .get_connection()
      .execute_raw(Statement::from_string(
        manager.get_database_backend(),
        "CREATE INDEX idx_semantic_memory_active_subject_predicate ON semantic_memory (subject_entity_id, predicate) WHERE status = 'active';",
      ))
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_semantic_memory_user")
          .table(SemanticMemory::Table)
          .col(SemanticMemory::UserId)
          .to_owned(),
      )
      .await?;

    Ok(())
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(SemanticMemory::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum SemanticMemory {
  Table,

  MemoryId,
  UserId,
  SubjectEntityId,
  Predicate,     // normalized string
  PredicateType, // attribute | preference | relationship | action | policy
  ObjectValue,   // structured JSON
  Confidence,    // stored value, in [0, 0.95]; decay applied on read
  ReinforcementCount,
  LastValidatedAt,
  SourceEventId,
  Status, // active | aging | superseded | invalidated
  Embedding,
  CreatedAt,
  UpdatedAt,
}
