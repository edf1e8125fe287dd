use mnemosyne_shared::APP_CONFIG;
use sea_orm_migration::{
  prelude::*,
  schema::{custom, double, integer, json_binary, pk_uuid, text, timestamp_with_time_zone, uuid},
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
          .table(ProceduralMemory::Table)
          .if_not_exists()
          .col(pk_uuid(ProceduralMemory::MemoryId))
          .col(uuid(ProceduralMemory::UserId))
          .col(text(ProceduralMemory::TriggerPattern))
          .col(json_binary(ProceduralMemory::TriggerFeatures))
          .col(json_binary(ProceduralMemory::ActionStructure))
          .col(integer(ProceduralMemory::ObservedCount).default(1))
          .col(double(ProceduralMemory::Confidence))
          .col(custom(
            ProceduralMemory::Embedding,
            format!("vector({})", APP_CONFIG.embedding_dimensions),
          ).not_null())
          .col(timestamp_with_time_zone(ProceduralMemory::CreatedAt).default(Expr::current_timestamp()))
          .to_owned(),
      )
      .await?;

    manager
      .get_connection()
      .execute_raw(Statement::from_string(
        manager.get_database_backend(),
        "CREATE INDEX idx_procedural_memory_embedding ON procedural_memory USING hnsw (embedding vector_cosine_ops);",
      ))
      .await?;

    manager
      .get_connection()
      .execute_raw(Statement::from_string(
        manager.get_database_backend(),
        "CREATE INDEX idx_procedural_memory_user ON procedural_memory (user_id);",
      ))
      .await?;

    Ok(())
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(ProceduralMemory::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum ProceduralMemory {
  Table,

  MemoryId,
  UserId,
  TriggerPattern,  // templated description
  TriggerFeatures, // JSON: {intent, entity_types: [...]}
  ActionStructure, // JSON: ordered augmentation hints
  ObservedCount,
  Confidence,
  Embedding,
  CreatedAt,
}
