use sea_orm_migration::{
  prelude::*,
  schema::{custom, double, json_binary, pk_uuid, string, text, timestamp_with_time_zone, uuid},
  sea_orm::Statement,
};
use mnemosyne_shared::APP_CONFIG;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(EpisodicMemory::Table)
          .if_not_exists()
          .col(pk_uuid(EpisodicMemory::MemoryId))
          .col(uuid(EpisodicMemory::UserId))
          .col(uuid(EpisodicMemory::SessionId))
          .col(string(EpisodicMemory::EventType))
          .col(text(EpisodicMemory::Summary))
          .col(custom(EpisodicMemory::SourceEventIds, "INTEGER[] NOT NULL DEFAULT '{}'"))
          .col(json_binary(EpisodicMemory::Entities))
          .col(double(EpisodicMemory::Importance))
          .col(custom(
            EpisodicMemory::Embedding,
            format!("vector({})", APP_CONFIG.embedding_dimensions),
          ).not_null())
          .col(timestamp_with_time_zone(EpisodicMemory::CreatedAt).default(Expr::current_timestamp()))
          .col(timestamp_with_time_zone(EpisodicMemory::ArchivedAt).null())
          .to_owned(),
      )
      .await?;

    manager
      .get_connection()
      .execute_raw(Statement::from_string(
        manager.get_database_backend(),
        "CREATE INDEX idx_episodic_memory_embedding ON episodic_memory USING hnsw (embedding vector_cosine_ops);",
      ))
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_episodic_memory_user_created")
          .table(EpisodicMemory::Table)
          .col(EpisodicMemory::UserId)
          .col(EpisodicMemory::CreatedAt)
          .to_owned(),
      )
      .await?;

    Ok(())
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(EpisodicMemory::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum EpisodicMemory {
  Table,

  MemoryId,
  UserId,
  SessionId,
  EventType, // question | statement | command | risk | ...
  Summary,
  SourceEventIds,
  Entities, // JSON array of {entity_id, entity_type}
  Importance,
  Embedding,
  CreatedAt,
  ArchivedAt, // set once consolidation has absorbed this episode
}
