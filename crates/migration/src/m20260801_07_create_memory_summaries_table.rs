use mnemosyne_shared::APP_CONFIG;
use sea_orm_migration::{
  prelude::*,
  schema::{boolean, custom, double, json_binary, pk_uuid, string, text, timestamp_with_time_zone, uuid},
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
          .table(MemorySummary::Table)
          .if_not_exists()
          .col(pk_uuid(MemorySummary::SummaryId))
          .col(uuid(MemorySummary::UserId))
          .col(string(MemorySummary::ScopeType)) // entity | topic | session_window
          .col(string(MemorySummary::ScopeIdentifier))
          .col(text(MemorySummary::SummaryText))
          .col(json_binary(MemorySummary::KeyFacts))
          .col(json_binary(MemorySummary::SourceData))
          .col(custom(MemorySummary::SourceMemoryIds, "UUID[] NOT NULL DEFAULT '{}'"))
          .col(boolean(MemorySummary::Superseded).default(false))
          .col(double(MemorySummary::Confidence))
          .col(custom(
            MemorySummary::Embedding,
            format!("vector({})", APP_CONFIG.embedding_dimensions),
          ).not_null())
          .col(timestamp_with_time_zone(MemorySummary::CreatedAt).default(Expr::current_timestamp()))
          .to_owned(),
      )
      .await?;

    manager
      .get_connection()
      .execute_raw(Statement::from_string(
        manager.get_database_backend(),
        "CREATE UNIQUE INDEX idx_memory_summary_active_scope ON memory_summary (user_id, scope_type, scope_identifier) WHERE NOT superseded;",
      ))
      .await?;

    manager
      .get_connection()
      .execute_raw(Statement::from_string(
        manager.get_database_backend(),
        "CREATE INDEX idx_memory_summary_embedding ON memory_summary USING hnsw (embedding vector_cosine_ops);",
      ))
      .await?;

    Ok(())
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(MemorySummary::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum MemorySummary {
  Table,

  SummaryId,
  UserId,
  ScopeType,
  ScopeIdentifier,
  SummaryText,
  KeyFacts,   // map: name -> {value, confidence, reinforcement, source_memory_ids}
  SourceData, // counts, time range, fallback flag
  SourceMemoryIds, // episodic + semantic memory ids folded into this summary, for idempotency checks
  Superseded,
  Confidence,
  Embedding,
  CreatedAt,
}
