use sea_orm_migration::{
  prelude::*,
  schema::{pk_uuid, string, string_null, timestamp_with_time_zone, uuid},
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(MemoryConflict::Table)
          .if_not_exists()
          .col(pk_uuid(MemoryConflict::ConflictId))
          .col(uuid(MemoryConflict::MemoryA))
          .col(uuid(MemoryConflict::MemoryB))
          .col(string(MemoryConflict::ConflictType))
          .col(string_null(MemoryConflict::Resolution))
          .col(timestamp_with_time_zone(MemoryConflict::DetectedAt).default(Expr::current_timestamp()))
          .col(timestamp_with_time_zone(MemoryConflict::ResolvedAt).null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(MemoryConflict::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum MemoryConflict {
  Table,

  ConflictId,
  MemoryA,
  MemoryB,
  ConflictType, // value_mismatch | temporal_inconsistency | logical_contradiction
  Resolution,   // trust_recent | trust_confident | trust_reinforced | require_clarification
  DetectedAt,
  ResolvedAt,
}
