use sea_orm_migration::{
  prelude::*,
  schema::{json_binary, string, string_null, timestamp_with_time_zone, uuid},
  sea_orm::Statement,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .get_connection()
      .execute_raw(Statement::from_string(
        manager.get_database_backend(),
        "CREATE EXTENSION IF NOT EXISTS pg_trgm;",
      ))
      .await?;

    manager
      .create_table(
        Table::create()
          .table(CanonicalEntity::Table)
          .if_not_exists()
          .col(string(CanonicalEntity::EntityId).primary_key())
          .col(string(CanonicalEntity::EntityType))
          .col(string(CanonicalEntity::CanonicalName))
          .col(string_null(CanonicalEntity::ExternalRefTable))
          .col(string_null(CanonicalEntity::ExternalRefId))
          .col(json_binary(CanonicalEntity::Properties))
          .col(timestamp_with_time_zone(CanonicalEntity::CreatedAt).default(Expr::current_timestamp()))
          .col(timestamp_with_time_zone(CanonicalEntity::UpdatedAt).default(Expr::current_timestamp()))
          .col(uuid(CanonicalEntity::OwnerUserId))
          .to_owned(),
      )
      .await?;

    manager
      .get_connection()
      .execute_raw(Statement::from_string(
        manager.get_database_backend(),
        "CREATE INDEX idx_canonical_entities_name_trgm ON canonical_entity USING gin (canonical_name gin_trgm_ops);",
      ))
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_canonical_entities_owner_type")
          .table(CanonicalEntity::Table)
          .col(CanonicalEntity::OwnerUserId)
          .col(CanonicalEntity::EntityType)
          .to_owned(),
      )
      .await?;

    Ok(())
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(CanonicalEntity::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum CanonicalEntity {
  Table,

  EntityId, // stable string, e.g. "customer:<uuid>"
  EntityType,
  CanonicalName,
  ExternalRefTable, // nullable link into the domain database
  ExternalRefId,
  Properties, // arbitrary JSON bag
  CreatedAt,
  UpdatedAt,
  OwnerUserId, // scoping; entities never cross users
}
