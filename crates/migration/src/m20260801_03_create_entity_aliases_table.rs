use sea_orm_migration::{
  prelude::*,
  schema::{double, integer, pk_auto, string, string_null, timestamp_with_time_zone},
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
          .table(EntityAlias::Table)
          .if_not_exists()
          .col(pk_auto(EntityAlias::Id))
          .col(string(EntityAlias::CanonicalEntityId))
          .col(string(EntityAlias::AliasText))
          .col(string_null(EntityAlias::UserId))
          .col(string(EntityAlias::AliasSource))
          .col(double(EntityAlias::Confidence))
          .col(integer(EntityAlias::UsageCount).default(1))
          .col(timestamp_with_time_zone(EntityAlias::CreatedAt).default(Expr::current_timestamp()))
          .foreign_key(
            ForeignKey::create()
              .from(EntityAlias::Table, EntityAlias::CanonicalEntityId)
              .to(
                crate::m20260801_02_create_canonical_entities_table::CanonicalEntity::Table,
                crate::m20260801_02_create_canonical_entities_table::CanonicalEntity::EntityId,
              )
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .get_connection()
      .execute_raw(Statement::from_string(
        manager.get_database_backend(),
        "CREATE INDEX idx_entity_alias_text_trgm ON entity_alias USING gin (alias_text gin_trgm_ops);",
      ))
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_entity_alias_unique_scope")
          .table(EntityAlias::Table)
          .col(EntityAlias::CanonicalEntityId)
          .col(EntityAlias::AliasText)
          .col(EntityAlias::UserId)
          .unique()
          .to_owned(),
      )
      .await?;

    Ok(())
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(EntityAlias::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum EntityAlias {
  Table,

  Id,
  CanonicalEntityId,
  AliasText,
  UserId,      // NULL for globally learned aliases
  AliasSource, // user_stated | fuzzy | coreference
  Confidence,
  UsageCount,
  CreatedAt,
}
