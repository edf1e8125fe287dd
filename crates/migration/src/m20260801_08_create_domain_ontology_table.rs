use sea_orm_migration::{
  prelude::*,
  schema::{integer, pk_auto, string},
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(DomainOntology::Table)
          .if_not_exists()
          .col(pk_auto(DomainOntology::Id))
          .col(string(DomainOntology::SourceType))
          .col(string(DomainOntology::RelationName))
          .col(string(DomainOntology::TargetType))
          .col(integer(DomainOntology::MaxTraversalHops).default(1))
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(DomainOntology::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum DomainOntology {
  Table,

  Id,
  SourceType,
  RelationName, // e.g. HAS_MANY
  TargetType,
  MaxTraversalHops,
}
