use sea_orm_migration::{
  prelude::*,
  schema::{json_binary, pk_auto, string, text, timestamp_with_time_zone, uuid},
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(ChatEvent::Table)
          .if_not_exists()
          .col(pk_auto(ChatEvent::EventId))
          .col(uuid(ChatEvent::UserId))
          .col(uuid(ChatEvent::SessionId))
          .col(string(ChatEvent::Role))
          .col(text(ChatEvent::Content))
          .col(string(ChatEvent::ContentHash))
          .col(json_binary(ChatEvent::Metadata))
          .col(timestamp_with_time_zone(ChatEvent::CreatedAt).default(Expr::current_timestamp()))
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_chat_events_session_hash")
          .table(ChatEvent::Table)
          .col(ChatEvent::SessionId)
          .col(ChatEvent::ContentHash)
          .unique()
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_chat_events_user_created")
          .table(ChatEvent::Table)
          .col(ChatEvent::UserId)
          .col(ChatEvent::CreatedAt)
          .to_owned(),
      )
      .await?;

    Ok(())
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(ChatEvent::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum ChatEvent {
  Table,

  EventId, // monotonic per-session id
  UserId,
  SessionId,
  Role,        // user | assistant | system
  Content,     // redacted before storage
  ContentHash, // sha256(session_id + content + coarse timestamp bucket)
  Metadata,
  CreatedAt,
}
