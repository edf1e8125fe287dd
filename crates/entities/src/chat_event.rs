use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chat_event")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub event_id: i32,
  pub user_id: Uuid,
  pub session_id: Uuid,
  pub role: String,
  pub content: String,
  pub content_hash: String,
  pub metadata: Json,
  pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
