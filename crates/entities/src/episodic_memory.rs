use sea_orm::entity::prelude::*;
use sea_orm::prelude::PgVector;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "episodic_memory")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub memory_id: Uuid,
  pub user_id: Uuid,
  pub session_id: Uuid,
  pub event_type: String,
  pub summary: String,
  pub source_event_ids: Vec<i32>,
  pub entities: Json,
  pub importance: f64,
  #[serde(skip, default = "default_embedding")]
  pub embedding: PgVector,
  pub created_at: DateTimeWithTimeZone,
  pub archived_at: Option<DateTimeWithTimeZone>,
}

fn default_embedding() -> PgVector {
  PgVector::from(Vec::new())
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
  #[must_use]
  pub const fn is_archived(&self) -> bool {
    self.archived_at.is_some()
  }
}
