use sea_orm::entity::prelude::*;
use sea_orm::prelude::PgVector;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "semantic_memory")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub memory_id: Uuid,
  pub user_id: Uuid,
  pub subject_entity_id: String,
  pub predicate: String,
  pub predicate_type: String,
  pub object_value: Json,
  pub confidence: f64,
  pub reinforcement_count: i32,
  pub last_validated_at: DateTimeWithTimeZone,
  pub source_event_id: i32,
  pub status: String,
  #[serde(skip, default = "default_embedding")]
  pub embedding: PgVector,
  pub created_at: DateTimeWithTimeZone,
  pub updated_at: DateTimeWithTimeZone,
}

fn default_embedding() -> PgVector {
  PgVector::from(Vec::new())
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
  #[must_use]
  pub fn is_active(&self) -> bool {
    self.status == "active" || self.status == "aging"
  }
}
