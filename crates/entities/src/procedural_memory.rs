use sea_orm::entity::prelude::*;
use sea_orm::prelude::PgVector;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "procedural_memory")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub memory_id: Uuid,
  pub user_id: Uuid,
  pub trigger_pattern: String,
  pub trigger_features: Json,
  pub action_structure: Json,
  pub observed_count: i32,
  pub confidence: f64,
  #[serde(skip, default = "default_embedding")]
  pub embedding: PgVector,
  pub created_at: DateTimeWithTimeZone,
}

fn default_embedding() -> PgVector {
  PgVector::from(Vec::new())
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
