use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "memory_conflict")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub conflict_id: Uuid,
  pub memory_a: Uuid,
  pub memory_b: Uuid,
  pub conflict_type: String,
  pub resolution: Option<String>,
  pub detected_at: DateTimeWithTimeZone,
  pub resolved_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
