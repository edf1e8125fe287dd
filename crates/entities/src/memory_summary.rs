use sea_orm::entity::prelude::*;
use sea_orm::prelude::PgVector;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "memory_summary")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub summary_id: Uuid,
  pub user_id: Uuid,
  pub scope_type: String,
  pub scope_identifier: String,
  pub summary_text: String,
  pub key_facts: Json,
  pub source_data: Json,
  pub source_memory_ids: Vec<Uuid>,
  pub superseded: bool,
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
