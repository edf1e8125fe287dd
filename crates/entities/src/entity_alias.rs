use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "entity_alias")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub canonical_entity_id: String,
  pub alias_text: String,
  pub user_id: Option<String>,
  pub alias_source: String,
  pub confidence: f64,
  pub usage_count: i32,
  pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
  CanonicalEntity,
}

impl RelationTrait for Relation {
  fn def(&self) -> RelationDef {
    match self {
      Self::CanonicalEntity => Entity::belongs_to(super::canonical_entity::Entity)
        .from(Column::CanonicalEntityId)
        .to(super::canonical_entity::Column::EntityId)
        .into(),
    }
  }
}

impl Related<super::canonical_entity::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::CanonicalEntity.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
