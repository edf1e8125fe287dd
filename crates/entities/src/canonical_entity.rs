use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "canonical_entity")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub entity_id: String,
  pub entity_type: String,
  pub canonical_name: String,
  pub external_ref_table: Option<String>,
  pub external_ref_id: Option<String>,
  pub properties: Json,
  pub created_at: DateTimeWithTimeZone,
  pub updated_at: DateTimeWithTimeZone,
  pub owner_user_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
  EntityAlias,
}

impl RelationTrait for Relation {
  fn def(&self) -> RelationDef {
    match self {
      Self::EntityAlias => Entity::has_many(super::entity_alias::Entity).into(),
    }
  }
}

impl Related<super::entity_alias::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::EntityAlias.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
  #[must_use]
  pub fn has_external_ref(&self) -> bool {
    self.external_ref_table.is_some() && self.external_ref_id.is_some()
  }
}
