use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "domain_ontology")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub source_type: String,
  pub relation_name: String,
  pub target_type: String,
  pub max_traversal_hops: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
