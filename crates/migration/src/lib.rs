pub use sea_orm_migration::*;

mod m20260801_01_create_chat_events_table;
mod m20260801_02_create_canonical_entities_table;
mod m20260801_03_create_entity_aliases_table;
mod m20260801_04_create_episodic_memories_table;
mod m20260801_05_create_semantic_memories_table;
mod m20260801_06_create_procedural_memories_table;
mod m20260801_07_create_memory_summaries_table;
mod m20260801_08_create_domain_ontology_table;
mod m20260801_09_create_memory_conflicts_table;
mod m20260801_10_create_domain_fixture_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20260801_01_create_chat_events_table::Migration),
      Box::new(m20260801_02_create_canonical_entities_table::Migration),
      Box::new(m20260801_03_create_entity_aliases_table::Migration),
      Box::new(m20260801_04_create_episodic_memories_table::Migration),
      Box::new(m20260801_05_create_semantic_memories_table::Migration),
      Box::new(m20260801_06_create_procedural_memories_table::Migration),
      Box::new(m20260801_07_create_memory_summaries_table::Migration),
      Box::new(m20260801_08_create_domain_ontology_table::Migration),
      Box::new(m20260801_09_create_memory_conflicts_table::Migration),
      Box::new(m20260801_10_create_domain_fixture_tables::Migration),
    ]
  }
}
