pub mod canonical_entity;
pub mod chat_event;
pub mod domain;
pub mod domain_ontology;
pub mod entity_alias;
pub mod episodic_memory;
pub mod memory_conflict;
pub mod memory_summary;
pub mod procedural_memory;
pub mod semantic_memory;

pub mod prelude {
  pub use super::canonical_entity::Entity as CanonicalEntity;
  pub use super::chat_event::Entity as ChatEvent;
  pub use super::domain::customer::Entity as DomainCustomer;
  pub use super::domain::invoice::Entity as DomainInvoice;
  pub use super::domain::payment::Entity as DomainPayment;
  pub use super::domain::sales_order::Entity as DomainSalesOrder;
  pub use super::domain::task::Entity as DomainTask;
  pub use super::domain::work_order::Entity as DomainWorkOrder;
  pub use super::domain_ontology::Entity as DomainOntology;
  pub use super::entity_alias::Entity as EntityAlias;
  pub use super::episodic_memory::Entity as EpisodicMemory;
  pub use super::memory_conflict::Entity as MemoryConflict;
  pub use super::memory_summary::Entity as MemorySummary;
  pub use super::procedural_memory::Entity as ProceduralMemory;
  pub use super::semantic_memory::Entity as SemanticMemory;
}
