use mnemosyne_entities::canonical_entity;
use mnemosyne_shared::{AppError, APP_CONFIG};
use tracing::warn;

use crate::ports::{DomainDbPort, DomainFact};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
  Financial,
  Operational,
  SlaMonitoring,
  General,
}

const FINANCIAL_KEYWORDS: &[&str] = &["invoice", "payment", "balance", "owe", "bill", "paid"];
const OPERATIONAL_KEYWORDS: &[&str] = &["order", "work order", "delivery", "shipment", "fulfill"];
const SLA_KEYWORDS: &[&str] = &["overdue", "late", "risk", "deadline", "sla"];

/// Lowercase-keyword heuristic classifying the turn's query text into one of
/// four intents. First matching category wins; SLA takes priority over the
/// broader operational bucket since "overdue order" should trigger risk
/// queries, not just order-chain ones.
#[must_use]
pub fn classify_intent(query_text: &str) -> Intent {
  let lower = query_text.to_lowercase();
  if SLA_KEYWORDS.iter().any(|k| lower.contains(k)) {
    Intent::SlaMonitoring
  } else if FINANCIAL_KEYWORDS.iter().any(|k| lower.contains(k)) {
    Intent::Financial
  } else if OPERATIONAL_KEYWORDS.iter().any(|k| lower.contains(k)) {
    Intent::Operational
  } else {
    Intent::General
  }
}

/// For each resolved customer entity, run the domain queries applicable to
/// the classified intent, in parallel, merging results. A query that fails
/// is logged and skipped rather than failing the whole augmentation step.
pub async fn augment(
  entities: &[canonical_entity::Model],
  query_text: &str,
  order_number: Option<&str>,
  domain: &dyn DomainDbPort,
) -> Vec<DomainFact> {
  let intent = classify_intent(query_text);
  let customers: Vec<&str> = entities
    .iter()
    .filter(|e| e.entity_type == "customer")
    .filter_map(|e| e.external_ref_id.as_deref())
    .collect();

  let mut tasks: Vec<std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<DomainFact>, AppError>> + Send + '_>>> = Vec::new();

  for customer_id in &customers {
    match intent {
      Intent::Financial => tasks.push(Box::pin(domain.invoice_status(customer_id))),
      Intent::Operational => {
        tasks.push(Box::pin(domain.work_orders(customer_id)));
        tasks.push(Box::pin(domain.tasks(customer_id)));
      }
      Intent::SlaMonitoring => tasks.push(Box::pin(domain.sla_risk(customer_id, 7))),
      Intent::General => {
        tasks.push(Box::pin(domain.invoice_status(customer_id)));
        tasks.push(Box::pin(domain.tasks(customer_id)));
      }
    }
  }

  if let Some(order_number) = order_number {
    tasks.push(Box::pin(domain.order_chain(order_number)));
  }

  let results = futures::future::join_all(tasks).await;
  let mut facts = Vec::new();
  for result in results {
    match result {
      Ok(rows) => facts.extend(rows),
      Err(err) => warn!(error = %err, "domain augmentation query failed, skipping"),
    }
  }
  facts.truncate(APP_CONFIG.candidate_limit_semantic);
  facts
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn classifies_financial_keywords() {
    assert_eq!(classify_intent("what is the balance on that invoice?"), Intent::Financial);
  }

  #[test]
  fn sla_keyword_wins_over_financial() {
    assert_eq!(classify_intent("is this invoice overdue?"), Intent::SlaMonitoring);
  }

  #[test]
  fn falls_back_to_general() {
    assert_eq!(classify_intent("how's the weather"), Intent::General);
  }
}
