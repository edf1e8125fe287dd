use mnemosyne_ai::{CompletionResult, LlmPort};
use mnemosyne_shared::AppError;

use crate::pii_redactor;
use crate::ports::DomainFact;
use crate::scorer::ScoredMemory;
use mnemosyne_shared::Message;

const RESPONSE_GUIDELINES: &str = "Response guidelines: cite the source of any fact you state; \
  hedge when a memory's confidence is low; prefer database facts over remembered facts when they \
  disagree; if a conflict between memories was flagged, acknowledge it rather than silently \
  picking a side.";

/// Render the fixed-order prompt sections the generator sends to the LLM:
/// role, then authoritative DB facts, then contextual memories, then at most
/// the last three turns, then the response guidelines.
#[must_use]
pub fn assemble_prompt(
  role_description: &str,
  domain_facts: &[DomainFact],
  retrieved_memories: &[ScoredMemory],
  recent_turns: &[Message],
) -> String {
  let mut sections = vec![format!("Role: {role_description}")];

  if domain_facts.is_empty() {
    sections.push("DB facts (authoritative): none retrieved for this turn.".to_owned());
  } else {
    let facts = domain_facts
      .iter()
      .map(|f| format!("- [{}] {} (source: {} {:?})", f.fact_type, f.content, f.source_table, f.source_rows))
      .collect::<Vec<_>>()
      .join("\n");
    sections.push(format!("DB facts (authoritative):\n{facts}"));
  }

  if retrieved_memories.is_empty() {
    sections.push("Retrieved memories (contextual): none.".to_owned());
  } else {
    let memories = retrieved_memories
      .iter()
      .map(|m| format!("- {} (confidence {:.2}, relevance {:.2})", m.candidate.content, m.breakdown.effective_confidence, m.score))
      .collect::<Vec<_>>()
      .join("\n");
    sections.push(format!("Retrieved memories (contextual):\n{memories}"));
  }

  let turns = recent_turns
    .iter()
    .rev()
    .take(3)
    .collect::<Vec<_>>()
    .into_iter()
    .rev()
    .map(|m| format!("{:?}: {}", m.role, m.content))
    .collect::<Vec<_>>()
    .join("\n");
  sections.push(format!("Recent turns (<=3):\n{turns}"));
  sections.push(RESPONSE_GUIDELINES.to_owned());

  sections.join("\n\n")
}

/// Generate the assistant's reply for a turn. On LLM failure (including a
/// degraded sentinel from the port), falls back to a disclaimer plus the top
/// three domain facts verbatim rather than surfacing an error to the user.
pub async fn generate(
  llm: &dyn LlmPort,
  role_description: &str,
  domain_facts: &[DomainFact],
  retrieved_memories: &[ScoredMemory],
  recent_turns: &[Message],
) -> Result<String, AppError> {
  let prompt = assemble_prompt(role_description, domain_facts, retrieved_memories, recent_turns);
  let system = "You are a helpful assistant for a small business operator. Reply in at most a \
    few sentences, in plain prose, honoring the response guidelines given in the prompt.";

  let CompletionResult { content, degraded, .. } = llm.generate_completion(system, &prompt).await?;

  if degraded || content.trim().is_empty() {
    return Ok(fallback_reply(domain_facts));
  }

  Ok(pii_redactor::redact(&content).text)
}

fn fallback_reply(domain_facts: &[DomainFact]) -> String {
  if domain_facts.is_empty() {
    return "I wasn't able to reach the assistant model just now, and I don't have any \
      database facts to fall back on for this question. Please try again shortly."
      .to_owned();
  }
  let top = domain_facts
    .iter()
    .take(3)
    .map(|f| format!("- {}", f.content))
    .collect::<Vec<_>>()
    .join("\n");
  format!(
    "I wasn't able to reach the assistant model just now, so here is what the database \
    directly shows:\n{top}"
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fallback_lists_up_to_three_facts() {
    let facts = (0..5)
      .map(|i| DomainFact {
        fact_type: "invoice_status".to_owned(),
        entity_id: "customer:kai".to_owned(),
        content: serde_json::json!({ "invoice_number": format!("INV-{i}") }),
        metadata: serde_json::json!({}),
        source_table: "domain_invoice".to_owned(),
        source_rows: vec![i.to_string()],
        retrieved_at: chrono::Utc::now(),
      })
      .collect::<Vec<_>>();
    let reply = fallback_reply(&facts);
    assert_eq!(reply.matches("INV-").count(), 3);
  }

  #[test]
  fn fallback_with_no_facts_still_replies() {
    let reply = fallback_reply(&[]);
    assert!(!reply.is_empty());
  }
}
