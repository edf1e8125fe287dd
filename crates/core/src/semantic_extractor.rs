use mnemosyne_ai::LlmPort;
use mnemosyne_shared::{AppError, APP_CONFIG};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

const PREDICATE_TYPES: &[&str] = &["attribute", "preference", "relationship", "action", "policy"];

const SYSTEM_PROMPT: &str = "You extract structured facts from a single user turn in a business \
  conversation. Emit a JSON array of triples, each with subject_entity_id, predicate, \
  predicate_type, object_value, and confidence. predicate_type must be one of: attribute, \
  preference, relationship, action, policy. subject_entity_id must be one of the entity ids \
  provided. confidence is your estimate in [0, 1]. Emit an empty array if nothing is extractable.";

const RETRY_SYSTEM_PROMPT: &str = "Reply with a JSON array only. No prose, no markdown fences. \
  Each element: {subject_entity_id, predicate, predicate_type, object_value, confidence}.";

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedTriple {
  pub subject_entity_id: String,
  pub predicate: String,
  pub predicate_type: String,
  pub object_value: Value,
  pub confidence: f64,
}

fn schema() -> Value {
  json!({
    "type": "array",
    "items": {
      "type": "object",
      "properties": {
        "subject_entity_id": { "type": "string" },
        "predicate": { "type": "string" },
        "predicate_type": { "type": "string", "enum": PREDICATE_TYPES },
        "object_value": {},
        "confidence": { "type": "number" }
      },
      "required": ["subject_entity_id", "predicate", "predicate_type", "object_value", "confidence"],
      "additionalProperties": false
    }
  })
}

fn user_prompt(redacted_text: &str, resolved_entities: &[(String, String)]) -> String {
  let entity_list = resolved_entities
    .iter()
    .map(|(id, kind)| format!("{id} ({kind})"))
    .collect::<Vec<_>>()
    .join(", ");
  format!("Message: \"{redacted_text}\"\nResolved entities: [{entity_list}]")
}

/// Run the single extraction call for a turn, validating and clamping the
/// result. On a malformed first response, retries once with a terser prompt;
/// a second failure degrades to zero triples rather than propagating an
/// error, since a missed extraction should never fail the whole turn.
pub async fn extract(
  llm: &dyn LlmPort,
  redacted_text: &str,
  resolved_entities: &[(String, String)],
) -> Result<Vec<ExtractedTriple>, AppError> {
  let user = user_prompt(redacted_text, resolved_entities);

  let first = llm.generate_structured(SYSTEM_PROMPT, &user, "semantic_triples", schema()).await?;
  if let Some(triples) = parse_and_filter(&first, resolved_entities) {
    return Ok(triples);
  }

  warn!("semantic extraction first pass returned invalid JSON, retrying");
  let second = llm
    .generate_structured(RETRY_SYSTEM_PROMPT, &user, "semantic_triples", schema())
    .await?;
  if let Some(triples) = parse_and_filter(&second, resolved_entities) {
    return Ok(triples);
  }

  warn!(event = "extraction_degraded", "semantic extraction failed twice, yielding zero triples");
  Ok(Vec::new())
}

fn parse_and_filter(raw: &str, resolved_entities: &[(String, String)]) -> Option<Vec<ExtractedTriple>> {
  let parsed: Vec<ExtractedTriple> = serde_json::from_str(raw).ok()?;
  Some(
    parsed
      .into_iter()
      .filter(|t| PREDICATE_TYPES.contains(&t.predicate_type.as_str()))
      .filter(|t| resolved_entities.iter().any(|(id, _)| id == &t.subject_entity_id))
      .map(|mut t| {
        t.confidence = t.confidence.clamp(0.0, APP_CONFIG.max_confidence);
        t
      })
      .collect(),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use async_trait::async_trait;
  use mnemosyne_ai::CompletionResult;
  use std::sync::atomic::{AtomicUsize, Ordering};

  struct ScriptedLlm {
    responses: Vec<&'static str>,
    calls: AtomicUsize,
  }

  #[async_trait]
  impl LlmPort for ScriptedLlm {
    async fn generate_completion(&self, _system: &str, _user: &str) -> Result<CompletionResult, AppError> {
      Ok(CompletionResult::default())
    }

    async fn generate_structured(
      &self,
      _system: &str,
      _user: &str,
      _schema_name: &str,
      _schema: Value,
    ) -> Result<String, AppError> {
      let idx = self.calls.fetch_add(1, Ordering::SeqCst);
      Ok(self.responses[idx.min(self.responses.len() - 1)].to_owned())
    }
  }

  #[tokio::test]
  async fn drops_triples_for_unresolved_subjects() {
    let llm = ScriptedLlm {
      responses: vec![
        r#"[{"subject_entity_id":"customer:kai","predicate":"prefers_delivery_day","predicate_type":"preference","object_value":"Friday","confidence":0.8},{"subject_entity_id":"customer:ghost","predicate":"x","predicate_type":"attribute","object_value":"y","confidence":0.5}]"#,
      ],
      calls: AtomicUsize::new(0),
    };
    let entities = vec![("customer:kai".to_owned(), "customer".to_owned())];
    let triples = extract(&llm, "their delivery day is Friday", &entities).await.unwrap();
    assert_eq!(triples.len(), 1);
    assert_eq!(triples[0].subject_entity_id, "customer:kai");
  }

  #[tokio::test]
  async fn clamps_confidence_to_ceiling() {
    let llm = ScriptedLlm {
      responses: vec![
        r#"[{"subject_entity_id":"customer:kai","predicate":"p","predicate_type":"attribute","object_value":"v","confidence":1.0}]"#,
      ],
      calls: AtomicUsize::new(0),
    };
    let entities = vec![("customer:kai".to_owned(), "customer".to_owned())];
    let triples = extract(&llm, "text", &entities).await.unwrap();
    assert!(triples[0].confidence <= APP_CONFIG.max_confidence);
  }

  #[tokio::test]
  async fn retries_once_then_degrades_to_empty() {
    let llm = ScriptedLlm {
      responses: vec!["not json", "still not json"],
      calls: AtomicUsize::new(0),
    };
    let entities = vec![("customer:kai".to_owned(), "customer".to_owned())];
    let triples = extract(&llm, "text", &entities).await.unwrap();
    assert!(triples.is_empty());
  }
}
