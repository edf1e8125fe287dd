use chrono::Utc;
use mnemosyne_ai::{EmbeddingPort, LlmPort};
use mnemosyne_entities::{canonical_entity, chat_event, episodic_memory, memory_conflict, semantic_memory};
use mnemosyne_shared::{Message, MessageRole, RetrievalStrategy};
use sea_orm::prelude::PgVector;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use crate::conflict_detector::{self, ConflictType, ResolutionStrategy};
use crate::domain_augmentation;
use crate::entity_resolver::{self, ResolutionResult};
use crate::errors::TurnError;
use crate::mention_extractor;
use crate::pii_redactor;
use crate::ports::{
  ChatEventRepository, ConflictRepository, DomainDbPort, DomainFact, EntityRepository, EpisodicMemoryRepository,
  SemanticMemoryRepository, SummaryRepository,
};
use crate::reply;
use crate::scorer::{self, MemoryType, QueryContext, ScoredMemory};
use crate::validation;

/// Handle to every port and repository the turn use case needs. Assembled
/// once at the composition root and passed down rather than resolved
/// through a container.
pub struct TurnContext<'a> {
  pub llm: &'a dyn LlmPort,
  pub embedder: &'a dyn EmbeddingPort,
  pub chat_events: &'a dyn ChatEventRepository,
  pub entities: &'a dyn EntityRepository,
  pub semantic_memories: &'a dyn SemanticMemoryRepository,
  pub episodic_memories: &'a dyn EpisodicMemoryRepository,
  pub summaries: &'a dyn SummaryRepository,
  pub conflicts: &'a dyn ConflictRepository,
  pub domain: &'a dyn DomainDbPort,
}

pub struct TurnInput {
  pub user_id: Uuid,
  pub session_id: Uuid,
  pub role_description: String,
  pub content: String,
  pub recent_turns: Vec<Message>,
  pub recent_entities: Vec<canonical_entity::Model>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TurnOutput {
  pub event_id: i32,
  pub session_id: Uuid,
  pub reply: String,
  pub resolved_entities: Vec<String>,
  pub retrieved_memory_ids: Vec<String>,
  pub used_domain_facts: usize,
  pub semantic_memory_ids: Vec<Uuid>,
  pub conflict_count: usize,
  pub created_at: chrono::DateTime<Utc>,
}

fn content_hash(session_id: Uuid, content: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(session_id.as_bytes());
  hasher.update(content.as_bytes());
  format!("{:x}", hasher.finalize())
}

/// The `ProcessTurn` use case: steps 1-10 of the per-turn pipeline. Fatal
/// failures (steps 1-3) surface as `TurnError`; everything after that
/// degrades gracefully rather than aborting the turn.
pub async fn process_turn(ctx: &TurnContext<'_>, input: TurnInput) -> Result<TurnOutput, TurnError> {
  let now = Utc::now();

  // 1. Redact content, compute content hash.
  let redacted = pii_redactor::redact(&input.content);

  // 2. Ingest ChatEvent; short-circuit on duplicate hash.
  let hash = content_hash(input.session_id, &redacted.text);
  if let Some(existing) = ctx.chat_events.find_by_session_and_hash(input.session_id, &hash).await? {
    info!(event_id = existing.event_id, "duplicate turn, short-circuiting");
    return Ok(TurnOutput {
      event_id: existing.event_id,
      session_id: input.session_id,
      reply: String::new(),
      resolved_entities: Vec::new(),
      retrieved_memory_ids: Vec::new(),
      used_domain_facts: 0,
      semantic_memory_ids: Vec::new(),
      conflict_count: 0,
      created_at: existing.created_at.with_timezone(&Utc),
    });
  }

  let event = ctx
    .chat_events
    .insert(chat_event::Model {
      event_id: 0,
      user_id: input.user_id,
      session_id: input.session_id,
      role: "user".to_owned(),
      content: redacted.text.clone(),
      content_hash: hash,
      metadata: serde_json::json!({}),
      created_at: now.into(),
    })
    .await?;

  // 3. Extract mentions; resolve entities.
  let mentions = mention_extractor::extract_mentions(&redacted.text);
  let mut resolved: Vec<(String, String)> = Vec::new();
  for mention in &mentions {
    match entity_resolver::resolve_mention(mention, input.user_id, &input.recent_entities, ctx.entities, ctx.domain, ctx.llm).await? {
      ResolutionResult::Resolved { entity_id, .. } => {
        if let Some(entity) = ctx.entities.get(&entity_id).await? {
          resolved.push((entity.entity_id, entity.entity_type));
        }
      }
      ResolutionResult::NeedsDisambiguation { candidates } => {
        return Err(TurnError::Ambiguous { mention: mention.text.clone(), candidates });
      }
      ResolutionResult::Failed => {
        warn!(mention = %mention.text, "entity mention could not be resolved, dropping");
      }
    }
  }

  // 4. Embed content.
  let embedding = ctx.embedder.embed(&redacted.text).await.unwrap_or_else(|_| PgVector::from(Vec::new()));

  // 5. Extract semantic triples.
  let triples = crate::semantic_extractor::extract(ctx.llm, &redacted.text, &resolved).await.unwrap_or_default();

  // 6. For each triple: detect conflict, reinforce or insert.
  let mut conflict_count = 0usize;
  let mut semantic_memory_ids = Vec::new();
  for triple in triples {
    let existing_rows = ctx
      .semantic_memories
      .find_active_by_subject_predicate(input.user_id, &triple.subject_entity_id, &triple.predicate)
      .await
      .unwrap_or_default();

    if let Some(existing) = existing_rows.into_iter().find(|m| m.is_active()) {
      let classification = conflict_detector::classify(&existing, &triple.predicate, &triple.object_value);
      match classification {
        ConflictType::NoConflict => {
          let diff = validation::reinforce(&existing, now);
          ctx.semantic_memories.apply_reinforce(existing.memory_id, diff).await?;
          semantic_memory_ids.push(existing.memory_id);
        }
        ConflictType::ValueMismatch | ConflictType::TemporalInconsistency | ConflictType::LogicalContradiction => {
          conflict_count += 1;
          let strategy = conflict_detector::resolve(&existing, now, triple.confidence, 0);
          let needs_clarification = matches!(strategy, ResolutionStrategy::RequireClarification);
          if !needs_clarification {
            ctx.semantic_memories.mark_status(existing.memory_id, "superseded").await?;
          }
          if let Ok(inserted) = insert_triple(ctx, input.user_id, &triple, event.event_id, &embedding, now).await {
            semantic_memory_ids.push(inserted);
            if needs_clarification {
              ctx
                .conflicts
                .insert(memory_conflict::Model {
                  conflict_id: Uuid::new_v4(),
                  memory_a: existing.memory_id,
                  memory_b: inserted,
                  conflict_type: classification.as_str().to_owned(),
                  resolution: None,
                  detected_at: now.into(),
                  resolved_at: None,
                })
                .await?;
            }
          }
        }
      }
    } else if let Ok(inserted) = insert_triple(ctx, input.user_id, &triple, event.event_id, &embedding, now).await {
      semantic_memory_ids.push(inserted);
    }
  }

  // 7. Create episodic memory summarizing the turn.
  let entities_json = serde_json::json!(resolved
    .iter()
    .map(|(id, kind)| serde_json::json!({ "entity_id": id, "entity_type": kind }))
    .collect::<Vec<_>>());
  let _ = ctx
    .episodic_memories
    .insert(episodic_memory::Model {
      memory_id: Uuid::new_v4(),
      user_id: input.user_id,
      session_id: input.session_id,
      event_type: "statement".to_owned(),
      summary: redacted.text.clone(),
      source_event_ids: vec![event.event_id],
      entities: entities_json,
      importance: 0.5,
      embedding: embedding.clone(),
      created_at: now.into(),
      archived_at: None,
    })
    .await;

  // 8. Parallel fan-out: candidate generation + domain augmentation.
  let candidate_future = crate::candidate_generator::generate(
    input.user_id,
    &embedding,
    ctx.semantic_memories,
    ctx.episodic_memories,
    ctx.summaries,
  );
  let entity_models: Vec<canonical_entity::Model> = {
    let mut models = Vec::new();
    for (id, _) in &resolved {
      if let Ok(Some(m)) = ctx.entities.get(id).await {
        models.push(m);
      }
    }
    models
  };
  let order_number = mention_extractor::extract_order_number(&redacted.text);
  let domain_future = domain_augmentation::augment(&entity_models, &redacted.text, order_number.as_deref(), ctx.domain);

  let (candidates, domain_facts): (_, Vec<DomainFact>) = tokio::join!(candidate_future, domain_future);

  let query = QueryContext {
    embedding: embedding.clone(),
    entity_ids: resolved.iter().map(|(id, _)| id.clone()).collect(),
    strategy: RetrievalStrategy::Targeted,
  };
  let scored: Vec<ScoredMemory> = scorer::score_all(&candidates, &query, now);
  let retrieved_memory_ids = scored.iter().map(|m| m.candidate.memory_id.clone()).collect();

  // 9. Assemble context; generate reply; redact output.
  let reply_text = reply::generate(ctx.llm, &input.role_description, &domain_facts, &scored, &input.recent_turns)
    .await
    .unwrap_or_else(|_| "I ran into a problem putting that reply together.".to_owned());

  let _ = MessageRole::Assistant;

  Ok(TurnOutput {
    event_id: event.event_id,
    session_id: input.session_id,
    reply: reply_text,
    resolved_entities: resolved.into_iter().map(|(id, _)| id).collect(),
    retrieved_memory_ids,
    used_domain_facts: domain_facts.len(),
    semantic_memory_ids,
    conflict_count,
    created_at: now,
  })
}

async fn insert_triple(
  ctx: &TurnContext<'_>,
  user_id: Uuid,
  triple: &crate::semantic_extractor::ExtractedTriple,
  source_event_id: i32,
  embedding: &sea_orm::prelude::PgVector,
  now: chrono::DateTime<Utc>,
) -> Result<Uuid, mnemosyne_shared::AppError> {
  let model = semantic_memory::Model {
    memory_id: Uuid::new_v4(),
    user_id,
    subject_entity_id: triple.subject_entity_id.clone(),
    predicate: triple.predicate.clone(),
    predicate_type: triple.predicate_type.clone(),
    object_value: triple.object_value.clone(),
    confidence: triple.confidence,
    reinforcement_count: 0,
    last_validated_at: now.into(),
    source_event_id,
    status: "active".to_owned(),
    embedding: embedding.clone(),
    created_at: now.into(),
    updated_at: now.into(),
  };
  Ok(ctx.semantic_memories.insert(model).await?.memory_id)
}
