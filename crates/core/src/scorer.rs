use std::collections::HashSet;

use chrono::{DateTime, Utc};
use mnemosyne_ai::cosine_similarity;
use mnemosyne_shared::{RetrievalStrategy, RetrievalWeights, APP_CONFIG};
use sea_orm::prelude::PgVector;

/// A memory (of any of the three retrievable layers) normalized to the shape
/// the scorer needs, produced by the candidate generator.
#[derive(Debug, Clone)]
pub struct MemoryCandidate {
  pub memory_id: String,
  pub memory_type: MemoryType,
  pub content: String,
  pub entity_ids: Vec<String>,
  pub embedding: PgVector,
  pub created_at: DateTime<Utc>,
  pub importance: f64,
  /// Stored confidence, already decayed to "now" by the caller for semantic
  /// memories; `1.0` for episodic/summary candidates which carry no decay.
  pub effective_confidence: f64,
  pub reinforcement_count: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryType {
  Semantic,
  Episodic,
  Summary,
}

impl MemoryType {
  const fn half_life_key(self) -> &'static str {
    match self {
      Self::Semantic => "semantic",
      Self::Episodic => "episodic",
      Self::Summary => "summary",
    }
  }
}

/// The five named signals plus effective confidence that combine into a
/// relevance score, returned alongside the score for explainability.
#[derive(Debug, Clone, Copy)]
pub struct SignalBreakdown {
  pub semantic_similarity: f64,
  pub entity_overlap: f64,
  pub recency: f64,
  pub importance: f64,
  pub reinforcement: f64,
  pub effective_confidence: f64,
}

impl SignalBreakdown {
  /// Recompute the relevance score from the stored signals; used by tests to
  /// assert the breakdown and the score it was derived from agree.
  #[must_use]
  pub fn recompute(&self, weights: RetrievalWeights) -> f64 {
    (weights.semantic * self.semantic_similarity
      + weights.entity * self.entity_overlap
      + weights.recency * self.recency
      + weights.importance * self.importance
      + weights.reinforcement * self.reinforcement)
      * self.effective_confidence
  }
}

#[derive(Debug, Clone)]
pub struct ScoredMemory {
  pub candidate: MemoryCandidate,
  pub score: f64,
  pub breakdown: SignalBreakdown,
}

/// The query-side context a scoring pass is run against.
pub struct QueryContext {
  pub embedding: PgVector,
  pub entity_ids: Vec<String>,
  pub strategy: RetrievalStrategy,
}

fn jaccard(a: &[String], b: &[String]) -> f64 {
  if a.is_empty() && b.is_empty() {
    return 0.0;
  }
  let set_a: HashSet<&String> = a.iter().collect();
  let set_b: HashSet<&String> = b.iter().collect();
  let intersection = set_a.intersection(&set_b).count() as f64;
  let union = set_a.union(&set_b).count() as f64;
  if union == 0.0 { 0.0 } else { intersection / union }
}

fn recency_signal(created_at: DateTime<Utc>, now: DateTime<Utc>, half_life_days: f64) -> f64 {
  let age_days = (now - created_at).num_seconds().max(0) as f64 / 86_400.0;
  (-std::f64::consts::LN_2 * age_days / half_life_days).exp()
}

fn reinforcement_signal(memory_type: MemoryType, reinforcement_count: i32) -> f64 {
  match memory_type {
    MemoryType::Semantic => (f64::from(reinforcement_count) / 5.0).min(1.0),
    MemoryType::Episodic | MemoryType::Summary => 0.5,
  }
}

/// Score a single candidate against a query context, deterministically and
/// without any I/O. Contract: pure function, no LLM calls, no suspension
/// points — safe to call from a hot loop over hundreds of candidates.
#[must_use]
pub fn score(candidate: &MemoryCandidate, query: &QueryContext, now: DateTime<Utc>) -> ScoredMemory {
  let weights = APP_CONFIG.weights_for(query.strategy);
  let half_life = APP_CONFIG.half_life_days(candidate.memory_type.half_life_key());

  let breakdown = SignalBreakdown {
    semantic_similarity: f64::from(cosine_similarity(
      candidate.embedding.as_slice(),
      query.embedding.as_slice(),
    ))
    .clamp(0.0, 1.0),
    entity_overlap: jaccard(&candidate.entity_ids, &query.entity_ids),
    recency: recency_signal(candidate.created_at, now, half_life),
    importance: candidate.importance.clamp(0.0, 1.0),
    reinforcement: reinforcement_signal(candidate.memory_type, candidate.reinforcement_count),
    effective_confidence: candidate.effective_confidence.clamp(0.0, 1.0),
  };

  let raw_score = breakdown.recompute(weights);

  ScoredMemory {
    candidate: candidate.clone(),
    score: raw_score.clamp(0.0, 1.0),
    breakdown,
  }
}

/// Score and sort a batch of candidates, highest relevance first.
#[must_use]
pub fn score_all(
  candidates: &[MemoryCandidate],
  query: &QueryContext,
  now: DateTime<Utc>,
) -> Vec<ScoredMemory> {
  let mut scored: Vec<ScoredMemory> = candidates.iter().map(|c| score(c, query, now)).collect();
  scored.sort_by(|a, b| b.score.total_cmp(&a.score));
  scored
}

#[cfg(test)]
mod tests {
  use super::*;

  fn candidate(memory_type: MemoryType, embedding: Vec<f32>, entities: &[&str]) -> MemoryCandidate {
    MemoryCandidate {
      memory_id: "m1".to_owned(),
      memory_type,
      content: "x".to_owned(),
      entity_ids: entities.iter().map(|s| (*s).to_owned()).collect(),
      embedding: PgVector::from(embedding),
      created_at: Utc::now(),
      importance: 0.5,
      effective_confidence: 0.8,
      reinforcement_count: 2,
    }
  }

  #[test]
  fn score_is_bounded() {
    let c = candidate(MemoryType::Semantic, vec![1.0, 0.0], &["customer:kai"]);
    let q = QueryContext {
      embedding: PgVector::from(vec![1.0, 0.0]),
      entity_ids: vec!["customer:kai".to_owned()],
      strategy: RetrievalStrategy::Targeted,
    };
    let scored = score(&c, &q, Utc::now());
    assert!(scored.score >= 0.0 && scored.score <= 1.0);
  }

  #[test]
  fn breakdown_recomputes_to_the_same_score() {
    let c = candidate(MemoryType::Episodic, vec![0.0, 1.0], &["customer:kai"]);
    let q = QueryContext {
      embedding: PgVector::from(vec![0.0, 1.0]),
      entity_ids: vec!["customer:kai".to_owned(), "order:1009".to_owned()],
      strategy: RetrievalStrategy::Exploratory,
    };
    let scored = score(&c, &q, Utc::now());
    let weights = APP_CONFIG.weights_for(q.strategy);
    let recomputed = scored.breakdown.recompute(weights).clamp(0.0, 1.0);
    assert!((recomputed - scored.score).abs() < 1e-6);
  }

  #[test]
  fn disjoint_entities_yield_zero_overlap() {
    assert!((jaccard(&["a".to_owned()], &["b".to_owned()]) - 0.0).abs() < 1e-9);
  }
}
