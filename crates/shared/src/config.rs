use std::collections::HashMap;
use std::env;
use std::sync::LazyLock;

fn required_env(key: &str) -> String {
  env::var(key).unwrap_or_else(|_| panic!("env {key} must be set"))
}

fn env_f64(key: &str, default: f64) -> f64 {
  env::var(key)
    .ok()
    .and_then(|v| v.parse().ok())
    .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
  env::var(key)
    .ok()
    .and_then(|v| v.parse().ok())
    .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
  env::var(key)
    .ok()
    .and_then(|v| v.parse().ok())
    .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
  env::var(key)
    .ok()
    .and_then(|v| v.parse().ok())
    .unwrap_or(default)
}

/// Per-strategy weights for the multi-signal scorer. Must sum to (approximately) 1.0;
/// this is asserted in tests rather than enforced at load time, since operators may
/// intentionally tune them away from that sum during experimentation.
#[derive(Debug, Clone, Copy)]
pub struct RetrievalWeights {
  pub semantic: f64,
  pub entity: f64,
  pub recency: f64,
  pub importance: f64,
  pub reinforcement: f64,
}

impl RetrievalWeights {
  const fn exploratory() -> Self {
    Self {
      semantic: 0.45,
      entity: 0.15,
      recency: 0.15,
      importance: 0.15,
      reinforcement: 0.10,
    }
  }

  const fn targeted() -> Self {
    Self {
      semantic: 0.30,
      entity: 0.35,
      recency: 0.10,
      importance: 0.15,
      reinforcement: 0.10,
    }
  }

  const fn factual_entity_focused() -> Self {
    Self {
      semantic: 0.20,
      entity: 0.45,
      recency: 0.10,
      importance: 0.15,
      reinforcement: 0.10,
    }
  }

  const fn temporal() -> Self {
    Self {
      semantic: 0.25,
      entity: 0.15,
      recency: 0.40,
      importance: 0.10,
      reinforcement: 0.10,
    }
  }
}

/// Retrieval strategy name, used to pick a [`RetrievalWeights`] vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetrievalStrategy {
  Exploratory,
  Targeted,
  FactualEntityFocused,
  Temporal,
}

/// Process-wide immutable configuration, assembled once at startup from the
/// environment. Every numeric knob named by the memory engine lives here so that
/// domain services never read `std::env` directly.
pub struct AppConfig {
  pub database_url: String,
  pub openai_base_url: String,
  pub openai_api_key: String,
  pub openai_chat_model: String,
  pub openai_embedding_model: String,
  pub embedding_dimensions: u32,

  /// Exponential decay rate applied to stored confidence, per day.
  pub decay_rate_per_day: f64,
  /// Floor below which a semantic memory is considered inactive.
  pub min_active_confidence: f64,
  /// Ceiling no stored confidence may exceed; the system never claims certainty.
  pub max_confidence: f64,
  /// Confidence added on reinforcement of an existing semantic memory.
  pub reinforcement_step: f64,
  /// Confidence added to memories confirmed during consolidation.
  pub consolidation_confirmation_boost: f64,

  pub half_life_days_semantic: f64,
  pub half_life_days_episodic: f64,
  pub half_life_days_summary: f64,

  pub candidate_limit_semantic: usize,
  pub candidate_limit_episodic: usize,
  pub candidate_limit_summary: usize,

  pub consolidation_min_episodic_for_entity_scope: usize,
  pub consolidation_min_sessions_for_window_scope: usize,
  pub consolidation_max_retries: u32,

  pub procedural_support_threshold: usize,
  pub procedural_max_patterns: usize,

  pub fuzzy_match_threshold: f64,
  pub fuzzy_ambiguity_margin: f64,

  pub llm_timeout_secs: u64,
  pub embedding_timeout_secs: u64,
  pub sql_timeout_secs: u64,
  pub turn_timeout_secs: u64,

  pub pii_pattern_set: PiiPatternSet,
}

impl AppConfig {
  fn new() -> Self {
    dotenvy::dotenv().ok();

    Self {
      database_url: required_env("DATABASE_URL"),
      openai_base_url: required_env("OPENAI_BASE_URL"),
      openai_api_key: required_env("OPENAI_API_KEY"),
      openai_chat_model: required_env("OPENAI_CHAT_MODEL"),
      openai_embedding_model: required_env("OPENAI_EMBEDDING_MODEL"),
      embedding_dimensions: env_u64("MNEMOSYNE_EMBEDDING_DIMENSIONS", 1536) as u32,

      decay_rate_per_day: env_f64("MNEMOSYNE_DECAY_RATE_PER_DAY", 0.0115),
      min_active_confidence: env_f64("MNEMOSYNE_MIN_ACTIVE_CONFIDENCE", 0.3),
      max_confidence: env_f64("MNEMOSYNE_MAX_CONFIDENCE", 0.95),
      reinforcement_step: env_f64("MNEMOSYNE_REINFORCEMENT_STEP", 0.05),
      consolidation_confirmation_boost: env_f64("MNEMOSYNE_CONSOLIDATION_CONFIRMATION_BOOST", 0.10),

      half_life_days_semantic: env_f64("MNEMOSYNE_HALF_LIFE_DAYS_SEMANTIC", 90.0),
      half_life_days_episodic: env_f64("MNEMOSYNE_HALF_LIFE_DAYS_EPISODIC", 30.0),
      half_life_days_summary: env_f64("MNEMOSYNE_HALF_LIFE_DAYS_SUMMARY", 180.0),

      candidate_limit_semantic: env_usize("MNEMOSYNE_CANDIDATE_LIMIT_SEMANTIC", 50),
      candidate_limit_episodic: env_usize("MNEMOSYNE_CANDIDATE_LIMIT_EPISODIC", 30),
      candidate_limit_summary: env_usize("MNEMOSYNE_CANDIDATE_LIMIT_SUMMARY", 5),

      consolidation_min_episodic_for_entity_scope: env_usize(
        "MNEMOSYNE_CONSOLIDATION_MIN_EPISODIC_ENTITY",
        10,
      ),
      consolidation_min_sessions_for_window_scope: env_usize(
        "MNEMOSYNE_CONSOLIDATION_MIN_SESSIONS_WINDOW",
        3,
      ),
      consolidation_max_retries: env_u64("MNEMOSYNE_CONSOLIDATION_MAX_RETRIES", 3) as u32,

      procedural_support_threshold: env_usize("MNEMOSYNE_PROCEDURAL_SUPPORT_THRESHOLD", 3),
      procedural_max_patterns: env_usize("MNEMOSYNE_PROCEDURAL_MAX_PATTERNS", 20),

      fuzzy_match_threshold: env_f64("MNEMOSYNE_FUZZY_MATCH_THRESHOLD", 0.6),
      fuzzy_ambiguity_margin: env_f64("MNEMOSYNE_FUZZY_AMBIGUITY_MARGIN", 0.15),

      llm_timeout_secs: env_u64("MNEMOSYNE_LLM_TIMEOUT_SECS", 20),
      embedding_timeout_secs: env_u64("MNEMOSYNE_EMBEDDING_TIMEOUT_SECS", 5),
      sql_timeout_secs: env_u64("MNEMOSYNE_SQL_TIMEOUT_SECS", 2),
      turn_timeout_secs: env_u64("MNEMOSYNE_TURN_TIMEOUT_SECS", 30),

      pii_pattern_set: PiiPatternSet::from_env(),
    }
  }

  /// Weight vector for a named retrieval strategy.
  #[must_use]
  pub const fn weights_for(&self, strategy: RetrievalStrategy) -> RetrievalWeights {
    match strategy {
      RetrievalStrategy::Exploratory => RetrievalWeights::exploratory(),
      RetrievalStrategy::Targeted => RetrievalWeights::targeted(),
      RetrievalStrategy::FactualEntityFocused => RetrievalWeights::factual_entity_focused(),
      RetrievalStrategy::Temporal => RetrievalWeights::temporal(),
    }
  }

  /// Half-life, in days, used by the recency signal for a memory layer name
  /// (`"semantic" | "episodic" | "summary"`).
  #[must_use]
  pub fn half_life_days(&self, memory_type: &str) -> f64 {
    match memory_type {
      "episodic" => self.half_life_days_episodic,
      "summary" => self.half_life_days_summary,
      _ => self.half_life_days_semantic,
    }
  }
}

/// PII pattern toggles, kept separate from the numeric knobs above since they are
/// read by the redactor rather than the scorer/validator.
pub struct PiiPatternSet {
  pub enabled: HashMap<&'static str, bool>,
}

impl Default for PiiPatternSet {
  fn default() -> Self {
    let mut enabled = HashMap::new();
    enabled.insert("phone", true);
    enabled.insert("email", true);
    enabled.insert("ssn", true);
    enabled.insert("credit_card", true);
    Self { enabled }
  }
}

impl PiiPatternSet {
  fn from_env() -> Self {
    let defaults = Self::default();
    let mut enabled = HashMap::new();
    for (name, default) in defaults.enabled {
      let key = format!("MNEMOSYNE_PII_PATTERN_{}", name.to_uppercase());
      enabled.insert(name, env_bool(&key, default));
    }
    Self { enabled }
  }
}

pub static APP_CONFIG: LazyLock<AppConfig> = LazyLock::new(AppConfig::new);
