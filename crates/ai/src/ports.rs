use async_trait::async_trait;
use mnemosyne_shared::AppError;
use sea_orm::prelude::PgVector;

/// Result of a single LLM completion call. `cost_usd` is zero and `content` is
/// empty when the provider degraded (rate limit, connection failure after
/// retries) so callers can detect the difference between "LLM said nothing"
/// and "LLM could not be reached" without a separate error channel.
#[derive(Debug, Clone, Default)]
pub struct CompletionResult {
  pub content: String,
  pub tokens_used: u32,
  pub model: String,
  pub cost_usd: f64,
  pub degraded: bool,
}

/// Outbound port to a chat-completion provider. The core depends on this
/// trait, never on a concrete `async-openai` client, so tests can substitute
/// [`NullLlm`](crate::openai::NullLlm).
#[async_trait]
pub trait LlmPort: Send + Sync {
  async fn generate_completion(
    &self,
    system: &str,
    user: &str,
  ) -> Result<CompletionResult, AppError>;

  /// Generate a JSON value constrained to `schema`, returning the raw text so
  /// the caller can deserialize into its own type (kept untyped at the port
  /// boundary to keep the trait object-safe).
  async fn generate_structured(
    &self,
    system: &str,
    user: &str,
    schema_name: &str,
    schema: serde_json::Value,
  ) -> Result<String, AppError>;
}

/// Outbound port to a text-embedding provider.
#[async_trait]
pub trait EmbeddingPort: Send + Sync {
  async fn embed(&self, text: &str) -> Result<PgVector, AppError>;
  async fn embed_many(&self, texts: &[String]) -> Result<Vec<PgVector>, AppError>;
}
