use async_openai::{
  Client,
  config::OpenAIConfig,
  types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestUserMessage,
  },
};
use async_trait::async_trait;
use mnemosyne_shared::{AppError, APP_CONFIG};
use sea_orm::prelude::PgVector;
use tracing::warn;

use crate::generate_object::generate_object_raw;
use crate::generate_text::generate_text;
use crate::ports::{CompletionResult, EmbeddingPort, LlmPort};
use crate::{embed::embed, embed_many::embed_many};

fn chat_messages(system: &str, user: &str) -> Vec<ChatCompletionRequestMessage> {
  vec![
    ChatCompletionRequestSystemMessage::from(system).into(),
    ChatCompletionRequestUserMessage::from(user).into(),
  ]
}

/// `async-openai`-backed implementation of [`LlmPort`] and [`EmbeddingPort`].
/// Mirrors the provider's own API errors: rate limits and connection failures
/// are swallowed into a [`CompletionResult::degraded`] sentinel rather than
/// bubbling up, so the turn orchestrator can fall back gracefully per
/// component contract.
pub struct OpenAiClient {
  client: Client<OpenAIConfig>,
}

impl OpenAiClient {
  #[must_use]
  pub fn new() -> Self {
    let config = OpenAIConfig::new()
      .with_api_key(&APP_CONFIG.openai_api_key)
      .with_api_base(&APP_CONFIG.openai_base_url);
    Self {
      client: Client::with_config(config),
    }
  }
}

impl Default for OpenAiClient {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl LlmPort for OpenAiClient {
  async fn generate_completion(
    &self,
    system: &str,
    user: &str,
  ) -> Result<CompletionResult, AppError> {
    match generate_text(&self.client, chat_messages(system, user)).await {
      Ok(content) => Ok(CompletionResult {
        content,
        tokens_used: 0,
        model: APP_CONFIG.openai_chat_model.clone(),
        cost_usd: 0.0,
        degraded: false,
      }),
      Err(err) => {
        warn!(error = %err, "llm completion degraded");
        Ok(CompletionResult {
          content: String::new(),
          tokens_used: 0,
          model: APP_CONFIG.openai_chat_model.clone(),
          cost_usd: 0.0,
          degraded: true,
        })
      }
    }
  }

  async fn generate_structured(
    &self,
    system: &str,
    user: &str,
    schema_name: &str,
    schema: serde_json::Value,
  ) -> Result<String, AppError> {
    generate_object_raw(
      &self.client,
      chat_messages(system, user),
      schema_name.to_owned(),
      None,
      schema,
    )
    .await
  }
}

#[async_trait]
impl EmbeddingPort for OpenAiClient {
  async fn embed(&self, text: &str) -> Result<PgVector, AppError> {
    embed(&self.client, text).await
  }

  async fn embed_many(&self, texts: &[String]) -> Result<Vec<PgVector>, AppError> {
    embed_many(&self.client, texts).await
  }
}

/// No-op implementation used in unit tests that must not reach the network.
/// `generate_completion` always reports degraded; `embed` returns a
/// deterministic unit vector seeded from the text's length so similarity
/// comparisons in tests remain stable.
#[derive(Default)]
pub struct NullLlm;

#[async_trait]
impl LlmPort for NullLlm {
  async fn generate_completion(
    &self,
    _system: &str,
    _user: &str,
  ) -> Result<CompletionResult, AppError> {
    Ok(CompletionResult {
      degraded: true,
      ..Default::default()
    })
  }

  async fn generate_structured(
    &self,
    _system: &str,
    _user: &str,
    _schema_name: &str,
    _schema: serde_json::Value,
  ) -> Result<String, AppError> {
    Ok("[]".to_owned())
  }
}

#[derive(Default)]
pub struct NullEmbedder;

#[async_trait]
impl EmbeddingPort for NullEmbedder {
  async fn embed(&self, text: &str) -> Result<PgVector, AppError> {
    let dims = APP_CONFIG.embedding_dimensions as usize;
    let mut v = vec![0.0_f32; dims];
    if dims > 0 {
      v[text.len() % dims] = 1.0;
    }
    Ok(PgVector::from(v))
  }

  async fn embed_many(&self, texts: &[String]) -> Result<Vec<PgVector>, AppError> {
    let mut out = Vec::with_capacity(texts.len());
    for t in texts {
      out.push(self.embed(t).await?);
    }
    Ok(out)
  }
}
