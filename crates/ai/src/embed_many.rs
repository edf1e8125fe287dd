use anyhow::anyhow;
use async_openai::{Client, config::OpenAIConfig, types::embeddings::CreateEmbeddingRequestArgs};
use mnemosyne_shared::{AppError, APP_CONFIG};
use sea_orm::prelude::PgVector;

use crate::embed_shared::process_embedding;

/// Embed multiple texts in a single API call.
///
/// Returns one `PgVector` per input, in the same order.
pub async fn embed_many(
  client: &Client<OpenAIConfig>,
  inputs: &[String],
) -> Result<Vec<PgVector>, AppError> {
  if inputs.is_empty() {
    return Ok(vec![]);
  }

  let request = CreateEmbeddingRequestArgs::default()
    .model(&APP_CONFIG.openai_embedding_model)
    .input(inputs.to_vec())
    .dimensions(APP_CONFIG.embedding_dimensions)
    .build()?;

  let response = client.embeddings().create(request).await?;

  let mut data = response.data;
  data.sort_by_key(|e| e.index);

  if data.len() != inputs.len() {
    return Err(
      anyhow!(
        "embedding count mismatch: expected {}, got {}",
        inputs.len(),
        data.len()
      )
      .into(),
    );
  }

  data
    .into_iter()
    .map(|e| process_embedding(e.embedding).map(PgVector::from))
    .collect()
}
