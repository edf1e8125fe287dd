use anyhow::anyhow;
use async_openai::{Client, config::OpenAIConfig, types::embeddings::CreateEmbeddingRequestArgs};
use mnemosyne_shared::{AppError, APP_CONFIG};
use sea_orm::prelude::PgVector;

use crate::embed_shared::process_embedding;

pub async fn embed(client: &Client<OpenAIConfig>, input: &str) -> Result<PgVector, AppError> {
  let request = CreateEmbeddingRequestArgs::default()
    .model(&APP_CONFIG.openai_embedding_model)
    .input(input)
    .dimensions(APP_CONFIG.embedding_dimensions)
    .build()?;

  let embedding = client
    .embeddings()
    .create(request)
    .await
    .map(|r| r.data.into_iter())?
    .map(|e| e.embedding)
    .next_back()
    .ok_or_else(|| anyhow!("empty embedding"))?;

  let processed = process_embedding(embedding)?;
  Ok(PgVector::from(processed))
}
