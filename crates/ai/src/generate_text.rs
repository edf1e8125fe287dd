use anyhow::anyhow;
use async_openai::{
  Client,
  config::OpenAIConfig,
  types::chat::{ChatCompletionRequestMessage, CreateChatCompletionRequestArgs},
};
use mnemosyne_shared::{AppError, APP_CONFIG};

pub async fn generate_text(
  client: &Client<OpenAIConfig>,
  messages: Vec<ChatCompletionRequestMessage>,
) -> Result<String, AppError> {
  let request = CreateChatCompletionRequestArgs::default()
    .model(&APP_CONFIG.openai_chat_model)
    .messages(messages)
    .build()?;

  client
    .chat()
    .create(request)
    .await
    .map(|r| r.choices.into_iter())?
    .filter_map(|c| c.message.content)
    .next_back()
    .ok_or_else(|| anyhow!("empty message content").into())
}
