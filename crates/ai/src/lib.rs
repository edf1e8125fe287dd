// Re-export async_openai types for consumers
pub use async_openai::types::chat::{
  ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
  ChatCompletionRequestUserMessage,
};

mod cosine_similarity;
pub use cosine_similarity::cosine_similarity;

mod embed;
mod embed_many;
mod embed_shared;

mod generate_object;
pub use generate_object::generate_object;

mod generate_text;

pub mod ports;
pub use ports::{CompletionResult, EmbeddingPort, LlmPort};

mod openai;
pub use openai::{NullEmbedder, NullLlm, OpenAiClient};
