use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
  User,
  Assistant,
  System,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Message {
  pub role: MessageRole,
  pub content: String,
  pub timestamp: DateTime<Utc>,
}

impl Message {
  #[must_use]
  pub fn is_user(&self) -> bool {
    matches!(self.role, MessageRole::User)
  }

  #[must_use]
  pub fn is_assistant(&self) -> bool {
    matches!(self.role, MessageRole::Assistant)
  }
}
