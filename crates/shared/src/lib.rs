mod error;
pub use error::{AppError, ErrorKind};

mod config;
pub use config::{AppConfig, PiiPatternSet, RetrievalStrategy, RetrievalWeights, APP_CONFIG};

mod message;
pub use message::{Message, MessageRole};
