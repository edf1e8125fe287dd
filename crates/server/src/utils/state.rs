use std::sync::Arc;

use apalis_postgres::PostgresStorage;
use mnemosyne_ai::OpenAiClient;
use mnemosyne_worker::WorkerJob;
use sea_orm::DatabaseConnection;

#[derive(Clone)]
pub struct AppState {
  pub db: DatabaseConnection,
  pub llm: Arc<OpenAiClient>,
  pub job_storage: PostgresStorage<WorkerJob>,
}

impl AppState {
  #[must_use]
  pub fn new(db: DatabaseConnection, job_storage: PostgresStorage<WorkerJob>) -> Self {
    Self {
      db,
      llm: Arc::new(OpenAiClient::new()),
      job_storage,
    }
  }
}
