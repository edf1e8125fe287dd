use std::{
  backtrace::{Backtrace, BacktraceStatus},
  fmt::Display,
};

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};

/// Coarse classification of why an [`AppError`] occurred, used by the turn
/// orchestrator to decide how a failure should be surfaced to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Input failed a domain invariant (bad confidence bound, malformed scope, …).
  Domain,
  /// Entity resolution produced more than one plausible candidate.
  Ambiguous,
  /// Referenced memory, entity, or session does not exist.
  NotFound,
  /// An upstream port (LLM, embeddings) failed after retries; the caller degraded
  /// gracefully rather than aborting the turn.
  UpstreamDegraded,
  /// Everything else, including infrastructure failures.
  Unexpected,
}

impl ErrorKind {
  const fn default_status(self) -> StatusCode {
    match self {
      Self::Domain => StatusCode::BAD_REQUEST,
      Self::Ambiguous => StatusCode::UNPROCESSABLE_ENTITY,
      Self::NotFound => StatusCode::NOT_FOUND,
      Self::UpstreamDegraded | Self::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

#[derive(Debug)]
pub struct AppError {
  err: anyhow::Error,
  kind: ErrorKind,
  status_code: StatusCode,
}

impl AppError {
  /// Create with 500 status and `ErrorKind::Unexpected`.
  pub fn new<E: Into<anyhow::Error>>(err: E) -> Self {
    Self {
      err: err.into(),
      kind: ErrorKind::Unexpected,
      status_code: ErrorKind::Unexpected.default_status(),
    }
  }

  /// Create with a specific error kind, deriving its default status code.
  pub fn with_kind<E: Into<anyhow::Error>>(kind: ErrorKind, err: E) -> Self {
    Self {
      err: err.into(),
      kind,
      status_code: kind.default_status(),
    }
  }

  /// Create with custom status
  pub fn with_status<E: Into<anyhow::Error>>(status: StatusCode, err: E) -> Self {
    Self {
      err: err.into(),
      kind: ErrorKind::Unexpected,
      status_code: status,
    }
  }

  #[must_use]
  pub const fn status_code(&self) -> StatusCode {
    self.status_code
  }

  #[must_use]
  pub const fn kind(&self) -> ErrorKind {
    self.kind
  }

  /// Get backtrace from anyhow (requires `RUST_BACKTRACE=1` to capture)
  pub fn backtrace(&self) -> &Backtrace {
    self.err.backtrace()
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let body = if cfg!(debug_assertions) {
      let bt = self.err.backtrace();
      if bt.status() == BacktraceStatus::Captured {
        format!("{}\nBacktrace:\n{}", self.err, bt)
      } else {
        format!(
          "{}\n(hint: set RUST_BACKTRACE=1 to enable backtrace)",
          self.err
        )
      }
    } else {
      self.err.to_string()
    };
    (self.status_code, body).into_response()
  }
}

impl Display for AppError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "[{}] {}", self.status_code, self.err)
  }
}

impl<E> From<E> for AppError
where
  E: Into<anyhow::Error>,
{
  fn from(err: E) -> Self {
    Self::new(err)
  }
}
