use mnemosyne_shared::{AppError, ErrorKind};

use crate::entity_resolver::ResolutionStage;
use crate::ports::EntityCandidate;

/// Domain-specific failure a turn can surface to its caller, distinct from
/// the opaque `AppError` thrown by infrastructure: the orchestrator needs to
/// pattern-match on *why* a turn stopped, not just log a message.
#[derive(Debug)]
pub enum TurnError {
  Ambiguous { mention: String, candidates: Vec<EntityCandidate> },
  Infrastructure(AppError),
}

impl From<AppError> for TurnError {
  fn from(err: AppError) -> Self {
    Self::Infrastructure(err)
  }
}

impl From<TurnError> for AppError {
  fn from(err: TurnError) -> Self {
    match err {
      TurnError::Ambiguous { mention, candidates } => AppError::with_kind(
        ErrorKind::Ambiguous,
        anyhow::anyhow!("\"{mention}\" matches {} known entities and needs disambiguation", candidates.len()),
      ),
      TurnError::Infrastructure(err) => err,
    }
  }
}

/// Whether a resolution stage implies the mention should be taught as a new
/// alias once the resolver returns; kept here since both the resolver and
/// the orchestrator's provenance reporting need the same rule.
#[must_use]
pub const fn learns_alias(stage: ResolutionStage) -> bool {
  !matches!(stage, ResolutionStage::ExactMatch | ResolutionStage::AliasMatch)
}
