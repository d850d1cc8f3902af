// kart/src/engine/outcome.rs

//! Results of cart mutations as seen by the caller.

use crate::model::LineId;

/// How a single mutation ended. Failures have already been surfaced as a
/// notification by the time the caller sees this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
  /// The Cart Store accepted the change and the cache was invalidated.
  Applied,
  /// The change was refused or never reached the server. The cache is untouched.
  Failed { message: String, status: Option<u16> },
}

impl MutationOutcome {
  pub fn is_applied(&self) -> bool {
    matches!(self, MutationOutcome::Applied)
  }

  pub fn failure_message(&self) -> Option<&str> {
    match self {
      MutationOutcome::Applied => None,
      MutationOutcome::Failed { message, .. } => Some(message),
    }
  }
}

/// Per-line result of `clear_cart`. There is no aggregate success or failure:
/// each removal stands on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearReport {
  pub removed: Vec<LineId>,
  pub failed: Vec<(LineId, String)>,
}

impl ClearReport {
  pub fn record(&mut self, id: LineId, outcome: MutationOutcome) {
    match outcome {
      MutationOutcome::Applied => self.removed.push(id),
      MutationOutcome::Failed { message, .. } => self.failed.push((id, message)),
    }
  }

  pub fn requested(&self) -> usize {
    self.removed.len() + self.failed.len()
  }

  /// Every requested removal succeeded.
  pub fn is_complete(&self) -> bool {
    self.failed.is_empty()
  }
}
