// kart/src/view.rs

use crate::error::KartError;
use crate::model::{CarId, CartLine, LineId};
use crate::totals::CartTotals;
use std::sync::Arc;
use std::time::Instant;

/// The read model the rest of the UI consumes.
///
/// `totals` is computed from `lines` when the view is taken, so the two can
/// never disagree, even if the lines themselves are stale relative to the server.
#[derive(Debug, Clone)]
pub struct CartView {
  pub lines: Vec<CartLine>,
  /// A fetch is running and nothing has been fetched yet.
  pub is_loading: bool,
  /// Any fetch is running.
  pub is_fetching: bool,
  /// The last read failure, cleared by the next successful resync.
  pub error: Option<Arc<KartError>>,
  pub totals: CartTotals,
  pub fetched_at: Option<Instant>,
  /// Invalidated by a mutation, or older than the freshness window.
  pub is_stale: bool,
}

impl CartView {
  pub fn subtotal(&self) -> f64 {
    self.totals.subtotal
  }

  pub fn tax(&self) -> f64 {
    self.totals.tax
  }

  pub fn total(&self) -> f64 {
    self.totals.total
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  pub fn line(&self, id: LineId) -> Option<&CartLine> {
    self.lines.iter().find(|line| line.id == id)
  }

  pub fn line_for_car(&self, car_id: CarId) -> Option<&CartLine> {
    self.lines.iter().find(|line| line.car_id == car_id)
  }

  pub fn line_ids(&self) -> Vec<LineId> {
    self.lines.iter().map(|line| line.id).collect()
  }
}
