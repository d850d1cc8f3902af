// kart/src/cache.rs

//! The engine's cached copy of the server-held cart.
//!
//! Only the resync path (`complete_fetch`) ever writes `lines`; mutations may
//! only mark the cache invalid.

use crate::error::KartError;
use crate::model::CartLine;
use crate::totals::CartTotals;
use crate::view::CartView;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct CartCache {
  lines: Vec<CartLine>,
  fetched_at: Option<Instant>,
  invalidated: bool,
  /// Bumped by every `invalidate`.
  generation: u64,
  /// Generation at which the cached lines were requested.
  lines_generation: Option<u64>,
  fetches_in_flight: usize,
  last_error: Option<Arc<KartError>>,
}

impl CartCache {
  pub fn lines(&self) -> &[CartLine] {
    &self.lines
  }

  pub fn has_data(&self) -> bool {
    self.fetched_at.is_some()
  }

  /// Fetched within `stale_time` and not invalidated since.
  pub fn is_fresh(&self, stale_time: Duration) -> bool {
    match self.fetched_at {
      Some(at) => !self.invalidated && at.elapsed() < stale_time,
      None => false,
    }
  }

  pub fn invalidate(&mut self) {
    self.invalidated = true;
    self.generation += 1;
  }

  /// Registers a fetch and returns the generation it started at, to be
  /// handed back to `complete_fetch`.
  pub fn begin_fetch(&mut self) -> u64 {
    self.fetches_in_flight += 1;
    self.generation
  }

  /// Applies a fetch result. Success replaces the whole line set; failure
  /// keeps the previous lines and records the error.
  ///
  /// A response requested before lines already in the cache is dropped. A
  /// response requested before the latest invalidation is applied but the
  /// cache stays stale, so the next read resyncs.
  pub fn complete_fetch(&mut self, started_at: u64, result: Result<Vec<CartLine>, Arc<KartError>>) {
    self.fetches_in_flight = self.fetches_in_flight.saturating_sub(1);
    if self.lines_generation.is_some_and(|current| current > started_at) {
      return;
    }
    match result {
      Ok(lines) => {
        self.lines = lines;
        self.lines_generation = Some(started_at);
        self.fetched_at = Some(Instant::now());
        self.invalidated = started_at != self.generation;
        self.last_error = None;
      }
      Err(err) => {
        self.last_error = Some(err);
      }
    }
  }

  pub fn view(&self, tax_rate: f64, stale_time: Duration) -> CartView {
    CartView {
      lines: self.lines.clone(),
      is_loading: self.fetches_in_flight > 0 && !self.has_data(),
      is_fetching: self.fetches_in_flight > 0,
      error: self.last_error.clone(),
      totals: CartTotals::from_lines(&self.lines, tax_rate),
      fetched_at: self.fetched_at,
      is_stale: !self.is_fresh(stale_time),
    }
  }
}

/// Shared handle to a `CartCache`, cloned into every engine handle.
///
/// IMPORTANT: guards from `read`/`write` are blocking and MUST NOT be held
/// across `.await` points.
#[derive(Debug, Default)]
pub struct SharedCache(Arc<RwLock<CartCache>>);

impl SharedCache {
  pub fn new() -> Self {
    SharedCache(Arc::new(RwLock::new(CartCache::default())))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, CartCache> {
    self.0.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, CartCache> {
    self.0.write()
  }
}

impl Clone for SharedCache {
  fn clone(&self) -> Self {
    SharedCache(Arc::clone(&self.0))
  }
}
