// kart/src/store/memory.rs

//! HashMap-backed Cart Store for tests, demos and offline development.
//!
//! Behaves like the storefront server: lines are joined with the catalog at
//! read time, posting a car that is already in the cart creates a second
//! line, and non-positive quantities are refused. Failures can be injected
//! per line or for the whole store.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

use super::CartStore;
use crate::error::{KartError, KartResult};
use crate::model::{CarId, CarSnapshot, CartLine, LineId, NewCartLine, QuantityUpdate};
use crate::session::SessionContext;

/// A request as the store received it, for asserting on what was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreRequest {
  Fetch,
  Create(NewCartLine),
  Update(LineId, QuantityUpdate),
  Delete(LineId),
}

#[derive(Debug, Clone, Copy)]
struct StoredLine {
  id: LineId,
  car_id: CarId,
  quantity: u32,
}

#[derive(Debug, Default)]
struct MemoryState {
  catalog: HashMap<CarId, CarSnapshot>,
  carts: HashMap<String, Vec<StoredLine>>,
  next_line_id: i64,
  requests: Vec<StoreRequest>,
  offline: bool,
  failing_fetches: usize,
  rejected_lines: HashMap<LineId, String>,
  rejected_cars: HashSet<CarId>,
}

impl MemoryState {
  fn join(&self, stored: &StoredLine) -> KartResult<CartLine> {
    let car = self.catalog.get(&stored.car_id).cloned().ok_or_else(|| {
      KartError::Internal(format!("Cart line {} references unknown car {}", stored.id, stored.car_id))
    })?;
    Ok(CartLine {
      id: stored.id,
      car_id: stored.car_id,
      quantity: stored.quantity,
      car,
    })
  }

  fn ensure_online(&self) -> KartResult<()> {
    if self.offline {
      return Err(KartError::Transport("cart store unreachable".to_string()));
    }
    Ok(())
  }

  fn ensure_line_accepted(&self, id: LineId) -> KartResult<()> {
    match self.rejected_lines.get(&id) {
      Some(message) => Err(KartError::rejected(409, message.clone())),
      None => Ok(()),
    }
  }
}

#[derive(Clone, Default)]
pub struct InMemoryCartStore {
  state: Arc<Mutex<MemoryState>>,
}

impl InMemoryCartStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// A store whose catalog holds `cars`.
  pub fn with_catalog(cars: impl IntoIterator<Item = CarSnapshot>) -> Self {
    let store = Self::new();
    for car in cars {
      store.upsert_car(car);
    }
    store
  }

  pub fn upsert_car(&self, car: CarSnapshot) {
    self.state.lock().catalog.insert(car.id, car);
  }

  /// Changes a catalog price; carts pick it up on their next read.
  pub fn set_price(&self, car_id: CarId, price: f64) {
    if let Some(car) = self.state.lock().catalog.get_mut(&car_id) {
      car.price = price;
    }
  }

  /// Simulates an unreachable server for every operation.
  pub fn set_offline(&self, offline: bool) {
    self.state.lock().offline = offline;
  }

  /// The next `count` fetches answer 503.
  pub fn fail_next_fetches(&self, count: usize) {
    self.state.lock().failing_fetches = count;
  }

  /// Updates and deletes of `id` are refused with `message`.
  pub fn reject_line(&self, id: LineId, message: impl Into<String>) {
    self.state.lock().rejected_lines.insert(id, message.into());
  }

  /// Adds of `car_id` are refused as if the car had just sold.
  pub fn reject_car(&self, car_id: CarId) {
    self.state.lock().rejected_cars.insert(car_id);
  }

  pub fn clear_failures(&self) {
    let mut state = self.state.lock();
    state.offline = false;
    state.failing_fetches = 0;
    state.rejected_lines.clear();
    state.rejected_cars.clear();
  }

  pub fn requests(&self) -> Vec<StoreRequest> {
    self.state.lock().requests.clone()
  }

  pub fn fetch_count(&self) -> usize {
    self
      .state
      .lock()
      .requests
      .iter()
      .filter(|r| matches!(r, StoreRequest::Fetch))
      .count()
  }

  /// Server-side view of a cart, bypassing request logging and failure rules.
  pub fn lines_for(&self, session: &SessionContext) -> Vec<CartLine> {
    let state = self.state.lock();
    let lines: Vec<CartLine> = match state.carts.get(&session.cart_key()) {
      Some(stored) => stored.iter().filter_map(|line| state.join(line).ok()).collect(),
      None => Vec::new(),
    };
    lines
  }

  /// Puts a line straight into a cart, as if another device had added it.
  pub fn seed_line(&self, session: &SessionContext, car_id: CarId, quantity: u32) -> LineId {
    let mut state = self.state.lock();
    state.next_line_id += 1;
    let id = LineId(state.next_line_id);
    state
      .carts
      .entry(session.cart_key())
      .or_default()
      .push(StoredLine { id, car_id, quantity });
    id
  }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
  async fn fetch_lines(&self, session: &SessionContext) -> KartResult<Vec<CartLine>> {
    let mut state = self.state.lock();
    state.requests.push(StoreRequest::Fetch);
    state.ensure_online()?;
    if state.failing_fetches > 0 {
      state.failing_fetches -= 1;
      return Err(KartError::rejected(503, "Service unavailable"));
    }
    let stored = state.carts.get(&session.cart_key()).cloned().unwrap_or_default();
    stored.iter().map(|line| state.join(line)).collect()
  }

  async fn create_line(&self, session: &SessionContext, line: NewCartLine) -> KartResult<CartLine> {
    let mut state = self.state.lock();
    state.requests.push(StoreRequest::Create(line));
    state.ensure_online()?;
    if line.quantity == 0 {
      return Err(KartError::rejected(400, "Quantity must be a positive number."));
    }
    if !state.catalog.contains_key(&line.car_id) {
      return Err(KartError::rejected(404, "Car not found"));
    }
    if state.rejected_cars.contains(&line.car_id) {
      return Err(KartError::rejected(409, "This vehicle is no longer available"));
    }

    state.next_line_id += 1;
    let stored = StoredLine {
      id: LineId(state.next_line_id),
      car_id: line.car_id,
      quantity: line.quantity,
    };
    state.carts.entry(session.cart_key()).or_default().push(stored);
    debug!(line_id = %stored.id, car_id = %stored.car_id, "Created cart line");
    state.join(&stored)
  }

  async fn update_line(
    &self,
    session: &SessionContext,
    id: LineId,
    update: QuantityUpdate,
  ) -> KartResult<CartLine> {
    let mut state = self.state.lock();
    state.requests.push(StoreRequest::Update(id, update));
    state.ensure_online()?;
    state.ensure_line_accepted(id)?;
    if update.quantity == 0 {
      return Err(KartError::rejected(400, "Quantity must be a positive number."));
    }
    let stored = {
      let line = state
        .carts
        .get_mut(&session.cart_key())
        .and_then(|lines| lines.iter_mut().find(|line| line.id == id))
        .ok_or_else(|| KartError::rejected(404, "Cart item not found"))?;
      line.quantity = update.quantity;
      *line
    };
    state.join(&stored)
  }

  async fn delete_line(&self, session: &SessionContext, id: LineId) -> KartResult<()> {
    let mut state = self.state.lock();
    state.requests.push(StoreRequest::Delete(id));
    state.ensure_online()?;
    state.ensure_line_accepted(id)?;
    let lines = state
      .carts
      .get_mut(&session.cart_key())
      .ok_or_else(|| KartError::rejected(404, "Cart item not found"))?;
    let before = lines.len();
    lines.retain(|line| line.id != id);
    if lines.len() == before {
      return Err(KartError::rejected(404, "Cart item not found"));
    }
    Ok(())
  }

  fn name(&self) -> &str {
    "in_memory"
  }
}
