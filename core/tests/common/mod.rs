// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper.

use async_trait::async_trait;
use kart::{
  CarId, CarSnapshot, CartEngine, CartLine, CartStore, EngineConfig, InMemoryCartStore, KartResult, LineId,
  NewCartLine, NotificationLog, QuantityUpdate, SessionContext,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

pub const ROADSTER: CarId = CarId(1);
pub const FAMILY_SUV: CarId = CarId(2);
pub const CITY_HATCH: CarId = CarId(3);
/// Not in the catalog.
pub const PHANTOM_CAR: CarId = CarId(999);

pub fn car(id: CarId, name: &str, year: i32, price: f64) -> CarSnapshot {
  CarSnapshot {
    id,
    name: name.to_string(),
    year,
    price,
    mileage: 12_000,
    transmission: "Automatic".to_string(),
    image_url: format!("https://img.example/cars/{}.jpg", id),
  }
}

pub fn catalog() -> Vec<CarSnapshot> {
  vec![
    car(ROADSTER, "Roadster GT", 2021, 20_000.0),
    car(FAMILY_SUV, "Family SUV", 2019, 35_500.5),
    car(CITY_HATCH, "City Hatch", 2022, 15_999.99),
  ]
}

pub fn session() -> SessionContext {
  SessionContext::guest("test-session")
}

/// Defaults with retry delays short enough for tests.
pub fn test_config() -> EngineConfig {
  EngineConfig::default().with_retry_delays(Duration::from_millis(1), Duration::from_millis(5))
}

pub struct Harness {
  pub engine: CartEngine,
  pub store: InMemoryCartStore,
  pub notifications: NotificationLog,
  pub session: SessionContext,
}

pub fn harness() -> Harness {
  harness_with(test_config())
}

pub fn harness_with(config: EngineConfig) -> Harness {
  setup_tracing();
  let store = InMemoryCartStore::with_catalog(catalog());
  let notifications = NotificationLog::new();
  let session = session();
  let engine = CartEngine::new(store.clone(), notifications.clone(), config, session.clone())
    .expect("test config is valid");
  Harness {
    engine,
    store,
    notifications,
    session,
  }
}

/// Wraps the in-memory store with artificial latency.
///
/// Writes sleep before reaching the store. Fetches read the store first and
/// then sleep, so a delayed fetch answers with what the cart looked like when
/// it was requested.
#[derive(Clone)]
pub struct LaggyStore {
  inner: InMemoryCartStore,
  write_delay: Duration,
  fetch_delays: Arc<Mutex<VecDeque<Duration>>>,
}

impl LaggyStore {
  pub fn new(inner: InMemoryCartStore, write_delay: Duration) -> Self {
    Self {
      inner,
      write_delay,
      fetch_delays: Arc::new(Mutex::new(VecDeque::new())),
    }
  }

  /// The next fetches answer after these delays, in order.
  pub fn delay_next_fetches(&self, delays: impl IntoIterator<Item = Duration>) {
    self.fetch_delays.lock().extend(delays);
  }

  async fn lag(delay: Duration) {
    if !delay.is_zero() {
      tokio::time::sleep(delay).await;
    }
  }
}

#[async_trait]
impl CartStore for LaggyStore {
  async fn fetch_lines(&self, session: &SessionContext) -> KartResult<Vec<CartLine>> {
    let result = self.inner.fetch_lines(session).await;
    let delay = self.fetch_delays.lock().pop_front().unwrap_or_default();
    Self::lag(delay).await;
    result
  }

  async fn create_line(&self, session: &SessionContext, line: NewCartLine) -> KartResult<CartLine> {
    Self::lag(self.write_delay).await;
    self.inner.create_line(session, line).await
  }

  async fn update_line(
    &self,
    session: &SessionContext,
    id: LineId,
    update: QuantityUpdate,
  ) -> KartResult<CartLine> {
    Self::lag(self.write_delay).await;
    self.inner.update_line(session, id, update).await
  }

  async fn delete_line(&self, session: &SessionContext, id: LineId) -> KartResult<()> {
    Self::lag(self.write_delay).await;
    self.inner.delete_line(session, id).await
  }

  fn name(&self) -> &str {
    "laggy"
  }
}

/// Harness whose engine talks to the store through a `LaggyStore`.
pub fn laggy_harness(write_delay: Duration) -> (Harness, LaggyStore) {
  setup_tracing();
  let store = InMemoryCartStore::with_catalog(catalog());
  let laggy = LaggyStore::new(store.clone(), write_delay);
  let notifications = NotificationLog::new();
  let session = session();
  let engine = CartEngine::new(laggy.clone(), notifications.clone(), test_config(), session.clone())
    .expect("test config is valid");
  let harness = Harness {
    engine,
    store,
    notifications,
    session,
  };
  (harness, laggy)
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
