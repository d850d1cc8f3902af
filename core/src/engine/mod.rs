// kart/src/engine/mod.rs

//! The cart aggregation engine.
//!
//! Mutations never patch the cache. They ask the Cart Store to change, mark
//! the cache invalid, and (by default) resync it from the server right away.
//! Derived totals are recomputed from whatever lines the cache holds each
//! time a view is taken.

pub mod outcome;

use backon::{ExponentialBuilder, Retryable};
use futures_util::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{event, instrument, Level};

use crate::cache::SharedCache;
use crate::config::{AddPolicy, EngineConfig};
use crate::error::{KartError, KartResult};
use crate::model::{CarId, LineId, NewCartLine, QuantityUpdate};
use crate::notify::{CartAction, Notification, Notifier};
use crate::session::SessionContext;
use crate::store::{CartStore, HttpCartStore};
use crate::view::CartView;

pub use outcome::{ClearReport, MutationOutcome};

struct EngineInner {
  store: Arc<dyn CartStore>,
  notifier: Arc<dyn Notifier>,
  config: EngineConfig,
  session: SessionContext,
  cache: SharedCache,
  /// Held across the read and write of a merging add.
  merge_lock: Mutex<()>,
}

/// Client-side owner of one session's cart.
///
/// Clones share the same cache, so mutations may be dispatched from several
/// tasks at once. Only merging adds are serialized. A resync that started
/// before a later invalidation never marks the cache fresh.
#[derive(Clone)]
pub struct CartEngine {
  inner: Arc<EngineInner>,
}

impl CartEngine {
  pub fn new(
    store: impl CartStore + 'static,
    notifier: impl Notifier + 'static,
    config: EngineConfig,
    session: SessionContext,
  ) -> KartResult<Self> {
    config.validate()?;
    event!(
      Level::DEBUG,
      store = store.name(),
      cart = %session.cart_key(),
      "Creating cart engine."
    );
    Ok(Self {
      inner: Arc::new(EngineInner {
        store: Arc::new(store),
        notifier: Arc::new(notifier),
        config,
        session,
        cache: SharedCache::new(),
        merge_lock: Mutex::new(()),
      }),
    })
  }

  /// Engine talking to the storefront API at `config.api_base_url`.
  pub fn over_http(
    notifier: impl Notifier + 'static,
    config: EngineConfig,
    session: SessionContext,
  ) -> KartResult<Self> {
    let store = HttpCartStore::new(&config)?;
    Self::new(store, notifier, config, session)
  }

  pub fn config(&self) -> &EngineConfig {
    &self.inner.config
  }

  pub fn session(&self) -> &SessionContext {
    &self.inner.session
  }

  /// Current read model, without any I/O.
  pub fn view(&self) -> CartView {
    self
      .inner
      .cache
      .read()
      .view(self.inner.config.tax_rate, self.inner.config.stale_time)
  }

  /// Returns the cart, serving the cache while it is fresh and resyncing otherwise.
  #[instrument(
    name = "CartEngine::fetch_cart",
    skip_all,
    fields(cart = %self.inner.session.cart_key()),
    err(Display)
  )]
  pub async fn fetch_cart(&self) -> KartResult<CartView, Arc<KartError>> {
    let fresh = self.inner.cache.read().is_fresh(self.inner.config.stale_time);
    if fresh {
      event!(Level::TRACE, "Serving cart from cache.");
      return Ok(self.view());
    }
    self.refresh().await
  }

  /// Discards the cached lines and replaces them with the server's current truth.
  ///
  /// Transport failures and 5xx/429 answers are retried with backoff up to
  /// `read_retries` times. On final failure the previous lines stay cached and
  /// the error is recorded in the view.
  #[instrument(
    name = "CartEngine::refresh",
    skip_all,
    fields(cart = %self.inner.session.cart_key()),
    err(Display)
  )]
  pub async fn refresh(&self) -> KartResult<CartView, Arc<KartError>> {
    let started_at = self.inner.cache.write().begin_fetch();

    let store = &self.inner.store;
    let session = &self.inner.session;
    let result = (|| async { store.fetch_lines(session).await })
      .retry(self.read_backoff())
      .when(KartError::is_retryable)
      .notify(|err: &KartError, dur: Duration| {
        event!(Level::WARN, error = %err, retry_in_ms = dur.as_millis() as u64, "Cart fetch failed, retrying.");
      })
      .await;

    let mut cache = self.inner.cache.write();
    match result {
      Ok(lines) => {
        event!(Level::DEBUG, line_count = lines.len(), "Cart resynced.");
        cache.complete_fetch(started_at, Ok(lines));
        Ok(cache.view(self.inner.config.tax_rate, self.inner.config.stale_time))
      }
      Err(err) => {
        let err = Arc::new(err);
        cache.complete_fetch(started_at, Err(Arc::clone(&err)));
        Err(err)
      }
    }
  }

  /// Puts one more of `car_id` in the cart.
  ///
  /// Under `AddPolicy::Merge` an existing line for the car is incremented;
  /// otherwise a new line with quantity 1 is created. Merging adds on one
  /// engine run one at a time and always read the server's current quantity
  /// first, so concurrent adds of the same car each count.
  #[instrument(
    name = "CartEngine::add_to_cart",
    skip(self),
    fields(cart = %self.inner.session.cart_key(), policy = ?self.inner.config.add_policy)
  )]
  pub async fn add_to_cart(&self, car_id: CarId) -> MutationOutcome {
    let action = CartAction::Add { car_id };
    let store = &self.inner.store;
    let session = &self.inner.session;

    if self.inner.config.add_policy == AddPolicy::AlwaysCreate {
      return self
        .run_mutation(action, async move {
          store.create_line(session, NewCartLine::single(car_id)).await.map(|_| ())
        })
        .await;
    }

    let _merging = self.inner.merge_lock.lock().await;
    let existing = match self.refresh().await {
      Ok(view) => view.line_for_car(car_id).map(|line| (line.id, line.quantity)),
      Err(err) => {
        event!(Level::WARN, error = %err, "Could not read cart before adding; creating a new line.");
        None
      }
    };

    self
      .run_mutation(action, async move {
        match existing {
          Some((line_id, quantity)) => {
            event!(Level::DEBUG, line_id = %line_id, "Car already in cart; incrementing line.");
            let update = QuantityUpdate {
              quantity: quantity.saturating_add(1),
            };
            store.update_line(session, line_id, update).await.map(|_| ())
          }
          None => store
            .create_line(session, NewCartLine::single(car_id))
            .await
            .map(|_| ()),
        }
      })
      .await
  }

  /// Sets a line's quantity. Zero or negative quantities remove the line
  /// instead; a non-positive quantity is never sent to the server.
  #[instrument(
    name = "CartEngine::update_quantity",
    skip(self),
    fields(cart = %self.inner.session.cart_key())
  )]
  pub async fn update_quantity(&self, line_id: LineId, quantity: i64) -> MutationOutcome {
    if quantity <= 0 {
      event!(Level::DEBUG, "Non-positive quantity; removing line instead.");
      return self.remove_from_cart(line_id).await;
    }

    let action = CartAction::UpdateQuantity { line_id, quantity };
    let quantity = match u32::try_from(quantity) {
      Ok(quantity) => quantity,
      Err(_) => {
        let err = KartError::rejected(400, format!("Quantity {} is too large", quantity));
        return self.fail(action, err);
      }
    };

    let store = &self.inner.store;
    let session = &self.inner.session;
    self
      .run_mutation(action, async move {
        store
          .update_line(session, line_id, QuantityUpdate { quantity })
          .await
          .map(|_| ())
      })
      .await
  }

  #[instrument(
    name = "CartEngine::remove_from_cart",
    skip(self),
    fields(cart = %self.inner.session.cart_key())
  )]
  pub async fn remove_from_cart(&self, line_id: LineId) -> MutationOutcome {
    let store = &self.inner.store;
    let session = &self.inner.session;
    self
      .run_mutation(CartAction::Remove { line_id }, async move {
        store.delete_line(session, line_id).await
      })
      .await
  }

  /// Removes every line currently in the cache, one request per line.
  ///
  /// Not atomic. Each removal succeeds or fails on its own and each failure
  /// raises its own notification, so a partial failure leaves a partially
  /// cleared cart.
  #[instrument(
    name = "CartEngine::clear_cart",
    skip_all,
    fields(cart = %self.inner.session.cart_key())
  )]
  pub async fn clear_cart(&self) -> ClearReport {
    let ids: Vec<LineId> = self.inner.cache.read().lines().iter().map(|line| line.id).collect();
    event!(Level::DEBUG, line_count = ids.len(), "Clearing cart.");

    let outcomes = join_all(ids.iter().map(|id| self.remove_from_cart(*id))).await;

    let mut report = ClearReport::default();
    for (id, outcome) in ids.into_iter().zip(outcomes) {
      report.record(id, outcome);
    }
    if !report.is_complete() {
      event!(
        Level::WARN,
        failed = report.failed.len(),
        removed = report.removed.len(),
        "Cart only partially cleared."
      );
    }
    report
  }

  fn read_backoff(&self) -> ExponentialBuilder {
    let config = &self.inner.config;
    ExponentialBuilder::default()
      .with_min_delay(config.retry_min_delay)
      .with_max_delay(config.retry_max_delay)
      .with_max_times(config.read_retries)
      .with_jitter()
  }

  /// Runs one server-side change and surfaces its result.
  ///
  /// Success invalidates the cache, confirms (adds and removes only) and
  /// resyncs. Failure leaves the cache alone and raises an error notification.
  async fn run_mutation<Fut>(&self, action: CartAction, request: Fut) -> MutationOutcome
  where
    Fut: Future<Output = KartResult<()>>,
  {
    match request.await {
      Ok(()) => {
        event!(Level::INFO, action = %action, "Cart mutation applied.");
        self.inner.cache.write().invalidate();
        if let Some(notification) = Notification::success(action) {
          self.inner.notifier.notify(notification);
        }
        if self.inner.config.refetch_on_invalidate {
          // A failed resync is recorded in the view; the mutation itself still succeeded.
          let _ = self.refresh().await;
        }
        MutationOutcome::Applied
      }
      Err(err) => self.fail(action, err),
    }
  }

  fn fail(&self, action: CartAction, err: KartError) -> MutationOutcome {
    event!(Level::WARN, action = %action, error = %err, "Cart mutation failed.");
    let message = err.user_message();
    self
      .inner
      .notifier
      .notify(Notification::failure(action, message.clone()));
    MutationOutcome::Failed {
      message,
      status: err.status(),
    }
  }
}
