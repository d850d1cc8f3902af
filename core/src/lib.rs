// kart/src/lib.rs

//! Kart: a client-side cart aggregation engine for a vehicle storefront.
//!
//! The Cart Store on the server owns the cart. Kart keeps a cached view of it
//! and offers:
//!  - Fetching with a freshness window and a small retry budget for reads.
//!  - Add / update quantity / remove / clear, each resyncing from the server
//!    afterwards instead of patching the cache locally.
//!  - Subtotal, tax and total derived from the cached lines on every read.
//!  - User-facing notifications for every failure and for adds and removes.
//!  - A pluggable `CartStore`: HTTP for the real API, in-memory for tests.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod notify;
pub mod presentation;
pub mod session;
pub mod store;
pub mod totals;
pub mod view;

// --- Re-exports for the Public API ---

pub use crate::config::{AddPolicy, EngineConfig};
pub use crate::engine::{CartEngine, ClearReport, MutationOutcome};
pub use crate::error::{KartError, KartResult, GENERIC_ERROR_MESSAGE};
pub use crate::model::{CarId, CarSnapshot, CartLine, LineId, NewCartLine, QuantityUpdate};
pub use crate::notify::{CartAction, Notification, NotificationLog, NotificationVariant, Notifier, TracingNotifier};
pub use crate::presentation::{format_currency, CartDrawer, CartSummary};
pub use crate::session::SessionContext;
pub use crate::store::{CartStore, HttpCartStore, InMemoryCartStore, StoreRequest};
pub use crate::totals::{CartTotals, DEFAULT_TAX_RATE};
pub use crate::view::CartView;

/*
    Typical use:
    1. Build an `EngineConfig` (`EngineConfig::from_env()` or the builder methods).
    2. Describe whose cart it is with a `SessionContext`.
    3. Create a `CartEngine` over a `CartStore` with a `Notifier` the UI drains.
    4. `fetch_cart().await` for the read model; mutate with `add_to_cart`,
       `update_quantity`, `remove_from_cart`, `clear_cart`.
    5. Render `CartSummary::from_view(&engine.view())`.
*/
