// kart/src/store/mod.rs

//! The Cart Store seam: the server-authoritative owner of cart lines.

pub mod http;
pub mod memory;

use crate::error::KartResult;
use crate::model::{CartLine, LineId, NewCartLine, QuantityUpdate};
use crate::session::SessionContext;
use async_trait::async_trait;

pub use http::HttpCartStore;
pub use memory::{InMemoryCartStore, StoreRequest};

/// Operations of the cart REST contract.
///
/// Every call is scoped by the session it is made for. Implementations report
/// server refusals as `KartError::Rejected` and carry the server's message.
#[async_trait]
pub trait CartStore: Send + Sync {
  /// `GET /api/cart`: every line of the cart with its car joined in.
  async fn fetch_lines(&self, session: &SessionContext) -> KartResult<Vec<CartLine>>;

  /// `POST /api/cart`.
  async fn create_line(&self, session: &SessionContext, line: NewCartLine) -> KartResult<CartLine>;

  /// `PUT /api/cart/{id}`.
  async fn update_line(
    &self,
    session: &SessionContext,
    id: LineId,
    update: QuantityUpdate,
  ) -> KartResult<CartLine>;

  /// `DELETE /api/cart/{id}`.
  async fn delete_line(&self, session: &SessionContext, id: LineId) -> KartResult<()>;

  fn name(&self) -> &str;
}
