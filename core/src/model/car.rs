// kart/src/model/car.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog identifier of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarId(pub i64);

impl fmt::Display for CarId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<i64> for CarId {
  fn from(id: i64) -> Self {
    CarId(id)
  }
}

/// Catalog attributes joined onto a cart line at read time.
///
/// The cart never persists these; the Cart Store denormalizes them from the
/// catalog on every `GET /api/cart`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarSnapshot {
  pub id: CarId,
  pub name: String,
  pub year: i32,
  /// Unit price in the catalog's currency unit.
  pub price: f64,
  pub mileage: u32,
  pub transmission: String,
  #[serde(default)]
  pub image_url: String,
}
