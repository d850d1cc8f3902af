// kart/src/model/cart_line.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use super::car::{CarId, CarSnapshot};

/// Identifier the Cart Store assigns to a line when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub i64);

impl fmt::Display for LineId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<i64> for LineId {
  fn from(id: i64) -> Self {
    LineId(id)
  }
}

/// One row of the cart: a vehicle and how many of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
  pub id: LineId,
  pub car_id: CarId,
  /// Always >= 1 while the line exists.
  pub quantity: u32,
  pub car: CarSnapshot,
}

impl CartLine {
  /// `price × quantity`, unrounded.
  pub fn line_total(&self) -> f64 {
    self.car.price * f64::from(self.quantity)
  }
}

/// Body of `POST /api/cart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartLine {
  pub car_id: CarId,
  pub quantity: u32,
}

impl NewCartLine {
  /// A fresh line always starts at quantity 1.
  pub fn single(car_id: CarId) -> Self {
    Self { car_id, quantity: 1 }
  }
}

/// Body of `PUT /api/cart/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityUpdate {
  pub quantity: u32,
}
