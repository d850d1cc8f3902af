// kart/src/totals.rs

//! Derived cart totals. Never stored, never sent to the server: always a pure
//! function of whichever set of lines the caller holds.

use crate::model::CartLine;

/// Default sales tax applied to the subtotal.
pub const DEFAULT_TAX_RATE: f64 = 0.06;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CartTotals {
  pub subtotal: f64,
  pub tax: f64,
  pub total: f64,
}

impl CartTotals {
  /// `subtotal = Σ price × quantity`, `tax = subtotal × tax_rate`,
  /// `total = subtotal + tax`. No rounding happens here; round at display time.
  pub fn from_lines(lines: &[CartLine], tax_rate: f64) -> Self {
    let subtotal: f64 = lines.iter().map(CartLine::line_total).sum();
    let tax = subtotal * tax_rate;
    Self {
      subtotal,
      tax,
      total: subtotal + tax,
    }
  }

  pub fn zero() -> Self {
    Self::default()
  }
}
