// kart/src/presentation.rs

//! What the cart drawer and header badge need from the engine's read model.
//! Visibility belongs here, not in the engine.

use crate::view::CartView;

/// Open/closed state of the slide-out cart drawer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartDrawer {
  open: bool,
}

impl CartDrawer {
  pub fn is_open(&self) -> bool {
    self.open
  }

  pub fn open(&mut self) {
    self.open = true;
  }

  pub fn close(&mut self) {
    self.open = false;
  }

  pub fn toggle(&mut self) {
    self.open = !self.open;
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartSummary {
  /// Header badge: total units across all lines.
  pub item_count: u64,
  pub line_count: usize,
  /// Render the empty-state view. An empty cart is not an error.
  pub is_empty: bool,
  pub is_loading: bool,
  pub has_error: bool,
  pub subtotal: f64,
  pub tax: f64,
  pub total: f64,
}

impl CartSummary {
  pub fn from_view(view: &CartView) -> Self {
    Self {
      item_count: view.lines.iter().map(|line| u64::from(line.quantity)).sum(),
      line_count: view.lines.len(),
      is_empty: view.lines.is_empty(),
      is_loading: view.is_loading,
      has_error: view.error.is_some(),
      subtotal: view.totals.subtotal,
      tax: view.totals.tax,
      total: view.totals.total,
    }
  }

  pub fn formatted_subtotal(&self) -> String {
    format_currency(self.subtotal)
  }

  pub fn formatted_tax(&self) -> String {
    format_currency(self.tax)
  }

  pub fn formatted_total(&self) -> String {
    format_currency(self.total)
  }
}

/// Label for the tax row, e.g. `Tax (6%)`.
pub fn tax_label(tax_rate: f64) -> String {
  let percent = tax_rate * 100.0;
  if (percent - percent.round()).abs() < 1e-9 {
    format!("Tax ({}%)", percent.round() as i64)
  } else {
    format!("Tax ({:.2}%)", percent)
  }
}

/// US dollars, whole units, thousands separators: `42400.0` → `$42,400`.
/// This is the only place amounts get rounded.
pub fn format_currency(amount: f64) -> String {
  if !amount.is_finite() {
    return "$0".to_string();
  }
  let rounded = amount.round();
  let negative = rounded < 0.0;
  let digits = format!("{:.0}", rounded.abs());

  let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, ch) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(ch);
  }

  if negative {
    format!("-${}", grouped)
  } else {
    format!("${}", grouped)
  }
}
