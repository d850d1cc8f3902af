// kart/src/notify.rs

//! User-visible notifications raised by cart mutations.
//!
//! Successful adds and removes confirm; quantity updates stay quiet on
//! success; every failure raises a dismissible destructive notification
//! naming the attempted action.

use crate::model::{CarId, LineId};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{event, Level};

/// The cart operation a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartAction {
  Add { car_id: CarId },
  UpdateQuantity { line_id: LineId, quantity: i64 },
  Remove { line_id: LineId },
}

impl CartAction {
  pub fn success_title(&self) -> Option<&'static str> {
    match self {
      CartAction::Add { .. } => Some("Added to cart"),
      CartAction::UpdateQuantity { .. } => None,
      CartAction::Remove { .. } => Some("Removed from cart"),
    }
  }

  pub fn success_description(&self) -> &'static str {
    match self {
      CartAction::Add { .. } => "The item has been added to your cart",
      CartAction::UpdateQuantity { .. } => "The cart has been updated",
      CartAction::Remove { .. } => "The item has been removed from your cart",
    }
  }

  pub fn error_title(&self) -> &'static str {
    match self {
      CartAction::Add { .. } => "Error adding to cart",
      CartAction::UpdateQuantity { .. } => "Error updating cart",
      CartAction::Remove { .. } => "Error removing from cart",
    }
  }
}

impl fmt::Display for CartAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CartAction::Add { car_id } => write!(f, "add car {}", car_id),
      CartAction::UpdateQuantity { line_id, quantity } => {
        write!(f, "set line {} quantity to {}", line_id, quantity)
      }
      CartAction::Remove { line_id } => write!(f, "remove line {}", line_id),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationVariant {
  Default,
  Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  pub title: String,
  pub description: String,
  pub variant: NotificationVariant,
  pub action: CartAction,
}

impl Notification {
  pub fn success(action: CartAction) -> Option<Self> {
    action.success_title().map(|title| Notification {
      title: title.to_string(),
      description: action.success_description().to_string(),
      variant: NotificationVariant::Default,
      action,
    })
  }

  pub fn failure(action: CartAction, message: impl Into<String>) -> Self {
    Notification {
      title: action.error_title().to_string(),
      description: message.into(),
      variant: NotificationVariant::Destructive,
      action,
    }
  }

  pub fn is_error(&self) -> bool {
    self.variant == NotificationVariant::Destructive
  }
}

/// Sink for notifications. Called from async contexts, so it must not block.
pub trait Notifier: Send + Sync {
  fn notify(&self, notification: Notification);
}

/// Emits every notification as a tracing event and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
  fn notify(&self, notification: Notification) {
    match notification.variant {
      NotificationVariant::Default => event!(
        Level::INFO,
        action = %notification.action,
        title = %notification.title,
        "{}",
        notification.description
      ),
      NotificationVariant::Destructive => event!(
        Level::WARN,
        action = %notification.action,
        title = %notification.title,
        "{}",
        notification.description
      ),
    }
  }
}

/// In-memory queue of notifications a presentation layer can render and dismiss.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
  entries: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationLog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn snapshot(&self) -> Vec<Notification> {
    self.entries.lock().clone()
  }

  pub fn errors(&self) -> Vec<Notification> {
    self.entries.lock().iter().filter(|n| n.is_error()).cloned().collect()
  }

  pub fn len(&self) -> usize {
    self.entries.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.lock().is_empty()
  }

  /// Removes the notification at `index`, as when the user closes it.
  pub fn dismiss(&self, index: usize) -> Option<Notification> {
    let mut entries = self.entries.lock();
    if index < entries.len() {
      Some(entries.remove(index))
    } else {
      None
    }
  }

  pub fn drain(&self) -> Vec<Notification> {
    std::mem::take(&mut *self.entries.lock())
  }
}

impl Notifier for NotificationLog {
  fn notify(&self, notification: Notification) {
    self.entries.lock().push(notification);
  }
}
