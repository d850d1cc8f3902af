// kart/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Fallback text shown to the user when a failure carries no server message.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

#[derive(Debug, Error)]
pub enum KartError {
  /// The request never reached the Cart Store, or its response never came back.
  #[error("Transport failure talking to the cart store: {0}")]
  Transport(String),

  /// The Cart Store answered with a non-success status.
  #[error("Cart store rejected the request (HTTP {status}): {}", .message.as_deref().unwrap_or("<no message>"))]
  Rejected { status: u16, message: Option<String> },

  #[error("Failed to decode cart store response: {0}")]
  Decode(String),

  #[error("Configuration error: {0}")]
  Config(String),

  /// Failure raised by a user-provided `CartStore` implementation.
  #[error("Cart store error. Source: {source}")]
  Store {
    #[source]
    source: AnyhowError,
  },

  #[error("Internal kart error: {0}")]
  Internal(String),
}

impl KartError {
  /// Builds a rejection, dropping blank messages so the generic fallback applies.
  pub fn rejected(status: u16, message: impl Into<String>) -> Self {
    let message = message.into();
    let trimmed = message.trim();
    KartError::Rejected {
      status,
      message: if trimmed.is_empty() { None } else { Some(trimmed.to_string()) },
    }
  }

  /// Text forwarded verbatim into the error notification.
  ///
  /// Only server rejections carry a human-readable message; transport and
  /// decoding failures surface as the generic fallback.
  pub fn user_message(&self) -> String {
    match self {
      KartError::Rejected {
        message: Some(message), ..
      } => message.clone(),
      _ => GENERIC_ERROR_MESSAGE.to_string(),
    }
  }

  /// Whether the read path may try the request again.
  pub fn is_retryable(&self) -> bool {
    match self {
      KartError::Transport(_) => true,
      KartError::Rejected { status, .. } => *status == 429 || (500..600).contains(status),
      _ => false,
    }
  }

  pub fn status(&self) -> Option<u16> {
    match self {
      KartError::Rejected { status, .. } => Some(*status),
      _ => None,
    }
  }
}

impl From<AnyhowError> for KartError {
  fn from(err: AnyhowError) -> Self {
    // Custom stores may bubble a KartError through anyhow; keep its meaning.
    match err.downcast::<KartError>() {
      Ok(kart_err) => kart_err,
      Err(err) => KartError::Store { source: err },
    }
  }
}

impl From<reqwest::Error> for KartError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      return KartError::Decode(err.to_string());
    }
    if let Some(status) = err.status() {
      return KartError::Rejected {
        status: status.as_u16(),
        message: None,
      };
    }
    KartError::Transport(err.to_string())
  }
}

impl From<serde_json::Error> for KartError {
  fn from(err: serde_json::Error) -> Self {
    KartError::Decode(err.to_string())
  }
}

pub type KartResult<T, E = KartError> = std::result::Result<T, E>;
