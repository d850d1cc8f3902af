// kart/src/session.rs

//! Explicit session context handed to the engine at construction time.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const USER_ID_HEADER: &str = "X-User-ID";
pub const SESSION_ID_HEADER: &str = "X-Session-ID";

/// Who the cart belongs to. Stores use it to scope every request.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionContext {
  pub user_id: Option<String>,
  pub session_id: Option<String>,
  #[serde(skip_serializing)]
  pub bearer_token: Option<String>,
}

impl fmt::Debug for SessionContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SessionContext")
      .field("user_id", &self.user_id)
      .field("session_id", &self.session_id)
      .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
      .finish()
  }
}

impl SessionContext {
  /// A guest cart keyed by a browser session.
  pub fn guest(session_id: impl Into<String>) -> Self {
    Self {
      session_id: Some(session_id.into()),
      ..Self::default()
    }
  }

  /// A cart owned by a signed-in user.
  pub fn user(user_id: impl Into<String>) -> Self {
    Self {
      user_id: Some(user_id.into()),
      ..Self::default()
    }
  }

  pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
    self.bearer_token = Some(token.into());
    self
  }

  /// Stable key partitioning carts: user id wins over session id.
  pub fn cart_key(&self) -> String {
    match (&self.user_id, &self.session_id) {
      (Some(user), _) => format!("user:{}", user),
      (None, Some(session)) => format!("session:{}", session),
      (None, None) => "anonymous".to_string(),
    }
  }

  /// Headers identifying the session on the wire (bearer token excluded).
  pub fn identity_headers(&self) -> Vec<(&'static str, String)> {
    let mut headers = Vec::with_capacity(2);
    if let Some(user) = &self.user_id {
      headers.push((USER_ID_HEADER, user.clone()));
    }
    if let Some(session) = &self.session_id {
      headers.push((SESSION_ID_HEADER, session.clone()));
    }
    headers
  }
}
