// kart/src/store/http.rs

//! `CartStore` over the storefront's JSON REST API.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::CartStore;
use crate::config::EngineConfig;
use crate::error::{KartError, KartResult};
use crate::model::{CartLine, LineId, NewCartLine, QuantityUpdate};
use crate::session::SessionContext;

/// Error bodies seen from the storefront API: `{"message": ..}` or `{"error": ..}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
  message: Option<String>,
  error: Option<String>,
}

pub struct HttpCartStore {
  client: Client,
  base_url: String,
}

impl HttpCartStore {
  pub fn new(config: &EngineConfig) -> KartResult<Self> {
    if config.api_base_url.trim().is_empty() {
      return Err(KartError::Config("API base URL not configured".to_string()));
    }

    let client = Client::builder()
      .timeout(config.request_timeout)
      .build()
      .map_err(|e| KartError::Config(format!("Failed to build HTTP client: {}", e)))?;

    Ok(Self {
      client,
      base_url: config.api_base_url.trim_end_matches('/').to_string(),
    })
  }

  pub fn cart_url(&self) -> String {
    format!("{}/api/cart", self.base_url)
  }

  pub fn line_url(&self, id: LineId) -> String {
    format!("{}/api/cart/{}", self.base_url, id)
  }

  fn scoped(&self, request: RequestBuilder, session: &SessionContext) -> RequestBuilder {
    let mut request = request;
    for (name, value) in session.identity_headers() {
      request = request.header(name, value);
    }
    if let Some(token) = &session.bearer_token {
      request = request.bearer_auth(token);
    }
    request
  }

  /// Pulls a human-readable message out of an error response body.
  ///
  /// JSON bodies give their `message` or `error` field. Raw text is only
  /// trusted when it was sent as `text/plain` or with a 4xx status; anything
  /// else (a proxy's HTML error page, say) yields no message.
  fn extract_message(status: StatusCode, content_type: Option<&str>, body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
      return None;
    }
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(trimmed) {
      return parsed.message.or(parsed.error).filter(|m| !m.trim().is_empty());
    }
    let plain_text = content_type.is_some_and(|ct| ct.trim_start().starts_with("text/plain"));
    let markup = trimmed.starts_with('<') || content_type.is_some_and(|ct| ct.contains("html"));
    if plain_text || (status.is_client_error() && !markup) {
      Some(trimmed.chars().take(200).collect())
    } else {
      None
    }
  }

  async fn check(response: Response) -> KartResult<Response> {
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }
    let content_type = response
      .headers()
      .get(CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .map(str::to_string);
    let body = response.text().await.unwrap_or_default();
    warn!(status = %status, body = %body, "Cart store request failed");
    Err(KartError::Rejected {
      status: status.as_u16(),
      message: Self::extract_message(status, content_type.as_deref(), &body),
    })
  }

  async fn json<T: DeserializeOwned>(response: Response) -> KartResult<T> {
    let response = Self::check(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
  }
}

#[async_trait]
impl CartStore for HttpCartStore {
  async fn fetch_lines(&self, session: &SessionContext) -> KartResult<Vec<CartLine>> {
    let response = self
      .scoped(self.client.get(self.cart_url()), session)
      .send()
      .await?;
    let lines: Vec<CartLine> = Self::json(response).await?;
    debug!(line_count = lines.len(), "Fetched cart lines");
    Ok(lines)
  }

  async fn create_line(&self, session: &SessionContext, line: NewCartLine) -> KartResult<CartLine> {
    let response = self
      .scoped(self.client.post(self.cart_url()), session)
      .json(&line)
      .send()
      .await?;
    Self::json(response).await
  }

  async fn update_line(
    &self,
    session: &SessionContext,
    id: LineId,
    update: QuantityUpdate,
  ) -> KartResult<CartLine> {
    let response = self
      .scoped(self.client.put(self.line_url(id)), session)
      .json(&update)
      .send()
      .await?;
    Self::json(response).await
  }

  async fn delete_line(&self, session: &SessionContext, id: LineId) -> KartResult<()> {
    let response = self
      .scoped(self.client.delete(self.line_url(id)), session)
      .send()
      .await?;
    // The acknowledgement body carries nothing the engine needs.
    Self::check(response).await?;
    Ok(())
  }

  fn name(&self) -> &str {
    "http"
  }
}
