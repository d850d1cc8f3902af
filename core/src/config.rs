// kart/src/config.rs

use crate::error::{KartError, KartResult};
use crate::totals::DEFAULT_TAX_RATE;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// What `add_to_cart` does when the cart already holds a line for the car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddPolicy {
  /// Increment the existing line through `PUT /api/cart/{id}`.
  #[default]
  Merge,
  /// Always `POST /api/cart` and let the Cart Store decide.
  AlwaysCreate,
}

impl FromStr for AddPolicy {
  type Err = KartError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "merge" => Ok(AddPolicy::Merge),
      "always_create" | "always-create" | "create" => Ok(AddPolicy::AlwaysCreate),
      other => Err(KartError::Config(format!("Unknown add policy '{}'", other))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
  /// Base URL of the storefront API; `/api/cart` is appended by the HTTP store.
  pub api_base_url: String,
  pub tax_rate: f64,
  /// How long a fetched cart may be served without a resync.
  pub stale_time: Duration,
  /// Extra attempts for failed reads. Mutations are never retried.
  pub read_retries: usize,
  pub retry_min_delay: Duration,
  pub retry_max_delay: Duration,
  pub request_timeout: Duration,
  pub add_policy: AddPolicy,
  /// Resync right after a successful mutation instead of waiting for the next read.
  pub refetch_on_invalidate: bool,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      api_base_url: "http://127.0.0.1:5000".to_string(),
      tax_rate: DEFAULT_TAX_RATE,
      stale_time: Duration::from_secs(60),
      read_retries: 3,
      retry_min_delay: Duration::from_millis(100),
      retry_max_delay: Duration::from_secs(2),
      request_timeout: Duration::from_secs(30),
      add_policy: AddPolicy::Merge,
      refetch_on_invalidate: true,
    }
  }
}

impl EngineConfig {
  /// Loads configuration from `KART_*` environment variables (and `.env`),
  /// falling back to defaults for anything unset.
  pub fn from_env() -> KartResult<Self> {
    dotenv().ok();

    let defaults = Self::default();
    let get_env = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());

    let api_base_url = get_env("KART_API_BASE_URL").unwrap_or(defaults.api_base_url);
    let tax_rate = match get_env("KART_TAX_RATE") {
      Some(raw) => raw
        .trim()
        .parse::<f64>()
        .map_err(|e| KartError::Config(format!("Invalid KART_TAX_RATE: {}", e)))?,
      None => defaults.tax_rate,
    };
    let stale_time = match get_env("KART_STALE_TIME_SECS") {
      Some(raw) => Duration::from_secs(
        raw
          .trim()
          .parse::<u64>()
          .map_err(|e| KartError::Config(format!("Invalid KART_STALE_TIME_SECS: {}", e)))?,
      ),
      None => defaults.stale_time,
    };
    let read_retries = match get_env("KART_READ_RETRIES") {
      Some(raw) => raw
        .trim()
        .parse::<usize>()
        .map_err(|e| KartError::Config(format!("Invalid KART_READ_RETRIES: {}", e)))?,
      None => defaults.read_retries,
    };
    let request_timeout = match get_env("KART_REQUEST_TIMEOUT_SECS") {
      Some(raw) => Duration::from_secs(
        raw
          .trim()
          .parse::<u64>()
          .map_err(|e| KartError::Config(format!("Invalid KART_REQUEST_TIMEOUT_SECS: {}", e)))?,
      ),
      None => defaults.request_timeout,
    };
    let add_policy = match get_env("KART_ADD_POLICY") {
      Some(raw) => raw.parse::<AddPolicy>()?,
      None => defaults.add_policy,
    };
    let refetch_on_invalidate = match get_env("KART_REFETCH_ON_INVALIDATE") {
      Some(raw) => raw
        .trim()
        .parse::<bool>()
        .map_err(|e| KartError::Config(format!("Invalid KART_REFETCH_ON_INVALIDATE: {}", e)))?,
      None => defaults.refetch_on_invalidate,
    };

    let config = Self {
      api_base_url,
      tax_rate,
      stale_time,
      read_retries,
      retry_min_delay: defaults.retry_min_delay,
      retry_max_delay: defaults.retry_max_delay,
      request_timeout,
      add_policy,
      refetch_on_invalidate,
    };
    config.validate()?;

    tracing::info!(
      api_base_url = %config.api_base_url,
      tax_rate = config.tax_rate,
      stale_time_secs = config.stale_time.as_secs(),
      add_policy = ?config.add_policy,
      "Cart engine configuration loaded."
    );
    Ok(config)
  }

  pub fn validate(&self) -> KartResult<()> {
    if !self.tax_rate.is_finite() || !(0.0..=1.0).contains(&self.tax_rate) {
      return Err(KartError::Config(format!(
        "Tax rate must be between 0 and 1, got {}",
        self.tax_rate
      )));
    }
    if self.api_base_url.trim().is_empty() {
      return Err(KartError::Config("API base URL is empty".to_string()));
    }
    if self.retry_min_delay > self.retry_max_delay {
      return Err(KartError::Config(
        "Retry min delay exceeds retry max delay".to_string(),
      ));
    }
    Ok(())
  }

  pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
    self.api_base_url = url.into();
    self
  }

  pub fn with_tax_rate(mut self, tax_rate: f64) -> Self {
    self.tax_rate = tax_rate;
    self
  }

  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  pub fn with_read_retries(mut self, read_retries: usize) -> Self {
    self.read_retries = read_retries;
    self
  }

  pub fn with_retry_delays(mut self, min: Duration, max: Duration) -> Self {
    self.retry_min_delay = min;
    self.retry_max_delay = max;
    self
  }

  pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
    self.request_timeout = timeout;
    self
  }

  pub fn with_add_policy(mut self, add_policy: AddPolicy) -> Self {
    self.add_policy = add_policy;
    self
  }

  pub fn with_refetch_on_invalidate(mut self, refetch: bool) -> Self {
    self.refetch_on_invalidate = refetch;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  const VARS: &[&str] = &[
    "KART_API_BASE_URL",
    "KART_TAX_RATE",
    "KART_STALE_TIME_SECS",
    "KART_READ_RETRIES",
    "KART_REQUEST_TIMEOUT_SECS",
    "KART_ADD_POLICY",
    "KART_REFETCH_ON_INVALIDATE",
  ];

  fn clear_vars() {
    for var in VARS {
      env::remove_var(var);
    }
  }

  #[test]
  fn defaults_match_storefront_policy() {
    let config = EngineConfig::default();
    assert_eq!(config.tax_rate, 0.06);
    assert_eq!(config.stale_time, Duration::from_secs(60));
    assert_eq!(config.add_policy, AddPolicy::Merge);
    assert!(config.validate().is_ok());
  }

  #[test]
  #[serial]
  fn from_env_reads_overrides() {
    clear_vars();
    env::set_var("KART_API_BASE_URL", "https://cars.example");
    env::set_var("KART_TAX_RATE", "0.0825");
    env::set_var("KART_STALE_TIME_SECS", "15");
    env::set_var("KART_ADD_POLICY", "always_create");
    env::set_var("KART_REFETCH_ON_INVALIDATE", "false");

    let config = EngineConfig::from_env().unwrap();
    assert_eq!(config.api_base_url, "https://cars.example");
    assert_eq!(config.tax_rate, 0.0825);
    assert_eq!(config.stale_time, Duration::from_secs(15));
    assert_eq!(config.add_policy, AddPolicy::AlwaysCreate);
    assert!(!config.refetch_on_invalidate);
    clear_vars();
  }

  #[test]
  #[serial]
  fn from_env_rejects_bad_values() {
    clear_vars();
    env::set_var("KART_TAX_RATE", "six percent");
    assert!(matches!(EngineConfig::from_env(), Err(KartError::Config(_))));

    env::set_var("KART_TAX_RATE", "1.5");
    assert!(matches!(EngineConfig::from_env(), Err(KartError::Config(_))));

    env::remove_var("KART_TAX_RATE");
    env::set_var("KART_ADD_POLICY", "sometimes");
    assert!(matches!(EngineConfig::from_env(), Err(KartError::Config(_))));
    clear_vars();
  }
}
