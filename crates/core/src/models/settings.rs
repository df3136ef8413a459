use std::time::Duration;

use crate::errors::CoreError;

/// Base address of the wallets API when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8081/v1";

/// Durable storage key under which the bearer token is kept.
pub const DEFAULT_TOKEN_KEY: &str = "token";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`crate::services::api_client::ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Absolute http(s) URL without trailing slash, e.g. `http://localhost:8081/v1`.
    pub base_url: String,
    pub timeout: Duration,
    pub token_key: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            token_key: DEFAULT_TOKEN_KEY.to_string(),
        }
    }
}

impl ClientConfig {
    /// Validated config for a base URL; trailing slashes are dropped.
    pub fn new(base_url: &str) -> Result<Self, CoreError> {
        let config = Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| CoreError::InvalidConfig(format!("base URL {:?}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoreError::InvalidConfig(format!(
                "base URL must use http or https, got {:?}",
                url.scheme()
            )));
        }
        if self.timeout.is_zero() {
            return Err(CoreError::InvalidConfig("timeout must be greater than zero".into()));
        }
        if self.token_key.trim().is_empty() {
            return Err(CoreError::InvalidConfig("token key must not be empty".into()));
        }
        Ok(())
    }

    /// Build an endpoint URL from path segments; each segment is percent-encoded,
    /// so ids containing `/` or `?` cannot escape their position in the path.
    pub fn url_for(&self, segments: &[&str]) -> Result<String, CoreError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| CoreError::InvalidConfig(format!("base URL {:?}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| {
                CoreError::InvalidConfig(format!("base URL {:?} cannot hold a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url.to_string())
    }
}
