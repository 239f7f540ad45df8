//! Provider configuration.

use std::time::Duration;

use review::ModelName;

/// Default chat-completions endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model for requirement analysis.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// A provider API key.
///
/// Custom `Debug` implementation redacts the key to prevent credential
/// leakage in log output.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a key, trimming surrounding whitespace (key files usually end in
    /// a newline). Returns `None` if nothing remains.
    pub fn new(key: impl AsRef<str>) -> Option<Self> {
        let trimmed = key.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Returns the raw key for use in an `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Connection and retry settings for [`crate::OpenAiProvider`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Endpoint root; `/chat/completions` is appended.
    pub base_url: String,
    pub api_key: ApiKey,
    pub model: ModelName,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Additional attempts after the first for retryable failures.
    pub max_retries: u32,
    /// Delay before the first retry; doubled on each subsequent retry.
    pub initial_backoff: Duration,
}

impl OpenAiConfig {
    /// Creates a configuration with default endpoint, timeout and retry
    /// settings.
    pub fn new(api_key: ApiKey, model: ModelName) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model,
            timeout: Duration::from_secs(120),
            max_retries: 2,
            initial_backoff: Duration::from_secs(1),
        }
    }

    /// Overrides the endpoint root (e.g. a proxy or a local mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the retry settings.
    pub fn with_retries(mut self, max_retries: u32, initial_backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.initial_backoff = initial_backoff;
        self
    }

    /// Overrides the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of the chat-completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Back-off before retry number `retry` (0-based).
    pub(crate) fn backoff_for(&self, retry: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(retry))
    }
}
