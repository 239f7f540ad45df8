//! Error and retry-policy types for the review domain.
//!
//! [`ReviewError`] covers conditions that abort a review run. [`VerdictError`]
//! describes a single reply that could not be read as a verdict; the reviewer
//! records those per requirement and carries on. [`LlmError`] is the error type
//! of the [`crate::LlmProvider`] port, so every provider adapter maps its
//! transport failures onto it.
//!
//! [`RetryPolicy`] is a cross-cutting concern: any error type that participates
//! in retry decisions must be able to produce a [`RetryPolicy`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// - `Retryable` errors: request timeouts, connection failures, rate-limit
///   responses, server-side (5xx) failures.
/// - `NonRetryable` errors: rejected credentials, malformed requests,
///   undecodable responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt. `None` means apply the
        /// caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried.
    NonRetryable,
}

impl RetryPolicy {
    /// Returns `true` for [`RetryPolicy::Retryable`].
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable { .. })
    }
}

// ---------------------------------------------------------------------------
// Provider errors
// ---------------------------------------------------------------------------

/// Failures reported by an [`crate::LlmProvider`].
#[derive(Debug, Error)]
pub enum LlmError {
    /// The provider rejected the credentials (HTTP 401/403).
    #[error("Authentication rejected by provider: {message}")]
    Authentication { message: String },

    /// The provider is throttling requests (HTTP 429).
    #[error("Rate limited by provider")]
    RateLimited {
        /// Delay requested by the provider, if any.
        retry_after: Option<Duration>,
    },

    /// The provider failed internally (HTTP 5xx).
    #[error("Provider server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// The provider rejected the request for another reason (other 4xx).
    #[error("Provider API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        /// Whether the failure was a timeout.
        timed_out: bool,
    },

    /// The provider answered 2xx but the body could not be used.
    #[error("Invalid provider response: {message}")]
    InvalidResponse { message: String },
}

impl LlmError {
    /// Classifies this error for the retry loop.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::RateLimited { retry_after } => RetryPolicy::Retryable {
                after: *retry_after,
            },
            Self::Server { .. } | Self::Transport { .. } => {
                RetryPolicy::Retryable { after: None }
            }
            Self::Authentication { .. } | Self::Api { .. } | Self::InvalidResponse { .. } => {
                RetryPolicy::NonRetryable
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Verdict errors
// ---------------------------------------------------------------------------

/// A model reply that could not be interpreted as a verdict.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerdictError {
    /// The reply is not valid JSON.
    #[error("reply is not valid JSON: {reason}")]
    InvalidJson { reason: String, raw: String },

    /// The reply is JSON but does not match the verdict schema.
    #[error("reply does not match the verdict schema: {reason}")]
    Schema { reason: String, raw: String },
}

impl VerdictError {
    /// Returns the reply text that was rejected.
    pub fn raw(&self) -> &str {
        match self {
            Self::InvalidJson { raw, .. } | Self::Schema { raw, .. } => raw,
        }
    }
}

// ---------------------------------------------------------------------------
// Run-level errors
// ---------------------------------------------------------------------------

/// Errors that abort a review run.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// The provider call for a requirement failed after any retries.
    #[error("LLM call failed for requirement {index} ('{requirement}'): {source}")]
    Provider {
        /// 1-based position of the requirement in the input list.
        index: usize,
        requirement: String,
        #[source]
        source: LlmError,
    },

    /// A single-requirement analysis returned an unusable reply.
    #[error("Unusable verdict for '{requirement}': {source}")]
    Verdict {
        requirement: String,
        #[source]
        source: VerdictError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_carries_retry_after() {
        let err = LlmError::RateLimited {
            retry_after: Some(Duration::from_secs(3)),
        };
        assert_eq!(
            err.retry_policy(),
            RetryPolicy::Retryable {
                after: Some(Duration::from_secs(3))
            }
        );
    }

    #[test]
    fn transient_failures_are_retryable() {
        let server = LlmError::Server {
            status: 503,
            message: "unavailable".into(),
        };
        let timeout = LlmError::Transport {
            message: "timed out".into(),
            timed_out: true,
        };
        assert!(server.retry_policy().is_retryable());
        assert!(timeout.retry_policy().is_retryable());
    }

    #[test]
    fn permanent_failures_are_not_retryable() {
        let auth = LlmError::Authentication {
            message: "bad key".into(),
        };
        let api = LlmError::Api {
            status: 400,
            message: "bad request".into(),
        };
        let invalid = LlmError::InvalidResponse {
            message: "no choices".into(),
        };
        assert_eq!(auth.retry_policy(), RetryPolicy::NonRetryable);
        assert_eq!(api.retry_policy(), RetryPolicy::NonRetryable);
        assert_eq!(invalid.retry_policy(), RetryPolicy::NonRetryable);
    }

    #[test]
    fn verdict_error_exposes_raw_reply() {
        let err = VerdictError::InvalidJson {
            reason: "eof".into(),
            raw: "{\"status\"".into(),
        };
        assert_eq!(err.raw(), "{\"status\"");
    }
}
