//! Error types and retry classification for the market data gateway.
//!
//! This module provides:
//! - [`GatewayError`]: The main error enum for all gateway operations
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while serving a market data request.
///
/// Each variant is classified into a [`RetryClass`] via the
/// [`retry_class`](Self::retry_class) method, which tells the caller
/// whether the failure means "fix your input", "slow down", or
/// "upstream problem".
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The request failed input validation.
    /// The offending field and the violated rule are named so the caller
    /// can correct the input; never retried automatically.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// The field that failed validation
        field: String,
        /// Description of the violated rule, including allowed values or bounds
        message: String,
    },

    /// The sliding window rejected the request for this key.
    /// Carries an estimate of how long until the oldest in-window request
    /// ages out and admission becomes possible again.
    #[error("Rate limit exceeded for {key}, retry after {retry_after:?}")]
    RateLimitExceeded {
        /// The rate limit key (exchange name) that is exhausted
        key: String,
        /// Estimated wait until a slot frees up
        retry_after: Duration,
    },

    /// The fetch collaborator failed.
    /// The gateway wraps the collaborator's error without caching the
    /// failure; the caller decides whether to retry.
    #[error("Upstream fetch failed on {exchange}: {source}")]
    Upstream {
        /// The exchange the fetch targeted
        exchange: String,
        /// The collaborator's error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Invalid construction-time configuration (zero TTL, zero cache size,
    /// zero window). Fatal, surfaced immediately, never silently clamped.
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Description of the invalid setting
        message: String,
    },
}

impl GatewayError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use coingate_market_data::errors::{GatewayError, RetryClass};
    ///
    /// let error = GatewayError::RateLimitExceeded {
    ///     key: "binance".to_string(),
    ///     retry_after: Duration::from_secs(12),
    /// };
    /// assert_eq!(error.retry_class(), RetryClass::AfterWait);
    ///
    /// let error = GatewayError::Validation {
    ///     field: "symbol".to_string(),
    ///     message: "expected BASE/QUOTE".to_string(),
    /// };
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::Validation { .. } | Self::Configuration { .. } => RetryClass::Never,
            Self::RateLimitExceeded { .. } => RetryClass::AfterWait,
            Self::Upstream { .. } => RetryClass::CallerDecides,
        }
    }

    /// Convenience constructor for validation failures.
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for configuration failures.
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_never_retries() {
        let error = GatewayError::validation("symbol", "expected BASE/QUOTE");
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_configuration_never_retries() {
        let error = GatewayError::configuration("cache max_size must be positive");
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_rate_limit_retries_after_wait() {
        let error = GatewayError::RateLimitExceeded {
            key: "binance".to_string(),
            retry_after: Duration::from_secs(30),
        };
        assert_eq!(error.retry_class(), RetryClass::AfterWait);
    }

    #[test]
    fn test_upstream_is_caller_decides() {
        let error = GatewayError::Upstream {
            exchange: "kraken".to_string(),
            source: "connection reset".into(),
        };
        assert_eq!(error.retry_class(), RetryClass::CallerDecides);
    }

    #[test]
    fn test_error_display() {
        let error = GatewayError::validation("timeframe", "got '7h', allowed: 1m, 5m, 1h");
        assert_eq!(
            format!("{}", error),
            "Invalid timeframe: got '7h', allowed: 1m, 5m, 1h"
        );

        let error = GatewayError::Upstream {
            exchange: "binance".to_string(),
            source: "timeout".into(),
        };
        assert_eq!(
            format!("{}", error),
            "Upstream fetch failed on binance: timeout"
        );
    }
}
