//! Gateway configuration.
//!
//! Construction-time settings for the cache, the rate limiter, and the
//! validator. Values are immutable for the lifetime of the gateway; invalid
//! values are rejected at construction, never clamped.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use crate::errors::GatewayError;
use crate::models::RequestKind;

/// Default TTL for cached responses.
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Default maximum number of cached responses.
const DEFAULT_MAX_CACHE_SIZE: usize = 1000;

/// Default admitted requests per window, per exchange.
const DEFAULT_RATE_LIMIT_REQUESTS: usize = 10;

/// Default sliding window duration.
const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Exchanges the gateway will mediate requests for.
pub const SUPPORTED_EXCHANGES: &[&str] = &[
    "binance",
    "coinbase",
    "kraken",
    "bitfinex",
    "bitstamp",
    "gemini",
    "kucoin",
    "okx",
    "bybit",
    "gate",
];

/// Gateway configuration.
///
/// Built with [`Default`] for the standard settings, or [`from_env`]
/// (GatewayConfig::from_env) to pick up the `CACHE_TTL`, `MAX_CACHE_SIZE`,
/// `RATE_LIMIT_REQUESTS`, `RATE_LIMIT_PERIOD` and `DEFAULT_EXCHANGE`
/// environment variables.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// TTL applied to cached responses unless overridden per kind.
    pub cache_ttl: Duration,

    /// Maximum number of live cache entries.
    pub max_cache_size: usize,

    /// Admitted requests per sliding window, per exchange.
    pub rate_limit_max_requests: usize,

    /// Sliding window duration.
    pub rate_limit_window: Duration,

    /// Exchange used when a request does not name one.
    pub default_exchange: String,

    /// Per-kind TTL overrides; kinds not present use `cache_ttl`.
    pub ttl_overrides: HashMap<RequestKind, Duration>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            max_cache_size: DEFAULT_MAX_CACHE_SIZE,
            rate_limit_max_requests: DEFAULT_RATE_LIMIT_REQUESTS,
            rate_limit_window: DEFAULT_RATE_LIMIT_WINDOW,
            default_exchange: "binance".to_string(),
            ttl_overrides: HashMap::new(),
        }
    }
}

impl GatewayConfig {
    /// Build a configuration from environment variables, falling back to
    /// defaults for anything unset. Unparsable values are a
    /// [`GatewayError::Configuration`], not a silent fallback.
    pub fn from_env() -> Result<Self, GatewayError> {
        let mut config = Self::default();

        if let Some(secs) = read_env_u64("CACHE_TTL")? {
            config.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(size) = read_env_u64("MAX_CACHE_SIZE")? {
            config.max_cache_size = size as usize;
        }
        if let Some(max) = read_env_u64("RATE_LIMIT_REQUESTS")? {
            config.rate_limit_max_requests = max as usize;
        }
        if let Some(secs) = read_env_u64("RATE_LIMIT_PERIOD")? {
            config.rate_limit_window = Duration::from_secs(secs);
        }
        if let Ok(exchange) = env::var("DEFAULT_EXCHANGE") {
            config.default_exchange = exchange.to_lowercase();
        }

        Ok(config)
    }

    /// TTL to apply for responses of the given kind.
    pub fn ttl_for(&self, kind: RequestKind) -> Duration {
        self.ttl_overrides
            .get(&kind)
            .copied()
            .unwrap_or(self.cache_ttl)
    }
}

fn read_env_u64(name: &str) -> Result<Option<u64>, GatewayError> {
    match env::var(name) {
        Ok(raw) => raw.parse::<u64>().map(Some).map_err(|_| {
            GatewayError::configuration(format!(
                "{name} must be a non-negative integer, got '{raw}'"
            ))
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Environment variables are process-global; tests that touch them take
    /// this lock so they cannot observe each other's values.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_VARS: &[&str] = &[
        "CACHE_TTL",
        "MAX_CACHE_SIZE",
        "RATE_LIMIT_REQUESTS",
        "RATE_LIMIT_PERIOD",
        "DEFAULT_EXCHANGE",
    ];

    fn clear_env() {
        for name in ENV_VARS {
            env::remove_var(name);
        }
    }

    #[test]
    fn test_from_env_with_nothing_set_matches_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        clear_env();

        let config = GatewayConfig::from_env().unwrap();
        assert_eq!(config.cache_ttl, DEFAULT_CACHE_TTL);
        assert_eq!(config.max_cache_size, DEFAULT_MAX_CACHE_SIZE);
        assert_eq!(config.rate_limit_max_requests, DEFAULT_RATE_LIMIT_REQUESTS);
        assert_eq!(config.rate_limit_window, DEFAULT_RATE_LIMIT_WINDOW);
        assert_eq!(config.default_exchange, "binance");
    }

    #[test]
    fn test_from_env_reads_all_variables() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        clear_env();

        env::set_var("CACHE_TTL", "30");
        env::set_var("MAX_CACHE_SIZE", "250");
        env::set_var("RATE_LIMIT_REQUESTS", "5");
        env::set_var("RATE_LIMIT_PERIOD", "120");
        env::set_var("DEFAULT_EXCHANGE", "Kraken");

        let config = GatewayConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.cache_ttl, Duration::from_secs(30));
        assert_eq!(config.max_cache_size, 250);
        assert_eq!(config.rate_limit_max_requests, 5);
        assert_eq!(config.rate_limit_window, Duration::from_secs(120));
        // Exchange names are normalized to lowercase on the way in.
        assert_eq!(config.default_exchange, "kraken");
    }

    #[test]
    fn test_from_env_rejects_unparsable_number() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        clear_env();

        env::set_var("CACHE_TTL", "sixty");
        let result = GatewayConfig::from_env();
        clear_env();

        let err = result.unwrap_err();
        assert!(matches!(err, GatewayError::Configuration { .. }));
        assert!(err.to_string().contains("CACHE_TTL"));
        assert!(err.to_string().contains("sixty"));
    }

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.max_cache_size, 1000);
        assert_eq!(config.rate_limit_max_requests, 10);
        assert_eq!(config.rate_limit_window, Duration::from_secs(60));
        assert_eq!(config.default_exchange, "binance");
    }

    #[test]
    fn test_ttl_override_per_kind() {
        let mut config = GatewayConfig::default();
        config
            .ttl_overrides
            .insert(RequestKind::Ticker, Duration::from_secs(5));

        assert_eq!(config.ttl_for(RequestKind::Ticker), Duration::from_secs(5));
        assert_eq!(config.ttl_for(RequestKind::Ohlcv), Duration::from_secs(60));
    }

    #[test]
    fn test_supported_exchanges_are_lowercase() {
        for exchange in SUPPORTED_EXCHANGES {
            assert_eq!(*exchange, exchange.to_lowercase());
        }
    }
}
