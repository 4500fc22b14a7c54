//! Market data gateway: the request-mediation pipeline.
//!
//! Composes the validator, the response cache, and the sliding-window
//! limiter around a caller-supplied fetch collaborator:
//! validate -> cache lookup -> (on miss) admission -> fetch -> store.
//! A cache hit never touches the rate limiter; a failed fetch is never
//! cached.

use std::future::Future;

use log::{debug, info, warn};

use super::cache::{CacheStats, ResponseCache};
use super::rate_limiter::{RateLimitStatus, SlidingWindowLimiter};
use super::validator::RequestValidator;
use crate::config::GatewayConfig;
use crate::errors::GatewayError;
use crate::models::{MarketResult, RawRequest, RequestKind, ValidatedRequest};

/// Error type the fetch collaborator may return; the gateway wraps it
/// into [`GatewayError::Upstream`] without inspecting it.
pub type FetchError = Box<dyn std::error::Error + Send + Sync>;

/// Request-mediation gateway in front of upstream exchange APIs.
///
/// Owns the validator, cache, and rate limiter; the upstream fetch itself
/// is a capability supplied per call, so the gateway never performs
/// network I/O of its own. One instance is meant to live as long as the
/// embedding server.
pub struct MarketGateway {
    config: GatewayConfig,
    validator: RequestValidator,
    cache: ResponseCache<MarketResult>,
    limiter: SlidingWindowLimiter,
}

impl MarketGateway {
    /// Build a gateway from configuration.
    ///
    /// Propagates [`GatewayError::Configuration`] from any component;
    /// nothing is clamped.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let validator = RequestValidator::new(&config.default_exchange)?;
        let cache = ResponseCache::new(config.max_cache_size, config.cache_ttl)?;
        let limiter =
            SlidingWindowLimiter::new(config.rate_limit_max_requests, config.rate_limit_window)?;

        info!(
            "Market gateway initialized: default_exchange={}, cache_ttl={:?}",
            config.default_exchange, config.cache_ttl
        );

        Ok(Self {
            config,
            validator,
            cache,
            limiter,
        })
    }

    /// Serve one request through the mediation pipeline.
    ///
    /// 1. Validate the raw input; a validation failure touches neither
    ///    cache nor limiter.
    /// 2. Look up the cache; a hit is returned without consulting the
    ///    limiter.
    /// 3. On a miss, ask the limiter for admission keyed by the target
    ///    exchange; rejection carries an estimated `retry_after`.
    /// 4. Invoke `fetch_fn` with the validated request; any failure is
    ///    wrapped as [`GatewayError::Upstream`] and not cached.
    /// 5. Store the result under the kind's TTL and return it.
    ///
    /// Concurrent misses for the same key may each reach the upstream;
    /// the limiter bounds how many do.
    pub async fn serve<F, Fut>(
        &self,
        raw: &RawRequest,
        kind: RequestKind,
        fetch_fn: F,
    ) -> Result<MarketResult, GatewayError>
    where
        F: FnOnce(ValidatedRequest) -> Fut,
        Fut: Future<Output = Result<MarketResult, FetchError>>,
    {
        let validated = self.validator.validate(raw, kind)?;
        let key = cache_key(kind, &validated);

        if let Some(value) = self.cache.get(&key) {
            return Ok(value);
        }

        if !self.limiter.allow(&validated.exchange) {
            let retry_after = self.limiter.retry_after(&validated.exchange);
            warn!(
                "Rejecting {} request for '{}': rate limit exhausted, retry after {:?}",
                kind, validated.exchange, retry_after
            );
            return Err(GatewayError::RateLimitExceeded {
                key: validated.exchange,
                retry_after,
            });
        }

        let exchange = validated.exchange.clone();
        debug!("Fetching {} from '{}' for key '{}'", kind, exchange, key);

        let value = fetch_fn(validated)
            .await
            .map_err(|source| GatewayError::Upstream {
                exchange: exchange.clone(),
                source,
            })?;

        self.cache
            .put_with_ttl(key, value.clone(), self.config.ttl_for(kind));

        Ok(value)
    }

    /// Current cache statistics, for observability endpoints.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop all cached responses, returning the statistics afterwards.
    /// Cumulative hit/miss counters survive the clear.
    pub fn clear_cache(&self) -> CacheStats {
        self.cache.clear();
        self.cache.stats()
    }

    /// Invalidate one cached response by its derived key.
    pub fn invalidate(&self, key: &str) {
        self.cache.invalidate(key);
    }

    /// Rate limit standing for one exchange key.
    pub fn rate_limit_status(&self, key: &str) -> RateLimitStatus {
        self.limiter.status(key)
    }

    /// Clear the recorded request window for one exchange key.
    pub fn reset_rate_limit(&self, key: &str) {
        self.limiter.reset(key);
    }

    /// The configuration this gateway was built with.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Derive the cache key for a validated request.
///
/// The encoding is deterministic: kind and exchange first, then the
/// kind-relevant fields in a fixed canonical order, so two logically
/// identical requests map to the same key regardless of how the original
/// input was ordered.
pub fn cache_key(kind: RequestKind, request: &ValidatedRequest) -> String {
    let mut key = format!("{}:{}", kind.as_str(), request.exchange);

    if let Some(symbol) = &request.symbol {
        key.push_str(":symbol=");
        key.push_str(symbol);
    }
    if let Some(timeframe) = &request.timeframe {
        key.push_str(":timeframe=");
        key.push_str(timeframe);
    }
    if let Some(limit) = request.limit {
        key.push_str(":limit=");
        key.push_str(&limit.to_string());
    }
    if let Some(since) = request.since {
        key.push_str(":since=");
        key.push_str(&since.to_string());
    }
    if let Some(quote_currency) = &request.quote_currency {
        key.push_str(":quote=");
        key.push_str(quote_currency);
    }

    key
}
