//! Coingate Market Data Gateway
//!
//! Request-mediation layer sitting in front of upstream crypto exchange
//! APIs. The gateway validates requests, avoids redundant network calls
//! for recently-seen queries, and protects upstreams from overuse - the
//! actual data retrieval is a capability the caller supplies per request.
//!
//! # Overview
//!
//! The gateway supports:
//! - Five request kinds: ticker, OHLCV, order book, trades, market listing
//! - TTL response caching with hit/miss statistics and bounded size
//! - Sliding-window rate limiting keyed per exchange
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |    RawRequest    | --> |    Validator     |  (shape, sets, bounds)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          | ValidatedRequest |  (normalized, immutable)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |  ResponseCache   |  (hit: return, done)
//!                          +------------------+
//!                                  | miss
//!                                  v
//!                          +------------------+
//!                          |  SlidingWindow   |  (admission per exchange)
//!                          |     Limiter      |
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    fetch_fn      |  (caller-supplied upstream)
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`MarketGateway`] - Pipeline orchestrator and admin surface
//! - [`GatewayConfig`] - Construction-time settings
//! - [`RawRequest`] / [`ValidatedRequest`] - Inbound request shapes
//! - [`MarketResult`] - Typed result enum, also the cache value type
//! - [`GatewayError`] - Error taxonomy with retry classification

pub mod config;
pub mod errors;
pub mod gateway;
pub mod models;

// Re-export all public types from models
pub use models::{
    Candle, MarketInfo, MarketResult, OrderBook, OrderBookLevel, RawRequest, RequestKind, Ticker,
    Trade, TradeSide, ValidatedRequest,
};

// Re-export gateway types
pub use gateway::{
    cache_key, CacheStats, FetchError, MarketGateway, RateLimitStatus, RequestValidator,
    ResponseCache, SlidingWindowLimiter,
};

// Re-export configuration and errors
pub use config::{GatewayConfig, SUPPORTED_EXCHANGES};
pub use errors::{GatewayError, RetryClass};
