//! Request-mediation pipeline.
//!
//! This module provides the pieces the gateway composes around the
//! caller-supplied fetch collaborator:
//! - Request validation
//! - TTL response caching with statistics
//! - Sliding-window rate limiting per exchange

mod cache;
mod gateway;
mod rate_limiter;
mod validator;

pub use cache::{CacheStats, ResponseCache};
pub use gateway::{cache_key, FetchError, MarketGateway};
pub use rate_limiter::{RateLimitStatus, SlidingWindowLimiter};
pub use validator::RequestValidator;
