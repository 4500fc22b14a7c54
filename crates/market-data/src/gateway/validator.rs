//! Inbound request validation.
//!
//! Rejects malformed requests before any cache or upstream cost is
//! incurred and produces the normalized [`ValidatedRequest`] every other
//! component operates on:
//! - Symbols must be `BASE/QUOTE` (alphanumeric segments), uppercased
//! - Exchange and timeframe are case-folded against fixed allowed sets
//! - Numeric fields are bounds-checked per request kind, never clamped

use crate::config::SUPPORTED_EXCHANGES;
use crate::errors::GatewayError;
use crate::models::{RawRequest, RequestKind, ValidatedRequest};

/// Candle timeframes accepted for Ohlcv requests, canonical lowercase.
const ALLOWED_TIMEFRAMES: &[&str] = &[
    "1m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "12h", "1d", "1w",
];

/// Default timeframe when an Ohlcv request omits one.
const DEFAULT_TIMEFRAME: &str = "1h";

/// How far in the future a `since` timestamp may lie before it is
/// rejected, to absorb client clock skew.
const CLOCK_SKEW_TOLERANCE_MS: i64 = 60_000;

/// Inclusive bounds and default for a per-kind numeric limit field.
struct LimitBounds {
    min: u32,
    max: u32,
    default: u32,
}

impl RequestKind {
    /// Bounds for this kind's `limit` field, if it has one.
    fn limit_bounds(&self) -> Option<LimitBounds> {
        match self {
            Self::Ohlcv => Some(LimitBounds {
                min: 1,
                max: 1000,
                default: 100,
            }),
            Self::OrderBook => Some(LimitBounds {
                min: 1,
                max: 100,
                default: 20,
            }),
            Self::Trades => Some(LimitBounds {
                min: 1,
                max: 500,
                default: 50,
            }),
            Self::Ticker | Self::Markets => None,
        }
    }

    fn requires_symbol(&self) -> bool {
        !matches!(self, Self::Markets)
    }

    fn accepts_since(&self) -> bool {
        matches!(self, Self::Ohlcv | Self::Trades)
    }
}

/// Request validator.
///
/// Pure over its input: validation neither logs nor mutates shared state.
pub struct RequestValidator {
    default_exchange: String,
}

impl RequestValidator {
    /// Create a validator that falls back to `default_exchange` when a
    /// request names none. The default itself must be a supported
    /// exchange.
    pub fn new(default_exchange: &str) -> Result<Self, GatewayError> {
        let default_exchange = default_exchange.to_lowercase();
        if !SUPPORTED_EXCHANGES.contains(&default_exchange.as_str()) {
            return Err(GatewayError::configuration(format!(
                "default exchange '{}' is not supported",
                default_exchange
            )));
        }

        Ok(Self { default_exchange })
    }

    /// Validate and normalize a raw request for the given kind.
    ///
    /// Fields irrelevant to the kind are ignored (a `timeframe` on a
    /// Ticker request is dropped, not rejected).
    pub fn validate(
        &self,
        raw: &RawRequest,
        kind: RequestKind,
    ) -> Result<ValidatedRequest, GatewayError> {
        let exchange = self.validate_exchange(raw.exchange.as_deref())?;

        let symbol = if kind.requires_symbol() {
            match raw.symbol.as_deref() {
                Some(symbol) => Some(validate_symbol(symbol)?),
                None => {
                    return Err(GatewayError::validation(
                        "symbol",
                        "required, expected BASE/QUOTE (e.g., BTC/USDT)",
                    ))
                }
            }
        } else {
            None
        };

        let timeframe = if kind == RequestKind::Ohlcv {
            Some(validate_timeframe(raw.timeframe.as_deref())?)
        } else {
            None
        };

        let limit = match kind.limit_bounds() {
            Some(bounds) => Some(validate_limit(raw.limit, &bounds)?),
            None => None,
        };

        let since = if kind.accepts_since() {
            raw.since.map(validate_since).transpose()?
        } else {
            None
        };

        let quote_currency = if kind == RequestKind::Markets {
            raw.quote_currency
                .as_deref()
                .map(validate_quote_currency)
                .transpose()?
        } else {
            None
        };

        Ok(ValidatedRequest {
            symbol,
            exchange,
            timeframe,
            limit,
            since,
            quote_currency,
        })
    }

    fn validate_exchange(&self, exchange: Option<&str>) -> Result<String, GatewayError> {
        let exchange = match exchange {
            Some(name) => name.to_lowercase(),
            None => return Ok(self.default_exchange.clone()),
        };

        if SUPPORTED_EXCHANGES.contains(&exchange.as_str()) {
            Ok(exchange)
        } else {
            Err(GatewayError::validation(
                "exchange",
                format!(
                    "'{}' is not supported, allowed: {}",
                    exchange,
                    SUPPORTED_EXCHANGES.join(", ")
                ),
            ))
        }
    }
}

/// Check `BASE/QUOTE` shape and uppercase the pair.
fn validate_symbol(symbol: &str) -> Result<String, GatewayError> {
    let mut parts = symbol.split('/');
    let (base, quote) = match (parts.next(), parts.next(), parts.next()) {
        (Some(base), Some(quote), None) => (base, quote),
        _ => {
            return Err(GatewayError::validation(
                "symbol",
                format!("'{}' must contain exactly one '/', expected BASE/QUOTE", symbol),
            ))
        }
    };

    for segment in [base, quote] {
        if segment.is_empty() || !segment.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(GatewayError::validation(
                "symbol",
                format!(
                    "'{}' segments must be non-empty and alphanumeric, expected BASE/QUOTE",
                    symbol
                ),
            ));
        }
    }

    Ok(format!(
        "{}/{}",
        base.to_ascii_uppercase(),
        quote.to_ascii_uppercase()
    ))
}

/// Case-fold a timeframe against the allowed set, defaulting to 1h.
fn validate_timeframe(timeframe: Option<&str>) -> Result<String, GatewayError> {
    let timeframe = match timeframe {
        Some(tf) => tf.to_lowercase(),
        None => return Ok(DEFAULT_TIMEFRAME.to_string()),
    };

    if ALLOWED_TIMEFRAMES.contains(&timeframe.as_str()) {
        Ok(timeframe)
    } else {
        Err(GatewayError::validation(
            "timeframe",
            format!(
                "'{}' is not valid, allowed: {}",
                timeframe,
                ALLOWED_TIMEFRAMES.join(", ")
            ),
        ))
    }
}

/// Bounds-check a limit, applying the per-kind default when absent.
fn validate_limit(limit: Option<u32>, bounds: &LimitBounds) -> Result<u32, GatewayError> {
    let limit = match limit {
        Some(limit) => limit,
        None => return Ok(bounds.default),
    };

    if limit < bounds.min || limit > bounds.max {
        return Err(GatewayError::validation(
            "limit",
            format!(
                "{} is out of range, must be between {} and {}",
                limit, bounds.min, bounds.max
            ),
        ));
    }

    Ok(limit)
}

/// Reject negative or future `since` timestamps (beyond skew tolerance).
fn validate_since(since: i64) -> Result<i64, GatewayError> {
    if since < 0 {
        return Err(GatewayError::validation(
            "since",
            format!("{} must be a non-negative millisecond timestamp", since),
        ));
    }

    let now_ms = chrono::Utc::now().timestamp_millis();
    if since > now_ms + CLOCK_SKEW_TOLERANCE_MS {
        return Err(GatewayError::validation(
            "since",
            format!("{} is in the future", since),
        ));
    }

    Ok(since)
}

/// Uppercase a quote-currency filter (e.g., "usdt" -> "USDT").
fn validate_quote_currency(currency: &str) -> Result<String, GatewayError> {
    if currency.is_empty() || !currency.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(GatewayError::validation(
            "quote_currency",
            format!("'{}' must be non-empty and alphanumeric", currency),
        ));
    }

    Ok(currency.to_ascii_uppercase())
}
