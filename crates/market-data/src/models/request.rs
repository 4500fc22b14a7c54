use serde::{Deserialize, Serialize};

/// The kind of market data operation being requested.
///
/// Determines which fields of a [`RawRequest`] are required, which bounds
/// apply to its numeric fields, and which cache TTL is used.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Current price snapshot for a trading pair.
    Ticker,
    /// Historical OHLCV (candlestick) data.
    Ohlcv,
    /// Current order book (market depth).
    OrderBook,
    /// Recent public trades.
    Trades,
    /// Listing of trading pairs available on an exchange.
    Markets,
}

impl RequestKind {
    /// Stable lowercase name, used in cache keys and log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ticker => "ticker",
            Self::Ohlcv => "ohlcv",
            Self::OrderBook => "order_book",
            Self::Trades => "trades",
            Self::Markets => "markets",
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw, unvalidated inbound request.
///
/// Every field is optional at this stage; which ones are required and what
/// values they may hold is decided by the validator for the given
/// [`RequestKind`]. This is the only place raw input exists - everything
/// past the validator operates on [`ValidatedRequest`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawRequest {
    /// Trading pair symbol (e.g., "BTC/USDT").
    pub symbol: Option<String>,

    /// Exchange name; falls back to the configured default when absent.
    pub exchange: Option<String>,

    /// Candle timeframe (e.g., "1m", "1h", "1d"); Ohlcv only.
    pub timeframe: Option<String>,

    /// Row count limit (candles, depth levels, or trades depending on kind).
    pub limit: Option<u32>,

    /// Start timestamp in milliseconds; Ohlcv and Trades only.
    pub since: Option<i64>,

    /// Quote currency filter (e.g., "USDT"); Markets only.
    pub quote_currency: Option<String>,
}

/// Immutable, normalized view of a request that passed validation.
///
/// Symbols are uppercased, exchange and timeframe are canonical lowercase,
/// numeric fields are bounds-checked, and per-kind defaults are filled in.
/// Produced once per request by the validator and consumed by cache-key
/// derivation and the fetch collaborator.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedRequest {
    /// Normalized "BASE/QUOTE" symbol; `None` only for Markets requests.
    pub symbol: Option<String>,

    /// Canonical lowercase exchange name, always present.
    pub exchange: String,

    /// Canonical lowercase timeframe; set for Ohlcv requests.
    pub timeframe: Option<String>,

    /// Bounds-checked limit with the per-kind default applied.
    pub limit: Option<u32>,

    /// Validated start timestamp in milliseconds.
    pub since: Option<i64>,

    /// Uppercased quote currency filter for Markets requests.
    pub quote_currency: Option<String>,
}
