use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current price snapshot for a trading pair on one exchange.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    /// Normalized "BASE/QUOTE" symbol
    pub symbol: String,

    /// Exchange the snapshot came from
    pub exchange: String,

    /// Timestamp of the snapshot
    pub timestamp: DateTime<Utc>,

    /// Last traded price
    pub last: Decimal,

    /// Best bid (optional - not all exchanges report it)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid: Option<Decimal>,

    /// Best ask
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ask: Option<Decimal>,

    /// 24h high
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,

    /// 24h low
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,

    /// 24h base volume
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,

    /// 24h quote volume
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_volume: Option<Decimal>,

    /// 24h absolute price change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<Decimal>,

    /// 24h percentage price change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Decimal>,
}

/// One OHLCV candlestick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Candle open time
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// One price level of an order book side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderBookLevel {
    pub price: Decimal,
    pub amount: Decimal,
}

/// Order book (market depth) snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    pub symbol: String,
    pub exchange: String,
    pub timestamp: DateTime<Utc>,
    /// Bids, best (highest) price first
    pub bids: Vec<OrderBookLevel>,
    /// Asks, best (lowest) price first
    pub asks: Vec<OrderBookLevel>,
}

/// Taker side of a public trade.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// One public trade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Exchange-assigned trade id, when the exchange provides one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<TradeSide>,
    pub price: Decimal,
    pub amount: Decimal,
}

/// A trading pair listed on an exchange.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketInfo {
    /// "BASE/QUOTE" symbol
    pub symbol: String,
    pub base: String,
    pub quote: String,
    /// Whether the pair is currently tradable
    pub active: bool,
}

/// The result of one gateway operation.
///
/// This is the value type stored in the response cache: one enum over the
/// concrete result shapes, so heterogeneous operations share a single cache
/// without giving up type safety.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketResult {
    Ticker(Ticker),
    Candles(Vec<Candle>),
    OrderBook(OrderBook),
    Trades(Vec<Trade>),
    Markets(Vec<MarketInfo>),
}

impl MarketResult {
    /// The kind name of the wrapped result, for logging.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Ticker(_) => "ticker",
            Self::Candles(_) => "ohlcv",
            Self::OrderBook(_) => "order_book",
            Self::Trades(_) => "trades",
            Self::Markets(_) => "markets",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ticker_serialization_omits_absent_fields() {
        let ticker = Ticker {
            symbol: "BTC/USDT".to_string(),
            exchange: "binance".to_string(),
            timestamp: Utc::now(),
            last: dec!(50000),
            bid: None,
            ask: None,
            high: None,
            low: None,
            volume: Some(dec!(1234.5)),
            quote_volume: None,
            change: None,
            percentage: None,
        };

        let json = serde_json::to_value(&ticker).unwrap();
        assert_eq!(json["symbol"], "BTC/USDT");
        assert!(json.get("bid").is_none());
        assert!(json.get("volume").is_some());
    }

    #[test]
    fn test_trade_side_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TradeSide::Buy).unwrap(),
            "\"buy\""
        );
    }

    #[test]
    fn test_market_result_kind_names_match_request_kinds() {
        let markets = MarketResult::Markets(vec![MarketInfo {
            symbol: "ETH/BTC".to_string(),
            base: "ETH".to_string(),
            quote: "BTC".to_string(),
            active: true,
        }]);
        assert_eq!(markets.kind_name(), "markets");

        let candles = MarketResult::Candles(vec![Candle {
            timestamp: Utc::now(),
            open: dec!(100),
            high: dec!(110),
            low: dec!(95),
            close: dec!(105),
            volume: dec!(1000),
        }]);
        assert_eq!(candles.kind_name(), "ohlcv");
    }
}
