//! Market data gateway models
//!
//! This module contains the core data types for gateway operations:
//! - `request` - Inbound request shapes (RawRequest, ValidatedRequest) and RequestKind
//! - `market` - Upstream result shapes (Ticker, Candle, OrderBook, Trade, MarketInfo)

mod market;
mod request;

pub use market::{
    Candle, MarketInfo, MarketResult, OrderBook, OrderBookLevel, Ticker, Trade, TradeSide,
};
pub use request::{RawRequest, RequestKind, ValidatedRequest};
