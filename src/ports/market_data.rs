//! Candle data provider port.
//!
//! Implementations must return ascending, deduplicated timestamps; gap
//! detection is the caller's concern.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::CandleSeries;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Data source error: {0}")]
    SourceError(String),

    #[error("Data parsing error: {0}")]
    ParseError(String),
}

/// Port for fetching historical candles.
#[async_trait]
pub trait CandleDataProvider: Send + Sync {
    /// Most recent `limit` candles for a symbol, ascending timestamps.
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<CandleSeries, MarketDataError>;

    /// Candles inside a closed millisecond range, ascending timestamps.
    async fn get_candles_between(
        &self,
        symbol: &str,
        timeframe: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<CandleSeries, MarketDataError>;

    /// Symbols this provider can serve.
    async fn available_symbols(&self) -> Result<Vec<String>, MarketDataError>;
}
