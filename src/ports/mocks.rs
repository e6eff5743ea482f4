//! Hand-rolled port mocks for tests: record calls, serve canned series,
//! and optionally fail specific symbols to exercise error isolation.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::CandleSeries;
use crate::ports::market_data::{CandleDataProvider, MarketDataError};

#[derive(Default)]
pub struct MockCandleProvider {
    series: HashMap<String, CandleSeries>,
    failing: HashSet<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockCandleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to register a canned series for its own symbol.
    pub fn with_series(mut self, series: CandleSeries) -> Self {
        self.series.insert(series.symbol.clone(), series);
        self
    }

    /// Builder method to make a symbol fail with a source error.
    pub fn with_failing_symbol(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }

    /// Symbols fetched so far, in call order.
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CandleDataProvider for MockCandleProvider {
    async fn get_candles(
        &self,
        symbol: &str,
        _timeframe: &str,
        limit: usize,
    ) -> Result<CandleSeries, MarketDataError> {
        self.calls.lock().unwrap().push(symbol.to_string());

        if self.failing.contains(symbol) {
            return Err(MarketDataError::SourceError(format!(
                "injected failure for {symbol}"
            )));
        }

        let series = self
            .series
            .get(symbol)
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))?;

        let candles = series.candles();
        let start = candles.len().saturating_sub(limit);
        CandleSeries::new(
            series.symbol.clone(),
            series.timeframe.clone(),
            candles[start..].to_vec(),
        )
        .map_err(|e| MarketDataError::ParseError(e.to_string()))
    }

    async fn get_candles_between(
        &self,
        symbol: &str,
        timeframe: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<CandleSeries, MarketDataError> {
        let series = self.get_candles(symbol, timeframe, usize::MAX).await?;
        let filtered: Vec<_> = series
            .candles()
            .iter()
            .filter(|c| {
                let ms = c.timestamp.timestamp_millis();
                ms >= start_ms && ms <= end_ms
            })
            .copied()
            .collect();
        CandleSeries::new(series.symbol.clone(), series.timeframe.clone(), filtered)
            .map_err(|e| MarketDataError::ParseError(e.to_string()))
    }

    async fn available_symbols(&self) -> Result<Vec<String>, MarketDataError> {
        let mut symbols: Vec<String> = self.series.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

impl MockCandleProvider {
    /// Convenience: a flat series with the given closes, hourly spacing.
    pub fn series_from_closes(symbol: &str, timeframe: &str, closes: &[f64]) -> CandleSeries {
        use crate::domain::Candle;
        let base = Utc::now().timestamp() - closes.len() as i64 * 3600;
        let candles: Vec<Candle> = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: chrono::DateTime::from_timestamp(base + i as i64 * 3600, 0).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 100.0,
            })
            .collect();
        CandleSeries::new(symbol, timeframe, candles).unwrap()
    }
}
