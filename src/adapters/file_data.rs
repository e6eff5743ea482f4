//! JSON-file candle data adapter.
//!
//! Serves candles from `<data_dir>/<SYMBOL>_<timeframe>.json` files so the
//! engine can run against local fixtures. Each file is a JSON array of
//! candles in the domain format, ascending timestamps.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{Candle, CandleSeries};
use crate::ports::market_data::{CandleDataProvider, MarketDataError};

pub struct FileCandleProvider {
    data_dir: PathBuf,
}

impl FileCandleProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn path_for(&self, symbol: &str, timeframe: &str) -> PathBuf {
        self.data_dir.join(format!("{symbol}_{timeframe}.json"))
    }

    fn load(&self, symbol: &str, timeframe: &str) -> Result<CandleSeries, MarketDataError> {
        let path = self.path_for(symbol, timeframe);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MarketDataError::SymbolNotFound(symbol.to_string())
            } else {
                MarketDataError::SourceError(format!("{}: {e}", path.display()))
            }
        })?;

        let candles: Vec<Candle> = serde_json::from_str(&content)
            .map_err(|e| MarketDataError::ParseError(format!("{}: {e}", path.display())))?;

        debug!(symbol, timeframe, candles = candles.len(), "Loaded candle file");
        CandleSeries::new(symbol, timeframe, candles)
            .map_err(|e| MarketDataError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl CandleDataProvider for FileCandleProvider {
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<CandleSeries, MarketDataError> {
        let series = self.load(symbol, timeframe)?;
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
        let series = self.load(symbol, timeframe)?;
        let filtered: Vec<Candle> = series
            .candles()
            .iter()
            .filter(|c| {
                let ms = c.timestamp.timestamp_millis();
                ms >= start_ms && ms <= end_ms
            })
            .copied()
            .collect();
        CandleSeries::new(symbol, timeframe, filtered)
            .map_err(|e| MarketDataError::ParseError(e.to_string()))
    }

    /// Symbols are derived from `<SYMBOL>_<timeframe>.json` filenames.
    async fn available_symbols(&self) -> Result<Vec<String>, MarketDataError> {
        let entries = std::fs::read_dir(&self.data_dir)
            .map_err(|e| MarketDataError::SourceError(format!("{}: {e}", self.data_dir.display())))?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| MarketDataError::SourceError(e.to_string()))?;
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(stem) = name.strip_suffix(".json") {
                if let Some((symbol, _timeframe)) = stem.rsplit_once('_') {
                    symbols.push(symbol.to_string());
                }
            }
        }
        symbols.sort();
        symbols.dedup();
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn write_fixture(dir: &TempDir, symbol: &str, closes: &[f64]) {
        let candles: Vec<Candle> = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: Utc.timestamp_opt(1_700_000_000 + i as i64 * 3600, 0).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 10.0,
            })
            .collect();
        let path = dir.path().join(format!("{symbol}_1h.json"));
        std::fs::write(path, serde_json::to_string(&candles).unwrap()).unwrap();
    }

    #[tokio::test]
    async fn test_load_and_limit() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir, "SOL", &[1.0, 2.0, 3.0, 4.0]);

        let provider = FileCandleProvider::new(dir.path());
        let series = provider.get_candles("SOL", "1h", 2).await.unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.candles()[0].close, 3.0);
    }

    #[tokio::test]
    async fn test_missing_symbol() {
        let dir = TempDir::new().unwrap();
        let provider = FileCandleProvider::new(dir.path());
        let result = provider.get_candles("BONK", "1h", 10).await;
        assert!(matches!(result, Err(MarketDataError::SymbolNotFound(_))));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("SOL_1h.json"), "{oops").unwrap();
        let provider = FileCandleProvider::new(dir.path());
        let result = provider.get_candles("SOL", "1h", 10).await;
        assert!(matches!(result, Err(MarketDataError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_between_filters_range() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir, "SOL", &[1.0, 2.0, 3.0, 4.0]);
        let provider = FileCandleProvider::new(dir.path());

        let start_ms = (1_700_000_000 + 3600) * 1000;
        let end_ms = (1_700_000_000 + 2 * 3600) * 1000;
        let series = provider
            .get_candles_between("SOL", "1h", start_ms, end_ms)
            .await
            .unwrap();
        assert_eq!(series.len(), 2);
    }

    #[tokio::test]
    async fn test_available_symbols() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir, "SOL", &[1.0]);
        write_fixture(&dir, "RAY", &[1.0]);
        let provider = FileCandleProvider::new(dir.path());
        assert_eq!(
            provider.available_symbols().await.unwrap(),
            vec!["RAY".to_string(), "SOL".to_string()]
        );
    }
}
