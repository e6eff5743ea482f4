//! Candle series and the pair aligner.
//!
//! Two independently-sampled OHLC series are aligned onto a common timestamp
//! grid (union of timestamps clipped to the overlapping range) with gaps
//! forward-filled from the latest candle at or before each grid point.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Single OHLCV candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("Timestamps must be strictly increasing (violation at index {0})")]
    NonMonotonicTimestamps(usize),
    #[error("Candle at index {0} has non-finite fields")]
    NonFiniteCandle(usize),
}

/// Ordered candle sequence for one symbol/timeframe.
///
/// Construction enforces strictly increasing, deduplicated timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandleSeries {
    pub symbol: String,
    pub timeframe: String,
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(
        symbol: impl Into<String>,
        timeframe: impl Into<String>,
        candles: Vec<Candle>,
    ) -> Result<Self, SeriesError> {
        for (i, c) in candles.iter().enumerate() {
            if !(c.open.is_finite()
                && c.high.is_finite()
                && c.low.is_finite()
                && c.close.is_finite()
                && c.volume.is_finite())
            {
                return Err(SeriesError::NonFiniteCandle(i));
            }
            if i > 0 && candles[i - 1].timestamp >= c.timestamp {
                return Err(SeriesError::NonMonotonicTimestamps(i));
            }
        }
        Ok(Self {
            symbol: symbol.into(),
            timeframe: timeframe.into(),
            candles,
        })
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Average notional volume (close * volume) over the series.
    pub fn average_notional_volume(&self) -> f64 {
        if self.candles.is_empty() {
            return 0.0;
        }
        let total: f64 = self.candles.iter().map(|c| c.close * c.volume).sum();
        total / self.candles.len() as f64
    }
}

/// Two series on a shared timestamp grid. `x` is the hedge leg (symbol1),
/// `y` is the dependent leg (symbol2).
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    pub timestamps: Vec<DateTime<Utc>>,
    pub x_closes: Vec<f64>,
    pub y_closes: Vec<f64>,
}

impl AlignedPair {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Most recent `n` aligned points (whole pair when shorter).
    pub fn tail(&self, n: usize) -> AlignedPair {
        let start = self.len().saturating_sub(n);
        AlignedPair {
            timestamps: self.timestamps[start..].to_vec(),
            x_closes: self.x_closes[start..].to_vec(),
            y_closes: self.y_closes[start..].to_vec(),
        }
    }
}

/// Align two series onto a common grid, forward-filling gaps.
///
/// The grid is the union of both series' timestamps clipped to the range
/// where both have at least one earlier-or-equal candle to fill from. An
/// empty pair is returned when the ranges do not overlap.
pub fn align_pair(a: &CandleSeries, b: &CandleSeries) -> AlignedPair {
    let empty = AlignedPair {
        timestamps: Vec::new(),
        x_closes: Vec::new(),
        y_closes: Vec::new(),
    };

    let (Some(a_first), Some(b_first)) = (a.candles().first(), b.candles().first()) else {
        return empty;
    };
    let (Some(a_last), Some(b_last)) = (a.last(), b.last()) else {
        return empty;
    };

    let start = a_first.timestamp.max(b_first.timestamp);
    let end = a_last.timestamp.min(b_last.timestamp);
    if start > end {
        return empty;
    }

    // Union grid within the overlap.
    let mut grid: Vec<DateTime<Utc>> = a
        .candles()
        .iter()
        .chain(b.candles().iter())
        .map(|c| c.timestamp)
        .filter(|ts| *ts >= start && *ts <= end)
        .collect();
    grid.sort_unstable();
    grid.dedup();

    let mut x_closes = Vec::with_capacity(grid.len());
    let mut y_closes = Vec::with_capacity(grid.len());
    let mut ai = 0usize;
    let mut bi = 0usize;

    for &ts in &grid {
        // Advance each cursor to the last candle at or before ts.
        while ai + 1 < a.len() && a.candles()[ai + 1].timestamp <= ts {
            ai += 1;
        }
        while bi + 1 < b.len() && b.candles()[bi + 1].timestamp <= ts {
            bi += 1;
        }
        x_closes.push(a.candles()[ai].close);
        y_closes.push(b.candles()[bi].close);
    }

    AlignedPair {
        timestamps: grid,
        x_closes,
        y_closes,
    }
}
