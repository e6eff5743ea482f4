//! Screened pair candidates.

use serde::{Deserialize, Serialize};

/// A pair that passed every screening gate, with its statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairCandidate {
    pub symbol1: String,
    pub symbol2: String,
    /// Hedge ratio: OLS slope of symbol2 on symbol1.
    pub beta: f64,
    /// Pearson correlation of the aligned closes.
    pub correlation: f64,
    /// Approximate p-value of the ADF stationarity test on the spread.
    pub adf_p_value: f64,
    /// Rescaled-range Hurst exponent, clamped to [0, 1].
    pub hurst_exponent: f64,
    /// Mean-reversion half-life in candles.
    pub half_life: f64,
    /// std(spread) / |mean(spread)|.
    pub coefficient_of_variation: f64,
    /// Composite score in [0, 1].
    pub confidence_score: f64,
}

impl PairCandidate {
    /// Composite confidence: 0.4*(1-adfP) + 0.3*(1-hurst) + 0.3*(1-cv),
    /// clamped to [0, 1].
    pub fn confidence(adf_p: f64, hurst: f64, cv: f64) -> f64 {
        (0.4 * (1.0 - adf_p) + 0.3 * (1.0 - hurst) + 0.3 * (1.0 - cv)).clamp(0.0, 1.0)
    }

    /// Gate invariant every emitted candidate must satisfy.
    pub fn passes_gates(&self) -> bool {
        let abs_corr = self.correlation.abs();
        abs_corr > 0.3
            && abs_corr < 0.9
            && self.adf_p_value < 0.05
            && self.hurst_exponent < 0.5
            && self.half_life > 0.0
            && self.half_life <= 15.0
            && self.coefficient_of_variation < 0.8
    }

    pub fn contains_symbol(&self, symbol: &str) -> bool {
        self.symbol1 == symbol || self.symbol2 == symbol
    }
}
