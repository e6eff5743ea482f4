//! Pair screening: scan a symbol universe for cointegrated, mean-reverting
//! pairs and rank them by composite confidence.
//!
//! Pair evaluation reads only its two aligned series, so the O(n²) loop is
//! embarrassingly parallel; the shipped loop is sequential and deterministic
//! (symbols visited in sorted order) so identical input yields identical
//! ranked output.

pub mod cache;

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::domain::{align_pair, CandleSeries, PairCandidate};
use crate::errors::AnalysisError;
use crate::stats;

/// Screening thresholds fixed by the strategy design.
const MIN_ABS_CORRELATION: f64 = 0.3;
const MAX_ABS_CORRELATION: f64 = 0.9;
const MAX_ADF_P_VALUE: f64 = 0.05;
const MAX_HURST: f64 = 0.5;
const MAX_HALF_LIFE: f64 = 15.0;
const MAX_COEF_OF_VARIATION: f64 = 0.8;

#[derive(Debug, Clone)]
pub struct ScreenerConfig {
    /// Symbols with fewer candles are dropped up front.
    pub min_data_points: usize,
    /// Most recent aligned points used for pair statistics.
    pub lookback: usize,
    /// Minimum average notional volume in USD.
    pub min_volume_usd: f64,
    /// Maximum independent pairs returned.
    pub max_pairs: usize,
}

impl From<&crate::config::ScreenerSection> for ScreenerConfig {
    fn from(section: &crate::config::ScreenerSection) -> Self {
        Self {
            min_data_points: section.min_data_points,
            lookback: section.lookback,
            min_volume_usd: section.min_volume_usd,
            max_pairs: section.max_pairs,
        }
    }
}

pub struct PairScreener {
    config: ScreenerConfig,
}

impl PairScreener {
    pub fn new(config: ScreenerConfig) -> Self {
        Self { config }
    }

    /// Screen the universe and return ranked, symbol-independent pairs.
    ///
    /// Empty input or zero qualifying pairs is a normal empty result. A pair
    /// whose statistics error out is logged and skipped; screening continues.
    pub fn screen(&self, series_by_symbol: &HashMap<String, CandleSeries>) -> Vec<PairCandidate> {
        let mut symbols: Vec<&String> = series_by_symbol
            .keys()
            .filter(|sym| self.is_eligible(&series_by_symbol[*sym]))
            .collect();
        symbols.sort();

        info!(
            universe = series_by_symbol.len(),
            eligible = symbols.len(),
            "Screening pair universe"
        );

        let mut candidates = Vec::new();
        for i in 0..symbols.len() {
            for j in (i + 1)..symbols.len() {
                let sym1 = symbols[i];
                let sym2 = symbols[j];
                match self.evaluate_pair(
                    sym1,
                    sym2,
                    &series_by_symbol[sym1],
                    &series_by_symbol[sym2],
                ) {
                    Ok(Some(candidate)) => candidates.push(candidate),
                    Ok(None) => {}
                    Err(e) => {
                        warn!(
                            pair = format!("{}-{}", sym1, sym2),
                            error = %e,
                            "Pair evaluation failed, skipping"
                        );
                    }
                }
            }
        }

        candidates.sort_by(|a, b| {
            b.confidence_score
                .partial_cmp(&a.confidence_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let ranked = self.deduplicate(candidates);
        info!(pairs = ranked.len(), "Screening complete");
        ranked
    }

    fn is_eligible(&self, series: &CandleSeries) -> bool {
        if series.len() < self.config.min_data_points {
            debug!(
                symbol = %series.symbol,
                candles = series.len(),
                "Too few candles, dropping symbol"
            );
            return false;
        }
        let notional = series.average_notional_volume();
        if notional < self.config.min_volume_usd {
            debug!(
                symbol = %series.symbol,
                notional = format!("{:.0}", notional),
                "Illiquid symbol, dropping"
            );
            return false;
        }
        true
    }

    /// Evaluate one unordered pair. `Ok(None)` means a gate rejected it
    /// (an ordinary outcome); `Err` means the statistics themselves failed.
    pub fn evaluate_pair(
        &self,
        symbol1: &str,
        symbol2: &str,
        series1: &CandleSeries,
        series2: &CandleSeries,
    ) -> Result<Option<PairCandidate>, AnalysisError> {
        let aligned = align_pair(series1, series2).tail(self.config.lookback);
        if aligned.len() < self.config.min_data_points {
            return Err(AnalysisError::InsufficientData {
                needed: self.config.min_data_points,
                got: aligned.len(),
            });
        }

        let Some(correlation) = stats::pearson_correlation(&aligned.x_closes, &aligned.y_closes)
        else {
            return Err(AnalysisError::degenerate("Degenerate variance in closes"));
        };
        let abs_corr = correlation.abs();
        if abs_corr <= MIN_ABS_CORRELATION || abs_corr >= MAX_ABS_CORRELATION {
            debug!(
                pair = format!("{}-{}", symbol1, symbol2),
                corr = format!("{:.3}", correlation),
                "Correlation outside screening band"
            );
            return Ok(None);
        }

        let (beta, used_fallback) = stats::ols_beta(&aligned.x_closes, &aligned.y_closes);
        if used_fallback {
            debug!(
                pair = format!("{}-{}", symbol1, symbol2),
                beta,
                "Hedge ratio estimated via covariance-ratio fallback"
            );
        }

        let spread = stats::spread(&aligned.x_closes, &aligned.y_closes, beta);

        let adf = stats::adf_test(&spread)?;
        if adf.p_value >= MAX_ADF_P_VALUE {
            debug!(
                pair = format!("{}-{}", symbol1, symbol2),
                p = format!("{:.3}", adf.p_value),
                "Spread not stationary"
            );
            return Ok(None);
        }

        let hurst = stats::hurst_exponent(&spread)?;
        if hurst >= MAX_HURST {
            debug!(
                pair = format!("{}-{}", symbol1, symbol2),
                hurst = format!("{:.3}", hurst),
                "Spread not mean-reverting (Hurst)"
            );
            return Ok(None);
        }

        let Some(half_life) = stats::half_life(&spread) else {
            debug!(
                pair = format!("{}-{}", symbol1, symbol2),
                "No mean reversion in AR(1) fit"
            );
            return Ok(None);
        };
        if half_life > MAX_HALF_LIFE {
            debug!(
                pair = format!("{}-{}", symbol1, symbol2),
                half_life = format!("{:.1}", half_life),
                "Half-life too long"
            );
            return Ok(None);
        }

        let spread_mean = stats::mean(&spread);
        if spread_mean.abs() < stats::VARIANCE_EPSILON {
            return Err(AnalysisError::degenerate(
                "Spread mean near zero, coefficient of variation undefined",
            ));
        }
        let cv = stats::std_dev(&spread) / spread_mean.abs();
        if cv >= MAX_COEF_OF_VARIATION {
            debug!(
                pair = format!("{}-{}", symbol1, symbol2),
                cv = format!("{:.3}", cv),
                "Spread too noisy relative to its mean"
            );
            return Ok(None);
        }

        let confidence_score = PairCandidate::confidence(adf.p_value, hurst, cv);

        info!(
            pair = format!("{}-{}", symbol1, symbol2),
            correlation = format!("{:.3}", correlation),
            adf_p = format!("{:.3}", adf.p_value),
            hurst = format!("{:.3}", hurst),
            half_life = format!("{:.1}", half_life),
            confidence = format!("{:.3}", confidence_score),
            "Viable pair found"
        );

        Ok(Some(PairCandidate {
            symbol1: symbol1.to_string(),
            symbol2: symbol2.to_string(),
            beta,
            correlation,
            adf_p_value: adf.p_value,
            hurst_exponent: hurst,
            half_life,
            coefficient_of_variation: cv,
            confidence_score,
        }))
    }

    /// Greedy dedup over the confidence-sorted list: once a symbol appears
    /// in an accepted pair, lower-confidence pairs containing it are skipped.
    fn deduplicate(&self, sorted: Vec<PairCandidate>) -> Vec<PairCandidate> {
        let mut used: HashSet<String> = HashSet::new();
        let mut accepted = Vec::new();

        for candidate in sorted {
            if accepted.len() >= self.config.max_pairs {
                break;
            }
            if used.contains(&candidate.symbol1) || used.contains(&candidate.symbol2) {
                continue;
            }
            used.insert(candidate.symbol1.clone());
            used.insert(candidate.symbol2.clone());
            accepted.push(candidate);
        }

        accepted
    }
}
