//! Spread signal generation.
//!
//! Maintains a rolling hedge ratio and z-score for one pair and emits a
//! long/short/hold signal per evaluated candle. The stationarity gate
//! reuses the screening ADF test but is throttled: it is recomputed at most
//! every `adf_gate_interval` calls because it is expensive per step and the
//! caller can tolerate a slightly stale verdict.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::domain::{AlignedPair, Direction, SpreadSignal};
use crate::stats;

/// Cap on the dynamic sizing multiplier.
const MAX_SIZE_MULTIPLIER: f64 = 2.0;
/// Extra size per unit of z beyond the entry threshold.
const SIZE_SLOPE: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct SignalGenConfig {
    pub z_entry: f64,
    /// Rolling window for hedge ratio and spread statistics.
    pub lookback: usize,
    /// Require the window to pass the stationarity test before any
    /// directional signal.
    pub use_adf_gate: bool,
    /// Gate recomputed at most every N calls.
    pub adf_gate_interval: usize,
    pub dynamic_sizing: bool,
    /// Bounded window of absolute z observations.
    pub z_history_window: usize,
}

impl From<&crate::config::StrategySection> for SignalGenConfig {
    fn from(section: &crate::config::StrategySection) -> Self {
        Self {
            z_entry: section.z_entry,
            lookback: section.lookback,
            use_adf_gate: section.use_adf_gate,
            adf_gate_interval: section.adf_gate_interval,
            dynamic_sizing: section.dynamic_sizing,
            z_history_window: section.z_history_window,
        }
    }
}

/// Rolling spread statistics for one pair. The |z| history is append-only
/// within a bounded window; it feeds the empirical tail used by the level
/// calculator.
#[derive(Debug, Clone)]
pub struct SpreadState {
    abs_z_history: VecDeque<f64>,
    window: usize,
}

impl SpreadState {
    pub fn new(window: usize) -> Self {
        Self {
            abs_z_history: VecDeque::with_capacity(window),
            window,
        }
    }

    pub fn record(&mut self, abs_z: f64) {
        if self.abs_z_history.len() == self.window {
            self.abs_z_history.pop_front();
        }
        self.abs_z_history.push_back(abs_z);
    }

    pub fn len(&self) -> usize {
        self.abs_z_history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abs_z_history.is_empty()
    }

    pub fn abs_z_values(&self) -> Vec<f64> {
        self.abs_z_history.iter().copied().collect()
    }
}

/// Stateful signal generator for a single pair.
pub struct SpreadSignalGenerator {
    config: SignalGenConfig,
    symbol: String,
    pair_symbol: String,
    state: SpreadState,
    gate_verdict: Option<bool>,
    calls_since_gate: usize,
}

impl SpreadSignalGenerator {
    pub fn new(
        config: SignalGenConfig,
        symbol: impl Into<String>,
        pair_symbol: impl Into<String>,
    ) -> Self {
        let window = config.z_history_window;
        Self {
            config,
            symbol: symbol.into(),
            pair_symbol: pair_symbol.into(),
            state: SpreadState::new(window),
            gate_verdict: None,
            calls_since_gate: 0,
        }
    }

    pub fn state(&self) -> &SpreadState {
        &self.state
    }

    /// Seed the |z| history from aligned history before live evaluation.
    ///
    /// Each rolling window ending strictly before the latest point is
    /// evaluated the same way `generate` would, minus the gate and signal
    /// emission. A generator that already has history is left untouched.
    pub fn warm_up(&mut self, aligned: &AlignedPair) {
        if !self.state.is_empty() {
            return;
        }
        let lookback = self.config.lookback;
        if aligned.len() <= lookback {
            return;
        }
        for end in lookback..aligned.len() {
            let start = end - lookback;
            let x = &aligned.x_closes[start..end];
            let y = &aligned.y_closes[start..end];

            let beta = stats::ols_beta(x, y).0;
            let spread = stats::spread(x, y, beta);
            let spread_mean = stats::mean(&spread);
            let spread_std = stats::std_dev(&spread);
            if spread_std < stats::STD_EPSILON {
                continue;
            }
            let z = (spread[spread.len() - 1] - spread_mean) / spread_std;
            self.state.record(z.abs());
        }
        debug!(
            symbol = %self.symbol,
            pair = %self.pair_symbol,
            observations = self.state.len(),
            "Warmed up z history"
        );
    }

    /// Evaluate the latest aligned window and emit a signal.
    ///
    /// `beta_override` reuses a caller-supplied hedge ratio instead of
    /// re-estimating; rolling re-estimation is for new signals only, open
    /// positions keep their frozen entry beta.
    pub fn generate(&mut self, aligned: &AlignedPair, beta_override: Option<f64>) -> SpreadSignal {
        let window = aligned.tail(self.config.lookback);
        if window.len() < self.config.lookback.min(20) {
            warn!(
                symbol = %self.symbol,
                pair = %self.pair_symbol,
                got = window.len(),
                "Window too short for signal generation, holding"
            );
            return self.hold(beta_override.unwrap_or(0.0), 0.0, 0.0, 0.0);
        }

        let beta = match beta_override {
            Some(beta) => beta,
            None => stats::ols_beta(&window.x_closes, &window.y_closes).0,
        };

        let spread = stats::spread(&window.x_closes, &window.y_closes, beta);
        let spread_mean = stats::mean(&spread);
        let spread_std = stats::std_dev(&spread);

        if spread_std < stats::STD_EPSILON {
            warn!(
                symbol = %self.symbol,
                pair = %self.pair_symbol,
                "Spread std degenerate, holding without z-score"
            );
            return self.hold(beta, spread_mean, spread_std, 0.0);
        }

        let current_spread = spread[spread.len() - 1];
        let z_score = (current_spread - spread_mean) / spread_std;
        self.state.record(z_score.abs());

        let is_mean_reverting = self.gate(&spread);

        let direction = if z_score <= -self.config.z_entry && is_mean_reverting {
            Direction::LongSpread
        } else if z_score >= self.config.z_entry && is_mean_reverting {
            Direction::ShortSpread
        } else {
            Direction::Hold
        };

        let size_multiplier = self.size_multiplier(direction, z_score);

        debug!(
            symbol = %self.symbol,
            pair = %self.pair_symbol,
            z = format!("{:.2}", z_score),
            direction = ?direction,
            gated = !is_mean_reverting,
            "Signal evaluated"
        );

        SpreadSignal {
            symbol: self.symbol.clone(),
            pair_symbol: self.pair_symbol.clone(),
            direction,
            beta,
            spread_mean,
            spread_std,
            z_score,
            confidence: SpreadSignal::confidence_from_z(z_score),
            size_multiplier,
        }
    }

    /// Throttled stationarity verdict. An ADF failure is treated as "not
    /// mean-reverting" for this window, never as a fatal error.
    fn gate(&mut self, spread: &[f64]) -> bool {
        if !self.config.use_adf_gate {
            return true;
        }

        let stale = self.calls_since_gate >= self.config.adf_gate_interval;
        if self.gate_verdict.is_none() || stale {
            let verdict = match stats::adf_test(spread) {
                Ok(result) => result.is_stationary(0.05),
                Err(e) => {
                    warn!(
                        symbol = %self.symbol,
                        pair = %self.pair_symbol,
                        error = %e,
                        "Stationarity gate failed, suppressing signals"
                    );
                    false
                }
            };
            self.gate_verdict = Some(verdict);
            self.calls_since_gate = 0;
        }
        self.calls_since_gate += 1;
        self.gate_verdict.unwrap_or(false)
    }

    fn size_multiplier(&self, direction: Direction, z_score: f64) -> f64 {
        if !self.config.dynamic_sizing || direction == Direction::Hold {
            return 1.0;
        }
        let extremity = (z_score.abs() - self.config.z_entry).max(0.0);
        (1.0 + SIZE_SLOPE * extremity).min(MAX_SIZE_MULTIPLIER)
    }

    fn hold(&self, beta: f64, spread_mean: f64, spread_std: f64, z_score: f64) -> SpreadSignal {
        SpreadSignal {
            symbol: self.symbol.clone(),
            pair_symbol: self.pair_symbol.clone(),
            direction: Direction::Hold,
            beta,
            spread_mean,
            spread_std,
            z_score,
            confidence: 0.0,
            size_multiplier: 1.0,
        }
    }
}
