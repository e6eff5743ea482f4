//! Exit monitoring for open spread positions.
//!
//! Decisions use the statistics frozen at entry, never recomputed values.
//! Every failure mode defaults to holding the position: a malformed
//! position or a missing leg close is surfaced loudly and left alone,
//! never force-closed.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::domain::OpenSpreadPosition;

/// Why (or why not) a position should be closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// |z| reverted to at or below the exit threshold.
    ZScoreExit,
    /// The spread moved further from its entry deviation than tolerated:
    /// the cointegration relationship looks broken.
    DivergenceBlowup,
    NoExit,
}

/// Exit verdict with the metrics that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitDecision {
    pub should_exit: bool,
    pub reason: ExitReason,
    pub z_score: Option<f64>,
    pub threshold: Option<f64>,
    pub spread: Option<f64>,
}

impl ExitDecision {
    fn no_exit() -> Self {
        Self {
            should_exit: false,
            reason: ExitReason::NoExit,
            z_score: None,
            threshold: None,
            spread: None,
        }
    }
}

pub struct ExitMonitor;

impl ExitMonitor {
    /// Evaluate an open position against the latest closes of both legs.
    ///
    /// `leg_close` is the position's own symbol (leg Y), `pair_leg_close`
    /// the hedge leg (leg X). A missing pair leg close is a warning and
    /// `NoExit`, not an exit.
    pub fn should_exit(
        position: &OpenSpreadPosition,
        leg_close: f64,
        pair_leg_close: Option<f64>,
    ) -> ExitDecision {
        if let Err(e) = position.validate() {
            error!(
                symbol = %position.symbol,
                error = %e,
                "Open position metadata invalid, refusing to exit on bad data"
            );
            return ExitDecision::no_exit();
        }

        let Some(pair_close) = pair_leg_close else {
            warn!(
                symbol = %position.symbol,
                pair = %position.pair_symbol,
                "Pair leg close unavailable, holding position"
            );
            return ExitDecision::no_exit();
        };

        if !leg_close.is_finite() || !pair_close.is_finite() {
            error!(
                symbol = %position.symbol,
                leg_close,
                pair_close,
                "Non-finite leg close, holding position"
            );
            return ExitDecision::no_exit();
        }

        // Frozen entry statistics only.
        let spread = leg_close - position.beta * pair_close;
        let z_score = (spread - position.spread_mean) / position.spread_std;

        if z_score.abs() <= position.z_exit_threshold {
            info!(
                symbol = %position.symbol,
                z = format!("{:.2}", z_score),
                threshold = position.z_exit_threshold,
                "Mean-reversion exit"
            );
            return ExitDecision {
                should_exit: true,
                reason: ExitReason::ZScoreExit,
                z_score: Some(z_score),
                threshold: Some(position.z_exit_threshold),
                spread: Some(spread),
            };
        }

        let deviation = (z_score - position.z_score_at_entry).abs();
        if deviation > position.max_spread_deviation {
            warn!(
                symbol = %position.symbol,
                z = format!("{:.2}", z_score),
                entry_z = format!("{:.2}", position.z_score_at_entry),
                deviation = format!("{:.2}", deviation),
                limit = position.max_spread_deviation,
                "Divergence blowup exit"
            );
            return ExitDecision {
                should_exit: true,
                reason: ExitReason::DivergenceBlowup,
                z_score: Some(z_score),
                threshold: Some(position.max_spread_deviation),
                spread: Some(spread),
            };
        }

        ExitDecision {
            should_exit: false,
            reason: ExitReason::NoExit,
            z_score: Some(z_score),
            threshold: Some(position.z_exit_threshold),
            spread: Some(spread),
        }
    }
}
