//! Adaptive entry/stop/take-profit level calculation.
//!
//! Stops adapt to how extreme the spread has actually been: the final stop
//! distance is the larger of the theoretical minimum (z_entry + buffer) and
//! the empirical 95th percentile of historical |z|. The empirical side has
//! no upper bound.

use tracing::error;

use crate::domain::Direction;
use crate::errors::AnalysisError;
use crate::stats;

/// Hard minimum of |z| observations before the empirical tail is trusted.
/// No fallback below this: sizing from an under-sampled tail is worse than
/// refusing to size at all.
pub const MIN_Z_HISTORY: usize = 30;

/// Empirical tail quantile used for the adaptive stop.
pub const STOP_TAIL_QUANTILE: f64 = 0.95;

/// Hedge ratios below this cannot safely divide a leg-X conversion.
pub const BETA_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
pub struct LevelInputs<'a> {
    pub price_x: f64,
    pub price_y: f64,
    pub beta: f64,
    pub spread_mean: f64,
    pub spread_std: f64,
    pub z_entry: f64,
    pub direction: Direction,
    /// Absolute z-score observations from the pair's rolling history.
    pub z_history: &'a [f64],
    pub min_sl_buffer: f64,
}

/// Levels in spread space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadLevels {
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit_partial: f64,
    pub take_profit_full: f64,
    /// Final stop distance in z units.
    pub stop_distance_z: f64,
}

/// A spread-space level set converted into one leg's price space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegLevels {
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit_partial: f64,
    pub take_profit_full: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairLevels {
    pub spread: SpreadLevels,
    /// Levels for the dependent leg (symbol2).
    pub leg_y: LegLevels,
    /// Levels for the hedge leg (symbol1).
    pub leg_x: LegLevels,
    /// True when beta was too small to convert leg-X levels and they were
    /// pinned to the current X price instead.
    pub leg_x_degenerate: bool,
}

/// Compute entry, adaptive stop-loss, and take-profit levels.
pub fn compute_levels(inputs: &LevelInputs) -> Result<PairLevels, AnalysisError> {
    if inputs.direction == Direction::Hold {
        return Err(AnalysisError::validation(
            "Cannot compute levels for a hold signal",
        ));
    }
    if inputs.spread_std <= 0.0 || !inputs.spread_std.is_finite() {
        return Err(AnalysisError::degenerate(format!(
            "Spread std must be > 0, got {}",
            inputs.spread_std
        )));
    }
    if inputs.z_history.len() < MIN_Z_HISTORY {
        error!(
            needed = MIN_Z_HISTORY,
            got = inputs.z_history.len(),
            "Refusing to size trade from an under-sampled z history"
        );
        return Err(AnalysisError::InsufficientData {
            needed: MIN_Z_HISTORY,
            got: inputs.z_history.len(),
        });
    }

    let theoretical_min = inputs.z_entry + inputs.min_sl_buffer;
    let empirical = stats::quantile(inputs.z_history, STOP_TAIL_QUANTILE);
    let stop_distance_z = theoretical_min.max(empirical);

    let mean = inputs.spread_mean;
    let std = inputs.spread_std;

    let spread = match inputs.direction {
        Direction::LongSpread => {
            let entry = mean - inputs.z_entry * std;
            SpreadLevels {
                entry,
                stop_loss: mean - stop_distance_z * std,
                take_profit_partial: mean - 0.5 * (mean - entry),
                take_profit_full: mean,
                stop_distance_z,
            }
        }
        Direction::ShortSpread => {
            let entry = mean + inputs.z_entry * std;
            SpreadLevels {
                entry,
                stop_loss: mean + stop_distance_z * std,
                take_profit_partial: mean + 0.5 * (entry - mean),
                take_profit_full: mean,
                stop_distance_z,
            }
        }
        Direction::Hold => unreachable!(),
    };

    let leg_y = LegLevels {
        entry: spread_to_leg_y(spread.entry, inputs.beta, inputs.price_x),
        stop_loss: spread_to_leg_y(spread.stop_loss, inputs.beta, inputs.price_x),
        take_profit_partial: spread_to_leg_y(spread.take_profit_partial, inputs.beta, inputs.price_x),
        take_profit_full: spread_to_leg_y(spread.take_profit_full, inputs.beta, inputs.price_x),
    };

    let leg_x_degenerate = inputs.beta.abs() < BETA_EPSILON;
    let leg_x = if leg_x_degenerate {
        // No safe division by beta; pin the hedge leg to its current price.
        LegLevels {
            entry: inputs.price_x,
            stop_loss: inputs.price_x,
            take_profit_partial: inputs.price_x,
            take_profit_full: inputs.price_x,
        }
    } else {
        LegLevels {
            entry: spread_to_leg_x(spread.entry, inputs.beta, inputs.price_y),
            stop_loss: spread_to_leg_x(spread.stop_loss, inputs.beta, inputs.price_y),
            take_profit_partial: spread_to_leg_x(spread.take_profit_partial, inputs.beta, inputs.price_y),
            take_profit_full: spread_to_leg_x(spread.take_profit_full, inputs.beta, inputs.price_y),
        }
    };

    Ok(PairLevels {
        spread,
        leg_y,
        leg_x,
        leg_x_degenerate,
    })
}

/// price_y = spread_level + beta * price_x
pub fn spread_to_leg_y(spread_level: f64, beta: f64, price_x: f64) -> f64 {
    spread_level + beta * price_x
}

/// price_x = (price_y - spread_level) / beta
pub fn spread_to_leg_x(spread_level: f64, beta: f64, price_y: f64) -> f64 {
    (price_y - spread_level) / beta
}

/// Invert a leg-Y price back to spread space (round-trip checks).
pub fn leg_y_to_spread(price_y_level: f64, beta: f64, price_x: f64) -> f64 {
    price_y_level - beta * price_x
}
