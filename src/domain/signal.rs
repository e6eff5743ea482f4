//! Spread trading signals.
//!
//! A signal is produced once per evaluated candle and is immutable once
//! emitted. Hold is a normal outcome, not an error.

use serde::{Deserialize, Serialize};
use statrs::function::erf::erf;

/// Trade direction in spread space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Buy symbol2, sell beta*symbol1 (spread below mean).
    LongSpread,
    /// Sell symbol2, buy beta*symbol1 (spread above mean).
    ShortSpread,
    Hold,
}

impl Direction {
    /// Signed representation: +1 long spread, -1 short spread, 0 hold.
    pub fn sign(&self) -> i8 {
        match self {
            Direction::LongSpread => 1,
            Direction::ShortSpread => -1,
            Direction::Hold => 0,
        }
    }
}

/// Signal emitted by the spread signal generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadSignal {
    pub symbol: String,
    pub pair_symbol: String,
    pub direction: Direction,
    /// Hedge ratio in effect when the signal was produced.
    pub beta: f64,
    pub spread_mean: f64,
    pub spread_std: f64,
    pub z_score: f64,
    /// Confidence in [0, 1] derived from the standard normal CDF of |z|.
    pub confidence: f64,
    /// Sizing multiplier >= 1.0, grows with z extremity beyond the entry
    /// threshold when dynamic sizing is enabled.
    pub size_multiplier: f64,
}

impl SpreadSignal {
    /// Two-sided confidence that a deviation this extreme is not noise:
    /// 2*Phi(|z|) - 1, clamped to [0, 1].
    pub fn confidence_from_z(z_score: f64) -> f64 {
        let phi = 0.5 * (1.0 + erf(z_score.abs() / f64::sqrt(2.0)));
        (2.0 * phi - 1.0).clamp(0.0, 1.0)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.confidence.is_nan() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!("Invalid confidence value: {}", self.confidence));
        }
        if self.z_score.is_nan() {
            return Err("Z-score cannot be NaN".to_string());
        }
        if self.size_multiplier < 1.0 {
            return Err(format!(
                "Size multiplier must be >= 1.0, got {}",
                self.size_multiplier
            ));
        }
        Ok(())
    }

    pub fn is_actionable(&self) -> bool {
        self.direction != Direction::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_signal(direction: Direction, z: f64) -> SpreadSignal {
        SpreadSignal {
            symbol: "SOL".to_string(),
            pair_symbol: "RAY".to_string(),
            direction,
            beta: 1.2,
            spread_mean: 0.5,
            spread_std: 0.05,
            z_score: z,
            confidence: SpreadSignal::confidence_from_z(z),
            size_multiplier: 1.0,
        }
    }

    #[test]
    fn test_direction_sign() {
        assert_eq!(Direction::LongSpread.sign(), 1);
        assert_eq!(Direction::ShortSpread.sign(), -1);
        assert_eq!(Direction::Hold.sign(), 0);
    }

    #[test]
    fn test_confidence_from_z() {
        assert_relative_eq!(SpreadSignal::confidence_from_z(0.0), 0.0, epsilon = 0.001);
        assert_relative_eq!(SpreadSignal::confidence_from_z(1.0), 0.683, epsilon = 0.001);
        assert_relative_eq!(SpreadSignal::confidence_from_z(2.0), 0.954, epsilon = 0.001);
        // Symmetric in z
        assert_relative_eq!(
            SpreadSignal::confidence_from_z(-2.0),
            SpreadSignal::confidence_from_z(2.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_signal_validation() {
        let valid = sample_signal(Direction::LongSpread, -2.3);
        assert!(valid.validate().is_ok());

        let mut bad_conf = sample_signal(Direction::Hold, 0.5);
        bad_conf.confidence = 1.1;
        assert!(bad_conf.validate().is_err());

        let mut nan_z = sample_signal(Direction::Hold, 0.0);
        nan_z.z_score = f64::NAN;
        assert!(nan_z.validate().is_err());

        let mut bad_size = sample_signal(Direction::ShortSpread, 2.5);
        bad_size.size_multiplier = 0.5;
        assert!(bad_size.validate().is_err());
    }

    #[test]
    fn test_is_actionable() {
        assert!(sample_signal(Direction::LongSpread, -2.3).is_actionable());
        assert!(!sample_signal(Direction::Hold, 0.2).is_actionable());
    }
}
