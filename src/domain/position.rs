//! Open spread positions.
//!
//! Entry-time statistics are frozen so exit decisions are reproducible
//! against the conditions that justified entry. They are never recomputed
//! while the position is open.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PositionError {
    #[error("Missing or empty required field: {0}")]
    MissingField(&'static str),
    #[error("Non-finite value for {0}: {1}")]
    NonFinite(&'static str, f64),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, f64),
}

/// Snapshot of the spread statistics at fill time plus exit parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenSpreadPosition {
    pub symbol: String,
    pub pair_symbol: String,
    /// Hedge ratio frozen at entry.
    pub beta: f64,
    pub spread_mean: f64,
    pub spread_std: f64,
    pub z_score_at_entry: f64,
    /// |z| at or below which the position mean-reverted home.
    pub z_exit_threshold: f64,
    /// Tolerated |z - z_at_entry| before declaring cointegration breakdown.
    pub max_spread_deviation: f64,
}

impl OpenSpreadPosition {
    /// Check the frozen metadata before it is used for an exit decision.
    pub fn validate(&self) -> Result<(), PositionError> {
        if self.symbol.is_empty() {
            return Err(PositionError::MissingField("symbol"));
        }
        if self.pair_symbol.is_empty() {
            return Err(PositionError::MissingField("pair_symbol"));
        }
        for (name, value) in [
            ("beta", self.beta),
            ("spread_mean", self.spread_mean),
            ("spread_std", self.spread_std),
            ("z_score_at_entry", self.z_score_at_entry),
            ("z_exit_threshold", self.z_exit_threshold),
            ("max_spread_deviation", self.max_spread_deviation),
        ] {
            if !value.is_finite() {
                return Err(PositionError::NonFinite(name, value));
            }
        }
        if self.spread_std <= 0.0 {
            return Err(PositionError::InvalidValue("spread_std", self.spread_std));
        }
        if self.z_exit_threshold < 0.0 {
            return Err(PositionError::InvalidValue(
                "z_exit_threshold",
                self.z_exit_threshold,
            ));
        }
        if self.max_spread_deviation <= 0.0 {
            return Err(PositionError::InvalidValue(
                "max_spread_deviation",
                self.max_spread_deviation,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn open_position() -> OpenSpreadPosition {
        OpenSpreadPosition {
            symbol: "RAY".to_string(),
            pair_symbol: "SOL".to_string(),
            beta: 1.2,
            spread_mean: 0.536,
            spread_std: 0.035,
            z_score_at_entry: -2.1,
            z_exit_threshold: 0.2,
            max_spread_deviation: 4.0,
        }
    }

    #[test]
    fn test_valid_position() {
        assert!(open_position().validate().is_ok());
    }

    #[test]
    fn test_empty_pair_symbol() {
        let mut p = open_position();
        p.pair_symbol.clear();
        assert!(matches!(
            p.validate(),
            Err(PositionError::MissingField("pair_symbol"))
        ));
    }

    #[test]
    fn test_nan_beta() {
        let mut p = open_position();
        p.beta = f64::NAN;
        assert!(matches!(p.validate(), Err(PositionError::NonFinite("beta", _))));
    }

    #[test]
    fn test_zero_spread_std() {
        let mut p = open_position();
        p.spread_std = 0.0;
        assert!(matches!(
            p.validate(),
            Err(PositionError::InvalidValue("spread_std", _))
        ));
    }

    #[test]
    fn test_nonpositive_max_deviation() {
        let mut p = open_position();
        p.max_spread_deviation = 0.0;
        assert!(p.validate().is_err());
    }
}
