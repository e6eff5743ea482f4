//! Trade recommendations emitted by the orchestrator.

use serde::{Deserialize, Serialize};

use crate::domain::signal::Direction;

/// Frozen statistics attached to a recommendation so a fill can later be
/// monitored with the exact entry conditions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationMetadata {
    pub beta: f64,
    pub spread_mean: f64,
    pub spread_std: f64,
    pub z_score_at_entry: f64,
    pub z_exit_threshold: f64,
    pub max_spread_deviation: f64,
}

/// One actionable pairs-trade recommendation, prices in leg-Y space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub symbol: String,
    pub pair_symbol: String,
    pub direction: Direction,
    pub confidence: f64,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub risk_reward: f64,
    pub metadata: RecommendationMetadata,
}

impl Recommendation {
    /// Reward-to-risk ratio of a level triple; None when the stop distance
    /// is degenerate.
    pub fn risk_reward(entry: f64, stop_loss: f64, take_profit: f64) -> Option<f64> {
        let risk = (entry - stop_loss).abs();
        if risk < 1e-12 {
            return None;
        }
        Some((take_profit - entry).abs() / risk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_reward() {
        // entry 0.466, stop 0.431, target 0.536 -> reward 0.07 / risk 0.035
        let rr = Recommendation::risk_reward(0.466, 0.431, 0.536).unwrap();
        assert!((rr - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_risk_reward_degenerate_stop() {
        assert!(Recommendation::risk_reward(1.0, 1.0, 2.0).is_none());
    }
}
