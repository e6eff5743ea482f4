//! Mean-reversion half-life via AR(1) regression.
//!
//! Regresses first differences of the spread on the lagged spread:
//! delta_s[t] = theta * s[t-1] + c. A negative theta implies reversion with
//! half-life ln(2) / (-theta). theta >= 0 means no reversion at all.

use crate::stats::rolling::{mean, VARIANCE_EPSILON};

pub const MIN_HALF_LIFE_SAMPLES: usize = 10;

/// Estimated half-life in candles; None when the series shows no reversion
/// or is too short/degenerate.
pub fn half_life(series: &[f64]) -> Option<f64> {
    if series.len() < MIN_HALF_LIFE_SAMPLES {
        return None;
    }

    let n = series.len() - 1;
    let mut delta = Vec::with_capacity(n);
    let mut lagged = Vec::with_capacity(n);
    for i in 1..series.len() {
        delta.push(series[i] - series[i - 1]);
        lagged.push(series[i - 1]);
    }

    let lag_mean = mean(&lagged);
    let delta_mean = mean(&delta);

    let mut covariance = 0.0;
    let mut variance = 0.0;
    for i in 0..n {
        let dl = lagged[i] - lag_mean;
        covariance += dl * (delta[i] - delta_mean);
        variance += dl * dl;
    }

    if variance < VARIANCE_EPSILON {
        return None;
    }

    let theta = covariance / variance;
    if theta >= 0.0 {
        return None;
    }

    let hl = std::f64::consts::LN_2 / -theta;
    hl.is_finite().then_some(hl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_short() {
        assert!(half_life(&[1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn test_constant_series() {
        assert!(half_life(&[4.0; 50]).is_none());
    }

    #[test]
    fn test_trending_series_has_no_reversion() {
        let trend: Vec<f64> = (0..60).map(|i| i as f64 * 0.5).collect();
        assert!(half_life(&trend).is_none());
    }

    #[test]
    fn test_ar1_half_life_matches_rho() {
        // s[t] = rho * s[t-1] exactly: theta = rho - 1, hl = ln2/(1-rho).
        let rho: f64 = 0.8;
        let mut series = vec![10.0];
        for _ in 0..80 {
            series.push(series.last().unwrap() * rho);
        }
        let hl = half_life(&series).unwrap();
        let expected = std::f64::consts::LN_2 / (1.0 - rho);
        assert!((hl - expected).abs() < 0.2, "hl={hl:.3} expected={expected:.3}");
    }

    #[test]
    fn test_fast_reversion_is_short() {
        let mut series = vec![5.0];
        for i in 0..80 {
            let noise = ((i * 23) % 7) as f64 / 70.0;
            series.push(series.last().unwrap() * 0.2 + noise);
        }
        let hl = half_life(&series).unwrap();
        assert!(hl < 2.0, "hl={hl:.3}");
    }
}
