//! Augmented Dickey-Fuller stationarity test.
//!
//! Regresses first differences on the lagged level and maps the resulting
//! t-statistic to an approximate p-value via the MacKinnon constant-only
//! critical values. Under H0 the series has a unit root; a p-value below
//! 0.05 rejects H0 in favour of stationarity.

use crate::errors::AnalysisError;
use crate::stats::rolling::mean;

/// Minimum samples for a usable test.
pub const MIN_ADF_SAMPLES: usize = 20;

/// MacKinnon (1994) critical values for the constant-only case, n > 100,
/// paired with their significance levels, plus interpolation anchors for
/// the body of the distribution.
const P_VALUE_ANCHORS: &[(f64, f64)] = &[
    (-4.50, 0.001),
    (-3.43, 0.01),
    (-3.12, 0.025),
    (-2.86, 0.05),
    (-2.57, 0.10),
    (-1.94, 0.31),
    (-1.62, 0.45),
    (-0.50, 0.89),
    (0.00, 0.96),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdfResult {
    /// t-statistic of the lag coefficient; more negative means more
    /// stationary.
    pub statistic: f64,
    /// Approximate p-value in [0.001, 0.99].
    pub p_value: f64,
}

impl AdfResult {
    pub fn is_stationary(&self, significance: f64) -> bool {
        self.p_value < significance
    }
}

/// Run the ADF test on a series.
pub fn adf_test(series: &[f64]) -> Result<AdfResult, AnalysisError> {
    if series.len() < MIN_ADF_SAMPLES {
        return Err(AnalysisError::InsufficientData {
            needed: MIN_ADF_SAMPLES,
            got: series.len(),
        });
    }

    let n = series.len() - 1;
    let mut delta_y = Vec::with_capacity(n);
    let mut y_lag = Vec::with_capacity(n);
    for i in 1..series.len() {
        delta_y.push(series[i] - series[i - 1]);
        y_lag.push(series[i - 1]);
    }

    // Demean both sides for numerical stability (constant-only regression).
    let y_lag_mean = mean(&y_lag);
    let delta_mean = mean(&delta_y);

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for i in 0..n {
        let yc = y_lag[i] - y_lag_mean;
        numerator += yc * (delta_y[i] - delta_mean);
        denominator += yc * yc;
    }

    if denominator.abs() < f64::EPSILON {
        return Err(AnalysisError::degenerate(
            "ADF regressor has zero variance (constant series)",
        ));
    }

    let gamma = numerator / denominator;

    let mut sse = 0.0;
    for i in 0..n {
        let predicted = gamma * (y_lag[i] - y_lag_mean) + delta_mean;
        let residual = delta_y[i] - predicted;
        sse += residual * residual;
    }

    let mse = sse / (n as f64 - 1.0);
    let se_gamma = (mse / denominator).sqrt();
    if se_gamma.abs() < f64::EPSILON {
        return Err(AnalysisError::degenerate(
            "ADF standard error is zero (perfect fit)",
        ));
    }

    let statistic = gamma / se_gamma;
    if !statistic.is_finite() {
        return Err(AnalysisError::degenerate("ADF statistic is not finite"));
    }

    Ok(AdfResult {
        statistic,
        p_value: p_value_from_statistic(statistic),
    })
}

/// Piecewise-linear interpolation over the anchor table, clamped to
/// [0.001, 0.99]. Monotone non-decreasing in the statistic.
fn p_value_from_statistic(statistic: f64) -> f64 {
    let (first_stat, first_p) = P_VALUE_ANCHORS[0];
    if statistic <= first_stat {
        return first_p;
    }
    let (last_stat, last_p) = P_VALUE_ANCHORS[P_VALUE_ANCHORS.len() - 1];
    if statistic >= last_stat {
        return last_p.min(0.99);
    }

    for window in P_VALUE_ANCHORS.windows(2) {
        let (s0, p0) = window[0];
        let (s1, p1) = window[1];
        if statistic <= s1 {
            let t = (statistic - s0) / (s1 - s0);
            return (p0 + t * (p1 - p0)).clamp(0.001, 0.99);
        }
    }
    0.99
}

#[cfg(test)]
mod tests {
    use super::*;

    /// AR(1) with strong reversion; deterministic pseudo-noise.
    fn mean_reverting_series(len: usize) -> Vec<f64> {
        let mut series = Vec::with_capacity(len);
        let mut current = 10.0;
        for i in 0..len {
            let noise = ((i * 31) % 11) as f64 / 10.0 - 0.5;
            current = 0.3 * current + noise;
            series.push(current);
        }
        series
    }

    #[test]
    fn test_insufficient_data() {
        let short: Vec<f64> = (0..MIN_ADF_SAMPLES - 1).map(|v| v as f64).collect();
        assert!(matches!(
            adf_test(&short),
            Err(AnalysisError::InsufficientData { needed: 20, .. })
        ));
    }

    #[test]
    fn test_constant_series_degenerate() {
        let flat = vec![5.0; 50];
        assert!(matches!(
            adf_test(&flat),
            Err(AnalysisError::NumericalDegeneracy(_))
        ));
    }

    #[test]
    fn test_mean_reverting_is_stationary() {
        let result = adf_test(&mean_reverting_series(120)).unwrap();
        assert!(result.statistic < -2.86, "stat was {:.2}", result.statistic);
        assert!(result.is_stationary(0.05));
    }

    #[test]
    fn test_random_walk_is_not_stationary() {
        // Cumulative sum of deterministic pseudo-noise: a unit-root series.
        let mut walk = Vec::with_capacity(150);
        let mut level = 0.0;
        for i in 0..150 {
            level += ((i * 17) % 13) as f64 / 13.0 - 0.46;
            walk.push(level);
        }
        let result = adf_test(&walk).unwrap();
        assert!(!result.is_stationary(0.05), "p was {:.3}", result.p_value);
    }

    #[test]
    fn test_p_value_monotone_in_statistic() {
        let stats = [-5.0, -3.5, -3.0, -2.86, -2.5, -2.0, -1.0, 0.0, 1.0];
        let ps: Vec<f64> = stats.iter().map(|&s| p_value_from_statistic(s)).collect();
        for pair in ps.windows(2) {
            assert!(pair[0] <= pair[1], "p-values not monotone: {:?}", ps);
        }
    }

    #[test]
    fn test_p_value_anchor_exact_at_five_pct() {
        assert!((p_value_from_statistic(-2.86) - 0.05).abs() < 1e-9);
    }
}
