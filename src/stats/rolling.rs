//! Rolling-window statistics helpers.

use statrs::statistics::{Data, OrderStatistics};

/// Variance below this is treated as degenerate.
pub const VARIANCE_EPSILON: f64 = 1e-12;
/// Standard deviation below this cannot safely divide a z-score.
pub const STD_EPSILON: f64 = 1e-10;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Empirical quantile of a sample, tau in [0, 1].
pub fn quantile(values: &[f64], tau: f64) -> f64 {
    let mut data = Data::new(values.to_vec());
    data.quantile(tau)
}

/// Pearson correlation coefficient in [-1, 1].
///
/// None when either series is degenerate (zero variance) or lengths differ.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let mean_x = mean(x);
    let mean_y = mean(y);

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (a, b) in x.iter().zip(y.iter()) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x < VARIANCE_EPSILON || var_y < VARIANCE_EPSILON {
        return None;
    }

    let correlation = covariance / (var_x.sqrt() * var_y.sqrt());
    correlation.is_finite().then_some(correlation)
}
