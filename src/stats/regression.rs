//! Hedge-ratio estimation.

use tracing::debug;

use crate::stats::rolling::{mean, VARIANCE_EPSILON};

/// OLS slope of y regressed on x (with intercept).
///
/// When var(x) is below epsilon the closed form is numerically unstable;
/// the covariance/variance ratio over the raw (non-demeaned) series is used
/// as the fallback, and a flag reports which path was taken.
pub fn ols_beta(x: &[f64], y: &[f64]) -> (f64, bool) {
    let n = x.len().min(y.len());
    if n < 2 {
        return (0.0, true);
    }

    let mean_x = mean(&x[..n]);
    let mean_y = mean(&y[..n]);

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    for i in 0..n {
        let dx = x[i] - mean_x;
        covariance += dx * (y[i] - mean_y);
        var_x += dx * dx;
    }

    if var_x >= VARIANCE_EPSILON {
        return (covariance / var_x, false);
    }

    debug!(var_x, "OLS variance degenerate, using covariance-ratio fallback");

    // Raw second moments; guards against an x series that is constant after
    // demeaning but not identically zero.
    let raw_var: f64 = x[..n].iter().map(|v| v * v).sum();
    if raw_var < VARIANCE_EPSILON {
        return (0.0, true);
    }
    let raw_cov: f64 = x[..n].iter().zip(y[..n].iter()).map(|(a, b)| a * b).sum();
    (raw_cov / raw_var, true)
}

/// Spread series y - beta*x.
pub fn spread(x: &[f64], y: &[f64], beta: f64) -> Vec<f64> {
    x.iter().zip(y.iter()).map(|(a, b)| b - beta * a).collect()
}
