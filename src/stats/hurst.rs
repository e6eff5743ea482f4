//! Hurst exponent via rescaled-range (R/S) analysis.
//!
//! H < 0.5 indicates mean reversion, H = 0.5 a random walk, H > 0.5 a
//! trending (long-memory) series. The estimate is the slope of
//! log(R/S) against log(chunk size), clamped to [0, 1].

use crate::errors::AnalysisError;
use crate::stats::rolling::{mean, std_dev, STD_EPSILON, VARIANCE_EPSILON};

/// Minimum samples for a meaningful R/S regression.
pub const MIN_HURST_SAMPLES: usize = 40;

const CHUNK_SIZES: &[usize] = &[8, 12, 16, 24, 32, 48, 64];

pub fn hurst_exponent(series: &[f64]) -> Result<f64, AnalysisError> {
    if series.len() < MIN_HURST_SAMPLES {
        return Err(AnalysisError::InsufficientData {
            needed: MIN_HURST_SAMPLES,
            got: series.len(),
        });
    }

    let mut log_sizes = Vec::new();
    let mut log_rs = Vec::new();

    for &size in CHUNK_SIZES {
        if size * 2 > series.len() {
            break;
        }
        if let Some(rs) = average_rescaled_range(series, size) {
            log_sizes.push((size as f64).ln());
            log_rs.push(rs.ln());
        }
    }

    if log_sizes.len() < 3 {
        return Err(AnalysisError::degenerate(
            "Too few valid R/S points for Hurst regression",
        ));
    }

    // OLS slope of log(R/S) on log(n).
    let mean_x = mean(&log_sizes);
    let mean_y = mean(&log_rs);
    let mut covariance = 0.0;
    let mut variance = 0.0;
    for i in 0..log_sizes.len() {
        let dx = log_sizes[i] - mean_x;
        covariance += dx * (log_rs[i] - mean_y);
        variance += dx * dx;
    }
    if variance < VARIANCE_EPSILON {
        return Err(AnalysisError::degenerate("Degenerate lag spacing in Hurst fit"));
    }

    Ok((covariance / variance).clamp(0.0, 1.0))
}

/// Mean R/S over non-overlapping chunks of the given size. None when every
/// chunk is flat (zero std).
fn average_rescaled_range(series: &[f64], size: usize) -> Option<f64> {
    let chunks = series.len() / size;
    let mut total = 0.0;
    let mut counted = 0usize;

    for c in 0..chunks {
        let chunk = &series[c * size..(c + 1) * size];
        let m = mean(chunk);
        let s = std_dev(chunk);
        if s < STD_EPSILON {
            continue;
        }

        let mut cumulative = 0.0;
        let mut max_dev = f64::MIN;
        let mut min_dev = f64::MAX;
        for &v in chunk {
            cumulative += v - m;
            max_dev = max_dev.max(cumulative);
            min_dev = min_dev.min(cumulative);
        }

        let range = max_dev - min_dev;
        if range > 0.0 {
            total += range / s;
            counted += 1;
        }
    }

    (counted > 0).then(|| total / counted as f64)
}
