//! Statistical kernel: correlation, hedge-ratio regression, stationarity
//! testing, long-memory estimation, half-life.

pub mod adf;
pub mod half_life;
pub mod hurst;
pub mod regression;
pub mod rolling;

pub use adf::{adf_test, AdfResult, MIN_ADF_SAMPLES};
pub use half_life::half_life;
pub use hurst::{hurst_exponent, MIN_HURST_SAMPLES};
pub use regression::{ols_beta, spread};
pub use rolling::{mean, pearson_correlation, quantile, std_dev, STD_EPSILON, VARIANCE_EPSILON};
