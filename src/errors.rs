//! Cross-cutting error taxonomy for the analysis pipeline.
//!
//! An ordinary "no signal" or "no exit" outcome is a normal return value,
//! never an error. These variants cover genuine data faults only.

use thiserror::Error;

/// Errors raised by statistical computations and level sizing.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Fewer samples than the statistical minimum. No fallback: sizing a
    /// trade from an under-sampled tail is worse than refusing.
    #[error("Insufficient data: requires {needed} samples, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Zero or near-zero variance, zero spread std, or similar degeneracy
    /// with no safe fallback.
    #[error("Numerical degeneracy: {0}")]
    NumericalDegeneracy(String),

    /// Malformed or missing required trade/configuration fields.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Candle fetch or upstream data failure for one leg.
    #[error("Upstream data error: {0}")]
    UpstreamData(String),
}

impl AnalysisError {
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::NumericalDegeneracy(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamData(msg.into())
    }
}
