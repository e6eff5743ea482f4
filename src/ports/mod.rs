//! Trait abstractions at the system boundary.

pub mod market_data;
pub mod mocks;

pub use market_data::{CandleDataProvider, MarketDataError};
pub use mocks::MockCandleProvider;
