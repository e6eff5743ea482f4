//! Spreadhound - Statistical-Arbitrage Pairs-Trading Engine
//!
//! Screens a symbol universe for cointegrated, mean-reverting pairs and
//! turns spread z-scores into risk-managed entry/stop/take-profit
//! recommendations.
//!
//! # Modules
//!
//! - `domain`: Core types (Candle, AlignedPair, SpreadSignal, PairCandidate,
//!   OpenSpreadPosition, Recommendation)
//! - `stats`: Statistical kernel (correlation, OLS, ADF, Hurst, half-life)
//! - `screener`: Pair screening and the TTL result cache
//! - `strategy`: Signal generation and adaptive level calculation
//! - `monitor`: Exit monitoring for open positions
//! - `ports`: Trait abstractions (CandleDataProvider)
//! - `adapters`: External implementations (file-backed data, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Orchestrator driving the analysis cycle

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod errors;
pub mod monitor;
pub mod ports;
pub mod screener;
pub mod stats;
pub mod strategy;
