//! Configuration Loader
//!
//! Loads and validates engine configuration from TOML files. Unknown or
//! out-of-range values are a load-time error, never a silent default at
//! use time.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Main configuration structure matching config.toml.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub pairs: PairsSection,
    pub screener: ScreenerSection,
    pub strategy: StrategySection,
    pub data: DataSection,
    pub logging: LoggingSection,
}

/// How the orchestrator obtains its pair universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairDiscoveryMode {
    /// Trade only the configured static pair list.
    Static,
    /// Screen the symbol universe each cycle (cache-backed).
    AutoScreen,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PairsSection {
    pub discovery_mode: PairDiscoveryMode,
    /// [symbol1, symbol2] pairs used in static mode.
    #[serde(default)]
    pub static_pairs: Vec<[String; 2]>,
    /// Candle timeframe, e.g. "1h" or "4h".
    pub timeframe: String,
    /// Candles fetched per symbol per cycle.
    pub candle_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScreenerSection {
    /// Symbols with fewer candles than this are dropped before screening.
    pub min_data_points: usize,
    /// Aligned points kept (most recent) for pair statistics.
    pub lookback: usize,
    /// Minimum average notional volume in USD.
    pub min_volume_usd: f64,
    /// Maximum independent pairs emitted.
    pub max_pairs: usize,
    /// Symbols fetched per batch while building the screening universe.
    pub batch_size: usize,
    /// Cache freshness window in hours.
    pub cache_hours: f64,
    /// Path of the JSON cache artifact.
    pub cache_path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategySection {
    /// |z| at which a directional signal fires.
    pub z_entry: f64,
    /// |z| at or below which an open position has reverted home.
    pub z_exit: f64,
    /// Rolling window for hedge ratio and spread statistics.
    pub lookback: usize,
    /// Require the current window to pass the stationarity test before any
    /// directional signal.
    pub use_adf_gate: bool,
    /// Recompute the (expensive) gate at most every N generator calls.
    pub adf_gate_interval: usize,
    /// Scale size with z extremity beyond the entry threshold.
    pub dynamic_sizing: bool,
    /// Additional z distance past z_entry for the theoretical minimum stop.
    pub min_sl_buffer: f64,
    /// Tolerated |z - z_at_entry| before divergence-blowup exit.
    pub max_spread_deviation: f64,
    /// Bounded window of absolute z observations kept per pair.
    pub z_history_window: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataSection {
    /// Directory of JSON candle files consumed by the file data adapter.
    pub data_dir: String,
}

impl DataSection {
    /// Data dir with environment variable override.
    pub fn get_data_dir(&self) -> String {
        std::env::var("SPREADHOUND_DATA_DIR").unwrap_or_else(|_| self.data_dir.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// "trace", "debug", "info", "warn", "error"
    pub level: String,
    pub log_to_file: bool,
    pub log_file: String,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pairs.timeframe.is_empty() {
            return Err(ConfigError::ValidationError(
                "timeframe cannot be empty".to_string(),
            ));
        }
        if self.pairs.candle_limit == 0 {
            return Err(ConfigError::ValidationError(
                "candle_limit must be > 0".to_string(),
            ));
        }
        if self.pairs.discovery_mode == PairDiscoveryMode::Static
            && self.pairs.static_pairs.is_empty()
        {
            return Err(ConfigError::ValidationError(
                "static discovery mode requires at least one configured pair".to_string(),
            ));
        }
        for pair in &self.pairs.static_pairs {
            if pair[0].is_empty() || pair[1].is_empty() || pair[0] == pair[1] {
                return Err(ConfigError::ValidationError(format!(
                    "invalid static pair: {:?}",
                    pair
                )));
            }
        }

        if self.screener.min_data_points < 40 {
            return Err(ConfigError::ValidationError(format!(
                "min_data_points must be >= 40, got {}",
                self.screener.min_data_points
            )));
        }
        if self.screener.lookback < self.screener.min_data_points {
            return Err(ConfigError::ValidationError(format!(
                "screener lookback {} must be >= min_data_points {}",
                self.screener.lookback, self.screener.min_data_points
            )));
        }
        if self.screener.min_volume_usd < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "min_volume_usd must be >= 0, got {}",
                self.screener.min_volume_usd
            )));
        }
        if self.screener.max_pairs == 0 {
            return Err(ConfigError::ValidationError(
                "max_pairs must be > 0".to_string(),
            ));
        }
        if self.screener.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "batch_size must be > 0".to_string(),
            ));
        }
        if self.screener.cache_hours <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "cache_hours must be > 0, got {}",
                self.screener.cache_hours
            )));
        }

        if self.strategy.z_entry <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "z_entry must be > 0, got {}",
                self.strategy.z_entry
            )));
        }
        if self.strategy.z_exit < 0.0 || self.strategy.z_exit >= self.strategy.z_entry {
            return Err(ConfigError::ValidationError(format!(
                "z_exit must be in [0, z_entry), got {}",
                self.strategy.z_exit
            )));
        }
        if self.strategy.lookback < 20 {
            return Err(ConfigError::ValidationError(format!(
                "strategy lookback must be >= 20, got {}",
                self.strategy.lookback
            )));
        }
        if self.strategy.adf_gate_interval == 0 {
            return Err(ConfigError::ValidationError(
                "adf_gate_interval must be > 0".to_string(),
            ));
        }
        if self.strategy.min_sl_buffer < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "min_sl_buffer must be >= 0, got {}",
                self.strategy.min_sl_buffer
            )));
        }
        if self.strategy.max_spread_deviation <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "max_spread_deviation must be > 0, got {}",
                self.strategy.max_spread_deviation
            )));
        }
        if self.strategy.z_history_window < 30 {
            return Err(ConfigError::ValidationError(format!(
                "z_history_window must be >= 30, got {}",
                self.strategy.z_history_window
            )));
        }

        if self.data.data_dir.is_empty() {
            return Err(ConfigError::ValidationError(
                "data_dir cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
