//! Signal generation and trade-level sizing.

pub mod levels;
pub mod signal_gen;

pub use levels::{
    compute_levels, LegLevels, LevelInputs, PairLevels, SpreadLevels, MIN_Z_HISTORY,
};
pub use signal_gen::{SignalGenConfig, SpreadSignalGenerator, SpreadState};
