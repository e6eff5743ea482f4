//! Core domain types: candles and alignment, pair candidates, signals,
//! open positions, recommendations.

pub mod candle;
pub mod pair;
pub mod position;
pub mod recommendation;
pub mod signal;

pub use candle::{align_pair, AlignedPair, Candle, CandleSeries, SeriesError};
pub use pair::PairCandidate;
pub use position::{OpenSpreadPosition, PositionError};
pub use recommendation::{Recommendation, RecommendationMetadata};
pub use signal::{Direction, SpreadSignal};
