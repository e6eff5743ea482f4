//! Analysis-cycle orchestrator.
//!
//! Drives screening (or a static pair list), signal generation, level
//! calculation, and recommendation assembly. Pairs are independent: one
//! failing pair is logged and skipped, never aborting the cycle. The stop
//! flag is observed between pair iterations only, never mid-computation.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::{Config, PairDiscoveryMode};
use crate::domain::{
    align_pair, CandleSeries, Direction, OpenSpreadPosition, PairCandidate, Recommendation,
    RecommendationMetadata, SpreadSignal,
};
use crate::errors::AnalysisError;
use crate::monitor::{ExitDecision, ExitMonitor};
use crate::ports::CandleDataProvider;
use crate::screener::cache::ScreenerCache;
use crate::screener::{PairScreener, ScreenerConfig};
use crate::strategy::levels::{compute_levels, LevelInputs, SpreadLevels};
use crate::strategy::{SignalGenConfig, SpreadSignalGenerator};

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Screening failed: {0}")]
    ScreeningError(String),
    #[error("Cycle interrupted by stop request")]
    Stopped,
}

pub struct Orchestrator {
    config: Config,
    provider: Arc<dyn CandleDataProvider>,
    screener: PairScreener,
    cache: ScreenerCache,
    /// One stateful generator per pair key "SYM1-SYM2".
    generators: HashMap<String, SpreadSignalGenerator>,
    stop_requested: Arc<RwLock<bool>>,
}

impl Orchestrator {
    pub fn new(
        config: Config,
        provider: Arc<dyn CandleDataProvider>,
        instance: impl Into<String>,
    ) -> Self {
        let screener = PairScreener::new(ScreenerConfig::from(&config.screener));
        let cache = ScreenerCache::new(
            config.screener.cache_path.clone(),
            instance,
            config.screener.cache_hours,
        );
        Self {
            config,
            provider,
            screener,
            cache,
            generators: HashMap::new(),
            stop_requested: Arc::new(RwLock::new(false)),
        }
    }

    /// Request a cooperative stop; observed between pair iterations.
    pub async fn stop(&self) {
        *self.stop_requested.write().await = true;
        info!("Stop requested");
    }

    /// Shared handle to the stop flag for signal handlers.
    pub fn stopper(&self) -> Arc<RwLock<bool>> {
        Arc::clone(&self.stop_requested)
    }

    async fn is_stopped(&self) -> bool {
        *self.stop_requested.read().await
    }

    /// Run one full analysis cycle and return recommendations.
    pub async fn run_cycle(&mut self) -> Result<Vec<Recommendation>, OrchestratorError> {
        let pairs = self.resolve_pairs().await?;
        info!(pairs = pairs.len(), "Starting analysis cycle");

        let mut recommendations = Vec::new();
        for (symbol1, symbol2) in pairs {
            if self.is_stopped().await {
                info!("Stop observed between pair iterations, ending cycle early");
                return Err(OrchestratorError::Stopped);
            }

            match self.analyze_pair(&symbol1, &symbol2).await {
                Ok(Some(recommendation)) => recommendations.push(recommendation),
                Ok(None) => {}
                Err(e) => {
                    // One bad pair never aborts the batch.
                    warn!(
                        pair = format!("{}-{}", symbol1, symbol2),
                        error = %e,
                        "Pair analysis failed, skipping"
                    );
                }
            }
        }

        info!(
            recommendations = recommendations.len(),
            "Analysis cycle complete"
        );
        Ok(recommendations)
    }

    /// Resolve the cycle's pair universe from config or the screener.
    ///
    /// Auto-screen mode consults the TTL cache first; a fresh entry is used
    /// without re-screening.
    async fn resolve_pairs(&self) -> Result<Vec<(String, String)>, OrchestratorError> {
        match self.config.pairs.discovery_mode {
            PairDiscoveryMode::Static => Ok(self
                .config
                .pairs
                .static_pairs
                .iter()
                .map(|p| (p[0].clone(), p[1].clone()))
                .collect()),
            PairDiscoveryMode::AutoScreen => {
                let timeframe = self.config.pairs.timeframe.clone();
                if let Some(entry) = self.cache.load(&timeframe, Utc::now()) {
                    info!(
                        pairs = entry.pairs.len(),
                        discovered_at = %entry.discovered_at,
                        "Using cached screening result"
                    );
                    return Ok(Self::pairs_from_candidates(&entry.pairs));
                }

                let candidates = self.screen_universe().await?;
                Ok(Self::pairs_from_candidates(&candidates))
            }
        }
    }

    fn pairs_from_candidates(candidates: &[PairCandidate]) -> Vec<(String, String)> {
        candidates
            .iter()
            .map(|c| (c.symbol1.clone(), c.symbol2.clone()))
            .collect()
    }

    /// Screen the universe on demand, optionally consulting the cache.
    pub async fn screen(&self, use_cache: bool) -> Result<Vec<PairCandidate>, OrchestratorError> {
        if use_cache {
            if let Some(entry) = self.cache.load(&self.config.pairs.timeframe, Utc::now()) {
                info!(
                    pairs = entry.pairs.len(),
                    discovered_at = %entry.discovered_at,
                    "Using cached screening result"
                );
                return Ok(entry.pairs);
            }
        }
        self.screen_universe().await
    }

    /// Fetch the universe, screen it, and refresh the cache.
    async fn screen_universe(&self) -> Result<Vec<PairCandidate>, OrchestratorError> {
        let symbols = self
            .provider
            .available_symbols()
            .await
            .map_err(|e| OrchestratorError::ScreeningError(e.to_string()))?;

        let timeframe = &self.config.pairs.timeframe;
        let mut universe: HashMap<String, CandleSeries> = HashMap::new();
        for (batch_idx, batch) in symbols.chunks(self.config.screener.batch_size).enumerate() {
            debug!(
                batch = batch_idx + 1,
                symbols = batch.len(),
                "Fetching screening universe batch"
            );
            for symbol in batch {
                match self
                    .provider
                    .get_candles(symbol, timeframe, self.config.pairs.candle_limit)
                    .await
                {
                    Ok(series) => {
                        universe.insert(symbol.clone(), series);
                    }
                    Err(e) => {
                        // Isolate upstream failures to the affected symbol.
                        warn!(symbol = %symbol, error = %e, "Candle fetch failed, dropping symbol");
                    }
                }
            }
        }

        let candidates = self.screener.screen(&universe);
        if let Err(e) = self
            .cache
            .store(timeframe, universe.len(), &candidates, Utc::now())
        {
            warn!(error = %e, "Failed to persist screener cache");
        }
        Ok(candidates)
    }

    /// Analyze one pair end to end. None means "no actionable signal", a
    /// normal outcome.
    async fn analyze_pair(
        &mut self,
        symbol1: &str,
        symbol2: &str,
    ) -> Result<Option<Recommendation>, AnalysisError> {
        let timeframe = self.config.pairs.timeframe.clone();
        let limit = self.config.pairs.candle_limit;

        let series1 = self
            .provider
            .get_candles(symbol1, &timeframe, limit)
            .await
            .map_err(|e| AnalysisError::upstream(e.to_string()))?;
        let series2 = self
            .provider
            .get_candles(symbol2, &timeframe, limit)
            .await
            .map_err(|e| AnalysisError::upstream(e.to_string()))?;

        let aligned = align_pair(&series1, &series2);
        let (Some(&price_x), Some(&price_y)) =
            (aligned.x_closes.last(), aligned.y_closes.last())
        else {
            return Err(AnalysisError::upstream(
                "Aligned series empty (no timestamp overlap)",
            ));
        };

        let gen_config = SignalGenConfig::from(&self.config.strategy);
        let key = format!("{symbol1}-{symbol2}");
        let generator = self
            .generators
            .entry(key)
            .or_insert_with(|| SpreadSignalGenerator::new(gen_config, symbol2, symbol1));

        // A fresh generator seeds its |z| history from the fetched window so
        // the level calculator's empirical tail has data on the first cycle.
        generator.warm_up(&aligned);
        let signal = generator.generate(&aligned, None);
        if !signal.is_actionable() {
            return Ok(None);
        }
        signal.validate().map_err(AnalysisError::validation)?;

        // Minimum z-distance sanity gate.
        if signal.z_score.abs() < self.config.strategy.z_entry {
            return Err(AnalysisError::validation(format!(
                "Directional signal with |z| {:.2} below entry threshold {:.2}",
                signal.z_score.abs(),
                self.config.strategy.z_entry
            )));
        }

        let z_history = generator.state().abs_z_values();
        let levels = compute_levels(&LevelInputs {
            price_x,
            price_y,
            beta: signal.beta,
            spread_mean: signal.spread_mean,
            spread_std: signal.spread_std,
            z_entry: self.config.strategy.z_entry,
            direction: signal.direction,
            z_history: &z_history,
            min_sl_buffer: self.config.strategy.min_sl_buffer,
        })?;

        Self::validate_level_ordering(signal.direction, &levels.spread)?;

        let Some(risk_reward) = Recommendation::risk_reward(
            levels.leg_y.entry,
            levels.leg_y.stop_loss,
            levels.leg_y.take_profit_full,
        ) else {
            return Err(AnalysisError::degenerate(
                "Degenerate stop distance in leg prices",
            ));
        };

        Ok(Some(Self::build_recommendation(
            &signal,
            &self.config,
            levels.leg_y.entry,
            levels.leg_y.stop_loss,
            levels.leg_y.take_profit_full,
            risk_reward,
        )))
    }

    /// Entry/SL/TP must be monotonically consistent with direction.
    fn validate_level_ordering(
        direction: Direction,
        levels: &SpreadLevels,
    ) -> Result<(), AnalysisError> {
        let ordered = match direction {
            Direction::LongSpread => {
                levels.stop_loss < levels.entry
                    && levels.entry < levels.take_profit_partial
                    && levels.take_profit_partial < levels.take_profit_full
            }
            Direction::ShortSpread => {
                levels.stop_loss > levels.entry
                    && levels.entry > levels.take_profit_partial
                    && levels.take_profit_partial > levels.take_profit_full
            }
            Direction::Hold => false,
        };
        if !ordered {
            return Err(AnalysisError::validation(format!(
                "Levels not monotone for {:?}: {:?}",
                direction, levels
            )));
        }
        Ok(())
    }

    fn build_recommendation(
        signal: &SpreadSignal,
        config: &Config,
        entry_price: f64,
        stop_loss: f64,
        take_profit: f64,
        risk_reward: f64,
    ) -> Recommendation {
        Recommendation {
            symbol: signal.symbol.clone(),
            pair_symbol: signal.pair_symbol.clone(),
            direction: signal.direction,
            confidence: signal.confidence,
            entry_price,
            stop_loss,
            take_profit,
            risk_reward,
            metadata: RecommendationMetadata {
                beta: signal.beta,
                spread_mean: signal.spread_mean,
                spread_std: signal.spread_std,
                z_score_at_entry: signal.z_score,
                z_exit_threshold: config.strategy.z_exit,
                max_spread_deviation: config.strategy.max_spread_deviation,
            },
        }
    }

    /// Exit check for the monitoring loop; delegates to the ExitMonitor
    /// using the position's frozen statistics.
    pub fn check_exit(
        &self,
        position: &OpenSpreadPosition,
        leg_close: f64,
        pair_leg_close: Option<f64>,
    ) -> ExitDecision {
        ExitMonitor::should_exit(position, leg_close, pair_leg_close)
    }

    /// Fetch the latest closes for both legs and run the exit check.
    pub async fn check_exit_live(&self, position: &OpenSpreadPosition) -> ExitDecision {
        let timeframe = &self.config.pairs.timeframe;

        let leg_close = match self.provider.get_candles(&position.symbol, timeframe, 1).await {
            Ok(series) => series.last().map(|c| c.close),
            Err(e) => {
                warn!(symbol = %position.symbol, error = %e, "Leg close fetch failed");
                None
            }
        };
        let Some(leg_close) = leg_close else {
            warn!(symbol = %position.symbol, "Own leg close unavailable, holding");
            return ExitDecision {
                should_exit: false,
                reason: crate::monitor::ExitReason::NoExit,
                z_score: None,
                threshold: None,
                spread: None,
            };
        };

        let pair_leg_close = match self
            .provider
            .get_candles(&position.pair_symbol, timeframe, 1)
            .await
        {
            Ok(series) => series.last().map(|c| c.close),
            Err(e) => {
                warn!(symbol = %position.pair_symbol, error = %e, "Pair leg close fetch failed");
                None
            }
        };

        ExitMonitor::should_exit(position, leg_close, pair_leg_close)
    }
}
