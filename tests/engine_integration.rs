//! Engine Integration Tests
//!
//! Verify the analysis components work together end to end:
//! 1. PairScreener -> ScreenerCache flow in auto-screen mode
//! 2. Orchestrator cycle: signal -> levels -> recommendation
//! 3. Recommendation metadata -> ExitMonitor round trip
//!
//! All tests are deterministic (no real network calls, seeded noise) and
//! run against the in-memory mock candle provider.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use spreadhound::application::Orchestrator;
use spreadhound::config::{
    Config, DataSection, LoggingSection, PairDiscoveryMode, PairsSection, ScreenerSection,
    StrategySection,
};
use spreadhound::domain::{Direction, OpenSpreadPosition};
use spreadhound::monitor::ExitReason;
use spreadhound::ports::{CandleDataProvider, MockCandleProvider};
use spreadhound::screener::cache::ScreenerCacheEntry;

// ============================================================================
// Test Fixtures
// ============================================================================

fn test_config(mode: PairDiscoveryMode, cache_path: &str) -> Config {
    Config {
        pairs: PairsSection {
            discovery_mode: mode,
            static_pairs: vec![["AAA".to_string(), "BBB".to_string()]],
            timeframe: "1h".to_string(),
            candle_limit: 240,
        },
        screener: ScreenerSection {
            min_data_points: 60,
            lookback: 200,
            min_volume_usd: 10.0,
            max_pairs: 5,
            batch_size: 20,
            cache_hours: 12.0,
            cache_path: cache_path.to_string(),
        },
        strategy: StrategySection {
            z_entry: 2.0,
            z_exit: 0.2,
            lookback: 60,
            use_adf_gate: false,
            adf_gate_interval: 10,
            dynamic_sizing: true,
            min_sl_buffer: 0.5,
            max_spread_deviation: 4.0,
            z_history_window: 500,
        },
        data: DataSection {
            data_dir: "data".to_string(),
        },
        logging: LoggingSection {
            level: "warn".to_string(),
            log_to_file: false,
            log_file: String::new(),
        },
    }
}

/// Cointegrated universe: BBB tracks 1.5x AAA plus an anti-persistent
/// spread around 20. Seeded noise keeps every run identical.
fn cointegrated_universe(n: usize) -> MockCandleProvider {
    let mut rng = StdRng::seed_from_u64(42);
    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    let mut spread_dev = 0.0f64;
    for i in 0..n {
        let px = 100.0 + 5.0 * ((i as f64) * 0.12).sin() + rng.gen_range(-0.5..0.5);
        spread_dev = -0.3 * spread_dev + 12.0 * rng.gen_range(-0.5..0.5);
        x.push(px);
        y.push(1.5 * px + 20.0 + spread_dev);
    }
    MockCandleProvider::new()
        .with_series(MockCandleProvider::series_from_closes("AAA", "1h", &x))
        .with_series(MockCandleProvider::series_from_closes("BBB", "1h", &y))
}

/// Pair whose spread sits at mean 10 with alternating +-1 deviations and a
/// controlled final deviation, so the closing z-score is predictable.
fn controlled_pair(n: usize, final_dev: f64) -> MockCandleProvider {
    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    for i in 0..n {
        let mut dev = if i % 2 == 0 { 1.0 } else { -1.0 };
        if i == n - 1 {
            dev = final_dev;
        }
        x.push(100.0);
        y.push(100.0 + 10.0 + dev);
    }
    MockCandleProvider::new()
        .with_series(MockCandleProvider::series_from_closes("AAA", "1h", &x))
        .with_series(MockCandleProvider::series_from_closes("BBB", "1h", &y))
}

fn temp_cache(name: &str) -> String {
    std::env::temp_dir()
        .join(format!("spreadhound-it-{name}.json"))
        .to_string_lossy()
        .to_string()
}

// ============================================================================
// Screening + cache flow
// ============================================================================

#[tokio::test]
async fn auto_screen_cycle_discovers_pair_and_caches_it() {
    let cache_path = temp_cache("auto-screen");
    let _ = std::fs::remove_file(&cache_path);

    let config = test_config(PairDiscoveryMode::AutoScreen, &cache_path);
    let provider = Arc::new(cointegrated_universe(240));
    let mut orchestrator = Orchestrator::new(config, Arc::clone(&provider) as Arc<dyn CandleDataProvider>, "it");

    orchestrator.run_cycle().await.unwrap();

    // The screening result landed on disk keyed by instance and timeframe.
    let entry: ScreenerCacheEntry =
        serde_json::from_str(&std::fs::read_to_string(&cache_path).unwrap()).unwrap();
    assert_eq!(entry.instance, "it");
    assert_eq!(entry.timeframe, "1h");
    assert_eq!(entry.symbols_screened, 2);
    assert_eq!(entry.pairs.len(), 1);
    assert_eq!(entry.pairs[0].symbol1, "AAA");
    assert_eq!(entry.pairs[0].symbol2, "BBB");
    assert!((entry.pairs[0].beta - 1.5).abs() < 0.2);

    // First cycle: 2 universe fetches + 2 leg fetches. Second cycle reuses
    // the cache, so only the 2 leg fetches are added.
    assert_eq!(provider.get_calls().len(), 4);
    orchestrator.run_cycle().await.unwrap();
    assert_eq!(provider.get_calls().len(), 6);

    let _ = std::fs::remove_file(&cache_path);
}

#[tokio::test]
async fn no_cache_screen_ignores_fresh_entry() {
    let cache_path = temp_cache("no-cache");
    let _ = std::fs::remove_file(&cache_path);

    let config = test_config(PairDiscoveryMode::AutoScreen, &cache_path);
    let provider = Arc::new(cointegrated_universe(240));
    let orchestrator = Orchestrator::new(config, Arc::clone(&provider) as Arc<dyn CandleDataProvider>, "it");

    let first = orchestrator.screen(true).await.unwrap();
    assert_eq!(first.len(), 1);
    let fetches_after_first = provider.get_calls().len();

    // Cached path adds no fetches; bypassing the cache re-screens.
    orchestrator.screen(true).await.unwrap();
    assert_eq!(provider.get_calls().len(), fetches_after_first);
    orchestrator.screen(false).await.unwrap();
    assert!(provider.get_calls().len() > fetches_after_first);

    let _ = std::fs::remove_file(&cache_path);
}

// ============================================================================
// Cycle: signal -> levels -> recommendation
// ============================================================================

#[tokio::test]
async fn cycle_emits_internally_consistent_recommendation() {
    let config = test_config(PairDiscoveryMode::Static, &temp_cache("static"));
    let provider = Arc::new(controlled_pair(120, -5.0));
    let mut orchestrator = Orchestrator::new(config, provider, "it");

    let recommendations = orchestrator.run_cycle().await.unwrap();
    assert_eq!(recommendations.len(), 1);
    let rec = &recommendations[0];

    // Spread is deep below its mean: long the spread, buy leg Y.
    assert_eq!(rec.symbol, "BBB");
    assert_eq!(rec.pair_symbol, "AAA");
    assert_eq!(rec.direction, Direction::LongSpread);
    assert!(rec.metadata.z_score_at_entry < -2.0);
    assert!(rec.confidence > 0.95);

    // Level ordering and the published risk/reward agree with the prices.
    assert!(rec.stop_loss < rec.entry_price);
    assert!(rec.take_profit > rec.entry_price);
    let rr = (rec.take_profit - rec.entry_price).abs() / (rec.entry_price - rec.stop_loss).abs();
    assert!((rr - rec.risk_reward).abs() < 1e-9);

    // Frozen exit parameters come straight from the strategy config.
    assert_eq!(rec.metadata.z_exit_threshold, 0.2);
    assert_eq!(rec.metadata.max_spread_deviation, 4.0);
    assert!(rec.metadata.spread_std > 0.0);
}

#[tokio::test]
async fn quiet_market_produces_no_recommendations() {
    let config = test_config(PairDiscoveryMode::Static, &temp_cache("quiet"));
    let provider = Arc::new(controlled_pair(120, 0.4));
    let mut orchestrator = Orchestrator::new(config, provider, "it");

    let recommendations = orchestrator.run_cycle().await.unwrap();
    assert!(recommendations.is_empty());
}

#[tokio::test]
async fn recommendation_survives_json_round_trip() {
    let config = test_config(PairDiscoveryMode::Static, &temp_cache("roundtrip"));
    let provider = Arc::new(controlled_pair(120, 5.0));
    let mut orchestrator = Orchestrator::new(config, provider, "it");

    let recommendations = orchestrator.run_cycle().await.unwrap();
    let json = serde_json::to_string(&recommendations).unwrap();
    let back: Vec<spreadhound::domain::Recommendation> = serde_json::from_str(&json).unwrap();

    assert_eq!(back.len(), recommendations.len());
    assert_eq!(back[0].direction, Direction::ShortSpread);
    assert_eq!(back[0].entry_price, recommendations[0].entry_price);
    assert_eq!(
        back[0].metadata.z_score_at_entry,
        recommendations[0].metadata.z_score_at_entry
    );
}

// ============================================================================
// Recommendation metadata -> exit monitoring round trip
// ============================================================================

/// A filled recommendation becomes an open position; the monitor must read
/// the frozen metadata and exit when the spread reverts or blows out.
#[tokio::test]
async fn filled_recommendation_round_trips_through_exit_monitor() {
    let config = test_config(PairDiscoveryMode::Static, &temp_cache("exit"));
    let provider = Arc::new(controlled_pair(120, -5.0));
    let mut orchestrator = Orchestrator::new(config, provider, "it");

    let rec = orchestrator.run_cycle().await.unwrap().remove(0);
    let position = OpenSpreadPosition {
        symbol: rec.symbol.clone(),
        pair_symbol: rec.pair_symbol.clone(),
        beta: rec.metadata.beta,
        spread_mean: rec.metadata.spread_mean,
        spread_std: rec.metadata.spread_std,
        z_score_at_entry: rec.metadata.z_score_at_entry,
        z_exit_threshold: rec.metadata.z_exit_threshold,
        max_spread_deviation: rec.metadata.max_spread_deviation,
    };

    // Closes that put the spread at a chosen z, given pair leg at 100.
    let close_at_z = |z: f64| {
        position.spread_mean + z * position.spread_std + position.beta * 100.0
    };

    // Spread reverted home.
    let reverted = orchestrator.check_exit(&position, close_at_z(0.0), Some(100.0));
    assert!(reverted.should_exit);
    assert_eq!(reverted.reason, ExitReason::ZScoreExit);

    // Spread diverged far past the entry deviation.
    let entry_z = position.z_score_at_entry;
    let blown = orchestrator.check_exit(&position, close_at_z(entry_z - 5.0), Some(100.0));
    assert!(blown.should_exit);
    assert_eq!(blown.reason, ExitReason::DivergenceBlowup);

    // Still stretched but within tolerance: hold.
    let held = orchestrator.check_exit(&position, close_at_z(entry_z + 1.0), Some(100.0));
    assert!(!held.should_exit);
    assert_eq!(held.reason, ExitReason::NoExit);

    // Missing pair leg data never force-closes.
    let blind = orchestrator.check_exit(&position, close_at_z(0.0), None);
    assert!(!blind.should_exit);
}
