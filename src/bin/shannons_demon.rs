//! Shannon's Demon - market maker binary
//!
//! Usage:
//!   DEMON_CONFIG_PATH=config/demon.yaml ./shannons-demon
//!   ./shannons-demon path/to/config.yaml

use anyhow::Result;
use demon::{
    init_tracing_with_level, BinanceClient, BinanceCredentials, DemonConfig, JsonStateStore, LogSink,
    RebalancerStrategy, ShutdownManager, Strategy, StrategyContext,
};
use shannons_demon::bin_common::{config_path_from_process, print_banner, print_shutdown, run_strategy};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let (config_path, source) = config_path_from_process();
    let config = DemonConfig::load(&config_path)?;

    init_tracing_with_level(&config.log_level);
    info!("Config: {} (from {})", config_path.display(), source);
    config.log();

    let credentials = BinanceCredentials::from_env()?;
    let exchange = Arc::new(BinanceClient::new(&config.exchange, credentials)?);
    let store = Arc::new(JsonStateStore::new(config.state_path.clone()));
    let sink = Arc::new(LogSink::new());

    let shutdown = Arc::new(ShutdownManager::new());
    shutdown.spawn_signal_handler();

    let ctx = StrategyContext::new(exchange, store, sink, shutdown);
    let mut strategy = RebalancerStrategy::new(config);

    print_banner(strategy.name(), strategy.description());
    let result = run_strategy(&mut strategy, &ctx).await;
    print_shutdown(strategy.name());

    result
}
