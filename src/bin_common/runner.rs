//! Strategy lifecycle runner
//!
//! Drives `initialize` → `start` → `stop` with the banners every binary
//! prints.

use demon::{Strategy, StrategyContext};
use tracing::{error, info};

/// Print startup banner
pub fn print_banner(name: &str, description: &str) {
    info!("");
    info!("========================================");
    info!("Starting {}", name);
    info!("{}", description);
    info!("Press Ctrl+C to stop");
    info!("========================================");
    info!("");
}

/// Print shutdown banner
pub fn print_shutdown(name: &str) {
    info!("");
    info!("========================================");
    info!("{} stopped", name);
    info!("========================================");
}

/// Run a strategy to completion.
///
/// An initialization failure returns immediately. Once started, `stop` runs
/// even if `start` failed, and the `start` error is returned afterwards.
pub async fn run_strategy(strategy: &mut dyn Strategy, ctx: &StrategyContext) -> anyhow::Result<()> {
    info!("Initializing strategy: {}", strategy.name());
    if let Err(e) = strategy.initialize(ctx).await {
        error!("Strategy initialization failed: {}", e);
        return Err(e.into());
    }

    info!("Starting strategy: {}", strategy.name());
    let result = strategy.start(ctx).await;
    if let Err(e) = &result {
        error!("Strategy execution failed: {}", e);
    }

    info!("Stopping strategy: {}", strategy.name());
    if let Err(e) = strategy.stop(ctx).await {
        error!("Strategy stop failed: {}", e);
    }

    result.map_err(Into::into)
}
