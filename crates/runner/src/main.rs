//! tiller - run the market maker against the paper exchange
//!
//! ```text
//! tiller [config.json]
//! ```
//!
//! Without a path the embedded default configuration is used. Logging is
//! controlled through `RUST_LOG` (default `info`). Ctrl-C stops quoting and
//! cancels everything that is still resting.

use std::sync::Arc;

use log::info;
use tokio::sync::watch;

use tiller_clock::SystemClock;
use tiller_gateway::{PaperExchange, PaperExchangeConfig};
use tiller_ports::Clock;
use tiller_runner::config::{load_config, load_default_config};
use tiller_runner::{MarketMaker, PulseScheduler, RandomWalkSource, log_pulse_events};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading config from {}", path);
            load_config(&path)?
        }
        None => {
            info!("No config given, using embedded defaults");
            load_default_config()?
        }
    };
    config.validate()?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let exchange = Arc::new(PaperExchange::new(PaperExchangeConfig {
        visibility_lag: config.paper.visibility_lag,
    }));

    let market_maker = MarketMaker::new(
        config.market.clone(),
        config.cycle.clone(),
        Arc::new(config.quoting.build_chain()),
        exchange.clone(),
        exchange.clone(),
        clock.clone(),
    )?;

    let event_logger = tokio::spawn(log_pulse_events(market_maker.subscribe()));

    let source = RandomWalkSource::new(config.market.clone(), config.paper.clone(), clock);
    let scheduler = PulseScheduler::new(config.scheduler_config(), market_maker, source);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx));

    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received, stopping");
    let _ = shutdown_tx.send(true);

    let stats = scheduler_handle.await?;
    event_logger.abort();

    info!(
        "Done: {} pulses, {} completed, {} skipped, {} failed ({} timed out); {} order(s) left resting",
        stats.pulses,
        stats.completed,
        stats.skipped,
        stats.failed,
        stats.timed_out,
        exchange.resting_orders().await.len()
    );
    Ok(())
}
