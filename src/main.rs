//! Ben Ton Headless Client
//!
//! Runs one scripted session against the configured ledger: connects a
//! wallet, plays a game with headless collaborators, submits the score and
//! shows the leaderboard in the log.

use tracing::info;
use tracing_subscriber::EnvFilter;

use ben_ton::{
    headless::{DemoWorld, LogDisplay, ScriptedInput, SilentSound},
    FrameLoop, GameConfig, HttpLedger, LedgerWorker, VERSION,
};

#[cfg(feature = "debug-tracing")]
const DEFAULT_FILTER: &str = "debug";
#[cfg(not(feature = "debug-tracing"))]
const DEFAULT_FILTER: &str = "info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .init();

    info!("Ben Ton v{}", VERSION);

    let config = GameConfig::from_env()?;
    info!("Node: {}", config.ledger.node_url);
    info!(
        "Faucet: {}",
        config.ledger.faucet_url.as_deref().unwrap_or("disabled")
    );
    info!(
        "Score module: {}::{}",
        config.ledger.contract_address, config.ledger.module_name
    );

    let ledger = LedgerWorker::new(HttpLedger::new(&config.ledger), &config.ledger).spawn();

    let frame = FrameLoop::new(
        config.frame,
        ledger,
        Box::new(DemoWorld::default()),
        Box::new(LogDisplay::new()),
        Box::new(SilentSound),
    );
    let session = frame.run(ScriptedInput::demo()).await;

    info!(
        "Session {} finished: last score {:?}, on chain {:?}",
        session.id, session.last_score, session.recorded_score
    );
    Ok(())
}
