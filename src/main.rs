//! BOOKLINE — Sportsbook Bet Placement and Settlement Engine
//!
//! Entry point. Loads configuration, initialises structured logging,
//! restores the ledger from disk (or seeds fresh accounts), wires the
//! placement and settlement services, and runs the API server plus the
//! game-finished event intake with graceful shutdown.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use bookline::api::{self, ApiState};
use bookline::config;
use bookline::engine::{PlacementService, SettlementOrchestrator, StakeValidator, StrategyRegistry};
use bookline::events::{EventIntake, InboundEvent};
use bookline::ledger::Ledger;
use bookline::oracle::http::HttpGameOracle;
use bookline::oracle::GameOracle;
use bookline::storage;

const BANNER: &str = r#"
 ____   ___   ___  _  ___     ___ _   _ _____
| __ ) / _ \ / _ \| |/ / |   |_ _| \ | | ____|
|  _ \| | | | | | | ' /| |    | ||  \| |  _|
| |_) | |_| | |_| | . \| |___ | || |\  | |___
|____/ \___/ \___/|_|\_\_____|___|_| \_|_____|

  Bet Placement & Settlement Engine
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = config::AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    // Print startup banner
    println!("{BANNER}");
    info!(
        min_bet = %cfg.betting.min_bet_amount,
        max_bet = %cfg.betting.max_bet_amount,
        oracle_url = %cfg.oracle.base_url,
        "BOOKLINE starting up"
    );

    // -- Restore or seed the ledger --------------------------------------

    let ledger = match storage::load_state(Some(&cfg.storage.state_file))? {
        Some(state) => {
            info!(
                users = state.users.len(),
                bets = state.bets.len(),
                "Resumed from saved state"
            );
            Arc::new(Ledger::restore(state))
        }
        None => {
            let ledger = Arc::new(Ledger::new());
            for username in &cfg.betting.seed_users {
                let user = ledger
                    .create_user(username, cfg.betting.default_user_balance)
                    .await;
                info!(user_id = %user.id, username = %user.username, balance = %user.balance, "Seeded user");
            }
            ledger
        }
    };

    // -- Wire services ----------------------------------------------------

    let oracle: Arc<dyn GameOracle> = Arc::new(HttpGameOracle::new(
        &cfg.oracle.base_url,
        cfg.oracle.timeout_secs,
    )?);
    let registry = Arc::new(StrategyRegistry::new());

    let placement = Arc::new(PlacementService::new(
        StakeValidator::from_config(&cfg.betting),
        Arc::clone(&registry),
        Arc::clone(&oracle),
        Arc::clone(&ledger),
    ));
    let settlement = Arc::new(SettlementOrchestrator::new(
        registry,
        oracle,
        Arc::clone(&ledger),
    ));

    // -- Event intake ------------------------------------------------------

    let (event_tx, event_rx) = tokio::sync::mpsc::channel::<InboundEvent>(64);
    let intake = EventIntake::new(Arc::clone(&settlement));
    let intake_task = tokio::spawn(intake.run(event_rx));
    // Held for the process lifetime; a broker bridge would clone this
    // sender to deliver game-finished events.
    let _event_tx = event_tx;

    // -- API server --------------------------------------------------------

    if cfg.server.enabled {
        let state = Arc::new(ApiState {
            placement,
            settlement,
            ledger: Arc::clone(&ledger),
        });
        api::spawn_server(state, cfg.server.port)?;
    }

    // -- Run until shutdown ------------------------------------------------

    let mut snapshot_interval = tokio::time::interval(Duration::from_secs(30));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("Engine running. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            _ = snapshot_interval.tick() => {
                if let Err(e) = storage::save_state(&ledger.snapshot().await, Some(&cfg.storage.state_file)) {
                    error!(error = %e, "Failed to save state");
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    // Close the event channel so the intake drains and exits.
    drop(_event_tx);
    let _ = intake_task.await;

    // Save final state
    storage::save_state(&ledger.snapshot().await, Some(&cfg.storage.state_file))?;
    info!("BOOKLINE shut down cleanly.");

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bookline=info"));

    let json_logging = std::env::var("BOOKLINE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
