//! Persistence layer.
//!
//! Saves and loads ledger state to/from a JSON file. The ledger is the
//! source of truth while the process runs; snapshots exist so balances
//! and bet history survive a restart.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

use crate::ledger::LedgerState;

/// Default state file path.
const DEFAULT_STATE_FILE: &str = "bookline_state.json";

/// Save ledger state to a JSON file.
pub fn save_state(state: &LedgerState, path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_STATE_FILE);
    let json = serde_json::to_string_pretty(state)
        .context("Failed to serialise ledger state")?;

    std::fs::write(path, &json)
        .context(format!("Failed to write state to {path}"))?;

    debug!(path, users = state.users.len(), bets = state.bets.len(), "State saved");
    Ok(())
}

/// Load ledger state from a JSON file.
/// Returns None if the file doesn't exist (fresh start).
pub fn load_state(path: Option<&str>) -> Result<Option<LedgerState>> {
    let path = path.unwrap_or(DEFAULT_STATE_FILE);

    if !Path::new(path).exists() {
        info!(path, "No saved state found, starting fresh");
        return Ok(None);
    }

    let json = std::fs::read_to_string(path)
        .context(format!("Failed to read state from {path}"))?;

    let state: LedgerState = serde_json::from_str(&json)
        .context(format!("Failed to parse state from {path}"))?;

    info!(
        path,
        users = state.users.len(),
        bets = state.bets.len(),
        "State loaded from disk"
    );

    Ok(Some(state))
}

/// Delete the state file (for testing or reset).
pub fn delete_state(path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_STATE_FILE);
    if Path::new(path).exists() {
        std::fs::remove_file(path)
            .context(format!("Failed to delete state file {path}"))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
