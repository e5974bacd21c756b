//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! The engine receives its limits as a value object at startup; nothing
//! here is mutated at runtime.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fs;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub betting: BettingConfig,
    pub oracle: OracleConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

/// Stake policy and user bootstrap.
#[derive(Debug, Deserialize, Clone)]
pub struct BettingConfig {
    #[serde(default = "default_min_bet")]
    pub min_bet_amount: Decimal,
    #[serde(default = "default_max_bet")]
    pub max_bet_amount: Decimal,
    /// Balance granted to seeded accounts on a fresh start.
    #[serde(default = "default_user_balance")]
    pub default_user_balance: Decimal,
    /// Usernames seeded into the ledger when no saved state exists.
    #[serde(default)]
    pub seed_users: Vec<String>,
}

fn default_min_bet() -> Decimal {
    dec!(1)
}

fn default_max_bet() -> Decimal {
    dec!(500)
}

fn default_user_balance() -> Decimal {
    dec!(1000)
}

/// Where the odds-service oracle lives and how long to wait for it.
#[derive(Debug, Deserialize, Clone)]
pub struct OracleConfig {
    pub base_url: String,
    #[serde(default = "default_oracle_timeout")]
    pub timeout_secs: u64,
}

fn default_oracle_timeout() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub enabled: bool,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub state_file: String,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }
}
