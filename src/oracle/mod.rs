//! Game oracle integration.
//!
//! Defines the `GameOracle` trait — the engine's request/response seam to
//! the external authority for game validity, current odds, and final
//! scores — and provides the HTTP client implementation against the
//! odds service.

pub mod http;

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Game;

/// Verdict on whether a game is open for betting.
///
/// A game is valid only if it exists, its status is UPCOMING, and the
/// current time is before its scheduled start; `message` says which rule
/// failed otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameValidation {
    pub is_valid: bool,
    pub message: String,
}

/// Current decimal odds for a game's three-way market.
///
/// `draw_odds` is absent for markets without a draw price; a draw
/// selection against such a market fails before any ledger activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameOdds {
    pub home_odds: Decimal,
    pub away_odds: Decimal,
    pub draw_odds: Option<Decimal>,
}

/// Abstraction over the external game authority.
///
/// The engine never writes game state; it only reads validity, odds, and
/// final results through this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameOracle: Send + Sync {
    /// Check whether a game is currently open for betting.
    async fn validate_game(&self, game_id: &str) -> Result<GameValidation>;

    /// Fetch the current market odds for a game.
    async fn game_odds(&self, game_id: &str) -> Result<GameOdds>;

    /// Fetch games by id (status, scores, team names). Returns an empty
    /// list when nothing matches.
    async fn games_by_ids(&self, game_ids: &[String]) -> Result<Vec<Game>>;
}

impl GameOdds {
    /// Odds for a given selection, if the market prices it.
    pub fn for_selection(&self, selection: crate::types::Selection) -> Option<Decimal> {
        match selection {
            crate::types::Selection::Home => Some(self.home_odds),
            crate::types::Selection::Away => Some(self.away_odds),
            crate::types::Selection::Draw => self.draw_odds,
        }
    }
}
