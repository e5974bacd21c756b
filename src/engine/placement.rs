//! Bet placement flow.
//!
//! Runs the full placement pipeline: stake validation, balance fast-fail,
//! game validity, duplicate guard, odds resolution, potential-win
//! computation, and finally the ledger's atomic debit-and-create unit.
//! No side effect happens before that final step.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::ledger::{BetDraft, Ledger};
use crate::oracle::GameOracle;
use crate::types::{Bet, BetError, BetType, Selection};

use super::strategy::StrategyRegistry;
use super::validator::StakeValidator;

/// Inbound placement request. `bet_type` and `selection` arrive as raw
/// tags and are parsed into the closed enums here, so malformed input is
/// a typed error before anything else runs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBetRequest {
    pub user_id: String,
    pub game_id: String,
    pub bet_type: String,
    pub selection: String,
    pub amount: Decimal,
}

pub struct PlacementService {
    validator: StakeValidator,
    registry: Arc<StrategyRegistry>,
    oracle: Arc<dyn GameOracle>,
    ledger: Arc<Ledger>,
}

impl PlacementService {
    pub fn new(
        validator: StakeValidator,
        registry: Arc<StrategyRegistry>,
        oracle: Arc<dyn GameOracle>,
        ledger: Arc<Ledger>,
    ) -> Self {
        Self {
            validator,
            registry,
            oracle,
            ledger,
        }
    }

    /// Place a bet.
    ///
    /// The balance read here is a fast-fail against the obviously broke;
    /// the ledger re-checks and debits under one lock, so a concurrent
    /// placement that drains the account between the read and the debit
    /// still fails cleanly.
    pub async fn place_bet(&self, req: PlaceBetRequest) -> Result<Bet, BetError> {
        info!(
            user_id = %req.user_id,
            game_id = %req.game_id,
            amount = %req.amount,
            "Placing bet"
        );

        // 1. Stake policy.
        self.validator.validate(req.amount)?;

        // 2. Parse the tags into the closed enums.
        let bet_type: BetType = req.bet_type.parse()?;
        let selection: Selection = req.selection.parse()?;

        // 3. Balance fast-fail, before any oracle traffic.
        let user = self.ledger.get_user(&req.user_id).await?;
        if user.balance < req.amount {
            return Err(BetError::InsufficientBalance {
                available: user.balance,
                required: req.amount,
            });
        }

        // 4. Game must be open for betting.
        let validation = self
            .oracle
            .validate_game(&req.game_id)
            .await
            .map_err(|e| BetError::Oracle(e.to_string()))?;
        if !validation.is_valid {
            warn!(game_id = %req.game_id, reason = %validation.message, "Game rejected for betting");
            return Err(BetError::GameNotValid(validation.message));
        }

        // 5. Duplicate guard: one bet per (user, game, selection), ever.
        if self
            .ledger
            .bet_exists(&req.user_id, &req.game_id, selection)
            .await
        {
            return Err(BetError::DuplicateBet);
        }

        // 6. Resolve odds for the chosen selection.
        let odds = self
            .oracle
            .game_odds(&req.game_id)
            .await
            .map_err(|e| BetError::Oracle(e.to_string()))?;
        let odds = odds
            .for_selection(selection)
            .ok_or_else(|| BetError::OddsUnavailable {
                game_id: req.game_id.clone(),
                selection,
            })?;

        // 7. Freeze the potential win at placement time.
        let potential_win = self
            .registry
            .strategy(bet_type)
            .potential_win(req.amount, odds);

        // 8. Atomic unit: conditional debit + bet creation.
        let bet = self
            .ledger
            .place(BetDraft {
                user_id: req.user_id,
                game_id: req.game_id,
                bet_type,
                selection,
                amount: req.amount,
                odds,
                potential_win,
            })
            .await?;

        info!(bet_id = %bet.id, "Bet placed successfully");
        Ok(bet)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
