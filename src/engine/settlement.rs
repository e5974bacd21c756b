//! Batch settlement for finished games.
//!
//! Fetches the game from the oracle, grades every pending bet for it, and
//! applies payouts through the ledger. One bad bet never stops the batch:
//! failures are collected per bet and reported alongside the successes.

use std::sync::Arc;
use tracing::{error, info};

use crate::ledger::Ledger;
use crate::oracle::GameOracle;
use crate::types::{
    Bet, BetError, FailedSettlement, Game, GameStatus, SettledBet, SettlementReport,
};

use super::strategy::{SettleContext, StrategyRegistry};

pub struct SettlementOrchestrator {
    registry: Arc<StrategyRegistry>,
    oracle: Arc<dyn GameOracle>,
    ledger: Arc<Ledger>,
}

impl SettlementOrchestrator {
    pub fn new(
        registry: Arc<StrategyRegistry>,
        oracle: Arc<dyn GameOracle>,
        ledger: Arc<Ledger>,
    ) -> Self {
        Self {
            registry,
            oracle,
            ledger,
        }
    }

    /// Settle every pending bet on `game_id`.
    ///
    /// Errors out only when the game itself is unusable (unknown, not
    /// finished, oracle unreachable). Per-bet problems land in the
    /// report's `failed` list and the batch keeps going. Re-running on
    /// the same game is safe: already-settled bets are no longer
    /// pending, so the second pass settles zero.
    pub async fn settle_game(&self, game_id: &str) -> Result<SettlementReport, BetError> {
        info!(game_id = %game_id, "Settling bets for game");

        let games = self
            .oracle
            .games_by_ids(&[game_id.to_string()])
            .await
            .map_err(|e| BetError::Oracle(e.to_string()))?;
        let game = games
            .into_iter()
            .find(|g| g.id == game_id)
            .ok_or_else(|| BetError::GameNotFound(game_id.to_string()))?;

        if game.status != GameStatus::Finished {
            return Err(BetError::GameNotFinished(game_id.to_string()));
        }

        let pending = self.ledger.pending_bets(game_id).await;
        if pending.is_empty() {
            info!(game_id = %game_id, "No pending bets to settle");
            return Ok(SettlementReport::new(game_id, Vec::new(), Vec::new()));
        }

        let mut settled: Vec<SettledBet> = Vec::new();
        let mut failed: Vec<FailedSettlement> = Vec::new();

        for bet in pending {
            match self.settle_one(&bet, &game).await {
                Ok(entry) => settled.push(entry),
                Err(err) => {
                    error!(bet_id = %bet.id, error = %err, "Failed to settle bet");
                    failed.push(FailedSettlement {
                        bet_id: bet.id.clone(),
                        user_id: bet.user_id.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        let report = SettlementReport::new(game_id, settled, failed);
        info!(
            game_id = %game_id,
            settled = report.settled.len(),
            failed = report.failed.len(),
            "Settlement complete"
        );
        Ok(report)
    }

    /// Grade and pay one bet. The ledger's `settle` claims the bet by
    /// flipping it out of pending, so a concurrent settlement of the
    /// same game pays each bet at most once.
    async fn settle_one(&self, bet: &Bet, game: &Game) -> Result<SettledBet, BetError> {
        let (home_score, away_score) = match (game.home_score, game.away_score) {
            (Some(h), Some(a)) => (h, a),
            _ => return Err(BetError::MissingScore(game.id.clone())),
        };

        let ctx = SettleContext {
            selection: bet.selection,
            home_score,
            away_score,
            home_team: &game.home_team,
            away_team: &game.away_team,
        };
        let outcome = self.registry.strategy(bet.bet_type).settle(&ctx);
        let payout = bet.payout_for(outcome.result);

        let settled = self.ledger.settle(&bet.id, outcome.result, payout).await?;
        info!(
            bet_id = %settled.id,
            result = ?outcome.result,
            payout = %payout,
            "Bet settled"
        );
        Ok(SettledBet {
            bet: settled,
            message: outcome.message,
            payout,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
