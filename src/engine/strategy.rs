//! Settlement strategies.
//!
//! A strategy computes the potential payout at placement time and the
//! outcome at settlement time. The registry maps each `BetType` variant
//! to its strategy with a total match — there is no default dispatch, so
//! an unsupported bet type cannot silently settle as a moneyline.

use rust_decimal::Decimal;

use crate::types::{BetResult, BetType, Selection, SettlementOutcome};

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// Everything a strategy needs to resolve a bet once scores are known.
#[derive(Debug, Clone)]
pub struct SettleContext<'a> {
    pub selection: Selection,
    pub home_score: u32,
    pub away_score: u32,
    pub home_team: &'a str,
    pub away_team: &'a str,
}

pub trait SettlementStrategy: Send + Sync {
    /// Payout promised if the bet wins, computed from stake and odds.
    fn potential_win(&self, amount: Decimal, odds: Decimal) -> Decimal;

    /// Resolve the bet's outcome from the final state of the game.
    fn settle(&self, ctx: &SettleContext<'_>) -> SettlementOutcome;
}

// ---------------------------------------------------------------------------
// Moneyline
// ---------------------------------------------------------------------------

/// Resolves solely on which side won, or a draw.
///
/// A drawn game wins for a draw pick and pushes for a home/away pick:
/// no current bet type loses on a draw.
pub struct MoneylineStrategy;

impl SettlementStrategy for MoneylineStrategy {
    /// Decimal-odds convention: `amount * odds`.
    fn potential_win(&self, amount: Decimal, odds: Decimal) -> Decimal {
        amount * odds
    }

    fn settle(&self, ctx: &SettleContext<'_>) -> SettlementOutcome {
        let (result, message) = if ctx.home_score == ctx.away_score {
            if ctx.selection == Selection::Draw {
                (BetResult::Won, "Bet won - game ended in a draw".to_string())
            } else {
                (
                    BetResult::Push,
                    "Bet pushed - game ended in a draw".to_string(),
                )
            }
        } else if ctx.home_score > ctx.away_score {
            if ctx.selection == Selection::Home {
                (BetResult::Won, format!("Bet won - {} won", ctx.home_team))
            } else {
                (BetResult::Lost, format!("Bet lost - {} won", ctx.home_team))
            }
        } else if ctx.selection == Selection::Away {
            (BetResult::Won, format!("Bet won - {} won", ctx.away_team))
        } else {
            (BetResult::Lost, format!("Bet lost - {} won", ctx.away_team))
        };

        SettlementOutcome { result, message }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps each supported bet type to its settlement strategy.
pub struct StrategyRegistry {
    moneyline: MoneylineStrategy,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self {
            moneyline: MoneylineStrategy,
        }
    }

    /// Total over the closed `BetType` enum; adding a variant without a
    /// strategy is a compile error here, not a runtime fallback.
    pub fn strategy(&self, bet_type: BetType) -> &dyn SettlementStrategy {
        match bet_type {
            BetType::Moneyline => &self.moneyline,
        }
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
