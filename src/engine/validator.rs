//! Stake validation.
//!
//! Enforces the configured minimum/maximum bet-amount policy. Pure —
//! no side effects, no I/O. Balance sufficiency is a separate placement
//! step and is ultimately enforced by the ledger's conditional debit.

use rust_decimal::Decimal;

use crate::config::BettingConfig;
use crate::types::BetError;

/// Min/max stake policy, fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct StakeValidator {
    min: Decimal,
    max: Decimal,
}

impl StakeValidator {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    pub fn from_config(cfg: &BettingConfig) -> Self {
        Self::new(cfg.min_bet_amount, cfg.max_bet_amount)
    }

    /// Accepts amounts in the inclusive range [min, max].
    pub fn validate(&self, amount: Decimal) -> Result<(), BetError> {
        if amount < self.min {
            return Err(BetError::BelowMinimum { min: self.min });
        }
        if amount > self.max {
            return Err(BetError::AboveMaximum { max: self.max });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
