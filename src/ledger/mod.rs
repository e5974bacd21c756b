//! Ledger — atomic bet/balance state transitions.
//!
//! The ledger owns the two monetary invariants of the engine: a placement
//! debits the user and creates the bet as one unit, and a settlement
//! updates the bet and credits the payout as one unit. All mutations run
//! under a single write lock over the whole state, so no interleaving can
//! observe a half-applied unit.
//!
//! The balance check is performed inside the placement unit ("debit if
//! sufficient funds"), so two concurrent placements by the same user can
//! never both pass a stale read and overdraw the account.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::types::{Bet, BetError, BetResult, BetStatus, BetType, Selection, UserAccount};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// The full serializable engine state, snapshotted to disk by `storage`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerState {
    pub users: HashMap<String, UserAccount>,
    pub bets: HashMap<String, Bet>,
    /// Uniqueness index over (user_id, game_id, selection). Entries are
    /// never removed: even a settled bet permanently blocks an identical
    /// selection for that game.
    pub placed: HashSet<(String, String, Selection)>,
}

/// Everything the ledger needs to create a bet. Odds and potential win
/// arrive already computed and are frozen as-is.
#[derive(Debug, Clone)]
pub struct BetDraft {
    pub user_id: String,
    pub game_id: String,
    pub bet_type: BetType,
    pub selection: Selection,
    pub amount: Decimal,
    pub odds: Decimal,
    pub potential_win: Decimal,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Shared, lock-guarded engine state.
pub struct Ledger {
    state: RwLock<LedgerState>,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
        }
    }

    /// Rebuild a ledger from a persisted snapshot.
    pub fn restore(state: LedgerState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Clone the current state for snapshotting.
    pub async fn snapshot(&self) -> LedgerState {
        self.state.read().await.clone()
    }

    // -- Users -----------------------------------------------------------

    /// Create a user account with an opening balance. Returns the existing
    /// account unchanged if the username is already present (bootstrap is
    /// idempotent across restarts).
    pub async fn create_user(&self, username: &str, balance: Decimal) -> UserAccount {
        let mut state = self.state.write().await;

        if let Some(existing) = state.users.values().find(|u| u.username == username) {
            return existing.clone();
        }

        let user = UserAccount {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            balance,
        };
        info!(user_id = %user.id, username, balance = %balance, "User created");
        state.users.insert(user.id.clone(), user.clone());
        user
    }

    pub async fn get_user(&self, user_id: &str) -> Result<UserAccount, BetError> {
        self.state
            .read()
            .await
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| BetError::UserNotFound(user_id.to_string()))
    }

    pub async fn balance_of(&self, user_id: &str) -> Result<Decimal, BetError> {
        Ok(self.get_user(user_id).await?.balance)
    }

    // -- Duplicate guard ---------------------------------------------------

    /// Whether a bet already exists for this (user, game, selection) triple,
    /// regardless of its status.
    pub async fn bet_exists(
        &self,
        user_id: &str,
        game_id: &str,
        selection: Selection,
    ) -> bool {
        self.state.read().await.placed.contains(&(
            user_id.to_string(),
            game_id.to_string(),
            selection,
        ))
    }

    // -- Atomic units ------------------------------------------------------

    /// Place a bet: conditional debit plus bet creation, all-or-nothing.
    ///
    /// The duplicate check and the balance check are both re-evaluated
    /// under the write lock; the earlier flow-level checks are only
    /// fast-fail conveniences.
    pub async fn place(&self, draft: BetDraft) -> Result<Bet, BetError> {
        let mut state = self.state.write().await;

        let key = (
            draft.user_id.clone(),
            draft.game_id.clone(),
            draft.selection,
        );
        if state.placed.contains(&key) {
            return Err(BetError::DuplicateBet);
        }

        let user = state
            .users
            .get_mut(&draft.user_id)
            .ok_or_else(|| BetError::UserNotFound(draft.user_id.clone()))?;

        if user.balance < draft.amount {
            return Err(BetError::InsufficientBalance {
                available: user.balance,
                required: draft.amount,
            });
        }
        user.balance -= draft.amount;

        let now = Utc::now();
        let bet = Bet {
            id: Uuid::new_v4().to_string(),
            user_id: draft.user_id,
            game_id: draft.game_id,
            bet_type: draft.bet_type,
            selection: draft.selection,
            amount: draft.amount,
            odds: draft.odds,
            potential_win: draft.potential_win,
            status: BetStatus::Pending,
            result: BetResult::Pending,
            created_at: now,
            updated_at: now,
            settled_at: None,
        };

        state.placed.insert(key);
        state.bets.insert(bet.id.clone(), bet.clone());

        info!(
            bet_id = %bet.id,
            user_id = %bet.user_id,
            game_id = %bet.game_id,
            amount = %bet.amount,
            odds = %bet.odds,
            potential_win = %bet.potential_win,
            "Bet placed"
        );

        Ok(bet)
    }

    /// Settle one bet: claim it via its PENDING status, record the result,
    /// and credit the payout (if any) — all-or-nothing.
    ///
    /// A bet already settled by a concurrent invocation yields
    /// `AlreadySettled`, which callers treat as "someone else got here
    /// first", not data loss.
    pub async fn settle(
        &self,
        bet_id: &str,
        result: BetResult,
        payout: Decimal,
    ) -> Result<Bet, BetError> {
        let mut state = self.state.write().await;

        let bet = state
            .bets
            .get_mut(bet_id)
            .ok_or_else(|| BetError::BetNotFound(bet_id.to_string()))?;

        if bet.status != BetStatus::Pending {
            return Err(BetError::AlreadySettled(bet_id.to_string()));
        }

        let user_id = bet.user_id.clone();
        if payout > Decimal::ZERO && !state.users.contains_key(&user_id) {
            return Err(BetError::UserNotFound(user_id));
        }

        let bet = state
            .bets
            .get_mut(bet_id)
            .ok_or_else(|| BetError::BetNotFound(bet_id.to_string()))?;
        let now = Utc::now();
        bet.status = BetStatus::Settled;
        bet.result = result;
        bet.settled_at = Some(now);
        bet.updated_at = now;
        let settled = bet.clone();

        // LOST pays nothing, so there is no balance write at all.
        if payout > Decimal::ZERO {
            if let Some(user) = state.users.get_mut(&settled.user_id) {
                user.balance += payout;
            }
        }

        debug!(
            bet_id = %settled.id,
            result = %result,
            payout = %payout,
            "Bet settled"
        );

        Ok(settled)
    }

    // -- Queries -----------------------------------------------------------

    /// All PENDING bets for a game, in arbitrary order.
    pub async fn pending_bets(&self, game_id: &str) -> Vec<Bet> {
        self.state
            .read()
            .await
            .bets
            .values()
            .filter(|b| b.game_id == game_id && b.is_pending())
            .cloned()
            .collect()
    }

    /// All of a user's bets, newest first.
    pub async fn bets_by_user(&self, user_id: &str) -> Vec<Bet> {
        let mut bets: Vec<Bet> = self
            .state
            .read()
            .await
            .bets
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        bets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        bets
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
