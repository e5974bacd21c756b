//! Shared types for the BOOKLINE engine.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that the oracle client, strategy,
//! ledger, and engine modules can depend on them without circular
//! references.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Selections & bet types
// ---------------------------------------------------------------------------

/// The side of a game a bet is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    Home,
    Away,
    Draw,
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Home => write!(f, "home"),
            Selection::Away => write!(f, "away"),
            Selection::Draw => write!(f, "draw"),
        }
    }
}

/// Case-insensitive parse; anything else is a typed validation error.
impl std::str::FromStr for Selection {
    type Err = BetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "home" => Ok(Selection::Home),
            "away" => Ok(Selection::Away),
            "draw" => Ok(Selection::Draw),
            _ => Err(BetError::InvalidSelection(s.to_string())),
        }
    }
}

/// Closed set of supported bet types.
///
/// Unrecognized tags are rejected when the request is parsed, so the
/// strategy registry never has to guess at a default. Spread and totals
/// markets get their own variants when their strategies land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BetType {
    Moneyline,
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetType::Moneyline => write!(f, "MONEYLINE"),
        }
    }
}

impl std::str::FromStr for BetType {
    type Err = BetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MONEYLINE" => Ok(BetType::Moneyline),
            _ => Err(BetError::UnknownBetType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Bet lifecycle
// ---------------------------------------------------------------------------

/// Bet lifecycle status. PENDING → SETTLED, terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BetStatus {
    Pending,
    Settled,
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetStatus::Pending => write!(f, "PENDING"),
            BetStatus::Settled => write!(f, "SETTLED"),
        }
    }
}

/// Bet outcome. PENDING until settlement, then terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BetResult {
    Pending,
    Won,
    Lost,
    Push,
}

impl fmt::Display for BetResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetResult::Pending => write!(f, "PENDING"),
            BetResult::Won => write!(f, "WON"),
            BetResult::Lost => write!(f, "LOST"),
            BetResult::Push => write!(f, "PUSH"),
        }
    }
}

/// A placed wager.
///
/// `odds` and `potential_win` are frozen at placement time and never
/// recomputed at settlement. `settled_at` is set exactly once, by the
/// ledger's settle unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bet {
    pub id: String,
    pub user_id: String,
    pub game_id: String,
    pub bet_type: BetType,
    pub selection: Selection,
    /// Stake (positive).
    pub amount: Decimal,
    /// Decimal-odds multiplier captured at placement time.
    pub odds: Decimal,
    /// `amount * odds`, precomputed by the strategy at placement.
    pub potential_win: Decimal,
    pub status: BetStatus,
    pub result: BetResult,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl fmt::Display for Bet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} on {} | stake={} @ {} → {} | {}/{}",
            self.id,
            self.bet_type,
            self.selection,
            self.game_id,
            self.amount,
            self.odds,
            self.potential_win,
            self.status,
            self.result,
        )
    }
}

impl Bet {
    /// Whether this bet is still awaiting settlement.
    pub fn is_pending(&self) -> bool {
        self.status == BetStatus::Pending
    }

    /// The payout owed for a given outcome: the frozen potential win for
    /// WON, the stake back for PUSH, nothing for LOST.
    pub fn payout_for(&self, result: BetResult) -> Decimal {
        match result {
            BetResult::Won => self.potential_win,
            BetResult::Push => self.amount,
            BetResult::Lost | BetResult::Pending => Decimal::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// User account
// ---------------------------------------------------------------------------

/// A bettor's account. The engine is the sole writer of bet-tied balance
/// deltas; deposits and withdrawals live elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub username: String,
    pub balance: Decimal,
}

impl fmt::Display for UserAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) balance={}", self.username, self.id, self.balance)
    }
}

// ---------------------------------------------------------------------------
// Game (oracle-owned, read-only here)
// ---------------------------------------------------------------------------

/// Game lifecycle as reported by the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Upcoming,
    Live,
    Finished,
    Cancelled,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Upcoming => write!(f, "UPCOMING"),
            GameStatus::Live => write!(f, "LIVE"),
            GameStatus::Finished => write!(f, "FINISHED"),
            GameStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// A sporting event as the oracle reports it. Never written by this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub status: GameStatus,
    pub home_team: String,
    pub away_team: String,
    pub start_time: DateTime<Utc>,
    /// Final scores, present once the game is FINISHED.
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.home_score, self.away_score) {
            (Some(h), Some(a)) => write!(
                f,
                "[{}] {} {h}–{a} {} ({})",
                self.id, self.home_team, self.away_team, self.status,
            ),
            _ => write!(
                f,
                "[{}] {} vs {} ({})",
                self.id, self.home_team, self.away_team, self.status,
            ),
        }
    }
}

impl Game {
    /// Whether the game has finished and carries both final scores.
    pub fn has_final_score(&self) -> bool {
        self.status == GameStatus::Finished
            && self.home_score.is_some()
            && self.away_score.is_some()
    }
}

// ---------------------------------------------------------------------------
// Settlement types
// ---------------------------------------------------------------------------

/// Transient outcome computed by a settlement strategy. Folds into
/// `Bet.result` and the response payload; never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementOutcome {
    pub result: BetResult,
    pub message: String,
}

/// A bet settled during a batch invocation, with its computed payout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettledBet {
    pub bet: Bet,
    pub message: String,
    pub payout: Decimal,
}

/// A bet that could not be settled in this invocation. The rest of the
/// batch is unaffected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedSettlement {
    pub bet_id: String,
    pub user_id: String,
    pub reason: String,
}

/// Report for one settlement invocation. `settled` counts only bets
/// processed this time around; a redelivered trigger for an already
/// settled game yields an empty report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReport {
    pub game_id: String,
    pub message: String,
    pub settled: Vec<SettledBet>,
    pub failed: Vec<FailedSettlement>,
}

impl SettlementReport {
    /// Build a report with the canonical summary message.
    pub fn new(game_id: &str, settled: Vec<SettledBet>, failed: Vec<FailedSettlement>) -> Self {
        Self {
            game_id: game_id.to_string(),
            message: format!("Settled {} bets for game {game_id}", settled.len()),
            settled,
            failed,
        }
    }

    /// Bets attempted in this invocation (settled + failed).
    pub fn attempted(&self) -> usize {
        self.settled.len() + self.failed.len()
    }
}

impl fmt::Display for SettlementReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (settled={} failed={})",
            self.message,
            self.settled.len(),
            self.failed.len(),
        )
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Asynchronous notification that a game has finished. Delivery is
/// at-least-once; duplicates are harmless because settlement only claims
/// PENDING bets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameFinishedEvent {
    pub game_id: String,
    pub home_team: String,
    pub away_team: String,
    pub finished_at: DateTime<Utc>,
}

impl fmt::Display for GameFinishedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "game.finished {} ({} vs {}) at {}",
            self.game_id, self.home_team, self.away_team, self.finished_at,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for BOOKLINE.
#[derive(Debug, thiserror::Error)]
pub enum BetError {
    #[error("Bet amount must be at least {min}")]
    BelowMinimum { min: Decimal },

    #[error("Bet amount must not exceed {max}")]
    AboveMaximum { max: Decimal },

    #[error("Insufficient balance. Available: {available}, Required: {required}")]
    InsufficientBalance {
        available: Decimal,
        required: Decimal,
    },

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Unknown bet type: {0}")]
    UnknownBetType(String),

    #[error("Cannot place bet: {0}")]
    GameNotValid(String),

    #[error("You have already placed a bet with this selection for this game")]
    DuplicateBet,

    #[error("Game {0} not found")]
    GameNotFound(String),

    #[error("Game {0} is not finished yet")]
    GameNotFinished(String),

    #[error("User with ID {0} not found")]
    UserNotFound(String),

    #[error("No {selection} odds available for game {game_id}")]
    OddsUnavailable {
        game_id: String,
        selection: Selection,
    },

    #[error("Game {0} is finished but has no final score")]
    MissingScore(String),

    #[error("Bet {0} is already settled")]
    AlreadySettled(String),

    #[error("Bet {0} not found")]
    BetNotFound(String),

    #[error("Oracle error: {0}")]
    Oracle(String),
}

impl BetError {
    /// Short machine-readable tag for API error bodies and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BetError::BelowMinimum { .. } => "below_minimum",
            BetError::AboveMaximum { .. } => "above_maximum",
            BetError::InsufficientBalance { .. } => "insufficient_balance",
            BetError::InvalidSelection(_) => "invalid_selection",
            BetError::UnknownBetType(_) => "unknown_bet_type",
            BetError::GameNotValid(_) => "game_not_valid",
            BetError::DuplicateBet => "duplicate_bet",
            BetError::GameNotFound(_) => "game_not_found",
            BetError::GameNotFinished(_) => "game_not_finished",
            BetError::UserNotFound(_) => "user_not_found",
            BetError::OddsUnavailable { .. } => "odds_unavailable",
            BetError::MissingScore(_) => "missing_score",
            BetError::AlreadySettled(_) => "already_settled",
            BetError::BetNotFound(_) => "bet_not_found",
            BetError::Oracle(_) => "oracle_error",
        }
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

impl Bet {
    /// Build a pending sample bet with sensible defaults.
    #[cfg(test)]
    pub fn sample(user_id: &str, game_id: &str, selection: Selection) -> Self {
        use rust_decimal_macros::dec;
        Bet {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            game_id: game_id.to_string(),
            bet_type: BetType::Moneyline,
            selection,
            amount: dec!(100),
            odds: dec!(2.5),
            potential_win: dec!(250),
            status: BetStatus::Pending,
            result: BetResult::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            settled_at: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
