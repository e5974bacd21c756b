//! Betting engine — stake validation, placement, strategies, settlement.
//!
//! The engine coordinates the oracle client, the strategy registry, and
//! the ledger. It holds no monetary state of its own: every balance or
//! bet mutation goes through a ledger atomic unit.

pub mod placement;
pub mod settlement;
pub mod strategy;
pub mod validator;

pub use placement::{PlaceBetRequest, PlacementService};
pub use settlement::SettlementOrchestrator;
pub use strategy::{MoneylineStrategy, SettleContext, SettlementStrategy, StrategyRegistry};
pub use validator::StakeValidator;
