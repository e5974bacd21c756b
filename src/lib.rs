//! BOOKLINE — Sportsbook Bet Placement & Settlement Engine
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod api;
pub mod config;
pub mod engine;
pub mod events;
pub mod ledger;
pub mod oracle;
pub mod storage;
pub mod types;
