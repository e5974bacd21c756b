//! Game-finished event intake.
//!
//! Events arrive on an mpsc channel, each paired with a oneshot ack
//! sender. Settlement runs to completion per event and the outcome goes
//! back through the ack: the producer learns whether the event was
//! processed or must be redelivered. Errors are returned, never
//! swallowed, and settlement is idempotent per game so redelivery of an
//! already-processed event settles zero bets and acks clean.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

use crate::engine::SettlementOrchestrator;
use crate::types::{BetError, GameFinishedEvent, SettlementReport};

/// One delivery: the event payload plus the channel the producer is
/// waiting on for the ack or nack.
pub struct InboundEvent {
    pub event: GameFinishedEvent,
    pub ack: oneshot::Sender<Result<SettlementReport, String>>,
}

pub struct EventIntake {
    settlement: Arc<SettlementOrchestrator>,
}

impl EventIntake {
    pub fn new(settlement: Arc<SettlementOrchestrator>) -> Self {
        Self { settlement }
    }

    /// Process one game-finished event. A report with failures still
    /// acks: those bets stay pending for a corrected rerun, and nacking
    /// the whole event would only redeliver the same failures.
    pub async fn handle(&self, event: &GameFinishedEvent) -> Result<SettlementReport, BetError> {
        info!(
            game_id = %event.game_id,
            home_team = %event.home_team,
            away_team = %event.away_team,
            "Game finished event received"
        );
        let report = self.settlement.settle_game(&event.game_id).await?;
        if !report.failed.is_empty() {
            warn!(
                game_id = %event.game_id,
                failed = report.failed.len(),
                "Settlement completed with per-bet failures"
            );
        }
        Ok(report)
    }

    /// Drain the channel until every sender is dropped.
    pub async fn run(self, mut rx: mpsc::Receiver<InboundEvent>) {
        while let Some(InboundEvent { event, ack }) = rx.recv().await {
            let outcome = match self.handle(&event).await {
                Ok(report) => Ok(report),
                Err(err) => {
                    error!(game_id = %event.game_id, error = %err, "Failed to process game finished event");
                    Err(err.to_string())
                }
            };
            // A dropped receiver means the producer gave up waiting;
            // the work itself is already done either way.
            if ack.send(outcome).is_err() {
                warn!(game_id = %event.game_id, "Event producer went away before ack");
            }
        }
        info!("Event intake channel closed, shutting down");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
