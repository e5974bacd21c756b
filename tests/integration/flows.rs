//! End-to-end placement and settlement flows against the mock oracle.

use std::sync::Arc;

use rust_decimal_macros::dec;
use tokio::sync::{mpsc, oneshot};

use bookline::engine::{
    PlaceBetRequest, PlacementService, SettlementOrchestrator, StakeValidator, StrategyRegistry,
};
use bookline::events::{EventIntake, InboundEvent};
use bookline::ledger::Ledger;
use bookline::oracle::GameOracle;
use bookline::types::{BetError, BetResult, BetStatus, GameFinishedEvent};

use crate::mock_oracle::MockOracle;

struct Harness {
    oracle: Arc<MockOracle>,
    ledger: Arc<Ledger>,
    placement: PlacementService,
    settlement: Arc<SettlementOrchestrator>,
}

impl Harness {
    fn new() -> Self {
        let oracle = Arc::new(MockOracle::new());
        let ledger = Arc::new(Ledger::new());
        let registry = Arc::new(StrategyRegistry::new());
        let oracle_dyn: Arc<dyn GameOracle> = Arc::clone(&oracle) as Arc<dyn GameOracle>;

        let placement = PlacementService::new(
            StakeValidator::new(dec!(1), dec!(500)),
            Arc::clone(&registry),
            Arc::clone(&oracle_dyn),
            Arc::clone(&ledger),
        );
        let settlement = Arc::new(SettlementOrchestrator::new(
            registry,
            oracle_dyn,
            Arc::clone(&ledger),
        ));

        Self {
            oracle,
            ledger,
            placement,
            settlement,
        }
    }

    async fn seed_user(&self, username: &str) -> String {
        self.ledger.create_user(username, dec!(1000)).await.id
    }

    fn request(user_id: &str, game_id: &str, selection: &str, amount: &str) -> PlaceBetRequest {
        PlaceBetRequest {
            user_id: user_id.to_string(),
            game_id: game_id.to_string(),
            bet_type: "MONEYLINE".to_string(),
            selection: selection.to_string(),
            amount: amount.parse().unwrap(),
        }
    }
}

#[tokio::test]
async fn test_winning_bet_full_lifecycle() {
    let h = Harness::new();
    let user = h.seed_user("john_doe").await;
    h.oracle.add_upcoming_game("g1", "Lakers", "Celtics");

    let bet = h
        .placement
        .place_bet(Harness::request(&user, "g1", "home", "100"))
        .await
        .unwrap();
    assert_eq!(bet.status, BetStatus::Pending);
    assert_eq!(bet.potential_win, dec!(250));
    assert_eq!(h.ledger.balance_of(&user).await.unwrap(), dec!(900));

    h.oracle.finish_game("g1", 110, 98);
    let report = h.settlement.settle_game("g1").await.unwrap();

    assert_eq!(report.settled.len(), 1);
    assert!(report.failed.is_empty());
    assert_eq!(report.settled[0].message, "Bet won - Lakers won");
    assert_eq!(h.ledger.balance_of(&user).await.unwrap(), dec!(1150));

    let bets = h.ledger.bets_by_user(&user).await;
    assert_eq!(bets[0].status, BetStatus::Settled);
    assert_eq!(bets[0].result, BetResult::Won);
    assert!(bets[0].settled_at.is_some());
}

#[tokio::test]
async fn test_losing_bet_gets_no_credit() {
    let h = Harness::new();
    let user = h.seed_user("jane_smith").await;
    h.oracle.add_upcoming_game("g1", "Lakers", "Celtics");

    h.placement
        .place_bet(Harness::request(&user, "g1", "away", "100"))
        .await
        .unwrap();

    h.oracle.finish_game("g1", 110, 98);
    let report = h.settlement.settle_game("g1").await.unwrap();

    assert_eq!(report.settled[0].payout, dec!(0));
    assert_eq!(report.settled[0].message, "Bet lost - Lakers won");
    assert_eq!(h.ledger.balance_of(&user).await.unwrap(), dec!(900));
}

#[tokio::test]
async fn test_draw_pushes_stake_back() {
    let h = Harness::new();
    let user = h.seed_user("bob_jones").await;
    h.oracle.add_upcoming_game("g1", "Arsenal", "Chelsea");

    h.placement
        .place_bet(Harness::request(&user, "g1", "home", "80"))
        .await
        .unwrap();

    h.oracle.finish_game("g1", 2, 2);
    let report = h.settlement.settle_game("g1").await.unwrap();

    assert_eq!(report.settled[0].message, "Bet pushed - game ended in a draw");
    assert_eq!(report.settled[0].payout, dec!(80));
    assert_eq!(h.ledger.balance_of(&user).await.unwrap(), dec!(1000));
}

#[tokio::test]
async fn test_draw_bet_wins_on_draw() {
    let h = Harness::new();
    let user = h.seed_user("draw_backer").await;
    h.oracle.add_upcoming_game("g1", "Arsenal", "Chelsea");

    let bet = h
        .placement
        .place_bet(Harness::request(&user, "g1", "draw", "50"))
        .await
        .unwrap();
    assert_eq!(bet.odds, dec!(3.2));

    h.oracle.finish_game("g1", 1, 1);
    let report = h.settlement.settle_game("g1").await.unwrap();

    assert_eq!(report.settled[0].message, "Bet won - game ended in a draw");
    assert_eq!(h.ledger.balance_of(&user).await.unwrap(), dec!(1110));
}

#[tokio::test]
async fn test_duplicate_selection_blocked_even_after_settlement() {
    let h = Harness::new();
    let user = h.seed_user("repeat_customer").await;
    h.oracle.add_upcoming_game("g1", "Lakers", "Celtics");

    h.placement
        .place_bet(Harness::request(&user, "g1", "home", "100"))
        .await
        .unwrap();

    let err = h
        .placement
        .place_bet(Harness::request(&user, "g1", "home", "50"))
        .await
        .unwrap_err();
    assert!(matches!(err, BetError::DuplicateBet));

    // Settle, reopen the game, try again: still blocked.
    h.oracle.finish_game("g1", 3, 1);
    h.settlement.settle_game("g1").await.unwrap();
    h.oracle.add_upcoming_game("g1", "Lakers", "Celtics");

    let err = h
        .placement
        .place_bet(Harness::request(&user, "g1", "home", "50"))
        .await
        .unwrap_err();
    assert!(matches!(err, BetError::DuplicateBet));

    // A different selection on the same game is fine.
    h.placement
        .place_bet(Harness::request(&user, "g1", "away", "50"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_settlement_is_idempotent() {
    let h = Harness::new();
    let user = h.seed_user("once_only").await;
    h.oracle.add_upcoming_game("g1", "Lakers", "Celtics");

    h.placement
        .place_bet(Harness::request(&user, "g1", "home", "100"))
        .await
        .unwrap();
    h.oracle.finish_game("g1", 110, 98);

    let first = h.settlement.settle_game("g1").await.unwrap();
    assert_eq!(first.settled.len(), 1);
    let balance = h.ledger.balance_of(&user).await.unwrap();

    let second = h.settlement.settle_game("g1").await.unwrap();
    assert_eq!(second.attempted(), 0);
    assert_eq!(h.ledger.balance_of(&user).await.unwrap(), balance);
}

#[tokio::test]
async fn test_missing_score_leaves_bet_pending_for_rerun() {
    let h = Harness::new();
    let user = h.seed_user("patient").await;
    h.oracle.add_upcoming_game("g1", "Lakers", "Celtics");

    h.placement
        .place_bet(Harness::request(&user, "g1", "home", "100"))
        .await
        .unwrap();

    h.oracle.finish_game_without_score("g1");
    let report = h.settlement.settle_game("g1").await.unwrap();
    assert!(report.settled.is_empty());
    assert_eq!(report.failed.len(), 1);

    // Scores arrive; the rerun settles the bet.
    h.oracle.finish_game("g1", 110, 98);
    let report = h.settlement.settle_game("g1").await.unwrap();
    assert_eq!(report.settled.len(), 1);
    assert_eq!(h.ledger.balance_of(&user).await.unwrap(), dec!(1150));
}

#[tokio::test]
async fn test_unfinished_game_cannot_settle() {
    let h = Harness::new();
    h.oracle.add_upcoming_game("g1", "Lakers", "Celtics");

    let err = h.settlement.settle_game("g1").await.unwrap_err();
    assert!(matches!(err, BetError::GameNotFinished(_)));
}

#[tokio::test]
async fn test_betting_closed_once_game_finished() {
    let h = Harness::new();
    let user = h.seed_user("late").await;
    h.oracle.add_upcoming_game("g1", "Lakers", "Celtics");
    h.oracle.finish_game("g1", 110, 98);

    let err = h
        .placement
        .place_bet(Harness::request(&user, "g1", "home", "100"))
        .await
        .unwrap_err();
    assert!(matches!(err, BetError::GameNotValid(_)));
    assert_eq!(h.ledger.balance_of(&user).await.unwrap(), dec!(1000));
}

#[tokio::test]
async fn test_oracle_outage_leaves_balance_untouched() {
    let h = Harness::new();
    let user = h.seed_user("unlucky").await;
    h.oracle.add_upcoming_game("g1", "Lakers", "Celtics");
    h.oracle.set_error("connection refused");

    let err = h
        .placement
        .place_bet(Harness::request(&user, "g1", "home", "100"))
        .await
        .unwrap_err();
    assert!(matches!(err, BetError::Oracle(_)));
    assert_eq!(h.ledger.balance_of(&user).await.unwrap(), dec!(1000));
}

#[tokio::test]
async fn test_draw_selection_without_draw_odds() {
    let h = Harness::new();
    let user = h.seed_user("hopeful").await;
    h.oracle.add_upcoming_game("g1", "Lakers", "Celtics");
    h.oracle.drop_draw_odds("g1");

    let err = h
        .placement
        .place_bet(Harness::request(&user, "g1", "draw", "100"))
        .await
        .unwrap_err();
    assert!(matches!(err, BetError::OddsUnavailable { .. }));
}

#[tokio::test]
async fn test_game_finished_event_settles_and_acks() {
    let h = Harness::new();
    let user = h.seed_user("event_driven").await;
    h.oracle.add_upcoming_game("g1", "Lakers", "Celtics");

    h.placement
        .place_bet(Harness::request(&user, "g1", "home", "100"))
        .await
        .unwrap();
    h.oracle.finish_game("g1", 110, 98);

    let intake = EventIntake::new(Arc::clone(&h.settlement));
    let (tx, rx) = mpsc::channel(8);
    let worker = tokio::spawn(intake.run(rx));

    let (ack_tx, ack_rx) = oneshot::channel();
    tx.send(InboundEvent {
        event: GameFinishedEvent {
            game_id: "g1".to_string(),
            home_team: "Lakers".to_string(),
            away_team: "Celtics".to_string(),
            finished_at: chrono::Utc::now(),
        },
        ack: ack_tx,
    })
    .await
    .unwrap();

    let report = ack_rx.await.unwrap().unwrap();
    assert_eq!(report.settled.len(), 1);
    assert_eq!(h.ledger.balance_of(&user).await.unwrap(), dec!(1150));

    // Redelivery of the same event acks with nothing left to settle.
    let (ack_tx, ack_rx) = oneshot::channel();
    tx.send(InboundEvent {
        event: GameFinishedEvent {
            game_id: "g1".to_string(),
            home_team: "Lakers".to_string(),
            away_team: "Celtics".to_string(),
            finished_at: chrono::Utc::now(),
        },
        ack: ack_tx,
    })
    .await
    .unwrap();
    let report = ack_rx.await.unwrap().unwrap();
    assert_eq!(report.attempted(), 0);

    drop(tx);
    worker.await.unwrap();
}

#[tokio::test]
async fn test_event_for_unknown_game_is_nacked() {
    let h = Harness::new();
    let intake = EventIntake::new(Arc::clone(&h.settlement));

    let (tx, rx) = mpsc::channel(8);
    let worker = tokio::spawn(intake.run(rx));

    let (ack_tx, ack_rx) = oneshot::channel();
    tx.send(InboundEvent {
        event: GameFinishedEvent {
            game_id: "ghost".to_string(),
            home_team: "A".to_string(),
            away_team: "B".to_string(),
            finished_at: chrono::Utc::now(),
        },
        ack: ack_tx,
    })
    .await
    .unwrap();

    assert!(ack_rx.await.unwrap().is_err());

    drop(tx);
    worker.await.unwrap();
}

#[tokio::test]
async fn test_money_is_conserved_across_a_full_game() {
    let h = Harness::new();
    let alice = h.seed_user("alice").await;
    let bob = h.seed_user("bob").await;
    let carol = h.seed_user("carol").await;
    h.oracle.add_upcoming_game("g1", "Lakers", "Celtics");

    h.placement
        .place_bet(Harness::request(&alice, "g1", "home", "100"))
        .await
        .unwrap();
    h.placement
        .place_bet(Harness::request(&bob, "g1", "away", "200"))
        .await
        .unwrap();
    h.placement
        .place_bet(Harness::request(&carol, "g1", "draw", "50"))
        .await
        .unwrap();

    h.oracle.finish_game("g1", 110, 98);
    let report = h.settlement.settle_game("g1").await.unwrap();
    assert_eq!(report.settled.len(), 3);
    assert_eq!(report.message, "Settled 3 bets for game g1");

    // home won at 2.5: alice nets +150, bob loses 200, carol loses 50.
    assert_eq!(h.ledger.balance_of(&alice).await.unwrap(), dec!(1150));
    assert_eq!(h.ledger.balance_of(&bob).await.unwrap(), dec!(800));
    assert_eq!(h.ledger.balance_of(&carol).await.unwrap(), dec!(950));
}
