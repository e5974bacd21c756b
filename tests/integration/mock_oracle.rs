//! Mock game oracle for integration testing.
//!
//! Provides a deterministic `GameOracle` implementation backed by an
//! in-memory game table — no external dependencies. Games, odds, and
//! validity are fully controllable from test code.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Mutex;

use bookline::oracle::{GameOdds, GameOracle, GameValidation};
use bookline::types::{Game, GameStatus};

/// One configurable game fixture: the game itself plus its odds and
/// betting validity.
pub struct GameFixture {
    pub game: Game,
    pub odds: GameOdds,
    pub valid_for_betting: bool,
    pub invalid_reason: String,
}

/// A mock odds oracle for deterministic testing.
pub struct MockOracle {
    games: Mutex<HashMap<String, GameFixture>>,
    /// If set, all operations will return this error.
    force_error: Mutex<Option<String>>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self {
            games: Mutex::new(HashMap::new()),
            force_error: Mutex::new(None),
        }
    }

    /// Register an upcoming game, open for betting, with default odds.
    pub fn add_upcoming_game(&self, game_id: &str, home_team: &str, away_team: &str) {
        let fixture = GameFixture {
            game: Game {
                id: game_id.to_string(),
                status: GameStatus::Upcoming,
                home_team: home_team.to_string(),
                away_team: away_team.to_string(),
                start_time: Utc::now(),
                home_score: None,
                away_score: None,
            },
            odds: GameOdds {
                home_odds: dec!(2.5),
                away_odds: dec!(2.8),
                draw_odds: Some(dec!(3.2)),
            },
            valid_for_betting: true,
            invalid_reason: String::new(),
        };
        self.games
            .lock()
            .unwrap()
            .insert(game_id.to_string(), fixture);
    }

    /// Mark a game finished with the given final score. Betting closes.
    pub fn finish_game(&self, game_id: &str, home_score: u32, away_score: u32) {
        let mut games = self.games.lock().unwrap();
        if let Some(fixture) = games.get_mut(game_id) {
            fixture.game.status = GameStatus::Finished;
            fixture.game.home_score = Some(home_score);
            fixture.game.away_score = Some(away_score);
            fixture.valid_for_betting = false;
            fixture.invalid_reason = "Game has already finished".to_string();
        }
    }

    /// Mark a game finished but with no scores reported yet.
    pub fn finish_game_without_score(&self, game_id: &str) {
        let mut games = self.games.lock().unwrap();
        if let Some(fixture) = games.get_mut(game_id) {
            fixture.game.status = GameStatus::Finished;
            fixture.game.home_score = None;
            fixture.game.away_score = None;
            fixture.valid_for_betting = false;
        }
    }

    /// Remove the draw odds for a game.
    pub fn drop_draw_odds(&self, game_id: &str) {
        let mut games = self.games.lock().unwrap();
        if let Some(fixture) = games.get_mut(game_id) {
            fixture.odds.draw_odds = None;
        }
    }

    /// Force all subsequent operations to return an error.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    fn check_error(&self) -> Result<()> {
        if let Some(msg) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{msg}"));
        }
        Ok(())
    }
}

#[async_trait]
impl GameOracle for MockOracle {
    async fn validate_game(&self, game_id: &str) -> Result<GameValidation> {
        self.check_error()?;
        let games = self.games.lock().unwrap();
        match games.get(game_id) {
            Some(fixture) if fixture.valid_for_betting => Ok(GameValidation {
                is_valid: true,
                message: "Game is valid for betting".to_string(),
            }),
            Some(fixture) => Ok(GameValidation {
                is_valid: false,
                message: fixture.invalid_reason.clone(),
            }),
            None => Ok(GameValidation {
                is_valid: false,
                message: format!("Game {game_id} not found"),
            }),
        }
    }

    async fn game_odds(&self, game_id: &str) -> Result<GameOdds> {
        self.check_error()?;
        let games = self.games.lock().unwrap();
        games
            .get(game_id)
            .map(|fixture| fixture.odds.clone())
            .ok_or_else(|| anyhow!("No odds for game {game_id}"))
    }

    async fn games_by_ids(&self, game_ids: &[String]) -> Result<Vec<Game>> {
        self.check_error()?;
        let games = self.games.lock().unwrap();
        Ok(game_ids
            .iter()
            .filter_map(|id| games.get(id).map(|fixture| fixture.game.clone()))
            .collect())
    }
}
