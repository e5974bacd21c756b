//! HTTP client for the odds-service oracle.
//!
//! All three oracle operations map to JSON endpoints on the odds
//! service. Only the fields the engine needs are deserialized.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use super::{GameOdds, GameOracle, GameValidation};
use crate::types::{Game, GameStatus};

// ---------------------------------------------------------------------------
// API response types (odds service JSON → Rust)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateGameResponse {
    is_valid: bool,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameOddsResponse {
    success: bool,
    #[serde(default)]
    game_odds: Option<GameOddsBody>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameOddsBody {
    home_odds: Decimal,
    away_odds: Decimal,
    #[serde(default)]
    draw_odds: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GamesByIdsResponse {
    #[serde(default)]
    games: Vec<GameBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameBody {
    id: String,
    status: GameStatus,
    home_team: String,
    away_team: String,
    start_time: DateTime<Utc>,
    #[serde(default)]
    home_score: Option<u32>,
    #[serde(default)]
    away_score: Option<u32>,
}

impl From<GameBody> for Game {
    fn from(g: GameBody) -> Self {
        Game {
            id: g.id,
            status: g.status,
            home_team: g.home_team,
            away_team: g.away_team,
            start_time: g.start_time,
            home_score: g.home_score,
            away_score: g.away_score,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Odds-service oracle client.
pub struct HttpGameOracle {
    http: Client,
    base_url: String,
}

impl HttpGameOracle {
    /// Create a new oracle client against the given base URL.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent("BOOKLINE/0.1.0 (betting-engine)")
            .build()
            .context("Failed to build HTTP client for the game oracle")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "Oracle request");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("Oracle request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Oracle error {status}: {body}");
        }

        resp.json::<T>()
            .await
            .context("Failed to parse oracle response")
    }
}

#[async_trait]
impl GameOracle for HttpGameOracle {
    async fn validate_game(&self, game_id: &str) -> Result<GameValidation> {
        let body: ValidateGameResponse = self
            .get_json(&format!("/games/{game_id}/validate"))
            .await?;

        Ok(GameValidation {
            is_valid: body.is_valid,
            message: body.message,
        })
    }

    async fn game_odds(&self, game_id: &str) -> Result<GameOdds> {
        let body: GameOddsResponse = self.get_json(&format!("/games/{game_id}/odds")).await?;

        if !body.success {
            anyhow::bail!(
                "Failed to retrieve game odds: {}",
                body.message.unwrap_or_else(|| "no reason given".to_string()),
            );
        }

        let odds = body
            .game_odds
            .context("Odds response marked success but carried no odds")?;

        Ok(GameOdds {
            home_odds: odds.home_odds,
            away_odds: odds.away_odds,
            draw_odds: odds.draw_odds,
        })
    }

    async fn games_by_ids(&self, game_ids: &[String]) -> Result<Vec<Game>> {
        let body = serde_json::json!({ "gameIds": game_ids });
        let url = format!("{}/games/by-ids", self.base_url);
        debug!(url = %url, count = game_ids.len(), "Oracle games-by-ids request");

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Oracle games-by-ids request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Oracle error {status}: {body}");
        }

        let parsed: GamesByIdsResponse = resp
            .json()
            .await
            .context("Failed to parse oracle games-by-ids response")?;

        Ok(parsed.games.into_iter().map(Game::from).collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
