//! REST API route handlers.
//!
//! All endpoints return JSON. Domain errors map onto HTTP statuses in
//! one place (`ApiError`) so handlers just bubble `BetError` with `?`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::engine::{PlaceBetRequest, PlacementService, SettlementOrchestrator};
use crate::ledger::Ledger;
use crate::types::{Bet, BetError, BetResult, BetStatus, UserAccount};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct ApiState {
    pub placement: Arc<PlacementService>,
    pub settlement: Arc<SettlementOrchestrator>,
    pub ledger: Arc<Ledger>,
}

pub type AppState = Arc<ApiState>;

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

pub struct ApiError(BetError);

impl From<BetError> for ApiError {
    fn from(err: BetError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            BetError::DuplicateBet => StatusCode::CONFLICT,
            BetError::GameNotFound(_)
            | BetError::UserNotFound(_)
            | BetError::BetNotFound(_) => StatusCode::NOT_FOUND,
            BetError::Oracle(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::BAD_REQUEST,
        };
        let body = json!({
            "error": self.0.kind(),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_bets: usize,
    pub pending_bets: usize,
    pub won_bets: usize,
    pub lost_bets: usize,
    pub total_wagered: Decimal,
    pub total_won: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserStatusResponse {
    pub user: UserAccount,
    pub stats: UserStats,
    pub bets: Vec<Bet>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /bets
pub async fn place_bet(
    State(state): State<AppState>,
    Json(req): Json<PlaceBetRequest>,
) -> Result<(StatusCode, Json<Bet>), ApiError> {
    let bet = state.placement.place_bet(req).await?;
    Ok((StatusCode::CREATED, Json(bet)))
}

/// GET /bets/user/:user_id
pub async fn user_bets(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Bet>>, ApiError> {
    // 404 for unknown users rather than an empty list.
    state.ledger.get_user(&user_id).await?;
    Ok(Json(state.ledger.bets_by_user(&user_id).await))
}

/// POST /bets/settle/:game_id
pub async fn settle_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<crate::types::SettlementReport>, ApiError> {
    let report = state.settlement.settle_game(&game_id).await?;
    Ok(Json(report))
}

/// GET /users/:user_id
pub async fn user_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserStatusResponse>, ApiError> {
    let user = state.ledger.get_user(&user_id).await?;
    let bets = state.ledger.bets_by_user(&user_id).await;

    let stats = UserStats {
        total_bets: bets.len(),
        pending_bets: bets.iter().filter(|b| b.status == BetStatus::Pending).count(),
        won_bets: bets.iter().filter(|b| b.result == BetResult::Won).count(),
        lost_bets: bets.iter().filter(|b| b.result == BetResult::Lost).count(),
        total_wagered: bets.iter().map(|b| b.amount).sum(),
        total_won: bets
            .iter()
            .filter(|b| b.result == BetResult::Won)
            .map(|b| b.potential_win)
            .sum(),
    };

    Ok(Json(UserStatusResponse { user, stats, bets }))
}
