//! Request Handlers
//!
//! Thin adapters between HTTP and the session registry.

use super::{errors::ApiError, middleware::RequestId, models::*};
use crate::errors::GameError;
use crate::games::{
    registry::SessionRegistry,
    types::{to_minor_units, PlaceBetRequest, MAX_GUESS, MIN_GUESS},
    vrf_engine::VRFGameEngine,
};
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub version: String,
}

/// Health check handler
/// GET /health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Running".to_string(),
        version: state.version.clone(),
    })
}

/// Start a new game session
/// POST /api/games
pub async fn create_game_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<GameResponse>), ApiError> {
    // Only an empty body falls back to a generated id
    let request: CreateGameRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CreateGameRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            ApiError::bad_request(request_id.0.clone(), format!("Invalid request body: {}", e))
        })?
    };

    if let Some(ref id) = request.game_id {
        if id.trim().is_empty() {
            return Err(ApiError::bad_request(
                request_id.0,
                "game_id cannot be blank".to_string(),
            ));
        }
    }

    let game = state
        .registry
        .open_game(request.game_id)
        .map_err(|e| ApiError::from_game_error(request_id.0, e))?;

    Ok((StatusCode::CREATED, Json(GameResponse::from(&game))))
}

/// Game snapshot
/// GET /api/games/:id
pub async fn get_game_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let game = state.registry.get_game_by_id(&game_id).ok_or_else(|| {
        ApiError::not_found(request_id.0, format!("Game {} not found", game_id))
    })?;

    Ok(Json(GameResponse::from(&game)))
}

/// Place a bet
/// POST /api/games/:id/bets
pub async fn place_bet_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    body: Result<Json<PlaceBetBody>, JsonRejection>,
) -> Result<(StatusCode, Json<BetAcceptedResponse>), ApiError> {
    let Json(body) = body.map_err(|rejection| {
        ApiError::bad_request(
            request_id.0.clone(),
            format!("Invalid request body: {}", rejection.body_text()),
        )
    })?;

    let guessed_number = match u8::try_from(body.number) {
        Ok(number) => number,
        Err(_) => {
            return Err(out_of_range_guess(&state.registry, request_id.0, game_id, body.number))
        }
    };
    let stake_amount = to_minor_units(body.stake).ok_or_else(|| {
        ApiError::bad_request(
            request_id.0.clone(),
            format!("Invalid stake amount: {}", body.stake),
        )
    })?;

    let bet = PlaceBetRequest::new(game_id.clone(), body.nickname.clone(), guessed_number, stake_amount);
    state
        .registry
        .place_bet(bet)
        .map_err(|e| ApiError::from_game_error(request_id.0, e))?;

    Ok((
        StatusCode::CREATED,
        Json(BetAcceptedResponse {
            game_id,
            nickname: body.nickname,
            accepted: true,
        }),
    ))
}

/// Guess outside `u8`. Missing and closed games still take precedence.
fn out_of_range_guess(
    registry: &SessionRegistry,
    request_id: String,
    game_id: String,
    number: i64,
) -> ApiError {
    let error = if !registry.is_game_available(&game_id) {
        GameError::GameDoesNotExist(game_id)
    } else if !registry.is_game_open(&game_id) {
        GameError::GameTimedOut(game_id)
    } else {
        GameError::InvalidBet {
            game_id,
            reason: format!(
                "guessed number {} is outside {}..={}",
                number, MIN_GUESS, MAX_GUESS
            ),
        }
    };
    ApiError::from_game_error(request_id, error)
}

/// Close a game and settle its bets
/// POST /api/games/:id/end
pub async fn end_game_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let game = state
        .registry
        .end_game(&game_id)
        .map_err(|e| ApiError::from_game_error(request_id.0, e))?;

    Ok(Json(GameResponse::from(&game)))
}

/// Verify the VRF proof of a settled game
/// GET /api/games/:id/verify
pub async fn verify_game_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Json<VerifyGameResponse>, ApiError> {
    let game = state.registry.get_game_by_id(&game_id).ok_or_else(|| {
        ApiError::not_found(request_id.0.clone(), format!("Game {} not found", game_id))
    })?;

    if game.fairness().is_none() {
        return Err(ApiError::bad_request(
            request_id.0,
            format!("Game {} has no fairness proof", game_id),
        ));
    }

    let response = match VRFGameEngine::verify_game(&game) {
        Ok(is_valid) => VerifyGameResponse {
            game_id,
            is_valid,
            correct_number: game.correct_number(),
            error: if is_valid {
                None
            } else {
                Some("VRF verification failed".to_string())
            },
        },
        Err(e) => VerifyGameResponse {
            game_id,
            is_valid: false,
            correct_number: game.correct_number(),
            error: Some(e.to_string()),
        },
    };

    Ok(Json(response))
}

/// Registry counters
/// GET /api/stats
pub async fn stats_handler(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse::new(
        state.registry.len(),
        state.registry.stats(),
    ))
}
