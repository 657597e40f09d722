//! API Request and Response Models

use crate::games::types::{from_minor_units, Game, Player, StakeStatus, VRFBundle};
use crate::metrics::StatsSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Body of `POST /api/games`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateGameRequest {
    #[serde(default)]
    pub game_id: Option<String>,
}

/// Body of `POST /api/games/:id/bets`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceBetBody {
    pub nickname: String,
    /// Wider than the guess range so out-of-range guesses reach validation
    pub number: i64,
    /// Stake in whole units (decimal)
    pub stake: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetAcceptedResponse {
    pub game_id: String,
    pub nickname: String,
    pub accepted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerResponse {
    pub nickname: String,
    pub guessed_number: u8,
    pub stake: f64,
    pub stake_status: Option<StakeStatus>,
    pub end_of_game_balance: Option<f64>,
}

impl From<&Player> for PlayerResponse {
    fn from(player: &Player) -> Self {
        Self {
            nickname: player.nickname.clone(),
            guessed_number: player.guessed_number,
            stake: from_minor_units(player.stake_amount),
            stake_status: player.stake_status,
            end_of_game_balance: player.end_of_game_balance.map(from_minor_units),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameResponse {
    pub game_id: String,
    pub active: bool,
    pub correct_number: Option<u8>,
    pub created_at: DateTime<Utc>,
    pub timeout: DateTime<Utc>,
    /// Sorted by nickname
    pub players: Vec<PlayerResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fairness: Option<VRFBundle>,
}

impl From<&Game> for GameResponse {
    fn from(game: &Game) -> Self {
        let mut players: Vec<PlayerResponse> =
            game.players().values().map(PlayerResponse::from).collect();
        players.sort_by(|a, b| a.nickname.cmp(&b.nickname));

        Self {
            game_id: game.id().to_string(),
            active: game.is_active(),
            correct_number: game.correct_number(),
            created_at: game.created_at(),
            timeout: game.timeout(),
            players,
            fairness: game.fairness().cloned(),
        }
    }
}

/// Result of checking a settled game's VRF proof
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyGameResponse {
    pub game_id: String,
    pub is_valid: bool,
    pub correct_number: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub registered_games: usize,
    pub games_started: u64,
    pub games_settled: u64,
    pub bets_placed: u64,
    pub bets_rejected: u64,
    pub winning_bets: u64,
    pub total_wagered: f64,
    pub total_paid_out: f64,
    pub uptime_secs: u64,
}

impl StatsResponse {
    pub fn new(games: usize, snapshot: StatsSnapshot) -> Self {
        Self {
            registered_games: games,
            games_started: snapshot.games_started,
            games_settled: snapshot.games_settled,
            bets_placed: snapshot.bets_placed,
            bets_rejected: snapshot.bets_rejected,
            winning_bets: snapshot.winning_bets,
            total_wagered: from_minor_units(snapshot.total_wagered),
            total_paid_out: from_minor_units(snapshot.total_paid_out),
            uptime_secs: snapshot.uptime_secs,
        }
    }
}
