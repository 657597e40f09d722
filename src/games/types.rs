use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Smallest guessable number
pub const MIN_GUESS: u8 = 0;

/// Largest guessable number
pub const MAX_GUESS: u8 = 9;

/// Minor units per whole stake unit
pub const MINOR_UNITS_PER_UNIT: u64 = 1_000_000_000;

/// Outcome of a single bet once the game is settled
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum StakeStatus {
    Win,
    Loss,
}

impl fmt::Display for StakeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StakeStatus::Win => write!(f, "WIN"),
            StakeStatus::Loss => write!(f, "LOSS"),
        }
    }
}

/// VRF bundle containing cryptographic proof of the drawn number
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VRFBundle {
    /// Hex-encoded VRF output (32 bytes)
    pub vrf_output: String,
    /// Hex-encoded VRF proof (64 bytes for schnorrkel)
    pub vrf_proof: String,
    /// Hex-encoded public key (32 bytes)
    pub public_key: String,
    /// Input message used for VRF
    pub input_message: String,
}

/// One placed bet within a game
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub nickname: String,
    pub guessed_number: u8,
    /// Stake in minor units
    pub stake_amount: u64,
    pub stake_status: Option<StakeStatus>,
    /// Balance after settlement in minor units
    pub end_of_game_balance: Option<u64>,
}

impl Player {
    pub fn new(nickname: impl Into<String>, guessed_number: u8, stake_amount: u64) -> Self {
        Self {
            nickname: nickname.into(),
            guessed_number,
            stake_amount,
            stake_status: None,
            end_of_game_balance: None,
        }
    }

    pub fn is_winner(&self) -> bool {
        self.stake_status == Some(StakeStatus::Win)
    }
}

/// A guessing game session.
///
/// `correct_number` is set exactly when `active` is false. Only settlement
/// flips that pair, so the fields stay private to the crate.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Game {
    id: String,
    players: HashMap<String, Player>,
    correct_number: Option<u8>,
    created_at: DateTime<Utc>,
    timeout: DateTime<Utc>,
    active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    fairness: Option<VRFBundle>,
}

impl Game {
    /// Create an active game that expires `ttl` after `created_at`
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: id.into(),
            players: HashMap::new(),
            correct_number: None,
            created_at,
            timeout: created_at + ttl,
            active: true,
            fairness: None,
        }
    }

    /// Override the absolute expiry timestamp
    pub fn with_timeout(mut self, timeout: DateTime<Utc>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn players(&self) -> &HashMap<String, Player> {
        &self.players
    }

    pub fn correct_number(&self) -> Option<u8> {
        self.correct_number
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn timeout(&self) -> DateTime<Utc> {
        self.timeout
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn fairness(&self) -> Option<&VRFBundle> {
        self.fairness.as_ref()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.timeout
    }

    /// Whether bets and closure are still allowed at `now`
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.active && !self.is_expired_at(now)
    }

    /// Insert a bet keyed by nickname, replacing any earlier bet under that key
    pub(crate) fn insert_player(&mut self, player: Player) -> Option<Player> {
        self.players.insert(player.nickname.clone(), player)
    }

    pub(crate) fn players_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.values_mut()
    }

    pub(crate) fn close(&mut self, correct_number: u8, fairness: Option<VRFBundle>) {
        self.correct_number = Some(correct_number);
        self.fairness = fairness;
        self.active = false;
    }
}

/// Bet submitted against a running game
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaceBetRequest {
    pub game_id: String,
    pub nickname: String,
    pub guessed_number: u8,
    /// Stake in minor units
    pub stake_amount: u64,
}

impl PlaceBetRequest {
    pub fn new(
        game_id: impl Into<String>,
        nickname: impl Into<String>,
        guessed_number: u8,
        stake_amount: u64,
    ) -> Self {
        Self {
            game_id: game_id.into(),
            nickname: nickname.into(),
            guessed_number,
            stake_amount,
        }
    }
}

/// Convert a decimal stake into minor units, rounding to the nearest unit
pub fn to_minor_units(amount: f64) -> Option<u64> {
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }
    let scaled = (amount * MINOR_UNITS_PER_UNIT as f64).round();
    if scaled > u64::MAX as f64 {
        return None;
    }
    Some(scaled as u64)
}

pub fn from_minor_units(amount: u64) -> f64 {
    amount as f64 / MINOR_UNITS_PER_UNIT as f64
}
