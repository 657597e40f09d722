//! Error types for the yolo-game service
//!
//! Game errors are expected, caller-recoverable conditions. Configuration and
//! verification errors cover the outer layers.

use thiserror::Error;

/// Root error type for all yolo-game operations
#[derive(Debug, Error)]
pub enum YoloError {
    /// Game session lifecycle errors
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Fairness proof verification errors
    #[error("Verification error: {0}")]
    Verification(#[from] VerificationError),
}

/// Game session errors surfaced by the registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// A game with this id was already registered (ids are never reused)
    #[error("Game id already in use: {0}")]
    DuplicateGameId(String),

    #[error("Game does not exist: {0}")]
    GameDoesNotExist(String),

    /// The session's timeout has elapsed or the game was already ended
    #[error("Game session has timed out: {0}")]
    GameTimedOut(String),

    #[error("Invalid bet for game {game_id}: {reason}")]
    InvalidBet { game_id: String, reason: String },

    /// Only fresh games (active, no players, no drawn number) can be registered
    #[error("Game {game_id} cannot be started: {reason}")]
    InvalidGame { game_id: String, reason: String },
}

/// Configuration and validation errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

/// VRF proof verification errors
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("Invalid hex in {field}: {reason}")]
    InvalidHex { field: &'static str, reason: String },

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Game {0} has no fairness proof")]
    MissingProof(String),
}

impl GameError {
    /// Game id the error refers to
    pub fn game_id(&self) -> &str {
        match self {
            GameError::DuplicateGameId(id)
            | GameError::GameDoesNotExist(id)
            | GameError::GameTimedOut(id) => id,
            GameError::InvalidBet { game_id, .. } | GameError::InvalidGame { game_id, .. } => {
                game_id
            }
        }
    }
}

// Convenience type alias for Results
pub type YoloResult<T> = Result<T, YoloError>;
