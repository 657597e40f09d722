//! In-memory registry of game sessions
//!
//! Games are keyed by id in a `DashMap`. Bet placement and settlement run
//! while holding the entry's write guard, so both are serialized per game
//! and a bet either lands before settlement reads the players or is
//! rejected after it. Different games never contend beyond shard locks.

use crate::config::GameConfig;
use crate::errors::GameError;
use crate::games::clock::Clock;
use crate::games::number_source::NumberSource;
use crate::games::settlement::{self, MAX_SETTLEABLE_STAKE};
use crate::games::types::{Game, PlaceBetRequest, Player, MAX_GUESS, MIN_GUESS};
use crate::metrics::{RegistryStats, StatsSnapshot};
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Authoritative store of all game sessions for the process lifetime
pub struct SessionRegistry {
    games: DashMap<String, Game>,
    clock: Arc<dyn Clock>,
    numbers: Arc<dyn NumberSource>,
    config: GameConfig,
    stats: RegistryStats,
}

impl SessionRegistry {
    pub fn new(config: GameConfig, clock: Arc<dyn Clock>, numbers: Arc<dyn NumberSource>) -> Self {
        Self {
            games: DashMap::new(),
            clock,
            numbers,
            config,
            stats: RegistryStats::new(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Fresh game stamped with the registry clock and configured timeout
    pub fn new_game(&self, id: impl Into<String>) -> Game {
        Game::new(id, self.clock.now(), self.config.session_timeout())
    }

    /// Register a new game. Ids are never reused, even after a game ends.
    pub fn start_new_game(&self, game: Game) -> Result<Game, GameError> {
        if let Err(reason) = Self::check_fresh(&game) {
            warn!(game_id = game.id(), reason = %reason, "Rejected game that is not fresh");
            return Err(GameError::InvalidGame {
                game_id: game.id().to_string(),
                reason,
            });
        }

        match self.games.entry(game.id().to_string()) {
            Entry::Occupied(_) => {
                warn!(game_id = game.id(), "Rejected duplicate game id");
                Err(GameError::DuplicateGameId(game.id().to_string()))
            }
            Entry::Vacant(slot) => {
                info!(
                    game_id = game.id(),
                    timeout = %game.timeout(),
                    "Started new game"
                );
                self.stats.record_game_started();
                Ok(slot.insert(game).clone())
            }
        }
    }

    fn check_fresh(game: &Game) -> Result<(), String> {
        if !game.is_active() {
            return Err("game is already ended".to_string());
        }
        if game.correct_number().is_some() || game.fairness().is_some() {
            return Err("correct number is already drawn".to_string());
        }
        if !game.players().is_empty() {
            return Err(format!("game already has {} players", game.players().len()));
        }
        Ok(())
    }

    /// Create and register a game, generating a UUID when no id is given
    pub fn open_game(&self, id: Option<String>) -> Result<Game, GameError> {
        let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
        self.start_new_game(self.new_game(id))
    }

    /// Whether a game with this id is registered, active or ended
    pub fn is_game_available(&self, id: &str) -> bool {
        self.games.contains_key(id)
    }

    /// Whether the game exists and still accepts bets
    pub fn is_game_open(&self, id: &str) -> bool {
        let now = self.clock.now();
        self.games
            .get(id)
            .map(|game| game.is_open_at(now))
            .unwrap_or(false)
    }

    /// Snapshot of a game
    pub fn get_game_by_id(&self, id: &str) -> Option<Game> {
        self.games.get(id).map(|game| game.clone())
    }

    pub fn place_bet(&self, bet: PlaceBetRequest) -> Result<(), GameError> {
        let mut game = match self.games.get_mut(&bet.game_id) {
            Some(game) => game,
            None => {
                self.stats.record_rejected_bet();
                return Err(GameError::GameDoesNotExist(bet.game_id));
            }
        };

        let now = self.clock.now();
        if !game.is_open_at(now) {
            debug!(
                game_id = %bet.game_id,
                active = game.is_active(),
                timeout = %game.timeout(),
                "Rejected bet on closed game"
            );
            self.stats.record_rejected_bet();
            return Err(GameError::GameTimedOut(bet.game_id));
        }

        if let Err(reason) = self.check_bet(&bet) {
            self.stats.record_rejected_bet();
            return Err(GameError::InvalidBet {
                game_id: bet.game_id,
                reason,
            });
        }

        let replaced = game.insert_player(Player::new(
            bet.nickname.clone(),
            bet.guessed_number,
            bet.stake_amount,
        ));
        self.stats.record_bet();

        debug!(
            game_id = %bet.game_id,
            nickname = %bet.nickname,
            guessed_number = bet.guessed_number,
            stake = bet.stake_amount,
            replaced = replaced.is_some(),
            "Bet placed"
        );
        Ok(())
    }

    fn check_bet(&self, bet: &PlaceBetRequest) -> Result<(), String> {
        if !(MIN_GUESS..=MAX_GUESS).contains(&bet.guessed_number) {
            return Err(format!(
                "guessed number {} is outside {}..={}",
                bet.guessed_number, MIN_GUESS, MAX_GUESS
            ));
        }
        if bet.stake_amount == 0 {
            return Err("stake must be positive".to_string());
        }
        let max_stake = self.config.max_stake.min(MAX_SETTLEABLE_STAKE);
        if bet.stake_amount > max_stake {
            return Err(format!(
                "stake {} exceeds maximum {}",
                bet.stake_amount, max_stake
            ));
        }
        Ok(())
    }

    /// Draw the correct number and settle every placed bet, exactly once
    pub fn end_game(&self, id: &str) -> Result<Game, GameError> {
        let mut game = self
            .games
            .get_mut(id)
            .ok_or_else(|| GameError::GameDoesNotExist(id.to_string()))?;

        let now = self.clock.now();
        if !game.is_open_at(now) {
            debug!(
                game_id = id,
                active = game.is_active(),
                "Rejected end of closed game"
            );
            return Err(GameError::GameTimedOut(id.to_string()));
        }

        let draw = self.numbers.draw(&game);
        let summary = settlement::settle_game(&mut game, draw);
        self.stats.record_settlement(&summary);

        info!(
            game_id = id,
            correct_number = summary.correct_number,
            winners = summary.winners,
            losers = summary.losers,
            total_wagered = summary.total_wagered,
            total_paid_out = summary.total_paid_out,
            number_source = self.numbers.name(),
            "Game settled"
        );

        Ok(game.clone())
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Number of registered games, active or ended
    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}
