//! Correct-number draw strategies

use crate::games::types::{Game, VRFBundle, MAX_GUESS, MIN_GUESS};
use rand::Rng;

/// Drawn correct number plus an optional fairness proof
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draw {
    pub number: u8,
    pub fairness: Option<VRFBundle>,
}

impl Draw {
    pub fn plain(number: u8) -> Self {
        Self {
            number,
            fairness: None,
        }
    }
}

/// Source of the correct number used at settlement
pub trait NumberSource: Send + Sync {
    /// Draw a number in `MIN_GUESS..=MAX_GUESS` for the game being settled
    fn draw(&self, game: &Game) -> Draw;

    fn name(&self) -> &'static str;
}

/// Uniform draw from the thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomNumberSource;

impl NumberSource for RandomNumberSource {
    fn draw(&self, _game: &Game) -> Draw {
        Draw::plain(rand::thread_rng().gen_range(MIN_GUESS..=MAX_GUESS))
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// Always draws the same number
#[derive(Debug, Clone, Copy)]
pub struct FixedNumberSource(pub u8);

impl NumberSource for FixedNumberSource {
    fn draw(&self, _game: &Game) -> Draw {
        Draw::plain(self.0.min(MAX_GUESS))
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}
