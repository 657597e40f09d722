//! yolo-game - numeric guessing game sessions
//!
//! Short-lived betting sessions: players guess a digit with a stake while a
//! game is open, and closing the game draws the correct number and settles
//! every bet at a fixed 9.9x payout.

pub mod api;
pub mod config;
pub mod errors;
pub mod factory;
pub mod games;
pub mod metrics;

pub use config::{ConfigLoader, YoloConfig};
pub use errors::{GameError, YoloError, YoloResult};
pub use factory::RegistryFactory;
pub use games::{
    Game, PlaceBetRequest, Player, SessionRegistry, StakeStatus,
};
