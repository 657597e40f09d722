//! Settlement
//!
//! One-time resolution of a game: every placed bet is classified as a win
//! or a loss against the drawn number and winners are paid the fixed
//! multiplier on their own stake. There is no pool splitting.

use crate::games::number_source::Draw;
use crate::games::types::{Game, StakeStatus};
use serde::{Deserialize, Serialize};

/// Payout multiplier numerator (9.9x expressed as 99 / 10)
pub const PAYOUT_MULTIPLIER_NUMERATOR: u64 = 99;

/// Payout multiplier denominator
pub const PAYOUT_MULTIPLIER_DENOMINATOR: u64 = 10;

/// Largest stake whose payout still fits in `u64`
pub const MAX_SETTLEABLE_STAKE: u64 = u64::MAX / PAYOUT_MULTIPLIER_NUMERATOR;

/// Aggregate outcome of a settled game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSummary {
    pub correct_number: u8,
    pub winners: usize,
    pub losers: usize,
    pub total_wagered: u64,
    pub total_paid_out: u64,
}

/// Payout for a winning stake, truncated to whole minor units
pub fn winning_payout(stake_amount: u64) -> u64 {
    let payout = stake_amount as u128 * PAYOUT_MULTIPLIER_NUMERATOR as u128
        / PAYOUT_MULTIPLIER_DENOMINATOR as u128;
    u64::try_from(payout).unwrap_or(u64::MAX)
}

/// Close `game` with the drawn number and settle every placed bet.
///
/// Callers must hold exclusive access to the game and must only call this
/// on an active game.
pub fn settle_game(game: &mut Game, draw: Draw) -> SettlementSummary {
    let correct_number = draw.number;
    game.close(correct_number, draw.fairness);

    let mut summary = SettlementSummary {
        correct_number,
        ..Default::default()
    };

    for player in game.players_mut() {
        summary.total_wagered = summary.total_wagered.saturating_add(player.stake_amount);

        if player.guessed_number == correct_number {
            let payout = winning_payout(player.stake_amount);
            player.stake_status = Some(StakeStatus::Win);
            player.end_of_game_balance = Some(payout);
            summary.winners += 1;
            summary.total_paid_out = summary.total_paid_out.saturating_add(payout);
        } else {
            player.stake_status = Some(StakeStatus::Loss);
            player.end_of_game_balance = Some(0);
            summary.losers += 1;
        }
    }

    summary
}
