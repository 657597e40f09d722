//! Registry statistics collection

use crate::games::settlement::SettlementSummary;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Lock-free counters updated by the session registry
pub struct RegistryStats {
    start_time: Instant,
    games_started: AtomicU64,
    games_settled: AtomicU64,
    bets_placed: AtomicU64,
    bets_rejected: AtomicU64,
    winning_bets: AtomicU64,
    total_wagered: AtomicU64,
    total_paid_out: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub uptime_secs: u64,
    pub games_started: u64,
    pub games_settled: u64,
    pub bets_placed: u64,
    pub bets_rejected: u64,
    pub winning_bets: u64,
    /// Minor units
    pub total_wagered: u64,
    /// Minor units
    pub total_paid_out: u64,
}

impl RegistryStats {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            games_started: AtomicU64::new(0),
            games_settled: AtomicU64::new(0),
            bets_placed: AtomicU64::new(0),
            bets_rejected: AtomicU64::new(0),
            winning_bets: AtomicU64::new(0),
            total_wagered: AtomicU64::new(0),
            total_paid_out: AtomicU64::new(0),
        }
    }

    pub fn record_game_started(&self) {
        self.games_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bet(&self) {
        self.bets_placed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected_bet(&self) {
        self.bets_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_settlement(&self, summary: &SettlementSummary) {
        self.games_settled.fetch_add(1, Ordering::Relaxed);
        self.winning_bets
            .fetch_add(summary.winners as u64, Ordering::Relaxed);
        saturating_add(&self.total_wagered, summary.total_wagered);
        saturating_add(&self.total_paid_out, summary.total_paid_out);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            uptime_secs: self.uptime().as_secs(),
            games_started: self.games_started.load(Ordering::Relaxed),
            games_settled: self.games_settled.load(Ordering::Relaxed),
            bets_placed: self.bets_placed.load(Ordering::Relaxed),
            bets_rejected: self.bets_rejected.load(Ordering::Relaxed),
            winning_bets: self.winning_bets.load(Ordering::Relaxed),
            total_wagered: self.total_wagered.load(Ordering::Relaxed),
            total_paid_out: self.total_paid_out.load(Ordering::Relaxed),
        }
    }
}

impl Default for RegistryStats {
    fn default() -> Self {
        Self::new()
    }
}

fn saturating_add(counter: &AtomicU64, amount: u64) {
    let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
        Some(current.saturating_add(amount))
    });
}
