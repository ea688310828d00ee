//! Supply/campaign point accounting.
//!
//! Every resource change goes through [`apply_delta`] so the player's history
//! stays complete and supply never leaves `[SP_MIN, SP_MAX]`.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{SP_MAX, SP_MIN};
use crate::phase::Phase;
use crate::player::Player;

/// Clamp a supply value into the legal range.
#[must_use]
pub fn clamp_supply(value: i32) -> i32 {
    value.clamp(SP_MIN, SP_MAX)
}

/// Audit record of one resource change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub round: u32,
    pub phase: Phase,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
    pub sp_before: i32,
    pub sp_after: i32,
    pub cp_before: i32,
    pub cp_after: i32,
}

impl HistoryEntry {
    #[must_use]
    pub const fn sp_change(&self) -> i32 {
        self.sp_after - self.sp_before
    }

    #[must_use]
    pub const fn cp_change(&self) -> i32 {
        self.cp_after - self.cp_before
    }
}

/// When a ledger change happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerStamp {
    pub round: u32,
    pub phase: Phase,
    pub timestamp: DateTime<Utc>,
}

/// Apply a supply and campaign point change and append a history entry.
///
/// Supply is clamped; campaign points are not.
pub fn apply_delta<'a>(
    player: &'a mut Player,
    stamp: LedgerStamp,
    sp_delta: i32,
    cp_delta: i32,
    reason: impl Into<String>,
) -> &'a HistoryEntry {
    let sp_before = player.supply_points;
    let cp_before = player.campaign_points;
    player.supply_points = clamp_supply(sp_before.saturating_add(sp_delta));
    player.campaign_points = cp_before.saturating_add(cp_delta);

    let entry = HistoryEntry {
        round: stamp.round,
        phase: stamp.phase,
        timestamp: stamp.timestamp,
        reason: reason.into(),
        sp_before,
        sp_after: player.supply_points,
        cp_before,
        cp_after: player.campaign_points,
    };
    log::debug!(
        "ledger[{}] {}: sp {} -> {}, cp {} -> {}",
        player.id,
        entry.reason,
        entry.sp_before,
        entry.sp_after,
        entry.cp_before,
        entry.cp_after
    );
    player.history.push(entry);
    &player.history[player.history.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::HexPosition;

    fn stamp() -> LedgerStamp {
        LedgerStamp {
            round: 2,
            phase: Phase::Action,
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[test]
    fn clamp_bounds_supply() {
        assert_eq!(clamp_supply(-4), 0);
        assert_eq!(clamp_supply(0), 0);
        assert_eq!(clamp_supply(7), 7);
        assert_eq!(clamp_supply(10), 10);
        assert_eq!(clamp_supply(19), 10);
    }

    #[test]
    fn delta_records_before_and_after() {
        let mut player = Player::new(0, "Alice", "#e74c3c", HexPosition::new(0, 1));
        player.supply_points = 9;
        let entry = apply_delta(&mut player, stamp(), 10, 2, "Resupply action").clone();
        assert_eq!(player.supply_points, 10);
        assert_eq!(player.campaign_points, 2);
        assert_eq!((entry.sp_before, entry.sp_after), (9, 10));
        assert_eq!(entry.sp_change(), 1);
        assert_eq!(entry.cp_change(), 2);
        assert_eq!(entry.phase, Phase::Action);
        assert_eq!(player.history.len(), 1);
    }

    #[test]
    fn campaign_points_may_go_negative() {
        let mut player = Player::new(1, "Bob", "#3498db", HexPosition::new(0, 3));
        apply_delta(&mut player, stamp(), -15, -3, "Penalty");
        assert_eq!(player.supply_points, 0);
        assert_eq!(player.campaign_points, -3);
    }
}
