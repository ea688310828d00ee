use serde::{Deserialize, Serialize};

use super::{Campaign, RuleViolation};
use crate::constants::{DEFAULT_EXPLORE_THREAT, THREAT_MAX};
use crate::dice::roll_d36;
use crate::event::EventKind;
use crate::hex::HexPosition;
use crate::player::PlayerId;
use crate::tables::{ConditionEffect, HexKind, LocationEffect};

/// What a newly explored hex turned out to be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorationOutcome {
    pub position: HexPosition,
    pub explorer: PlayerId,
    pub location_key: u8,
    pub condition_key: u8,
    pub location_name: String,
    pub condition_name: String,
    /// Supply actually credited after clamping.
    pub supply_gained: i32,
    pub campaign_points_gained: i32,
    /// Threat added by a solo-mode tomb condition.
    pub threat_raised: u8,
}

impl Campaign {
    /// Explore `pos` on behalf of the current player.
    ///
    /// # Errors
    ///
    /// Refuses hexes that are off the map, blocked, or already explored.
    pub fn explore_hex(&mut self, pos: HexPosition) -> Result<ExplorationOutcome, RuleViolation> {
        let actor = self.ensure_active()?;
        self.explore_as(actor, pos)
    }

    /// Roll location and condition for `pos` and credit `explorer`.
    pub(super) fn explore_as(
        &mut self,
        explorer: PlayerId,
        pos: HexPosition,
    ) -> Result<ExplorationOutcome, RuleViolation> {
        let Some(hex) = self.state.hex(pos) else {
            return self.refuse(RuleViolation::UnknownHex(pos));
        };
        if hex.blocked {
            return self.refuse(RuleViolation::HexBlocked(pos));
        }
        if hex.explored {
            return self.refuse(RuleViolation::AlreadyExplored(pos));
        }
        let kind = hex.kind;

        let location_key = roll_d36(self.rng.exploration());
        let condition_key = roll_d36(self.rng.exploration());
        let catalog = self.catalog;
        let location = catalog.location(kind, location_key);
        let condition = catalog.condition(kind, condition_key);
        let location_name = location.map_or("Unknown", |l| l.name.as_str()).to_string();
        let condition_name = condition.map_or("Clear", |c| c.name.as_str()).to_string();
        log::debug!("explored {pos} ({kind}): location {location_key}, condition {condition_key}");

        if let Some(hex) = self.state.hexes.get_mut(&pos) {
            hex.explored = true;
            hex.location_key = location_key;
            hex.condition_key = condition_key;
            hex.explored_by.push(explorer);
        }
        self.emit(
            EventKind::Exploration,
            format!("Explored hex {pos}: {location_name} ({condition_name})"),
        );

        let mut sp_reward = 0;
        let mut cp_reward = 0;
        if let Some(entry) = location {
            let value = entry.value.as_ref();
            match (entry.effect, value) {
                (LocationEffect::GainSupply, Some(v)) => sp_reward = v.resolve(self.rng.rewards()),
                (LocationEffect::GainCampaignPoints, Some(v)) => {
                    cp_reward = v.resolve(self.rng.rewards());
                }
                _ => {}
            }
        }

        let mut outcome = ExplorationOutcome {
            position: pos,
            explorer,
            location_key,
            condition_key,
            location_name,
            condition_name,
            supply_gained: 0,
            campaign_points_gained: 0,
            threat_raised: 0,
        };

        if sp_reward > 0 || cp_reward > 0 {
            let reason = format!("Explored {}", outcome.location_name);
            let entry = self.apply_to(explorer, sp_reward.max(0), cp_reward.max(0), reason);
            if let Some(entry) = entry {
                outcome.supply_gained = entry.sp_change();
                outcome.campaign_points_gained = entry.cp_change();
            }
            if sp_reward > 0 {
                self.emit(
                    EventKind::Reward,
                    format!("Gained {sp_reward} SP from {}", outcome.location_name),
                );
            }
            if cp_reward > 0 {
                self.emit(
                    EventKind::Reward,
                    format!("Gained {cp_reward} CP from {}", outcome.location_name),
                );
            }
        }
        if let Some(player) = self.state.player_mut(explorer) {
            player.hexes_explored = player.hexes_explored.saturating_add(1);
        }

        if self.state.solo_mode && kind == HexKind::Tomb {
            if let Some(entry) = condition.filter(|c| c.effect == ConditionEffect::ThreatIncrease) {
                let raise = entry
                    .value
                    .as_ref()
                    .map(|v| v.resolve(self.rng.rewards()))
                    .and_then(|v| u8::try_from(v).ok())
                    .filter(|v| *v > 0)
                    .unwrap_or(DEFAULT_EXPLORE_THREAT);
                let before = self.state.threat_level;
                self.state.threat_level = before.saturating_add(raise).min(THREAT_MAX);
                outcome.threat_raised = self.state.threat_level - before;
                self.emit(
                    EventKind::Warning,
                    format!("Threat level increased by {raise}!"),
                );
            }
        }

        self.sync_rng_cursor();
        Ok(outcome)
    }
}
