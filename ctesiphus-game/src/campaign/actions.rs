use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Campaign, ExplorationOutcome, RuleViolation};
use crate::constants::{
    CHEAP_ENCAMP_DISCOUNT, RESUPPLY_AT_BASE, RESUPPLY_AT_CAMP_NOTATION, RESUPPLY_CONDITION_SHIFT,
    RESUPPLY_ELSEWHERE, SEARCH_CP_DEFAULT, SEARCH_SP_DEFAULT_NOTATION, SP_MAX,
};
use crate::dice::{RewardValue, roll_notation};
use crate::event::EventKind;
use crate::hex::HexPosition;
use crate::player::PlayerId;
use crate::tables::{ConditionEffect, LocationEffect};

/// Every intent a player can submit, used for phase gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Move,
    RecordBattle,
    Resupply,
    Scout,
    Search,
    Encamp,
    Demolish,
}

impl ActionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Move => "MOVE",
            Self::RecordBattle => "RECORD_BATTLE",
            Self::Resupply => "RESUPPLY",
            Self::Scout => "SCOUT",
            Self::Search => "SEARCH",
            Self::Encamp => "ENCAMP",
            Self::Demolish => "DEMOLISH",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action-phase intent for the current player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignAction {
    Resupply,
    /// Explore a remote hex, paying `distance` supply.
    Scout { target: HexPosition, distance: u32 },
    Search,
    /// Build a camp; `cost` is usually [`Campaign::calculate_encamp_cost`].
    Encamp { cost: u32 },
    Demolish,
}

impl CampaignAction {
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Resupply => ActionKind::Resupply,
            Self::Scout { .. } => ActionKind::Scout,
            Self::Search => ActionKind::Search,
            Self::Encamp { .. } => ActionKind::Encamp,
            Self::Demolish => ActionKind::Demolish,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// `gained` is 0 when the player was already topped up.
    Resupplied { gained: i32 },
    Scouted {
        cost: u32,
        exploration: ExplorationOutcome,
    },
    Searched { supply: i32, campaign_points: i32 },
    Encamped { position: HexPosition, cost: u32 },
    Demolished { owner: PlayerId, position: HexPosition },
}

impl Campaign {
    /// Resolve an action for the current player.
    ///
    /// # Errors
    ///
    /// Refuses actions whose preconditions fail (supply, targets, occupied
    /// hexes, missing enemy camp) and any action outside a running campaign.
    pub fn perform_action(
        &mut self,
        action: CampaignAction,
    ) -> Result<ActionOutcome, RuleViolation> {
        let actor = self.ensure_active()?;
        log::debug!("player {actor} performs {}", action.kind());
        let outcome = match action {
            CampaignAction::Resupply => self.resupply(actor),
            CampaignAction::Scout { target, distance } => self.scout(actor, target, distance),
            CampaignAction::Search => self.search(actor),
            CampaignAction::Encamp { cost } => self.encamp(actor, cost),
            CampaignAction::Demolish => self.demolish(actor),
        };
        self.sync_rng_cursor();
        outcome
    }

    fn resupply(&mut self, actor: PlayerId) -> Result<ActionOutcome, RuleViolation> {
        let Some(player) = self.state.player(actor) else {
            return self.refuse(RuleViolation::UnknownPlayer(actor));
        };
        let pos = player.position;
        let current = player.supply_points;
        let name = player.name.clone();
        let mut gain = if player.has_base_at(pos) {
            RESUPPLY_AT_BASE
        } else if player.has_camp_at(pos) {
            roll_notation(self.rng.rewards(), RESUPPLY_AT_CAMP_NOTATION)
        } else {
            RESUPPLY_ELSEWHERE
        };
        match self.state.condition_at(self.catalog, pos).map(|c| c.effect) {
            Some(ConditionEffect::BonusResupply) => gain += RESUPPLY_CONDITION_SHIFT,
            Some(ConditionEffect::ReducedResupply) => gain -= RESUPPLY_CONDITION_SHIFT,
            _ => {}
        }

        let actual = gain.min(SP_MAX - current).max(0);
        if actual == 0 {
            let message = if current >= SP_MAX {
                format!("{name} is already at max SP ({SP_MAX})")
            } else {
                format!("{name} gains no SP from resupplying here")
            };
            self.emit(EventKind::System, message);
            return Ok(ActionOutcome::Resupplied { gained: 0 });
        }

        self.apply_to(actor, actual, 0, "Resupply action");
        self.emit(EventKind::Action, format!("{name} resupplied: +{actual} SP"));
        Ok(ActionOutcome::Resupplied { gained: actual })
    }

    fn scout(
        &mut self,
        actor: PlayerId,
        target: HexPosition,
        distance: u32,
    ) -> Result<ActionOutcome, RuleViolation> {
        let Some(hex) = self.state.hex(target) else {
            return self.refuse(RuleViolation::UnknownHex(target));
        };
        if hex.blocked {
            return self.refuse(RuleViolation::HexBlocked(target));
        }
        if hex.explored {
            return self.refuse(RuleViolation::AlreadyExplored(target));
        }
        let Some(player) = self.state.player(actor) else {
            return self.refuse(RuleViolation::UnknownPlayer(actor));
        };
        let available = player.supply_points;
        let name = player.name.clone();
        let needed = i32::try_from(distance).unwrap_or(i32::MAX);
        if available < needed {
            return self.refuse(RuleViolation::InsufficientSupply {
                action: "scout",
                needed,
                available,
            });
        }

        self.apply_to(actor, -needed, 0, format!("Scouted hex {target}"));
        let exploration = self.explore_as(actor, target)?;
        self.emit(
            EventKind::Action,
            format!("{name} scouted {target} (cost: {distance} SP)"),
        );
        Ok(ActionOutcome::Scouted {
            cost: distance,
            exploration,
        })
    }

    fn search(&mut self, actor: PlayerId) -> Result<ActionOutcome, RuleViolation> {
        let Some(player) = self.state.player(actor) else {
            return self.refuse(RuleViolation::UnknownPlayer(actor));
        };
        let pos = player.position;
        let name = player.name.clone();
        let location = self.state.location_at(self.catalog, pos);

        let (supply, campaign_points) = match location.map(|l| (l.effect, l.value.as_ref())) {
            Some((LocationEffect::SearchSupply, value)) => {
                let fallback = RewardValue::notation(SEARCH_SP_DEFAULT_NOTATION);
                (value.unwrap_or(&fallback).resolve(self.rng.rewards()), 0)
            }
            Some((LocationEffect::SearchCampaignPoints, value)) => {
                let fallback = RewardValue::Fixed(SEARCH_CP_DEFAULT);
                (0, value.unwrap_or(&fallback).resolve(self.rng.rewards()))
            }
            _ => (0, 0),
        };

        if supply <= 0 && campaign_points <= 0 {
            self.emit(
                EventKind::Action,
                format!("{name} searched but found nothing"),
            );
            return Ok(ActionOutcome::Searched {
                supply: 0,
                campaign_points: 0,
            });
        }

        let entry = self.apply_to(actor, supply.max(0), campaign_points.max(0), "Search action");
        let (supply, campaign_points) = entry.map_or((0, 0), |e| (e.sp_change(), e.cp_change()));
        let reward = if campaign_points > 0 {
            format!("+{campaign_points} CP")
        } else {
            format!("+{supply} SP")
        };
        self.emit(
            EventKind::Action,
            format!("{name} searched and found: {reward}"),
        );
        Ok(ActionOutcome::Searched {
            supply,
            campaign_points,
        })
    }

    fn encamp(&mut self, actor: PlayerId, cost: u32) -> Result<ActionOutcome, RuleViolation> {
        let Some(player) = self.state.player(actor) else {
            return self.refuse(RuleViolation::UnknownPlayer(actor));
        };
        let pos = player.position;
        let available = player.supply_points;
        let name = player.name.clone();
        if self.state.structure_at(pos).is_some() {
            return self.refuse(RuleViolation::HexOccupied(pos));
        }

        let mut actual = cost;
        if self.state.location_at(self.catalog, pos).map(|l| l.effect)
            == Some(LocationEffect::FreeEncamp)
        {
            actual = 0;
        }
        if self.state.condition_at(self.catalog, pos).map(|c| c.effect)
            == Some(ConditionEffect::CheapEncamp)
        {
            actual = actual.saturating_sub(CHEAP_ENCAMP_DISCOUNT);
        }
        let needed = i32::try_from(actual).unwrap_or(i32::MAX);
        if available < needed {
            return self.refuse(RuleViolation::InsufficientSupply {
                action: "encamp",
                needed,
                available,
            });
        }

        self.apply_to(actor, -needed, 0, format!("Built camp at hex {pos}"));
        if let Some(player) = self.state.player_mut(actor) {
            player.camps.push(pos);
        }
        self.emit(
            EventKind::Action,
            format!("{name} built a camp (cost: {actual} SP)"),
        );
        Ok(ActionOutcome::Encamped {
            position: pos,
            cost: actual,
        })
    }

    /// Only an enemy camp at the actor's position is required.
    fn demolish(&mut self, actor: PlayerId) -> Result<ActionOutcome, RuleViolation> {
        let Some(player) = self.state.player(actor) else {
            return self.refuse(RuleViolation::UnknownPlayer(actor));
        };
        let pos = player.position;
        let name = player.name.clone();
        let owner = self
            .state
            .players
            .iter()
            .find(|p| p.id != actor && p.has_camp_at(pos))
            .map(|p| p.id);
        let Some(owner) = owner else {
            return self.refuse(RuleViolation::NoEnemyCamp(pos));
        };

        let owner_name = self.player_name(owner);
        if let Some(victim) = self.state.player_mut(owner) {
            victim.camps.retain(|camp| *camp != pos);
        }
        self.emit(
            EventKind::Action,
            format!("{name} demolished {owner_name}'s camp!"),
        );
        Ok(ActionOutcome::Demolished {
            owner,
            position: pos,
        })
    }
}
