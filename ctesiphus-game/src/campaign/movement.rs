use serde::{Deserialize, Serialize};

use super::{Campaign, ExplorationOutcome, RuleViolation};
use crate::event::EventKind;
use crate::hex::HexPosition;
use crate::player::PlayerId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub player: PlayerId,
    pub from: HexPosition,
    pub to: HexPosition,
    pub cost: u32,
    /// Present when the destination was unexplored.
    pub exploration: Option<ExplorationOutcome>,
}

impl Campaign {
    /// Move a player to `target`, paying `cost` supply. Arriving on an
    /// unexplored hex explores it for the mover.
    ///
    /// # Errors
    ///
    /// Refuses unknown players or hexes, blocked destinations, and moves the
    /// player cannot afford.
    pub fn move_player(
        &mut self,
        id: PlayerId,
        target: HexPosition,
        cost: u32,
    ) -> Result<MoveOutcome, RuleViolation> {
        self.ensure_active()?;
        let Some(player) = self.state.player(id) else {
            return self.refuse(RuleViolation::UnknownPlayer(id));
        };
        let from = player.position;
        let available = player.supply_points;
        let name = player.name.clone();
        let Some(hex) = self.state.hex(target) else {
            return self.refuse(RuleViolation::UnknownHex(target));
        };
        if hex.blocked {
            return self.refuse(RuleViolation::HexBlocked(target));
        }
        let needs_exploring = !hex.explored;
        let needed = i32::try_from(cost).unwrap_or(i32::MAX);
        if available < needed {
            return self.refuse(RuleViolation::InsufficientSupply {
                action: "move",
                needed,
                available,
            });
        }

        self.apply_to(id, -needed, 0, format!("Moved to hex {target}"));
        if let Some(player) = self.state.player_mut(id) {
            player.position = target;
        }
        self.emit(
            EventKind::Movement,
            format!("{name} moved to {target} (cost: {cost} SP)"),
        );

        let exploration = if needs_exploring {
            self.explore_as(id, target).ok()
        } else {
            None
        };
        Ok(MoveOutcome {
            player: id,
            from,
            to: target,
            cost,
            exploration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::tests::campaign;

    #[test]
    fn unaffordable_move_changes_nothing() {
        let mut campaign = campaign(2);
        campaign.state_mut().players[0].supply_points = 3;
        let before = campaign.state().players[0].clone();
        let events = campaign.state().event_log.len();

        let result = campaign.move_player(0, HexPosition::new(2, 2), 5);
        assert_eq!(
            result,
            Err(RuleViolation::InsufficientSupply {
                action: "move",
                needed: 5,
                available: 3
            })
        );
        assert_eq!(campaign.state().players[0], before);
        assert_eq!(campaign.state().event_log.len(), events + 1);
        assert_eq!(
            campaign.state().last_event().map(|e| e.kind),
            Some(EventKind::Error)
        );
    }

    #[test]
    fn move_spends_supply_and_explores_destination() {
        let mut campaign = campaign(2);
        let target = HexPosition::new(1, 1);
        let outcome = campaign.move_player(0, target, 1).unwrap();
        assert_eq!(outcome.from, HexPosition::new(0, 1));
        let exploration = outcome.exploration.expect("destination explored");
        let player = &campaign.state().players[0];
        assert_eq!(player.position, target);
        assert_eq!(player.history[0].sp_after, 9);
        assert_eq!(player.hexes_explored, 1);
        assert_eq!(
            player.supply_points,
            (9 + exploration.supply_gained).min(10)
        );
        assert!(campaign.state().hex(target).unwrap().explored);
    }

    #[test]
    fn moving_onto_explored_hex_does_not_reroll() {
        let mut campaign = campaign(2);
        let base = HexPosition::new(0, 3);
        let outcome = campaign.move_player(0, base, 0).unwrap();
        assert!(outcome.exploration.is_none());
        assert_eq!(campaign.state().players[0].hexes_explored, 0);
    }

    #[test]
    fn blocked_destination_is_refused() {
        let mut campaign = campaign(2);
        let target = HexPosition::new(1, 0);
        campaign.toggle_hex_blocked(target).unwrap();
        assert_eq!(
            campaign.move_player(0, target, 1),
            Err(RuleViolation::HexBlocked(target))
        );
        assert_eq!(campaign.state().players[0].position, HexPosition::new(0, 1));
    }
}
