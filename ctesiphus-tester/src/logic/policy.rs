use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use ctesiphus_game::tables::LocationEffect;
use ctesiphus_game::{Campaign, CampaignAction, HexPosition, PlayerId, distance};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// A movement the policy wants to make this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePlan {
    pub target: HexPosition,
    pub cost: u32,
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Pick a destination for the movement phase, or hold position.
    fn plan_move(&mut self, campaign: &Campaign, player: PlayerId) -> Option<MovePlan>;

    /// Pick an action for the action phase, or skip it.
    fn plan_action(&mut self, campaign: &Campaign, player: PlayerId) -> Option<CampaignAction>;
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameplayStrategy {
    Cautious,
    Aggressive,
    Balanced,
    Random,
}

impl GameplayStrategy {
    pub const ALL: [Self; 4] = [Self::Cautious, Self::Aggressive, Self::Balanced, Self::Random];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cautious => "Cautious",
            Self::Aggressive => "Aggressive",
            Self::Balanced => "Balanced",
            Self::Random => "Random",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Cautious => Box::new(CautiousPolicy),
            Self::Aggressive => Box::new(AggressivePolicy),
            Self::Balanced => Box::new(BalancedPolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GameplayStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cautious" => Ok(Self::Cautious),
            "aggressive" => Ok(Self::Aggressive),
            "balanced" => Ok(Self::Balanced),
            "random" => Ok(Self::Random),
            other => bail!("unknown strategy: {other}"),
        }
    }
}

/// Closest unexplored, unblocked hex; ties resolve to map order.
fn nearest_unexplored(campaign: &Campaign, from: HexPosition) -> Option<(HexPosition, u32)> {
    campaign
        .state()
        .hexes
        .values()
        .filter(|hex| !hex.explored && !hex.blocked)
        .map(|hex| (hex.position, distance(from, hex.position)))
        .min_by_key(|&(_, d)| d)
}

/// Walk up to `steps` hexes along the shortest path toward the nearest
/// unexplored hex. Cost is one SP per hex.
fn step_toward_unexplored(campaign: &Campaign, player: PlayerId, steps: usize) -> Option<MovePlan> {
    let position = campaign.state().player(player)?.position;
    let (goal, _) = nearest_unexplored(campaign, position)?;
    let path = campaign.path_to(player, goal)?;
    let taken = steps.min(path.len());
    let target = *path.get(taken.checked_sub(1)?)?;
    Some(MovePlan {
        target,
        cost: u32::try_from(taken).ok()?,
    })
}

fn supply(campaign: &Campaign, player: PlayerId) -> i32 {
    campaign
        .state()
        .player(player)
        .map_or(0, |p| p.supply_points)
}

fn enemy_camp_here(campaign: &Campaign, player: PlayerId) -> bool {
    let state = campaign.state();
    let Some(me) = state.player(player) else {
        return false;
    };
    state
        .players
        .iter()
        .any(|p| p.id != player && p.has_camp_at(me.position))
}

fn searchable_here(campaign: &Campaign, player: PlayerId) -> bool {
    let state = campaign.state();
    let Some(me) = state.player(player) else {
        return false;
    };
    state
        .location_at(campaign.catalog(), me.position)
        .is_some_and(|loc| {
            matches!(
                loc.effect,
                LocationEffect::SearchSupply | LocationEffect::SearchCampaignPoints
            )
        })
}

fn can_encamp(campaign: &Campaign, player: PlayerId, reserve: i32) -> Option<CampaignAction> {
    let state = campaign.state();
    let me = state.player(player)?;
    if state.structure_at(me.position).is_some() {
        return None;
    }
    let cost = campaign.calculate_encamp_cost(player)?;
    (i32::try_from(cost).ok()? + reserve <= me.supply_points)
        .then_some(CampaignAction::Encamp { cost })
}

struct CautiousPolicy;
struct AggressivePolicy;
struct BalancedPolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed ^ 0x5EED_CA4D),
        }
    }
}

impl PlayerPolicy for CautiousPolicy {
    fn name(&self) -> &'static str {
        "cautious"
    }

    fn plan_move(&mut self, campaign: &Campaign, player: PlayerId) -> Option<MovePlan> {
        if supply(campaign, player) < 4 {
            return None;
        }
        step_toward_unexplored(campaign, player, 1)
    }

    fn plan_action(&mut self, campaign: &Campaign, player: PlayerId) -> Option<CampaignAction> {
        if searchable_here(campaign, player) {
            return Some(CampaignAction::Search);
        }
        Some(CampaignAction::Resupply)
    }
}

impl PlayerPolicy for AggressivePolicy {
    fn name(&self) -> &'static str {
        "aggressive"
    }

    fn plan_move(&mut self, campaign: &Campaign, player: PlayerId) -> Option<MovePlan> {
        let plan = step_toward_unexplored(campaign, player, 2)?;
        let affordable = i32::try_from(plan.cost).ok()? <= supply(campaign, player);
        affordable
            .then_some(plan)
            .or_else(|| step_toward_unexplored(campaign, player, 1))
    }

    fn plan_action(&mut self, campaign: &Campaign, player: PlayerId) -> Option<CampaignAction> {
        if enemy_camp_here(campaign, player) {
            return Some(CampaignAction::Demolish);
        }
        let position = campaign.state().player(player)?.position;
        if let Some((target, cost)) = nearest_unexplored(campaign, position) {
            if i32::try_from(cost).ok()? + 2 <= supply(campaign, player) {
                return Some(CampaignAction::Scout {
                    target,
                    distance: cost,
                });
            }
        }
        Some(CampaignAction::Resupply)
    }
}

impl PlayerPolicy for BalancedPolicy {
    fn name(&self) -> &'static str {
        "balanced"
    }

    fn plan_move(&mut self, campaign: &Campaign, player: PlayerId) -> Option<MovePlan> {
        step_toward_unexplored(campaign, player, 1)
    }

    fn plan_action(&mut self, campaign: &Campaign, player: PlayerId) -> Option<CampaignAction> {
        if searchable_here(campaign, player) {
            return Some(CampaignAction::Search);
        }
        can_encamp(campaign, player, 3).or(Some(CampaignAction::Resupply))
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn plan_move(&mut self, campaign: &Campaign, player: PlayerId) -> Option<MovePlan> {
        let steps = self.rng.gen_range(0..=2);
        if steps == 0 {
            return None;
        }
        step_toward_unexplored(campaign, player, steps)
    }

    fn plan_action(&mut self, campaign: &Campaign, player: PlayerId) -> Option<CampaignAction> {
        match self.rng.gen_range(0..6) {
            0 => None,
            1 => Some(CampaignAction::Search),
            2 => can_encamp(campaign, player, 0),
            3 => Some(CampaignAction::Demolish),
            4 => {
                let position = campaign.state().player(player)?.position;
                nearest_unexplored(campaign, position).map(|(target, distance)| {
                    CampaignAction::Scout { target, distance }
                })
            }
            _ => Some(CampaignAction::Resupply),
        }
    }
}
