//! Campaign state machine.
//!
//! [`Campaign`] owns the [`CampaignState`] plus the RNG streams and clock
//! that mutate it. Every rule-checked operation either commits completely or
//! leaves the state untouched apart from an `error`/`warning` event describing
//! why it was refused.
mod actions;
mod battle;
mod exploration;
mod movement;
mod turn;

pub use actions::{ActionKind, ActionOutcome, CampaignAction};
pub use battle::{BattleRecord, BattleResult};
pub use exploration::ExplorationOutcome;
pub use movement::MoveOutcome;
pub use turn::PhaseAdvance;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{PLAYER_COLORS, STARTING_THREAT};
use crate::event::EventKind;
use crate::hex::{HexPosition, shortest_path};
use crate::ledger::{HistoryEntry, apply_delta};
use crate::phase::Phase;
use crate::placement::suggested_base_positions;
use crate::player::{Player, PlayerId};
use crate::priority::{PriorityRank, determine_priority, needs_roll_off};
use crate::rng::{RngBundle, RngCursor};
use crate::settings::{CampaignSettings, SettingsError};
use crate::standings::{Standings, compute_standings};
use crate::state::{CampaignState, Hex, HexMap};
use crate::tables::{MapConfig, TableCatalog, default_catalog};

/// Source of event and history timestamps.
pub type Clock = fn() -> DateTime<Utc>;

/// Why an intent was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("the campaign has not started")]
    NotStarted,
    #[error("the campaign is over")]
    CampaignOver,
    #[error("no player with id {0}")]
    UnknownPlayer(PlayerId),
    #[error("hex {0} is not on the map")]
    UnknownHex(HexPosition),
    #[error("not enough SP to {action} (need {needed}, have {available})")]
    InsufficientSupply {
        action: &'static str,
        needed: i32,
        available: i32,
    },
    #[error("hex {0} has already been explored")]
    AlreadyExplored(HexPosition),
    #[error("hex {0} is blocked")]
    HexBlocked(HexPosition),
    #[error("a battle result must be recorded before leaving the battle phase")]
    BattleNotRecorded,
    #[error("a battle result was already recorded this turn")]
    BattleAlreadyRecorded,
    #[error("cannot build camp at {0}: already occupied")]
    HexOccupied(HexPosition),
    #[error("no enemy camp at {0} to demolish")]
    NoEnemyCamp(HexPosition),
}

impl RuleViolation {
    /// Event kind used when the refusal is logged for players.
    #[must_use]
    pub const fn event_kind(&self) -> EventKind {
        match self {
            Self::AlreadyExplored(_) | Self::HexBlocked(_) => EventKind::Warning,
            _ => EventKind::Error,
        }
    }
}

/// Editable non-resource player fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerUpdate {
    pub name: Option<String>,
    pub team_name: Option<String>,
    pub color: Option<String>,
}

/// A running campaign: state plus the RNG streams and clock that drive it.
#[derive(Debug, Clone)]
pub struct Campaign {
    state: CampaignState,
    rng: RngBundle,
    catalog: &'static TableCatalog,
    clock: Clock,
}

impl Campaign {
    /// Start a new campaign from validated settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the settings are out of range.
    pub fn start(settings: CampaignSettings) -> Result<Self, SettingsError> {
        Self::start_with_clock(settings, Utc::now)
    }

    /// [`Campaign::start`] with an explicit clock.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the settings are out of range.
    pub fn start_with_clock(
        settings: CampaignSettings,
        clock: Clock,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        let map_config = MapConfig::for_player_count(settings.player_count)
            .ok_or(SettingsError::PlayerCount(settings.player_count))?;
        let catalog = default_catalog();

        let mut hexes = HexMap::new();
        for pos in map_config.bounds().positions() {
            hexes.insert(pos, Hex::unexplored(pos, map_config.kind_of(pos)));
        }

        let starts = suggested_base_positions(&map_config, settings.player_count);
        let mut players = Vec::with_capacity(starts.len());
        for (id, &start) in starts.iter().enumerate() {
            if let Some(hex) = hexes.get_mut(&start) {
                hex.explored = true;
                hex.location_key = catalog.base.location_key;
                hex.condition_key = catalog.base.condition_key;
                hex.explored_by.push(id);
            }
            let color = PLAYER_COLORS[id % PLAYER_COLORS.len()];
            players.push(Player::new(id, &settings.name_for(id), color, start));
        }

        let state = CampaignState {
            game_started: true,
            game_ended: false,
            solo_mode: settings.solo_mode,
            current_round: 1,
            current_phase: Phase::Movement,
            current_player_index: 0,
            threat_level: STARTING_THREAT,
            target_threat_level: settings.target_threat_level,
            battle_recorded: false,
            players,
            hexes,
            map_config,
            rng_cursor: RngCursor::fresh(settings.seed),
            settings,
            event_log: Vec::new(),
        };
        let mut campaign = Self {
            rng: RngBundle::from_user_seed(state.settings.seed),
            state,
            catalog,
            clock,
        };
        let message = format!(
            "Campaign started with {} players. Target threat level: {}.",
            campaign.state.players.len(),
            campaign.state.target_threat_level
        );
        log::info!("{message} (seed {})", campaign.rng.seed());
        campaign.emit(EventKind::System, message);
        Ok(campaign)
    }

    /// Resume a campaign from a (validated) snapshot; RNG streams continue
    /// from the saved cursor.
    #[must_use]
    pub fn from_state(state: CampaignState) -> Self {
        Self {
            rng: RngBundle::restore(state.rng_cursor),
            state,
            catalog: default_catalog(),
            clock: Utc::now,
        }
    }

    #[must_use]
    pub const fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Swap in alternative content tables.
    #[must_use]
    pub const fn with_catalog(mut self, catalog: &'static TableCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    #[must_use]
    pub const fn state(&self) -> &CampaignState {
        &self.state
    }

    /// Direct mutable access; bypasses rule checks and the ledger.
    pub const fn state_mut(&mut self) -> &mut CampaignState {
        &mut self.state
    }

    /// Apply a closure to the mutable state.
    pub fn with_state_mut<R>(&mut self, f: impl FnOnce(&mut CampaignState) -> R) -> R {
        f(&mut self.state)
    }

    #[must_use]
    pub fn into_state(self) -> CampaignState {
        self.state
    }

    #[must_use]
    pub const fn catalog(&self) -> &'static TableCatalog {
        self.catalog
    }

    #[must_use]
    pub const fn rng_cursor(&self) -> RngCursor {
        self.state.rng_cursor
    }

    /// Edit display fields of a player. Resource fields are not reachable
    /// from here; they only change through the ledger.
    ///
    /// # Errors
    ///
    /// Refuses before the campaign starts or for an unknown player.
    pub fn update_player(
        &mut self,
        id: PlayerId,
        update: PlayerUpdate,
    ) -> Result<(), RuleViolation> {
        if !self.state.game_started {
            return self.refuse(RuleViolation::NotStarted);
        }
        let Some(player) = self.state.player_mut(id) else {
            return self.refuse(RuleViolation::UnknownPlayer(id));
        };
        if let Some(name) = update.name {
            player.name = name;
        }
        if let Some(team_name) = update.team_name {
            player.team_name = team_name;
        }
        if let Some(color) = update.color {
            player.color = color;
        }
        log::debug!("player {id} updated");
        Ok(())
    }

    /// Flip the blocked flag of a hex, returning the new value.
    ///
    /// # Errors
    ///
    /// Refuses before the campaign starts or for a hex off the map.
    pub fn toggle_hex_blocked(&mut self, pos: HexPosition) -> Result<bool, RuleViolation> {
        if !self.state.game_started {
            return self.refuse(RuleViolation::NotStarted);
        }
        let Some(hex) = self.state.hexes.get_mut(&pos) else {
            return self.refuse(RuleViolation::UnknownHex(pos));
        };
        hex.blocked = !hex.blocked;
        let blocked = hex.blocked;
        let verb = if blocked { "blocked" } else { "unblocked" };
        self.emit(EventKind::System, format!("Hex {pos} {verb}"));
        Ok(blocked)
    }

    /// Nominal encamp cost: distance to the player's nearest base or camp.
    #[must_use]
    pub fn calculate_encamp_cost(&self, id: PlayerId) -> Option<u32> {
        self.state.player(id)?.distance_to_nearest_structure()
    }

    /// Shortest unblocked route from the player's position to `target`.
    #[must_use]
    pub fn path_to(&self, id: PlayerId, target: HexPosition) -> Option<Vec<HexPosition>> {
        let player = self.state.player(id)?;
        let bounds = self.state.map_config.bounds();
        if !bounds.contains(target) {
            return None;
        }
        shortest_path(player.position, target, bounds, &self.state.blocked_positions())
    }

    /// Recompute turn priority and store it on each player.
    pub fn refresh_priority(&mut self) -> Vec<PriorityRank> {
        let ranks = determine_priority(&self.state.players);
        for rank in &ranks {
            if let Some(player) = self.state.player_mut(rank.player_id) {
                player.priority = rank.priority;
            }
        }
        ranks
    }

    #[must_use]
    pub fn needs_roll_off(&self) -> bool {
        needs_roll_off(&self.state.players)
    }

    #[must_use]
    pub fn standings(&self) -> Standings {
        compute_standings(&self.state.players)
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn emit(&mut self, kind: EventKind, message: impl Into<String>) {
        let now = self.now();
        self.state.push_event(kind, message, now);
    }

    /// Log the violation to the event log and return it.
    fn refuse<T>(&mut self, violation: RuleViolation) -> Result<T, RuleViolation> {
        log::warn!("refused: {violation}");
        self.emit(violation.event_kind(), capitalize(&violation.to_string()));
        Err(violation)
    }

    /// Gate for gameplay operations: started, not over, and a valid current
    /// player.
    fn ensure_active(&mut self) -> Result<PlayerId, RuleViolation> {
        if !self.state.game_started {
            return self.refuse(RuleViolation::NotStarted);
        }
        if self.state.game_ended {
            return self.refuse(RuleViolation::CampaignOver);
        }
        let idx = self.state.current_player_index;
        if self.state.current_player().is_none() {
            log::error!(
                "current player index {idx} is outside a roster of {}",
                self.state.players.len()
            );
            debug_assert!(false, "current player index out of range");
            return self.refuse(RuleViolation::UnknownPlayer(idx));
        }
        Ok(idx)
    }

    /// Route a resource change through the ledger for `id`.
    fn apply_to(
        &mut self,
        id: PlayerId,
        sp: i32,
        cp: i32,
        reason: impl Into<String>,
    ) -> Option<HistoryEntry> {
        let stamp = self.state.stamp(self.now());
        let player = self.state.player_mut(id)?;
        Some(apply_delta(player, stamp, sp, cp, reason).clone())
    }

    fn player_name(&self, id: PlayerId) -> String {
        self.state
            .player(id)
            .map_or_else(|| format!("Player {}", id + 1), |p| p.name.clone())
    }

    fn sync_rng_cursor(&mut self) {
        self.state.rng_cursor = self.rng.cursor();
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
