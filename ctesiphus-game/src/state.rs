//! Campaign aggregate: players, hex map, turn pointers and threat.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::constants::STARTING_THREAT;
use crate::event::{CampaignEvent, EventId, EventKind};
use crate::hex::HexPosition;
use crate::ledger::LedgerStamp;
use crate::phase::Phase;
use crate::player::{Player, PlayerId};
use crate::rng::RngCursor;
use crate::settings::CampaignSettings;
use crate::tables::{ConditionEntry, HexKind, LocationEntry, MapConfig, TableCatalog};

/// Hex map keyed by position; serializes as a JSON object keyed by hex id.
pub type HexMap = BTreeMap<HexPosition, Hex>;

/// Key value meaning "not rolled yet".
pub const UNSET_KEY: u8 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hex {
    pub position: HexPosition,
    pub kind: HexKind,
    pub explored: bool,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default)]
    pub location_key: u8,
    #[serde(default)]
    pub condition_key: u8,
    #[serde(default)]
    pub explored_by: Vec<PlayerId>,
}

impl Hex {
    #[must_use]
    pub const fn unexplored(position: HexPosition, kind: HexKind) -> Self {
        Self {
            position,
            kind,
            explored: false,
            blocked: false,
            location_key: UNSET_KEY,
            condition_key: UNSET_KEY,
            explored_by: Vec::new(),
        }
    }
}

/// What stands on a hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Structure {
    Base,
    Camp,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignState {
    pub game_started: bool,
    pub game_ended: bool,
    #[serde(default)]
    pub solo_mode: bool,
    pub current_round: u32,
    pub current_phase: Phase,
    pub current_player_index: usize,
    pub threat_level: u8,
    pub target_threat_level: u8,
    /// Set once the current turn's battle result is in.
    #[serde(default)]
    pub battle_recorded: bool,
    pub players: Vec<Player>,
    pub hexes: HexMap,
    pub map_config: MapConfig,
    #[serde(default)]
    pub settings: CampaignSettings,
    #[serde(default)]
    pub event_log: Vec<CampaignEvent>,
    #[serde(default)]
    pub rng_cursor: RngCursor,
}

impl Default for CampaignState {
    fn default() -> Self {
        let settings = CampaignSettings::default();
        Self {
            game_started: false,
            game_ended: false,
            solo_mode: false,
            current_round: 1,
            current_phase: Phase::Setup,
            current_player_index: 0,
            threat_level: STARTING_THREAT,
            target_threat_level: settings.target_threat_level,
            battle_recorded: false,
            players: Vec::new(),
            hexes: HexMap::new(),
            map_config: MapConfig::default(),
            settings,
            event_log: Vec::new(),
            rng_cursor: RngCursor::default(),
        }
    }
}

impl CampaignState {
    /// Started and not yet over.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.game_started && !self.game_ended
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    #[must_use]
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player_index)
    }

    #[must_use]
    pub fn hex(&self, pos: HexPosition) -> Option<&Hex> {
        self.hexes.get(&pos)
    }

    #[must_use]
    pub const fn is_last_player(&self) -> bool {
        self.current_player_index.saturating_add(1) >= self.players.len()
    }

    /// Owner and kind of the structure at `pos`, bases first.
    #[must_use]
    pub fn structure_at(&self, pos: HexPosition) -> Option<(PlayerId, Structure)> {
        self.players
            .iter()
            .find(|p| p.has_base_at(pos))
            .map(|p| (p.id, Structure::Base))
            .or_else(|| {
                self.players
                    .iter()
                    .find(|p| p.has_camp_at(pos))
                    .map(|p| (p.id, Structure::Camp))
            })
    }

    #[must_use]
    pub fn blocked_positions(&self) -> HashSet<HexPosition> {
        self.hexes
            .values()
            .filter(|hex| hex.blocked)
            .map(|hex| hex.position)
            .collect()
    }

    #[must_use]
    pub fn explored_count(&self) -> usize {
        self.hexes.values().filter(|hex| hex.explored).count()
    }

    /// Rolled location of an explored hex.
    #[must_use]
    pub fn location_at<'c>(
        &self,
        catalog: &'c TableCatalog,
        pos: HexPosition,
    ) -> Option<&'c LocationEntry> {
        let hex = self.hex(pos).filter(|hex| hex.explored)?;
        catalog.location(hex.kind, hex.location_key)
    }

    /// Rolled condition of an explored hex.
    #[must_use]
    pub fn condition_at<'c>(
        &self,
        catalog: &'c TableCatalog,
        pos: HexPosition,
    ) -> Option<&'c ConditionEntry> {
        let hex = self.hex(pos).filter(|hex| hex.explored)?;
        catalog.condition(hex.kind, hex.condition_key)
    }

    #[must_use]
    pub const fn stamp(&self, timestamp: DateTime<Utc>) -> LedgerStamp {
        LedgerStamp {
            round: self.current_round,
            phase: self.current_phase,
            timestamp,
        }
    }

    pub fn push_event(
        &mut self,
        kind: EventKind,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) {
        let seq = u32::try_from(self.event_log.len()).unwrap_or(u32::MAX);
        self.event_log.push(CampaignEvent {
            id: EventId {
                round: self.current_round,
                seq,
            },
            kind,
            message: message.into(),
            round: self.current_round,
            phase: self.current_phase,
            timestamp,
        });
    }

    #[must_use]
    pub fn last_event(&self) -> Option<&CampaignEvent> {
        self.event_log.last()
    }
}
