//! Ctesiphus Campaign Engine
//!
//! Platform-agnostic core for a hex-grid Kill Team campaign: the phase/turn
//! state machine, supply ledger, dice-driven exploration and the validation
//! applied to snapshots at the persistence boundary. Storage, authorization
//! and presentation are left to the embedding application.

pub mod campaign;
pub mod constants;
pub mod dice;
pub mod event;
pub mod hex;
pub mod ledger;
pub mod phase;
pub mod placement;
pub mod player;
pub mod priority;
pub mod rng;
pub mod settings;
pub mod standings;
pub mod state;
pub mod tables;
pub mod validation;

// Re-export commonly used types
pub use campaign::{
    ActionKind, ActionOutcome, BattleRecord, BattleResult, Campaign, CampaignAction, Clock,
    ExplorationOutcome, MoveOutcome, PhaseAdvance, PlayerUpdate, RuleViolation,
};
pub use dice::{
    DiceNotation, NotationError, RewardValue, RollBreakdown, parse_notation, roll_d36,
    roll_notation, roll_range, roll_with_breakdown,
};
pub use event::{CampaignEvent, EventId, EventKind};
pub use hex::{
    GridBounds, HexIdError, HexPosition, decode_id, distance, encode_id, hexes_in_range,
    neighbors, shortest_path,
};
pub use ledger::{HistoryEntry, apply_delta, clamp_supply};
pub use phase::Phase;
pub use player::{Player, PlayerId};
pub use priority::{PriorityRank, determine_priority, needs_roll_off};
pub use rng::{RngBundle, RngCursor};
pub use settings::{CampaignSettings, SettingsError};
pub use standings::{StandingCategory, Standings, compute_standings};
pub use state::{CampaignState, Hex, HexMap, Structure};
pub use tables::{HexKind, MapConfig, TableCatalog, default_catalog, threat_level_name};
pub use validation::{
    SnapshotRejected, ValidationIssue, parse_snapshot, validate_phase_transition,
    validate_player_action, validate_state,
};

/// Trait for abstracting snapshot persistence.
/// Platform-specific implementations should provide this
pub trait CampaignStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the serialized snapshot stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load_snapshot(&self, id: &str) -> Result<Option<String>, Self::Error>;

    /// Store a serialized snapshot under `id`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    fn save_snapshot(&self, id: &str, snapshot: &str) -> Result<(), Self::Error>;

    /// Remove the snapshot stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be deleted.
    fn delete_snapshot(&self, id: &str) -> Result<(), Self::Error>;
}

/// Creates campaigns and moves them across the storage boundary.
pub struct CampaignEngine<S>
where
    S: CampaignStorage,
{
    storage: S,
}

impl<S> CampaignEngine<S>
where
    S: CampaignStorage,
{
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Start a new campaign.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] for out-of-range settings.
    pub fn create(&self, settings: CampaignSettings) -> Result<Campaign, SettingsError> {
        Campaign::start(settings)
    }

    /// Load and validate a stored campaign. Every snapshot passes the full
    /// validation layer before it is used.
    ///
    /// # Errors
    ///
    /// Returns the storage error, or a [`SnapshotRejected`] when the stored
    /// snapshot is malformed.
    pub fn load(&self, id: &str) -> anyhow::Result<Option<Campaign>> {
        let Some(json) = self.storage.load_snapshot(id)? else {
            return Ok(None);
        };
        let state = parse_snapshot(&json).inspect_err(|err| {
            log::warn!("campaign {id} rejected: {err}");
        })?;
        log::info!("campaign {id} loaded at round {}", state.current_round);
        Ok(Some(Campaign::from_state(state)))
    }

    /// Persist a campaign snapshot. A failed save leaves the in-memory
    /// campaign untouched and is reported to the caller.
    ///
    /// # Errors
    ///
    /// Returns serialization or storage errors.
    pub fn save(&self, id: &str, campaign: &Campaign) -> anyhow::Result<()> {
        let json = serde_json::to_string(campaign.state())?;
        self.storage.save_snapshot(id, &json)?;
        log::info!("campaign {id} saved ({} bytes)", json.len());
        Ok(())
    }

    /// Delete a stored campaign.
    ///
    /// # Errors
    ///
    /// Returns the storage error.
    pub fn delete(&self, id: &str) -> anyhow::Result<()> {
        self.storage.delete_snapshot(id)?;
        Ok(())
    }
}
