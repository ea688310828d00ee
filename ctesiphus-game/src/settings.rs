//! Campaign setup options.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_PLAYERS, DEFAULT_TARGET_THREAT, MAX_PLAYERS, MIN_PLAYERS, THREAT_MAX, THREAT_MIN,
};
use crate::player::{PlayerId, default_player_name};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignSettings {
    pub player_count: usize,
    pub solo_mode: bool,
    /// Display names by seat; missing or blank entries fall back to "Player N".
    pub player_names: Vec<String>,
    pub target_threat_level: u8,
    pub seed: u64,
}

impl Default for CampaignSettings {
    fn default() -> Self {
        Self {
            player_count: DEFAULT_PLAYERS,
            solo_mode: false,
            player_names: Vec::new(),
            target_threat_level: DEFAULT_TARGET_THREAT,
            seed: 0,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("player count {0} is outside {MIN_PLAYERS}..={MAX_PLAYERS}")]
    PlayerCount(usize),
    #[error("target threat level {0} is outside {THREAT_MIN}..={THREAT_MAX}")]
    TargetThreat(u8),
    #[error("{names} player names supplied for {players} players")]
    TooManyNames { names: usize, players: usize },
}

impl CampaignSettings {
    /// Settings for `players` seats with default names and threat target.
    #[must_use]
    pub fn for_players(players: usize) -> Self {
        Self {
            player_count: players,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.player_names = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub const fn with_solo_mode(mut self, solo: bool) -> Self {
        self.solo_mode = solo;
        self
    }

    #[must_use]
    pub const fn with_target_threat(mut self, target: u8) -> Self {
        self.target_threat_level = target;
        self
    }

    /// Check ranges before a campaign is built from these settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] for an unsupported player count, an
    /// out-of-range threat target, or more names than seats.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.player_count) {
            return Err(SettingsError::PlayerCount(self.player_count));
        }
        if !(THREAT_MIN..=THREAT_MAX).contains(&self.target_threat_level) {
            return Err(SettingsError::TargetThreat(self.target_threat_level));
        }
        if self.player_names.len() > self.player_count {
            return Err(SettingsError::TooManyNames {
                names: self.player_names.len(),
                players: self.player_count,
            });
        }
        Ok(())
    }

    /// Resolved display name for seat `id`.
    #[must_use]
    pub fn name_for(&self, id: PlayerId) -> String {
        self.player_names
            .get(id)
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map_or_else(|| default_player_name(id), ToString::to_string)
    }
}
