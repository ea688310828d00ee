//! Append-only campaign event log.
//!
//! The log doubles as the error surface for gameplay: every refused intent
//! leaves an `error` or `warning` entry here.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::phase::Phase;

/// Stable identifier for a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId {
    /// Round the event occurred in.
    pub round: u32,
    /// Position of the event in the whole log (0-based).
    pub seq: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    System,
    Movement,
    Exploration,
    Battle,
    Action,
    Reward,
    Warning,
    Error,
}

impl EventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Movement => "movement",
            Self::Exploration => "exploration",
            Self::Battle => "battle",
            Self::Action => "action",
            Self::Reward => "reward",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    #[must_use]
    pub const fn is_problem(self) -> bool {
        matches!(self, Self::Warning | Self::Error)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignEvent {
    pub id: EventId,
    pub kind: EventKind,
    pub message: String,
    pub round: u32,
    pub phase: Phase,
    pub timestamp: DateTime<Utc>,
}
