//! Turn phases and the transition table between them.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Phase of a player turn. `Setup` only exists before the first turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Setup,
    #[default]
    Movement,
    Battle,
    Action,
    Threat,
}

impl Phase {
    pub const ALL: [Self; 5] = [
        Self::Setup,
        Self::Movement,
        Self::Battle,
        Self::Action,
        Self::Threat,
    ];

    /// Phases played each turn, in order.
    pub const TURN_ORDER: [Self; 4] = [Self::Movement, Self::Battle, Self::Action, Self::Threat];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Movement => "movement",
            Self::Battle => "battle",
            Self::Action => "action",
            Self::Threat => "threat",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Setup => "Setup",
            Self::Movement => "Movement",
            Self::Battle => "Battle",
            Self::Action => "Action",
            Self::Threat => "Threat",
        }
    }

    /// The single phase this one may legally advance into.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Setup | Self::Threat => Self::Movement,
            Self::Movement => Self::Battle,
            Self::Battle => Self::Action,
            Self::Action => Self::Threat,
        }
    }

    /// True when leaving this phase ends the player's turn.
    #[must_use]
    pub const fn ends_turn(self) -> bool {
        matches!(self, Self::Threat)
    }

    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        self.next() == to
    }

    /// Phases that block advancing until their requirement is met.
    #[must_use]
    pub const fn is_mandatory(self) -> bool {
        matches!(self, Self::Battle)
    }

    #[must_use]
    pub const fn requirement_message(self) -> &'static str {
        match self {
            Self::Setup => "Place bases before the first turn.",
            Self::Movement => "Movement is optional. You can Hold Position or Regroup.",
            Self::Battle => "You must record a battle result (Win/Loss/Draw/Bye)",
            Self::Action => "Action is optional. You can skip if desired.",
            Self::Threat => "Threat phase auto-completes when threat is increased",
        }
    }

    /// Prompt shown before skipping an optional phase; `None` for the rest.
    #[must_use]
    pub const fn skip_confirmation(self) -> Option<&'static str> {
        match self {
            Self::Movement => {
                Some("Skip Movement Phase? You will not move your kill team this round.")
            }
            Self::Action => {
                Some("Skip Action Phase? You will not perform any campaign action this round.")
            }
            Self::Setup | Self::Battle | Self::Threat => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown phase `{0}`")]
pub struct UnknownPhase(pub String);

impl FromStr for Phase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|phase| phase.as_str() == lowered)
            .ok_or_else(|| UnknownPhase(s.to_string()))
    }
}

impl From<Phase> for String {
    fn from(value: Phase) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_five_legal_edges() {
        let mut legal = Vec::new();
        for from in Phase::ALL {
            for to in Phase::ALL {
                if from.can_transition_to(to) {
                    legal.push((from, to));
                }
            }
        }
        assert_eq!(
            legal,
            vec![
                (Phase::Setup, Phase::Movement),
                (Phase::Movement, Phase::Battle),
                (Phase::Battle, Phase::Action),
                (Phase::Action, Phase::Threat),
                (Phase::Threat, Phase::Movement),
            ]
        );
    }

    #[test]
    fn only_battle_blocks_advancing() {
        let mandatory: Vec<_> = Phase::TURN_ORDER
            .into_iter()
            .filter(|p| p.is_mandatory())
            .collect();
        assert_eq!(mandatory, vec![Phase::Battle]);
        assert!(Phase::Movement.skip_confirmation().is_some());
        assert!(Phase::Battle.skip_confirmation().is_none());
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Battle".parse::<Phase>(), Ok(Phase::Battle));
        assert_eq!(" threat ".parse::<Phase>(), Ok(Phase::Threat));
        assert!("deployment".parse::<Phase>().is_err());
        assert_eq!(String::from(Phase::Action), "action");
    }
}
