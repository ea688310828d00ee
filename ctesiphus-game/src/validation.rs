//! Checks applied to state crossing the persistence boundary.
//!
//! Nothing here panics on bad input: problems come back as a list of
//! [`ValidationIssue`]s addressed by field path.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

use crate::campaign::ActionKind;
use crate::constants::{SP_MAX, SP_MIN, THREAT_MAX, THREAT_MIN};
use crate::event::EventKind;
use crate::hex::decode_id;
use crate::phase::Phase;
use crate::player::PlayerId;
use crate::state::{CampaignState, UNSET_KEY};
use crate::tables::{HexKind, TableCatalog, default_catalog};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Dotted field path, e.g. `players[1].supply_points`.
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A snapshot that failed validation at load.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("snapshot rejected with {} issue(s): {}", .issues.len(), summarize(.issues))]
pub struct SnapshotRejected {
    pub issues: Vec<ValidationIssue>,
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .take(3)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validate against the bundled content tables.
#[must_use]
pub fn validate_state(state: &CampaignState) -> Vec<ValidationIssue> {
    validate_state_with(state, default_catalog())
}

#[must_use]
pub fn validate_state_with(state: &CampaignState, catalog: &TableCatalog) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if !(THREAT_MIN..=THREAT_MAX).contains(&state.threat_level) {
        issues.push(ValidationIssue::new(
            "threat_level",
            format!("must be between {THREAT_MIN} and {THREAT_MAX}"),
        ));
    }
    if !(THREAT_MIN..=THREAT_MAX).contains(&state.target_threat_level) {
        issues.push(ValidationIssue::new(
            "target_threat_level",
            format!("must be between {THREAT_MIN} and {THREAT_MAX}"),
        ));
    }
    if state.game_started
        && !state.game_ended
        && !state.solo_mode
        && state.threat_level > state.target_threat_level
    {
        issues.push(ValidationIssue::new(
            "threat_level",
            "exceeds the target while the campaign is still running",
        ));
    }
    if state.current_round == 0 {
        issues.push(ValidationIssue::new("current_round", "must be at least 1"));
    }
    if state.game_ended && !state.game_started {
        issues.push(ValidationIssue::new("game_ended", "campaign ended without starting"));
    }
    if state.game_started && state.current_phase == Phase::Setup {
        issues.push(ValidationIssue::new(
            "current_phase",
            "a started campaign cannot be in setup",
        ));
    }

    if let Err(err) = state.settings.validate() {
        issues.push(ValidationIssue::new("settings", err.to_string()));
    }
    if state.game_started {
        if state.players.len() != state.settings.player_count {
            issues.push(ValidationIssue::new(
                "players",
                format!(
                    "has {} entries but settings expect {}",
                    state.players.len(),
                    state.settings.player_count
                ),
            ));
        }
        if state.current_player_index >= state.players.len() {
            issues.push(ValidationIssue::new(
                "current_player_index",
                format!("{} is not a valid player index", state.current_player_index),
            ));
        }
    }

    validate_players(state, &mut issues);
    validate_hexes(state, catalog, &mut issues);
    issues
}

fn validate_players(state: &CampaignState, issues: &mut Vec<ValidationIssue>) {
    let bounds = state.map_config.bounds();
    for (idx, player) in state.players.iter().enumerate() {
        let path = format!("players[{idx}]");
        if player.id != idx {
            issues.push(ValidationIssue::new(
                format!("{path}.id"),
                format!("expected {idx}, found {}", player.id),
            ));
        }
        if !(SP_MIN..=SP_MAX).contains(&player.supply_points) {
            issues.push(ValidationIssue::new(
                format!("{path}.supply_points"),
                format!("must be between {SP_MIN} and {SP_MAX}"),
            ));
        }
        if !bounds.contains(player.position) {
            issues.push(ValidationIssue::new(
                format!("{path}.position"),
                format!("{} is off the map", player.position),
            ));
        }
        if player.bases.is_empty() {
            issues.push(ValidationIssue::new(format!("{path}.bases"), "missing starting base"));
        }
        for (i, pos) in player.structures().enumerate() {
            if !bounds.contains(pos) {
                issues.push(ValidationIssue::new(
                    format!("{path}.structures[{i}]"),
                    format!("{pos} is off the map"),
                ));
            }
        }
    }
}

fn validate_hexes(
    state: &CampaignState,
    catalog: &TableCatalog,
    issues: &mut Vec<ValidationIssue>,
) {
    let config = &state.map_config;
    if !config.is_consistent() {
        issues.push(ValidationIssue::new("map_config", "row counts do not add up"));
    }
    let bounds = config.bounds();
    for (key, hex) in &state.hexes {
        let path = format!("hexes[\"{key}\"]");
        if hex.position != *key {
            issues.push(ValidationIssue::new(
                format!("{path}.position"),
                format!("{} does not match its key", hex.position),
            ));
        }
        if !bounds.contains(*key) {
            issues.push(ValidationIssue::new(path.clone(), "is off the map"));
            continue;
        }
        if hex.kind != config.kind_of(*key) {
            issues.push(ValidationIssue::new(
                format!("{path}.kind"),
                format!("expected {}", config.kind_of(*key)),
            ));
        }
        if hex.explored {
            if catalog.location(hex.kind, hex.location_key).is_none() {
                issues.push(ValidationIssue::new(
                    format!("{path}.location_key"),
                    format!("{} is not a {} location", hex.location_key, hex.kind),
                ));
            }
            if catalog.condition(hex.kind, hex.condition_key).is_none() {
                issues.push(ValidationIssue::new(
                    format!("{path}.condition_key"),
                    format!("{} is not a {} condition", hex.condition_key, hex.kind),
                ));
            }
        } else if hex.location_key != UNSET_KEY || hex.condition_key != UNSET_KEY {
            issues.push(ValidationIssue::new(path.clone(), "unexplored hex carries rolled keys"));
        }
        if let Some(bad) = hex.explored_by.iter().find(|id| **id >= state.players.len()) {
            issues.push(ValidationIssue::new(
                format!("{path}.explored_by"),
                format!("unknown player {bad}"),
            ));
        }
    }
}

#[must_use]
pub fn validate_phase_transition(from: Phase, to: Phase) -> bool {
    from.can_transition_to(to)
}

/// Whether `player_id` may submit `action` in the current phase.
#[must_use]
pub fn validate_player_action(
    state: &CampaignState,
    player_id: PlayerId,
    action: ActionKind,
) -> bool {
    if state.player(player_id).is_none() {
        return false;
    }
    match state.current_phase {
        Phase::Movement => action == ActionKind::Move,
        Phase::Battle => action == ActionKind::RecordBattle,
        Phase::Action => matches!(
            action,
            ActionKind::Resupply
                | ActionKind::Scout
                | ActionKind::Search
                | ActionKind::Encamp
                | ActionKind::Demolish
        ),
        Phase::Setup | Phase::Threat => false,
    }
}

/// Parse and fully validate a JSON snapshot.
///
/// # Errors
///
/// Returns [`SnapshotRejected`] listing every structural, typing and
/// invariant problem found.
pub fn parse_snapshot(json: &str) -> Result<CampaignState, SnapshotRejected> {
    let value: Value = serde_json::from_str(json).map_err(|err| SnapshotRejected {
        issues: vec![ValidationIssue::new("$", format!("invalid JSON: {err}"))],
    })?;

    let structural = check_structure(&value);
    if !structural.is_empty() {
        return Err(SnapshotRejected { issues: structural });
    }

    let state: CampaignState = serde_json::from_value(value).map_err(|err| SnapshotRejected {
        issues: vec![ValidationIssue::new("$", err.to_string())],
    })?;

    let issues = validate_state(&state);
    if issues.is_empty() {
        Ok(state)
    } else {
        Err(SnapshotRejected { issues })
    }
}

#[derive(Clone, Copy)]
enum Shape {
    Bool,
    Integer,
    Str,
    Array,
    Object,
}

impl Shape {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::Bool => value.is_boolean(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Str => value.is_string(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Bool => "a boolean",
            Self::Integer => "an integer",
            Self::Str => "a string",
            Self::Array => "an array",
            Self::Object => "an object",
        }
    }
}

const ROOT_FIELDS: [(&str, Shape); 10] = [
    ("game_started", Shape::Bool),
    ("game_ended", Shape::Bool),
    ("current_round", Shape::Integer),
    ("current_phase", Shape::Str),
    ("current_player_index", Shape::Integer),
    ("threat_level", Shape::Integer),
    ("target_threat_level", Shape::Integer),
    ("players", Shape::Array),
    ("hexes", Shape::Object),
    ("map_config", Shape::Object),
];

const PLAYER_FIELDS: [(&str, Shape); 6] = [
    ("id", Shape::Integer),
    ("name", Shape::Str),
    ("color", Shape::Str),
    ("position", Shape::Str),
    ("supply_points", Shape::Integer),
    ("campaign_points", Shape::Integer),
];

const HEX_FIELDS: [(&str, Shape); 3] = [
    ("position", Shape::Str),
    ("kind", Shape::Str),
    ("explored", Shape::Bool),
];

fn require_fields(
    object: &Map<String, Value>,
    prefix: &str,
    fields: &[(&str, Shape)],
    issues: &mut Vec<ValidationIssue>,
) {
    for (name, shape) in fields {
        let path = if prefix.is_empty() {
            (*name).to_string()
        } else {
            format!("{prefix}.{name}")
        };
        match object.get(*name) {
            None => issues.push(ValidationIssue::new(path, "is required")),
            Some(value) if !shape.matches(value) => {
                issues.push(ValidationIssue::new(path, format!("must be {}", shape.name())));
            }
            Some(_) => {}
        }
    }
}

fn check_enum<T: DeserializeOwned>(
    value: Option<&Value>,
    path: String,
    what: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    if let Some(value) = value.filter(|v| v.is_string()) {
        if serde_json::from_value::<T>(value.clone()).is_err() {
            issues.push(ValidationIssue::new(path, format!("{value} is not a known {what}")));
        }
    }
}

fn check_hex_id(value: Option<&Value>, path: String, issues: &mut Vec<ValidationIssue>) {
    if let Some(id) = value.and_then(Value::as_str) {
        if let Err(err) = decode_id(id) {
            issues.push(ValidationIssue::new(path, err.to_string()));
        }
    }
}

/// Walk the raw JSON so errors carry paths instead of a single serde message.
fn check_structure(value: &Value) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let Some(root) = value.as_object() else {
        issues.push(ValidationIssue::new("$", "snapshot must be a JSON object"));
        return issues;
    };
    require_fields(root, "", &ROOT_FIELDS, &mut issues);
    check_enum::<Phase>(root.get("current_phase"), "current_phase".into(), "phase", &mut issues);

    if let Some(players) = root.get("players").and_then(Value::as_array) {
        for (idx, player) in players.iter().enumerate() {
            let path = format!("players[{idx}]");
            let Some(object) = player.as_object() else {
                issues.push(ValidationIssue::new(path, "must be an object"));
                continue;
            };
            require_fields(object, &path, &PLAYER_FIELDS, &mut issues);
            check_hex_id(object.get("position"), format!("{path}.position"), &mut issues);
        }
    }

    if let Some(hexes) = root.get("hexes").and_then(Value::as_object) {
        for (key, hex) in hexes {
            let path = format!("hexes[\"{key}\"]");
            if let Err(err) = decode_id(key) {
                issues.push(ValidationIssue::new(path.clone(), err.to_string()));
            }
            let Some(object) = hex.as_object() else {
                issues.push(ValidationIssue::new(path, "must be an object"));
                continue;
            };
            require_fields(object, &path, &HEX_FIELDS, &mut issues);
            check_enum::<HexKind>(
                object.get("kind"),
                format!("{path}.kind"),
                "hex kind",
                &mut issues,
            );
        }
    }

    if let Some(events) = root.get("event_log").and_then(Value::as_array) {
        for (idx, event) in events.iter().enumerate() {
            let path = format!("event_log[{idx}]");
            check_enum::<EventKind>(
                event.get("kind"),
                format!("{path}.kind"),
                "event kind",
                &mut issues,
            );
            check_enum::<Phase>(event.get("phase"), format!("{path}.phase"), "phase", &mut issues);
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::Campaign;
    use crate::hex::HexPosition;
    use crate::settings::CampaignSettings;

    fn started() -> CampaignState {
        Campaign::start(CampaignSettings::for_players(3).with_seed(5))
            .unwrap()
            .into_state()
    }

    #[test]
    fn fresh_campaign_is_valid() {
        assert!(validate_state(&started()).is_empty());
        assert!(validate_state(&CampaignState::default()).is_empty());
    }

    #[test]
    fn out_of_range_values_are_reported_with_paths() {
        let mut state = started();
        state.players[1].supply_points = 11;
        state.threat_level = 0;
        state.current_player_index = 7;
        let issues = validate_state(&state);
        let paths: Vec<_> = issues.iter().map(|i| i.path.as_str()).collect();
        assert!(paths.contains(&"players[1].supply_points"));
        assert!(paths.contains(&"threat_level"));
        assert!(paths.contains(&"current_player_index"));
    }

    #[test]
    fn player_count_must_match_settings() {
        let mut state = started();
        state.players.pop();
        let issues = validate_state(&state);
        assert!(issues.iter().any(|i| i.path == "players"));
    }

    #[test]
    fn explored_hexes_need_table_keys() {
        let mut state = started();
        let pos = HexPosition::new(2, 2);
        let hex = state.hexes.get_mut(&pos).unwrap();
        hex.explored = true;
        hex.location_key = 40;
        hex.condition_key = 12;
        let issues = validate_state(&state);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "hexes[\"2,2\"].location_key");
    }

    #[test]
    fn threat_above_target_only_flagged_while_running() {
        let mut state = started();
        state.threat_level = 9;
        assert!(!validate_state(&state).is_empty());
        state.game_ended = true;
        assert!(validate_state(&state).is_empty());
        state.game_ended = false;
        state.solo_mode = true;
        assert!(validate_state(&state).is_empty());
    }

    #[test]
    fn phase_table_has_exactly_five_edges() {
        let legal: Vec<_> = Phase::ALL
            .iter()
            .flat_map(|&from| Phase::ALL.iter().map(move |&to| (from, to)))
            .filter(|&(from, to)| validate_phase_transition(from, to))
            .collect();
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
    fn player_actions_follow_phase() {
        let mut state = started();
        assert!(validate_player_action(&state, 0, ActionKind::Move));
        assert!(!validate_player_action(&state, 0, ActionKind::Scout));
        assert!(!validate_player_action(&state, 9, ActionKind::Move));
        state.current_phase = Phase::Battle;
        assert!(validate_player_action(&state, 2, ActionKind::RecordBattle));
        state.current_phase = Phase::Action;
        assert!(validate_player_action(&state, 1, ActionKind::Demolish));
        assert!(!validate_player_action(&state, 1, ActionKind::Move));
        state.current_phase = Phase::Threat;
        assert!(!validate_player_action(&state, 1, ActionKind::Resupply));
    }

    #[test]
    fn parse_snapshot_roundtrips_valid_state() {
        let state = started();
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(parse_snapshot(&json), Ok(state));
    }

    #[test]
    fn parse_snapshot_reports_structural_paths() {
        let mut value = serde_json::to_value(started()).unwrap();
        value["current_phase"] = Value::from("lunch");
        value["players"][0]["supply_points"] = Value::from("ten");
        value["hexes"]
            .as_object_mut()
            .unwrap()
            .insert("nope".into(), serde_json::json!({}));
        let err = parse_snapshot(&value.to_string()).unwrap_err();
        let paths: Vec<_> = err.issues.iter().map(|i| i.path.as_str()).collect();
        assert!(paths.contains(&"current_phase"));
        assert!(paths.contains(&"players[0].supply_points"));
        assert!(paths.contains(&"hexes[\"nope\"]"));
        assert!(err.to_string().starts_with("snapshot rejected"));
    }

    #[test]
    fn parse_snapshot_never_panics_on_garbage() {
        for input in ["", "[]", "null", "{\"players\": 3}", "{{{{"] {
            assert!(parse_snapshot(input).is_err());
        }
    }

    #[test]
    fn parse_snapshot_survives_extreme_numbers() {
        let mut value = serde_json::to_value(started()).unwrap();
        value["map_config"]["surface_rows"] = Value::from(1);
        value["map_config"]["tomb_rows"] = Value::from(u32::MAX);
        value["current_round"] = Value::from(u32::MAX);
        value["threat_level"] = Value::from(u8::MAX);
        value["current_player_index"] = Value::from(u64::MAX);
        value["players"][0]["supply_points"] = Value::from(i32::MIN);
        value["players"][0]["campaign_points"] = Value::from(i32::MAX);
        value["players"][0]["operatives_killed"] = Value::from(u32::MAX);
        value["players"][0]["games_played"] = Value::from(u32::MAX);
        let err = parse_snapshot(&value.to_string()).unwrap_err();
        let paths: Vec<_> = err.issues.iter().map(|i| i.path.as_str()).collect();
        assert!(paths.contains(&"map_config"));
        assert!(paths.contains(&"threat_level"));
        assert!(paths.contains(&"current_player_index"));
        assert!(paths.contains(&"players[0].supply_points"));
    }
}
