//! Centralized balance constants for campaign logic.
//!
//! Content (location and condition text) lives in the JSON table asset; the
//! numbers that drive the rules live here so they change only through
//! reviewed code.

// Supply points ------------------------------------------------------------
pub const SP_MIN: i32 = 0;
pub const SP_MAX: i32 = 10;
pub(crate) const STARTING_SP: i32 = 10;
pub(crate) const STARTING_CP: i32 = 0;

// Resupply -----------------------------------------------------------------
pub(crate) const RESUPPLY_AT_BASE: i32 = 10;
pub(crate) const RESUPPLY_AT_CAMP_NOTATION: &str = "D3+3";
pub(crate) const RESUPPLY_ELSEWHERE: i32 = 1;
pub(crate) const RESUPPLY_CONDITION_SHIFT: i32 = 1;

// Search -------------------------------------------------------------------
pub(crate) const SEARCH_SP_DEFAULT_NOTATION: &str = "D3";
pub(crate) const SEARCH_CP_DEFAULT: i32 = 1;

// Encamp -------------------------------------------------------------------
pub(crate) const CHEAP_ENCAMP_DISCOUNT: u32 = 1;

// Battle rewards (sp, cp) --------------------------------------------------
pub(crate) const VICTORY_REWARD: (i32, i32) = (0, 1);
pub(crate) const DRAW_REWARD: (i32, i32) = (1, 0);
pub(crate) const DEFEAT_REWARD: (i32, i32) = (1, 0);
pub(crate) const BYE_REWARD: (i32, i32) = (2, 0);

// Threat -------------------------------------------------------------------
pub const THREAT_MIN: u8 = 1;
pub const THREAT_MAX: u8 = 10;
pub(crate) const STARTING_THREAT: u8 = 1;
pub(crate) const DEFAULT_TARGET_THREAT: u8 = 7;
pub(crate) const THREAT_PER_ROUND: u8 = 1;
pub(crate) const DEFAULT_EXPLORE_THREAT: u8 = 1;

// Players ------------------------------------------------------------------
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;
pub(crate) const DEFAULT_PLAYERS: usize = 4;
pub const PLAYER_COLORS: [&str; MAX_PLAYERS] = [
    "#e74c3c", "#3498db", "#2ecc71", "#f39c12", "#9b59b6", "#1abc9c",
];

// Base placement -----------------------------------------------------------
pub(crate) const SMALL_GAME_MAX_PLAYERS: usize = 3;
pub(crate) const SMALL_GAME_BASE_DISTANCE: u32 = 2;
pub(crate) const LARGE_GAME_BASE_DISTANCE: u32 = 1;
