//! Dice rolling and reward resolution.
//!
//! Content tables express rewards either as a literal integer or as dice
//! notation (`D3`, `2D6+1`). Malformed notation in the rolling API resolves to
//! zero so a bad table row never aborts a turn; [`parse_notation`] is the
//! strict variant used when loading content.
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Largest die count and die size accepted by [`parse_notation`].
pub const MAX_DICE_COUNT: u32 = 100;
pub const MAX_DICE_SIDES: u32 = 1_000;

static NOTATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d*)D(\d+)([+-]\d+)?$").expect("valid dice notation pattern")
});

/// Parsed `[count]D<sides>[+|-modifier]` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceNotation {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
}

impl DiceNotation {
    /// Roll every die and add the modifier.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> (i32, Vec<i32>) {
        let rolls: Vec<i32> = (0..self.count)
            .map(|_| roll_range(rng, 1, i32::try_from(self.sides).unwrap_or(i32::MAX)))
            .collect();
        let total = rolls
            .iter()
            .fold(0_i32, |acc, r| acc.saturating_add(*r))
            .saturating_add(self.modifier);
        (total, rolls)
    }
}

impl fmt::Display for DiceNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count != 1 {
            write!(f, "{}", self.count)?;
        }
        write!(f, "D{}", self.sides)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{m}"),
            m => write!(f, "{m}"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("`{0}` is not valid dice notation")]
    Malformed(String),
    #[error("`{0}` rolls a die with zero sides")]
    ZeroSides(String),
    #[error("`{0}` rolls more or larger dice than allowed")]
    TooLarge(String),
}

/// Strictly parse dice notation. Whitespace around the expression is ignored.
///
/// # Errors
///
/// Returns [`NotationError`] if the text does not match the notation grammar,
/// a component overflows, the die has zero sides, or the count or sides
/// exceed [`MAX_DICE_COUNT`] / [`MAX_DICE_SIDES`].
pub fn parse_notation(text: &str) -> Result<DiceNotation, NotationError> {
    let trimmed = text.trim();
    let malformed = || NotationError::Malformed(text.to_string());
    let caps = NOTATION_RE.captures(trimmed).ok_or_else(malformed)?;

    let count = match caps.get(1).map(|m| m.as_str()) {
        None | Some("") => 1,
        Some(raw) => raw.parse::<u32>().map_err(|_| malformed())?,
    };
    let sides = caps
        .get(2)
        .ok_or_else(malformed)?
        .as_str()
        .parse::<u32>()
        .map_err(|_| malformed())?;
    let modifier = match caps.get(3) {
        Some(m) => m.as_str().parse::<i32>().map_err(|_| malformed())?,
        None => 0,
    };
    if sides == 0 {
        return Err(NotationError::ZeroSides(text.to_string()));
    }
    if count > MAX_DICE_COUNT || sides > MAX_DICE_SIDES {
        return Err(NotationError::TooLarge(text.to_string()));
    }
    Ok(DiceNotation {
        count,
        sides,
        modifier,
    })
}

/// Uniform integer in `[min, max]`. A reversed range collapses to `min`.
pub fn roll_range<R: Rng + ?Sized>(rng: &mut R, min: i32, max: i32) -> i32 {
    if max <= min {
        return min;
    }
    rng.gen_range(min..=max)
}

/// D36 roll: a D3 tens digit and a D6 units digit, giving one of
/// 11..=16, 21..=26 or 31..=36.
pub fn roll_d36<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    let tens = rng.gen_range(1..=3_u8);
    let units = rng.gen_range(1..=6_u8);
    tens * 10 + units
}

/// True for the 18 keys [`roll_d36`] can produce.
#[must_use]
pub const fn is_d36_key(key: u8) -> bool {
    let tens = key / 10;
    let units = key % 10;
    tens >= 1 && tens <= 3 && units >= 1 && units <= 6
}

/// Roll notation, returning 0 when it cannot be parsed.
pub fn roll_notation<R: Rng + ?Sized>(rng: &mut R, notation: &str) -> i32 {
    match parse_notation(notation) {
        Ok(dice) => dice.roll(rng).0,
        Err(err) => {
            log::debug!("{err}; resolving to 0");
            0
        }
    }
}

/// Roll result with per-die detail for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollBreakdown {
    pub total: i32,
    pub rolls: Vec<i32>,
    pub modifier: i32,
    pub notation: String,
}

/// Like [`roll_notation`] but keeps each die. Invalid notation produces an
/// empty breakdown that still carries the input text.
pub fn roll_with_breakdown<R: Rng + ?Sized>(rng: &mut R, notation: &str) -> RollBreakdown {
    let Ok(dice) = parse_notation(notation) else {
        return RollBreakdown {
            total: 0,
            rolls: Vec::new(),
            modifier: 0,
            notation: notation.to_string(),
        };
    };
    let (total, rolls) = dice.roll(rng);
    RollBreakdown {
        total,
        rolls,
        modifier: dice.modifier,
        notation: notation.to_string(),
    }
}

/// Reward amount as written in a content table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RewardValue {
    Fixed(i32),
    Notation(String),
}

impl RewardValue {
    #[must_use]
    pub fn notation(text: &str) -> Self {
        Self::Notation(text.to_string())
    }

    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        resolve_value(rng, self)
    }
}

impl From<i32> for RewardValue {
    fn from(value: i32) -> Self {
        Self::Fixed(value)
    }
}

impl fmt::Display for RewardValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(v) => write!(f, "{v}"),
            Self::Notation(n) => f.write_str(n),
        }
    }
}

/// Integers pass through; strings containing an upper-case `D` are rolled;
/// any other string is parsed as an integer and falls back to 0, so `"d3"`
/// resolves to 0.
pub fn resolve_value<R: Rng + ?Sized>(rng: &mut R, value: &RewardValue) -> i32 {
    match value {
        RewardValue::Fixed(v) => *v,
        RewardValue::Notation(text) if text.contains('D') => {
            roll_notation(rng, text)
        }
        RewardValue::Notation(text) => text.trim().parse::<i32>().unwrap_or(0),
    }
}
