//! Hex grid coordinate math for the campaign map.
//!
//! The map stores hexes in offset coordinates (`row`, `col`) using the
//! "odd-r" layout: odd rows are shoved half a hex to the right. Distance and
//! range queries convert to axial/cube space, where hex math is linear.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Delimiter between row and column in a hex id.
pub const HEX_ID_DELIMITER: char = ',';

const EVEN_ROW_DIRECTIONS: [(i64, i64); 6] = [(-1, -1), (-1, 0), (0, -1), (0, 1), (1, -1), (1, 0)];
const ODD_ROW_DIRECTIONS: [(i64, i64); 6] = [(-1, 0), (-1, 1), (0, -1), (0, 1), (1, 0), (1, 1)];

/// Neighbor list; a hex never has more than six.
pub type Neighbors = SmallVec<[HexPosition; 6]>;

/// Offset position of a hex on the campaign map.
///
/// Serializes as its id string (`"row,col"`) so it can key JSON objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexPosition {
    pub row: u32,
    pub col: u32,
}

impl HexPosition {
    #[must_use]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    #[must_use]
    pub fn to_axial(self) -> AxialCoords {
        offset_to_axial(self.row, self.col)
    }

    /// Stable string id for this position.
    #[must_use]
    pub fn id(self) -> String {
        encode_id(self)
    }
}

impl fmt::Display for HexPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{HEX_ID_DELIMITER}{}", self.row, self.col)
    }
}

impl FromStr for HexPosition {
    type Err = HexIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_id(s)
    }
}

impl TryFrom<String> for HexPosition {
    type Error = HexIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        decode_id(&value)
    }
}

impl From<HexPosition> for String {
    fn from(value: HexPosition) -> Self {
        encode_id(value)
    }
}

/// Errors raised when a hex id cannot be decoded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HexIdError {
    #[error("hex id `{0}` is missing the `{HEX_ID_DELIMITER}` delimiter")]
    MissingDelimiter(String),
    #[error("hex id `{id}` has an invalid {part} component")]
    InvalidComponent { id: String, part: &'static str },
}

/// Axial coordinates; the implicit cube coordinate is `s = -q - r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxialCoords {
    pub q: i64,
    pub r: i64,
}

impl AxialCoords {
    #[must_use]
    pub const fn to_cube(self) -> CubeCoords {
        CubeCoords {
            x: self.q,
            y: -self.q - self.r,
            z: self.r,
        }
    }
}

/// Cube coordinates (`x + y + z == 0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CubeCoords {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

/// Rectangular map extent used to filter neighbor and range queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub rows: u32,
    pub cols: u32,
}

impl GridBounds {
    #[must_use]
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    #[must_use]
    pub const fn contains(self, pos: HexPosition) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Every position inside the bounds in row-major order.
    pub fn positions(self) -> impl Iterator<Item = HexPosition> {
        (0..self.rows)
            .flat_map(move |row| (0..self.cols).map(move |col| HexPosition::new(row, col)))
    }

    fn offset(self, pos: HexPosition, d_row: i64, d_col: i64) -> Option<HexPosition> {
        let row = u32::try_from(i64::from(pos.row) + d_row).ok()?;
        let col = u32::try_from(i64::from(pos.col) + d_col).ok()?;
        let candidate = HexPosition::new(row, col);
        self.contains(candidate).then_some(candidate)
    }
}

/// Screen-space projection of a hex center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPosition {
    pub x: f64,
    pub y: f64,
}

#[must_use]
pub fn offset_to_axial(row: u32, col: u32) -> AxialCoords {
    let r = i64::from(row);
    AxialCoords {
        q: i64::from(col) - r.div_euclid(2),
        r,
    }
}

/// Inverse of [`offset_to_axial`]. Returns `None` when the axial coordinate
/// falls outside the non-negative offset quadrant.
#[must_use]
pub fn axial_to_offset(q: i64, r: i64) -> Option<HexPosition> {
    let col = q + r.div_euclid(2);
    Some(HexPosition::new(
        u32::try_from(r).ok()?,
        u32::try_from(col).ok()?,
    ))
}

/// Hex distance between two offset positions.
#[must_use]
pub fn distance(a: HexPosition, b: HexPosition) -> u32 {
    let ac = a.to_axial().to_cube();
    let bc = b.to_axial().to_cube();
    let d = (ac.x - bc.x)
        .abs()
        .max((ac.y - bc.y).abs())
        .max((ac.z - bc.z).abs());
    u32::try_from(d).unwrap_or(u32::MAX)
}

/// Adjacent hexes of `pos` that lie inside `bounds`.
#[must_use]
pub fn neighbors(pos: HexPosition, bounds: GridBounds) -> Neighbors {
    let directions = if pos.row % 2 == 0 {
        &EVEN_ROW_DIRECTIONS
    } else {
        &ODD_ROW_DIRECTIONS
    };
    directions
        .iter()
        .filter_map(|&(d_row, d_col)| bounds.offset(pos, d_row, d_col))
        .collect()
}

/// All hexes with `0 < distance <= range` from `center`, paired with their
/// distance, in row-major order.
#[must_use]
pub fn hexes_in_range(
    center: HexPosition,
    range: u32,
    bounds: GridBounds,
) -> Vec<(HexPosition, u32)> {
    bounds
        .positions()
        .filter_map(|pos| {
            let d = distance(center, pos);
            (d > 0 && d <= range).then_some((pos, d))
        })
        .collect()
}

/// Breadth-first shortest path from `start` to `end`.
///
/// The returned path excludes `start` and includes `end`. `Some(vec![])` means
/// the two positions coincide; `None` means `end` is blocked or unreachable.
#[must_use]
pub fn shortest_path(
    start: HexPosition,
    end: HexPosition,
    bounds: GridBounds,
    blocked: &HashSet<HexPosition>,
) -> Option<Vec<HexPosition>> {
    if start == end {
        return Some(Vec::new());
    }
    if blocked.contains(&end) {
        return None;
    }

    let mut came_from: HashMap<HexPosition, HexPosition> = HashMap::new();
    let mut queue = VecDeque::from([start]);
    let mut visited = HashSet::from([start]);

    while let Some(current) = queue.pop_front() {
        for next in neighbors(current, bounds) {
            if visited.contains(&next) || blocked.contains(&next) {
                continue;
            }
            visited.insert(next);
            came_from.insert(next, current);
            if next == end {
                return Some(rebuild_path(&came_from, start, end));
            }
            queue.push_back(next);
        }
    }

    None
}

fn rebuild_path(
    came_from: &HashMap<HexPosition, HexPosition>,
    start: HexPosition,
    end: HexPosition,
) -> Vec<HexPosition> {
    let mut path = vec![end];
    let mut cursor = end;
    while let Some(&prev) = came_from.get(&cursor) {
        if prev == start {
            break;
        }
        path.push(prev);
        cursor = prev;
    }
    path.reverse();
    path
}

#[must_use]
pub fn encode_id(pos: HexPosition) -> String {
    pos.to_string()
}

/// Decode a `"row,col"` id back into a position.
///
/// # Errors
///
/// Returns [`HexIdError`] when the delimiter is missing or either component
/// is not a non-negative integer.
pub fn decode_id(id: &str) -> Result<HexPosition, HexIdError> {
    let (row, col) = id
        .split_once(HEX_ID_DELIMITER)
        .ok_or_else(|| HexIdError::MissingDelimiter(id.to_string()))?;
    let row = row
        .trim()
        .parse::<u32>()
        .map_err(|_| HexIdError::InvalidComponent {
            id: id.to_string(),
            part: "row",
        })?;
    let col = col
        .trim()
        .parse::<u32>()
        .map_err(|_| HexIdError::InvalidComponent {
            id: id.to_string(),
            part: "col",
        })?;
    Ok(HexPosition::new(row, col))
}

/// Pointy-top projection: columns advance by three quarters of a hex width,
/// odd columns drop half a row.
#[must_use]
pub fn to_pixel_pointy(pos: HexPosition, hex_size: f64) -> PixelPosition {
    let width = hex_size * 2.0;
    let height = 3.0_f64.sqrt() * hex_size;
    let horiz = width * 0.75;
    let col_shift = if pos.col % 2 == 1 { height / 2.0 } else { 0.0 };
    PixelPosition {
        x: f64::from(pos.col) * horiz,
        y: f64::from(pos.row) * height + col_shift,
    }
}

/// Flat-top projection: rows advance by three quarters of a hex height, odd
/// rows shift right by half a hex width.
#[must_use]
pub fn to_pixel_flat(pos: HexPosition, hex_size: f64) -> PixelPosition {
    let width = 3.0_f64.sqrt() * hex_size;
    let height = hex_size * 2.0;
    let vert = height * 0.75;
    let row_shift = if pos.row % 2 == 1 { width / 2.0 } else { 0.0 };
    PixelPosition {
        x: f64::from(pos.col) * width + row_shift,
        y: f64::from(pos.row) * vert,
    }
}
