//! Base placement rules.
use crate::constants::{LARGE_GAME_BASE_DISTANCE, SMALL_GAME_BASE_DISTANCE, SMALL_GAME_MAX_PLAYERS};
use crate::hex::{HexPosition, distance};
use crate::tables::{HexKind, MapConfig};

/// Minimum hex distance between any two bases.
#[must_use]
pub const fn minimum_base_distance(player_count: usize) -> u32 {
    if player_count <= SMALL_GAME_MAX_PLAYERS {
        SMALL_GAME_BASE_DISTANCE
    } else {
        LARGE_GAME_BASE_DISTANCE
    }
}

#[must_use]
pub fn bases_too_close(a: HexPosition, b: HexPosition, min_distance: u32) -> bool {
    distance(a, b) < min_distance
}

/// Bases go on surface hexes, never on another base, and respect the
/// minimum spacing for the player count.
#[must_use]
pub fn is_valid_base_placement(
    config: &MapConfig,
    position: HexPosition,
    existing: &[HexPosition],
    player_count: usize,
) -> bool {
    if !config.bounds().contains(position) || config.kind_of(position) != HexKind::Surface {
        return false;
    }
    let min = minimum_base_distance(player_count);
    existing.iter().all(|&base| {
        let d = distance(position, base);
        d != 0 && d >= min
    })
}

/// Evenly spaced starting bases along row 0.
#[must_use]
pub fn suggested_base_positions(config: &MapConfig, player_count: usize) -> Vec<HexPosition> {
    let Ok(count) = u32::try_from(player_count) else {
        return Vec::new();
    };
    if count == 0 {
        return Vec::new();
    }
    let spacing = config.cols / count;
    let last_col = config.cols.saturating_sub(1);
    (0..count)
        .map(|i| HexPosition::new(0, (spacing * i + spacing / 2).min(last_col)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacing_depends_on_player_count() {
        assert_eq!(minimum_base_distance(2), 2);
        assert_eq!(minimum_base_distance(3), 2);
        assert_eq!(minimum_base_distance(4), 1);
        assert_eq!(minimum_base_distance(6), 1);
    }

    #[test]
    fn suggestions_spread_along_top_row() {
        let small = MapConfig::for_player_count(2).unwrap();
        assert_eq!(
            suggested_base_positions(&small, 2),
            vec![HexPosition::new(0, 1), HexPosition::new(0, 3)]
        );
        let standard = MapConfig::for_player_count(4).unwrap();
        assert_eq!(
            suggested_base_positions(&standard, 4),
            vec![
                HexPosition::new(0, 0),
                HexPosition::new(0, 1),
                HexPosition::new(0, 2),
                HexPosition::new(0, 3)
            ]
        );
        let xl = MapConfig::for_player_count(6).unwrap();
        let cols: Vec<_> = suggested_base_positions(&xl, 6).iter().map(|p| p.col).collect();
        assert_eq!(cols, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn placement_rejects_tomb_overlap_and_crowding() {
        let config = MapConfig::for_player_count(2).unwrap();
        let existing = [HexPosition::new(0, 1)];
        assert!(!is_valid_base_placement(&config, HexPosition::new(3, 3), &existing, 2));
        assert!(!is_valid_base_placement(&config, HexPosition::new(0, 1), &existing, 2));
        assert!(!is_valid_base_placement(&config, HexPosition::new(0, 2), &existing, 2));
        assert!(is_valid_base_placement(&config, HexPosition::new(0, 3), &existing, 2));
        assert!(!is_valid_base_placement(&config, HexPosition::new(0, 9), &existing, 2));
        assert!(bases_too_close(HexPosition::new(0, 1), HexPosition::new(0, 2), 2));
    }
}
