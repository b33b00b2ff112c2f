// Bucket fill over the tile set's pixel grid.
use std::collections::VecDeque;

use hashbrown::HashSet;
use itertools::Itertools;

use crate::{
    common::{ColourIdx, PixelCoord, TileIdx},
    error::{check_colour_index, Result},
    tileset::TileSet,
};

/// Fills the 4-connected region sharing the colour at `(x, y)` with `colour`.
///
/// The region crosses tile boundaries but never leaves the tile set. Returns
/// the indices of the tiles that changed, in ascending order; a start point
/// outside the tile set, or one already of `colour`, changes nothing.
pub fn flood_fill(
    tile_set: &mut TileSet,
    x: PixelCoord,
    y: PixelCoord,
    colour: ColourIdx,
) -> Result<Vec<TileIdx>> {
    check_colour_index(colour)?;
    let Some(original) = tile_set.get_pixel_at(x, y) else {
        return Ok(vec![]);
    };
    if original == colour {
        return Ok(vec![]);
    }

    let mut touched: HashSet<TileIdx> = HashSet::new();
    let mut queue = VecDeque::new();
    queue.push_back((x, y));
    // Cells are recoloured as they are queued, so no separate visited set.
    tile_set.set_pixel_at(x, y, colour)?;

    while let Some((cx, cy)) = queue.pop_front() {
        if let Some(idx) = tile_set.get_tile_index_by_coordinate(cx, cy) {
            touched.insert(idx);
        }
        for (nx, ny) in [(cx - 1, cy), (cx + 1, cy), (cx, cy - 1), (cx, cy + 1)] {
            if tile_set.get_pixel_at(nx, ny) == Some(original) {
                tile_set.set_pixel_at(nx, ny, colour)?;
                queue.push_back((nx, ny));
            }
        }
    }
    Ok(touched.into_iter().sorted().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::Tile;

    fn tile_set() -> TileSet {
        let mut ts = TileSet::new(2);
        for _ in 0..4 {
            ts.add_tile(Tile::filled(0));
        }
        ts
    }

    #[test]
    fn test_fill_crosses_tiles() {
        let mut ts = tile_set();
        let touched = flood_fill(&mut ts, 3, 3, 7).unwrap();
        assert_eq!(touched, vec![0, 1, 2, 3]);
        assert!(ts.pixels().all(|p| p == Some(7)));
    }

    #[test]
    fn test_fill_stays_inside_region() {
        let mut ts = tile_set();
        // A vertical wall of colour 1 at x = 4 splits the left half off.
        for y in 0..16 {
            ts.set_pixel_at(4, y, 1).unwrap();
        }
        let touched = flood_fill(&mut ts, 0, 0, 2).unwrap();
        assert_eq!(touched, vec![0, 2]);
        for y in 0..16 {
            for x in 0..16 {
                let expected = match x {
                    0..=3 => 2,
                    4 => 1,
                    _ => 0,
                };
                assert_eq!(ts.get_pixel_at(x, y), Some(expected), "({x}, {y})");
            }
        }
    }

    #[test]
    fn test_fill_is_not_diagonal() {
        let mut ts = TileSet::new(1);
        ts.add_tile(Tile::filled(1));
        ts.set_pixel_at(0, 0, 0).unwrap();
        ts.set_pixel_at(1, 1, 0).unwrap();
        flood_fill(&mut ts, 0, 0, 5).unwrap();
        assert_eq!(ts.get_pixel_at(0, 0), Some(5));
        assert_eq!(ts.get_pixel_at(1, 1), Some(0));
    }

    #[test]
    fn test_fill_no_ops() {
        let mut ts = tile_set();
        assert!(flood_fill(&mut ts, -1, 0, 3).unwrap().is_empty());
        assert!(flood_fill(&mut ts, 16, 0, 3).unwrap().is_empty());
        assert!(flood_fill(&mut ts, 0, 0, 0).unwrap().is_empty());
        assert!(flood_fill(&mut ts, 0, 0, 16).is_err());
        assert!(ts.pixels().all(|p| p == Some(0)));
    }
}
