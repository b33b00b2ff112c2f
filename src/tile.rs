// Module for a single 8x8 tile of palette indices.
use serde::{Deserialize, Serialize};

use crate::{
    common::{ColourIdx, TILE_PIXELS, TILE_SIZE},
    error::{check_colour_index, EditorError, Result},
};

/// 8x8 cells of palette indices. Only 0-15 are meaningful colours, but any
/// byte value can be stored.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pixels: [[ColourIdx; TILE_SIZE]; TILE_SIZE],
}

fn cell_out_of_range(index: usize) -> EditorError {
    EditorError::IndexOutOfRange {
        what: "tile cell",
        index,
        len: TILE_PIXELS,
    }
}

fn coord_out_of_range(what: &'static str, value: usize) -> EditorError {
    EditorError::OutOfRange {
        what,
        value: value as i64,
        min: 0,
        max: TILE_SIZE as i64 - 1,
    }
}

impl Tile {
    pub fn new() -> Self {
        Tile::default()
    }

    pub fn filled(value: ColourIdx) -> Self {
        Tile {
            pixels: [[value; TILE_SIZE]; TILE_SIZE],
        }
    }

    /// Builds a tile from exactly 64 cells in row-major order.
    pub fn from_slice(data: &[ColourIdx]) -> Result<Self> {
        if data.len() != TILE_PIXELS {
            return Err(EditorError::OutOfRange {
                what: "tile data length",
                value: data.len() as i64,
                min: TILE_PIXELS as i64,
                max: TILE_PIXELS as i64,
            });
        }
        let mut tile = Tile::new();
        for (row, chunk) in tile.pixels.iter_mut().zip(data.chunks_exact(TILE_SIZE)) {
            row.copy_from_slice(chunk);
        }
        Ok(tile)
    }

    pub const fn len(&self) -> usize {
        TILE_PIXELS
    }

    pub const fn is_empty(&self) -> bool {
        false
    }

    pub fn clear(&mut self) {
        *self = Tile::new();
    }

    /// All 64 cells in row-major order.
    pub fn read_all(&self) -> [ColourIdx; TILE_PIXELS] {
        let mut out = [0; TILE_PIXELS];
        for (chunk, row) in out.chunks_exact_mut(TILE_SIZE).zip(&self.pixels) {
            chunk.copy_from_slice(row);
        }
        out
    }

    /// Cells `start..end` in row-major order.
    pub fn read_from(&self, start: usize, end: usize) -> Result<Vec<ColourIdx>> {
        if start > TILE_PIXELS {
            return Err(cell_out_of_range(start));
        }
        if end > TILE_PIXELS || end < start {
            return Err(cell_out_of_range(end));
        }
        Ok(self.read_all()[start..end].to_vec())
    }

    pub fn read_at(&self, index: usize) -> Result<ColourIdx> {
        if index >= TILE_PIXELS {
            return Err(cell_out_of_range(index));
        }
        Ok(self.pixels[index / TILE_SIZE][index % TILE_SIZE])
    }

    pub fn read_at_coord(&self, x: usize, y: usize) -> Result<ColourIdx> {
        if x >= TILE_SIZE {
            return Err(coord_out_of_range("tile x coordinate", x));
        }
        if y >= TILE_SIZE {
            return Err(coord_out_of_range("tile y coordinate", y));
        }
        Ok(self.pixels[y][x])
    }

    /// Returns true if the stored value changed.
    pub fn set_value_at(&mut self, index: usize, value: ColourIdx) -> Result<bool> {
        if index >= TILE_PIXELS {
            return Err(cell_out_of_range(index));
        }
        let cell = &mut self.pixels[index / TILE_SIZE][index % TILE_SIZE];
        let changed = *cell != value;
        *cell = value;
        Ok(changed)
    }

    pub fn set_value_at_coord(&mut self, x: usize, y: usize, value: ColourIdx) -> Result<bool> {
        if x >= TILE_SIZE {
            return Err(coord_out_of_range("tile x coordinate", x));
        }
        if y >= TILE_SIZE {
            return Err(coord_out_of_range("tile y coordinate", y));
        }
        self.set_value_at(y * TILE_SIZE + x, value)
    }

    /// Replaces every cell equal to `source` with `target`.
    pub fn replace_colour_index(&mut self, source: ColourIdx, target: ColourIdx) -> Result<()> {
        check_colour_index(source)?;
        check_colour_index(target)?;
        if source == target {
            return Ok(());
        }
        for cell in self.pixels.iter_mut().flatten() {
            if *cell == source {
                *cell = target;
            }
        }
        Ok(())
    }

    /// Exchanges every occurrence of `first` and `second`.
    pub fn swap_colour_index(&mut self, first: ColourIdx, second: ColourIdx) -> Result<()> {
        check_colour_index(first)?;
        check_colour_index(second)?;
        if first == second {
            return Ok(());
        }
        for cell in self.pixels.iter_mut().flatten() {
            if *cell == first {
                *cell = second;
            } else if *cell == second {
                *cell = first;
            }
        }
        Ok(())
    }

    pub fn mirror_horizontal(&self) -> Tile {
        let mut out = *self;
        for row in out.pixels.iter_mut() {
            row.reverse();
        }
        out
    }

    pub fn mirror_vertical(&self) -> Tile {
        let mut out = *self;
        out.pixels.reverse();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_tile() -> Tile {
        let data: Vec<u8> = (0..64).map(|i| (i % 16) as u8).collect();
        Tile::from_slice(&data).unwrap()
    }

    #[test]
    fn test_index_and_coord_access_agree() {
        let mut tile = Tile::new();
        assert!(tile.set_value_at_coord(3, 5, 9).unwrap());
        assert_eq!(tile.read_at(5 * 8 + 3).unwrap(), 9);
        assert_eq!(tile.read_at_coord(3, 5).unwrap(), 9);
        // Writing the same value again reports no change.
        assert!(!tile.set_value_at(43, 9).unwrap());
        // Out-of-palette values are stored as-is.
        assert!(tile.set_value_at(0, 200).unwrap());
        assert_eq!(tile.read_at(0).unwrap(), 200);
    }

    #[test]
    fn test_out_of_range_access_fails() {
        let mut tile = Tile::new();
        assert!(tile.read_at(64).is_err());
        assert!(tile.set_value_at(64, 1).is_err());
        assert!(tile.read_at_coord(8, 0).is_err());
        assert!(tile.set_value_at_coord(0, 8, 1).is_err());
        assert!(tile.read_from(10, 65).is_err());
        assert!(tile.read_from(10, 5).is_err());
        assert!(Tile::from_slice(&[0; 63]).is_err());
    }

    #[test]
    fn test_read_all_and_read_from() {
        let tile = numbered_tile();
        let all = tile.read_all();
        assert_eq!(all.len(), tile.len());
        assert_eq!(all[17], 1);
        assert_eq!(tile.read_from(8, 12).unwrap(), vec![8, 9, 10, 11]);
        assert_eq!(tile.read_from(60, 64).unwrap(), vec![12, 13, 14, 15]);
    }

    #[test]
    fn test_replace_colour_index() {
        let mut tile = numbered_tile();
        tile.replace_colour_index(3, 4).unwrap();
        let all = tile.read_all();
        assert!(!all.contains(&3));
        assert_eq!(all.iter().filter(|&&c| c == 4).count(), 8);
        assert!(tile.replace_colour_index(16, 0).is_err());
        assert!(tile.replace_colour_index(0, 16).is_err());
    }

    #[test]
    fn test_swap_twice_is_identity() {
        let original = numbered_tile();
        let mut tile = original;
        tile.swap_colour_index(2, 7).unwrap();
        assert_eq!(tile.read_at(2).unwrap(), 7);
        assert_eq!(tile.read_at(7).unwrap(), 2);
        tile.swap_colour_index(2, 7).unwrap();
        assert_eq!(tile, original);
    }

    #[test]
    fn test_mirroring() {
        let tile = numbered_tile();
        let h = tile.mirror_horizontal();
        assert_eq!(h.read_at_coord(0, 0).unwrap(), tile.read_at_coord(7, 0).unwrap());
        let v = tile.mirror_vertical();
        assert_eq!(v.read_at_coord(2, 0).unwrap(), tile.read_at_coord(2, 7).unwrap());
        assert_eq!(h.mirror_horizontal(), tile);
        assert_eq!(v.mirror_vertical(), tile);
    }

    #[test]
    fn test_clear() {
        let mut tile = Tile::filled(15);
        tile.clear();
        assert_eq!(tile, Tile::new());
    }
}
