// Module for the ordered set of tiles and its 2-D pixel addressing.
use serde::{Deserialize, Serialize};

use crate::{
    common::{ColourIdx, PixelCoord, TileIdx, TILE_PIXELS, TILE_SIZE},
    error::{check_colour_index, EditorError, Result},
    tile::Tile,
};

/// Tiles in left-to-right, top-to-bottom order. `tile_width` only controls
/// how the sequence is laid out as a grid; changing it never reorders tiles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSet {
    tiles: Vec<Tile>,
    tile_width: usize,
}

impl Default for TileSet {
    fn default() -> Self {
        TileSet {
            tiles: vec![],
            tile_width: 1,
        }
    }
}

impl TileSet {
    pub fn new(tile_width: usize) -> Self {
        TileSet {
            tiles: vec![],
            tile_width,
        }
    }

    /// Builds a tile set from raw cells, 64 per tile. A trailing partial tile
    /// is padded with index 0.
    pub fn from_bytes(data: &[ColourIdx], tile_width: usize) -> Self {
        let tiles = data
            .chunks(TILE_PIXELS)
            .map(|chunk| {
                let mut cells = [0; TILE_PIXELS];
                cells[..chunk.len()].copy_from_slice(chunk);
                // Length is exactly TILE_PIXELS by construction.
                Tile::from_slice(&cells).unwrap_or_default()
            })
            .collect();
        TileSet { tiles, tile_width }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile_width(&self) -> usize {
        self.tile_width
    }

    pub fn set_tile_width(&mut self, tile_width: usize) {
        self.tile_width = tile_width;
    }

    /// Number of tile rows; zero when the layout width is zero.
    pub fn tile_height(&self) -> usize {
        if self.tile_width == 0 {
            return 0;
        }
        self.tiles.len().div_ceil(self.tile_width)
    }

    pub fn width_px(&self) -> usize {
        self.tile_width * TILE_SIZE
    }

    pub fn height_px(&self) -> usize {
        self.tile_height() * TILE_SIZE
    }

    pub fn total_px(&self) -> usize {
        self.width_px() * self.height_px()
    }

    pub fn add_tile(&mut self, tile: Tile) {
        self.tiles.push(tile);
    }

    pub fn insert_tile_at(&mut self, tile: Tile, index: TileIdx) -> Result<()> {
        if index > self.tiles.len() {
            return Err(self.out_of_range(index));
        }
        self.tiles.insert(index, tile);
        Ok(())
    }

    pub fn remove_tile(&mut self, index: TileIdx) -> Result<Tile> {
        if index >= self.tiles.len() {
            return Err(self.out_of_range(index));
        }
        Ok(self.tiles.remove(index))
    }

    pub fn get_tile(&self, index: TileIdx) -> Result<&Tile> {
        self.tiles.get(index).ok_or_else(|| self.out_of_range(index))
    }

    pub fn get_tile_mut(&mut self, index: TileIdx) -> Result<&mut Tile> {
        let err = self.out_of_range(index);
        self.tiles.get_mut(index).ok_or(err)
    }

    pub fn set_tile(&mut self, index: TileIdx, tile: Tile) -> Result<()> {
        *self.get_tile_mut(index)? = tile;
        Ok(())
    }

    /// Moves a tile so that it ends up at index `to`.
    pub fn move_tile(&mut self, from: TileIdx, to: TileIdx) -> Result<()> {
        if to >= self.tiles.len() {
            return Err(self.out_of_range(to));
        }
        let tile = self.remove_tile(from)?;
        self.tiles.insert(to, tile);
        Ok(())
    }

    /// Inserts a copy of the tile directly after it.
    pub fn clone_tile(&mut self, index: TileIdx) -> Result<()> {
        let tile = *self.get_tile(index)?;
        self.tiles.insert(index + 1, tile);
        Ok(())
    }

    pub fn mirror_tile_horizontal(&mut self, index: TileIdx) -> Result<()> {
        let tile = self.get_tile_mut(index)?;
        *tile = tile.mirror_horizontal();
        Ok(())
    }

    pub fn mirror_tile_vertical(&mut self, index: TileIdx) -> Result<()> {
        let tile = self.get_tile_mut(index)?;
        *tile = tile.mirror_vertical();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    fn out_of_range(&self, index: TileIdx) -> EditorError {
        EditorError::IndexOutOfRange {
            what: "tile",
            index,
            len: self.tiles.len(),
        }
    }

    fn in_bounds(&self, x: PixelCoord, y: PixelCoord) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width_px() && (y as usize) < self.height_px()
    }

    /// Index of the tile covering a pixel, or `None` outside the tile set.
    pub fn get_tile_index_by_coordinate(&self, x: PixelCoord, y: PixelCoord) -> Option<TileIdx> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let tile_x = x as usize / TILE_SIZE;
        let tile_y = y as usize / TILE_SIZE;
        let index = tile_y * self.tile_width + tile_x;
        (index < self.tiles.len()).then_some(index)
    }

    pub fn get_tile_by_coordinate(&self, x: PixelCoord, y: PixelCoord) -> Option<&Tile> {
        self.get_tile_index_by_coordinate(x, y)
            .map(|index| &self.tiles[index])
    }

    // Tile index and cell index within that tile.
    fn locate(&self, x: PixelCoord, y: PixelCoord) -> Option<(TileIdx, usize)> {
        let tile_idx = self.get_tile_index_by_coordinate(x, y)?;
        let cell = (y as usize % TILE_SIZE) * TILE_SIZE + x as usize % TILE_SIZE;
        Some((tile_idx, cell))
    }

    /// The palette index at a pixel; `None` outside the tile set or past the
    /// last tile of a partially filled row.
    pub fn get_pixel_at(&self, x: PixelCoord, y: PixelCoord) -> Option<ColourIdx> {
        let (tile_idx, cell) = self.locate(x, y)?;
        self.tiles[tile_idx].read_at(cell).ok()
    }

    /// Sets a pixel and returns whether a value changed. Coordinates outside
    /// the tile set are ignored; colour indices above 15 are rejected.
    pub fn set_pixel_at(&mut self, x: PixelCoord, y: PixelCoord, colour: ColourIdx) -> Result<bool> {
        check_colour_index(colour)?;
        let Some((tile_idx, cell)) = self.locate(x, y) else {
            return Ok(false);
        };
        self.tiles[tile_idx].set_value_at(cell, colour)
    }

    /// Row-major stream over every pixel of the laid-out grid. Grid cells past
    /// the last tile yield `None`.
    pub fn pixels(&self) -> impl Iterator<Item = Option<ColourIdx>> + '_ {
        let width = self.width_px() as PixelCoord;
        let height = self.height_px() as PixelCoord;
        (0..height).flat_map(move |y| (0..width).map(move |x| self.get_pixel_at(x, y)))
    }

    pub fn replace_colour_index(&mut self, source: ColourIdx, target: ColourIdx) -> Result<()> {
        check_colour_index(source)?;
        check_colour_index(target)?;
        for tile in self.tiles.iter_mut() {
            tile.replace_colour_index(source, target)?;
        }
        Ok(())
    }

    pub fn swap_colour_index(&mut self, first: ColourIdx, second: ColourIdx) -> Result<()> {
        check_colour_index(first)?;
        check_colour_index(second)?;
        for tile in self.tiles.iter_mut() {
            tile.swap_colour_index(first, second)?;
        }
        Ok(())
    }
}
