// Module for rendering the tile set: a cached base image at the current
// scale, redrawn per tile where possible, with overlays composited on top.
mod bitmap;
mod brush;
mod reference;

pub use bitmap::{Bitmap, Rect, Rgba, Stroke, Surface};
pub use brush::{brush_footprint, brush_origin, brush_outline};
pub use reference::ReferenceImage;

use hashbrown::HashSet;
use itertools::iproduct;
use log::debug;

use crate::{
    common::{
        ColourIdx, PixelCoord, TileIdx, DEFAULT_SCALE, MAX_SCALE, MIN_SCALE, TILE_SIZE,
    },
    error::{EditorError, Result},
    palette::Palette,
    tile::Tile,
    tileset::TileSet,
};

pub const MIN_CURSOR_SIZE: u32 = 1;
pub const MAX_CURSOR_SIZE: u32 = 50;
/// Pixel grid lines are only drawn from this scale upwards.
pub const PIXEL_GRID_MIN_SCALE: u32 = 5;

const TILE_GRID_COLOUR: Rgba = Rgba::new(0, 0, 0, 102);
const PIXEL_GRID_COLOUR: Rgba = Rgba::new(0, 0, 0, 51);
const REFERENCE_OPACITY: f32 = 0.5;

const TILE: i32 = TILE_SIZE as i32;

pub struct CanvasManager {
    base: Bitmap,
    needs_full_redraw: bool,
    dirty_tiles: HashSet<TileIdx>,
    tile_set: Option<TileSet>,
    palette: Option<Palette>,
    scale: u32,
    selected_tile: Option<TileIdx>,
    cursor_size: u32,
    transparency_index: Option<ColourIdx>,
    show_tile_grid: bool,
    show_pixel_grid: bool,
    reference_images: Vec<ReferenceImage>,
}

impl Default for CanvasManager {
    fn default() -> Self {
        CanvasManager {
            base: Bitmap::default(),
            needs_full_redraw: true,
            dirty_tiles: HashSet::new(),
            tile_set: None,
            palette: None,
            scale: DEFAULT_SCALE,
            selected_tile: None,
            cursor_size: 1,
            transparency_index: Some(15),
            show_tile_grid: false,
            show_pixel_grid: false,
            reference_images: vec![],
        }
    }
}

fn check_range(what: &'static str, value: u32, min: u32, max: u32) -> Result<u32> {
    if value < min || value > max {
        return Err(EditorError::OutOfRange {
            what,
            value: value as i64,
            min: min as i64,
            max: max as i64,
        });
    }
    Ok(value)
}

// Columns used when laying out tiles; a zero-width tile set still renders.
fn layout_columns(tile_set: &TileSet) -> usize {
    tile_set.tile_width().max(1)
}

fn base_size(tile_set: &TileSet, scale: u32) -> (u32, u32) {
    let columns = layout_columns(tile_set);
    let rows = tile_set.len().div_ceil(columns);
    (
        (columns * TILE_SIZE) as u32 * scale,
        (rows * TILE_SIZE) as u32 * scale,
    )
}

/// Device-pixel origin of a tile's top-left corner.
fn tile_origin(tile_set: &TileSet, tile_idx: TileIdx, scale: u32) -> (i32, i32) {
    let columns = layout_columns(tile_set);
    let col = (tile_idx % columns) as i32;
    let row = (tile_idx / columns) as i32;
    let s = scale as i32;
    (col * TILE * s, row * TILE * s)
}

/// Rasterizes one tile into `target`. Cells equal to `transparent` are left
/// untouched; cells outside the palette reuse the previous cell's colour.
fn draw_tile(
    target: &mut Bitmap,
    tile: &Tile,
    palette: &Palette,
    origin: (i32, i32),
    scale: u32,
    transparent: Option<ColourIdx>,
) {
    let s = scale as i32;
    let cells = tile.read_all();
    let mut fill = palette.colours()[0];
    for (row, col) in iproduct!(0..TILE_SIZE, 0..TILE_SIZE) {
        let colour_idx = cells[row * TILE_SIZE + col];
        if let Ok(colour) = palette.colour(colour_idx) {
            fill = colour;
        }
        if transparent == Some(colour_idx) {
            continue;
        }
        let rect = Rect::new(origin.0 + col as i32 * s, origin.1 + row as i32 * s, s, s);
        target.fill_rect(rect, fill.into());
    }
}

fn draw_all_tiles(
    tile_set: &TileSet,
    palette: &Palette,
    scale: u32,
    transparent: Option<ColourIdx>,
) -> Bitmap {
    let (width, height) = base_size(tile_set, scale);
    let mut bitmap = Bitmap::new(width, height);
    for (idx, tile) in tile_set.tiles().iter().enumerate() {
        let origin = tile_origin(tile_set, idx, scale);
        draw_tile(&mut bitmap, tile, palette, origin, scale, transparent);
    }
    bitmap
}

impl CanvasManager {
    pub fn new(tile_set: Option<TileSet>, palette: Option<Palette>) -> Self {
        CanvasManager {
            tile_set,
            palette,
            ..CanvasManager::default()
        }
    }

    pub fn can_draw(&self) -> bool {
        self.tile_set.is_some() && self.palette.is_some()
    }

    pub fn tile_set(&self) -> Option<&TileSet> {
        self.tile_set.as_ref()
    }

    pub fn set_tile_set(&mut self, tile_set: TileSet) {
        self.invalidate_image();
        self.selected_tile = self.selected_tile.filter(|&idx| idx < tile_set.len());
        self.tile_set = Some(tile_set);
    }

    /// Replaces the rendered copy of one tile and marks only that tile stale.
    pub fn update_tile(&mut self, index: TileIdx, tile: Tile) -> Result<()> {
        let tile_set = self
            .tile_set
            .as_mut()
            .ok_or(EditorError::MissingCollaborator {
                operation: "update_tile",
                missing: "tile set",
            })?;
        tile_set.set_tile(index, tile)?;
        self.invalidate_tile(index);
        Ok(())
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.invalidate_image();
        self.palette = Some(palette);
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: u32) -> Result<()> {
        check_range("scale", scale, MIN_SCALE, MAX_SCALE)?;
        if scale != self.scale {
            self.invalidate_image();
            self.scale = scale;
        }
        Ok(())
    }

    pub fn selected_tile(&self) -> Option<TileIdx> {
        self.selected_tile
    }

    /// Selects a tile; indices outside the tile set clear the selection.
    pub fn set_selected_tile(&mut self, index: Option<TileIdx>) {
        let len = self.tile_set.as_ref().map_or(0, |ts| ts.len());
        self.selected_tile = index.filter(|&idx| idx < len);
    }

    pub fn cursor_size(&self) -> u32 {
        self.cursor_size
    }

    pub fn set_cursor_size(&mut self, size: u32) -> Result<()> {
        self.cursor_size = check_range("cursor size", size, MIN_CURSOR_SIZE, MAX_CURSOR_SIZE)?;
        Ok(())
    }

    pub fn show_tile_grid(&self) -> bool {
        self.show_tile_grid
    }

    pub fn set_show_tile_grid(&mut self, show: bool) {
        self.show_tile_grid = show;
    }

    pub fn show_pixel_grid(&self) -> bool {
        self.show_pixel_grid
    }

    pub fn set_show_pixel_grid(&mut self, show: bool) {
        self.show_pixel_grid = show;
    }

    pub fn transparency_index(&self) -> Option<ColourIdx> {
        self.transparency_index
    }

    /// Sets the colour rendered as see-through when reference images are
    /// present; `None` draws reference images above the tiles instead.
    pub fn set_transparency_index(&mut self, index: Option<ColourIdx>) -> Result<()> {
        if let Some(idx) = index {
            crate::error::check_colour_index(idx)?;
        }
        if index != self.transparency_index {
            self.transparency_index = index;
            self.invalidate_image();
        }
        Ok(())
    }

    pub fn reference_images(&self) -> &[ReferenceImage] {
        &self.reference_images
    }

    pub fn add_reference_image(&mut self, reference: ReferenceImage) {
        self.reference_images.push(reference);
        self.invalidate_image();
    }

    pub fn clear_reference_images(&mut self) {
        self.reference_images.clear();
        self.invalidate_image();
    }

    pub fn invalidate_image(&mut self) {
        self.needs_full_redraw = true;
    }

    pub fn invalidate_tile(&mut self, index: TileIdx) {
        self.dirty_tiles.insert(index);
    }

    /// True when the next draw has to re-rasterize something.
    pub fn is_stale(&self) -> bool {
        self.needs_full_redraw || !self.dirty_tiles.is_empty()
    }

    /// The cached base image as of the last draw.
    pub fn base_image(&self) -> &Bitmap {
        &self.base
    }

    // The base image only punches out the transparency colour when there is
    // something to show through it.
    fn base_transparency(&self) -> Option<ColourIdx> {
        if self.reference_images.iter().any(ReferenceImage::has_image) {
            self.transparency_index
        } else {
            None
        }
    }

    fn refresh_base_image(&mut self) -> Result<()> {
        let transparent = self.base_transparency();
        let tile_set = self
            .tile_set
            .as_ref()
            .ok_or(EditorError::MissingCollaborator {
                operation: "draw",
                missing: "tile set",
            })?;
        let palette = self
            .palette
            .as_ref()
            .ok_or(EditorError::MissingCollaborator {
                operation: "draw",
                missing: "palette",
            })?;

        if self.needs_full_redraw {
            debug!("Redrawing all {} tiles", tile_set.len());
            self.base = draw_all_tiles(tile_set, palette, self.scale, transparent);
            self.dirty_tiles.clear();
            self.needs_full_redraw = false;
            return Ok(());
        }

        for idx in self.dirty_tiles.drain() {
            let Some(tile) = tile_set.tiles().get(idx) else {
                continue;
            };
            debug!("Redrawing tile {}", idx);
            let origin = tile_origin(tile_set, idx, self.scale);
            let size = TILE * self.scale as i32;
            self.base
                .clear_rect(Rect::new(origin.0, origin.1, size, size));
            draw_tile(&mut self.base, tile, palette, origin, self.scale, transparent);
        }
        Ok(())
    }

    fn draw_reference_images(&self, surface: &mut impl Surface) {
        let s = self.scale as i32;
        for reference in &self.reference_images {
            if let Some(image) = &reference.image {
                surface.draw_bitmap(image, reference.bounds.scaled(s), REFERENCE_OPACITY);
            }
        }
    }

    fn draw_grid(&self, surface: &mut impl Surface, step: u32, colour: Rgba) {
        let width = self.base.width() as i32;
        let height = self.base.height() as i32;
        let stroke = Stroke::solid(colour);
        for x in (0..width).step_by(step as usize) {
            surface.stroke_line((x, 0), (x, height - 1), stroke);
        }
        for y in (0..height).step_by(step as usize) {
            surface.stroke_line((0, y), (width - 1, y), stroke);
        }
    }

    /// Composites the frame: background, reference images, cached tiles,
    /// grids, hovered tile, brush outline and selected tile. `cursor` is the
    /// hovered pixel in unscaled tile set coordinates.
    pub fn draw(
        &mut self,
        surface: &mut impl Surface,
        cursor: Option<(PixelCoord, PixelCoord)>,
    ) -> Result<()> {
        self.refresh_base_image()?;

        let width = self.base.width();
        let height = self.base.height();
        let s = self.scale as i32;
        surface.resize(width, height);
        surface.fill_rect(Rect::new(0, 0, width as i32, height as i32), Rgba::WHITE);

        if self.transparency_index.is_some() {
            self.draw_reference_images(surface);
        }
        surface.draw_bitmap(&self.base, Rect::new(0, 0, width as i32, height as i32), 1.0);
        if self.transparency_index.is_none() {
            self.draw_reference_images(surface);
        }

        if self.show_tile_grid {
            self.draw_grid(surface, self.scale * TILE_SIZE as u32, TILE_GRID_COLOUR);
        }
        if self.show_pixel_grid && self.scale >= PIXEL_GRID_MIN_SCALE {
            self.draw_grid(surface, self.scale, PIXEL_GRID_COLOUR);
        }

        if let Some((x, y)) = cursor {
            let tile_x = x.div_euclid(TILE) * TILE * s;
            let tile_y = y.div_euclid(TILE) * TILE * s;
            surface.stroke_rect(
                Rect::new(tile_x, tile_y, TILE * s, TILE * s),
                Stroke::solid(Rgba::YELLOW),
            );

            for (offset, colour) in [(1, Rgba::WHITE), (2, Rgba::BLACK)] {
                let outline = brush_outline(x, y, self.cursor_size, self.scale, offset);
                surface.stroke_polyline(&outline, Stroke::solid(colour));
            }
        }

        if let (Some(idx), Some(tile_set)) = (self.selected_tile, &self.tile_set) {
            if idx < tile_set.len() {
                let (x, y) = tile_origin(tile_set, idx, self.scale);
                let rect = Rect::new(x, y, TILE * s, TILE * s);
                surface.stroke_rect(rect, Stroke::solid(Rgba::BLACK));
                surface.stroke_rect(rect, Stroke::dashed(Rgba::YELLOW, 2, 2));
            }
        }
        Ok(())
    }

    /// The tile set at scale 1 with no overlays or transparency.
    pub fn render_image(&self) -> Result<Bitmap> {
        let tile_set = self
            .tile_set
            .as_ref()
            .ok_or(EditorError::MissingCollaborator {
                operation: "render_image",
                missing: "tile set",
            })?;
        let palette = self
            .palette
            .as_ref()
            .ok_or(EditorError::MissingCollaborator {
                operation: "render_image",
                missing: "palette",
            })?;
        Ok(draw_all_tiles(tile_set, palette, 1, None))
    }

    /// PNG encoding of [`CanvasManager::render_image`].
    pub fn to_png(&self) -> Result<Vec<u8>> {
        self.render_image()?.to_png()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{common::TILE_PIXELS, palette::System};

    fn palette() -> Palette {
        Palette::standard("Test", System::MasterSystem)
    }

    fn tile_set(count: usize, tile_width: usize) -> TileSet {
        let mut ts = TileSet::new(tile_width);
        for _ in 0..count {
            ts.add_tile(Tile::filled(0));
        }
        ts
    }

    fn colour(idx: ColourIdx) -> Rgba {
        palette().colour(idx).unwrap().into()
    }

    #[test]
    fn test_draw_requires_collaborators() {
        let mut canvas = CanvasManager::default();
        let mut frame = Bitmap::default();
        assert!(matches!(
            canvas.draw(&mut frame, None),
            Err(EditorError::MissingCollaborator { .. })
        ));
        canvas.set_tile_set(tile_set(1, 1));
        assert!(matches!(
            canvas.draw(&mut frame, None),
            Err(EditorError::MissingCollaborator {
                missing: "palette",
                ..
            })
        ));
        assert!(canvas.render_image().is_err());
    }

    #[test]
    fn test_setters_validate_ranges() {
        let mut canvas = CanvasManager::default();
        assert!(canvas.set_scale(0).is_err());
        assert!(canvas.set_scale(51).is_err());
        assert!(canvas.set_scale(50).is_ok());
        assert!(canvas.set_cursor_size(0).is_err());
        assert!(canvas.set_cursor_size(51).is_err());
        assert!(canvas.set_cursor_size(4).is_ok());
        assert!(canvas.set_transparency_index(Some(16)).is_err());
        assert_eq!(canvas.scale(), 50);
        assert_eq!(canvas.cursor_size(), 4);
    }

    #[test]
    fn test_frame_size_follows_scale() {
        let mut canvas = CanvasManager::new(Some(tile_set(5, 2)), Some(palette()));
        canvas.set_scale(3).unwrap();
        let mut frame = Bitmap::default();
        canvas.draw(&mut frame, None).unwrap();
        assert_eq!((frame.width(), frame.height()), (2 * 8 * 3, 3 * 8 * 3));
        assert_eq!(frame.pixel(0, 0), Some(colour(0)));
        // Tile 5 does not exist; the background shows through.
        assert_eq!(frame.pixel(40, 60), Some(Rgba::WHITE));
    }

    #[test]
    fn test_tile_invalidation_redraws_only_that_tile() {
        let mut ts = tile_set(2, 2);
        let mut canvas = CanvasManager::new(Some(ts.clone()), Some(palette()));
        canvas.set_scale(1).unwrap();
        let mut frame = Bitmap::default();
        canvas.draw(&mut frame, None).unwrap();
        assert!(!canvas.is_stale());

        ts.set_pixel_at(0, 0, 1).unwrap();
        ts.set_pixel_at(8, 0, 1).unwrap();
        // Only tile 0 is pushed to the canvas; tile 1 keeps its cached look.
        canvas.update_tile(0, *ts.get_tile(0).unwrap()).unwrap();
        canvas.tile_set.as_mut().unwrap().set_tile(1, *ts.get_tile(1).unwrap()).unwrap();
        assert!(canvas.is_stale());
        canvas.draw(&mut frame, None).unwrap();
        assert_eq!(frame.pixel(0, 0), Some(colour(1)));
        assert_eq!(frame.pixel(8, 0), Some(colour(0)));

        canvas.invalidate_image();
        canvas.draw(&mut frame, None).unwrap();
        assert_eq!(frame.pixel(8, 0), Some(colour(1)));
    }

    #[test]
    fn test_invalidation_is_idempotent() {
        let mut canvas = CanvasManager::new(Some(tile_set(2, 2)), Some(palette()));
        canvas.invalidate_tile(1);
        canvas.invalidate_tile(1);
        assert_eq!(canvas.dirty_tiles.len(), 1);
        canvas.invalidate_image();
        canvas.invalidate_image();
        let mut frame = Bitmap::default();
        canvas.draw(&mut frame, None).unwrap();
        assert!(!canvas.is_stale());
    }

    #[test]
    fn test_out_of_palette_cells_reuse_previous_colour() {
        let mut cells = [0; TILE_PIXELS];
        cells[0] = 3;
        cells[1] = 99;
        let mut ts = TileSet::new(1);
        ts.add_tile(Tile::from_slice(&cells).unwrap());
        let canvas = CanvasManager::new(Some(ts), Some(palette()));
        let image = canvas.render_image().unwrap();
        assert_eq!(image.pixel(1, 0), Some(colour(3)));
    }

    #[test]
    fn test_reference_image_shows_through_transparent_cells() {
        let mut ts = tile_set(1, 1);
        ts.set_pixel_at(0, 0, 15).unwrap();
        let mut canvas = CanvasManager::new(Some(ts), Some(palette()));
        canvas.set_scale(1).unwrap();
        let mut red = Bitmap::new(8, 8);
        red.fill_rect(Rect::new(0, 0, 8, 8), Rgba::new(255, 0, 0, 255));
        canvas.add_reference_image(ReferenceImage::new(Rect::new(0, 0, 8, 8), Some(red)));

        let mut frame = Bitmap::default();
        canvas.draw(&mut frame, None).unwrap();
        // Cell 0 is colour 15, punched out over a 50% red reference.
        let p = frame.pixel(0, 0).unwrap();
        assert_eq!((p.r, p.a), (255, 255));
        assert!((126..=129).contains(&p.g), "{p:?}");
        // Opaque cells hide the reference beneath them.
        assert_eq!(frame.pixel(1, 0), Some(colour(0)));

        // Without a transparency colour the reference is drawn on top.
        canvas.set_transparency_index(None).unwrap();
        canvas.draw(&mut frame, None).unwrap();
        let p = frame.pixel(1, 0).unwrap();
        assert!((126..=129).contains(&p.r), "{p:?}");
        assert_eq!(p.g, 0);
    }

    #[test]
    fn test_overlays() {
        let mut canvas = CanvasManager::new(Some(tile_set(4, 2)), Some(palette()));
        canvas.set_scale(5).unwrap();
        canvas.set_show_tile_grid(true);
        canvas.set_selected_tile(Some(3));
        assert_eq!(canvas.selected_tile(), Some(3));
        let mut frame = Bitmap::default();
        canvas.draw(&mut frame, Some((2, 2))).unwrap();

        // Tile grid line on the boundary between tile columns, darkened.
        let p = frame.pixel(40, 20).unwrap();
        assert!(p.r < 10 && p.a == 255);
        // Hovered tile highlight on its inner edge.
        assert_eq!(frame.pixel(20, 0), Some(Rgba::YELLOW));
        // Brush outline around pixel (2, 2): white then black further out.
        assert_eq!(frame.pixel(9, 12), Some(Rgba::WHITE));
        assert_eq!(frame.pixel(8, 12), Some(Rgba::BLACK));
        // Selected tile 3 starts at (40, 40): dashed yellow over black.
        assert_eq!(frame.pixel(40, 40), Some(Rgba::YELLOW));
        assert_eq!(frame.pixel(42, 40), Some(Rgba::BLACK));

        canvas.set_selected_tile(Some(4));
        assert_eq!(canvas.selected_tile(), None);
    }

    #[test]
    fn test_render_image_ignores_scale_and_overlays() {
        let mut canvas = CanvasManager::new(Some(tile_set(3, 2)), Some(palette()));
        canvas.set_scale(7).unwrap();
        canvas.set_show_tile_grid(true);
        let image = canvas.render_image().unwrap();
        assert_eq!((image.width(), image.height()), (16, 16));
        assert_eq!(image.pixel(0, 0), Some(colour(0)));
        let png = canvas.to_png().unwrap();
        assert_eq!(Bitmap::from_png(&png).unwrap(), image);
    }
}
