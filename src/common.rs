pub type ColourValue = u8; // Colour channel value (0-255)
pub type ColourIdx = u8; // Index into 4bpp palette (0-15)
pub type PixelCoord = i32; // Pixel coordinate in the unscaled tile set image
pub type TileIdx = usize; // Index into the tile set

pub const TILE_SIZE: usize = 8;
pub const TILE_PIXELS: usize = TILE_SIZE * TILE_SIZE;
pub const PALETTE_SIZE: usize = 16;

pub const MIN_SCALE: u32 = 1;
pub const MAX_SCALE: u32 = 50;
pub const DEFAULT_SCALE: u32 = 10;
