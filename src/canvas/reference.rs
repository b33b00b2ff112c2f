use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use super::bitmap::{Bitmap, Rect, Surface};

/// An image traced over, placed in unscaled tile set pixels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferenceImage {
    pub bounds: Rect,
    pub image: Option<Bitmap>,
}

impl ReferenceImage {
    pub fn new(bounds: Rect, image: Option<Bitmap>) -> Self {
        ReferenceImage { bounds, image }
    }

    /// Loads a PNG placed at `(x, y)` at its natural size.
    pub fn load_png(path: &Path, x: i32, y: i32) -> Result<Self> {
        info!("Loading reference image {}", path.display());
        let bytes = std::fs::read(path)
            .with_context(|| format!("Unable to read {}", path.display()))?;
        let image = Bitmap::from_png(&bytes)
            .with_context(|| format!("Unable to decode {}", path.display()))?;
        let bounds = Rect::new(x, y, image.width() as i32, image.height() as i32);
        Ok(ReferenceImage::new(bounds, Some(image)))
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}
