// RGBA software surface used for the cached base image, composited frames
// and PNG import/export.
use std::fmt::Debug;

use crate::{
    error::{EditorError, Result},
    palette::PaletteColour,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);
    pub const YELLOW: Rgba = Rgba::new(255, 255, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba { r, g, b, a }
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Rgba {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }
}

impl From<PaletteColour> for Rgba {
    fn from(c: PaletteColour) -> Self {
        Rgba::new(c.r, c.g, c.b, 255)
    }
}

/// Axis-aligned rectangle in device pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn scaled(&self, scale: i32) -> Rect {
        Rect::new(
            self.x * scale,
            self.y * scale,
            self.width * scale,
            self.height * scale,
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Stroke {
    pub colour: Rgba,
    /// `(on, off)` lengths in pixels, or `None` for a solid line.
    pub dash: Option<(u32, u32)>,
}

impl Stroke {
    pub const fn solid(colour: Rgba) -> Self {
        Stroke { colour, dash: None }
    }

    pub const fn dashed(colour: Rgba, on: u32, off: u32) -> Self {
        Stroke {
            colour,
            dash: Some((on, off)),
        }
    }
}

/// A 2-D drawing target of fixed size in device pixels.
pub trait Surface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Changes the size, discarding the contents.
    fn resize(&mut self, width: u32, height: u32);

    fn fill_rect(&mut self, rect: Rect, colour: Rgba);

    /// Strokes connected 1-pixel line segments. The dash pattern continues
    /// across segments.
    fn stroke_polyline(&mut self, points: &[(i32, i32)], stroke: Stroke);

    /// Composites `bitmap` scaled into `dest` at the given global opacity.
    fn draw_bitmap(&mut self, bitmap: &Bitmap, dest: Rect, opacity: f32);

    fn stroke_line(&mut self, from: (i32, i32), to: (i32, i32), stroke: Stroke) {
        self.stroke_polyline(&[from, to], stroke);
    }

    /// Outlines the pixels on the inner edge of `rect`.
    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        if rect.width <= 0 || rect.height <= 0 {
            return;
        }
        let x0 = rect.x;
        let y0 = rect.y;
        let x1 = rect.x + rect.width - 1;
        let y1 = rect.y + rect.height - 1;
        self.stroke_polyline(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)], stroke);
    }
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

fn blend_channel(src: u8, dst: u8, src_a: f32, dst_a: f32, out_a: f32) -> u8 {
    let c = (src as f32 * src_a + dst as f32 * dst_a * (1.0 - src_a)) / out_a;
    c.round().clamp(0.0, 255.0) as u8
}

impl Bitmap {
    /// A fully transparent bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Bitmap {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(EditorError::OutOfRange {
                what: "RGBA buffer length",
                value: data.len() as i64,
                min: expected as i64,
                max: expected as i64,
            });
        }
        Ok(Bitmap {
            width,
            height,
            data,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        let i = self.offset(x, y)?;
        let p = &self.data[i..i + 4];
        Some(Rgba::new(p[0], p[1], p[2], p[3]))
    }

    /// Overwrites a pixel, ignoring coordinates outside the bitmap.
    pub fn set_pixel(&mut self, x: i32, y: i32, colour: Rgba) {
        if let Some(i) = self.offset(x, y) {
            self.data[i..i + 4].copy_from_slice(&[colour.r, colour.g, colour.b, colour.a]);
        }
    }

    /// Source-over composites a pixel.
    pub fn blend_pixel(&mut self, x: i32, y: i32, colour: Rgba) {
        if colour.a == 255 {
            self.set_pixel(x, y, colour);
            return;
        }
        if colour.a == 0 {
            return;
        }
        let Some(dst) = self.pixel(x, y) else {
            return;
        };
        let src_a = colour.a as f32 / 255.0;
        let dst_a = dst.a as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        let out = Rgba::new(
            blend_channel(colour.r, dst.r, src_a, dst_a, out_a),
            blend_channel(colour.g, dst.g, src_a, dst_a, out_a),
            blend_channel(colour.b, dst.b, src_a, dst_a, out_a),
            (out_a * 255.0).round() as u8,
        );
        self.set_pixel(x, y, out);
    }

    // Clips `rect` to the bitmap, returning the covered pixel ranges.
    fn clip(&self, rect: Rect) -> Option<(std::ops::Range<i32>, std::ops::Range<i32>)> {
        let x0 = rect.x.max(0);
        let y0 = rect.y.max(0);
        let x1 = (rect.x + rect.width).min(self.width as i32);
        let y1 = (rect.y + rect.height).min(self.height as i32);
        (x0 < x1 && y0 < y1).then_some((x0..x1, y0..y1))
    }

    /// Sets a region back to fully transparent.
    pub fn clear_rect(&mut self, rect: Rect) {
        if let Some((xs, ys)) = self.clip(rect) {
            for y in ys {
                for x in xs.clone() {
                    self.set_pixel(x, y, Rgba::TRANSPARENT);
                }
            }
        }
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut out = vec![];
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.data)?;
            writer.finish()?;
        }
        Ok(out)
    }

    /// Decodes any 8- or 16-bit PNG into RGBA.
    pub fn from_png(bytes: &[u8]) -> Result<Self> {
        let mut decoder = png::Decoder::new(bytes);
        decoder.set_transformations(png::Transformations::normalize_to_color8());
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        let frame = &buf[..info.buffer_size()];
        let data: Vec<u8> = match info.color_type {
            png::ColorType::Rgba => frame.to_vec(),
            png::ColorType::Rgb => frame
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect(),
            png::ColorType::GrayscaleAlpha => frame
                .chunks_exact(2)
                .flat_map(|p| [p[0], p[0], p[0], p[1]])
                .collect(),
            png::ColorType::Grayscale => frame.iter().flat_map(|&v| [v, v, v, 255]).collect(),
            // Palette images are expanded by the decoder transformations.
            png::ColorType::Indexed => {
                return Err(EditorError::UnsupportedImage("indexed colour PNG"))
            }
        };
        Bitmap::from_rgba(info.width, info.height, data)
    }
}

impl Surface for Bitmap {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) {
        *self = Bitmap::new(width, height);
    }

    fn fill_rect(&mut self, rect: Rect, colour: Rgba) {
        if let Some((xs, ys)) = self.clip(rect) {
            for y in ys {
                for x in xs.clone() {
                    self.blend_pixel(x, y, colour);
                }
            }
        }
    }

    fn stroke_polyline(&mut self, points: &[(i32, i32)], stroke: Stroke) {
        // Position along the whole path, for the dash pattern.
        let mut phase: u32 = 0;
        let segments = points.len().saturating_sub(1);
        let closed = points.len() > 2 && points.first() == points.last();
        for (i, segment) in points.windows(2).enumerate() {
            let (mut x, mut y) = segment[0];
            let (x1, y1) = segment[1];
            let dx = (x1 - x).abs();
            let dy = -(y1 - y).abs();
            let sx = if x < x1 { 1 } else { -1 };
            let sy = if y < y1 { 1 } else { -1 };
            let mut err = dx + dy;
            let mut first = true;
            loop {
                let at_end = (x, y) == (x1, y1);
                // Joints belong to the previous segment; a closed path's final
                // point is its first.
                let skip = (first && i > 0) || (closed && at_end && i + 1 == segments);
                if !skip {
                    let on = match stroke.dash {
                        Some((on, off)) if on + off > 0 => phase % (on + off) < on,
                        _ => true,
                    };
                    if on {
                        self.blend_pixel(x, y, stroke.colour);
                    }
                    phase += 1;
                }
                first = false;
                if at_end {
                    break;
                }
                let e2 = 2 * err;
                if e2 >= dy {
                    err += dy;
                    x += sx;
                }
                if e2 <= dx {
                    err += dx;
                    y += sy;
                }
            }
        }
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap, dest: Rect, opacity: f32) {
        if bitmap.width == 0 || bitmap.height == 0 {
            return;
        }
        let Some((xs, ys)) = self.clip(dest) else {
            return;
        };
        let opacity = opacity.clamp(0.0, 1.0);
        for y in ys {
            let sy = ((y - dest.y) as i64 * bitmap.height as i64 / dest.height as i64) as i32;
            for x in xs.clone() {
                let sx = ((x - dest.x) as i64 * bitmap.width as i64 / dest.width as i64) as i32;
                let Some(src) = bitmap.pixel(sx, sy) else {
                    continue;
                };
                let alpha = src.a as f32 / 255.0 * opacity;
                self.blend_pixel(x, y, src.with_alpha(alpha));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_is_clipped() {
        let mut bmp = Bitmap::new(4, 4);
        bmp.fill_rect(Rect::new(-2, 2, 4, 10), Rgba::BLACK);
        assert_eq!(bmp.pixel(0, 2), Some(Rgba::BLACK));
        assert_eq!(bmp.pixel(1, 3), Some(Rgba::BLACK));
        assert_eq!(bmp.pixel(2, 2), Some(Rgba::TRANSPARENT));
        assert_eq!(bmp.pixel(0, 1), Some(Rgba::TRANSPARENT));
        assert_eq!(bmp.pixel(4, 0), None);
    }

    #[test]
    fn test_blending() {
        let mut bmp = Bitmap::new(1, 1);
        bmp.fill_rect(Rect::new(0, 0, 1, 1), Rgba::WHITE);
        bmp.blend_pixel(0, 0, Rgba::BLACK.with_alpha(0.5));
        let p = bmp.pixel(0, 0).unwrap();
        assert_eq!(p.a, 255);
        assert!((126..=129).contains(&p.r), "{p:?}");

        // Blending onto transparent keeps the source colour.
        let mut bmp = Bitmap::new(1, 1);
        bmp.blend_pixel(0, 0, Rgba::new(10, 20, 30, 128));
        assert_eq!(bmp.pixel(0, 0), Some(Rgba::new(10, 20, 30, 128)));
    }

    #[test]
    fn test_stroke_rect_outlines_inner_edge() {
        let mut bmp = Bitmap::new(6, 6);
        bmp.stroke_rect(Rect::new(1, 1, 4, 4), Stroke::solid(Rgba::BLACK));
        for (x, y) in [(1, 1), (4, 1), (4, 4), (1, 4), (2, 1), (1, 3)] {
            assert_eq!(bmp.pixel(x, y), Some(Rgba::BLACK), "({x}, {y})");
        }
        for (x, y) in [(0, 0), (2, 2), (3, 3), (5, 5)] {
            assert_eq!(bmp.pixel(x, y), Some(Rgba::TRANSPARENT), "({x}, {y})");
        }
    }

    #[test]
    fn test_dashed_line() {
        let mut bmp = Bitmap::new(8, 1);
        bmp.stroke_line((0, 0), (7, 0), Stroke::dashed(Rgba::BLACK, 2, 2));
        let on: Vec<bool> = (0..8).map(|x| bmp.pixel(x, 0).unwrap().a == 255).collect();
        assert_eq!(on, [true, true, false, false, true, true, false, false]);
    }

    #[test]
    fn test_draw_bitmap_scales_nearest() {
        let mut src = Bitmap::new(2, 1);
        src.set_pixel(0, 0, Rgba::BLACK);
        src.set_pixel(1, 0, Rgba::WHITE);
        let mut dst = Bitmap::new(4, 2);
        dst.draw_bitmap(&src, Rect::new(0, 0, 4, 2), 1.0);
        assert_eq!(dst.pixel(1, 1), Some(Rgba::BLACK));
        assert_eq!(dst.pixel(2, 0), Some(Rgba::WHITE));

        let mut dst = Bitmap::new(1, 1);
        dst.fill_rect(Rect::new(0, 0, 1, 1), Rgba::WHITE);
        dst.draw_bitmap(&src, Rect::new(0, 0, 2, 1), 0.5);
        let p = dst.pixel(0, 0).unwrap();
        assert!((126..=129).contains(&p.r), "{p:?}");
    }

    #[test]
    fn test_png_round_trip() {
        let mut bmp = Bitmap::new(3, 2);
        bmp.set_pixel(0, 0, Rgba::new(1, 2, 3, 255));
        bmp.set_pixel(2, 1, Rgba::new(200, 100, 50, 128));
        let bytes = bmp.to_png().unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        assert_eq!(Bitmap::from_png(&bytes).unwrap(), bmp);
    }
}
