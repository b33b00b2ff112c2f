// Brush geometry shared by the cursor outline and the pencil tool.
use crate::common::PixelCoord;

/// Brushes at least this size have their corner cells cut away.
pub const ROUNDED_BRUSH_SIZE: u32 = 4;

/// Top-left pixel of a brush of `size` centred on `(x, y)`.
pub fn brush_origin(x: PixelCoord, y: PixelCoord, size: u32) -> (PixelCoord, PixelCoord) {
    let half = (size / 2) as PixelCoord;
    (x - half, y - half)
}

/// The pixels a brush stroke at `(x, y)` covers: a `size` square, minus its
/// four corner cells from size 4 upwards.
pub fn brush_footprint(x: PixelCoord, y: PixelCoord, size: u32) -> Vec<(PixelCoord, PixelCoord)> {
    let (x0, y0) = brush_origin(x, y, size);
    let n = size as PixelCoord;
    let mut cells = Vec::with_capacity((n * n) as usize);
    for j in 0..n {
        for i in 0..n {
            let corner = (i == 0 || i == n - 1) && (j == 0 || j == n - 1);
            if size >= ROUNDED_BRUSH_SIZE && corner {
                continue;
            }
            cells.push((x0 + i, y0 + j));
        }
    }
    cells
}

/// Closed outline around the footprint of a brush at `(x, y)` drawn at
/// `scale`, pushed `offset` device pixels outwards.
pub fn brush_outline(
    x: PixelCoord,
    y: PixelCoord,
    size: u32,
    scale: u32,
    offset: i32,
) -> Vec<(i32, i32)> {
    let s = scale as i32;
    let n = size as i32;
    let (ox, oy) = brush_origin(x, y, size);
    // Edges are exclusive pixel boundaries; `lo` and `hi` push a boundary
    // outwards onto the pixel just outside it.
    let lo = |v: i32| v - offset;
    let hi = |v: i32| v - 1 + offset;
    let left = ox * s;
    let top = oy * s;
    let right = left + s * n;
    let bottom = top + s * n;

    if size < ROUNDED_BRUSH_SIZE {
        return vec![
            (lo(left), lo(top)),
            (hi(right), lo(top)),
            (hi(right), hi(bottom)),
            (lo(left), hi(bottom)),
            (lo(left), lo(top)),
        ];
    }

    let inner_left = left + s;
    let inner_right = right - s;
    let inner_top = top + s;
    let inner_bottom = bottom - s;
    vec![
        (lo(left), lo(inner_top)),
        (lo(inner_left), lo(inner_top)),
        (lo(inner_left), lo(top)),
        (hi(inner_right), lo(top)),
        (hi(inner_right), lo(inner_top)),
        (hi(right), lo(inner_top)),
        (hi(right), hi(inner_bottom)),
        (hi(inner_right), hi(inner_bottom)),
        (hi(inner_right), hi(bottom)),
        (lo(inner_left), hi(bottom)),
        (lo(inner_left), hi(inner_bottom)),
        (lo(left), hi(inner_bottom)),
        (lo(left), lo(inner_top)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footprint_sizes() {
        for size in 1..=3 {
            assert_eq!(brush_footprint(10, 10, size).len(), (size * size) as usize);
        }
        for size in 4..=8 {
            assert_eq!(
                brush_footprint(10, 10, size).len(),
                (size * size - 4) as usize
            );
        }
    }

    #[test]
    fn test_footprint_is_centred() {
        assert_eq!(brush_footprint(5, 6, 1), vec![(5, 6)]);
        let cells = brush_footprint(5, 5, 3);
        assert!(cells.contains(&(4, 4)));
        assert!(cells.contains(&(6, 6)));
        let cells = brush_footprint(5, 5, 4);
        assert!(!cells.contains(&(3, 3)));
        assert!(!cells.contains(&(6, 6)));
        assert!(cells.contains(&(4, 3)));
        assert!(cells.contains(&(5, 5)));
    }

    #[test]
    fn test_small_outline_is_rectangle() {
        let outline = brush_outline(2, 3, 1, 10, 1);
        assert_eq!(
            outline,
            vec![(19, 29), (30, 29), (30, 40), (19, 40), (19, 29)]
        );
    }

    #[test]
    fn test_large_outline_cuts_corners() {
        let outline = brush_outline(2, 2, 4, 1, 1);
        // 12 segments, closed.
        assert_eq!(outline.len(), 13);
        assert_eq!(outline.first(), outline.last());
        // Footprint spans pixels 0..4; the notch sits on the corner cell.
        assert_eq!(outline[0], (-1, 0));
        assert_eq!(outline[1], (0, 0));
        assert_eq!(outline[2], (0, -1));
        assert_eq!(outline[3], (3, -1));
        assert_eq!(outline[5], (4, 0));
    }
}
