use crate::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm.
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Stroke a closed polygon outline.
pub fn draw_polygon(canvas: &mut BrailleCanvas, pts: &[(i32, i32)]) {
    if pts.len() < 2 {
        return;
    }
    for i in 0..pts.len() {
        let (x0, y0) = pts[i];
        let (x1, y1) = pts[(i + 1) % pts.len()];
        draw_line(canvas, x0, y0, x1, y1);
    }
}

/// Scanline-fill a simple polygon. Edges crossing each scanline are found
/// per row and the spans between crossing pairs are painted.
pub fn fill_polygon(canvas: &mut BrailleCanvas, pts: &[(i32, i32)]) {
    if pts.len() < 3 {
        return;
    }
    let min_y = pts.iter().map(|p| p.1).min().unwrap_or(0).max(0);
    let max_y = pts
        .iter()
        .map(|p| p.1)
        .max()
        .unwrap_or(0)
        .min(canvas.pixel_height() as i32 - 1);

    let mut crossings: Vec<i32> = Vec::with_capacity(pts.len());
    for y in min_y..=max_y {
        crossings.clear();
        for i in 0..pts.len() {
            let (x0, y0) = pts[i];
            let (x1, y1) = pts[(i + 1) % pts.len()];
            if y0 == y1 {
                continue;
            }
            // Half-open edge test so shared vertices count once.
            if (y0 <= y && y < y1) || (y1 <= y && y < y0) {
                let t = (y - y0) as f64 / (y1 - y0) as f64;
                crossings.push((x0 as f64 + t * (x1 - x0) as f64).round() as i32);
            }
        }
        crossings.sort_unstable();
        let max_x = canvas.pixel_width() as i32 - 1;
        for pair in crossings.chunks(2) {
            if let [a, b] = pair {
                for x in (*a).max(0)..=(*b).min(max_x) {
                    canvas.set_pixel_signed(x, y);
                }
            }
        }
    }
}

/// Stroke a circle outline using the midpoint algorithm.
pub fn draw_circle_outline(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    if radius <= 0 {
        return;
    }
    let mut x = radius;
    let mut y = 0;
    let mut err = 1 - radius;

    while x >= y {
        for (px, py) in [
            (cx + x, cy + y),
            (cx - x, cy + y),
            (cx + x, cy - y),
            (cx - x, cy - y),
            (cx + y, cy + x),
            (cx - y, cy + x),
            (cx + y, cy - x),
            (cx - y, cy - x),
        ] {
            canvas.set_pixel_signed(px, py);
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

/// Ray-cast point-in-polygon test against a screen polygon.
pub fn point_in_polygon(pts: &[(i32, i32)], px: i32, py: i32) -> bool {
    if pts.len() < 3 {
        return false;
    }
    let (x, y) = (px as f64, py as f64);
    let mut inside = false;
    let mut j = pts.len() - 1;
    for i in 0..pts.len() {
        let (xi, yi) = (pts[i].0 as f64, pts[i].1 as f64);
        let (xj, yj) = (pts[j].0 as f64, pts[j].1 as f64);
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: [(i32, i32); 4] = [(10, 10), (30, 10), (30, 30), (10, 30)];

    #[test]
    fn test_point_in_polygon_square() {
        assert!(point_in_polygon(&SQUARE, 20, 20));
        assert!(point_in_polygon(&SQUARE, 11, 29));
        assert!(!point_in_polygon(&SQUARE, 5, 20));
        assert!(!point_in_polygon(&SQUARE, 31, 20));
        assert!(!point_in_polygon(&SQUARE, 20, 31));
    }

    #[test]
    fn test_point_in_polygon_degenerate() {
        assert!(!point_in_polygon(&[], 0, 0));
        assert!(!point_in_polygon(&[(0, 0), (10, 10)], 5, 5));
    }

    #[test]
    fn test_point_in_concave_polygon() {
        // An L-shape: the notch is outside.
        let l_shape = [(0, 0), (40, 0), (40, 20), (20, 20), (20, 40), (0, 40)];
        assert!(point_in_polygon(&l_shape, 10, 30));
        assert!(point_in_polygon(&l_shape, 30, 10));
        assert!(!point_in_polygon(&l_shape, 30, 30));
    }

    #[test]
    fn test_draw_polygon_strokes_all_edges() {
        let mut canvas = BrailleCanvas::new(20, 10);
        draw_polygon(&mut canvas, &SQUARE);
        let s = canvas.to_string();
        assert!(s.chars().any(|c| c != '⠀' && c != '\n'));
    }

    #[test]
    fn test_fill_covers_interior() {
        let mut canvas = BrailleCanvas::new(20, 10);
        fill_polygon(&mut canvas, &SQUARE);
        // The center pixel of the square must be set: (20, 20) lives in
        // character cell (10, 5) as dot (0, 0) = bit 0x01.
        let row = canvas.row_to_string(5);
        let ch = row.chars().nth(10).unwrap();
        assert_ne!(ch, '⠀');
    }

    #[test]
    fn test_circle_outline_radius_extents() {
        let mut canvas = BrailleCanvas::new(20, 10);
        draw_circle_outline(&mut canvas, 20, 20, 10);
        let s = canvas.to_string();
        assert!(s.chars().any(|c| c != '⠀' && c != '\n'));
    }
}
