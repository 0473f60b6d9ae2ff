use glam::DVec2;

use crate::braille::BrailleCanvas;

/// Bresenham line between two dot positions
pub fn draw_line(canvas: &mut BrailleCanvas, from: (i32, i32), to: (i32, i32)) {
    let (mut x, mut y) = from;
    let (x1, y1) = to;
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        canvas.set(x, y);
        if x == x1 && y == y1 {
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

/// Circle outline, `width` dots thick, growing inward from `radius`
pub fn draw_circle_outline(canvas: &mut BrailleCanvas, center: DVec2, radius: f64, width: f64) {
    if radius <= 0.0 {
        return;
    }
    let inner = (radius - width.max(1.0)).max(0.0);
    let (cx, cy) = (center.x, center.y);
    let r = radius.ceil() as i32;
    for dy in -r..=r {
        for dx in -r..=r {
            let d = ((dx * dx + dy * dy) as f64).sqrt();
            if d <= radius && d > inner {
                canvas.set((cx + dx as f64) as i32, (cy + dy as f64) as i32);
            }
        }
    }
}

/// Small plus-shaped marker
pub fn draw_marker(canvas: &mut BrailleCanvas, at: (i32, i32), size: i32) {
    for i in -size..=size {
        canvas.set(at.0 + i, at.1);
        canvas.set(at.0, at.1 + i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, (0, 0), (9, 0));
        assert_eq!(canvas.to_text(), "⠉⠉⠉⠉⠉");
    }

    #[test]
    fn test_line_reversed_matches() {
        let mut forward = BrailleCanvas::new(4, 2);
        let mut backward = BrailleCanvas::new(4, 2);
        draw_line(&mut forward, (0, 0), (7, 7));
        draw_line(&mut backward, (7, 7), (0, 0));
        assert_eq!(forward.to_text(), backward.to_text());
    }

    #[test]
    fn test_circle_outline_leaves_center_empty() {
        let mut canvas = BrailleCanvas::new(20, 10);
        draw_circle_outline(&mut canvas, DVec2::new(20.0, 20.0), 15.0, 2.0);
        assert!(!canvas.is_blank());
        assert_eq!(canvas.char_at(10, 5), '\u{2800}');
    }
}
