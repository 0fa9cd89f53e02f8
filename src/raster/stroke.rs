use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_polygon_mut, Canvas};
use imageproc::point::Point;

use crate::math::polygon_2d::{left_normal, segment_direction};
use crate::math::Point2;

/// Strokes below this thickness are drawn as 1-pixel lines.
const HAIRLINE: f64 = 1.5;

/// Draws a closed polyline with the given thickness and round joins.
///
/// `thickness` is the distance between the outermost covered pixel centres,
/// so re-tracing the stroke yields two borders `thickness` apart.
#[allow(clippy::cast_possible_truncation)]
pub fn stroke_closed_mut<C>(canvas: &mut C, points: &[Point2], thickness: f64, color: C::Pixel)
where
    C: Canvas,
    C::Pixel: 'static,
{
    let n = points.len();
    if n == 0 {
        return;
    }
    if thickness < HAIRLINE {
        for i in 0..n {
            let a = points[i];
            let b = points[(i + 1) % n];
            draw_line_segment_mut(
                canvas,
                (a.x as f32, a.y as f32),
                (b.x as f32, b.y as f32),
                color,
            );
        }
        return;
    }

    let half = thickness / 2.0;
    let radius = half.round() as i32;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        draw_filled_circle_mut(canvas, to_pixel(&a), radius, color);
        let Some(dir) = segment_direction(&a, &b) else {
            continue;
        };
        let offset = left_normal(dir) * half;
        let quad = [
            to_point(&(a + offset)),
            to_point(&(b + offset)),
            to_point(&(b - offset)),
            to_point(&(a - offset)),
        ];
        // draw_polygon_mut rejects polygons whose first and last points coincide.
        if quad[0] != quad[3] {
            draw_polygon_mut(canvas, &quad, color);
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn to_pixel(p: &Point2) -> (i32, i32) {
    (p.x.round() as i32, p.y.round() as i32)
}

fn to_point(p: &Point2) -> Point<i32> {
    let (x, y) = to_pixel(p);
    Point::new(x, y)
}
