//! Cubic bezier curves, flattened to polylines by uniform sampling.

use crate::canvas::Canvas;
use crate::color::Color;
use crate::error::{Error, Result};
use crate::geom::Vec2f;

/// Number of segments a drawn curve is flattened into.
const DRAW_POINTS: usize = 64;

/// Evaluates a cubic bezier with control points `ctl` at parameter `part`.
fn bezier_point(part: f32, ctl: &[Vec2f; 4]) -> Vec2f {
    let lerp = |a: f32, b: f32| a + (b - a) * part;

    let xa = lerp(ctl[0].x, ctl[1].x);
    let xb = lerp(ctl[1].x, ctl[2].x);
    let xc = lerp(ctl[2].x, ctl[3].x);
    let xp = lerp(xa, xb);
    let xq = lerp(xb, xc);
    let x = lerp(xp, xq);

    let ya = lerp(ctl[0].y, ctl[1].y);
    let yb = lerp(ctl[1].y, ctl[2].y);
    let yc = lerp(ctl[2].y, ctl[3].y);
    let yp = lerp(ya, yb);
    let yq = lerp(yb, yc);
    let y = lerp(yp, yq);

    Vec2f::new(x, y)
}

/// Flattens the parameter window `[t_from, t_to]` of a cubic bezier into
/// `out`. At least 4 output points are required.
pub fn vectorize_bezier_part(out: &mut [Vec2f], ctl: &[Vec2f; 4], t_from: f32, t_to: f32) -> Result<()> {
    if out.len() < 4 {
        return Err(Error::BadParam);
    }
    let delta = (t_to - t_from) / (out.len() - 1) as f32;
    let mut part = t_from;
    for slot in out.iter_mut() {
        *slot = bezier_point(part, ctl);
        part += delta;
    }
    Ok(())
}

/// Flattens a whole cubic bezier into `out`.
pub fn vectorize_bezier(out: &mut [Vec2f], ctl: &[Vec2f; 4]) -> Result<()> {
    vectorize_bezier_part(out, ctl, 0.0, 1.0)
}

impl Canvas {
    /// Draws the parameter window `[from, to]` of a cubic bezier curve under
    /// the current transform.
    pub fn draw_bezier_part(&mut self, color: Color, ctl: &[Vec2f; 4], from: f32, to: f32) {
        let (from, to) = if to < from { (to, from) } else { (from, to) };
        let delta = (to - from) / (DRAW_POINTS - 2) as f32;
        let mut part = from;
        let mut last = bezier_point(from, ctl);
        for _ in 0..DRAW_POINTS - 1 {
            let point = bezier_point(part, ctl);
            self.draw_line(color, last.x, last.y, point.x, point.y);
            last = point;
            part += delta;
        }
    }

    /// Draws a whole cubic bezier curve under the current transform.
    pub fn draw_bezier(&mut self, color: Color, ctl: &[Vec2f; 4]) {
        self.draw_bezier_part(color, ctl, 0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::PixelFormat;

    #[test]
    fn endpoints_match_control_points() {
        let ctl = [
            Vec2f::new(0.0, 0.0),
            Vec2f::new(0.0, 4.0),
            Vec2f::new(4.0, 4.0),
            Vec2f::new(4.0, 0.0),
        ];
        assert_eq!(bezier_point(0.0, &ctl), ctl[0]);
        assert_eq!(bezier_point(1.0, &ctl), ctl[3]);
    }

    #[test]
    fn vectorize_requires_four_points() {
        let ctl = [Vec2f::default(); 4];
        let mut too_few = [Vec2f::default(); 3];
        assert_eq!(vectorize_bezier(&mut too_few, &ctl), Err(Error::BadParam));
        let mut enough = [Vec2f::default(); 8];
        assert!(vectorize_bezier(&mut enough, &ctl).is_ok());
    }

    #[test]
    fn flattened_points_walk_the_curve() {
        let ctl = [
            Vec2f::new(0.0, 0.0),
            Vec2f::new(0.0, 8.0),
            Vec2f::new(8.0, 8.0),
            Vec2f::new(8.0, 0.0),
        ];
        let mut points = [Vec2f::default(); 16];
        vectorize_bezier(&mut points, &ctl).unwrap();
        assert_eq!(points[0], ctl[0]);
        assert!((points[15].x - 8.0).abs() < 1e-4);
        // The midpoint of this symmetric curve sits at (4, 6).
        let mid = bezier_point(0.5, &ctl);
        assert!((mid.x - 4.0).abs() < 1e-4);
        assert!((mid.y - 6.0).abs() < 1e-4);
    }

    #[test]
    fn drawing_a_bezier_paints_pixels() {
        let mut canvas = Canvas::new(16, 16, PixelFormat::Argb8888).unwrap();
        let ctl = [
            Vec2f::new(1.0, 14.0),
            Vec2f::new(1.0, 1.0),
            Vec2f::new(14.0, 1.0),
            Vec2f::new(14.0, 14.0),
        ];
        canvas.draw_bezier(Color::WHITE, &ctl);
        let mut count = 0;
        for y in 0..16 {
            for x in 0..16 {
                if canvas.get_pixel(x, y) == Some(Color::WHITE) {
                    count += 1;
                }
            }
        }
        assert!(count > 10, "painted {count} pixels");
    }
}
