//! Arcs and circles, decomposed into triangle fans.
//!
//! The subdivision count follows the on-screen radius (the radius scaled by
//! the current matrix's column magnitudes): 8, 16 or 24 divisions per half
//! turn. Circles draw from precalculated unit-circle tables through the
//! matrix stack; arcs rotate a unit vector incrementally by the division
//! angle.

use std::f32::consts::PI;
use std::sync::OnceLock;

use smallvec::SmallVec;

use crate::canvas::Canvas;
use crate::color::Color;
use crate::geom::{flerp4, Linef, Quadf, Trif, Vec2f, UNIT_QUAD_UVS};
use crate::matrix::Matrix2;
use crate::shader::Shader;

/// A precalculated unit circle: `n + 1` perimeter points (closed) and per-fan
/// triangle UVs.
struct CircleTable {
    points: Vec<Vec2f>,
    uvs: Vec<Trif>,
}

fn circle_table(n: usize) -> CircleTable {
    let mut points = Vec::with_capacity(n + 1);
    for i in 0..=n {
        let angle = i as f32 / n as f32 * 2.0 * PI;
        points.push(Vec2f::new(angle.cos(), -angle.sin()));
    }
    let uv = |p: Vec2f| Vec2f::new(p.x * 0.5 + 0.5, p.y * 0.5 + 0.5);
    let mut uvs = Vec::with_capacity(n);
    for i in 0..n {
        let a = uv(points[0]);
        let b = uv(points[i]);
        let c = uv(points[i + 1]);
        uvs.push(Trif::new(a.x, a.y, b.x, b.y, c.x, c.y));
    }
    CircleTable { points, uvs }
}

fn pick_circle(matrix: &Matrix2, r: f32) -> &'static CircleTable {
    static CIRCLE_8: OnceLock<CircleTable> = OnceLock::new();
    static CIRCLE_16: OnceLock<CircleTable> = OnceLock::new();
    static CIRCLE_24: OnceLock<CircleTable> = OnceLock::new();

    let (ma, mb) = matrix.column_magnitudes();
    let on_screen = r * ma * mb;
    if on_screen > 30.0 {
        CIRCLE_24.get_or_init(|| circle_table(24))
    } else if on_screen > 7.0 {
        CIRCLE_16.get_or_init(|| circle_table(16))
    } else {
        CIRCLE_8.get_or_init(|| circle_table(8))
    }
}

/// Normalises an angle pair: start wrapped into one turn, endpoints ordered,
/// span clamped to a full turn.
fn normalize_angles(a0: f32, a1: f32) -> (f32, f32) {
    let wrapped = a0 % (2.0 * PI);
    let mut a1 = a1 + wrapped - a0;
    let mut a0 = wrapped;
    if a1 < a0 {
        core::mem::swap(&mut a0, &mut a1);
    }
    if a1 - a0 > 2.0 * PI {
        (0.0, 2.0 * PI)
    } else {
        (a0, a1)
    }
}

fn pick_arc_divs(matrix: &Matrix2, r: f32, a0: f32, a1: f32) -> i32 {
    let (ma, mb) = matrix.column_magnitudes();
    let on_screen = r * ma * mb;
    let per_pi = if on_screen > 30.0 {
        24.0
    } else if on_screen > 7.0 {
        16.0
    } else {
        8.0
    };
    (((a1 - a0) / PI * per_pi) as i32).max(1)
}

impl Canvas {
    /// Draws a filled arc between two angles (radians, counter-clockwise)
    /// under the current transform.
    pub fn draw_arc(&mut self, color: Color, x: f32, y: f32, r: f32, a0: f32, a1: f32) {
        if !self.drawable_color(color) || r == 0.0 {
            return;
        }
        let (a0, a1) = normalize_angles(a0, a1);
        let n_div = pick_arc_divs(&self.matrix(), r, a0, a1);

        let div_angle = (a1 - a0) / n_div as f32;
        let c_sin = div_angle.sin();
        let c_cos = div_angle.cos();

        let mut x0 = a0.cos();
        let mut y0 = a0.sin();
        for _ in 0..n_div {
            let x1 = x0 * c_cos - y0 * c_sin;
            let y1 = x0 * c_sin + y0 * c_cos;
            // Up is -y on screen.
            self.draw_tri(color, x, y, x + x0 * r, y - y0 * r, x + x1 * r, y - y1 * r);
            x0 = x1;
            y0 = y1;
        }
    }

    /// Draws a filled arc, ignoring the current transform.
    pub fn simple_arc(&mut self, color: Color, x: f32, y: f32, r: f32, a0: f32, a1: f32) {
        if !self.drawable_color(color) || r == 0.0 {
            return;
        }
        let (a0, a1) = normalize_angles(a0, a1);
        let n_div = pick_arc_divs(&Matrix2::IDENTITY, r.abs(), a0, a1);

        let div_angle = (a1 - a0) / n_div as f32;
        let c_sin = div_angle.sin();
        let c_cos = div_angle.cos();

        let mut x0 = a0.cos();
        let mut y0 = a0.sin();
        for _ in 0..n_div {
            let x1 = x0 * c_cos - y0 * c_sin;
            let y1 = x0 * c_sin + y0 * c_cos;
            self.simple_tri(color, x, y, x + x0 * r, y - y0 * r, x + x1 * r, y - y1 * r);
            x0 = x1;
            y0 = y1;
        }
    }

    /// Draws a filled circle under the current transform.
    pub fn draw_circle(&mut self, color: Color, x: f32, y: f32, r: f32) {
        if !self.drawable_color(color) || r == 0.0 {
            return;
        }
        let table = pick_circle(&self.matrix(), r);
        self.push_matrix();
        self.apply_matrix(Matrix2::translate(x, y));
        self.apply_matrix(Matrix2::scale(r, r));
        let points = &table.points;
        for i in 0..points.len() - 2 {
            self.draw_tri(
                color,
                points[0].x,
                points[0].y,
                points[i].x,
                points[i].y,
                points[i + 1].x,
                points[i + 1].y,
            );
        }
        let _ = self.pop_matrix();
    }

    /// Draws a filled circle, ignoring the current transform.
    pub fn simple_circle(&mut self, color: Color, x: f32, y: f32, r: f32) {
        self.simple_arc(color, x, y, r, 0.0, 2.0 * PI);
    }

    /// Draws the ring between two radii over an angle span.
    pub fn draw_hollow_arc(
        &mut self,
        color: Color,
        x: f32,
        y: f32,
        radius0: f32,
        radius1: f32,
        a0: f32,
        a1: f32,
    ) {
        let points = vectorize_arc_points(24, 0.0, 0.0, 1.0, a0, a1);
        for w in points.windows(2) {
            let (p, q) = (w[0], w[1]);
            self.draw_tri(
                color,
                x + p.x * radius0,
                y + p.y * radius0,
                x + p.x * radius1,
                y + p.y * radius1,
                x + q.x * radius1,
                y + q.y * radius1,
            );
            self.draw_tri(
                color,
                x + p.x * radius0,
                y + p.y * radius0,
                x + q.x * radius0,
                y + q.y * radius0,
                x + q.x * radius1,
                y + q.y * radius1,
            );
        }
    }

    /// Draws the ring between two radii.
    pub fn draw_hollow_circle(&mut self, color: Color, x: f32, y: f32, radius0: f32, radius1: f32) {
        self.draw_hollow_arc(color, x, y, radius0, radius1, 0.0, 2.0 * PI);
    }

    /// Draws a hollow arc with rounded end caps.
    pub fn draw_round_hollow_arc(
        &mut self,
        color: Color,
        x: f32,
        y: f32,
        radius0: f32,
        radius1: f32,
        a0: f32,
        a1: f32,
    ) {
        self.draw_hollow_arc(color, x, y, radius0, radius1, a0, a1);
        let radius = (radius0 + radius1) / 2.0;
        let dradius = (radius1 - radius0).abs() / 2.0;
        let (a2, a3, a4, a5) = if a1 < a0 {
            (a0, a0 + PI, a1 + PI, a1 + 2.0 * PI)
        } else {
            (a0 - PI, a0, a1, a1 + PI)
        };
        self.draw_arc(color, x + a0.cos() * radius, y - a0.sin() * radius, dradius, a2, a3);
        self.draw_arc(color, x + a1.cos() * radius, y - a1.sin() * radius, dradius, a4, a5);
    }

    /// Outlines an arc under the current transform.
    pub fn outline_arc(&mut self, color: Color, x: f32, y: f32, r: f32, a0: f32, a1: f32) {
        if r == 0.0 {
            return;
        }
        let (a0, a1) = normalize_angles(a0, a1);
        let n_div = pick_arc_divs(&self.matrix(), r, a0, a1);

        let div_angle = (a1 - a0) / n_div as f32;
        let c_sin = div_angle.sin();
        let c_cos = div_angle.cos();

        let mut x0 = a0.cos();
        let mut y0 = a0.sin();
        for _ in 0..n_div {
            let x1 = x0 * c_cos - y0 * c_sin;
            let y1 = x0 * c_sin + y0 * c_cos;
            self.draw_line(color, x + x0 * r, y - y0 * r, x + x1 * r, y - y1 * r);
            x0 = x1;
            y0 = y1;
        }
    }

    /// Outlines a circle under the current transform.
    pub fn outline_circle(&mut self, color: Color, x: f32, y: f32, r: f32) {
        if r == 0.0 {
            return;
        }
        let table = pick_circle(&self.matrix(), r);
        self.push_matrix();
        self.apply_matrix(Matrix2::translate(x, y));
        self.apply_matrix(Matrix2::scale(r, r));
        let points = &table.points;
        for w in points.windows(2) {
            self.draw_line(color, w[0].x, w[0].y, w[1].x, w[1].y);
        }
        let _ = self.pop_matrix();
    }

    /// Outlines both rims and the end spokes of a hollow arc.
    pub fn outline_hollow_arc(
        &mut self,
        color: Color,
        x: f32,
        y: f32,
        radius0: f32,
        radius1: f32,
        a0: f32,
        a1: f32,
    ) {
        let points = vectorize_arc_points(24, 0.0, 0.0, 1.0, a0, a1);
        for w in points.windows(2) {
            let (p, q) = (w[0], w[1]);
            self.draw_line(
                color,
                x + p.x * radius0,
                y + p.y * radius0,
                x + q.x * radius0,
                y + q.y * radius0,
            );
            self.draw_line(
                color,
                x + p.x * radius1,
                y + p.y * radius1,
                x + q.x * radius1,
                y + q.y * radius1,
            );
        }
        let (sin0, cos0) = (a0.sin(), a0.cos());
        let (sin1, cos1) = (a1.sin(), a1.cos());
        self.draw_line(
            color,
            x + cos0 * radius0,
            y - sin0 * radius0,
            x + cos0 * radius1,
            y - sin0 * radius1,
        );
        self.draw_line(
            color,
            x + cos1 * radius0,
            y - sin1 * radius0,
            x + cos1 * radius1,
            y - sin1 * radius1,
        );
    }

    /// Draws an arc through a shader. UVs interpolate bilinearly over the
    /// quad as if the arc's bounding square were textured.
    pub fn shade_arc(
        &mut self,
        tint: Color,
        shader: &dyn Shader,
        uvs: Option<&Quadf>,
        x: f32,
        y: f32,
        r: f32,
        a0: f32,
        a1: f32,
    ) {
        if r == 0.0 {
            return;
        }
        let uvs = uvs.copied().unwrap_or(UNIT_QUAD_UVS);
        let (a0, a1) = normalize_angles(a0, a1);
        let n_div = pick_arc_divs(&self.matrix(), r, a0, a1);

        let div_angle = (a1 - a0) / n_div as f32;
        let c_sin = div_angle.sin();
        let c_cos = div_angle.cos();

        let mut x0 = a0.cos();
        let mut y0 = a0.sin();

        let mut tri_uvs = Trif::new(
            (uvs.x0 + uvs.x1 + uvs.x2 + uvs.x3) * 0.25,
            (uvs.y0 + uvs.y1 + uvs.y2 + uvs.y3) * 0.25,
            flerp4(x0, y0, uvs.x0, uvs.x1, uvs.x3, uvs.x2),
            flerp4(x0, y0, uvs.y0, uvs.y1, uvs.y3, uvs.y2),
            0.0,
            0.0,
        );

        for _ in 0..n_div {
            let x1 = x0 * c_cos - y0 * c_sin;
            let y1 = x0 * c_sin + y0 * c_cos;
            tri_uvs.x2 = flerp4(x1, y1, uvs.x0, uvs.x1, uvs.x3, uvs.x2);
            tri_uvs.y2 = flerp4(x1, y1, uvs.y0, uvs.y1, uvs.y3, uvs.y2);
            self.shade_tri(
                tint,
                shader,
                Some(&tri_uvs),
                x,
                y,
                x + x0 * r,
                y - y0 * r,
                x + x1 * r,
                y - y1 * r,
            );
            x0 = x1;
            y0 = y1;
            tri_uvs.x1 = tri_uvs.x2;
            tri_uvs.y1 = tri_uvs.y2;
        }
    }

    /// Draws a circle through a shader.
    pub fn shade_circle(
        &mut self,
        tint: Color,
        shader: &dyn Shader,
        uvs: Option<&Quadf>,
        x: f32,
        y: f32,
        r: f32,
    ) {
        if r == 0.0 {
            return;
        }
        let table = pick_circle(&self.matrix(), r);
        self.push_matrix();
        self.apply_matrix(Matrix2::translate(x, y));
        self.apply_matrix(Matrix2::scale(r, r));
        let points = &table.points;
        if let Some(uvs) = uvs {
            let mut uv = Trif::new(
                (uvs.x1 + uvs.x2) * 0.5,
                (uvs.y1 + uvs.y2) * 0.5,
                flerp4(points[1].x, -points[1].y, uvs.x0, uvs.x1, uvs.x3, uvs.x2),
                flerp4(points[1].x, -points[1].y, uvs.y0, uvs.y1, uvs.y3, uvs.y2),
                0.0,
                0.0,
            );
            for i in 0..points.len() - 2 {
                uv.x2 = flerp4(points[i + 1].x, -points[i + 1].y, uvs.x0, uvs.x1, uvs.x3, uvs.x2);
                uv.y2 = flerp4(points[i + 1].x, -points[i + 1].y, uvs.y0, uvs.y1, uvs.y3, uvs.y2);
                self.shade_tri(
                    tint,
                    shader,
                    Some(&uv),
                    points[0].x,
                    points[0].y,
                    points[i].x,
                    points[i].y,
                    points[i + 1].x,
                    points[i + 1].y,
                );
                uv.x1 = uv.x2;
                uv.y1 = uv.y2;
            }
        } else {
            for i in 0..points.len() - 2 {
                self.shade_tri(
                    tint,
                    shader,
                    Some(&table.uvs[i]),
                    points[0].x,
                    points[0].y,
                    points[i].x,
                    points[i].y,
                    points[i + 1].x,
                    points[i + 1].y,
                );
            }
        }
        let _ = self.pop_matrix();
    }

    /// Draws an arc outline through a shader, shading each segment line.
    pub fn shade_outline_arc(
        &mut self,
        tint: Color,
        shader: &dyn Shader,
        uvs: Option<&Quadf>,
        x: f32,
        y: f32,
        r: f32,
        a0: f32,
        a1: f32,
    ) {
        if r == 0.0 {
            return;
        }
        let uvs = uvs.copied().unwrap_or(UNIT_QUAD_UVS);
        let (a0, a1) = normalize_angles(a0, a1);
        let n_div = pick_arc_divs(&self.matrix(), r, a0, a1);

        let div_angle = (a1 - a0) / n_div as f32;
        let c_sin = div_angle.sin();
        let c_cos = div_angle.cos();

        let mut x0 = a0.cos();
        let mut y0 = a0.sin();
        let mut line_uv = Linef {
            x0: flerp4(x0, y0, uvs.x0, uvs.x1, uvs.x3, uvs.x2),
            y0: flerp4(x0, y0, uvs.y0, uvs.y1, uvs.y3, uvs.y2),
            x1: 0.0,
            y1: 0.0,
        };
        for _ in 0..n_div {
            let x1 = x0 * c_cos - y0 * c_sin;
            let y1 = x0 * c_sin + y0 * c_cos;
            line_uv.x1 = flerp4(x1, y1, uvs.x0, uvs.x1, uvs.x3, uvs.x2);
            line_uv.y1 = flerp4(x1, y1, uvs.y0, uvs.y1, uvs.y3, uvs.y2);
            self.shade_line(tint, shader, Some(&line_uv), x + x0 * r, y - y0 * r, x + x1 * r, y - y1 * r);
            x0 = x1;
            y0 = y1;
            line_uv.x0 = line_uv.x1;
            line_uv.y0 = line_uv.y1;
        }
    }

    /// Samples an arc outline into `count` points.
    pub fn vectorize_arc(count: usize, x: f32, y: f32, r: f32, a0: f32, a1: f32) -> Vec<Vec2f> {
        vectorize_arc_points(count, x, y, r, a0, a1).into_vec()
    }

    /// Samples a circle outline into `count` points.
    pub fn vectorize_circle(count: usize, x: f32, y: f32, r: f32) -> Vec<Vec2f> {
        Canvas::vectorize_arc(count, x, y, r, 0.0, 2.0 * PI)
    }
}

/// Samples an arc into `count` points by incremental rotation.
pub(crate) fn vectorize_arc_points(
    count: usize,
    x: f32,
    y: f32,
    r: f32,
    a0: f32,
    a1: f32,
) -> SmallVec<[Vec2f; 25]> {
    let mut out = SmallVec::new();
    if count < 2 {
        return out;
    }
    let (a0, a1) = normalize_angles(a0, a1);
    let div_angle = (a1 - a0) / (count - 1) as f32;
    let c_sin = div_angle.sin();
    let c_cos = div_angle.cos();
    let mut x0 = a0.cos();
    let mut y0 = a0.sin();
    for _ in 0..count {
        out.push(Vec2f::new(x + x0 * r, y - y0 * r));
        let x1 = x0 * c_cos - y0 * c_sin;
        let y1 = x0 * c_sin + y0 * c_cos;
        x0 = x1;
        y0 = y1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::PixelFormat;

    #[test]
    fn circle_covers_center_not_corners() {
        let mut canvas = Canvas::new(20, 20, PixelFormat::Argb8888).unwrap();
        canvas.draw_circle(Color::WHITE, 10.0, 10.0, 8.0);
        assert_eq!(canvas.get_pixel(10, 10), Some(Color::WHITE));
        assert_eq!(canvas.get_pixel(0, 0), Some(Color::TRANSPARENT));
        assert_eq!(canvas.get_pixel(19, 19), Some(Color::TRANSPARENT));
        // A point well inside the radius.
        assert_eq!(canvas.get_pixel(14, 10), Some(Color::WHITE));
    }

    #[test]
    fn simple_circle_draws_a_full_turn() {
        let mut canvas = Canvas::new(20, 20, PixelFormat::Argb8888).unwrap();
        canvas.simple_circle(Color::WHITE, 10.0, 10.0, 7.0);
        // Both the top and bottom halves are filled.
        assert_eq!(canvas.get_pixel(10, 5), Some(Color::WHITE));
        assert_eq!(canvas.get_pixel(10, 15), Some(Color::WHITE));
    }

    #[test]
    fn zero_radius_is_a_noop() {
        let mut canvas = Canvas::new(8, 8, PixelFormat::Argb8888).unwrap();
        canvas.draw_circle(Color::WHITE, 4.0, 4.0, 0.0);
        canvas.draw_arc(Color::WHITE, 4.0, 4.0, 0.0, 0.0, PI);
        assert!(canvas.bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn half_arc_fills_only_one_side() {
        let mut canvas = Canvas::new(20, 20, PixelFormat::Argb8888).unwrap();
        // 0..PI sweeps the upper half (up is -y).
        canvas.draw_arc(Color::WHITE, 10.0, 10.0, 8.0, 0.0, PI);
        assert_eq!(canvas.get_pixel(10, 5), Some(Color::WHITE));
        assert_eq!(canvas.get_pixel(10, 15), Some(Color::TRANSPARENT));
    }

    #[test]
    fn hollow_circle_leaves_the_middle_empty() {
        let mut canvas = Canvas::new(24, 24, PixelFormat::Argb8888).unwrap();
        canvas.draw_hollow_circle(Color::WHITE, 12.0, 12.0, 6.0, 9.0);
        assert_eq!(canvas.get_pixel(12, 12), Some(Color::TRANSPARENT));
        // In the ring band.
        assert_eq!(canvas.get_pixel(12 + 7, 12), Some(Color::WHITE));
    }

    #[test]
    fn vectorized_arc_endpoints() {
        let points = Canvas::vectorize_arc(9, 0.0, 0.0, 1.0, 0.0, PI);
        assert_eq!(points.len(), 9);
        assert!((points[0].x - 1.0).abs() < 1e-4 && points[0].y.abs() < 1e-4);
        assert!((points[8].x + 1.0).abs() < 1e-3 && points[8].y.abs() < 1e-3);
    }

    #[test]
    fn angle_normalisation_swaps_and_clamps() {
        let (a0, a1) = normalize_angles(PI, 0.0);
        assert!(a0 <= a1);
        let (a0, a1) = normalize_angles(0.0, 10.0 * PI);
        assert_eq!((a0, a1), (0.0, 2.0 * PI));
    }
}
