//! High-level drawing entry points.
//!
//! Every call transforms its coordinates through the buffer's current matrix,
//! maps them through the orientation, marks the dirty rectangle once, and
//! hands the result to a raster kernel. `simple_*` variants skip the matrix
//! (but not the orientation), matching the raw-coordinate layer underneath
//! the transformed API.

use crate::canvas::Canvas;
use crate::color::Color;
use crate::error::Error;
use crate::geom::{Linef, Quadf, Rectf, Trif, Vec2f, UNIT_QUAD_UVS, UNIT_TRI_UVS};
use crate::orientation::{orient_rectf, orient_vec2f};
use crate::raster::{self, Paint, Scanlines};
use crate::shader::{Shader, ShaderCtx, UvMode};

mod arc;
mod curve;
mod poly;

pub use curve::{vectorize_bezier, vectorize_bezier_part};
pub use poly::{transform_points, triangulate};

impl Canvas {
    /* ==== Solid shapes, transformed ==== */

    /// Draws a filled rectangle under the current transform.
    pub fn draw_rect(&mut self, color: Color, x: f32, y: f32, width: f32, height: f32) {
        if !self.drawable_color(color) {
            return;
        }
        let matrix = self.matrix();
        if matrix.is_first_order() {
            let (tx, ty) = matrix.apply(x, y);
            self.simple_rect(color, tx, ty, width * matrix.a0, height * matrix.b1);
        } else {
            let quad = [
                matrix.apply(x, y),
                matrix.apply(x + width, y),
                matrix.apply(x + width, y + height),
                matrix.apply(x, y + height),
            ];
            self.quad_unshaded(color, quad);
        }
    }

    /// Draws a filled triangle under the current transform.
    pub fn draw_tri(&mut self, color: Color, x0: f32, y0: f32, x1: f32, y1: f32, x2: f32, y2: f32) {
        if !self.drawable_color(color) {
            return;
        }
        let matrix = self.matrix();
        let (x0, y0) = matrix.apply(x0, y0);
        let (x1, y1) = matrix.apply(x1, y1);
        let (x2, y2) = matrix.apply(x2, y2);
        self.simple_tri(color, x0, y0, x1, y1, x2, y2);
    }

    /// Draws a line under the current transform.
    pub fn draw_line(&mut self, color: Color, x0: f32, y0: f32, x1: f32, y1: f32) {
        if !self.drawable_color(color) {
            return;
        }
        let matrix = self.matrix();
        let (x0, y0) = matrix.apply(x0, y0);
        let (x1, y1) = matrix.apply(x1, y1);
        self.simple_line(color, x0, y0, x1, y1);
    }

    /* ==== Solid shapes, matrix-ignoring ==== */

    /// Draws a filled axis-aligned rectangle, ignoring the current transform.
    pub fn simple_rect(&mut self, color: Color, x: f32, y: f32, width: f32, height: f32) {
        if !self.drawable_color(color) {
            return;
        }
        if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
            self.record_error(Error::InfiniteParam);
            return;
        }
        let r = orient_rectf(
            self.orientation(),
            self.raw_width(),
            self.raw_height(),
            Rectf::new(x, y, width, height),
        );
        self.mark_dirty_rect(
            (r.x.min(r.x + r.w) - 0.5) as i32,
            (r.y.min(r.y + r.h) - 0.5) as i32,
            r.w.abs() as i32 + 1,
            r.h.abs() as i32 + 1,
        );
        let paint = Paint::select(self, color);
        raster::rect_unshaded(self, &paint, Scanlines::All, r.x, r.y, r.w, r.h);
    }

    /// Draws a filled triangle, ignoring the current transform.
    pub fn simple_tri(&mut self, color: Color, x0: f32, y0: f32, x1: f32, y1: f32, x2: f32, y2: f32) {
        if !self.drawable_color(color) {
            return;
        }
        let coords = [x0, y0, x1, y1, x2, y2];
        if coords.iter().any(|v| !v.is_finite()) {
            self.record_error(Error::InfiniteParam);
            return;
        }
        if (y0 == y1 && y1 == y2) || (x0 == x1 && x1 == x2) {
            // Flat triangles have no area.
            return;
        }
        let coords = self.orient_tri(coords);
        self.mark_tri_dirty(&coords);
        let paint = Paint::select(self, color);
        raster::tri_unshaded(self, &paint, Scanlines::All, coords);
    }

    /// Draws a line, ignoring the current transform.
    pub fn simple_line(&mut self, color: Color, x0: f32, y0: f32, x1: f32, y1: f32) {
        if !self.drawable_color(color) {
            return;
        }
        if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
            self.record_error(Error::InfiniteParam);
            return;
        }
        let o = self.orientation();
        let (w, h) = (self.raw_width(), self.raw_height());
        let p0 = orient_vec2f(o, w, h, Vec2f::new(x0, y0));
        let p1 = orient_vec2f(o, w, h, Vec2f::new(x1, y1));
        self.mark_dirty_point(p0.x as i32, p0.y as i32);
        self.mark_dirty_point(p1.x as i32, p1.y as i32);
        let paint = Paint::select(self, color);
        raster::line_unshaded(self, &paint, [p0.x, p0.y, p1.x, p1.y]);
    }

    /* ==== Shaded shapes ==== */

    /// Draws a rectangle through a shader. `uvs` defaults to the unit square.
    pub fn shade_rect(
        &mut self,
        tint: Color,
        shader: &dyn Shader,
        uvs: Option<&Quadf>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) {
        let uvs = uvs.copied().unwrap_or(UNIT_QUAD_UVS);
        let matrix = self.matrix();
        if matrix.is_first_order() {
            let (tx, ty) = matrix.apply(x, y);
            let r = orient_rectf(
                self.orientation(),
                self.raw_width(),
                self.raw_height(),
                Rectf::new(tx, ty, width * matrix.a0, height * matrix.b1),
            );
            // Axis swaps reorder the UV corners with the rectangle.
            let uvs = if self.orientation().swaps_axes() {
                Quadf::new(uvs.x0, uvs.y0, uvs.x3, uvs.y3, uvs.x2, uvs.y2, uvs.x1, uvs.y1)
            } else {
                uvs
            };
            self.mark_dirty_rect(
                (r.x.min(r.x + r.w) - 0.5) as i32,
                (r.y.min(r.y + r.h) - 0.5) as i32,
                r.w.abs() as i32 + 1,
                r.h.abs() as i32 + 1,
            );
            let mut ctx = ShaderCtx::new(shader, tint, self.is_palette());
            if ctx.uv_mode == UvMode::PerPixel && uvs_are_axis_aligned(&uvs) {
                ctx.uv_mode = UvMode::AxisAligned;
            }
            raster::rect_shaded(self, &ctx, tint, Scanlines::All, r.x, r.y, r.w, r.h, &uvs);
        } else {
            let quad = [
                matrix.apply(x, y),
                matrix.apply(x + width, y),
                matrix.apply(x + width, y + height),
                matrix.apply(x, y + height),
            ];
            self.quad_shaded(tint, shader, quad, &uvs);
        }
    }

    /// Draws a triangle through a shader. `uvs` defaults to the unit
    /// triangle.
    pub fn shade_tri(
        &mut self,
        tint: Color,
        shader: &dyn Shader,
        uvs: Option<&Trif>,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    ) {
        let uvs = uvs.copied().unwrap_or(UNIT_TRI_UVS);
        let matrix = self.matrix();
        let (x0, y0) = matrix.apply(x0, y0);
        let (x1, y1) = matrix.apply(x1, y1);
        let (x2, y2) = matrix.apply(x2, y2);
        let coords = [x0, y0, x1, y1, x2, y2];
        if coords.iter().any(|v| !v.is_finite()) {
            self.record_error(Error::InfiniteParam);
            return;
        }
        if (y0 == y1 && y1 == y2) || (x0 == x1 && x1 == x2) {
            return;
        }
        let coords = self.orient_tri(coords);
        self.mark_tri_dirty(&coords);
        let ctx = ShaderCtx::new(shader, tint, self.is_palette());
        raster::tri_shaded(
            self,
            &ctx,
            tint,
            Scanlines::All,
            coords,
            [uvs.x0, uvs.y0, uvs.x1, uvs.y1, uvs.x2, uvs.y2],
        );
    }

    /// Draws a line through a shader. `uvs` defaults to `(0,0)..(1,0)`.
    pub fn shade_line(
        &mut self,
        tint: Color,
        shader: &dyn Shader,
        uvs: Option<&Linef>,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
    ) {
        let uvs = uvs.copied().unwrap_or(Linef {
            x0: 0.0,
            y0: 0.0,
            x1: 1.0,
            y1: 0.0,
        });
        let matrix = self.matrix();
        let (x0, y0) = matrix.apply(x0, y0);
        let (x1, y1) = matrix.apply(x1, y1);
        if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
            self.record_error(Error::InfiniteParam);
            return;
        }
        let o = self.orientation();
        let (w, h) = (self.raw_width(), self.raw_height());
        let p0 = orient_vec2f(o, w, h, Vec2f::new(x0, y0));
        let p1 = orient_vec2f(o, w, h, Vec2f::new(x1, y1));
        self.mark_dirty_point(p0.x as i32, p0.y as i32);
        self.mark_dirty_point(p1.x as i32, p1.y as i32);
        let ctx = ShaderCtx::new(shader, tint, self.is_palette());
        raster::line_shaded(
            self,
            &ctx,
            tint,
            [p0.x, p0.y, p1.x, p1.y],
            [uvs.x0, uvs.y0, uvs.x1, uvs.y1],
        );
    }

    /* ==== Outlines ==== */

    /// Outlines a rectangle under the current transform.
    pub fn outline_rect(&mut self, color: Color, x: f32, y: f32, width: f32, height: f32) {
        self.draw_line(color, x, y, x + width, y);
        self.draw_line(color, x + width, y, x + width, y + height);
        self.draw_line(color, x + width, y + height, x, y + height);
        self.draw_line(color, x, y + height, x, y);
    }

    /// Outlines a triangle under the current transform.
    pub fn outline_tri(&mut self, color: Color, x0: f32, y0: f32, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.draw_line(color, x0, y0, x1, y1);
        self.draw_line(color, x1, y1, x2, y2);
        self.draw_line(color, x2, y2, x0, y0);
    }

    /* ==== Internal helpers ==== */

    fn orient_tri(&self, coords: [f32; 6]) -> [f32; 6] {
        let o = self.orientation();
        let (w, h) = (self.raw_width(), self.raw_height());
        let p0 = orient_vec2f(o, w, h, Vec2f::new(coords[0], coords[1]));
        let p1 = orient_vec2f(o, w, h, Vec2f::new(coords[2], coords[3]));
        let p2 = orient_vec2f(o, w, h, Vec2f::new(coords[4], coords[5]));
        [p0.x, p0.y, p1.x, p1.y, p2.x, p2.y]
    }

    fn mark_tri_dirty(&mut self, coords: &[f32; 6]) {
        for i in 0..3 {
            let x = coords[i * 2];
            let y = coords[i * 2 + 1];
            self.mark_dirty_point((x - 0.5) as i32, (y - 0.5) as i32);
            self.mark_dirty_point((x + 0.5) as i32, (y + 0.5) as i32);
        }
    }

    /// Fills a transformed quad as two triangles. Coordinates are already
    /// through the matrix but not the orientation.
    fn quad_unshaded(&mut self, color: Color, quad: [(f32, f32); 4]) {
        let [(x0, y0), (x1, y1), (x2, y2), (x3, y3)] = quad;
        if quad.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            self.record_error(Error::InfiniteParam);
            return;
        }
        let tri_a = self.orient_tri([x0, y0, x1, y1, x2, y2]);
        let tri_b = self.orient_tri([x0, y0, x2, y2, x3, y3]);
        self.mark_tri_dirty(&tri_a);
        self.mark_tri_dirty(&tri_b);
        let paint = Paint::select(self, color);
        raster::tri_unshaded(self, &paint, Scanlines::All, tri_a);
        raster::tri_unshaded(self, &paint, Scanlines::All, tri_b);
    }

    fn quad_shaded(&mut self, tint: Color, shader: &dyn Shader, quad: [(f32, f32); 4], uvs: &Quadf) {
        let [(x0, y0), (x1, y1), (x2, y2), (x3, y3)] = quad;
        if quad.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            self.record_error(Error::InfiniteParam);
            return;
        }
        let tri_a = self.orient_tri([x0, y0, x1, y1, x2, y2]);
        let tri_b = self.orient_tri([x0, y0, x2, y2, x3, y3]);
        self.mark_tri_dirty(&tri_a);
        self.mark_tri_dirty(&tri_b);
        let ctx = ShaderCtx::new(shader, tint, self.is_palette());
        raster::tri_shaded(
            self,
            &ctx,
            tint,
            Scanlines::All,
            tri_a,
            [uvs.x0, uvs.y0, uvs.x1, uvs.y1, uvs.x2, uvs.y2],
        );
        raster::tri_shaded(
            self,
            &ctx,
            tint,
            Scanlines::All,
            tri_b,
            [uvs.x0, uvs.y0, uvs.x2, uvs.y2, uvs.x3, uvs.y3],
        );
    }
}

/// True when u varies only along x and v only along y, so the rect kernel can
/// run one UV lerp per scanline instead of four.
fn uvs_are_axis_aligned(uvs: &Quadf) -> bool {
    uvs.y0 == uvs.y1 && uvs.y3 == uvs.y2 && uvs.x0 == uvs.x3 && uvs.x1 == uvs.x2
}
