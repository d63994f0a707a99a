//! Polygon outlines and ear-clipping triangulation.

use smallvec::SmallVec;

use crate::canvas::Canvas;
use crate::color::Color;
use crate::geom::{Rectf, Vec2f};
use crate::matrix::Matrix2;

impl Canvas {
    /// Outlines an open polyline under the current transform.
    pub fn outline_points(&mut self, color: Color, points: &[Vec2f]) {
        for w in points.windows(2) {
            self.draw_line(color, w[0].x, w[0].y, w[1].x, w[1].y);
        }
    }

    /// Outlines a polyline, optionally closing it with a segment from the
    /// last point back to the first.
    pub fn outline_points_closed(&mut self, color: Color, points: &[Vec2f], close: bool) {
        self.outline_points(color, points);
        if close && points.len() >= 2 {
            let first = points[0];
            let last = points[points.len() - 1];
            self.draw_line(color, last.x, last.y, first.x, first.y);
        }
    }

    /// Outlines the fraction `[from, to]` of a polyline's total perimeter,
    /// both in `0..=1`.
    pub fn outline_points_part(
        &mut self,
        color: Color,
        points: &[Vec2f],
        close: bool,
        from: f32,
        to: f32,
    ) {
        let (from, to) = if to < from { (to, from) } else { (from, to) };
        if from <= 0.0 && to >= 1.0 {
            self.outline_points_closed(color, points, close);
            return;
        }
        if points.len() < 2 {
            return;
        }

        let segments = points.len() - if close { 0 } else { 1 };
        let mut dist: SmallVec<[f32; 16]> = SmallVec::with_capacity(segments);
        let mut total = 0.0;
        for i in 0..segments {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            let len = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
            dist.push(len);
            total += len;
        }

        let mut start_dist = total * from;
        let mut remaining = total * to;

        for i in 0..segments {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            let len = dist[i];
            if start_dist > len {
                // Segment entirely before the window.
            } else if start_dist > 0.0 {
                let part0 = start_dist / len;
                let sx = a.x + (b.x - a.x) * part0;
                let sy = a.y + (b.y - a.y) * part0;
                if remaining > len {
                    self.draw_line(color, sx, sy, b.x, b.y);
                } else {
                    let part1 = remaining / len;
                    self.draw_line(
                        color,
                        sx,
                        sy,
                        a.x + (b.x - a.x) * part1,
                        a.y + (b.y - a.y) * part1,
                    );
                }
            } else if len < remaining {
                self.draw_line(color, a.x, a.y, b.x, b.y);
            } else {
                let part = remaining / len;
                self.draw_line(color, a.x, a.y, a.x + (b.x - a.x) * part, a.y + (b.y - a.y) * part);
                break;
            }
            remaining -= len;
            start_dist -= len;
        }
    }

    /// Fills a closed polygon by triangulating it first. Self-intersecting
    /// polygons draw nothing.
    pub fn draw_polygon(&mut self, color: Color, points: &[Vec2f]) {
        let tris = triangulate(points);
        self.draw_polygon_triangulated(color, points, &tris);
    }

    /// Fills a polygon from a previously computed triangulation.
    pub fn draw_polygon_triangulated(&mut self, color: Color, points: &[Vec2f], tris: &[[usize; 3]]) {
        for tri in tris {
            let (a, b, c) = (points[tri[0]], points[tri[1]], points[tri[2]]);
            self.draw_tri(color, a.x, a.y, b.x, b.y, c.x, c.y);
        }
    }
}

/// Transforms points in place through a matrix.
pub fn transform_points(matrix: Matrix2, points: &mut [Vec2f]) {
    for p in points {
        *p = matrix.apply_vec(*p);
    }
}

#[derive(Clone, Copy)]
struct IndexedPoint {
    p: Vec2f,
    index: usize,
}

// Signed-area winding test over `count` consecutive vertices starting at
// `start`, with all y values shifted by `dy` to stay positive.
fn is_clockwise(points: &[IndexedPoint], start: usize, count: usize, dy: f32) -> bool {
    let n = points.len();
    let mut result = 0.0;
    for i in 0..count {
        let a = points[(start + i) % n].p;
        let b = points[(start + (i + 1) % count) % n].p;
        result += (b.x - a.x) * (b.y + a.y + dy);
    }
    result < 0.0
}

fn line_bounding_box(a: Vec2f, b: Vec2f) -> Rectf {
    Rectf::new(a.x, a.y, b.x - a.x, b.y - a.y).abs()
}

fn bounding_box_contains(b: Rectf, p: Vec2f) -> bool {
    if b.w == 0.0 && b.h == 0.0 {
        p.x == b.x && p.y == b.y
    } else if b.w == 0.0 {
        p.x >= b.x && p.x <= b.x + b.w && p.y > b.y && p.y < b.y + b.h
    } else if b.h == 0.0 {
        p.x > b.x && p.x < b.x + b.w && p.y >= b.y && p.y <= b.y + b.h
    } else {
        p.x > b.x && p.x < b.x + b.w && p.y > b.y && p.y < b.y + b.h
    }
}

// Proper intersection test; touching endpoints do not count.
fn lines_intersect(a0: Vec2f, a1: Vec2f, b0: Vec2f, b1: Vec2f) -> bool {
    let slope_a = (a1.y - a0.y) / (a1.x - a0.x);
    let slope_b = (b1.y - b0.y) / (b1.x - b0.x);
    if slope_a == slope_b || (slope_a.is_infinite() && slope_b.is_infinite()) {
        return false;
    }

    let off_a = a0.y - slope_a * a0.x;
    let off_b = b0.y - slope_b * b0.x;
    let box_a = line_bounding_box(a0, a1);
    let box_b = line_bounding_box(b0, b1);

    if slope_a.is_infinite() {
        let y = slope_b * a0.x + off_b;
        return y > box_a.y && y < box_a.y + box_a.h && a0.x > box_b.x && a0.x < box_b.x + box_b.w;
    }
    if slope_b.is_infinite() {
        let y = slope_a * b0.x + off_a;
        return y > box_b.y && y < box_b.y + box_b.h && b0.x > box_a.x && b0.x < box_a.x + box_a.w;
    }

    let x = (off_b - off_a) / (slope_a - slope_b);
    let y = x * slope_a + off_a;
    let p = Vec2f::new(x, y);
    bounding_box_contains(box_a, p) && bounding_box_contains(box_b, p)
}

fn diagonal_crosses_outline(points: &[Vec2f], start: Vec2f, end: Vec2f) -> bool {
    let n = points.len();
    for i in 0..n {
        if lines_intersect(start, end, points[i], points[(i + 1) % n]) {
            return true;
        }
    }
    false
}

/// Triangulates a closed, non-self-intersecting polygon by ear clipping.
///
/// Returns `n - 2` index triples into `points`. Self-intersecting input is
/// not handled: when no ear can be found the function gives up and returns an
/// empty vector.
///
/// # Examples
///
/// ```
/// use trama::{triangulate, Vec2f};
///
/// let square = [
///     Vec2f::new(0.0, 0.0),
///     Vec2f::new(4.0, 0.0),
///     Vec2f::new(4.0, 4.0),
///     Vec2f::new(0.0, 4.0),
/// ];
/// let tris = triangulate(&square);
/// assert_eq!(tris.len(), 2);
/// ```
pub fn triangulate(points: &[Vec2f]) -> Vec<[usize; 3]> {
    if points.len() < 3 {
        return Vec::new();
    }

    // Shift y so the winding test sees positive coordinates.
    let mut dy = 0.0f32;
    let mut working: Vec<IndexedPoint> = points
        .iter()
        .enumerate()
        .map(|(index, &p)| {
            dy = dy.max(-p.y);
            IndexedPoint { p, index }
        })
        .collect();
    let dy = dy * 2.0 + 2.0;

    let n_tris = points.len() - 2;
    let mut tris = Vec::with_capacity(n_tris);
    let clockwise = is_clockwise(&working, 0, working.len(), dy);

    for _ in 0..n_tris {
        let n = working.len();
        let mut found = false;
        for i in 0..n {
            let attempt = is_clockwise(&working, i, 3, dy);
            let is_ear = attempt == clockwise
                && !diagonal_crosses_outline(points, working[i].p, working[(i + 2) % n].p);
            if is_ear {
                tris.push([
                    working[i].index,
                    working[(i + 1) % n].index,
                    working[(i + 2) % n].index,
                ]);
                working.remove((i + 1) % n);
                found = true;
                break;
            }
        }
        if !found {
            tracing::warn!("cannot triangulate shape; is it self-intersecting?");
            return Vec::new();
        }
    }

    tris
}
