//! Line rasterization with analytic clipping.
//!
//! Endpoints are clipped against the clip rectangle before stepping, so the
//! inner loop never bounds-checks. The step count is the major-axis extent;
//! both axes advance by their fractional per-step delta.

use crate::canvas::Canvas;
use crate::color::Color;
use crate::fixed::Fixed;
use crate::raster::Paint;
use crate::shader::ShaderCtx;

/// Clips the segment to the clip rectangle. Returns `None` when the segment
/// misses it entirely. Keeps y0 <= y1.
fn clip_segment(canvas: &Canvas, coords: [f32; 4]) -> Option<[f32; 4]> {
    let clip = canvas.clip_raw();
    if clip.is_empty() {
        return None;
    }
    let [mut x0, mut y0, mut x1, mut y1] = coords;
    if y1 < y0 {
        core::mem::swap(&mut x0, &mut x1);
        core::mem::swap(&mut y0, &mut y1);
    }

    let left = clip.x as f32;
    let right = (clip.x + clip.w - 1) as f32;
    let top = clip.y as f32;
    let bottom = (clip.y + clip.h - 1) as f32;

    // Left edge.
    if x0 < x1 && x0 < left {
        if x1 < left {
            return None;
        }
        y0 += (y1 - y0) * (left - x0) / (x1 - x0);
        x0 = left;
    } else if x1 < x0 && x1 < left {
        if x0 < left {
            return None;
        }
        y1 += (y0 - y1) * (left - x1) / (x0 - x1);
        x1 = left;
    }

    // Right edge.
    if x1 > x0 && x1 > right {
        if x0 > right {
            return None;
        }
        y1 = y0 + (y1 - y0) * (right - x0) / (x1 - x0);
        x1 = right;
    } else if x0 > x1 && x0 > right {
        if x1 > right {
            return None;
        }
        y0 = y1 + (y0 - y1) * (right - x1) / (x0 - x1);
        x0 = right;
    }

    // Top edge.
    if y0 < top {
        if y1 < top {
            return None;
        }
        x0 += (x1 - x0) * (top - y0) / (y1 - y0);
        y0 = top;
    }

    // Bottom edge.
    if y1 > bottom {
        if y0 > bottom {
            return None;
        }
        x1 = x0 + (x1 - x0) * (bottom - y0) / (y1 - y0);
        y1 = bottom;
    }

    if x0 < left || x1 < left || x0 > right || x1 > right || y0 < top || y1 > bottom {
        return None;
    }
    Some([x0, y0, x1, y1])
}

/// Draws a solid line. Coordinates are buffer-native.
pub(crate) fn line_unshaded(canvas: &mut Canvas, paint: &Paint, coords: [f32; 4]) {
    if paint.is_skip() {
        return;
    }
    let Some([x0, y0, x1, y1]) = clip_segment(canvas, coords) else {
        return;
    };

    let width = canvas.raw_width();
    let dx = x1 - x0;
    let dy = y1 - y0;

    if y0 as i32 == y1 as i32 {
        // Horizontal: one range write.
        let (sx, ex) = if dx < 0.0 { (x1, x0) } else { (x0, x1) };
        let index = (y0 as i32 * width + sx as i32) as usize;
        paint.write_range(canvas, index, (ex as i32 - sx as i32 + 1) as usize);
        return;
    }
    if x0 as i32 == x1 as i32 {
        // Vertical: step the row index.
        let mut index = (y0 as i32 * width + x0 as i32) as usize;
        for _ in y0 as i32..=y1 as i32 {
            paint.write(canvas, index);
            index += width as usize;
        }
        return;
    }

    let steep = dx.abs() < dy.abs();
    let n_iter = (if steep { dy.abs() } else { dx.abs() }).ceil().max(1.0) as i32;
    let idx = Fixed::from(dx / n_iter as f32);
    let idy = Fixed::from(dy / n_iter as f32);

    let mut x = Fixed::from(x0);
    let mut y = Fixed::from(y0);
    for _ in 0..=n_iter {
        let index = (y.to_i32() * width + x.to_i32()) as usize;
        paint.write(canvas, index);
        x += idx;
        y += idy;
    }
}

/// Draws a line through a shader, interpolating UVs along its length.
pub(crate) fn line_shaded(
    canvas: &mut Canvas,
    ctx: &ShaderCtx<'_>,
    tint: Color,
    coords: [f32; 4],
    uvs: [f32; 4],
) {
    if ctx.skip {
        return;
    }
    let original = coords;
    let Some([x0, y0, x1, y1]) = clip_segment(canvas, coords) else {
        return;
    };

    // Re-derive the UV window from how much of the segment survived.
    let [u0, v0, u1, v1] = uvs;
    let seg_len = ((original[2] - original[0]).powi(2) + (original[3] - original[1]).powi(2)).sqrt();
    let (u0, v0, u1, v1) = if seg_len > f32::EPSILON {
        let t0 = (((x0 - original[0]).powi(2) + (y0 - original[1]).powi(2)).sqrt() / seg_len).clamp(0.0, 1.0);
        let t1 = (((x1 - original[0]).powi(2) + (y1 - original[1]).powi(2)).sqrt() / seg_len).clamp(0.0, 1.0);
        (
            u0 + (u1 - u0) * t0,
            v0 + (v1 - v0) * t0,
            u0 + (u1 - u0) * t1,
            v0 + (v1 - v0) * t1,
        )
    } else {
        (u0, v0, u1, v1)
    };

    let width = canvas.raw_width();
    let dx = x1 - x0;
    let dy = y1 - y0;
    let steep = dx.abs() < dy.abs();
    let n_iter = (if steep { dy.abs() } else { dx.abs() }).ceil().max(1.0) as i32;

    let idx = Fixed::from(dx / n_iter as f32);
    let idy = Fixed::from(dy / n_iter as f32);
    let idu = Fixed::from((u1 - u0) / n_iter as f32);
    let idv = Fixed::from((v1 - v0) / n_iter as f32);

    let mut x = Fixed::from(x0);
    let mut y = Fixed::from(y0);
    let mut u = Fixed::from(u0);
    let mut v = Fixed::from(v0);
    for _ in 0..=n_iter {
        let px = x.to_i32();
        let py = y.to_i32();
        let index = (py * width + px) as usize;
        ctx.shade_index(canvas, tint, px, py, u.to_f32(), v.to_f32(), index);
        x += idx;
        y += idy;
        u += idu;
        v += idv;
    }
}
