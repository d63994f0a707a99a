//! Triangle rasterization.
//!
//! A triangle is sorted by y and split at the middle vertex into two
//! y-monotone trapezoids, each rasterized as a scanline loop with fixed-point
//! edge accumulators.

use crate::canvas::Canvas;
use crate::color::Color;
use crate::fixed::Fixed;
use crate::raster::{shade_pixel, Paint, Scanlines, UvPoint};
use crate::shader::{ShaderCtx, UvMode};

/// Fills a trapezoid spanning `y0..y1` with edges `x0a→x1a` and `x0b→x1b`.
#[allow(clippy::too_many_arguments)]
fn trapezoid_unshaded(
    canvas: &mut Canvas,
    paint: &Paint,
    sl: Scanlines,
    mut x0a: Fixed,
    mut x0b: Fixed,
    y0: Fixed,
    mut x1a: Fixed,
    mut x1b: Fixed,
    y1: Fixed,
) {
    let mut iy0 = (y0 + Fixed::HALF).floor_to_i32();
    let mut iy1 = (y1 + Fixed::HALF).floor_to_i32();
    if iy0 >= iy1 {
        return;
    }

    if x0a > x0b || x1a > x1b {
        core::mem::swap(&mut x0a, &mut x0b);
        core::mem::swap(&mut x1a, &mut x1b);
    }

    let clip = canvas.clip_raw();
    if clip.is_empty() {
        return;
    }
    if iy0 < clip.y {
        iy0 = clip.y;
    }
    if iy0 >= clip.y + clip.h || iy1 < clip.y {
        return;
    }
    if iy1 > clip.y + clip.h {
        iy1 = clip.y + clip.h;
    }

    iy0 = sl.align(iy0);
    let step = sl.step();

    let dy = y1 - y0;
    let dxa = (x1a - x0a) / dy;
    let dxb = (x1b - x0b) / dy;

    // Interpolate to the first covered pixel center.
    let coeff = Fixed::from(iy0) + Fixed::HALF - y0;
    let mut x_a = x0a + dxa * coeff;
    let mut x_b = x0b + dxb * coeff;

    let width = canvas.raw_width();
    let step_fixed = Fixed::from(step);
    let mut y = iy0;
    while y < iy1 {
        let mut ixa = (x_a + Fixed::HALF).floor_to_i32();
        let mut ixb = (x_b + Fixed::HALF).floor_to_i32();
        ixa = ixa.clamp(clip.x, clip.x + clip.w);
        ixb = ixb.clamp(clip.x, clip.x + clip.w);

        let row = (y * width) as usize;
        if ixb > ixa {
            paint.write_range(canvas, row + ixa as usize, (ixb - ixa) as usize);
        }

        x_a += dxa * step_fixed;
        x_b += dxb * step_fixed;
        y += step;
    }
}

/// Shaded trapezoid: both edges carry UVs interpolated per scanline, and the
/// span interpolates UVs per pixel.
#[allow(clippy::too_many_arguments)]
fn trapezoid_shaded(
    canvas: &mut Canvas,
    ctx: &ShaderCtx<'_>,
    tint: Color,
    sl: Scanlines,
    mut x0a: Fixed,
    mut x0b: Fixed,
    y0: Fixed,
    mut x1a: Fixed,
    mut x1b: Fixed,
    y1: Fixed,
    mut uv0a: UvPoint,
    mut uv0b: UvPoint,
    mut uv1a: UvPoint,
    mut uv1b: UvPoint,
) {
    let mut iy0 = (y0 + Fixed::HALF).floor_to_i32();
    let mut iy1 = (y1 + Fixed::HALF).floor_to_i32();
    if iy0 >= iy1 {
        return;
    }

    if x0a > x0b || x1a > x1b {
        core::mem::swap(&mut x0a, &mut x0b);
        core::mem::swap(&mut x1a, &mut x1b);
        core::mem::swap(&mut uv0a, &mut uv0b);
        core::mem::swap(&mut uv1a, &mut uv1b);
    }

    let clip = canvas.clip_raw();
    if clip.is_empty() {
        return;
    }
    if iy0 < clip.y {
        iy0 = clip.y;
    }
    if iy0 >= clip.y + clip.h || iy1 < clip.y {
        return;
    }
    if iy1 > clip.y + clip.h {
        iy1 = clip.y + clip.h;
    }

    iy0 = sl.align(iy0);
    let step = sl.step();

    let dy = y1 - y0;
    let dxa = (x1a - x0a) / dy;
    let dxb = (x1b - x0b) / dy;
    let dua = (uv1a.u - uv0a.u) / dy;
    let dub = (uv1b.u - uv0b.u) / dy;
    let dva = (uv1a.v - uv0a.v) / dy;
    let dvb = (uv1b.v - uv0b.v) / dy;

    let coeff = Fixed::from(iy0) + Fixed::HALF - y0;
    let mut x_a = x0a + dxa * coeff;
    let mut x_b = x0b + dxb * coeff;
    let mut u_a = uv0a.u + dua * coeff;
    let mut u_b = uv0b.u + dub * coeff;
    let mut v_a = uv0a.v + dva * coeff;
    let mut v_b = uv0b.v + dvb * coeff;

    let per_pixel_uv = ctx.uv_mode == UvMode::PerPixel;
    let width = canvas.raw_width();
    let step_fixed = Fixed::from(step);
    let mut y = iy0;
    while y < iy1 {
        let mut ixa = (x_a + Fixed::HALF).floor_to_i32();
        let mut ixb = (x_b + Fixed::HALF).floor_to_i32();
        ixa = ixa.clamp(clip.x, clip.x + clip.w);
        ixb = ixb.clamp(clip.x, clip.x + clip.w);

        let row = (y * width) as usize;
        if per_pixel_uv {
            let span = x_b - x_a;
            let du = (u_b - u_a) / span;
            let dv = (v_b - v_a) / span;
            let coeff = Fixed::from(ixa) + Fixed::HALF - x_a;
            let mut u = u_a + du * coeff;
            let mut v = v_a + dv * coeff;
            for x in ixa..ixb {
                shade_pixel(canvas, ctx, tint, x, y, u, v, row + x as usize);
                u += du;
                v += dv;
            }
        } else {
            for x in ixa..ixb {
                shade_pixel(canvas, ctx, tint, x, y, Fixed::ZERO, Fixed::ZERO, row + x as usize);
            }
        }

        u_a += dua * step_fixed;
        u_b += dub * step_fixed;
        v_a += dva * step_fixed;
        v_b += dvb * step_fixed;
        x_a += dxa * step_fixed;
        x_b += dxb * step_fixed;
        y += step;
    }
}

/// Fills a triangle with a solid paint. Coordinates are buffer-native.
pub(crate) fn tri_unshaded(
    canvas: &mut Canvas,
    paint: &Paint,
    sl: Scanlines,
    coords: [f32; 6],
) {
    if paint.is_skip() {
        return;
    }
    let [mut x0, mut y0, mut x1, mut y1, mut x2, mut y2] = coords.map(Fixed::from);

    // Sort vertices by y.
    if y1 < y0 {
        core::mem::swap(&mut x0, &mut x1);
        core::mem::swap(&mut y0, &mut y1);
    }
    if y2 < y0 {
        core::mem::swap(&mut x0, &mut x2);
        core::mem::swap(&mut y0, &mut y2);
    }
    if y2 < y1 {
        core::mem::swap(&mut x1, &mut x2);
        core::mem::swap(&mut y1, &mut y2);
    }

    // Split the long edge at the middle vertex's height.
    let coeff = (y1 - y0) / (y2 - y0);
    let x1b = x0 + (x2 - x0) * coeff;

    trapezoid_unshaded(canvas, paint, sl, x0, x0, y0, x1, x1b, y1);
    trapezoid_unshaded(canvas, paint, sl, x1, x1b, y1, x2, x2, y2);
}

/// Fills a triangle through a shader. Coordinates are buffer-native; UVs map
/// one per vertex.
pub(crate) fn tri_shaded(
    canvas: &mut Canvas,
    ctx: &ShaderCtx<'_>,
    tint: Color,
    sl: Scanlines,
    coords: [f32; 6],
    uvs: [f32; 6],
) {
    if ctx.skip {
        return;
    }
    let [mut x0, mut y0, mut x1, mut y1, mut x2, mut y2] = coords.map(Fixed::from);
    let mut uv0 = UvPoint::new(uvs[0], uvs[1]);
    let mut uv1 = UvPoint::new(uvs[2], uvs[3]);
    let mut uv2 = UvPoint::new(uvs[4], uvs[5]);

    if y1 < y0 {
        core::mem::swap(&mut x0, &mut x1);
        core::mem::swap(&mut y0, &mut y1);
        core::mem::swap(&mut uv0, &mut uv1);
    }
    if y2 < y0 {
        core::mem::swap(&mut x0, &mut x2);
        core::mem::swap(&mut y0, &mut y2);
        core::mem::swap(&mut uv0, &mut uv2);
    }
    if y2 < y1 {
        core::mem::swap(&mut x1, &mut x2);
        core::mem::swap(&mut y1, &mut y2);
        core::mem::swap(&mut uv1, &mut uv2);
    }

    let coeff = (y1 - y0) / (y2 - y0);
    let x1b = x0 + (x2 - x0) * coeff;
    let uv1b = uv0.lerp(uv2, coeff);

    trapezoid_shaded(
        canvas, ctx, tint, sl, x0, x0, y0, x1, x1b, y1, uv0, uv0, uv1, uv1b,
    );
    trapezoid_shaded(
        canvas, ctx, tint, sl, x1, x1b, y1, x2, x2, y2, uv1, uv1b, uv2, uv2,
    );
}
