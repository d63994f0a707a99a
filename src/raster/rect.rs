//! Axis-aligned rectangle rasterization.
//!
//! The unshaded kernel fills whole scanline ranges through the buffer's range
//! setter. The shaded kernel supports three UV modes: the full quad
//! interpolation, the axis-aligned fast path (one UV lerp per scanline), and
//! no UVs at all.

use crate::canvas::Canvas;
use crate::color::Color;
use crate::fixed::Fixed;
use crate::geom::Quadf;
use crate::raster::{shade_pixel, Paint, Scanlines, UvPoint};
use crate::shader::{ShaderCtx, UvMode};

/// Fills an axis-aligned rectangle with a solid paint. Coordinates are
/// buffer-native and may have negative size.
pub(crate) fn rect_unshaded(
    canvas: &mut Canvas,
    paint: &Paint,
    sl: Scanlines,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
) {
    if paint.is_skip() {
        return;
    }
    let mut x = Fixed::from(x);
    let mut y = Fixed::from(y);
    let mut width = Fixed::from(width);
    let mut height = Fixed::from(height);

    if width < Fixed::ZERO {
        x += width;
        width = -width;
    }
    if height < Fixed::ZERO {
        y += height;
        height = -height;
    }

    let clip = canvas.clip_raw();
    if clip.is_empty() {
        return;
    }
    let clip_x = Fixed::from(clip.x);
    let clip_y = Fixed::from(clip.y);
    let clip_x1 = Fixed::from(clip.x + clip.w);
    let clip_y1 = Fixed::from(clip.y + clip.h);
    if x < clip_x {
        width -= clip_x - x;
        x = clip_x;
    }
    if x + width > clip_x1 {
        width = clip_x1 - x;
    }
    if y < clip_y {
        height -= clip_y - y;
        y = clip_y;
    }
    if y + height > clip_y1 {
        height = clip_y1 - y;
    }
    if width <= Fixed::ZERO || height <= Fixed::ZERO {
        return;
    }

    let min_x = (x + Fixed::HALF).floor_to_i32();
    let max_x = (x + width - Fixed::HALF).floor_to_i32();
    let min_y = (y + Fixed::HALF).floor_to_i32();
    let max_y = (y + height - Fixed::HALF).floor_to_i32();
    if max_x < min_x {
        return;
    }

    let start_y = sl.align(min_y);
    let step = sl.step();
    let count = (max_x - min_x + 1) as usize;
    let width_px = canvas.raw_width();

    let mut row = start_y;
    while row <= max_y {
        let index = (min_x + row * width_px) as usize;
        paint.write_range(canvas, index, count);
        row += step;
    }
}

/// Shaded rectangle. `uvs` maps to the four corners in winding order; for
/// [`UvMode::AxisAligned`] only the diagonal corners `(x0, y0)`/`(x2, y2)`
/// participate.
pub(crate) fn rect_shaded(
    canvas: &mut Canvas,
    ctx: &ShaderCtx<'_>,
    tint: Color,
    sl: Scanlines,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    uvs: &Quadf,
) {
    if ctx.skip {
        return;
    }
    let mut x = Fixed::from(x);
    let mut y = Fixed::from(y);
    let mut width = Fixed::from(width);
    let mut height = Fixed::from(height);

    let mut uv0 = UvPoint::new(uvs.x0, uvs.y0);
    let mut uv1 = UvPoint::new(uvs.x1, uvs.y1);
    let mut uv2 = UvPoint::new(uvs.x2, uvs.y2);
    let mut uv3 = UvPoint::new(uvs.x3, uvs.y3);

    if width < Fixed::ZERO {
        x += width;
        width = -width;
        core::mem::swap(&mut uv0, &mut uv1);
        core::mem::swap(&mut uv3, &mut uv2);
    }
    if height < Fixed::ZERO {
        y += height;
        height = -height;
        core::mem::swap(&mut uv0, &mut uv3);
        core::mem::swap(&mut uv1, &mut uv2);
    }

    let clip = canvas.clip_raw();
    if clip.is_empty() {
        return;
    }
    let clip_x = Fixed::from(clip.x);
    let clip_y = Fixed::from(clip.y);
    let clip_x1 = Fixed::from(clip.x + clip.w);
    let clip_y1 = Fixed::from(clip.y + clip.h);

    // Clip, scaling the edge UVs by the clipped fraction.
    if x < clip_x {
        let part = (clip_x - x) / width;
        uv0 = uv0.lerp(uv1, part);
        uv3 = uv3.lerp(uv2, part);
        width -= clip_x - x;
        x = clip_x;
    }
    if x + width > clip_x1 {
        let part = (clip_x1 - x) / width;
        uv1 = uv0.lerp(uv1, part);
        uv2 = uv3.lerp(uv2, part);
        width = clip_x1 - x;
    }
    if y < clip_y {
        let part = (clip_y - y) / height;
        uv0 = uv0.lerp(uv3, part);
        uv1 = uv1.lerp(uv2, part);
        height -= clip_y - y;
        y = clip_y;
    }
    if y + height > clip_y1 {
        let part = (clip_y1 - y) / height;
        uv3 = uv0.lerp(uv3, part);
        uv2 = uv1.lerp(uv2, part);
        height = clip_y1 - y;
    }
    if width <= Fixed::ZERO || height <= Fixed::ZERO {
        return;
    }

    let min_x = (x + Fixed::HALF).floor_to_i32();
    let max_x = (x + width - Fixed::HALF).floor_to_i32();
    let min_y = (y + Fixed::HALF).floor_to_i32();
    let max_y = (y + height - Fixed::HALF).floor_to_i32();
    if max_x < min_x || max_y < min_y {
        return;
    }

    match ctx.uv_mode {
        UvMode::PerPixel => rect_shaded_quad_uv(
            canvas,
            ctx,
            tint,
            sl,
            RectSpan {
                x,
                y,
                width,
                height,
                min_x,
                max_x,
                min_y,
                max_y,
            },
            [uv0, uv1, uv2, uv3],
        ),
        UvMode::AxisAligned => rect_shaded_axis_uv(
            canvas,
            ctx,
            tint,
            sl,
            RectSpan {
                x,
                y,
                width,
                height,
                min_x,
                max_x,
                min_y,
                max_y,
            },
            uv0,
            uv2,
        ),
        UvMode::Ignored => {
            let width_px = canvas.raw_width();
            let step = sl.step();
            let mut row = sl.align(min_y);
            while row <= max_y {
                let base = (row * width_px) as usize;
                for col in min_x..=max_x {
                    shade_pixel(canvas, ctx, tint, col, row, Fixed::ZERO, Fixed::ZERO, base + col as usize);
                }
                row += step;
            }
        }
    }
}

/// Clipped fractional rect plus its covered pixel-center bounds.
struct RectSpan {
    x: Fixed,
    y: Fixed,
    width: Fixed,
    height: Fixed,
    min_x: i32,
    max_x: i32,
    min_y: i32,
    max_y: i32,
}

fn rect_shaded_quad_uv(
    canvas: &mut Canvas,
    ctx: &ShaderCtx<'_>,
    tint: Color,
    sl: Scanlines,
    span: RectSpan,
    [uv0, uv1, uv2, uv3]: [UvPoint; 4],
) {
    let RectSpan {
        x,
        y,
        width,
        height,
        min_x,
        max_x,
        min_y,
        max_y,
    } = span;

    // Re-anchor the corner UVs onto the first and last pixel centers.
    let fx0 = (Fixed::from(min_x) + Fixed::HALF - x) / width;
    let fx1 = (Fixed::from(max_x) + Fixed::HALF - x) / width;
    let fy0 = (Fixed::from(min_y) + Fixed::HALF - y) / height;
    let fy1 = (Fixed::from(max_y) + Fixed::HALF - y) / height;

    let top0 = uv0.lerp(uv1, fx0);
    let top1 = uv0.lerp(uv1, fx1);
    let bottom0 = uv3.lerp(uv2, fx0);
    let bottom1 = uv3.lerp(uv2, fx1);

    let a0 = top0.lerp(bottom0, fy0);
    let a1 = top0.lerp(bottom0, fy1);
    let b0 = top1.lerp(bottom1, fy0);
    let b1 = top1.lerp(bottom1, fy1);

    let rows = Fixed::from((max_y - min_y).max(1));
    let dua = (a1.u - a0.u) / rows;
    let dva = (a1.v - a0.v) / rows;
    let dub = (b1.u - b0.u) / rows;
    let dvb = (b1.v - b0.v) / rows;

    let start_y = sl.align(min_y);
    let skipped = Fixed::from(start_y - min_y);
    let mut u_a = a0.u + dua * skipped;
    let mut v_a = a0.v + dva * skipped;
    let mut u_b = b0.u + dub * skipped;
    let mut v_b = b0.v + dvb * skipped;

    let cols = Fixed::from((max_x - min_x).max(1));
    let width_px = canvas.raw_width();
    let step = sl.step();
    let step_fixed = Fixed::from(step);

    let mut row = start_y;
    while row <= max_y {
        let du = (u_b - u_a) / cols;
        let dv = (v_b - v_a) / cols;
        let mut u = u_a;
        let mut v = v_a;
        let base = (row * width_px) as usize;
        for col in min_x..=max_x {
            shade_pixel(canvas, ctx, tint, col, row, u, v, base + col as usize);
            u += du;
            v += dv;
        }
        u_a += dua * step_fixed;
        v_a += dva * step_fixed;
        u_b += dub * step_fixed;
        v_b += dvb * step_fixed;
        row += step;
    }
}

fn rect_shaded_axis_uv(
    canvas: &mut Canvas,
    ctx: &ShaderCtx<'_>,
    tint: Color,
    sl: Scanlines,
    span: RectSpan,
    uv0: UvPoint,
    uv1: UvPoint,
) {
    let RectSpan {
        x,
        y,
        width,
        height,
        min_x,
        max_x,
        min_y,
        max_y,
    } = span;

    // u follows x only, v follows y only.
    let fx0 = (Fixed::from(min_x) + Fixed::HALF - x) / width;
    let fx1 = (Fixed::from(max_x) + Fixed::HALF - x) / width;
    let fy0 = (Fixed::from(min_y) + Fixed::HALF - y) / height;
    let fy1 = (Fixed::from(max_y) + Fixed::HALF - y) / height;

    let u_start = uv0.u + (uv1.u - uv0.u) * fx0;
    let u_end = uv0.u + (uv1.u - uv0.u) * fx1;
    let v_start = uv0.v + (uv1.v - uv0.v) * fy0;
    let v_end = uv0.v + (uv1.v - uv0.v) * fy1;

    let du = (u_end - u_start) / Fixed::from((max_x - min_x).max(1));
    let dv = (v_end - v_start) / Fixed::from((max_y - min_y).max(1));

    let start_y = sl.align(min_y);
    let mut v = v_start + dv * Fixed::from(start_y - min_y);

    let width_px = canvas.raw_width();
    let step = sl.step();
    let step_fixed = Fixed::from(step);

    let mut row = start_y;
    while row <= max_y {
        let mut u = u_start;
        let base = (row * width_px) as usize;
        for col in min_x..=max_x {
            shade_pixel(canvas, ctx, tint, col, row, u, v, base + col as usize);
            u += du;
        }
        v += dv * step_fixed;
        row += step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::PixelFormat;
    use crate::geom::UNIT_QUAD_UVS;
    use crate::shader::{Promises, Shader, TintPromises};

    #[test]
    fn fills_clipped_bounds() {
        let mut canvas = Canvas::new(10, 10, PixelFormat::Argb8888).unwrap();
        canvas.set_clip(2, 2, 4, 4);
        let paint = Paint::select(&canvas, Color::WHITE);
        rect_unshaded(&mut canvas, &paint, Scanlines::All, 0.0, 0.0, 10.0, 10.0);
        for y in 0..10 {
            for x in 0..10 {
                let inside = (2..6).contains(&x) && (2..6).contains(&y);
                assert_eq!(
                    canvas.get_pixel(x, y) == Some(Color::WHITE),
                    inside,
                    "({x},{y})"
                );
            }
        }
    }

    #[test]
    fn negative_sizes_normalize() {
        let mut canvas = Canvas::new(6, 6, PixelFormat::Argb8888).unwrap();
        let paint = Paint::select(&canvas, Color::WHITE);
        rect_unshaded(&mut canvas, &paint, Scanlines::All, 4.0, 4.0, -2.0, -2.0);
        assert_eq!(canvas.get_pixel(2, 2), Some(Color::WHITE));
        assert_eq!(canvas.get_pixel(3, 3), Some(Color::WHITE));
        assert_eq!(canvas.get_pixel(4, 4), Some(Color::TRANSPARENT));
    }

    #[test]
    fn zero_size_is_a_noop() {
        let mut canvas = Canvas::new(6, 6, PixelFormat::Argb8888).unwrap();
        let paint = Paint::select(&canvas, Color::WHITE);
        rect_unshaded(&mut canvas, &paint, Scanlines::All, 2.0, 2.0, 0.0, 3.0);
        rect_unshaded(&mut canvas, &paint, Scanlines::All, 2.0, 2.0, 3.0, 0.0);
        assert!(canvas.bytes().iter().all(|&b| b == 0));
    }

    struct UvProbe;
    impl Shader for UvProbe {
        fn pixel(&self, _t: Color, _e: Color, _x: i32, _y: i32, u: f32, v: f32) -> Color {
            Color::rgb((u * 255.0).clamp(0.0, 255.0) as u8, (v * 255.0).clamp(0.0, 255.0) as u8, 0)
        }
        fn promises(&self, _tint: Color) -> Promises {
            Promises::IGNORE_BASE | Promises::OPAQUE
        }
        fn alpha_promises(&self) -> TintPromises {
            TintPromises::both()
        }
    }

    #[test]
    fn quad_uvs_interpolate_across_the_rect() {
        let mut canvas = Canvas::new(16, 16, PixelFormat::Argb8888).unwrap();
        let ctx = ShaderCtx::new(&UvProbe, Color::WHITE, false);
        rect_shaded(
            &mut canvas,
            &ctx,
            Color::WHITE,
            Scanlines::All,
            0.0,
            0.0,
            16.0,
            16.0,
            &UNIT_QUAD_UVS,
        );
        let tl = canvas.get_pixel(0, 0).unwrap();
        let tr = canvas.get_pixel(15, 0).unwrap();
        let bl = canvas.get_pixel(0, 15).unwrap();
        assert!(tl.r() < 16 && tl.g() < 16);
        assert!(tr.r() > 240 && tr.g() < 16);
        assert!(bl.r() < 16 && bl.g() > 240);
    }

    #[test]
    fn clipping_scales_uvs() {
        let mut canvas = Canvas::new(8, 8, PixelFormat::Argb8888).unwrap();
        canvas.set_clip(4, 0, 4, 8);
        let ctx = ShaderCtx::new(&UvProbe, Color::WHITE, false);
        rect_shaded(
            &mut canvas,
            &ctx,
            Color::WHITE,
            Scanlines::All,
            0.0,
            0.0,
            8.0,
            8.0,
            &UNIT_QUAD_UVS,
        );
        // Pixel x=4 sits at u = 4.5/8, not at u = 0.
        let c = canvas.get_pixel(4, 0).unwrap();
        assert!(c.r() > 120, "r = {}", c.r());
    }

    #[test]
    fn axis_aligned_matches_quad_interpolation() {
        struct AxisProbe;
        impl Shader for AxisProbe {
            fn pixel(&self, _t: Color, _e: Color, _x: i32, _y: i32, u: f32, v: f32) -> Color {
                Color::rgb((u * 255.0).clamp(0.0, 255.0) as u8, (v * 255.0).clamp(0.0, 255.0) as u8, 0)
            }
            fn promises(&self, _tint: Color) -> Promises {
                Promises::IGNORE_BASE | Promises::OPAQUE
            }
            fn alpha_promises(&self) -> TintPromises {
                TintPromises::both()
            }
        }

        let ctx_quad = ShaderCtx::new(&UvProbe, Color::WHITE, false);
        let mut quad = Canvas::new(8, 8, PixelFormat::Argb8888).unwrap();
        rect_shaded(
            &mut quad,
            &ctx_quad,
            Color::WHITE,
            Scanlines::All,
            0.0,
            0.0,
            8.0,
            8.0,
            &UNIT_QUAD_UVS,
        );

        let mut ctx_axis = ShaderCtx::new(&AxisProbe, Color::WHITE, false);
        ctx_axis.uv_mode = UvMode::AxisAligned;
        let mut axis = Canvas::new(8, 8, PixelFormat::Argb8888).unwrap();
        rect_shaded(
            &mut axis,
            &ctx_axis,
            Color::WHITE,
            Scanlines::All,
            0.0,
            0.0,
            8.0,
            8.0,
            &UNIT_QUAD_UVS,
        );

        assert_eq!(quad.bytes(), axis.bytes());
    }
}
