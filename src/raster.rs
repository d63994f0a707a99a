//! Scanline rasterization kernels.
//!
//! Every filled shape funnels into the rect or triangle kernel; both come in
//! unshaded and shaded variants and accept a scanline selector so the
//! multicore path can draw alternating rows. Geometry enters as floats and is
//! converted to the fixed-point scalar at the kernel boundary; all scanline
//! interpolation runs in [`Fixed`].

use crate::canvas::access::{merge_index, merge_range};
use crate::canvas::Canvas;
use crate::color::Color;
use crate::fixed::Fixed;
use crate::shader::{ShaderCtx, UvMode};

mod line;
mod rect;
mod tri;

pub(crate) use line::{line_shaded, line_unshaded};
pub(crate) use rect::{rect_shaded, rect_unshaded};
pub(crate) use tri::{tri_shaded, tri_unshaded};

/// Which scanlines a kernel invocation covers.
///
/// `Even`/`Odd` step two rows at a time; the multicore scheduler hands the
/// foreground one parity and the worker the other, so their writes are
/// disjoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scanlines {
    All,
    Even,
    Odd,
}

impl Scanlines {
    #[inline]
    pub(crate) fn step(self) -> i32 {
        match self {
            Scanlines::All => 1,
            _ => 2,
        }
    }

    /// First row at or after `y` with this parity.
    #[inline]
    pub(crate) fn align(self, y: i32) -> i32 {
        match self {
            Scanlines::All => y,
            Scanlines::Even => y + (y & 1),
            Scanlines::Odd => y + ((y & 1) ^ 1),
        }
    }
}

/// The cheapest correct way to put an unshaded color into pixels, chosen once
/// per draw.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Paint {
    /// Nothing to do: transparent color or undrawable palette index.
    Skip,
    /// Store a pre-converted native word.
    Raw(u32),
    /// Alpha-blend the canonical color per pixel.
    Blend(Color),
}

impl Paint {
    pub(crate) fn select(canvas: &Canvas, color: Color) -> Paint {
        if canvas.is_palette() {
            if canvas.drawable_color(color) {
                Paint::Raw(color.0)
            } else {
                Paint::Skip
            }
        } else if color.is_transparent() {
            Paint::Skip
        } else if color.is_opaque() {
            Paint::Raw(canvas.color_to_native(color))
        } else {
            Paint::Blend(color)
        }
    }

    #[inline]
    pub(crate) fn is_skip(&self) -> bool {
        matches!(self, Paint::Skip)
    }

    #[inline]
    pub(crate) fn write(&self, canvas: &mut Canvas, index: usize) {
        match *self {
            Paint::Skip => {}
            Paint::Raw(native) => (canvas.accessors().set)(canvas, native, index),
            Paint::Blend(color) => merge_index(canvas, color, index),
        }
    }

    #[inline]
    pub(crate) fn write_range(&self, canvas: &mut Canvas, index: usize, count: usize) {
        match *self {
            Paint::Skip => {}
            Paint::Raw(native) => (canvas.accessors().set_range)(canvas, native, index, count),
            Paint::Blend(color) => merge_range(canvas, color, index, count),
        }
    }
}

/// UV coordinates carried alongside shaded shapes; interpolated in fixed
/// point together with the x accumulators.
#[derive(Debug, Clone, Copy)]
pub(crate) struct UvPoint {
    pub u: Fixed,
    pub v: Fixed,
}

impl UvPoint {
    #[inline]
    pub(crate) fn new(u: f32, v: f32) -> UvPoint {
        UvPoint {
            u: Fixed::from(u),
            v: Fixed::from(v),
        }
    }

    #[inline]
    pub(crate) fn lerp(self, other: UvPoint, t: Fixed) -> UvPoint {
        UvPoint {
            u: self.u + (other.u - self.u) * t,
            v: self.v + (other.v - self.v) * t,
        }
    }
}

/// Per-pixel shading write shared by the shaded kernels.
#[inline]
pub(crate) fn shade_pixel(
    canvas: &mut Canvas,
    ctx: &ShaderCtx<'_>,
    tint: Color,
    x: i32,
    y: i32,
    u: Fixed,
    v: Fixed,
    index: usize,
) {
    match ctx.uv_mode {
        UvMode::Ignored => ctx.shade_index(canvas, tint, x, y, 0.0, 0.0, index),
        _ => ctx.shade_index(canvas, tint, x, y, u.to_f32(), v.to_f32(), index),
    }
}
