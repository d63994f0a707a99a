//! Programmable per-pixel shading.
//!
//! A [`Shader`] is consulted for every pixel of a shaded draw. Its promises
//! let the rasterizer elide work: a shader that never reads the existing
//! pixel skips the readback, one that ignores UVs skips the interpolation,
//! and one that promises invisibility skips the draw outright.

use bitflags::bitflags;

use crate::canvas::Canvas;
use crate::color::Color;

bitflags! {
    /// Contextual promises a shader makes for one draw call.
    ///
    /// False is always the safe answer; promising something the shader does
    /// not honor produces wrong pixels, never unsafety.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Promises: u32 {
        /// Output alpha is always 255.
        const OPAQUE = 0x01;
        /// Output alpha is always 0; the draw is a no-op.
        const INVISIBLE = 0x02;
        /// Output alpha is always 0 or 255.
        const CUTOUT = 0x03;
        /// Per-pixel UVs need not be computed.
        const IGNORE_UVS = 0x04;
        /// The existing pixel value need not be read.
        const IGNORE_BASE = 0x08;
    }
}

/// Static promises about a shader's output alpha as a function of the tint's
/// alpha, used to pick the fastest pixel writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TintPromises {
    /// Tint alpha 0 always yields a fully transparent output.
    pub transparent_on_zero: bool,
    /// Tint alpha 255 always yields a fully opaque output.
    pub opaque_on_full: bool,
}

impl TintPromises {
    pub const fn both() -> TintPromises {
        TintPromises {
            transparent_on_zero: true,
            opaque_on_full: true,
        }
    }
}

/// A per-pixel color callback.
///
/// The shader receives the draw's tint color, the pixel already in the
/// buffer, the pixel position, interpolated UVs, and returns the color to
/// store. Blending against `existing` is the shader's own business; the
/// rasterizer writes the returned color after native conversion.
///
/// # Examples
///
/// ```
/// use trama::{Color, Promises, Shader};
///
/// struct Checker;
///
/// impl Shader for Checker {
///     fn pixel(&self, tint: Color, existing: Color, x: i32, y: i32, _u: f32, _v: f32) -> Color {
///         if (x + y) % 2 == 0 { tint } else { existing }
///     }
///
///     fn promises(&self, _tint: Color) -> Promises {
///         Promises::IGNORE_UVS
///     }
/// }
/// ```
pub trait Shader {
    /// Computes the color for one pixel.
    fn pixel(&self, tint: Color, existing: Color, x: i32, y: i32, u: f32, v: f32) -> Color;

    /// Per-draw promises, re-evaluated once per draw call.
    fn promises(&self, tint: Color) -> Promises {
        let _ = tint;
        Promises::empty()
    }

    /// Static promises tying output alpha to tint alpha.
    fn alpha_promises(&self) -> TintPromises {
        TintPromises::default()
    }
}

/// Adapter for shaders written against the base-blind callback shape
/// `(tint, x, y, u, v) -> color`: the returned color is composited over the
/// existing pixel with [`Color::merge`].
pub struct BaseShader<F> {
    callback: F,
}

impl<F> BaseShader<F>
where
    F: Fn(Color, i32, i32, f32, f32) -> Color,
{
    pub fn new(callback: F) -> Self {
        BaseShader { callback }
    }
}

impl<F> Shader for BaseShader<F>
where
    F: Fn(Color, i32, i32, f32, f32) -> Color,
{
    fn pixel(&self, tint: Color, existing: Color, x: i32, y: i32, u: f32, v: f32) -> Color {
        Color::merge(existing, (self.callback)(tint, x, y, u, v))
    }
}

/// How the rasterizer writes one shaded pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UvMode {
    /// Interpolate UVs per pixel.
    PerPixel,
    /// The shader ignores UVs; pass zeros.
    Ignored,
    /// Rect only: u varies with x, v with y.
    AxisAligned,
}

/// Resolved per-draw shading context.
pub(crate) struct ShaderCtx<'a> {
    pub shader: &'a dyn Shader,
    /// Read the existing pixel before calling the shader.
    pub do_getter: bool,
    /// Skip the draw entirely.
    pub skip: bool,
    pub uv_mode: UvMode,
}

impl<'a> ShaderCtx<'a> {
    /// Evaluates the shader's promises for this draw. `palette_tint` marks
    /// the tint as a palette index, whose bits carry no alpha meaning.
    pub(crate) fn new(shader: &'a dyn Shader, tint: Color, palette_tint: bool) -> ShaderCtx<'a> {
        let promises = shader.promises(tint);
        let alpha = shader.alpha_promises();
        let skip = promises.contains(Promises::INVISIBLE)
            || (!palette_tint && tint.is_transparent() && alpha.transparent_on_zero);
        ShaderCtx {
            shader,
            do_getter: !promises.contains(Promises::IGNORE_BASE),
            skip,
            uv_mode: if promises.contains(Promises::IGNORE_UVS) {
                UvMode::Ignored
            } else {
                UvMode::PerPixel
            },
        }
    }

    /// Samples the shader for a pixel at `index` in the canvas and writes the
    /// result through native conversion.
    #[inline]
    pub(crate) fn shade_index(&self, canvas: &mut Canvas, tint: Color, x: i32, y: i32, u: f32, v: f32, index: usize) {
        let existing = if self.do_getter {
            let raw = (canvas.accessors().get)(canvas, index);
            if canvas.is_palette() {
                Color(raw)
            } else {
                canvas.native_to_color(raw)
            }
        } else {
            Color::TRANSPARENT
        };
        let out = self.shader.pixel(tint, existing, x, y, u, v);
        let native = canvas.color_to_native(out);
        (canvas.accessors().set)(canvas, native, index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::PixelFormat;

    struct Fill;

    impl Shader for Fill {
        fn pixel(&self, tint: Color, _existing: Color, _x: i32, _y: i32, _u: f32, _v: f32) -> Color {
            tint
        }

        fn promises(&self, _tint: Color) -> Promises {
            Promises::IGNORE_BASE | Promises::IGNORE_UVS
        }

        fn alpha_promises(&self) -> TintPromises {
            TintPromises::both()
        }
    }

    #[test]
    fn promises_resolve_into_ctx() {
        let ctx = ShaderCtx::new(&Fill, Color::WHITE, false);
        assert!(!ctx.do_getter);
        assert!(!ctx.skip);
        assert_eq!(ctx.uv_mode, UvMode::Ignored);
    }

    #[test]
    fn transparent_tint_with_promise_skips() {
        let ctx = ShaderCtx::new(&Fill, Color::TRANSPARENT, false);
        assert!(ctx.skip);
    }

    #[test]
    fn invisible_promise_skips() {
        struct Invisible;
        impl Shader for Invisible {
            fn pixel(&self, _t: Color, _e: Color, _x: i32, _y: i32, _u: f32, _v: f32) -> Color {
                Color::TRANSPARENT
            }
            fn promises(&self, _tint: Color) -> Promises {
                Promises::INVISIBLE
            }
        }
        assert!(ShaderCtx::new(&Invisible, Color::WHITE, false).skip);
    }

    #[test]
    fn base_shader_merges_over_existing() {
        let shader = BaseShader::new(|tint: Color, _x, _y, _u, _v| tint.with_alpha(0));
        let out = shader.pixel(Color::WHITE, Color::rgb(1, 2, 3), 0, 0, 0.0, 0.0);
        assert_eq!(out, Color::rgb(1, 2, 3));
    }

    #[test]
    fn shade_index_writes_through_conversion() {
        let mut canvas = Canvas::new(2, 1, PixelFormat::Grey8).unwrap();
        let ctx = ShaderCtx::new(&Fill, Color::WHITE, false);
        ctx.shade_index(&mut canvas, Color::WHITE, 0, 0, 0.0, 0.0, 1);
        assert_eq!(canvas.get_pixel_raw(1, 0), Some(0xff));
        assert_eq!(canvas.get_pixel_raw(0, 0), Some(0));
    }
}
