//! Drawing one buffer into another: texture shaders and the blit fast path.

use crate::canvas::Canvas;
use crate::color::Color;
use crate::geom::Recti;
use crate::orientation::Orientation;
use crate::shader::{Promises, Shader, TintPromises};

/// Shader sampling a source canvas at `(u, v)` in `0..=1`, nearest-neighbour.
///
/// Texels with partial alpha merge over the existing pixel; a non-white tint
/// multiplies the texel first.
pub struct TextureShader<'a> {
    image: &'a Canvas,
    /// Treat every texel as opaque, skipping the merge.
    opaque: bool,
    /// Interpolate 2×2 neighbourhoods instead of nearest sampling.
    filtered: bool,
}

impl<'a> TextureShader<'a> {
    pub fn new(image: &'a Canvas) -> Self {
        TextureShader {
            image,
            opaque: !image.format().has_alpha(),
            filtered: false,
        }
    }

    /// Promises full opacity regardless of the source format.
    pub fn opaque(image: &'a Canvas) -> Self {
        TextureShader {
            image,
            opaque: true,
            filtered: false,
        }
    }

    /// Enables bilinear filtering.
    pub fn filtered(mut self) -> Self {
        self.filtered = true;
        self
    }

    fn texel(&self, x: i32, y: i32) -> Color {
        let x = x.clamp(0, self.image.width() - 1);
        let y = y.clamp(0, self.image.height() - 1);
        self.image.get_pixel(x, y).unwrap_or(Color::TRANSPARENT)
    }

    fn sample_filtered(&self, u: f32, v: f32) -> Color {
        let u = u * self.image.width() as f32 - 0.5;
        let v = v * self.image.height() as f32 - 0.5;
        let x = u.floor() as i32;
        let y = v.floor() as i32;
        let cx = ((u - x as f32) * 256.0) as u32;
        let cy = ((v - y as f32) * 256.0) as u32;

        let c0 = self.texel(x, y);
        let c1 = self.texel(x + 1, y);
        let c2 = self.texel(x + 1, y + 1);
        let c3 = self.texel(x, y + 1);

        let w0 = (256 - cx) * (256 - cy);
        let w1 = cx * (256 - cy);
        let w2 = cx * cy;
        let w3 = (256 - cx) * cy;
        let mix = |f: fn(Color) -> u8| -> u8 {
            ((f(c0) as u32 * w0 + f(c1) as u32 * w1 + f(c2) as u32 * w2 + f(c3) as u32 * w3) >> 16)
                as u8
        };
        Color::argb(mix(Color::a), mix(Color::r), mix(Color::g), mix(Color::b))
    }
}

impl Shader for TextureShader<'_> {
    fn pixel(&self, tint: Color, existing: Color, _x: i32, _y: i32, u: f32, v: f32) -> Color {
        let mut color = if self.filtered {
            self.sample_filtered(u, v)
        } else {
            self.texel(
                (u * self.image.width() as f32) as i32,
                (v * self.image.height() as f32) as i32,
            )
        };
        if self.opaque {
            color = color.with_alpha(255);
        }
        if tint != Color::WHITE {
            color = Color::tint(color, tint);
        }
        if color.is_opaque() {
            color
        } else {
            Color::merge(existing, color)
        }
    }

    fn promises(&self, _tint: Color) -> Promises {
        if self.opaque {
            Promises::OPAQUE | Promises::IGNORE_BASE
        } else {
            Promises::empty()
        }
    }

    fn alpha_promises(&self) -> TintPromises {
        TintPromises {
            transparent_on_zero: true,
            opaque_on_full: self.opaque,
        }
    }
}

impl Canvas {
    /// Draws `image` at its natural size under the current transform.
    pub fn draw_image(&mut self, image: &Canvas, x: f32, y: f32) {
        self.draw_image_sized(image, x, y, image.width() as f32, image.height() as f32);
    }

    /// Draws `image` stretched to `width`×`height` under the current
    /// transform.
    pub fn draw_image_sized(&mut self, image: &Canvas, x: f32, y: f32, width: f32, height: f32) {
        let (tx, ty) = (self.matrix().a2 + x, self.matrix().b2 + y);
        if self.matrix().is_identity_offset()
            && self.orientation() == Orientation::Upright
            && width as i32 == image.width()
            && height as i32 == image.height()
            && tx.fract() == 0.0
            && ty.fract() == 0.0
            && !image.format().has_alpha()
            && self.blit(image, tx as i32, ty as i32)
        {
            return;
        }
        let shader = TextureShader::new(image);
        self.shade_rect(Color::WHITE, &shader, None, x, y, width, height);
    }

    /// Draws `image` assuming it is fully opaque, which skips per-pixel
    /// blending even for formats with an alpha channel.
    pub fn draw_image_opaque(&mut self, image: &Canvas, x: f32, y: f32) {
        let shader = TextureShader::opaque(image);
        self.shade_rect(
            Color::WHITE,
            &shader,
            None,
            x,
            y,
            image.width() as f32,
            image.height() as f32,
        );
    }

    /// Copies `src` onto this buffer at `(x, y)` with whole-row `memcpy`s.
    ///
    /// Requires identical pixel formats, upright orientations, matching
    /// endianness, and byte-aligned rows in both buffers; returns false when
    /// any of that fails so the caller can fall back to the shaded path.
    pub fn blit(&mut self, src: &Canvas, x: i32, y: i32) -> bool {
        let aligned = |c: &Canvas| c.raw_width() as usize * c.format().bpp() as usize % 8 == 0;
        if self.format() != src.format()
            || self.orientation() != Orientation::Upright
            || src.orientation() != Orientation::Upright
            || self.reverse_endianness() != src.reverse_endianness()
            || !aligned(self)
            || !aligned(src)
        {
            return false;
        }

        let dest_rect = Recti::new(x, y, src.raw_width(), src.raw_height()).intersect(self.clip_raw());
        if dest_rect.is_empty() {
            return true;
        }

        let bpp = self.format().bpp() as usize;
        let dst_stride = self.raw_width() as usize * bpp / 8;
        let src_stride = src.raw_width() as usize * bpp / 8;
        // Sub-byte formats additionally need the x offsets byte-aligned.
        let x_bits = (dest_rect.x as usize * bpp, (dest_rect.x - x) as usize * bpp);
        if x_bits.0 % 8 != 0 || x_bits.1 % 8 != 0 || dest_rect.w as usize * bpp % 8 != 0 {
            return false;
        }

        let row_bytes = dest_rect.w as usize * bpp / 8;
        for row in 0..dest_rect.h as usize {
            let dst_off = (dest_rect.y as usize + row) * dst_stride + x_bits.0 / 8;
            let src_off = ((dest_rect.y - y) as usize + row) * src_stride + x_bits.1 / 8;
            let src_row = &src.bytes()[src_off..src_off + row_bytes];
            self.bytes_mut()[dst_off..dst_off + row_bytes].copy_from_slice(src_row);
        }
        self.mark_dirty_rect(dest_rect.x, dest_rect.y, dest_rect.w, dest_rect.h);
        true
    }
}
