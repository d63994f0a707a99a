//! Bitmap text rendering: UTF-8 handling, glyph shaders and layout.
//!
//! Strings render glyph by glyph as shaded rectangles; the glyph shader
//! samples the font bitmap, either with a hard threshold or with 2×2 bilinear
//! filtering for scaled text. Layout supports alignment on both axes,
//! newlines and an optional cursor query used by the textbox widget.

use crate::canvas::Canvas;
use crate::color::{lerp_u8, Color};
use crate::geom::{Quadf, Vec2f};
use crate::shader::{Promises, Shader, TintPromises};

pub mod utf8;

mod font;

pub use font::{Font, GlyphMetrics, GlyphRange, RangeKind};

use font::Glyph;

#[cfg(test)]
pub(crate) fn test_font_for_gui() -> Font {
    font::test_font::font()
}

/// Alignment of text along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Left / top.
    #[default]
    Begin,
    Center,
    /// Right / bottom.
    End,
}

impl TextAlign {
    #[inline]
    fn offset(self, extent: f32) -> f32 {
        match self {
            TextAlign::Begin => 0.0,
            TextAlign::Center => -extent * 0.5,
            TextAlign::End => -extent,
        }
    }
}

/// How the glyph shader turns bitmap samples into coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GlyphSampling {
    /// One sample, drawn fully when at least half-covered. Used on palette
    /// buffers where blending has no meaning.
    Threshold,
    /// One sample scaled into the tint's alpha.
    Plain,
    /// 2×2 bilinear filter of neighbouring samples.
    Bilinear,
}

/// Shader sampling one glyph's bitmap. UVs are glyph-local pixel
/// coordinates.
struct GlyphShader<'a> {
    glyph: Glyph<'a>,
    sampling: GlyphSampling,
}

impl GlyphShader<'_> {
    /// Reads the raw coverage at a glyph pixel, scaled to 0–255. Coordinates
    /// clamp to the glyph bounds.
    fn sample(&self, x: i32, y: i32) -> u8 {
        let g = &self.glyph;
        let x = x.clamp(0, g.w as i32 - 1) as u32;
        let y = y.clamp(0, g.h as i32 - 1) as u32;
        let bit = x * g.bpp as u32;
        let byte = g.bitmap[(g.row_stride * y + bit / 8) as usize];
        let mask = (1u16 << g.bpp) - 1;
        let value = (byte >> (bit % 8)) as u16 & mask;
        (value * 255 / mask) as u8
    }

    /// Coverage with out-of-bounds samples transparent, for the filtered
    /// path's edge pixels.
    fn sample_or_zero(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= self.glyph.w as i32 || y >= self.glyph.h as i32 {
            0
        } else {
            self.sample(x, y)
        }
    }
}

impl Shader for GlyphShader<'_> {
    fn pixel(&self, tint: Color, existing: Color, _x: i32, _y: i32, u: f32, v: f32) -> Color {
        match self.sampling {
            GlyphSampling::Threshold => {
                if self.sample(u as i32, v as i32) >= 128 {
                    tint
                } else {
                    existing
                }
            }
            GlyphSampling::Plain => {
                let coverage = self.sample(u as i32, v as i32);
                let top = tint.with_alpha(lerp_u8(coverage, 0, tint.a()));
                Color::merge(existing, top)
            }
            GlyphSampling::Bilinear => {
                let u = u - 0.5;
                let v = v - 0.5;
                let gx = u.floor() as i32;
                let gy = v.floor() as i32;
                let mut dx = ((u - gx as f32) * 255.0) as u16;
                let mut dy = ((v - gy as f32) * 255.0) as u16;
                dx += dx >> 7;
                dy += dy >> 7;

                let c0 = self.sample_or_zero(gx, gy) as u16;
                let c1 = self.sample_or_zero(gx + 1, gy) as u16;
                let c2 = self.sample_or_zero(gx, gy + 1) as u16;
                let c3 = self.sample_or_zero(gx + 1, gy + 1) as u16;

                let top = c0 as i32 + ((c1 as i32 - c0 as i32) * dx as i32 >> 8);
                let bottom = c2 as i32 + ((c3 as i32 - c2 as i32) * dx as i32 >> 8);
                let coverage = (top + ((bottom - top) * dy as i32 >> 8)).clamp(0, 255) as u8;

                let top = tint.with_alpha(lerp_u8(coverage, 0, tint.a()));
                Color::merge(existing, top)
            }
        }
    }

    fn promises(&self, _tint: Color) -> Promises {
        Promises::empty()
    }

    fn alpha_promises(&self) -> TintPromises {
        TintPromises {
            transparent_on_zero: true,
            opaque_on_full: false,
        }
    }
}

/// Computed extent of a laid-out string plus the pixel position of an
/// optional cursor byte index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLayout {
    /// Total size of the rendered text block.
    pub size: Vec2f,
    /// Position of the requested cursor, relative to the anchor point.
    pub cursor: Option<Vec2f>,
}

impl Canvas {
    /// Draws a string at `(x, y)`, top-left anchored, and returns its size.
    pub fn draw_text(&mut self, color: Color, font: &Font, font_size: f32, x: f32, y: f32, text: &str) -> Vec2f {
        self.draw_text_aligned(color, font, font_size, x, y, text, TextAlign::Begin, TextAlign::Begin, None)
            .size
    }

    /// Draws a string centered on `x`.
    pub fn draw_text_centered(
        &mut self,
        color: Color,
        font: &Font,
        font_size: f32,
        x: f32,
        y: f32,
        text: &str,
    ) -> Vec2f {
        self.draw_text_aligned(color, font, font_size, x, y, text, TextAlign::Center, TextAlign::Begin, None)
            .size
    }

    /// Draws a string with explicit alignment on both axes and an optional
    /// cursor byte index whose pixel position is reported back.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_text_aligned(
        &mut self,
        color: Color,
        font: &Font,
        font_size: f32,
        x: f32,
        y: f32,
        text: &str,
        halign: TextAlign,
        valign: TextAlign,
        cursor: Option<usize>,
    ) -> TextLayout {
        layout_text(Some((self, color)), font, font_size, x, y, text, halign, valign, cursor)
    }

    /// Measures a string without drawing it.
    pub fn text_size(font: &Font, font_size: f32, text: &str) -> Vec2f {
        layout_text(
            None,
            font,
            font_size,
            0.0,
            0.0,
            text,
            TextAlign::Begin,
            TextAlign::Begin,
            None,
        )
        .size
    }

    fn draw_glyph(&mut self, color: Color, font: &Font, glyph: &Glyph<'_>, scale: f32, x: f32, y: f32) {
        if glyph.w == 0 || glyph.h == 0 {
            return;
        }
        let sampling = if self.is_palette() {
            GlyphSampling::Threshold
        } else if font.recommend_aa {
            GlyphSampling::Bilinear
        } else {
            GlyphSampling::Plain
        };
        let shader = GlyphShader { glyph: *glyph, sampling };
        let (w, h) = (glyph.w as f32, glyph.h as f32);
        let uvs = Quadf::new(0.0, 0.0, w, 0.0, w, h, 0.0, h);
        self.shade_rect(
            color,
            &shader,
            Some(&uvs),
            x + glyph.draw_x as f32 * scale,
            y + glyph.draw_y as f32 * scale,
            w * scale,
            h * scale,
        );
    }
}

/// Shared measuring/drawing walk. With a target the glyphs are drawn;
/// without, only measured.
#[allow(clippy::too_many_arguments)]
fn layout_text(
    mut target: Option<(&mut Canvas, Color)>,
    font: &Font,
    font_size: f32,
    x: f32,
    y: f32,
    text: &str,
    halign: TextAlign,
    valign: TextAlign,
    cursor: Option<usize>,
) -> TextLayout {
    let line_height_px = font.line_height().max(1) as f32;
    let font_size = if font_size == 0.0 { font.default_size as f32 } else { font_size };
    let scale = font_size / line_height_px;

    // Split into lines up front so each can be aligned independently.
    let lines: Vec<&str> = text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l)).collect();
    let total_height = lines.len() as f32 * font_size;
    let y_origin = y + valign.offset(total_height);

    let measure_line = |line: &str| -> f32 {
        let mut w = 0.0;
        for ch in line.chars() {
            if let Some(glyph) = font.glyph(ch as u32) {
                w += glyph.advance as f32 * scale;
            }
        }
        w
    };

    let mut max_width = 0.0f32;
    let mut cursor_pos = None;
    let mut pen_y = y_origin;

    for (i, line) in lines.iter().enumerate() {
        let line_width = measure_line(line);
        max_width = max_width.max(line_width);
        let mut pen_x = x + halign.offset(line_width);

        let line_start = line.as_ptr() as usize - text.as_ptr() as usize;
        let mut byte_pos = line_start;
        for ch in line.chars() {
            if cursor == Some(byte_pos) {
                cursor_pos = Some(Vec2f::new(pen_x - x, pen_y - y));
            }
            if let Some(glyph) = font.glyph(ch as u32) {
                if let Some((canvas, color)) = target.as_mut() {
                    canvas.draw_glyph(*color, font, &glyph, scale, pen_x, pen_y);
                }
                pen_x += glyph.advance as f32 * scale;
            }
            byte_pos += ch.len_utf8();
        }
        // A cursor on the line terminator (or at the very end of the text)
        // sits after the last glyph of this line.
        let next_line_start = lines
            .get(i + 1)
            .map(|next| next.as_ptr() as usize - text.as_ptr() as usize)
            .unwrap_or(text.len() + 1);
        if let Some(c) = cursor {
            if cursor_pos.is_none() && c >= byte_pos && c < next_line_start {
                cursor_pos = Some(Vec2f::new(pen_x - x, pen_y - y));
            }
        }
        pen_y += font_size;
    }

    TextLayout {
        size: Vec2f::new(max_width, total_height),
        cursor: cursor_pos,
    }
}
