//! The abstract font descriptor consumed by the text renderer.
//!
//! A font is a name plus an ordered list of glyph ranges, each covering a
//! contiguous span of code points with bitmap data. Monospace ranges share
//! one cell size; variable-pitch ranges carry per-glyph placement and
//! advance.

use std::borrow::Cow;

/// Per-glyph placement for variable-pitch ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphMetrics {
    /// Offset of the drawn portion within the glyph cell.
    pub draw_x: i8,
    pub draw_y: i8,
    /// Size of the drawn portion.
    pub draw_w: u8,
    pub draw_h: u8,
    /// Byte offset of this glyph's rows in the range bitmap.
    pub bitmap_offset: u32,
    /// Horizontal advance in glyph pixels.
    pub advance: u8,
}

/// Pitch-specific data of a [`GlyphRange`].
#[derive(Debug, Clone)]
pub enum RangeKind {
    /// All glyphs share one cell; advance equals the cell width.
    Monospace { width: u8 },
    /// Per-glyph placement records, one per code point in the range.
    Variable { glyphs: Vec<GlyphMetrics> },
}

/// A contiguous span of code points backed by one bitmap.
#[derive(Debug, Clone)]
pub struct GlyphRange {
    /// First code point in the range, inclusive.
    pub start: u32,
    /// Last code point in the range, inclusive.
    pub end: u32,
    /// Cell height in glyph pixels.
    pub height: u8,
    /// Bits per bitmap pixel (1, 2, 4 or 8).
    pub bpp: u8,
    /// Row-major glyph bitmap, rows padded to whole bytes.
    pub bitmap: Cow<'static, [u8]>,
    pub kind: RangeKind,
}

/// A bitmap font.
#[derive(Debug, Clone)]
pub struct Font {
    pub name: Cow<'static, str>,
    /// Searched in order; the first range containing a code point wins.
    pub ranges: Vec<GlyphRange>,
    /// Point size the font was designed for.
    pub default_size: u16,
    /// Whether bilinear filtering is recommended when scaling.
    pub recommend_aa: bool,
}

/// A located glyph: bitmap window plus placement, in glyph pixels.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Glyph<'a> {
    pub bitmap: &'a [u8],
    /// Drawn-portion size.
    pub w: u32,
    pub h: u32,
    pub bpp: u8,
    /// Bytes per bitmap row.
    pub row_stride: u32,
    /// Placement of the drawn portion within the cell.
    pub draw_x: i32,
    pub draw_y: i32,
    /// Advance in glyph pixels.
    pub advance: u32,
    /// Cell height, the baseline-to-baseline distance at scale 1.
    pub cell_height: u32,
}

impl Font {
    /// Finds the glyph for a code point, falling back to the substitute
    /// glyph (the range containing U+0001) and then to nothing.
    pub(crate) fn glyph(&self, codepoint: u32) -> Option<Glyph<'_>> {
        self.lookup(codepoint).or_else(|| self.lookup(1))
    }

    fn lookup(&self, codepoint: u32) -> Option<Glyph<'_>> {
        let range = self
            .ranges
            .iter()
            .find(|r| (r.start..=r.end).contains(&codepoint))?;
        let index = (codepoint - range.start) as usize;
        match &range.kind {
            RangeKind::Monospace { width } => {
                let row_stride = (*width as u32 * range.bpp as u32).div_ceil(8);
                let glyph_bytes = row_stride as usize * range.height as usize;
                let offset = index * glyph_bytes;
                let bitmap = range.bitmap.get(offset..offset + glyph_bytes)?;
                Some(Glyph {
                    bitmap,
                    w: *width as u32,
                    h: range.height as u32,
                    bpp: range.bpp,
                    row_stride,
                    draw_x: 0,
                    draw_y: 0,
                    advance: *width as u32,
                    cell_height: range.height as u32,
                })
            }
            RangeKind::Variable { glyphs } => {
                let m = glyphs.get(index)?;
                let row_stride = (m.draw_w as u32 * range.bpp as u32).div_ceil(8);
                let glyph_bytes = row_stride as usize * m.draw_h as usize;
                let offset = m.bitmap_offset as usize;
                let bitmap = range.bitmap.get(offset..offset + glyph_bytes)?;
                Some(Glyph {
                    bitmap,
                    w: m.draw_w as u32,
                    h: m.draw_h as u32,
                    bpp: range.bpp,
                    row_stride,
                    draw_x: m.draw_x as i32,
                    draw_y: m.draw_y as i32,
                    advance: m.advance as u32,
                    cell_height: range.height as u32,
                })
            }
        }
    }

    /// Line height in glyph pixels: the tallest range's cell height.
    pub fn line_height(&self) -> u32 {
        self.ranges.iter().map(|r| r.height as u32).max().unwrap_or(1)
    }
}

#[cfg(test)]
pub(crate) mod test_font {
    use super::*;

    /// A tiny 4x5 monospace test font covering '0'..'9' plus a substitute
    /// glyph at U+0001. Each glyph row is one byte, low nibble used.
    pub(crate) fn font() -> Font {
        // '0' is a hollow box, '1' a vertical bar on the right.
        let mut bitmap = Vec::new();
        for digit in 0..10u8 {
            match digit {
                0 => bitmap.extend_from_slice(&[0b1111, 0b1001, 0b1001, 0b1001, 0b1111]),
                1 => bitmap.extend_from_slice(&[0b0100, 0b0110, 0b0100, 0b0100, 0b1110]),
                _ => bitmap.extend_from_slice(&[0b1111, 0b0001, 0b1111, 0b1000, 0b1111]),
            }
        }
        Font {
            name: "TestDigits".into(),
            ranges: vec![
                GlyphRange {
                    start: 1,
                    end: 1,
                    height: 5,
                    bpp: 1,
                    bitmap: vec![0b1111, 0b1111, 0b1111, 0b1111, 0b1111].into(),
                    kind: RangeKind::Monospace { width: 4 },
                },
                GlyphRange {
                    start: '0' as u32,
                    end: '9' as u32,
                    height: 5,
                    bpp: 1,
                    bitmap: bitmap.into(),
                    kind: RangeKind::Monospace { width: 4 },
                },
            ],
            default_size: 5,
            recommend_aa: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_font::font;
    use super::*;

    #[test]
    fn variable_pitch_glyphs_carry_their_own_metrics() {
        // Two glyphs: 'a' is 2x3 at offset 0, 'b' is 3x3 right after it.
        let font = Font {
            name: "var".into(),
            ranges: vec![GlyphRange {
                start: 'a' as u32,
                end: 'b' as u32,
                height: 4,
                bpp: 1,
                bitmap: vec![0b11, 0b01, 0b10, 0b111, 0b101, 0b111].into(),
                kind: RangeKind::Variable {
                    glyphs: vec![
                        GlyphMetrics {
                            draw_x: 0,
                            draw_y: 1,
                            draw_w: 2,
                            draw_h: 3,
                            bitmap_offset: 0,
                            advance: 3,
                        },
                        GlyphMetrics {
                            draw_x: 1,
                            draw_y: 0,
                            draw_w: 3,
                            draw_h: 3,
                            bitmap_offset: 3,
                            advance: 5,
                        },
                    ],
                },
            }],
            default_size: 4,
            recommend_aa: false,
        };

        let a = font.glyph('a' as u32).unwrap();
        assert_eq!((a.w, a.h), (2, 3));
        assert_eq!((a.draw_x, a.draw_y), (0, 1));
        assert_eq!(a.advance, 3);
        assert_eq!(a.bitmap, &[0b11, 0b01, 0b10]);

        let b = font.glyph('b' as u32).unwrap();
        assert_eq!((b.w, b.h), (3, 3));
        assert_eq!(b.advance, 5);
        assert_eq!(b.bitmap, &[0b111, 0b101, 0b111]);
        assert_eq!(b.cell_height, 4);
    }

    #[test]
    fn truncated_variable_bitmaps_resolve_to_nothing() {
        let font = Font {
            name: "broken".into(),
            ranges: vec![GlyphRange {
                start: 'x' as u32,
                end: 'x' as u32,
                height: 4,
                bpp: 1,
                bitmap: vec![0u8; 2].into(),
                kind: RangeKind::Variable {
                    glyphs: vec![GlyphMetrics {
                        draw_x: 0,
                        draw_y: 0,
                        draw_w: 3,
                        draw_h: 3,
                        bitmap_offset: 0,
                        advance: 3,
                    }],
                },
            }],
            default_size: 4,
            recommend_aa: false,
        };
        assert!(font.glyph('x' as u32).is_none());
    }

    #[test]
    fn digits_resolve_to_their_own_cells() {
        let font = font();
        let zero = font.glyph('0' as u32).unwrap();
        assert_eq!(zero.w, 4);
        assert_eq!(zero.h, 5);
        assert_eq!(zero.advance, 4);
        assert_eq!(zero.bitmap[0], 0b1111);
        let one = font.glyph('1' as u32).unwrap();
        assert_eq!(one.bitmap[0], 0b0100);
    }

    #[test]
    fn unknown_code_points_fall_back_to_the_substitute() {
        let font = font();
        let sub = font.glyph(0x4e00).unwrap();
        assert_eq!(sub.bitmap[0], 0b1111);
        assert_eq!(sub.bitmap[1], 0b1111);
    }

    #[test]
    fn line_height_is_the_tallest_range() {
        assert_eq!(font().line_height(), 5);
    }
}
