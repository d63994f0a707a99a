//! The pixel buffer: geometry, orientation, clip, dirty tracking, palette,
//! and the per-format accessor table.

use std::sync::Arc;

use crate::canvas::access::{merge_index, Accessors};
use crate::color::Color;
use crate::error::{Error, Result};
use crate::format::{FormatClass, FormatInfo, PixelFormat};
use crate::geom::{Recti, Vec2i};
use crate::matrix::{Matrix2, MatrixStack};
use crate::orientation::{orient_vec2i, unorient_recti, Orientation};

pub(crate) mod access;

/// Palette storage: either owned by the buffer or shared, caller-managed.
#[derive(Debug, Clone, Default)]
enum Palette {
    #[default]
    None,
    Owned(Vec<Color>),
    Shared(Arc<[Color]>),
}

impl Palette {
    fn as_slice(&self) -> &[Color] {
        match self {
            Palette::None => &[],
            Palette::Owned(v) => v,
            Palette::Shared(v) => v,
        }
    }
}

/// A caller-owned pixel buffer that drawing calls render into.
///
/// The pixel format is chosen at construction from the closed
/// [`PixelFormat`] set; all drawing goes through a per-format accessor table
/// selected once. Coordinates pass through the current transform matrix and
/// the buffer [`Orientation`] before clipping against the clip rectangle.
///
/// # Examples
///
/// ```
/// use trama::{Canvas, Color, PixelFormat};
///
/// let mut canvas = Canvas::new(4, 4, PixelFormat::Argb8888).unwrap();
/// canvas.background(Color(0xff204060));
/// assert_eq!(canvas.get_pixel(1, 1), Some(Color(0xff204060)));
/// ```
pub struct Canvas {
    format: PixelFormat,
    info: FormatInfo,
    reverse_endianness: bool,
    pixels: Box<[u8]>,
    palette: Palette,

    width: i32,
    height: i32,

    // Dirty extents, inclusive; x0 > x1 means clean.
    dirty_x0: i32,
    dirty_y0: i32,
    dirty_x1: i32,
    dirty_y1: i32,

    clip: Recti,
    pub(crate) stack: MatrixStack,
    orientation: Orientation,

    accessors: Accessors,
    last_error: std::cell::Cell<Option<Error>>,
}

impl Canvas {
    /// Creates a buffer with freshly allocated, zeroed storage.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Canvas> {
        if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(Error::BadParam);
        }
        let bytes = vec![0u8; format.byte_size(width, height)];
        Canvas::from_bytes(bytes, width, height, format)
    }

    /// Adopts caller-provided storage. The storage length must be exactly
    /// `ceil(width * height * bpp / 8)` bytes; get it back with
    /// [`Canvas::into_bytes`].
    pub fn from_bytes(bytes: Vec<u8>, width: u32, height: u32, format: PixelFormat) -> Result<Canvas> {
        if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(Error::BadParam);
        }
        if bytes.len() != format.byte_size(width, height) {
            return Err(Error::BadParam);
        }
        let info = format.info();
        let mut canvas = Canvas {
            format,
            info,
            reverse_endianness: false,
            pixels: bytes.into_boxed_slice(),
            palette: Palette::None,
            width: width as i32,
            height: height as i32,
            dirty_x0: 0,
            dirty_y0: 0,
            dirty_x1: 0,
            dirty_y1: 0,
            clip: Recti::new(0, 0, width as i32, height as i32),
            stack: MatrixStack::new(),
            orientation: Orientation::Upright,
            accessors: Accessors::select(info.bpp, false),
            last_error: std::cell::Cell::new(None),
        };
        canvas.mark_clean();
        Ok(canvas)
    }

    /// Consumes the buffer and returns its pixel storage.
    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels.into_vec()
    }

    /* ==== Geometry and metadata ==== */

    /// Width in the user coordinate system (after orientation).
    #[inline]
    pub fn width(&self) -> i32 {
        if self.orientation.swaps_axes() {
            self.height
        } else {
            self.width
        }
    }

    /// Height in the user coordinate system (after orientation).
    #[inline]
    pub fn height(&self) -> i32 {
        if self.orientation.swaps_axes() {
            self.width
        } else {
            self.height
        }
    }

    /// Natural width of the storage, before orientation.
    #[inline]
    pub fn raw_width(&self) -> i32 {
        self.width
    }

    /// Natural height of the storage, before orientation.
    #[inline]
    pub fn raw_height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn format_info(&self) -> FormatInfo {
        self.info
    }

    /// Raw storage bytes.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Raw storage bytes, mutable.
    #[inline]
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    #[inline]
    pub fn reverse_endianness(&self) -> bool {
        self.reverse_endianness
    }

    /// Toggles byte-reversal at the storage boundary for multi-byte formats
    /// and re-selects the accessor table.
    pub fn set_reverse_endianness(&mut self, reversed: bool) {
        self.reverse_endianness = reversed;
        self.accessors = Accessors::select(self.info.bpp, reversed);
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    #[inline]
    pub(crate) fn accessors(&self) -> Accessors {
        self.accessors
    }

    /* ==== Error register ==== */

    /// Takes the most recent soft drawing failure, clearing it.
    ///
    /// Degenerate input (empty clip, zero-size shapes) is not an error; this
    /// reports genuine misuse like non-finite coordinates or out-of-bounds
    /// pixel access.
    pub fn take_error(&self) -> Option<Error> {
        self.last_error.take()
    }

    #[inline]
    pub(crate) fn record_error(&self, err: Error) {
        self.last_error.set(Some(err));
    }

    /* ==== Palette ==== */

    /// The palette slice; empty for non-palette formats.
    pub fn palette(&self) -> &[Color] {
        self.palette.as_slice()
    }

    /// Installs an owned palette. Errors on non-palette formats.
    pub fn set_palette(&mut self, palette: Vec<Color>) -> Result<()> {
        if !self.format.is_palette() {
            return Err(Error::Unsupported);
        }
        self.palette = Palette::Owned(palette);
        Ok(())
    }

    /// Installs a shared, caller-managed palette. Errors on non-palette
    /// formats.
    pub fn set_palette_shared(&mut self, palette: Arc<[Color]>) -> Result<()> {
        if !self.format.is_palette() {
            return Err(Error::Unsupported);
        }
        self.palette = Palette::Shared(palette);
        Ok(())
    }

    /* ==== Color conversion ==== */

    /// Converts a canonical color to this buffer's native word.
    #[inline]
    pub fn color_to_native(&self, color: Color) -> u32 {
        self.format.to_native(color)
    }

    /// Converts a native word to a canonical color, consulting the palette
    /// for palette formats.
    #[inline]
    pub fn native_to_color(&self, value: u32) -> Color {
        self.format.from_native(value, self.palette.as_slice())
    }

    /// Whether drawing with this color does anything: palette buffers draw
    /// in-range indices, others draw any non-zero alpha.
    #[inline]
    pub(crate) fn drawable_color(&self, color: Color) -> bool {
        if self.format.is_palette() {
            (color.0 as usize) < self.palette.as_slice().len()
        } else {
            !color.is_transparent()
        }
    }

    #[inline]
    pub(crate) fn is_palette(&self) -> bool {
        matches!(self.info.class, FormatClass::Palette)
    }

    /* ==== Clip ==== */

    /// Restricts drawing to a rectangle given in user coordinates.
    pub fn set_clip(&mut self, x: i32, y: i32, width: i32, height: i32) {
        if width == 0 || height == 0 {
            self.clip = Recti::EMPTY;
            return;
        }
        let p0 = orient_vec2i(self.orientation, self.width, self.height, Vec2i::new(x, y));
        let p1 = orient_vec2i(
            self.orientation,
            self.width,
            self.height,
            Vec2i::new(x + width - 1, y + height - 1),
        );
        let (x0, x1) = (p0.x.min(p1.x), p0.x.max(p1.x));
        let (y0, y1) = (p0.y.min(p1.y), p0.y.max(p1.y));
        let x0 = x0.max(0);
        let y0 = y0.max(0);
        let x1 = x1.min(self.width - 1);
        let y1 = y1.min(self.height - 1);
        self.clip = if x0 > x1 || y0 > y1 {
            Recti::EMPTY
        } else {
            Recti::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1)
        };
    }

    /// The clip rectangle in user coordinates.
    pub fn clip(&self) -> Recti {
        unorient_recti(self.orientation, self.width, self.height, self.clip).abs()
    }

    /// The clip rectangle in buffer-native coordinates.
    #[inline]
    pub(crate) fn clip_raw(&self) -> Recti {
        self.clip
    }

    /// Resets the clip to the full buffer.
    pub fn no_clip(&mut self) {
        self.clip = Recti::new(0, 0, self.width, self.height);
    }

    /* ==== Dirty tracking ==== */

    /// Marks the whole buffer clean.
    pub fn mark_clean(&mut self) {
        self.dirty_x0 = self.width;
        self.dirty_y0 = self.height;
        self.dirty_x1 = -1;
        self.dirty_y1 = -1;
    }

    /// Marks the whole buffer dirty.
    pub fn mark_dirty_all(&mut self) {
        self.dirty_x0 = 0;
        self.dirty_y0 = 0;
        self.dirty_x1 = self.width - 1;
        self.dirty_y1 = self.height - 1;
    }

    /// Expands the dirty rectangle to cover one buffer-native point.
    pub(crate) fn mark_dirty_point(&mut self, x: i32, y: i32) {
        let x = x.clamp(0, self.width - 1);
        let y = y.clamp(0, self.height - 1);
        self.dirty_x0 = self.dirty_x0.min(x);
        self.dirty_x1 = self.dirty_x1.max(x);
        self.dirty_y0 = self.dirty_y0.min(y);
        self.dirty_y1 = self.dirty_y1.max(y);
    }

    /// Expands the dirty rectangle to cover a buffer-native rectangle.
    pub(crate) fn mark_dirty_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        if w <= 0 || h <= 0 {
            return;
        }
        self.mark_dirty_point(x, y);
        self.mark_dirty_point(x + w - 1, y + h - 1);
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty_x0 <= self.dirty_x1
    }

    /// The rectangle covering every pixel modified since the last
    /// [`mark_clean`](Canvas::mark_clean), in buffer-native coordinates.
    /// `None` when clean.
    pub fn dirty_rect(&self) -> Option<Recti> {
        self.is_dirty().then(|| {
            Recti::new(
                self.dirty_x0,
                self.dirty_y0,
                self.dirty_x1 - self.dirty_x0 + 1,
                self.dirty_y1 - self.dirty_y0 + 1,
            )
        })
    }

    /* ==== Matrix stack ==== */

    /// The matrix currently applied to drawing calls.
    #[inline]
    pub fn matrix(&self) -> Matrix2 {
        self.stack.top()
    }

    /// Right-multiplies the current matrix by `m` (applied innermost).
    pub fn apply_matrix(&mut self, m: Matrix2) {
        self.stack.apply(m);
    }

    /// Replaces the current matrix.
    pub fn set_matrix(&mut self, m: Matrix2) {
        *self.stack.top_mut() = m;
    }

    /// Saves the current matrix on the stack.
    pub fn push_matrix(&mut self) {
        self.stack.push();
    }

    /// Restores the most recently pushed matrix. Popping the root fails with
    /// [`Error::StackUnderflow`].
    pub fn pop_matrix(&mut self) -> Result<()> {
        self.stack.pop().ok_or(Error::StackUnderflow)
    }

    /// Resets the current matrix to identity; with `all`, also drops every
    /// saved matrix.
    pub fn reset_matrix(&mut self, all: bool) {
        self.stack.reset(all);
    }

    /* ==== Single pixels ==== */

    fn map_pixel_coords(&self, x: i32, y: i32) -> Option<usize> {
        let p = orient_vec2i(self.orientation, self.width, self.height, Vec2i::new(x, y));
        if p.x < 0 || p.x >= self.width || p.y < 0 || p.y >= self.height {
            self.record_error(Error::OutOfBounds);
            return None;
        }
        Some((p.x + p.y * self.width) as usize)
    }

    /// Reads a pixel as a canonical color. `None` out of bounds.
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Color> {
        let index = self.map_pixel_coords(x, y)?;
        Some(self.native_to_color((self.accessors.get)(self, index)))
    }

    /// Reads a pixel's native word without conversion. `None` out of bounds.
    pub fn get_pixel_raw(&self, x: i32, y: i32) -> Option<u32> {
        let index = self.map_pixel_coords(x, y)?;
        Some((self.accessors.get)(self, index))
    }

    /// Writes a pixel, converting the color to native. Palette buffers take
    /// the color as an index without conversion.
    pub fn set_pixel(&mut self, color: Color, x: i32, y: i32) {
        let Some(index) = self.map_pixel_coords(x, y) else {
            return;
        };
        let native = if self.is_palette() {
            color.0
        } else {
            self.color_to_native(color)
        };
        (self.accessors.set)(self, native, index);
        let p = orient_vec2i(self.orientation, self.width, self.height, Vec2i::new(x, y));
        self.mark_dirty_point(p.x, p.y);
    }

    /// Writes a pixel's native word without conversion.
    pub fn set_pixel_raw(&mut self, value: u32, x: i32, y: i32) {
        let Some(index) = self.map_pixel_coords(x, y) else {
            return;
        };
        (self.accessors.set)(self, value, index);
        let p = orient_vec2i(self.orientation, self.width, self.height, Vec2i::new(x, y));
        self.mark_dirty_point(p.x, p.y);
    }

    /// Alpha-blends a color onto a pixel.
    pub fn merge_pixel(&mut self, color: Color, x: i32, y: i32) {
        let Some(index) = self.map_pixel_coords(x, y) else {
            return;
        };
        if self.is_palette() {
            if !color.is_transparent() {
                (self.accessors.set)(self, color.0, index);
            }
        } else if color.is_opaque() {
            let native = self.color_to_native(color);
            (self.accessors.set)(self, native, index);
        } else if !color.is_transparent() {
            merge_index(self, color, index);
        }
        let p = orient_vec2i(self.orientation, self.width, self.height, Vec2i::new(x, y));
        self.mark_dirty_point(p.x, p.y);
    }

    /* ==== Whole-buffer operations ==== */

    /// Fills the whole buffer with a color, ignoring clip and transform.
    ///
    /// Recognises the fast cases: native zero (plain byte fill), 16 and
    /// 32 bpp lane fills, and sub-byte patterns expanded across a byte.
    pub fn background(&mut self, color: Color) {
        let value = if self.is_palette() {
            if (color.0 as usize) < self.palette.as_slice().len() {
                color.0
            } else {
                0
            }
        } else {
            self.color_to_native(color)
        };

        if value == 0 {
            self.pixels.fill(0);
        } else if self.info.bpp == 16 {
            let mut v = value as u16;
            if self.reverse_endianness {
                v = v.swap_bytes();
            }
            match bytemuck::try_cast_slice_mut::<u8, u16>(&mut self.pixels[..]) {
                Ok(lanes) => lanes.fill(v),
                Err(_) => {
                    for chunk in self.pixels.chunks_exact_mut(2) {
                        chunk.copy_from_slice(&v.to_ne_bytes());
                    }
                }
            }
        } else if self.info.bpp == 32 {
            let mut v = value;
            if self.reverse_endianness {
                v = v.swap_bytes();
            }
            match bytemuck::try_cast_slice_mut::<u8, u32>(&mut self.pixels[..]) {
                Ok(lanes) => lanes.fill(v),
                Err(_) => {
                    for chunk in self.pixels.chunks_exact_mut(4) {
                        chunk.copy_from_slice(&v.to_ne_bytes());
                    }
                }
            }
        } else if self.info.bpp == 24 {
            let count = (self.width * self.height) as usize;
            for i in 0..count {
                (self.accessors.set)(self, value, i);
            }
        } else {
            // Expand the bit pattern across a byte and fill.
            let byte = match self.info.bpp {
                1 => 0u8.wrapping_sub(value as u8),
                2 => (value as u8) * 0x55,
                4 => (value as u8) * 0x11,
                _ => value as u8,
            };
            self.pixels.fill(byte);
        }

        self.mark_dirty_all();
    }

    /// Axis-aligned clip-checked fill in buffer-native coordinates, used by
    /// the scroll edge fills and the rect kernel.
    pub(crate) fn fill_axis_rect_native(&mut self, native: u32, x: i32, y: i32, w: i32, h: i32) {
        let rect = Recti::new(x, y, w, h).abs().intersect(self.clip);
        if rect.is_empty() {
            return;
        }
        for row in rect.y..rect.y + rect.h {
            let index = (rect.x + row * self.width) as usize;
            (self.accessors.set_range)(self, native, index, rect.w as usize);
        }
        self.mark_dirty_rect(rect.x, rect.y, rect.w, rect.h);
    }

    /// Shifts the entire image by `(dx, dy)` in user coordinates, filling the
    /// vacated strips with `placeholder`.
    pub fn scroll(&mut self, placeholder: Color, dx: i32, dy: i32) {
        // Remap the delta through the orientation.
        let (mut x, mut y) = match self.orientation as u8 & 3 {
            1 => (dy, -dx),
            2 => (-dx, -dy),
            3 => (-dy, dx),
            _ => (dx, dy),
        };
        if self.orientation as u8 & 4 != 0 {
            x = -x;
        }

        if x.abs() >= self.width || y.abs() >= self.height {
            self.background(placeholder);
            return;
        }

        let off = (x + y * self.width) as isize;
        let count = (self.width * self.height) as isize - off.abs();
        let bit_off = self.info.bpp as isize * off;
        let bit_count = self.info.bpp as isize * count;

        if bit_off & 7 == 0 {
            // Byte-aligned shift in one move.
            let byte_off = (bit_off / 8).unsigned_abs();
            let byte_count = (bit_count / 8) as usize;
            if bit_off > 0 {
                self.pixels.copy_within(0..byte_count, byte_off);
            } else {
                self.pixels.copy_within(byte_off..byte_off + byte_count, 0);
            }
        } else if off > 0 {
            // Iterate backward so unread pixels are not overwritten.
            for i in (0..count).rev() {
                let value = (self.accessors.get)(self, i as usize);
                (self.accessors.set)(self, value, (i + off) as usize);
            }
        } else {
            for i in 0..count {
                let value = (self.accessors.get)(self, (i - off) as usize);
                (self.accessors.set)(self, value, i as usize);
            }
        }

        // Fill the exposed strips; the shift is already in buffer
        // coordinates, so orientation stays out of it.
        let native = if self.is_palette() {
            color_index_or_zero(self, placeholder)
        } else {
            self.color_to_native(placeholder)
        };
        if x > 0 {
            self.fill_axis_rect_native(native, 0, y.max(0), x, self.height - y.abs());
        } else if x < 0 {
            self.fill_axis_rect_native(native, self.width + x, y.max(0), -x, self.height - y.abs());
        }
        if y > 0 {
            self.fill_axis_rect_native(native, 0, 0, self.width, y);
        } else if y < 0 {
            self.fill_axis_rect_native(native, 0, self.height + y, self.width, -y);
        }

        self.mark_dirty_all();
    }
}

fn color_index_or_zero(canvas: &Canvas, color: Color) -> u32 {
    if (color.0 as usize) < canvas.palette().len() {
        color.0
    } else {
        0
    }
}

impl core::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("orientation", &self.orientation)
            .field("clip", &self.clip)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_fills_every_format() {
        for format in PixelFormat::ALL {
            let mut canvas = Canvas::new(5, 3, format).unwrap();
            if format.is_palette() {
                canvas.set_palette(vec![Color::BLACK, Color::WHITE]).unwrap();
                canvas.background(Color(1));
                assert_eq!(canvas.get_pixel(4, 2), Some(Color::WHITE), "{format:?}");
            } else {
                canvas.background(Color::WHITE);
                assert_eq!(canvas.get_pixel(4, 2), Some(Color::WHITE), "{format:?}");
            }
        }
    }

    #[test]
    fn background_out_of_range_palette_index_falls_back_to_zero() {
        let mut canvas = Canvas::new(2, 2, PixelFormat::Pal8).unwrap();
        canvas.set_palette(vec![Color::rgb(9, 9, 9)]).unwrap();
        canvas.background(Color(200));
        assert_eq!(canvas.get_pixel_raw(0, 0), Some(0));
    }

    #[test]
    fn clip_is_clamped_to_the_buffer() {
        let mut canvas = Canvas::new(10, 10, PixelFormat::Grey8).unwrap();
        canvas.set_clip(-5, -5, 8, 8);
        assert_eq!(canvas.clip(), Recti::new(0, 0, 3, 3));
        canvas.no_clip();
        assert_eq!(canvas.clip(), Recti::new(0, 0, 10, 10));
    }

    #[test]
    fn clip_survives_orientation_round_trip() {
        let mut canvas = Canvas::new(20, 10, PixelFormat::Grey8).unwrap();
        for o in Orientation::ALL {
            canvas.set_orientation(o);
            canvas.set_clip(1, 2, 5, 4);
            assert_eq!(canvas.clip(), Recti::new(1, 2, 5, 4), "{o:?}");
        }
    }

    #[test]
    fn dirty_starts_clean_and_tracks_writes() {
        let mut canvas = Canvas::new(8, 8, PixelFormat::Argb8888).unwrap();
        canvas.mark_clean();
        assert!(!canvas.is_dirty());
        canvas.set_pixel(Color::WHITE, 3, 4);
        assert_eq!(canvas.dirty_rect(), Some(Recti::new(3, 4, 1, 1)));
        canvas.set_pixel(Color::WHITE, 5, 6);
        assert_eq!(canvas.dirty_rect(), Some(Recti::new(3, 4, 3, 3)));
    }

    #[test]
    fn oriented_pixel_addressing() {
        let mut canvas = Canvas::new(4, 2, PixelFormat::Grey8).unwrap();
        canvas.set_orientation(Orientation::RotCcw);
        assert_eq!(canvas.width(), 2);
        assert_eq!(canvas.height(), 4);
        canvas.set_pixel(Color::WHITE, 0, 0);
        canvas.set_orientation(Orientation::Upright);
        assert_eq!(canvas.get_pixel(0, 1), Some(Color::WHITE));
    }

    #[test]
    fn out_of_bounds_reads_record_an_error() {
        let canvas = Canvas::new(4, 4, PixelFormat::Grey8).unwrap();
        assert_eq!(canvas.get_pixel(9, 0), None);
        assert_eq!(canvas.take_error(), Some(Error::OutOfBounds));
        assert_eq!(canvas.take_error(), None);
    }

    #[test]
    fn adopted_storage_round_trips() {
        let bytes = vec![0u8; PixelFormat::Rgb565.byte_size(3, 3)];
        let mut canvas = Canvas::from_bytes(bytes, 3, 3, PixelFormat::Rgb565).unwrap();
        canvas.background(Color::rgb(255, 0, 0));
        let bytes = canvas.into_bytes();
        assert_eq!(bytes.len(), 18);
        assert_ne!(bytes, vec![0u8; 18]);
    }

    #[test]
    fn from_bytes_rejects_wrong_lengths() {
        assert!(Canvas::from_bytes(vec![0u8; 5], 3, 3, PixelFormat::Grey8).is_err());
    }

    #[test]
    fn scroll_and_back_restores_interior() {
        let mut canvas = Canvas::new(8, 8, PixelFormat::Argb8888).unwrap();
        for y in 0..8 {
            for x in 0..8 {
                canvas.set_pixel(Color::rgb(x as u8 * 30, y as u8 * 30, 7), x, y);
            }
        }
        let before = canvas.bytes().to_vec();
        canvas.scroll(Color::BLACK, 2, 1);
        canvas.scroll(Color::BLACK, -2, -1);
        // Interior pixels (outside the exposed strips) are restored.
        for y in 1..7 {
            for x in 2..6 {
                let offset = ((y * 8 + x) * 4) as usize;
                assert_eq!(canvas.bytes()[offset..offset + 4], before[offset..offset + 4], "({x},{y})");
            }
        }
    }

    #[test]
    fn scroll_fills_exposed_edges() {
        let mut canvas = Canvas::new(4, 4, PixelFormat::Grey8).unwrap();
        canvas.background(Color::WHITE);
        canvas.scroll(Color::BLACK, 2, 0);
        assert_eq!(canvas.get_pixel(0, 0), Some(Color::BLACK));
        assert_eq!(canvas.get_pixel(1, 3), Some(Color::BLACK));
        assert_eq!(canvas.get_pixel(2, 0), Some(Color::WHITE));
    }

    #[test]
    fn scroll_too_far_is_a_background_fill() {
        let mut canvas = Canvas::new(4, 4, PixelFormat::Grey8).unwrap();
        canvas.background(Color::WHITE);
        canvas.scroll(Color::BLACK, 4, 0);
        for x in 0..4 {
            assert_eq!(canvas.get_pixel(x, 0), Some(Color::BLACK));
        }
    }

    #[test]
    fn subbyte_scroll_uses_pixel_copies() {
        let mut canvas = Canvas::new(5, 2, PixelFormat::Grey1).unwrap();
        canvas.set_pixel(Color::WHITE, 0, 0);
        canvas.scroll(Color::BLACK, 1, 0);
        assert_eq!(canvas.get_pixel(1, 0), Some(Color::WHITE));
        assert_eq!(canvas.get_pixel(0, 0), Some(Color::BLACK));
    }

    #[test]
    fn matrix_stack_underflow_is_reported() {
        let mut canvas = Canvas::new(2, 2, PixelFormat::Grey8).unwrap();
        assert_eq!(canvas.pop_matrix(), Err(Error::StackUnderflow));
        canvas.push_matrix();
        assert!(canvas.pop_matrix().is_ok());
    }
}
