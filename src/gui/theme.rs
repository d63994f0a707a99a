//! GUI color and metric themes.

use std::sync::Arc;

use crate::color::Color;
use crate::text::Font;

/// Colors, paddings and the font used by every widget.
#[derive(Clone)]
pub struct Theme {
    /// Panel and grid background.
    pub bg_col: Color,
    /// Text and separator color.
    pub fg_col: Color,
    /// Textbox background.
    pub input_col: Color,
    /// Background of the focused textbox.
    pub active_col: Color,
    /// Button and dropdown background.
    pub button_col: Color,
    /// Background of a held button.
    pub pressed_col: Color,
    pub border_col: Color,
    pub highlight_col: Color,
    /// Border thickness of highlighted elements.
    pub highlight_thickness: i32,
    /// Inner padding of inputs, buttons and grid cells.
    pub padding: i32,

    pub font: Arc<Font>,
    pub font_size: f32,

    /// Open the dropdown menu over the element instead of under it when
    /// there is not enough room below.
    pub dropdown_covering_menu: bool,

    pub scroll_bg_col: Color,
    pub scroll_fg_col: Color,
    pub scroll_width: i32,
}

impl Default for Theme {
    fn default() -> Theme {
        Theme {
            bg_col: Color::rgb(0x10, 0x10, 0x18),
            fg_col: Color::rgb(0xe8, 0xe8, 0xe8),
            input_col: Color::rgb(0x28, 0x28, 0x30),
            active_col: Color::rgb(0x30, 0x30, 0x40),
            button_col: Color::rgb(0x38, 0x38, 0x48),
            pressed_col: Color::rgb(0x50, 0x50, 0x68),
            border_col: Color::rgb(0x60, 0x60, 0x70),
            highlight_col: Color::rgb(0x4f, 0x9f, 0xff),
            highlight_thickness: 1,
            padding: 2,
            font: Arc::new(fallback_font()),
            font_size: 0.0,
            dropdown_covering_menu: false,
            scroll_bg_col: Color::rgb(0x20, 0x20, 0x28),
            scroll_fg_col: Color::rgb(0x80, 0x80, 0x90),
            scroll_width: 3,
        }
    }
}

impl core::fmt::Debug for Theme {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Theme")
            .field("font", &self.font.name)
            .field("font_size", &self.font_size)
            .field("padding", &self.padding)
            .finish_non_exhaustive()
    }
}

/// A 1x1 blank font so a default theme never panics; real applications
/// install their own font.
fn fallback_font() -> Font {
    use crate::text::{GlyphRange, RangeKind};
    Font {
        name: "fallback".into(),
        ranges: vec![GlyphRange {
            start: 1,
            end: 1,
            height: 1,
            bpp: 1,
            bitmap: vec![0u8].into(),
            kind: RangeKind::Monospace { width: 1 },
        }],
        default_size: 8,
        recommend_aa: false,
    }
}
