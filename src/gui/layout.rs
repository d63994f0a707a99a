//! Top-down layout calculation.
//!
//! Grids compute per-column and per-row extents from their children's
//! minimum sizes and split any remaining space evenly. Children either fill
//! their cell (`FILL_CELL`) or center within it at their minimum size.

use crate::canvas::Canvas;
use crate::geom::Vec2i;
use crate::gui::{ElemFlags, ElementKind, Gui};

impl Gui {
    /// Recomputes positions and sizes for the whole tree inside a
    /// `width`×`height` target.
    pub fn calc_layout(&mut self, width: i32, height: i32) {
        let Some(root) = self.root() else {
            return;
        };
        let root_min = self.min_size(root);
        if let Some(elem) = self.tree.get_mut(root) {
            if elem.size.x <= 0 || elem.size.y <= 0 {
                elem.size = Vec2i::new(width, height);
            }
            elem.size.x = elem.size.x.max(root_min.x);
            elem.size.y = elem.size.y.max(root_min.y);
        }
        self.calc_element(root);
    }

    /// Minimum size of an element: its content size plus padding, never
    /// smaller than what the caller already assigned.
    pub(crate) fn min_size(&self, id: usize) -> Vec2i {
        let Some(elem) = self.tree.get(id) else {
            return Vec2i::default();
        };
        let pad = if elem.flags.contains(ElemFlags::NO_PADDING) {
            0
        } else {
            self.theme.padding
        };
        let font_size = self.effective_font_size();
        let text_min = |text: &str| {
            let size = Canvas::text_size(&self.theme.font, font_size, text);
            Vec2i::new(size.x.ceil() as i32 + pad * 2, size.y.ceil() as i32 + pad * 2)
        };
        match &elem.kind {
            ElementKind::Panel => elem.size,
            ElementKind::Grid { cells, .. } => {
                let (col_width, row_height) = self.grid_extents(id, *cells);
                Vec2i::new(
                    col_width.iter().sum::<i32>() + pad * 2,
                    row_height.iter().sum::<i32>() + pad * 2,
                )
            }
            ElementKind::Button { label } => text_min(label),
            ElementKind::Label { text } => text_min(text),
            ElementKind::Textbox { text, .. } => {
                let mut min = text_min(text);
                // Room for the cursor at the end of the line.
                min.x += 2;
                min.y = min.y.max(font_size.ceil() as i32 + pad * 2);
                min
            }
            ElementKind::Dropdown { options, .. } => {
                let mut min = Vec2i::default();
                for option in options {
                    let size = text_min(option);
                    min.x = min.x.max(size.x);
                    min.y = min.y.max(size.y);
                }
                // The arrow occupies one text-height square on the right.
                min.x += min.y;
                min
            }
        }
    }

    pub(crate) fn effective_font_size(&self) -> f32 {
        if self.theme.font_size > 0.0 {
            self.theme.font_size
        } else {
            self.theme.font.default_size as f32
        }
    }

    /// Per-column and per-row minima over a grid's children.
    fn grid_extents(&self, id: usize, cells: Vec2i) -> (Vec<i32>, Vec<i32>) {
        let mut col_width = vec![0; cells.x.max(0) as usize];
        let mut row_height = vec![0; cells.y.max(0) as usize];
        let children: Vec<usize> = self.tree.children(id).to_vec();
        for (i, child) in children.into_iter().enumerate() {
            let col = i % cells.x.max(1) as usize;
            let row = i / cells.x.max(1) as usize;
            if row >= row_height.len() {
                break;
            }
            let min = self.min_size(child);
            col_width[col] = col_width[col].max(min.x);
            row_height[row] = row_height[row].max(min.y);
        }
        (col_width, row_height)
    }

    fn calc_element(&mut self, id: usize) {
        enum Calc {
            Grid(Vec2i),
            Textbox,
            Plain(Vec2i),
        }
        let calc = match self.tree.get(id) {
            Some(elem) => match &elem.kind {
                ElementKind::Grid { cells, .. } => Calc::Grid(*cells),
                ElementKind::Textbox { .. } => Calc::Textbox,
                _ => Calc::Plain(elem.size),
            },
            None => return,
        };
        match calc {
            Calc::Grid(cells) => self.calc_grid(id, cells),
            Calc::Textbox => self.calc_textbox(id),
            Calc::Plain(size) => {
                if let Some(elem) = self.tree.get_mut(id) {
                    elem.content_size = size;
                }
            }
        }
        let children: Vec<usize> = self.tree.children(id).to_vec();
        for child in children {
            self.calc_element(child);
        }
    }

    fn calc_grid(&mut self, id: usize, cells: Vec2i) {
        let Some(elem) = self.tree.get(id) else {
            return;
        };
        let pad = if elem.flags.contains(ElemFlags::NO_PADDING) {
            0
        } else {
            self.theme.padding
        };
        let size = elem.size;
        let (mut col_width, mut row_height) = self.grid_extents(id, cells);

        // Distribute leftover space evenly across columns and rows.
        let spare_x = size.x - pad * 2 - col_width.iter().sum::<i32>();
        let spare_y = size.y - pad * 2 - row_height.iter().sum::<i32>();
        if !col_width.is_empty() && spare_x > 0 {
            let each = spare_x / col_width.len() as i32;
            let mut extra = spare_x % col_width.len() as i32;
            for w in &mut col_width {
                *w += each + (extra > 0) as i32;
                extra -= 1;
            }
        }
        if !row_height.is_empty() && spare_y > 0 {
            let each = spare_y / row_height.len() as i32;
            let mut extra = spare_y % row_height.len() as i32;
            for h in &mut row_height {
                *h += each + (extra > 0) as i32;
                extra -= 1;
            }
        }

        // Position the children in their cells.
        let children: Vec<usize> = self.tree.children(id).to_vec();
        for (i, child) in children.iter().enumerate() {
            let col = i % cells.x.max(1) as usize;
            let row = i / cells.x.max(1) as usize;
            if row >= row_height.len() {
                break;
            }
            let cell_x = pad + col_width[..col].iter().sum::<i32>();
            let cell_y = pad + row_height[..row].iter().sum::<i32>();
            let cell_w = col_width[col];
            let cell_h = row_height[row];
            let min = self.min_size(*child);
            let Some(child_elem) = self.tree.get_mut(*child) else {
                continue;
            };
            if child_elem.flags.contains(ElemFlags::FILL_CELL) {
                child_elem.pos = Vec2i::new(cell_x, cell_y);
                child_elem.size = Vec2i::new(cell_w, cell_h);
            } else {
                child_elem.pos = Vec2i::new(cell_x + (cell_w - min.x) / 2, cell_y + (cell_h - min.y) / 2);
                child_elem.size = min;
            }
        }

        let content = Vec2i::new(
            col_width.iter().sum::<i32>() + pad * 2,
            row_height.iter().sum::<i32>() + pad * 2,
        );
        if let Some(elem) = self.tree.get_mut(id) {
            elem.content_size = content;
            if let ElementKind::Grid {
                col_width: cw,
                row_height: rh,
                ..
            } = &mut elem.kind
            {
                *cw = col_width;
                *rh = row_height;
            }
        }
    }

    fn calc_textbox(&mut self, id: usize) {
        let font_size = self.effective_font_size();
        let Some(elem) = self.tree.get(id) else {
            return;
        };
        let size = elem.size;
        let ElementKind::Textbox { text, cursor } = &elem.kind else {
            return;
        };
        let text_width = Canvas::text_size(&self.theme.font, font_size, text).x.ceil() as i32;
        let cursor_x = Canvas::text_size(&self.theme.font, font_size, &text[..*cursor])
            .x
            .ceil() as i32;
        let pad = self.theme.padding;
        let window = (size.x - pad * 2).max(1);

        let mut scroll = elem.scroll.x;
        // Keep the cursor inside the visible window with a small margin.
        if cursor_x - scroll > window - 2 {
            scroll = cursor_x - window + 2;
        }
        if cursor_x - scroll < 0 {
            scroll = cursor_x;
        }
        scroll = scroll.clamp(0, (text_width + 2 - window).max(0));

        if let Some(elem) = self.tree.get_mut(id) {
            elem.content_size = Vec2i::new(text_width + 2, size.y);
            elem.scroll.x = scroll;
        }
    }
}

/// Scroll adjustment keeping `selection` (plus `margin` on both sides)
/// visible in a `window`-sized view of `total` content.
pub(crate) fn adjust_scroll(selection_start: i32, selection_len: i32, margin: i32, scroll: i32, window: i32, total: i32) -> i32 {
    let mut scroll = scroll;
    if selection_start + selection_len + margin > scroll + window {
        scroll = selection_start + selection_len + margin - window;
    }
    if selection_start - margin < scroll {
        scroll = selection_start - margin;
    }
    scroll.clamp(0, (total - window).max(0))
}
