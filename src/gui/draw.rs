//! Widget painting.

use crate::canvas::Canvas;
use crate::geom::Vec2i;
use crate::gui::{ElemFlags, ElementKind, Gui, INHERITED_FLAGS};
use crate::text::TextAlign;

/// Paints `id` and its children, then any open overlay menus.
pub(crate) fn draw_subtree(gui: &mut Gui, canvas: &mut Canvas, id: usize) {
    draw_node(gui, canvas, id, ElemFlags::empty(), false);
    // Open dropdown menus overlay everything painted before them.
    draw_overlays(gui, canvas, id);
}

/// Walks the tree looking for dirty subtrees and repaints them.
pub(crate) fn redraw_dirty(gui: &mut Gui, canvas: &mut Canvas, id: usize) {
    let Some(elem) = gui.tree.get(id) else {
        return;
    };
    if elem.flags.contains(ElemFlags::DIRTY) {
        draw_subtree(gui, canvas, id);
        clear_subtree_dirty(gui, id);
        return;
    }
    let children: Vec<usize> = gui.tree.children(id).to_vec();
    for child in children {
        redraw_dirty(gui, canvas, child);
    }
}

fn clear_subtree_dirty(gui: &mut Gui, id: usize) {
    if let Some(elem) = gui.tree.get_mut(id) {
        elem.flags -= ElemFlags::DIRTY;
    }
    let children: Vec<usize> = gui.tree.children(id).to_vec();
    for child in children {
        clear_subtree_dirty(gui, child);
    }
}

fn draw_node(gui: &mut Gui, canvas: &mut Canvas, id: usize, inherited: ElemFlags, selected: bool) {
    let Some(elem) = gui.tree.get(id) else {
        return;
    };
    let flags = elem.flags | inherited;
    if flags.contains(ElemFlags::HIDDEN) {
        return;
    }
    let pos = gui.absolute_pos(id);
    draw_base(gui, canvas, id, pos, flags, selected);
    draw_content(gui, canvas, id, pos, flags);

    let child_selected = gui.tree.get(id).and_then(|e| e.selected);
    let children: Vec<usize> = gui.tree.children(id).to_vec();
    let inherited = flags & INHERITED_FLAGS;
    for (i, child) in children.into_iter().enumerate() {
        draw_node(gui, canvas, child, inherited, child_selected == Some(i));
    }
}

/// Background and border for one element.
fn draw_base(gui: &Gui, canvas: &mut Canvas, id: usize, pos: Vec2i, flags: ElemFlags, selected: bool) {
    let Some(elem) = gui.tree.get(id) else {
        return;
    };
    let theme = &gui.theme;
    let attrs = elem.kind.attrs();
    let (x, y) = (pos.x as f32, pos.y as f32);
    let (w, h) = (elem.size.x as f32, elem.size.y as f32);

    if !flags.contains(ElemFlags::NO_BACKGROUND) {
        let bg = if attrs.button {
            if flags.contains(ElemFlags::ACTIVE) {
                theme.pressed_col
            } else {
                theme.button_col
            }
        } else if attrs.input {
            if selected {
                theme.active_col
            } else {
                theme.input_col
            }
        } else {
            theme.bg_col
        };
        canvas.draw_rect(bg, x, y, w, h);
    }

    let highlighted = selected || flags.contains(ElemFlags::HIGHLIGHT);
    let border = if highlighted { theme.highlight_col } else { theme.border_col };
    if attrs.selectable || attrs.input || attrs.button {
        canvas.outline_rect(border, x, y, w - 1.0, h - 1.0);
        if highlighted && theme.highlight_thickness > 1 {
            canvas.outline_rect(border, x + 1.0, y + 1.0, w - 3.0, h - 3.0);
        }
    }
}

fn draw_content(gui: &mut Gui, canvas: &mut Canvas, id: usize, pos: Vec2i, flags: ElemFlags) {
    let theme_fg = gui.theme.fg_col;
    let font = std::sync::Arc::clone(&gui.theme.font);
    let font_size = gui.effective_font_size();
    let pad = gui.theme.padding;
    let Some(elem) = gui.tree.get(id) else {
        return;
    };
    let size = elem.size;
    let scroll_x = elem.scroll.x;

    match &elem.kind {
        ElementKind::Panel => {}
        ElementKind::Grid { cells, col_width, row_height } => {
            if !flags.contains(ElemFlags::NO_SEPARATOR) && cells.x > 1 {
                let mut x = pos.x + pad;
                for w in &col_width[..col_width.len().saturating_sub(1)] {
                    x += w;
                    canvas.draw_line(
                        gui.theme.border_col,
                        x as f32,
                        (pos.y + pad) as f32,
                        x as f32,
                        (pos.y + size.y - pad - 1) as f32,
                    );
                }
            }
            if !flags.contains(ElemFlags::NO_SEPARATOR) && cells.y > 1 {
                let mut y = pos.y + pad;
                for h in &row_height[..row_height.len().saturating_sub(1)] {
                    y += h;
                    canvas.draw_line(
                        gui.theme.border_col,
                        (pos.x + pad) as f32,
                        y as f32,
                        (pos.x + size.x - pad - 1) as f32,
                        y as f32,
                    );
                }
            }
        }
        ElementKind::Button { label } => {
            let label = label.clone();
            canvas.draw_text_aligned(
                theme_fg,
                &font,
                font_size,
                (pos.x + size.x / 2) as f32,
                pos.y as f32 + (size.y as f32 - font_size) / 2.0,
                &label,
                TextAlign::Center,
                TextAlign::Begin,
                None,
            );
        }
        ElementKind::Label { text } => {
            let text = text.clone();
            canvas.draw_text_aligned(
                theme_fg,
                &font,
                font_size,
                (pos.x + size.x / 2) as f32,
                pos.y as f32 + (size.y as f32 - font_size) / 2.0,
                &text,
                TextAlign::Center,
                TextAlign::Begin,
                None,
            );
        }
        ElementKind::Textbox { text, cursor } => {
            let text = text.clone();
            let cursor = *cursor;
            let text_y = pos.y as f32 + (size.y as f32 - font_size) / 2.0;
            // Clip typed text to the box while it scrolls.
            let prev_clip = canvas.clip();
            canvas.set_clip(pos.x + 1, pos.y + 1, size.x - 2, size.y - 2);
            let layout = canvas.draw_text_aligned(
                theme_fg,
                &font,
                font_size,
                (pos.x + pad - scroll_x) as f32,
                text_y,
                &text,
                TextAlign::Begin,
                TextAlign::Begin,
                Some(cursor),
            );
            if let Some(cursor_pos) = layout.cursor {
                let cx = (pos.x + pad - scroll_x) as f32 + cursor_pos.x;
                canvas.draw_line(theme_fg, cx, text_y, cx, text_y + font_size - 1.0);
            }
            canvas.set_clip(prev_clip.x, prev_clip.y, prev_clip.w, prev_clip.h);
        }
        ElementKind::Dropdown { options, chosen, .. } => {
            let current = options.get(*chosen).cloned().unwrap_or_default();
            let arrow = size.y;
            canvas.draw_text_aligned(
                theme_fg,
                &font,
                font_size,
                (pos.x + pad) as f32,
                pos.y as f32 + (size.y as f32 - font_size) / 2.0,
                &current,
                TextAlign::Begin,
                TextAlign::Begin,
                None,
            );
            // Downward arrow in the right-hand square.
            let ax = (pos.x + size.x - arrow) as f32;
            let ay = pos.y as f32;
            let inset = (arrow as f32 * 0.3).max(2.0);
            canvas.draw_tri(
                theme_fg,
                ax + inset,
                ay + inset,
                ax + arrow as f32 - inset,
                ay + inset,
                ax + arrow as f32 / 2.0,
                ay + arrow as f32 - inset,
            );
        }
    }
}

/// Second pass painting the open dropdown menus over their siblings.
fn draw_overlays(gui: &mut Gui, canvas: &mut Canvas, id: usize) {
    let Some(elem) = gui.tree.get(id) else {
        return;
    };
    if elem.flags.contains(ElemFlags::ACTIVE) {
        if let ElementKind::Dropdown { .. } = elem.kind {
            draw_dropdown_menu(gui, canvas, id);
        }
    }
    let children: Vec<usize> = gui.tree.children(id).to_vec();
    for child in children {
        draw_overlays(gui, canvas, child);
    }
}

fn draw_dropdown_menu(gui: &mut Gui, canvas: &mut Canvas, id: usize) {
    let font = std::sync::Arc::clone(&gui.theme.font);
    let font_size = gui.effective_font_size();
    let pad = gui.theme.padding;
    let theme = gui.theme.clone();
    let pos = gui.absolute_pos(id);
    let Some(elem) = gui.tree.get(id) else {
        return;
    };
    let size = elem.size;
    let ElementKind::Dropdown { options, scroll, hover, .. } = &elem.kind else {
        return;
    };
    let options = options.clone();
    let scroll = *scroll;
    let hover = *hover;

    let row_height = font_size.ceil() as i32 + pad * 2;
    let visible = 5.min(options.len()) as i32;
    let menu_h = visible * row_height;
    let total_h = options.len() as i32 * row_height;
    let menu_y = if theme.dropdown_covering_menu {
        pos.y
    } else {
        pos.y + size.y
    };

    canvas.draw_rect(theme.input_col, pos.x as f32, menu_y as f32, size.x as f32, menu_h as f32);
    canvas.outline_rect(theme.border_col, pos.x as f32, menu_y as f32, size.x as f32 - 1.0, menu_h as f32 - 1.0);

    let prev_clip = canvas.clip();
    canvas.set_clip(pos.x + 1, menu_y + 1, size.x - 2, menu_h - 2);
    for (i, option) in options.iter().enumerate() {
        let row_y = menu_y + i as i32 * row_height - scroll;
        if row_y + row_height < menu_y || row_y > menu_y + menu_h {
            continue;
        }
        if i == hover {
            canvas.draw_rect(
                theme.pressed_col,
                (pos.x + 1) as f32,
                row_y as f32,
                (size.x - 2) as f32,
                row_height as f32,
            );
        }
        canvas.draw_text_aligned(
            theme.fg_col,
            &font,
            font_size,
            (pos.x + pad) as f32,
            row_y as f32 + (row_height as f32 - font_size) / 2.0,
            option,
            TextAlign::Begin,
            TextAlign::Begin,
            None,
        );
    }
    canvas.set_clip(prev_clip.x, prev_clip.y, prev_clip.w, prev_clip.h);

    // Scrollbar when the menu cannot show everything.
    if total_h > menu_h {
        let bar_x = pos.x + size.x - theme.scroll_width - 1;
        canvas.draw_rect(
            theme.scroll_bg_col,
            bar_x as f32,
            (menu_y + 1) as f32,
            theme.scroll_width as f32,
            (menu_h - 2) as f32,
        );
        let thumb_h = ((menu_h - 2) * menu_h / total_h).max(4);
        let travel = menu_h - 2 - thumb_h;
        let thumb_y = menu_y + 1 + travel * scroll / (total_h - menu_h).max(1);
        canvas.draw_rect(
            theme.scroll_fg_col,
            bar_x as f32,
            thumb_y as f32,
            theme.scroll_width as f32,
            thumb_h as f32,
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::canvas::Canvas;
    use crate::format::PixelFormat;
    use crate::gui::test_support::{simple_gui, test_theme};
    use crate::gui::{Element, ElementKind, Gui, GuiEvent, Input};

    #[test]
    fn draw_paints_the_background() {
        let (mut gui, _root, _children) = simple_gui();
        let mut canvas = Canvas::new(64, 48, PixelFormat::Argb8888).unwrap();
        gui.draw(&mut canvas);
        let bg = gui.theme().bg_col;
        assert_eq!(canvas.get_pixel(1, 1), Some(bg));
    }

    #[test]
    fn buttons_use_the_button_color() {
        let (mut gui, _root, children) = simple_gui();
        let mut canvas = Canvas::new(64, 48, PixelFormat::Argb8888).unwrap();
        gui.draw(&mut canvas);
        let pos = gui.absolute_pos(children[0]);
        let inside = canvas
            .get_pixel(pos.x + 2, pos.y + 2)
            .unwrap();
        assert_eq!(inside, gui.theme().button_col);
    }

    #[test]
    fn redraw_skips_clean_trees() {
        let (mut gui, _root, _children) = simple_gui();
        let mut canvas = Canvas::new(64, 48, PixelFormat::Argb8888).unwrap();
        gui.draw(&mut canvas);
        canvas.mark_clean();
        gui.redraw(&mut canvas);
        assert!(!canvas.is_dirty());
    }

    #[test]
    fn redraw_repaints_dirty_subtrees() {
        let (mut gui, _root, children) = simple_gui();
        let mut canvas = Canvas::new(64, 48, PixelFormat::Argb8888).unwrap();
        gui.draw(&mut canvas);
        canvas.mark_clean();
        gui.mark_dirty(children[1]);
        gui.redraw(&mut canvas);
        assert!(canvas.is_dirty());
        // The dirty flag is consumed.
        gui.redraw({
            canvas.mark_clean();
            &mut canvas
        });
        assert!(!canvas.is_dirty());
    }

    #[test]
    fn selection_changes_trigger_dirty_redraws() {
        let (mut gui, _root, _children) = simple_gui();
        let mut canvas = Canvas::new(64, 48, PixelFormat::Argb8888).unwrap();
        gui.draw(&mut canvas);
        gui.handle_event(GuiEvent::press(Input::Down));
        canvas.mark_clean();
        gui.redraw(&mut canvas);
        assert!(canvas.is_dirty());
    }

    #[test]
    fn open_dropdown_menu_paints_rows_below() {
        let mut gui = Gui::new(test_theme());
        let root = gui.add_root(Element::new(ElementKind::grid(1, 1)).sized(40, 16));
        let _dd = gui.add_child(
            root,
            Element::new(ElementKind::dropdown(vec!["0".into(), "1".into()])),
        );
        gui.calc_layout(40, 16);
        gui.element_mut(root).unwrap().selected = Some(0);
        gui.handle_event(GuiEvent::press(Input::Accept));

        let mut canvas = Canvas::new(40, 64, PixelFormat::Argb8888).unwrap();
        gui.draw(&mut canvas);
        // Menu background below the dropdown element.
        let below = canvas.get_pixel(5, 25).unwrap();
        assert_eq!(below, gui.theme().input_col);
    }
}
