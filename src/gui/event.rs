//! Event routing.
//!
//! Events walk down the selected descendant chain first; whoever captures
//! them wins, and unhandled events bubble back toward the root. Grids turn
//! directional input into selection movement.

use bitflags::bitflags;

use crate::gui::layout::adjust_scroll;
use crate::gui::{ElemFlags, ElementKind, Gui, INHERITED_FLAGS};
use crate::text::utf8;

/// Navigation input carried by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    None,
    Left,
    Right,
    Up,
    Down,
    /// Accept / enter.
    Accept,
    /// Back / escape.
    Back,
}

/// Phase of a button's life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Press,
    /// Auto-repeat while held.
    Hold,
    Release,
}

bitflags! {
    /// Modifier keys active during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ModKeys: u32 {
        const SHIFT = 0x0001;
        const CTRL = 0x0002;
        const ALT = 0x0004;
        const CAPS = 0x0010;
        const NUM = 0x0020;
    }
}

/// One input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuiEvent {
    pub kind: EventKind,
    pub input: Input,
    /// Typed character, if the event carries one.
    pub value: Option<char>,
    pub modkeys: ModKeys,
}

impl GuiEvent {
    pub fn press(input: Input) -> GuiEvent {
        GuiEvent {
            kind: EventKind::Press,
            input,
            value: None,
            modkeys: ModKeys::empty(),
        }
    }

    pub fn release(input: Input) -> GuiEvent {
        GuiEvent {
            kind: EventKind::Release,
            input,
            value: None,
            modkeys: ModKeys::empty(),
        }
    }

    pub fn character(c: char) -> GuiEvent {
        GuiEvent {
            kind: EventKind::Press,
            input: Input::None,
            value: Some(c),
            modkeys: ModKeys::empty(),
        }
    }
}

/// How an element responded to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Response {
    /// Not handled; bubbles to the parent.
    Ignored,
    /// Handled.
    Captured,
    /// Handled; the element needs re-drawing.
    CapturedDirty,
    /// Handled, but the action was not possible.
    CapturedErr,
}

impl Gui {
    /// Routes an event through the tree. Returns how it was handled;
    /// `CapturedDirty` responses mark the affected elements for `redraw`.
    pub fn handle_event(&mut self, event: GuiEvent) -> Response {
        let Some(root) = self.root() else {
            return Response::Ignored;
        };
        let response = self.route(root, event, ElemFlags::empty());
        if response == Response::CapturedDirty {
            // Selection movement can change any element along the chain.
            self.mark_dirty(root);
        }
        response
    }

    /// Descends into the selected chain, innermost first.
    fn route(&mut self, id: usize, event: GuiEvent, inherited: ElemFlags) -> Response {
        let Some(elem) = self.tree.get(id) else {
            return Response::Ignored;
        };
        let flags = elem.flags | inherited;
        if flags.intersects(ElemFlags::HIDDEN | ElemFlags::INACTIVE) {
            return Response::Ignored;
        }
        let inherited = flags & INHERITED_FLAGS;

        if let Some(selected) = elem.selected {
            let children: Vec<usize> = self.tree.children(id).to_vec();
            if let Some(&child) = children.get(selected) {
                // A dropdown with an open menu captures everything before
                // its children would.
                let response = self.route(child, event, inherited);
                if response != Response::Ignored {
                    return response;
                }
            }
        }

        self.handle_self(id, event)
    }

    fn handle_self(&mut self, id: usize, event: GuiEvent) -> Response {
        enum Handler {
            Grid(crate::geom::Vec2i),
            Button,
            Textbox,
            Dropdown,
            Passive,
        }
        let handler = match self.tree.get(id).map(|e| &e.kind) {
            Some(ElementKind::Grid { cells, .. }) => Handler::Grid(*cells),
            Some(ElementKind::Button { .. }) => Handler::Button,
            Some(ElementKind::Textbox { .. }) => Handler::Textbox,
            Some(ElementKind::Dropdown { .. }) => Handler::Dropdown,
            _ => Handler::Passive,
        };
        match handler {
            Handler::Grid(cells) => self.grid_event(id, cells, event),
            Handler::Button => {
                let fire = match self.tree.get_mut(id) {
                    Some(elem) => button_event(elem, event),
                    None => return Response::Ignored,
                };
                fire.map_fire(self, id)
            }
            Handler::Textbox => {
                let fire = match self.tree.get_mut(id) {
                    Some(elem) => textbox_event(elem, event),
                    None => return Response::Ignored,
                };
                fire.map_fire(self, id)
            }
            Handler::Dropdown => {
                let fire = self.dropdown_event(id, event);
                fire.map_fire(self, id)
            }
            Handler::Passive => Response::Ignored,
        }
    }

    fn grid_event(&mut self, id: usize, cells: crate::geom::Vec2i, event: GuiEvent) -> Response {
        if event.kind == EventKind::Release {
            return Response::Ignored;
        }
        let (dx, dy) = match event.input {
            Input::Left => (-1, 0),
            Input::Right => (1, 0),
            Input::Up => (0, -1),
            Input::Down => (0, 1),
            _ => return Response::Ignored,
        };

        let children: Vec<usize> = self.tree.children(id).to_vec();
        if children.is_empty() {
            return Response::Ignored;
        }
        let cols = cells.x.max(1) as usize;
        let selected = self.tree.get(id).and_then(|e| e.selected);

        let next = match selected {
            None => self.first_selectable(&children),
            Some(current) => self.next_selectable(&children, cols, current, dx, dy),
        };
        match next {
            Some(next) if Some(next) != selected => {
                if let Some(elem) = self.tree.get_mut(id) {
                    elem.selected = Some(next);
                }
                Response::CapturedDirty
            }
            Some(_) => Response::Captured,
            None => Response::Ignored,
        }
    }

    fn first_selectable(&self, children: &[usize]) -> Option<usize> {
        children.iter().position(|&c| {
            self.tree
                .get(c)
                .map(|e| e.kind.attrs().selectable && !e.flags.intersects(ElemFlags::HIDDEN | ElemFlags::INACTIVE))
                .unwrap_or(false)
        })
    }

    /// Steps through the grid in `(dx, dy)`, wrapping on the moved axis,
    /// until a selectable child turns up or the search returns home.
    fn next_selectable(
        &self,
        children: &[usize],
        cols: usize,
        current: usize,
        dx: i32,
        dy: i32,
    ) -> Option<usize> {
        let rows = children.len().div_ceil(cols);
        let mut col = (current % cols) as i32;
        let mut row = (current / cols) as i32;
        for _ in 0..cols.max(rows) * 2 {
            col = (col + dx).rem_euclid(cols as i32);
            row = (row + dy).rem_euclid(rows as i32);
            let index = row as usize * cols + col as usize;
            if index == current {
                return Some(current);
            }
            if let Some(&child) = children.get(index) {
                let ok = self
                    .tree
                    .get(child)
                    .map(|e| {
                        e.kind.attrs().selectable
                            && !e.flags.intersects(ElemFlags::HIDDEN | ElemFlags::INACTIVE)
                    })
                    .unwrap_or(false);
                if ok {
                    return Some(index);
                }
            }
        }
        None
    }

    fn dropdown_event(&mut self, id: usize, event: GuiEvent) -> Fire {
        let font_size = self.effective_font_size();
        let row_height = font_size.ceil() as i32 + self.theme.padding * 2;
        let Some(elem) = self.tree.get_mut(id) else {
            return Fire::no(Response::Ignored);
        };
        let open = elem.flags.contains(ElemFlags::ACTIVE);
        let ElementKind::Dropdown {
            options,
            chosen,
            scroll,
            hover,
        } = &mut elem.kind
        else {
            return Fire::no(Response::Ignored);
        };

        if !open {
            return match (event.kind, event.input) {
                (EventKind::Press, Input::Accept) => {
                    *hover = *chosen;
                    elem.flags |= ElemFlags::ACTIVE;
                    Fire::no(Response::CapturedDirty)
                }
                _ => Fire::no(Response::Ignored),
            };
        }

        if event.kind == EventKind::Release {
            return Fire::no(Response::Captured);
        }
        let menu_window = (5.min(options.len())) as i32 * row_height;
        match event.input {
            Input::Up | Input::Down => {
                let delta = if event.input == Input::Up { -1 } else { 1 };
                let count = options.len() as i32;
                if count == 0 {
                    return Fire::no(Response::CapturedErr);
                }
                let next = (*hover as i32 + delta).rem_euclid(count);
                *hover = next as usize;
                *scroll = adjust_scroll(
                    next * row_height,
                    row_height,
                    row_height,
                    *scroll,
                    menu_window,
                    count * row_height,
                );
                Fire::no(Response::CapturedDirty)
            }
            Input::Accept => {
                *chosen = *hover;
                elem.flags -= ElemFlags::ACTIVE;
                Fire::yes(Response::CapturedDirty)
            }
            Input::Back => {
                elem.flags -= ElemFlags::ACTIVE;
                Fire::no(Response::CapturedDirty)
            }
            _ => Fire::no(Response::Captured),
        }
    }
}

/// A response plus whether the element's callback fires.
struct Fire {
    response: Response,
    fire: bool,
}

impl Fire {
    fn no(response: Response) -> Fire {
        Fire { response, fire: false }
    }

    fn yes(response: Response) -> Fire {
        Fire { response, fire: true }
    }

    fn map_fire(self, gui: &mut Gui, id: usize) -> Response {
        if self.fire {
            gui.fire(id);
        }
        self.response
    }
}

fn button_event(elem: &mut crate::gui::Element, event: GuiEvent) -> Fire {
    if event.input != Input::Accept {
        return Fire::no(Response::Ignored);
    }
    match event.kind {
        EventKind::Press => {
            elem.flags |= ElemFlags::ACTIVE;
            Fire::no(Response::CapturedDirty)
        }
        EventKind::Hold => Fire::no(Response::Captured),
        EventKind::Release => {
            let was_active = elem.flags.contains(ElemFlags::ACTIVE);
            elem.flags -= ElemFlags::ACTIVE;
            if was_active {
                Fire::yes(Response::CapturedDirty)
            } else {
                Fire::no(Response::Captured)
            }
        }
    }
}

fn textbox_event(elem: &mut crate::gui::Element, event: GuiEvent) -> Fire {
    const BACKSPACE: char = '\u{8}';
    const DELETE: char = '\u{7f}';

    let ElementKind::Textbox { text, cursor } = &mut elem.kind else {
        return Fire::no(Response::Ignored);
    };
    if event.kind == EventKind::Release {
        return Fire::no(Response::Ignored);
    }

    if let Some(c) = event.value {
        match c {
            BACKSPACE => {
                if *cursor == 0 {
                    return Fire::no(Response::CapturedErr);
                }
                let prev = utf8::seek_prev(text.as_bytes(), *cursor);
                text.drain(prev..*cursor);
                *cursor = prev;
            }
            DELETE => {
                if *cursor >= text.len() {
                    return Fire::no(Response::CapturedErr);
                }
                let next = utf8::seek_next(text.as_bytes(), *cursor);
                text.drain(*cursor..next);
            }
            c if c == '\n' || c == '\r' => return Fire::yes(Response::Captured),
            c if !c.is_control() => {
                text.insert(*cursor, c);
                *cursor += c.len_utf8();
            }
            _ => return Fire::no(Response::Ignored),
        }
        return Fire::yes(Response::CapturedDirty);
    }

    match event.input {
        Input::Left => {
            if *cursor == 0 {
                return Fire::no(Response::CapturedErr);
            }
            *cursor = utf8::seek_prev(text.as_bytes(), *cursor);
            Fire::no(Response::CapturedDirty)
        }
        Input::Right => {
            if *cursor >= text.len() {
                return Fire::no(Response::CapturedErr);
            }
            *cursor = utf8::seek_next(text.as_bytes(), *cursor);
            Fire::no(Response::CapturedDirty)
        }
        Input::Accept => match event.kind {
            EventKind::Press => Fire::yes(Response::Captured),
            _ => Fire::no(Response::Captured),
        },
        _ => Fire::no(Response::Ignored),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::test_support::{simple_gui, test_theme};
    use crate::gui::{Element, ElementKind, Gui};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn directional_input_selects_children() {
        let (mut gui, root, _children) = simple_gui();
        assert_eq!(gui.element(root).unwrap().selected, None);
        let response = gui.handle_event(GuiEvent::press(Input::Down));
        assert_eq!(response, Response::CapturedDirty);
        assert_eq!(gui.element(root).unwrap().selected, Some(0));
        gui.handle_event(GuiEvent::press(Input::Down));
        assert_eq!(gui.element(root).unwrap().selected, Some(1));
    }

    #[test]
    fn selection_wraps_on_the_axis() {
        let (mut gui, root, _children) = simple_gui();
        gui.handle_event(GuiEvent::press(Input::Down));
        gui.handle_event(GuiEvent::press(Input::Up));
        // Wrapped from the first row to the last.
        assert_eq!(gui.element(root).unwrap().selected, Some(2));
    }

    #[test]
    fn buttons_fire_on_release() {
        let (mut gui, _root, children) = simple_gui();
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        gui.set_callback(children[0], Box::new(move |_| flag.set(true)));

        gui.handle_event(GuiEvent::press(Input::Down));
        gui.handle_event(GuiEvent::press(Input::Accept));
        assert!(!fired.get());
        gui.handle_event(GuiEvent::release(Input::Accept));
        assert!(fired.get());
    }

    #[test]
    fn events_route_to_the_selected_child_first() {
        let (mut gui, root, children) = simple_gui();
        gui.element_mut(root).unwrap().selected = Some(2);
        gui.handle_event(GuiEvent::character('3'));
        let ElementKind::Textbox { text, cursor } = &gui.element(children[2]).unwrap().kind else {
            panic!("expected a textbox");
        };
        assert_eq!(text, "123");
        assert_eq!(*cursor, 3);
    }

    #[test]
    fn textbox_editing_via_cursor() {
        let (mut gui, root, children) = simple_gui();
        gui.element_mut(root).unwrap().selected = Some(2);
        gui.handle_event(GuiEvent::press(Input::Left));
        gui.handle_event(GuiEvent::character('9'));
        gui.handle_event(GuiEvent::character('\u{8}'));
        let ElementKind::Textbox { text, .. } = &gui.element(children[2]).unwrap().kind else {
            panic!("expected a textbox");
        };
        assert_eq!(text, "12");
        // Cursor-left then backspace at position 1 removes nothing extra.
        gui.handle_event(GuiEvent::character('\u{8}'));
        let ElementKind::Textbox { text, cursor } = &gui.element(children[2]).unwrap().kind else {
            panic!("expected a textbox");
        };
        assert_eq!(text, "2");
        assert_eq!(*cursor, 0);
    }

    #[test]
    fn dropdown_opens_navigates_and_chooses() {
        let mut gui = Gui::new(test_theme());
        let root = gui.add_root(Element::new(ElementKind::grid(1, 1)).sized(64, 32));
        let dd = gui.add_child(
            root,
            Element::new(ElementKind::dropdown(vec!["0".into(), "1".into(), "2".into()])),
        );
        gui.calc_layout(64, 32);
        gui.element_mut(root).unwrap().selected = Some(0);

        gui.handle_event(GuiEvent::press(Input::Accept));
        assert!(gui.element(dd).unwrap().flags.contains(crate::gui::ElemFlags::ACTIVE));

        gui.handle_event(GuiEvent::press(Input::Down));
        gui.handle_event(GuiEvent::press(Input::Down));
        gui.handle_event(GuiEvent::press(Input::Accept));

        let elem = gui.element(dd).unwrap();
        assert!(!elem.flags.contains(crate::gui::ElemFlags::ACTIVE));
        let ElementKind::Dropdown { chosen, .. } = &elem.kind else {
            panic!("expected a dropdown");
        };
        assert_eq!(*chosen, 2);
    }

    #[test]
    fn dropdown_back_cancels() {
        let mut gui = Gui::new(test_theme());
        let root = gui.add_root(Element::new(ElementKind::grid(1, 1)).sized(64, 32));
        let dd = gui.add_child(
            root,
            Element::new(ElementKind::dropdown(vec!["0".into(), "1".into()])),
        );
        gui.calc_layout(64, 32);
        gui.element_mut(root).unwrap().selected = Some(0);

        gui.handle_event(GuiEvent::press(Input::Accept));
        gui.handle_event(GuiEvent::press(Input::Down));
        gui.handle_event(GuiEvent::press(Input::Back));
        let ElementKind::Dropdown { chosen, .. } = &gui.element(dd).unwrap().kind else {
            panic!("expected a dropdown");
        };
        assert_eq!(*chosen, 0);
    }

    #[test]
    fn unhandled_events_bubble_as_ignored() {
        let (mut gui, _root, _children) = simple_gui();
        assert_eq!(gui.handle_event(GuiEvent::press(Input::Back)), Response::Ignored);
    }
}
