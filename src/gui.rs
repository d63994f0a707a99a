//! A small retained widget layer on top of the rasterizer.
//!
//! Elements live in a tree; grids lay their children out in cells, input
//! events route to the selected descendant chain and bubble back up, and
//! drawing either repaints everything or just the subtrees marked dirty.
//! Intended for d-pad style navigation on small displays.

use bitflags::bitflags;

use crate::canvas::Canvas;
use crate::geom::Vec2i;

mod draw;
mod event;
mod layout;
mod theme;

pub use event::{EventKind, GuiEvent, Input, ModKeys, Response};
pub use theme::Theme;

bitflags! {
    /// Per-element state and behavior flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ElemFlags: u32 {
        /// Not drawn, not selectable, children included.
        const HIDDEN = 0x0001;
        /// Drawn greyed out; ignores events, children included.
        const INACTIVE = 0x0002;
        /// Needs re-draw on the next `redraw` call.
        const DIRTY = 0x0004;
        /// Do not paint the element background.
        const NO_BACKGROUND = 0x0100;
        /// Grid: do not draw separators between cells.
        const NO_SEPARATOR = 0x0200;
        /// Button pressed / dropdown opened.
        const ACTIVE = 0x0400;
        /// Draw with the highlighted border.
        const HIGHLIGHT = 0x0800;
        /// Stretch to fill the parent grid cell.
        const FILL_CELL = 0x1000;
        /// Skip the theme padding inside this element.
        const NO_PADDING = 0x2000;
    }
}

/// Flags that children inherit from their parents during drawing and event
/// routing.
pub(crate) const INHERITED_FLAGS: ElemFlags = ElemFlags::HIDDEN.union(ElemFlags::INACTIVE);

/// What an element is, plus its kind-specific state.
#[derive(Debug)]
pub enum ElementKind {
    /// Plain container drawing a background behind its children.
    Panel,
    /// Children arranged in a `cells.x` × `cells.y` grid, row-major.
    Grid {
        cells: Vec2i,
        /// Computed column widths and row heights, filled by layout.
        col_width: Vec<i32>,
        row_height: Vec<i32>,
    },
    /// Press-to-activate button with a centered label.
    Button { label: String },
    /// Static text.
    Label { text: String },
    /// Single-line editable text with a byte cursor.
    Textbox { text: String, cursor: usize },
    /// One-of-many chooser; opens an overlay menu when activated.
    Dropdown {
        options: Vec<String>,
        chosen: usize,
        /// First visible row of the open menu, kept adjusted so the
        /// selection plus one row of margin stays visible.
        scroll: i32,
        /// Row navigated to while the menu is open.
        hover: usize,
    },
}

/// Static attributes of an element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Attrs {
    pub selectable: bool,
    /// Uses the input color scheme.
    pub input: bool,
    /// Uses the button color scheme.
    pub button: bool,
    /// Content size may exceed the element size.
    pub scrollable: bool,
}

impl ElementKind {
    pub(crate) fn attrs(&self) -> Attrs {
        match self {
            ElementKind::Panel => Attrs::default(),
            ElementKind::Grid { .. } => Attrs {
                selectable: true,
                ..Attrs::default()
            },
            ElementKind::Button { .. } => Attrs {
                selectable: true,
                button: true,
                ..Attrs::default()
            },
            ElementKind::Label { .. } => Attrs::default(),
            ElementKind::Textbox { .. } => Attrs {
                selectable: true,
                input: true,
                scrollable: true,
                ..Attrs::default()
            },
            ElementKind::Dropdown { .. } => Attrs {
                selectable: true,
                button: true,
                ..Attrs::default()
            },
        }
    }

    /// Shorthand constructors.
    pub fn button(label: impl Into<String>) -> ElementKind {
        ElementKind::Button { label: label.into() }
    }

    pub fn label(text: impl Into<String>) -> ElementKind {
        ElementKind::Label { text: text.into() }
    }

    pub fn textbox(text: impl Into<String>) -> ElementKind {
        let text = text.into();
        ElementKind::Textbox {
            cursor: text.len(),
            text,
        }
    }

    pub fn dropdown(options: Vec<String>) -> ElementKind {
        ElementKind::Dropdown {
            options,
            chosen: 0,
            scroll: 0,
            hover: 0,
        }
    }

    pub fn grid(cols: i32, rows: i32) -> ElementKind {
        ElementKind::Grid {
            cells: Vec2i::new(cols, rows),
            col_width: vec![0; cols.max(0) as usize],
            row_height: vec![0; rows.max(0) as usize],
        }
    }
}

/// One node of the widget tree.
#[derive(Debug)]
pub struct Element {
    pub kind: ElementKind,
    pub flags: ElemFlags,
    /// Position relative to the parent.
    pub pos: Vec2i,
    pub size: Vec2i,
    /// Size of the content, which may exceed `size` for scrollable kinds.
    pub content_size: Vec2i,
    pub scroll: Vec2i,
    /// Selected child index, for containers.
    pub selected: Option<usize>,
}

impl Element {
    pub fn new(kind: ElementKind) -> Element {
        Element {
            kind,
            flags: ElemFlags::FILL_CELL,
            pos: Vec2i::default(),
            size: Vec2i::default(),
            content_size: Vec2i::default(),
            scroll: Vec2i::default(),
            selected: None,
        }
    }

    pub fn with_flags(mut self, flags: ElemFlags) -> Element {
        self.flags = flags;
        self
    }

    pub fn at(mut self, x: i32, y: i32) -> Element {
        self.pos = Vec2i::new(x, y);
        self
    }

    pub fn sized(mut self, w: i32, h: i32) -> Element {
        self.size = Vec2i::new(w, h);
        self
    }
}

/// Callback invoked when a button fires, a textbox changes or submits, or a
/// dropdown choice lands. Receives the element id.
pub type Callback = Box<dyn FnMut(usize)>;

/// The widget tree plus its theme and callback registry.
///
/// # Examples
///
/// ```
/// use trama::gui::{Element, ElementKind, Gui, Theme};
/// use trama::{Canvas, PixelFormat};
///
/// let mut gui = Gui::new(Theme::default());
/// let root = gui.add_root(Element::new(ElementKind::grid(1, 2)));
/// gui.add_child(root, Element::new(ElementKind::label("hello")));
/// gui.add_child(root, Element::new(ElementKind::button("ok")));
///
/// let mut canvas = Canvas::new(128, 64, PixelFormat::Argb8888).unwrap();
/// gui.calc_layout(canvas.width(), canvas.height());
/// gui.draw(&mut canvas);
/// ```
pub struct Gui {
    pub(crate) tree: easy_tree::Tree<Element>,
    pub(crate) theme: Theme,
    callbacks: ahash::HashMap<usize, Callback>,
    root: Option<usize>,
}

impl Gui {
    pub fn new(theme: Theme) -> Gui {
        Gui {
            tree: easy_tree::Tree::new(),
            theme,
            callbacks: ahash::HashMap::default(),
            root: None,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Installs the root element, replacing any existing tree.
    pub fn add_root(&mut self, element: Element) -> usize {
        self.tree.clear();
        self.callbacks.clear();
        let id = self.tree.add_node(element);
        self.root = Some(id);
        id
    }

    /// Appends a child under `parent`; children of a grid fill its cells in
    /// row-major order.
    pub fn add_child(&mut self, parent: usize, element: Element) -> usize {
        self.tree.add_child(parent, element)
    }

    pub fn root(&self) -> Option<usize> {
        self.root
    }

    pub fn element(&self, id: usize) -> Option<&Element> {
        self.tree.get(id)
    }

    pub fn element_mut(&mut self, id: usize) -> Option<&mut Element> {
        self.tree.get_mut(id)
    }

    /// Registers the action fired by `id`.
    pub fn set_callback(&mut self, id: usize, callback: Callback) {
        self.callbacks.insert(id, callback);
    }

    /// Marks an element (and so its subtree) for the next `redraw`.
    pub fn mark_dirty(&mut self, id: usize) {
        if let Some(elem) = self.tree.get_mut(id) {
            elem.flags |= ElemFlags::DIRTY;
        }
    }

    pub(crate) fn fire(&mut self, id: usize) {
        if let Some(callback) = self.callbacks.get_mut(&id) {
            callback(id);
        }
    }

    /// Absolute position of an element, summing ancestor offsets and
    /// subtracting ancestor scrolls.
    pub(crate) fn absolute_pos(&self, id: usize) -> Vec2i {
        let mut pos = Vec2i::default();
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(elem) = self.tree.get(node) {
                pos.x += elem.pos.x;
                pos.y += elem.pos.y;
            }
            current = self.tree.parent_index_unchecked(node);
            if let Some(parent) = current {
                if let Some(elem) = self.tree.get(parent) {
                    pos.x -= elem.scroll.x;
                    pos.y -= elem.scroll.y;
                }
            }
        }
        pos
    }
}

/// Canvas-facing entry points, mirroring the draw/redraw split.
impl Gui {
    /// Fully repaints the tree.
    pub fn draw(&mut self, canvas: &mut Canvas) {
        let Some(root) = self.root else {
            return;
        };
        draw::draw_subtree(self, canvas, root);
        self.clear_dirty(root);
    }

    /// Repaints only subtrees whose dirty flag is set, clearing the flag.
    pub fn redraw(&mut self, canvas: &mut Canvas) {
        let Some(root) = self.root else {
            return;
        };
        draw::redraw_dirty(self, canvas, root);
    }

    fn clear_dirty(&mut self, id: usize) {
        if let Some(elem) = self.tree.get_mut(id) {
            elem.flags -= ElemFlags::DIRTY;
        }
        let children: Vec<usize> = self.tree.children(id).to_vec();
        for child in children {
            self.clear_dirty(child);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::simple_gui;
    use super::*;

    #[test]
    fn tree_construction_and_lookup() {
        let (gui, root, children) = simple_gui();
        assert_eq!(gui.root(), Some(root));
        assert_eq!(gui.tree.children(root).len(), 3);
        assert!(matches!(
            gui.element(children[0]).unwrap().kind,
            ElementKind::Button { .. }
        ));
    }

    #[test]
    fn absolute_positions_accumulate() {
        let (gui, root, children) = simple_gui();
        let root_pos = gui.absolute_pos(root);
        let child_pos = gui.absolute_pos(children[1]);
        assert!(child_pos.y > root_pos.y);
    }

    #[test]
    fn marking_dirty_sets_the_flag() {
        let (mut gui, _root, children) = simple_gui();
        gui.mark_dirty(children[0]);
        assert!(gui
            .element(children[0])
            .unwrap()
            .flags
            .contains(ElemFlags::DIRTY));
    }
}
