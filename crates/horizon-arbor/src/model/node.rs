//! Nodes and their per-column cells.

use horizon_arbor_render::{Color, Font, Image, Rect};
use slotmap::new_key_type;

new_key_type! {
    /// Stable handle to a node in a [`Tree`](crate::Tree).
    ///
    /// Handles stay valid while the node exists and never alias a later node,
    /// so a stale handle simply fails lookup.
    pub struct NodeId;
}

/// Content and overrides for one (node, column) pair.
///
/// Unset colors and fonts fall back to the node, then to the tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub(crate) text: String,
    pub(crate) image: Option<Image>,
    pub(crate) font: Option<Font>,
    pub(crate) background: Option<Color>,
    pub(crate) foreground: Option<Color>,
    pub(crate) bounds: Rect,
}

impl Cell {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }

    /// Bounds from the last layout pass, relative to the tree's client area.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// One entry of the hierarchy.
#[derive(Debug, Clone, Default)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Always holds at least the first column's cell.
    pub(crate) cells: Vec<Cell>,
    pub(crate) expanded: bool,
    pub(crate) checked: bool,
    pub(crate) font: Option<Font>,
    pub(crate) background: Option<Color>,
    pub(crate) foreground: Option<Color>,
    pub(crate) bounds: Rect,
}

impl Node {
    pub(crate) fn new(parent: Option<NodeId>) -> Self {
        Self {
            parent,
            cells: vec![Cell::default()],
            ..Self::default()
        }
    }

    pub(crate) fn cell(&self, column: usize) -> Option<&Cell> {
        self.cells.get(column)
    }

    /// Cell at `column`, creating empty cells up to it.
    pub(crate) fn cell_mut(&mut self, column: usize) -> &mut Cell {
        if self.cells.len() <= column {
            self.cells.resize_with(column + 1, Cell::default);
        }
        &mut self.cells[column]
    }

    pub(crate) fn remove_cell(&mut self, column: usize) {
        if column < self.cells.len() {
            self.cells.remove(column);
        }
        if self.cells.is_empty() {
            self.cells.push(Cell::default());
        }
    }

    pub(crate) fn insert_cell(&mut self, column: usize) {
        if column < self.cells.len() {
            self.cells.insert(column, Cell::default());
        }
    }
}
