//! The tree model: nodes, columns, and interaction state.

use horizon_arbor_render::{Color, Font, Image, Rect};
use slotmap::SlotMap;

use super::column::{Alignment, Column, ColumnId, SortDirection};
use super::node::{Cell, Node, NodeId};
use crate::config::TreeStyle;
use crate::error::{TreeError, TreeResult};
use crate::logging::targets;
use crate::thread_check::ThreadAffinity;

/// One row of the flattened visible list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRow {
    pub node: NodeId,
    /// Number of ancestors.
    pub depth: usize,
    pub has_children: bool,
    /// Only meaningful when `has_children` is set.
    pub expanded: bool,
    /// Whether this is the last child of its parent.
    pub is_last_child: bool,
}

/// Hierarchical data model of a tree widget.
///
/// The tree exclusively owns its nodes and columns. Nodes are addressed by
/// [`NodeId`] and columns by [`ColumnId`]; destroying an entry invalidates its
/// handle and cascades to descendants.
///
/// Every mutation that can change row geometry bumps
/// [`layout_generation`](Self::layout_generation), which is how cached layout
/// is known to be stale.
///
/// # Example
///
/// ```
/// use horizon_arbor::{Tree, TreeStyle};
///
/// let mut tree = Tree::new(TreeStyle::default());
/// let root = tree.create_node(None, None).unwrap();
/// let child = tree.create_node(Some(root), None).unwrap();
/// tree.set_text(child, 0, "child").unwrap();
///
/// assert_eq!(tree.flatten().len(), 1);
/// tree.set_expanded(root, true).unwrap();
/// assert_eq!(tree.flatten().len(), 2);
/// ```
#[derive(Debug)]
pub struct Tree {
    nodes: SlotMap<NodeId, Node>,
    columns: SlotMap<ColumnId, Column>,
    roots: Vec<NodeId>,
    column_order: Vec<ColumnId>,

    header_visible: bool,
    header_background: Option<Color>,
    header_foreground: Option<Color>,
    lines_visible: bool,
    sort_column: Option<ColumnId>,
    sort_direction: SortDirection,

    hover: Option<NodeId>,
    selected: Option<NodeId>,

    font: Font,
    foreground: Color,
    background: Color,
    enabled: bool,
    style: TreeStyle,

    generation: u64,
    disposed: bool,
    affinity: ThreadAffinity,
}

impl Tree {
    /// Create an empty tree bound to the calling thread.
    pub fn new(style: TreeStyle) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            columns: SlotMap::with_key(),
            roots: Vec::new(),
            column_order: Vec::new(),
            header_visible: false,
            header_background: None,
            header_foreground: None,
            lines_visible: false,
            sort_column: None,
            sort_direction: SortDirection::None,
            hover: None,
            selected: None,
            font: Font::default(),
            foreground: Color::BLACK,
            background: Color::WHITE,
            enabled: true,
            style,
            generation: 0,
            disposed: false,
            affinity: ThreadAffinity::current(),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Destroy every node and column. All later operations fail with
    /// [`TreeError::Disposed`].
    pub fn dispose(&mut self) {
        self.affinity.debug_assert_same_thread();
        if self.disposed {
            return;
        }
        tracing::debug!(target: targets::MODEL, nodes = self.nodes.len(), "disposing tree");
        self.nodes.clear();
        self.columns.clear();
        self.roots.clear();
        self.column_order.clear();
        self.hover = None;
        self.selected = None;
        self.sort_column = None;
        self.disposed = true;
        self.invalidate();
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Counter bumped by every geometry-affecting mutation.
    pub fn layout_generation(&self) -> u64 {
        self.generation
    }

    pub fn style(&self) -> &TreeStyle {
        &self.style
    }

    fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn check_live(&self) -> TreeResult<()> {
        self.affinity.debug_assert_same_thread();
        if self.disposed {
            Err(TreeError::Disposed("tree"))
        } else {
            Ok(())
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> TreeResult<&Node> {
        self.check_live()?;
        self.nodes.get(id).ok_or(TreeError::Disposed("node"))
    }

    fn node_mut(&mut self, id: NodeId) -> TreeResult<&mut Node> {
        self.check_live()?;
        self.nodes.get_mut(id).ok_or(TreeError::Disposed("node"))
    }

    fn column(&self, id: ColumnId) -> TreeResult<&Column> {
        self.check_live()?;
        self.columns.get(id).ok_or(TreeError::Disposed("column"))
    }

    fn column_mut(&mut self, id: ColumnId) -> TreeResult<&mut Column> {
        self.check_live()?;
        self.columns.get_mut(id).ok_or(TreeError::Disposed("column"))
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// Create a node under `parent` (a root when `None`).
    ///
    /// `index` positions the node among its siblings; `None` appends.
    ///
    /// # Errors
    ///
    /// [`TreeError::Argument`] if `index` exceeds the sibling count,
    /// [`TreeError::Disposed`] if the parent or tree is gone.
    pub fn create_node(
        &mut self,
        parent: Option<NodeId>,
        index: Option<usize>,
    ) -> TreeResult<NodeId> {
        let count = match parent {
            Some(parent) => self.node(parent)?.children.len(),
            None => {
                self.check_live()?;
                self.roots.len()
            }
        };
        let index = index.unwrap_or(count);
        if index > count {
            return Err(TreeError::argument(format!(
                "node index {index} out of range 0..={count}"
            )));
        }

        let id = self.nodes.insert(Node::new(parent));
        match parent {
            Some(parent) => self.node_mut(parent)?.children.insert(index, id),
            None => self.roots.insert(index, id),
        }
        tracing::trace!(target: targets::MODEL, ?id, ?parent, index, "created node");
        self.invalidate();
        Ok(id)
    }

    /// Destroy a node and all of its descendants.
    ///
    /// Hover and selection pointing into the destroyed subtree are cleared.
    #[tracing::instrument(skip(self), target = "horizon_arbor::model", level = "trace")]
    pub fn destroy_node(&mut self, id: NodeId) -> TreeResult<()> {
        let doomed = self.collect_subtree(id)?;
        tracing::trace!(target: targets::MODEL, ?id, count = doomed.len(), "destroying subtree");

        let parent = self.node(id)?.parent;
        match parent {
            Some(parent) => {
                if let Some(parent) = self.nodes.get_mut(parent) {
                    parent.children.retain(|&child| child != id);
                }
            }
            None => self.roots.retain(|&root| root != id),
        }

        for node in doomed {
            self.nodes.remove(node);
            if self.hover == Some(node) {
                self.hover = None;
            }
            if self.selected == Some(node) {
                self.selected = None;
            }
        }
        self.invalidate();
        Ok(())
    }

    /// `id` followed by all its descendants, children before grandchildren.
    fn collect_subtree(&self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        self.node(id)?;
        let mut result = vec![id];
        let mut cursor = 0;
        while cursor < result.len() {
            if let Some(node) = self.nodes.get(result[cursor]) {
                result.extend_from_slice(&node.children);
            }
            cursor += 1;
        }
        Ok(result)
    }

    /// Destroy every node, keeping columns.
    pub fn remove_all(&mut self) -> TreeResult<()> {
        self.check_live()?;
        self.nodes.clear();
        self.roots.clear();
        self.hover = None;
        self.selected = None;
        self.invalidate();
        Ok(())
    }

    /// Whether `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        !self.disposed && self.nodes.contains_key(id)
    }

    /// Total number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Root-level nodes in order.
    pub fn root_nodes(&self) -> TreeResult<&[NodeId]> {
        self.check_live()?;
        Ok(&self.roots)
    }

    /// Number of children of `parent`, or of root nodes when `None`.
    pub fn item_count(&self, parent: Option<NodeId>) -> TreeResult<usize> {
        Ok(self.children(parent)?.len())
    }

    /// Children of `parent`, or root nodes when `None`.
    pub fn children(&self, parent: Option<NodeId>) -> TreeResult<&[NodeId]> {
        match parent {
            Some(parent) => Ok(&self.node(parent)?.children),
            None => self.root_nodes(),
        }
    }

    /// Child of `parent` at `index`.
    pub fn child(&self, parent: Option<NodeId>, index: usize) -> TreeResult<NodeId> {
        let children = self.children(parent)?;
        children.get(index).copied().ok_or_else(|| {
            TreeError::argument(format!(
                "node index {index} out of range 0..{}",
                children.len()
            ))
        })
    }

    pub fn parent(&self, id: NodeId) -> TreeResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Number of ancestors of `id`.
    pub fn depth(&self, id: NodeId) -> TreeResult<usize> {
        let mut depth = 0;
        let mut current = self.node(id)?.parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes.get(parent).and_then(|n| n.parent);
        }
        Ok(depth)
    }

    /// Position of `child` among the children of `parent`, if it is one.
    pub fn index_of(&self, parent: Option<NodeId>, child: NodeId) -> TreeResult<Option<usize>> {
        self.node(child)?;
        Ok(self.children(parent)?.iter().position(|&c| c == child))
    }

    // =========================================================================
    // Node state
    // =========================================================================

    pub fn is_expanded(&self, id: NodeId) -> TreeResult<bool> {
        Ok(self.node(id)?.expanded)
    }

    /// Expand or collapse a node. Returns whether the state changed.
    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) -> TreeResult<bool> {
        let node = self.node_mut(id)?;
        if node.expanded == expanded {
            return Ok(false);
        }
        node.expanded = expanded;
        tracing::trace!(target: targets::MODEL, ?id, expanded, "expansion changed");
        self.invalidate();
        Ok(true)
    }

    /// Expand every node that has children.
    pub fn expand_all(&mut self) -> TreeResult<()> {
        self.set_all_expanded(true)
    }

    /// Collapse every node.
    pub fn collapse_all(&mut self) -> TreeResult<()> {
        self.set_all_expanded(false)
    }

    fn set_all_expanded(&mut self, expanded: bool) -> TreeResult<()> {
        self.check_live()?;
        for (_, node) in self.nodes.iter_mut() {
            node.expanded = expanded && !node.children.is_empty();
        }
        self.invalidate();
        Ok(())
    }

    pub fn is_checked(&self, id: NodeId) -> TreeResult<bool> {
        Ok(self.node(id)?.checked)
    }

    /// Set the checkbox state. Returns whether the state changed.
    ///
    /// Stored even when the tree is not checkable, but only drawn when it is.
    pub fn set_checked(&mut self, id: NodeId, checked: bool) -> TreeResult<bool> {
        let node = self.node_mut(id)?;
        let changed = node.checked != checked;
        node.checked = checked;
        Ok(changed)
    }

    /// Bounds of the whole row from the last layout pass.
    pub fn bounds(&self, id: NodeId) -> TreeResult<Rect> {
        Ok(self.node(id)?.bounds)
    }

    /// Bounds of one cell from the last layout pass.
    pub fn cell_bounds(&self, id: NodeId, column: usize) -> TreeResult<Rect> {
        self.check_column_index(column)?;
        Ok(self.node(id)?.cell(column).map(Cell::bounds).unwrap_or_default())
    }

    pub(crate) fn record_bounds(&mut self, id: NodeId, row: Rect, cells: &[Rect]) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.bounds = row;
            for (column, bounds) in cells.iter().enumerate() {
                node.cell_mut(column).bounds = *bounds;
            }
        }
    }

    // =========================================================================
    // Cell content
    // =========================================================================

    /// Number of cells a row shows: one per column, at least one.
    pub fn cell_count(&self) -> usize {
        self.column_order.len().max(1)
    }

    fn check_column_index(&self, column: usize) -> TreeResult<()> {
        let count = self.cell_count();
        if column < count {
            Ok(())
        } else {
            Err(TreeError::argument(format!(
                "column index {column} out of range 0..{count}"
            )))
        }
    }

    fn cell_mut(&mut self, id: NodeId, column: usize) -> TreeResult<&mut Cell> {
        self.check_column_index(column)?;
        Ok(self.node_mut(id)?.cell_mut(column))
    }

    /// Text of a cell; empty when never set.
    pub fn text(&self, id: NodeId, column: usize) -> TreeResult<&str> {
        self.check_column_index(column)?;
        Ok(self.node(id)?.cell(column).map(Cell::text).unwrap_or(""))
    }

    pub fn set_text(&mut self, id: NodeId, column: usize, text: impl Into<String>) -> TreeResult<()> {
        self.cell_mut(id, column)?.text = text.into();
        self.invalidate();
        Ok(())
    }

    /// Set the text of consecutive cells starting at the first column.
    pub fn set_texts<S: AsRef<str>>(&mut self, id: NodeId, texts: &[S]) -> TreeResult<()> {
        for (column, text) in texts.iter().enumerate() {
            self.set_text(id, column, text.as_ref())?;
        }
        Ok(())
    }

    pub fn image(&self, id: NodeId, column: usize) -> TreeResult<Option<&Image>> {
        self.check_column_index(column)?;
        Ok(self.node(id)?.cell(column).and_then(Cell::image))
    }

    /// Set or clear the image of a cell.
    ///
    /// # Errors
    ///
    /// [`TreeError::Argument`] if the image was already disposed.
    pub fn set_image(&mut self, id: NodeId, column: usize, image: Option<Image>) -> TreeResult<()> {
        if image.as_ref().is_some_and(Image::is_disposed) {
            return Err(TreeError::argument("image has been disposed"));
        }
        self.cell_mut(id, column)?.image = image;
        self.invalidate();
        Ok(())
    }

    pub fn set_cell_font(&mut self, id: NodeId, column: usize, font: Option<Font>) -> TreeResult<()> {
        self.cell_mut(id, column)?.font = font;
        self.invalidate();
        Ok(())
    }

    pub fn set_cell_background(
        &mut self,
        id: NodeId,
        column: usize,
        color: Option<Color>,
    ) -> TreeResult<()> {
        self.cell_mut(id, column)?.background = color;
        Ok(())
    }

    pub fn set_cell_foreground(
        &mut self,
        id: NodeId,
        column: usize,
        color: Option<Color>,
    ) -> TreeResult<()> {
        self.cell_mut(id, column)?.foreground = color;
        Ok(())
    }

    /// Default font for every cell of the node.
    pub fn set_node_font(&mut self, id: NodeId, font: Option<Font>) -> TreeResult<()> {
        self.node_mut(id)?.font = font;
        self.invalidate();
        Ok(())
    }

    pub fn set_node_background(&mut self, id: NodeId, color: Option<Color>) -> TreeResult<()> {
        self.node_mut(id)?.background = color;
        Ok(())
    }

    pub fn set_node_foreground(&mut self, id: NodeId, color: Option<Color>) -> TreeResult<()> {
        self.node_mut(id)?.foreground = color;
        Ok(())
    }

    /// Effective font of a cell: cell, then node, then tree.
    pub fn cell_font(&self, id: NodeId, column: usize) -> TreeResult<&Font> {
        self.check_column_index(column)?;
        let node = self.node(id)?;
        Ok(node
            .cell(column)
            .and_then(|c| c.font.as_ref())
            .or(node.font.as_ref())
            .unwrap_or(&self.font))
    }

    /// Explicit background of a cell or its node, without the tree fallback.
    pub fn background_override(&self, id: NodeId, column: usize) -> TreeResult<Option<Color>> {
        self.check_column_index(column)?;
        let node = self.node(id)?;
        Ok(node
            .cell(column)
            .and_then(|c| c.background)
            .or(node.background))
    }

    /// Effective background of a cell: cell, then node, then tree.
    pub fn cell_background(&self, id: NodeId, column: usize) -> TreeResult<Color> {
        Ok(self
            .background_override(id, column)?
            .unwrap_or(self.background))
    }

    /// Effective foreground of a cell: cell, then node, then tree.
    pub fn cell_foreground(&self, id: NodeId, column: usize) -> TreeResult<Color> {
        self.check_column_index(column)?;
        let node = self.node(id)?;
        Ok(node
            .cell(column)
            .and_then(|c| c.foreground)
            .or(node.foreground)
            .unwrap_or(self.foreground))
    }

    // =========================================================================
    // Columns
    // =========================================================================

    /// Create a column at `index` (appended when `None`).
    ///
    /// Existing cells at or after `index` shift right with their columns.
    pub fn create_column(&mut self, index: Option<usize>) -> TreeResult<ColumnId> {
        self.check_live()?;
        let count = self.column_order.len();
        let index = index.unwrap_or(count);
        if index > count {
            return Err(TreeError::argument(format!(
                "column index {index} out of range 0..={count}"
            )));
        }
        let id = self.columns.insert(Column::default());
        self.column_order.insert(index, id);
        if index < count {
            for (_, node) in self.nodes.iter_mut() {
                node.insert_cell(index);
            }
        }
        tracing::trace!(target: targets::MODEL, ?id, index, "created column");
        self.invalidate();
        Ok(id)
    }

    /// Destroy a column and the matching cell of every node.
    pub fn destroy_column(&mut self, id: ColumnId) -> TreeResult<()> {
        self.column(id)?;
        let Some(index) = self.column_order.iter().position(|&c| c == id) else {
            return Err(TreeError::Disposed("column"));
        };
        self.column_order.remove(index);
        self.columns.remove(id);
        for (_, node) in self.nodes.iter_mut() {
            node.remove_cell(index);
        }
        if self.sort_column == Some(id) {
            self.sort_column = None;
        }
        tracing::trace!(target: targets::MODEL, ?id, index, "destroyed column");
        self.invalidate();
        Ok(())
    }

    /// Columns in display order.
    pub fn columns(&self) -> &[ColumnId] {
        &self.column_order
    }

    pub fn column_count(&self) -> usize {
        self.column_order.len()
    }

    /// Column at a display index.
    pub fn column_at(&self, index: usize) -> TreeResult<ColumnId> {
        self.check_live()?;
        self.column_order.get(index).copied().ok_or_else(|| {
            TreeError::argument(format!(
                "column index {index} out of range 0..{}",
                self.column_order.len()
            ))
        })
    }

    /// Display index of a column.
    pub fn column_index(&self, id: ColumnId) -> TreeResult<usize> {
        self.column(id)?;
        self.column_order
            .iter()
            .position(|&c| c == id)
            .ok_or(TreeError::Disposed("column"))
    }

    /// Read access to a column's properties.
    pub fn column_info(&self, id: ColumnId) -> TreeResult<&Column> {
        self.column(id)
    }

    pub fn set_column_title(&mut self, id: ColumnId, title: impl Into<String>) -> TreeResult<()> {
        self.column_mut(id)?.title = title.into();
        Ok(())
    }

    pub fn set_column_tooltip(&mut self, id: ColumnId, tooltip: Option<String>) -> TreeResult<()> {
        self.column_mut(id)?.tooltip = tooltip;
        Ok(())
    }

    /// Set a column's width.
    ///
    /// # Errors
    ///
    /// [`TreeError::Argument`] for negative or non-finite widths.
    pub fn set_column_width(&mut self, id: ColumnId, width: f32) -> TreeResult<()> {
        if !width.is_finite() || width < 0.0 {
            return Err(TreeError::argument(format!("invalid column width {width}")));
        }
        let column = self.column_mut(id)?;
        if column.width != width {
            column.width = width;
            self.invalidate();
        }
        Ok(())
    }

    pub fn set_column_alignment(&mut self, id: ColumnId, alignment: Alignment) -> TreeResult<()> {
        self.column_mut(id)?.alignment = alignment;
        Ok(())
    }

    pub fn set_column_moveable(&mut self, id: ColumnId, moveable: bool) -> TreeResult<()> {
        self.column_mut(id)?.moveable = moveable;
        Ok(())
    }

    pub fn set_column_resizable(&mut self, id: ColumnId, resizable: bool) -> TreeResult<()> {
        self.column_mut(id)?.resizable = resizable;
        Ok(())
    }

    /// Reordering columns is not available.
    pub fn set_column_order(&mut self, _order: &[usize]) -> TreeResult<()> {
        self.check_live()?;
        Err(TreeError::Unsupported("set_column_order"))
    }

    // =========================================================================
    // Header, lines and sorting
    // =========================================================================

    pub fn header_visible(&self) -> bool {
        self.header_visible
    }

    pub fn set_header_visible(&mut self, visible: bool) -> TreeResult<()> {
        self.check_live()?;
        self.header_visible = visible;
        Ok(())
    }

    pub fn header_background(&self) -> Color {
        self.header_background.unwrap_or(self.background)
    }

    pub fn set_header_background(&mut self, color: Option<Color>) -> TreeResult<()> {
        self.check_live()?;
        self.header_background = color;
        Ok(())
    }

    pub fn header_foreground(&self) -> Color {
        self.header_foreground.unwrap_or(self.foreground)
    }

    pub fn set_header_foreground(&mut self, color: Option<Color>) -> TreeResult<()> {
        self.check_live()?;
        self.header_foreground = color;
        Ok(())
    }

    pub fn lines_visible(&self) -> bool {
        self.lines_visible
    }

    pub fn set_lines_visible(&mut self, visible: bool) -> TreeResult<()> {
        self.check_live()?;
        self.lines_visible = visible;
        Ok(())
    }

    pub fn sort_column(&self) -> Option<ColumnId> {
        self.sort_column
    }

    /// Choose the column that shows the sort indicator.
    ///
    /// The previous sort column loses its marker.
    pub fn set_sort_column(&mut self, column: Option<ColumnId>) -> TreeResult<()> {
        if let Some(id) = column {
            self.column(id)?;
        } else {
            self.check_live()?;
        }
        if let Some(previous) = self.sort_column
            && Some(previous) != column
            && let Some(previous) = self.columns.get_mut(previous)
        {
            previous.sort_direction = SortDirection::None;
        }
        self.sort_column = column;
        let direction = self.sort_direction;
        if let Some(id) = column
            && let Some(current) = self.columns.get_mut(id)
        {
            current.sort_direction = direction;
        }
        Ok(())
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    /// Set the sort direction, marking the current sort column.
    pub fn set_sort_direction(&mut self, direction: SortDirection) -> TreeResult<()> {
        self.check_live()?;
        self.sort_direction = direction;
        if let Some(id) = self.sort_column
            && let Some(column) = self.columns.get_mut(id)
        {
            column.sort_direction = direction;
        }
        Ok(())
    }

    /// Insert marks are not available.
    pub fn set_insert_mark(&mut self, _node: Option<NodeId>, _before: bool) -> TreeResult<()> {
        self.check_live()?;
        Err(TreeError::Unsupported("set_insert_mark"))
    }

    // =========================================================================
    // Tree-wide appearance
    // =========================================================================

    pub fn font(&self) -> &Font {
        &self.font
    }

    pub fn set_font(&mut self, font: Font) -> TreeResult<()> {
        self.check_live()?;
        self.font = font;
        self.invalidate();
        Ok(())
    }

    pub fn foreground(&self) -> Color {
        self.foreground
    }

    pub fn set_foreground(&mut self, color: Color) -> TreeResult<()> {
        self.check_live()?;
        self.foreground = color;
        Ok(())
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, color: Color) -> TreeResult<()> {
        self.check_live()?;
        self.background = color;
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabled trees draw no highlight and gray text.
    pub fn set_enabled(&mut self, enabled: bool) -> TreeResult<()> {
        self.check_live()?;
        self.enabled = enabled;
        Ok(())
    }

    // =========================================================================
    // Selection and hover
    // =========================================================================

    /// Selected nodes; at most one.
    pub fn selection(&self) -> Vec<NodeId> {
        self.selected.into_iter().collect()
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selected == Some(id)
    }

    /// Replace the selection. Returns the previously selected node.
    pub fn set_selection(&mut self, node: Option<NodeId>) -> TreeResult<Option<NodeId>> {
        match node {
            Some(id) => {
                self.node(id)?;
            }
            None => self.check_live()?,
        }
        Ok(std::mem::replace(&mut self.selected, node))
    }

    pub fn deselect_all(&mut self) -> TreeResult<()> {
        self.set_selection(None).map(|_| ())
    }

    /// Node under the pointer, if any.
    pub fn hover(&self) -> Option<NodeId> {
        self.hover
    }

    pub fn is_hover(&self, id: NodeId) -> bool {
        self.hover == Some(id)
    }

    /// Replace the hover node. Returns the previous one.
    pub(crate) fn set_hover(&mut self, node: Option<NodeId>) -> TreeResult<Option<NodeId>> {
        if let Some(id) = node {
            self.node(id)?;
        }
        Ok(std::mem::replace(&mut self.hover, node))
    }

    // =========================================================================
    // Flattening
    // =========================================================================

    /// Visible rows: a pre-order walk that descends only into expanded nodes.
    pub fn flatten(&self) -> Vec<VisibleRow> {
        let mut rows = Vec::new();
        if self.disposed {
            return rows;
        }
        // (node, depth, is_last_child), popped in pre-order.
        let mut stack: Vec<(NodeId, usize, bool)> = Vec::new();
        Self::push_siblings(&mut stack, &self.roots, 0);
        while let Some((id, depth, is_last_child)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            let has_children = !node.children.is_empty();
            rows.push(VisibleRow {
                node: id,
                depth,
                has_children,
                expanded: node.expanded,
                is_last_child,
            });
            if has_children && node.expanded {
                Self::push_siblings(&mut stack, &node.children, depth + 1);
            }
        }
        rows
    }

    fn push_siblings(stack: &mut Vec<(NodeId, usize, bool)>, siblings: &[NodeId], depth: usize) {
        let last = siblings.len().saturating_sub(1);
        for (position, &id) in siblings.iter().enumerate().rev() {
            stack.push((id, depth, position == last));
        }
    }
}

// Trees move between owners but are used from one thread at a time.
static_assertions::assert_impl_all!(Tree: Send);

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Tree {
        Tree::new(TreeStyle::default())
    }

    fn ids(rows: &[VisibleRow]) -> Vec<NodeId> {
        rows.iter().map(|r| r.node).collect()
    }

    #[test]
    fn test_create_appends_and_inserts() {
        let mut tree = tree();
        let a = tree.create_node(None, None).unwrap();
        let b = tree.create_node(None, None).unwrap();
        let c = tree.create_node(None, Some(1)).unwrap();
        assert_eq!(tree.root_nodes().unwrap(), &[a, c, b]);
        assert_eq!(tree.index_of(None, b).unwrap(), Some(2));
        assert_eq!(tree.child(None, 1).unwrap(), c);
    }

    #[test]
    fn test_create_index_out_of_range() {
        let mut tree = tree();
        let err = tree.create_node(None, Some(1)).unwrap_err();
        assert!(matches!(err, TreeError::Argument(_)));
        let root = tree.create_node(None, None).unwrap();
        assert!(matches!(
            tree.create_node(Some(root), Some(2)),
            Err(TreeError::Argument(_))
        ));
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_depth_and_parent() {
        let mut tree = tree();
        let root = tree.create_node(None, None).unwrap();
        let child = tree.create_node(Some(root), None).unwrap();
        let grandchild = tree.create_node(Some(child), None).unwrap();
        assert_eq!(tree.depth(root).unwrap(), 0);
        assert_eq!(tree.depth(grandchild).unwrap(), 2);
        assert_eq!(tree.parent(grandchild).unwrap(), Some(child));
        assert_eq!(tree.item_count(Some(root)).unwrap(), 1);
    }

    #[test]
    fn test_destroy_cascades_and_clears_interaction() {
        let mut tree = tree();
        let root = tree.create_node(None, None).unwrap();
        let child = tree.create_node(Some(root), None).unwrap();
        let grandchild = tree.create_node(Some(child), None).unwrap();
        let other = tree.create_node(None, None).unwrap();
        tree.set_selection(Some(grandchild)).unwrap();
        tree.set_hover(Some(child)).unwrap();

        tree.destroy_node(child).unwrap();

        assert!(!tree.contains(child));
        assert!(!tree.contains(grandchild));
        assert!(tree.contains(root));
        assert_eq!(tree.selected(), None);
        assert_eq!(tree.hover(), None);
        assert_eq!(tree.item_count(Some(root)).unwrap(), 0);
        assert_eq!(tree.root_nodes().unwrap(), &[root, other]);
        assert_eq!(tree.text(child, 0), Err(TreeError::Disposed("node")));
    }

    #[test]
    fn test_destroy_keeps_unrelated_selection() {
        let mut tree = tree();
        let a = tree.create_node(None, None).unwrap();
        let b = tree.create_node(None, None).unwrap();
        tree.set_selection(Some(a)).unwrap();
        tree.destroy_node(b).unwrap();
        assert_eq!(tree.selection(), vec![a]);
    }

    #[test]
    fn test_flatten_descends_only_into_expanded() {
        let mut tree = tree();
        let r0 = tree.create_node(None, None).unwrap();
        let r1 = tree.create_node(None, None).unwrap();
        let c = tree.create_node(Some(r1), None).unwrap();
        let gc = tree.create_node(Some(c), None).unwrap();
        let r2 = tree.create_node(None, None).unwrap();

        assert_eq!(ids(&tree.flatten()), vec![r0, r1, r2]);

        tree.set_expanded(r1, true).unwrap();
        assert_eq!(ids(&tree.flatten()), vec![r0, r1, c, r2]);

        // Expanded grandparent but collapsed parent hides the grandchild.
        tree.set_expanded(c, true).unwrap();
        let rows = tree.flatten();
        assert_eq!(ids(&rows), vec![r0, r1, c, gc, r2]);
        assert_eq!(rows[3].depth, 2);
        assert!(rows[1].has_children && rows[1].expanded);
        assert!(rows[4].is_last_child);

        tree.set_expanded(r1, false).unwrap();
        assert_eq!(ids(&tree.flatten()), vec![r0, r1, r2]);
    }

    #[test]
    fn test_expand_all_and_collapse_all() {
        let mut tree = tree();
        let root = tree.create_node(None, None).unwrap();
        let child = tree.create_node(Some(root), None).unwrap();
        tree.create_node(Some(child), None).unwrap();
        tree.expand_all().unwrap();
        assert_eq!(tree.flatten().len(), 3);
        tree.collapse_all().unwrap();
        assert_eq!(tree.flatten().len(), 1);
    }

    #[test]
    fn test_flatten_deep_chain() {
        const DEPTH: usize = 30_000;
        let mut tree = tree();
        let mut parent = tree.create_node(None, None).unwrap();
        for _ in 1..DEPTH {
            let child = tree.create_node(Some(parent), None).unwrap();
            tree.set_expanded(parent, true).unwrap();
            parent = child;
        }

        let rows = tree.flatten();
        assert_eq!(rows.len(), DEPTH);
        assert_eq!(rows[DEPTH - 1].node, parent);
        assert_eq!(rows[DEPTH - 1].depth, DEPTH - 1);
        assert!(rows.iter().all(|row| row.is_last_child));
    }

    #[test]
    fn test_generation_tracks_geometry_changes() {
        let mut tree = tree();
        let g0 = tree.layout_generation();
        let root = tree.create_node(None, None).unwrap();
        let g1 = tree.layout_generation();
        assert_ne!(g0, g1);

        // Selection and check state are read at paint time.
        tree.set_selection(Some(root)).unwrap();
        tree.set_checked(root, true).unwrap();
        assert_eq!(tree.layout_generation(), g1);

        assert!(!tree.set_expanded(root, false).unwrap());
        assert_eq!(tree.layout_generation(), g1);

        tree.set_text(root, 0, "x").unwrap();
        assert_ne!(tree.layout_generation(), g1);
    }

    #[test]
    fn test_text_requires_valid_column() {
        let mut tree = tree();
        let node = tree.create_node(None, None).unwrap();
        assert!(matches!(tree.set_text(node, 1, "x"), Err(TreeError::Argument(_))));

        tree.create_column(None).unwrap();
        tree.create_column(None).unwrap();
        tree.set_texts(node, &["a", "b"]).unwrap();
        assert_eq!(tree.text(node, 1).unwrap(), "b");
        assert!(matches!(tree.text(node, 2), Err(TreeError::Argument(_))));
    }

    #[test]
    fn test_style_fallback_chain() {
        let mut tree = tree();
        let node = tree.create_node(None, None).unwrap();
        tree.create_column(None).unwrap();
        tree.create_column(None).unwrap();

        let tree_fg = Color::from_rgb8(1, 1, 1);
        let node_fg = Color::from_rgb8(2, 2, 2);
        let cell_fg = Color::from_rgb8(3, 3, 3);
        tree.set_foreground(tree_fg).unwrap();
        assert_eq!(tree.cell_foreground(node, 1).unwrap(), tree_fg);

        tree.set_node_foreground(node, Some(node_fg)).unwrap();
        assert_eq!(tree.cell_foreground(node, 1).unwrap(), node_fg);

        tree.set_cell_foreground(node, 1, Some(cell_fg)).unwrap();
        assert_eq!(tree.cell_foreground(node, 1).unwrap(), cell_fg);
        assert_eq!(tree.cell_foreground(node, 0).unwrap(), node_fg);

        let bold = Font::default().with_bold(true);
        tree.set_node_font(node, Some(bold.clone())).unwrap();
        assert_eq!(tree.cell_font(node, 0).unwrap(), &bold);

        assert_eq!(tree.background_override(node, 0).unwrap(), None);
        assert_eq!(tree.cell_background(node, 0).unwrap(), Color::WHITE);
    }

    #[test]
    fn test_column_width_validation() {
        let mut tree = tree();
        let column = tree.create_column(None).unwrap();
        assert!(matches!(
            tree.set_column_width(column, -1.0),
            Err(TreeError::Argument(_))
        ));
        assert!(matches!(
            tree.set_column_width(column, f32::NAN),
            Err(TreeError::Argument(_))
        ));
        tree.set_column_width(column, 80.0).unwrap();
        assert_eq!(tree.column_info(column).unwrap().width(), 80.0);
    }

    #[test]
    fn test_column_insert_and_destroy_keep_cells_aligned() {
        let mut tree = tree();
        let first = tree.create_column(None).unwrap();
        let second = tree.create_column(None).unwrap();
        let node = tree.create_node(None, None).unwrap();
        tree.set_texts(node, &["a", "b"]).unwrap();

        let inserted = tree.create_column(Some(0)).unwrap();
        assert_eq!(tree.columns(), &[inserted, first, second]);
        assert_eq!(tree.text(node, 0).unwrap(), "");
        assert_eq!(tree.text(node, 1).unwrap(), "a");
        assert_eq!(tree.text(node, 2).unwrap(), "b");

        tree.destroy_column(first).unwrap();
        assert_eq!(tree.column_index(second).unwrap(), 1);
        assert_eq!(tree.text(node, 1).unwrap(), "b");
        assert_eq!(
            tree.column_info(first).unwrap_err(),
            TreeError::Disposed("column")
        );
    }

    #[test]
    fn test_sort_indicator_moves_with_sort_column() {
        let mut tree = tree();
        let a = tree.create_column(None).unwrap();
        let b = tree.create_column(None).unwrap();
        tree.set_sort_direction(SortDirection::Up).unwrap();
        tree.set_sort_column(Some(a)).unwrap();
        assert_eq!(tree.column_info(a).unwrap().sort_direction(), SortDirection::Up);

        tree.set_sort_column(Some(b)).unwrap();
        assert_eq!(tree.column_info(a).unwrap().sort_direction(), SortDirection::None);
        assert_eq!(tree.column_info(b).unwrap().sort_direction(), SortDirection::Up);

        tree.set_sort_direction(SortDirection::Down).unwrap();
        assert_eq!(tree.column_info(b).unwrap().sort_direction(), SortDirection::Down);

        tree.destroy_column(b).unwrap();
        assert_eq!(tree.sort_column(), None);
    }

    #[test]
    fn test_unsupported_operations() {
        let mut tree = tree();
        assert_eq!(
            tree.set_column_order(&[0]),
            Err(TreeError::Unsupported("set_column_order"))
        );
        assert_eq!(
            tree.set_insert_mark(None, true),
            Err(TreeError::Unsupported("set_insert_mark"))
        );
    }

    #[test]
    fn test_disposed_tree_rejects_operations() {
        let mut tree = tree();
        let node = tree.create_node(None, None).unwrap();
        tree.dispose();
        assert!(tree.is_disposed());
        assert_eq!(tree.create_node(None, None), Err(TreeError::Disposed("tree")));
        assert_eq!(tree.text(node, 0), Err(TreeError::Disposed("tree")));
        assert!(tree.flatten().is_empty());
    }

    #[test]
    fn test_disposed_image_rejected() {
        let mut tree = tree();
        let node = tree.create_node(None, None).unwrap();
        let mut image = Image::new(2, 2).unwrap();
        image.dispose();
        assert!(matches!(
            tree.set_image(node, 0, Some(image)),
            Err(TreeError::Argument(_))
        ));
    }

    #[test]
    fn test_remove_all() {
        let mut tree = tree();
        let root = tree.create_node(None, None).unwrap();
        tree.create_node(Some(root), None).unwrap();
        tree.set_selection(Some(root)).unwrap();
        tree.remove_all().unwrap();
        assert_eq!(tree.node_count(), 0);
        assert!(tree.selection().is_empty());
        assert!(tree.flatten().is_empty());
    }
}
