//! The tree widget: layout caching, painting and pointer handling.

use horizon_arbor_render::{
    DrawingSurface, PaintSessionManager, Point, Rect, Size, SurfaceCapabilities, SurfaceDefaults,
    SurfaceOwnership,
};

use crate::error::{TreeError, TreeResult};
use crate::event::{PointerButton, PointerOutcome, TreeEvent};
use crate::hit_test::{Hit, HitRegion, HitTester};
use crate::layout::{LayoutEngine, LayoutRecord, SizeHint};
use crate::logging::{DumpOptions, LayoutDump, targets};
use crate::measure::TextMeasure;
use crate::model::{ColumnId, NodeId, Tree, VisibleRow};
use crate::row::{RowLayout, RowRenderer};
use crate::scroll::{ScrollBar, ScrollBarPolicy, ScrollBars};

/// Row geometry of one layout pass, tagged with the tree generation it was
/// computed from.
#[derive(Debug, Default)]
struct LayoutCache {
    generation: Option<u64>,
    visible: Vec<VisibleRow>,
    rows: Vec<RowLayout>,
    record: LayoutRecord,
}

/// A custom-drawn tree widget.
///
/// Owns the [`Tree`] model and everything needed to show it: a text measurer,
/// the paint session manager, the widget size, the scroll offset and the
/// optional scrollbars. Layout is recomputed lazily whenever the tree's
/// [`layout_generation`](Tree::layout_generation) moves.
///
/// Pointer coordinates are relative to the widget's top-left corner; the
/// scroll offset maps them into content space.
///
/// # Example
///
/// ```
/// use horizon_arbor::{MonospaceMeasure, PointerButton, Tree, TreeStyle, TreeWidget};
/// use horizon_arbor_render::{Color, DrawingSurface, Point, RasterSurface, Size, SurfaceOwnership};
///
/// let mut surface = RasterSurface::new(200, 100, Color::WHITE).unwrap();
/// let mut tree = Tree::new(TreeStyle::default());
/// let root = tree.create_node(None, None).unwrap();
/// tree.set_text(root, 0, "root").unwrap();
///
/// let mut widget = TreeWidget::new(tree, MonospaceMeasure::default(), surface.capabilities());
/// widget.resize(Size::new(200.0, 100.0)).unwrap();
/// widget.paint(&mut surface, SurfaceOwnership::Caller).unwrap();
///
/// let outcome = widget.pointer_down(Point::new(30.0, 5.0), PointerButton::Primary).unwrap();
/// assert_eq!(widget.tree().selected(), Some(root));
/// assert!(outcome.redraw);
/// ```
pub struct TreeWidget {
    tree: Tree,
    measure: Box<dyn TextMeasure>,
    sessions: PaintSessionManager,
    bounds: Size,
    scroll: Point,
    scrollbars: ScrollBars,
    cache: LayoutCache,
}

impl std::fmt::Debug for TreeWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeWidget")
            .field("tree", &self.tree)
            .field("bounds", &self.bounds)
            .field("scroll", &self.scroll)
            .field("scrollbars", &self.scrollbars)
            .field("strategy", &self.sessions.strategy())
            .finish_non_exhaustive()
    }
}

impl TreeWidget {
    /// Create a widget for a backend with the given capabilities.
    ///
    /// The widget starts with zero size; call [`resize`](Self::resize) before
    /// painting or hit-testing.
    pub fn new(
        tree: Tree,
        measure: impl TextMeasure + 'static,
        capabilities: SurfaceCapabilities,
    ) -> Self {
        Self {
            tree,
            measure: Box::new(measure),
            sessions: PaintSessionManager::new(capabilities),
            bounds: Size::ZERO,
            scroll: Point::ZERO,
            scrollbars: ScrollBars::default(),
            cache: LayoutCache::default(),
        }
    }

    /// Replace the paint session manager, e.g. to use a private background cache.
    pub fn with_session_manager(mut self, sessions: PaintSessionManager) -> Self {
        self.sessions = sessions;
        self
    }

    /// Attach host scrollbars.
    pub fn with_scrollbars(
        mut self,
        horizontal: Option<Box<dyn ScrollBar>>,
        vertical: Option<Box<dyn ScrollBar>>,
    ) -> Self {
        self.scrollbars.horizontal = horizontal;
        self.scrollbars.vertical = vertical;
        self
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Mutable access to the model. Geometry changes are picked up on the
    /// next layout-dependent call.
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn session_manager(&self) -> &PaintSessionManager {
        &self.sessions
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    pub fn size(&self) -> Size {
        self.bounds
    }

    /// Set the widget size. Negative extents are treated as zero.
    pub fn resize(&mut self, size: Size) -> TreeResult<()> {
        self.bounds = Size::new(size.width.max(0.0), size.height.max(0.0));
        tracing::debug!(
            target: targets::LAYOUT,
            width = self.bounds.width,
            height = self.bounds.height,
            "resize"
        );
        self.refresh_layout()?;
        self.update_scrollbars();
        Ok(())
    }

    /// The part of the widget not covered by visible scrollbars.
    pub fn viewport(&self) -> Size {
        self.scrollbars.viewport(self.bounds)
    }

    pub fn set_scrollbar_policy(
        &mut self,
        horizontal: ScrollBarPolicy,
        vertical: ScrollBarPolicy,
    ) -> TreeResult<()> {
        self.scrollbars.horizontal_policy = horizontal;
        self.scrollbars.vertical_policy = vertical;
        self.refresh_layout()?;
        self.update_scrollbars();
        Ok(())
    }

    pub fn horizontal_scrollbar_visible(&self) -> bool {
        self.scrollbars.visible_horizontal().is_some()
    }

    pub fn vertical_scrollbar_visible(&self) -> bool {
        self.scrollbars.visible_vertical().is_some()
    }

    pub fn scroll_offset(&self) -> Point {
        self.scroll
    }

    /// Scroll the content. The offset is clamped so the viewport stays within
    /// the content. Returns whether the offset changed.
    pub fn set_scroll_offset(&mut self, offset: Point) -> TreeResult<bool> {
        self.refresh_layout()?;
        let clamped = self.clamp_scroll(offset);
        let changed = clamped != self.scroll;
        self.scroll = clamped;
        Ok(changed)
    }

    fn clamp_scroll(&self, offset: Point) -> Point {
        let content = self.cache.record.content_size();
        let viewport = self.viewport();
        let max_x = (content.width - viewport.width).max(0.0);
        let max_y = (content.height - viewport.height).max(0.0);
        Point::new(offset.x.clamp(0.0, max_x), offset.y.clamp(0.0, max_y))
    }

    fn update_scrollbars(&mut self) {
        self.scrollbars
            .update(self.bounds, self.cache.record.content_size());
        self.scroll = self.clamp_scroll(self.scroll);
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Recompute row geometry if the tree changed since the last pass.
    fn refresh_layout(&mut self) -> TreeResult<()> {
        if self.tree.is_disposed() {
            return Err(TreeError::Disposed("tree"));
        }
        let generation = self.tree.layout_generation();
        if self.cache.generation == Some(generation) {
            return Ok(());
        }

        let visible = self.tree.flatten();
        let renderer = RowRenderer::new(&self.tree, self.measure.as_ref());
        let rows = visible
            .iter()
            .map(|row| renderer.measure_row(row))
            .collect::<TreeResult<Vec<_>>>()?;
        let sizes: Vec<Size> = rows.iter().map(|row| row.size).collect();
        let record = LayoutEngine::layout(&sizes, Point::ZERO);

        for (row, placed) in rows.iter().zip(record.rows()) {
            let origin = placed.bounds.origin;
            let cells: Vec<Rect> = row
                .cells
                .iter()
                .map(|cell| cell.bounds.offset(origin.x, origin.y))
                .collect();
            self.tree.record_bounds(row.node, placed.bounds, &cells);
        }

        self.cache = LayoutCache {
            generation: Some(generation),
            visible,
            rows,
            record,
        };
        self.update_scrollbars();
        Ok(())
    }

    /// Placement of the visible rows in content coordinates.
    pub fn layout(&mut self) -> TreeResult<&LayoutRecord> {
        self.refresh_layout()?;
        Ok(&self.cache.record)
    }

    /// The flattened visible rows of the current layout.
    pub fn visible_rows(&mut self) -> TreeResult<&[VisibleRow]> {
        self.refresh_layout()?;
        Ok(&self.cache.visible)
    }

    /// Rectangle covering all rows, in content coordinates.
    pub fn client_area(&mut self) -> TreeResult<Rect> {
        Ok(self.layout()?.client_area())
    }

    /// Preferred widget size: the hint on constrained axes, otherwise the
    /// content extent plus any visible scrollbar.
    pub fn compute_size(&mut self, hint: SizeHint) -> TreeResult<Size> {
        self.refresh_layout()?;
        let content = LayoutEngine::with_scrollbars(
            self.cache.record.content_size(),
            self.scrollbars.visible_horizontal(),
            self.scrollbars.visible_vertical(),
        );
        Ok(LayoutEngine::compute_size(content, hint))
    }

    /// Size a column to fit the widest content of its cells in visible rows.
    /// Returns the new width.
    pub fn pack_column(&mut self, column: ColumnId) -> TreeResult<f32> {
        let index = self.tree.column_index(column)?;
        let width = {
            let renderer = RowRenderer::new(&self.tree, self.measure.as_ref());
            let mut width: f32 = 0.0;
            for row in self.tree.flatten() {
                width = width.max(renderer.cell_content_size(row.node, index)?.width);
            }
            width
        };
        self.tree.set_column_width(column, width)?;
        Ok(width)
    }

    /// Outline of the current layout for debugging.
    pub fn dump_layout(&mut self) -> TreeResult<String> {
        self.dump_layout_with(DumpOptions::default())
    }

    pub fn dump_layout_with(&mut self, options: DumpOptions) -> TreeResult<String> {
        self.refresh_layout()?;
        let dump = LayoutDump::new(&self.tree, &self.cache.visible, &self.cache.record)
            .with_options(options);
        Ok(dump.to_string())
    }

    // =========================================================================
    // Hit-testing
    // =========================================================================

    /// Row and region under a widget-relative point.
    pub fn hit(&mut self, point: Point) -> TreeResult<Option<Hit>> {
        self.refresh_layout()?;
        let viewport = Rect::from_origin_size(Point::ZERO, self.viewport());
        if !viewport.contains(point) {
            return Ok(None);
        }
        let content = point.offset(self.scroll.x, self.scroll.y);
        Ok(HitTester::new(&self.cache.record, &self.cache.rows).hit(content))
    }

    /// Node under a widget-relative point.
    pub fn item_at(&mut self, point: Point) -> TreeResult<Option<NodeId>> {
        Ok(self.hit(point)?.map(|hit| hit.node))
    }

    // =========================================================================
    // Pointer input
    // =========================================================================

    /// Handle a button press.
    ///
    /// A press on the disclosure glyph toggles expansion and leaves the
    /// selection alone. A press anywhere else on a row selects it; on the
    /// checkbox it also toggles the checked state. Disabled trees and
    /// non-primary buttons are ignored.
    pub fn pointer_down(
        &mut self,
        point: Point,
        button: PointerButton,
    ) -> TreeResult<PointerOutcome> {
        let hit = self.hit(point)?;
        if button != PointerButton::Primary || !self.tree.is_enabled() {
            return Ok(PointerOutcome::ignored(hit));
        }
        let Some(hit) = hit else {
            return Ok(PointerOutcome::ignored(None));
        };

        let mut outcome = PointerOutcome::ignored(Some(hit));
        let node = hit.node;
        match hit.region {
            HitRegion::Disclosure => {
                let expanded = !self.tree.is_expanded(node)?;
                self.tree.set_expanded(node, expanded)?;
                outcome.push(if expanded {
                    TreeEvent::Expanded(node)
                } else {
                    TreeEvent::Collapsed(node)
                });
            }
            region => {
                if !self.tree.is_selected(node) {
                    let previous = self.tree.set_selection(Some(node))?;
                    outcome.push(TreeEvent::SelectionChanged {
                        previous,
                        current: Some(node),
                    });
                }
                if region == HitRegion::Checkbox {
                    let checked = !self.tree.is_checked(node)?;
                    self.tree.set_checked(node, checked)?;
                    outcome.push(TreeEvent::CheckChanged { node, checked });
                }
            }
        }
        tracing::trace!(
            target: targets::INPUT,
            ?node,
            region = ?hit.region,
            events = outcome.events.len(),
            "pointer down"
        );
        Ok(outcome)
    }

    /// Track the node under the pointer.
    pub fn pointer_move(&mut self, point: Point) -> TreeResult<PointerOutcome> {
        let hit = self.hit(point)?;
        let hover = if self.tree.is_enabled() {
            hit.map(|hit| hit.node)
        } else {
            None
        };
        let mut outcome = PointerOutcome::ignored(hit);
        if self.tree.hover() != hover {
            self.tree.set_hover(hover)?;
            outcome.redraw = true;
        }
        Ok(outcome)
    }

    /// The pointer left the widget.
    pub fn pointer_exit(&mut self) -> TreeResult<PointerOutcome> {
        let mut outcome = PointerOutcome::ignored(None);
        if self.tree.hover().is_some() {
            self.tree.set_hover(None)?;
            outcome.redraw = true;
        }
        Ok(outcome)
    }

    // =========================================================================
    // Painting
    // =========================================================================

    /// Paint the visible rows onto `surface` through a paint session.
    ///
    /// The session commits, disposes and blits on every exit path, including
    /// errors raised while drawing rows.
    pub fn paint<S: DrawingSurface>(
        &mut self,
        surface: &mut S,
        ownership: SurfaceOwnership,
    ) -> TreeResult<()> {
        self.refresh_layout()?;
        let defaults = SurfaceDefaults::new(self.tree.foreground(), self.tree.background())
            .with_font(self.tree.font().clone());
        let viewport = self.viewport();
        let bounds = self.bounds;
        let scroll = self.scroll;
        let tree = &self.tree;
        let cache = &self.cache;
        let measure = self.measure.as_ref();

        let visible = cache.record.visible_range(scroll.y, viewport.height);
        let _span = tracing::debug_span!(
            target: targets::RENDER,
            "paint",
            rows = visible.len(),
            strategy = ?self.sessions.strategy()
        )
        .entered();

        self.sessions
            .paint(surface, bounds, ownership, &defaults, |gc| {
                gc.set_clipping(Some(Rect::from_origin_size(Point::ZERO, viewport)));
                gc.set_background(tree.background());
                gc.fill_rect(Rect::from_origin_size(Point::ZERO, viewport));

                let renderer = RowRenderer::new(tree, measure);
                for index in visible {
                    let (Some(placed), Some(layout)) =
                        (cache.record.row(index), cache.rows.get(index))
                    else {
                        continue;
                    };
                    let origin = placed.bounds.origin.offset(-scroll.x, -scroll.y);
                    renderer.paint_row(gc, layout, origin)?;
                }
                Ok::<_, TreeError>(())
            })
    }
}

#[cfg(test)]
mod tests {
    use horizon_arbor_render::{BackgroundCache, Color, DrawOp, RasterSurface};

    use super::*;
    use crate::config::TreeStyle;
    use crate::measure::MonospaceMeasure;
    use crate::scroll::FixedScrollBar;

    fn raster(width: u32, height: u32) -> RasterSurface {
        RasterSurface::new(width, height, Color::WHITE).unwrap()
    }

    fn widget_with(tree: Tree) -> TreeWidget {
        let capabilities = raster(1, 1).capabilities();
        let mut widget = TreeWidget::new(tree, MonospaceMeasure::default(), capabilities)
            .with_session_manager(
                PaintSessionManager::new(capabilities)
                    .with_background_cache(BackgroundCache::new()),
            );
        widget.resize(Size::new(200.0, 100.0)).unwrap();
        widget
    }

    fn labelled(count: usize) -> (Tree, Vec<NodeId>) {
        let mut tree = Tree::new(TreeStyle::default());
        let nodes = (0..count)
            .map(|i| {
                let node = tree.create_node(None, None).unwrap();
                tree.set_text(node, 0, format!("node{i}")).unwrap();
                node
            })
            .collect();
        (tree, nodes)
    }

    #[test]
    fn test_layout_follows_model_changes() {
        let (mut tree, nodes) = labelled(2);
        let child = tree.create_node(Some(nodes[0]), None).unwrap();
        let mut widget = widget_with(tree);
        assert_eq!(widget.layout().unwrap().len(), 2);

        widget.tree_mut().set_expanded(nodes[0], true).unwrap();
        assert_eq!(widget.layout().unwrap().len(), 3);
        assert_eq!(widget.tree().bounds(child).unwrap().top(), 18.0);
        assert_eq!(widget.client_area().unwrap().height(), 54.0);
    }

    #[test]
    fn test_pointer_down_selects_then_keeps() {
        let (tree, nodes) = labelled(2);
        let mut widget = widget_with(tree);

        let outcome = widget.pointer_down(Point::new(30.0, 25.0), PointerButton::Primary).unwrap();
        assert_eq!(
            outcome.events,
            vec![TreeEvent::SelectionChanged {
                previous: None,
                current: Some(nodes[1]),
            }]
        );
        assert_eq!(outcome.hit.map(|h| h.region), Some(HitRegion::Cell(0)));

        let again = widget.pointer_down(Point::new(30.0, 25.0), PointerButton::Primary).unwrap();
        assert!(again.events.is_empty());
        assert!(!again.redraw);
    }

    #[test]
    fn test_secondary_button_ignored() {
        let (tree, _) = labelled(1);
        let mut widget = widget_with(tree);
        let outcome = widget.pointer_down(Point::new(30.0, 5.0), PointerButton::Secondary).unwrap();
        assert!(outcome.is_empty());
        assert!(outcome.hit.is_some());
        assert!(widget.tree().selection().is_empty());
    }

    #[test]
    fn test_checkbox_click_toggles_and_selects() {
        let mut tree = Tree::new(TreeStyle::default().with_checkable(true));
        let node = tree.create_node(None, None).unwrap();
        let mut widget = widget_with(tree);

        let outcome = widget.pointer_down(Point::new(25.0, 8.0), PointerButton::Primary).unwrap();
        assert_eq!(outcome.events.len(), 2);
        assert_eq!(
            outcome.events[1],
            TreeEvent::CheckChanged {
                node,
                checked: true
            }
        );
        assert!(widget.tree().is_checked(node).unwrap());

        let outcome = widget.pointer_down(Point::new(25.0, 8.0), PointerButton::Primary).unwrap();
        assert_eq!(
            outcome.events,
            vec![TreeEvent::CheckChanged {
                node,
                checked: false
            }]
        );
    }

    #[test]
    fn test_checkbox_click_shows_in_next_paint() {
        let checked = Color::from_rgb8(0, 95, 184).to_rgb8();
        let unchecked = Color::from_rgb8(243, 243, 243).to_rgb8();
        let mut tree = Tree::new(TreeStyle::default().with_checkable(true));
        let node = tree.create_node(None, None).unwrap();
        tree.set_text(node, 0, "item").unwrap();
        let mut widget = widget_with(tree);

        let mut before = raster(200, 100);
        widget.paint(&mut before, SurfaceOwnership::Caller).unwrap();
        assert_eq!(before.pixel(30, 13).unwrap().to_rgb8(), unchecked);

        widget.pointer_down(Point::new(25.0, 8.0), PointerButton::Primary).unwrap();
        let mut after = raster(200, 100);
        widget.paint(&mut after, SurfaceOwnership::Caller).unwrap();
        assert_eq!(after.pixel(30, 13).unwrap().to_rgb8(), checked);

        widget.tree_mut().set_checked(node, false).unwrap();
        let mut cleared = raster(200, 100);
        widget.paint(&mut cleared, SurfaceOwnership::Caller).unwrap();
        assert_eq!(cleared.pixel(30, 13).unwrap().to_rgb8(), unchecked);
    }

    #[test]
    fn test_hover_tracking() {
        let (tree, nodes) = labelled(2);
        let mut widget = widget_with(tree);

        assert!(widget.pointer_move(Point::new(20.0, 5.0)).unwrap().redraw);
        assert_eq!(widget.tree().hover(), Some(nodes[0]));
        assert!(!widget.pointer_move(Point::new(25.0, 6.0)).unwrap().redraw);
        assert!(widget.pointer_move(Point::new(25.0, 20.0)).unwrap().redraw);
        assert_eq!(widget.tree().hover(), Some(nodes[1]));

        assert!(widget.pointer_move(Point::new(25.0, 90.0)).unwrap().redraw);
        assert_eq!(widget.tree().hover(), None);

        widget.pointer_move(Point::new(20.0, 5.0)).unwrap();
        assert!(widget.pointer_exit().unwrap().redraw);
        assert_eq!(widget.tree().hover(), None);
        assert!(!widget.pointer_exit().unwrap().redraw);
    }

    #[test]
    fn test_disabled_tree_ignores_input() {
        let (mut tree, _) = labelled(1);
        tree.set_enabled(false).unwrap();
        let mut widget = widget_with(tree);
        let outcome = widget.pointer_down(Point::new(30.0, 5.0), PointerButton::Primary).unwrap();
        assert!(outcome.events.is_empty());
        widget.pointer_move(Point::new(30.0, 5.0)).unwrap();
        assert_eq!(widget.tree().hover(), None);
    }

    #[test]
    fn test_scroll_offset_maps_points() {
        let (tree, nodes) = labelled(10);
        let mut widget = widget_with(tree);
        widget.resize(Size::new(200.0, 36.0)).unwrap();

        assert!(widget.set_scroll_offset(Point::new(0.0, 36.0)).unwrap());
        assert_eq!(widget.item_at(Point::new(30.0, 1.0)).unwrap(), Some(nodes[2]));

        // Clamped to content height minus viewport height.
        widget.set_scroll_offset(Point::new(0.0, 1000.0)).unwrap();
        assert_eq!(widget.scroll_offset().y, 180.0 - 36.0);
        assert_eq!(widget.item_at(Point::new(30.0, 35.0)).unwrap(), Some(nodes[9]));
        assert_eq!(widget.item_at(Point::new(30.0, 36.0)).unwrap(), None);
    }

    #[test]
    fn test_scrollbars_follow_content() {
        let (tree, _) = labelled(10);
        let mut widget = widget_with(tree).with_scrollbars(
            Some(Box::new(FixedScrollBar::horizontal(15.0))),
            Some(Box::new(FixedScrollBar::vertical(15.0))),
        );
        widget.resize(Size::new(200.0, 100.0)).unwrap();
        assert!(widget.vertical_scrollbar_visible());
        assert!(!widget.horizontal_scrollbar_visible());
        assert_eq!(widget.viewport(), Size::new(185.0, 100.0));

        let preferred = widget.compute_size(SizeHint::UNCONSTRAINED).unwrap();
        let content = widget.layout().unwrap().content_size();
        assert_eq!(preferred, Size::new(content.width + 15.0, 180.0));

        widget
            .set_scrollbar_policy(ScrollBarPolicy::AsNeeded, ScrollBarPolicy::AlwaysOff)
            .unwrap();
        assert!(!widget.vertical_scrollbar_visible());
    }

    #[test]
    fn test_compute_size_respects_hint() {
        let (tree, _) = labelled(3);
        let mut widget = widget_with(tree);
        let size = widget.compute_size(SizeHint::new(Some(50.0), None)).unwrap();
        assert_eq!(size, Size::new(50.0, 54.0));
    }

    #[test]
    fn test_pack_column() {
        let (mut tree, nodes) = labelled(2);
        let column = tree.create_column(None).unwrap();
        tree.set_text(nodes[1], 0, "a much longer label").unwrap();
        let mut widget = widget_with(tree);
        let width = widget.pack_column(column).unwrap();
        assert_eq!(width, 19.0 * 7.0);
        assert_eq!(widget.tree().column_info(column).unwrap().width(), width);
    }

    #[test]
    fn test_paint_draws_visible_rows_only() {
        let (tree, _) = labelled(10);
        let mut widget = widget_with(tree);
        widget.resize(Size::new(200.0, 36.0)).unwrap();
        widget.set_scroll_offset(Point::new(0.0, 18.0)).unwrap();

        let mut surface = raster(200, 36);
        widget.paint(&mut surface, SurfaceOwnership::Caller).unwrap();
        assert!(!surface.is_disposed());
        assert_eq!(widget.session_manager().ledger().live_buffers(), 0);
        assert_eq!(widget.session_manager().ledger().open_sessions(), 0);
        assert_eq!(surface.commit_count(), 1);
    }

    #[test]
    fn test_paint_texts_in_order() {
        let (tree, _) = labelled(3);
        let mut widget = widget_with(tree);
        let mut surface = raster(200, 100);
        let capabilities = surface.capabilities();
        let manager = PaintSessionManager::new(SurfaceCapabilities {
            avoids_tearing: true,
            ..capabilities
        });
        widget = widget.with_session_manager(manager);
        widget.paint(&mut surface, SurfaceOwnership::Caller).unwrap();

        let texts: Vec<(String, Point)> = surface
            .draw_ops()
            .filter_map(|op| match op {
                DrawOp::Text { text, at } => Some((text.clone(), *at)),
                _ => None,
            })
            .collect();
        assert_eq!(
            texts,
            vec![
                ("node0".to_string(), Point::new(17.0, 1.0)),
                ("node1".to_string(), Point::new(17.0, 19.0)),
                ("node2".to_string(), Point::new(17.0, 37.0)),
            ]
        );
    }

    #[test]
    fn test_disposed_tree() {
        let (tree, _) = labelled(1);
        let mut widget = widget_with(tree);
        widget.tree_mut().dispose();
        assert_eq!(
            widget.pointer_down(Point::new(1.0, 1.0), PointerButton::Primary),
            Err(TreeError::Disposed("tree"))
        );
        let mut surface = raster(10, 10);
        assert_eq!(
            widget.paint(&mut surface, SurfaceOwnership::Caller),
            Err(TreeError::Disposed("tree"))
        );
        assert!(!surface.is_disposed());
    }

    #[test]
    fn test_dump_layout() {
        let (tree, _) = labelled(2);
        let mut widget = widget_with(tree);
        let dump = widget.dump_layout_with(DumpOptions::minimal()).unwrap();
        assert_eq!(dump, "Layout (2 rows, content 52x36):\nnode0\nnode1\n");
    }
}
