//! Per-row measurement and painting.
//!
//! A row is laid out left to right: the indentation, the disclosure glyph
//! band, the checkbox band in checkable trees, then one cell per column. All
//! rectangles in a [`RowLayout`] are relative to the row's top-left corner.

use horizon_arbor_render::{Color, DrawingSurface, Point, Rect, RoundedRect, Size};

use crate::config::{POLYLINE_CHECK, POLYLINE_CLOSED, POLYLINE_OPEN};
use crate::error::TreeResult;
use crate::logging::targets;
use crate::measure::{TextFlags, TextMeasure};
use crate::model::{NodeId, Tree, VisibleRow};

/// Disclosure glyph placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disclosure {
    /// Clickable band, full row height.
    pub bounds: Rect,
    pub expanded: bool,
}

/// Placement of one cell and its content.
#[derive(Debug, Clone, PartialEq)]
pub struct CellLayout {
    pub column: usize,
    pub bounds: Rect,
    pub image: Option<Rect>,
    pub text: Option<Rect>,
}

/// Measured geometry of one row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub node: NodeId,
    pub depth: usize,
    /// Present only when the node has children.
    pub disclosure: Option<Disclosure>,
    /// Present only in checkable trees.
    pub checkbox: Option<Rect>,
    pub cells: Vec<CellLayout>,
    /// Preferred row size.
    pub size: Size,
}

/// Highlight drawn behind a row's cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighlightState {
    #[default]
    Idle,
    Hover,
    Selected,
}

impl HighlightState {
    /// Highlight for `node`; disabled trees never highlight.
    pub fn of(tree: &Tree, node: NodeId) -> Self {
        if !tree.is_enabled() {
            HighlightState::Idle
        } else if tree.is_selected(node) {
            HighlightState::Selected
        } else if tree.is_hover(node) {
            HighlightState::Hover
        } else {
            HighlightState::Idle
        }
    }

    /// `(border, fill)` blend ratios toward the accent.
    pub fn ratios(self) -> Option<(f32, f32)> {
        match self {
            HighlightState::Idle => None,
            HighlightState::Hover => Some((0.1, 0.1)),
            HighlightState::Selected => Some((0.4, 0.2)),
        }
    }
}

/// Shift one channel from `base` toward `accent` by `ratio`.
#[inline]
pub fn blend_channel(base: u8, accent: u8, ratio: f32) -> u8 {
    let base = f32::from(base);
    let shifted = base - (base - f32::from(accent)) * ratio;
    shifted.round().clamp(0.0, 255.0) as u8
}

/// Shift an RGB color toward `accent` by `ratio`.
pub fn blend(base: [u8; 3], accent: [u8; 3], ratio: f32) -> Color {
    Color::from_rgb8(
        blend_channel(base[0], accent[0], ratio),
        blend_channel(base[1], accent[1], ratio),
        blend_channel(base[2], accent[2], ratio),
    )
}

/// Measured content of one cell, before it is placed in a row.
struct CellContent {
    image: Option<Size>,
    text: Option<Size>,
}

/// Measures and paints the rows of one tree.
pub struct RowRenderer<'a> {
    tree: &'a Tree,
    measure: &'a dyn TextMeasure,
}

impl<'a> RowRenderer<'a> {
    pub fn new(tree: &'a Tree, measure: &'a dyn TextMeasure) -> Self {
        Self { tree, measure }
    }

    fn content(&self, node: NodeId, column: usize) -> TreeResult<CellContent> {
        let image = self.tree.image(node, column)?.map(|image| image.size());
        let text = self.tree.text(node, column)?;
        let text = if text.trim().is_empty() {
            None
        } else {
            let font = self.tree.cell_font(node, column)?;
            Some(self.measure.measure(font, TextFlags::CELL, text))
        };
        Ok(CellContent { image, text })
    }

    fn content_extent(&self, content: &CellContent) -> Size {
        let metrics = &self.tree.style().metrics;
        let image = content.image.unwrap_or_default();
        let text = content.text.unwrap_or_default();
        let spacing = if content.image.is_some() && content.text.is_some() {
            metrics.cell_spacing
        } else {
            0.0
        };
        if content.image.is_none() && content.text.is_none() {
            return Size::ZERO;
        }
        Size::new(
            image.width + spacing + text.width,
            metrics.padding_top + image.height.max(text.height),
        )
    }

    /// Preferred size of a cell's content: image, spacing and text side by side.
    pub fn cell_content_size(&self, node: NodeId, column: usize) -> TreeResult<Size> {
        let content = self.content(node, column)?;
        Ok(self.content_extent(&content))
    }

    /// Lay out one visible row.
    pub fn measure_row(&self, row: &VisibleRow) -> TreeResult<RowLayout> {
        let style = self.tree.style();
        let metrics = &style.metrics;
        let node = row.node;

        let indent = metrics.indent(row.depth);
        let mut x = metrics.content_start(row.depth);

        let checkbox = style.checkable.then(|| {
            let rect = metrics.checkbox_box.offset(x, 0.0);
            x += style.checkbox_width();
            rect
        });

        let column_count = self.tree.cell_count();
        let mut contents = Vec::with_capacity(column_count);
        let mut height = metrics.default_row_height;
        for column in 0..column_count {
            let content = self.content(node, column)?;
            let extent = self.content_extent(&content);
            height = height.max(extent.height);
            let width = match self.tree.columns().get(column) {
                Some(&id) => self.tree.column_info(id)?.width(),
                None => extent.width,
            };
            contents.push((content, width));
        }

        let mut cells = Vec::with_capacity(column_count);
        for (column, (content, width)) in contents.into_iter().enumerate() {
            let bounds = Rect::new(x, 0.0, width, height);
            let image = content
                .image
                .map(|size| Rect::new(x, metrics.padding_top, size.width, size.height));
            let text_x = match image {
                Some(image) => image.right() + metrics.cell_spacing,
                None => x,
            };
            let text = content
                .text
                .map(|size| Rect::new(text_x, metrics.padding_top, size.width, size.height));
            cells.push(CellLayout {
                column,
                bounds,
                image,
                text,
            });
            x += width;
        }

        let disclosure = row.has_children.then(|| Disclosure {
            bounds: Rect::new(indent, 0.0, metrics.indent_width, height),
            expanded: row.expanded,
        });

        Ok(RowLayout {
            node,
            depth: row.depth,
            disclosure,
            checkbox,
            cells,
            size: Size::new(x, height),
        })
    }

    /// Paint a measured row with its top-left corner at `origin`.
    pub fn paint_row(
        &self,
        gc: &mut dyn DrawingSurface,
        layout: &RowLayout,
        origin: Point,
    ) -> TreeResult<()> {
        tracing::trace!(target: targets::RENDER, node = ?layout.node, y = origin.y, "paint row");
        self.paint_disclosure(gc, layout, origin);
        self.paint_checkbox(gc, layout, origin)?;
        self.paint_cells(gc, layout, origin)
    }

    fn paint_disclosure(&self, gc: &mut dyn DrawingSurface, layout: &RowLayout, origin: Point) {
        let Some(disclosure) = layout.disclosure else {
            return;
        };
        let palette = &self.tree.style().palette;
        let (glyph, color) = if disclosure.expanded {
            (&POLYLINE_OPEN, palette.disclosure_open)
        } else {
            (&POLYLINE_CLOSED, palette.disclosure_closed)
        };
        let dx = origin.x + disclosure.bounds.left();
        let points: Vec<Point> = glyph.iter().map(|p| p.offset(dx, origin.y)).collect();

        gc.set_foreground(color);
        gc.set_antialias(true);
        gc.set_line_width(self.tree.style().metrics.glyph_line_width);
        gc.draw_polyline(&points);
    }

    /// Checked state is read from the tree, so toggles show without a relayout.
    fn paint_checkbox(
        &self,
        gc: &mut dyn DrawingSurface,
        layout: &RowLayout,
        origin: Point,
    ) -> TreeResult<()> {
        let Some(checkbox) = layout.checkbox else {
            return Ok(());
        };
        let style = self.tree.style();
        let palette = &style.palette;
        let rect = checkbox.offset(origin.x, origin.y);

        if self.tree.is_checked(layout.node)? {
            let points: Vec<Point> = POLYLINE_CHECK
                .iter()
                .map(|p| p.offset(rect.left(), rect.top()))
                .collect();
            gc.set_line_width(style.metrics.glyph_line_width);
            gc.set_background(palette.checkbox_checked);
            gc.set_foreground(palette.check_mark);
            gc.set_antialias(true);
            gc.fill_rect(rect);
            gc.draw_polyline(&points);
        } else {
            gc.set_line_width(1.0);
            gc.set_background(palette.checkbox_fill);
            gc.set_foreground(palette.checkbox_border);
            gc.fill_rect(rect);
            gc.stroke_rect(rect);
        }
        Ok(())
    }

    fn paint_cells(
        &self,
        gc: &mut dyn DrawingSurface,
        layout: &RowLayout,
        origin: Point,
    ) -> TreeResult<()> {
        let node = layout.node;
        let highlight = HighlightState::of(self.tree, node);
        let style = self.tree.style();

        for cell in &layout.cells {
            let bounds = cell.bounds.offset(origin.x, origin.y);

            if let Some((border, fill)) = highlight.ratios() {
                let base = match self.tree.background_override(node, cell.column)? {
                    Some(color) => color.to_rgb8(),
                    None => style.palette.highlight_base,
                };
                let accent = style.palette.accent;
                let shape = RoundedRect::new(
                    Rect::from_origin_size(
                        bounds.origin,
                        Size::new(bounds.width() - 1.0, bounds.height() - 1.0),
                    ),
                    style.metrics.highlight_radius,
                );
                gc.set_antialias(true);
                gc.set_background(blend(base, accent, fill));
                gc.fill_rounded_rect(shape);
                gc.set_foreground(blend(base, accent, border));
                gc.stroke_rounded_rect(shape);
            }

            if let (Some(rect), Some(image)) = (cell.image, self.tree.image(node, cell.column)?) {
                gc.draw_image(image, rect.origin.offset(origin.x, origin.y));
            }

            if let Some(rect) = cell.text {
                let color = if self.tree.is_enabled() {
                    self.tree.cell_foreground(node, cell.column)?
                } else {
                    style.palette.disabled_text
                };
                gc.set_font(Some(self.tree.cell_font(node, cell.column)?.clone()));
                gc.set_foreground(color);
                gc.draw_text(
                    self.tree.text(node, cell.column)?,
                    rect.origin.offset(origin.x, origin.y),
                );
            }
        }
        Ok(())
    }
}
