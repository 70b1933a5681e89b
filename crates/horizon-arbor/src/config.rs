//! Tree appearance configuration.
//!
//! [`TreeMetrics`] holds the geometry constants the layout and renderer share,
//! [`TreePalette`] the fixed glyph and highlight colors, and [`TreeStyle`] the
//! creation-time options of a tree.

use horizon_arbor_render::{Color, Point, Rect};

/// Disclosure glyph for a collapsed node, relative to the glyph band origin.
pub const POLYLINE_CLOSED: [Point; 3] = [
    Point::new(8.0, 7.0),
    Point::new(12.0, 11.0),
    Point::new(8.0, 15.0),
];

/// Disclosure glyph for an expanded node, relative to the glyph band origin.
pub const POLYLINE_OPEN: [Point; 3] = [
    Point::new(7.0, 7.0),
    Point::new(11.0, 12.0),
    Point::new(15.0, 7.0),
];

/// Check mark, relative to the checkbox origin.
pub const POLYLINE_CHECK: [Point; 3] = [
    Point::new(2.0, 6.0),
    Point::new(5.0, 9.0),
    Point::new(9.0, 3.0),
];

/// Geometry constants for rows.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeMetrics {
    /// Width of one indentation level and of the disclosure glyph band.
    pub indent_width: f32,
    /// Minimum row height.
    pub default_row_height: f32,
    /// Space above cell content.
    pub padding_top: f32,
    /// Gap between a cell's image and its text.
    pub cell_spacing: f32,
    /// Horizontal space reserved for the checkbox in checkable trees.
    pub checkbox_band: f32,
    /// Checkbox square, relative to the start of the checkbox band.
    pub checkbox_box: Rect,
    /// Corner radius of the selection and hover highlight.
    pub highlight_radius: f32,
    /// Stroke width of disclosure glyphs and the check mark.
    pub glyph_line_width: f32,
}

impl TreeMetrics {
    /// Indentation of a row at `depth`; the disclosure band starts here.
    #[inline]
    pub fn indent(&self, depth: usize) -> f32 {
        depth as f32 * self.indent_width
    }

    /// Where cell content (or the checkbox) starts for a row at `depth`.
    #[inline]
    pub fn content_start(&self, depth: usize) -> f32 {
        self.indent(depth) + self.indent_width
    }

    pub fn with_indent_width(mut self, width: f32) -> Self {
        self.indent_width = width;
        self
    }

    pub fn with_default_row_height(mut self, height: f32) -> Self {
        self.default_row_height = height;
        self
    }

    pub fn with_cell_spacing(mut self, spacing: f32) -> Self {
        self.cell_spacing = spacing;
        self
    }
}

impl Default for TreeMetrics {
    fn default() -> Self {
        Self {
            indent_width: 17.0,
            default_row_height: 18.0,
            padding_top: 1.0,
            cell_spacing: 2.0,
            checkbox_band: 16.0,
            checkbox_box: Rect::new(3.0, 3.0, 12.0, 12.0),
            highlight_radius: 4.0,
            glyph_line_width: 2.0,
        }
    }
}

/// Fixed colors used by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct TreePalette {
    pub disclosure_closed: Color,
    pub disclosure_open: Color,
    pub checkbox_border: Color,
    pub checkbox_fill: Color,
    pub checkbox_checked: Color,
    pub check_mark: Color,
    /// Accent the highlight blends toward.
    pub accent: [u8; 3],
    /// Highlight base when neither cell nor node overrides the background.
    pub highlight_base: [u8; 3],
    /// Text color of a disabled tree.
    pub disabled_text: Color,
}

impl Default for TreePalette {
    fn default() -> Self {
        Self {
            disclosure_closed: Color::from_rgb8(139, 139, 139),
            disclosure_open: Color::BLACK,
            checkbox_border: Color::from_rgb8(98, 98, 98),
            checkbox_fill: Color::from_rgb8(243, 243, 243),
            checkbox_checked: Color::from_rgb8(0, 95, 184),
            check_mark: Color::WHITE,
            accent: [0, 139, 255],
            highlight_base: [225, 241, 255],
            disabled_text: Color::from_rgb8(160, 160, 160),
        }
    }
}

/// Creation-time options of a tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TreeStyle {
    /// Draw a checkbox in front of every row.
    pub checkable: bool,
    pub metrics: TreeMetrics,
    pub palette: TreePalette,
}

impl TreeStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_checkable(mut self, checkable: bool) -> Self {
        self.checkable = checkable;
        self
    }

    pub fn with_metrics(mut self, metrics: TreeMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_palette(mut self, palette: TreePalette) -> Self {
        self.palette = palette;
        self
    }

    /// Horizontal space the checkbox takes, zero when not checkable.
    #[inline]
    pub fn checkbox_width(&self) -> f32 {
        if self.checkable {
            self.metrics.checkbox_band
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_metrics() {
        let metrics = TreeMetrics::default();
        assert_eq!(metrics.indent(0), 0.0);
        assert_eq!(metrics.indent(2), 34.0);
        assert_eq!(metrics.content_start(1), 34.0);
        assert_eq!(metrics.default_row_height, 18.0);
    }

    #[test]
    fn test_style_builder() {
        let style = TreeStyle::new()
            .with_checkable(true)
            .with_metrics(TreeMetrics::default().with_indent_width(20.0));
        assert!(style.checkable);
        assert_eq!(style.checkbox_width(), 16.0);
        assert_eq!(style.metrics.indent(1), 20.0);
        assert_eq!(TreeStyle::default().checkbox_width(), 0.0);
    }
}
