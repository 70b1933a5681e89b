//! Row layout.
//!
//! The layout pass stacks the visible rows top to bottom in a single linear
//! accumulation. Each row is as wide as its preferred width; the content size
//! is the widest row by the sum of row heights.

use std::ops::Range;

use horizon_arbor_render::{Point, Rect, Size};

use crate::logging::targets;

/// Viewport constraint for a size computation.
///
/// `None` on an axis means unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SizeHint {
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl SizeHint {
    /// No constraint on either axis.
    pub const UNCONSTRAINED: Self = Self {
        width: None,
        height: None,
    };

    pub fn new(width: Option<f32>, height: Option<f32>) -> Self {
        Self { width, height }
    }

    /// Build a hint where negative values mean "unconstrained".
    pub fn from_sentinel(width: f32, height: f32) -> Self {
        let axis = |v: f32| (v >= 0.0).then_some(v);
        Self {
            width: axis(width),
            height: axis(height),
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }
}

/// Placement of one visible row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowRecord {
    /// Position in the flattened visible list.
    pub index: usize,
    pub bounds: Rect,
}

/// Result of a layout pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutRecord {
    rows: Vec<RowRecord>,
    origin: Point,
    content_size: Size,
}

impl LayoutRecord {
    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&RowRecord> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest row by the total height of all rows.
    pub fn content_size(&self) -> Size {
        self.content_size
    }

    /// Rectangle covering all rows, anchored at the layout origin.
    pub fn client_area(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.content_size)
    }

    /// Index of the row whose vertical span contains `y`.
    ///
    /// Rows are sorted and non-overlapping, so this is a binary search.
    pub fn row_at(&self, y: f32) -> Option<usize> {
        let candidate = self.rows.partition_point(|row| row.bounds.bottom() <= y);
        self.rows
            .get(candidate)
            .filter(|row| row.bounds.contains_y(y))
            .map(|row| row.index)
    }

    /// Rows that intersect the vertical span `[top, top + height)`.
    pub fn visible_range(&self, top: f32, height: f32) -> Range<usize> {
        let bottom = top + height;
        let first = self.rows.partition_point(|row| row.bounds.bottom() <= top);
        let last = self.rows.partition_point(|row| row.bounds.top() < bottom);
        first..last.max(first)
    }
}

/// Computes row rectangles from preferred row sizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutEngine;

impl LayoutEngine {
    /// Stack rows of the given preferred sizes starting at `origin`.
    pub fn layout(sizes: &[Size], origin: Point) -> LayoutRecord {
        let mut rows = Vec::with_capacity(sizes.len());
        let mut y = origin.y;
        let mut width: f32 = 0.0;
        for (index, size) in sizes.iter().enumerate() {
            let height = size.height.max(0.0);
            rows.push(RowRecord {
                index,
                bounds: Rect::new(origin.x, y, size.width, height),
            });
            y += height;
            width = width.max(size.width);
        }
        let content_size = Size::new(width, y - origin.y);
        tracing::debug!(
            target: targets::LAYOUT,
            rows = rows.len(),
            width = content_size.width,
            height = content_size.height,
            "layout pass"
        );
        LayoutRecord {
            rows,
            origin,
            content_size,
        }
    }

    /// Preferred size: the hint where constrained, the content extent elsewhere.
    pub fn compute_size(content: Size, hint: SizeHint) -> Size {
        Size::new(
            hint.width.unwrap_or(content.width),
            hint.height.unwrap_or(content.height),
        )
    }

    /// Add room for visible scrollbars to a preferred size.
    ///
    /// The vertical bar adds its width, the horizontal bar its height.
    pub fn with_scrollbars(size: Size, horizontal: Option<Size>, vertical: Option<Size>) -> Size {
        Size::new(
            size.width + vertical.map_or(0.0, |bar| bar.width),
            size.height + horizontal.map_or(0.0, |bar| bar.height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes() -> Vec<Size> {
        vec![
            Size::new(40.0, 18.0),
            Size::new(90.0, 18.0),
            Size::new(60.0, 30.0),
            Size::new(20.0, 18.0),
        ]
    }

    #[test]
    fn test_rows_accumulate() {
        let record = LayoutEngine::layout(&sizes(), Point::ZERO);
        let tops: Vec<f32> = record.rows().iter().map(|r| r.bounds.top()).collect();
        assert_eq!(tops, vec![0.0, 18.0, 36.0, 66.0]);
        assert_eq!(record.content_size(), Size::new(90.0, 84.0));
        assert_eq!(record.client_area(), Rect::new(0.0, 0.0, 90.0, 84.0));
        assert_eq!(record.row(2).map(|r| r.bounds.width()), Some(60.0));
    }

    #[test]
    fn test_origin_offsets_rows() {
        let record = LayoutEngine::layout(&sizes(), Point::new(5.0, 10.0));
        assert_eq!(record.rows()[0].bounds, Rect::new(5.0, 10.0, 40.0, 18.0));
        assert_eq!(record.rows()[1].bounds.top(), 28.0);
        assert_eq!(record.content_size().height, 84.0);
    }

    #[test]
    fn test_empty_layout() {
        let record = LayoutEngine::layout(&[], Point::ZERO);
        assert!(record.is_empty());
        assert_eq!(record.content_size(), Size::ZERO);
        assert_eq!(record.row_at(0.0), None);
    }

    #[test]
    fn test_row_at_binary_search() {
        let record = LayoutEngine::layout(&sizes(), Point::ZERO);
        assert_eq!(record.row_at(0.0), Some(0));
        assert_eq!(record.row_at(17.9), Some(0));
        assert_eq!(record.row_at(18.0), Some(1));
        assert_eq!(record.row_at(65.0), Some(2));
        assert_eq!(record.row_at(83.0), Some(3));
        assert_eq!(record.row_at(84.0), None);
        assert_eq!(record.row_at(-1.0), None);
    }

    #[test]
    fn test_visible_range() {
        let record = LayoutEngine::layout(&sizes(), Point::ZERO);
        assert_eq!(record.visible_range(0.0, 84.0), 0..4);
        assert_eq!(record.visible_range(20.0, 20.0), 1..3);
        assert_eq!(record.visible_range(18.0, 18.0), 1..2);
        assert_eq!(record.visible_range(100.0, 50.0), 4..4);
        assert_eq!(record.visible_range(0.0, 0.0), 0..0);
    }

    #[test]
    fn test_compute_size_per_axis() {
        let content = Size::new(120.0, 72.0);
        assert_eq!(
            LayoutEngine::compute_size(content, SizeHint::UNCONSTRAINED),
            content
        );
        assert_eq!(
            LayoutEngine::compute_size(content, SizeHint::new(Some(50.0), None)),
            Size::new(50.0, 72.0)
        );
        assert_eq!(
            LayoutEngine::compute_size(content, SizeHint::from_sentinel(-1.0, 10.0)),
            Size::new(120.0, 10.0)
        );
    }

    #[test]
    fn test_zero_hint_is_tolerated() {
        let size = LayoutEngine::compute_size(Size::new(10.0, 10.0), SizeHint::from_sentinel(0.0, 0.0));
        assert_eq!(size, Size::ZERO);
    }

    #[test]
    fn test_with_scrollbars() {
        let size = LayoutEngine::with_scrollbars(
            Size::new(100.0, 50.0),
            Some(Size::new(100.0, 15.0)),
            None,
        );
        assert_eq!(size, Size::new(100.0, 65.0));
        let size = LayoutEngine::with_scrollbars(
            Size::new(100.0, 50.0),
            Some(Size::new(100.0, 15.0)),
            Some(Size::new(15.0, 50.0)),
        );
        assert_eq!(size, Size::new(115.0, 65.0));
    }
}
