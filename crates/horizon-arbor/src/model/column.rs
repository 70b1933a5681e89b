//! Tree columns.

use slotmap::new_key_type;

new_key_type! {
    /// Stable handle to a column in a [`Tree`](crate::Tree).
    pub struct ColumnId;
}

/// Horizontal alignment of a column's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Sort indicator shown in a column header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    None,
    Up,
    Down,
}

/// A column of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub(crate) title: String,
    pub(crate) tooltip: Option<String>,
    pub(crate) width: f32,
    pub(crate) alignment: Alignment,
    pub(crate) moveable: bool,
    pub(crate) resizable: bool,
    pub(crate) sort_direction: SortDirection,
}

impl Default for Column {
    fn default() -> Self {
        Self {
            title: String::new(),
            tooltip: None,
            width: 0.0,
            alignment: Alignment::Left,
            moveable: false,
            resizable: true,
            sort_direction: SortDirection::None,
        }
    }
}

impl Column {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    /// Width in pixels, never negative.
    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn is_moveable(&self) -> bool {
        self.moveable
    }

    pub fn is_resizable(&self) -> bool {
        self.resizable
    }

    /// Sort marker; only drawn while this column is the tree's sort column.
    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }
}
