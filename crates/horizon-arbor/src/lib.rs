//! Horizon Arbor: a custom-drawn tree widget core.
//!
//! This crate holds everything a tree widget needs apart from the native
//! window: the hierarchical data model, row layout, rendering through a
//! [`DrawingSurface`](horizon_arbor_render::DrawingSurface), hit-testing and
//! pointer handling.
//!
//! # Overview
//!
//! - [`Tree`] owns nodes and columns in an arena and tracks selection, hover
//!   and expansion state.
//! - [`LayoutEngine`] stacks the visible rows and computes the content size.
//! - [`RowRenderer`] measures and paints individual rows.
//! - [`HitTester`] maps pointer positions to rows and row regions.
//! - [`TreeWidget`] ties them together, caches layout and paints through a
//!   [`PaintSessionManager`](horizon_arbor_render::PaintSessionManager).
//!
//! # Example
//!
//! ```
//! use horizon_arbor::{MonospaceMeasure, PointerButton, Tree, TreeEvent, TreeStyle, TreeWidget};
//! use horizon_arbor_render::{DrawingSurface, Point, RasterSurface, Color, Size};
//!
//! let surface = RasterSurface::new(160, 80, Color::WHITE).unwrap();
//! let mut tree = Tree::new(TreeStyle::default());
//! let parent = tree.create_node(None, None).unwrap();
//! let child = tree.create_node(Some(parent), None).unwrap();
//! tree.set_text(parent, 0, "parent").unwrap();
//! tree.set_text(child, 0, "child").unwrap();
//!
//! let mut widget = TreeWidget::new(tree, MonospaceMeasure::default(), surface.capabilities());
//! widget.resize(Size::new(160.0, 80.0)).unwrap();
//!
//! // Clicking the disclosure glyph expands the parent.
//! let outcome = widget.pointer_down(Point::new(8.0, 9.0), PointerButton::Primary).unwrap();
//! assert_eq!(outcome.events, vec![TreeEvent::Expanded(parent)]);
//! assert_eq!(widget.visible_rows().unwrap().len(), 2);
//! ```
//!
//! # Threading
//!
//! A [`Tree`] may move between threads but is used from one thread at a time;
//! debug builds assert that every access happens on the creating thread.

mod config;
mod error;
mod event;
mod layout;
pub mod logging;
mod measure;
mod model;
mod row;
mod scroll;
mod thread_check;
mod widget;

pub use config::{
    POLYLINE_CHECK, POLYLINE_CLOSED, POLYLINE_OPEN, TreeMetrics, TreePalette, TreeStyle,
};
pub use error::{TreeError, TreeResult};
pub use event::{PointerButton, PointerOutcome, TreeEvent};
pub use hit_test::{Hit, HitRegion, HitTester};
pub use layout::{LayoutEngine, LayoutRecord, RowRecord, SizeHint};
pub use logging::{DumpOptions, DumpStyle, LayoutDump};
pub use measure::{MonospaceMeasure, TextFlags, TextMeasure};
pub use model::{
    Alignment, Cell, Column, ColumnId, NodeId, SortDirection, Tree, VisibleRow,
};
pub use row::{
    CellLayout, Disclosure, HighlightState, RowLayout, RowRenderer, blend, blend_channel,
};
pub use scroll::{FixedScrollBar, ScrollBar, ScrollBarPolicy, ScrollBars};
pub use thread_check::ThreadAffinity;
pub use widget::TreeWidget;
