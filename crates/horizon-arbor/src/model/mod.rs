//! Tree data model.
//!
//! The [`Tree`] owns every node and column in slot-map arenas. Callers hold
//! [`NodeId`] and [`ColumnId`] handles; a handle whose entry has been destroyed
//! fails lookup with [`TreeError::Disposed`](crate::TreeError::Disposed).

mod column;
mod node;
mod tree;

pub use column::{Alignment, Column, ColumnId, SortDirection};
pub use node::{Cell, NodeId};
pub use tree::{Tree, VisibleRow};
