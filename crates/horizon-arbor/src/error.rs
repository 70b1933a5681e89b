//! Error types for the tree widget.

use horizon_arbor_render::RenderError;
use thiserror::Error;

/// Errors surfaced by tree model, layout and paint operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    /// An argument was out of range or otherwise invalid.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// The tree, node or column has been destroyed.
    #[error("{0} has been disposed")]
    Disposed(&'static str),

    /// The operation is not available in this widget.
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),

    /// A paint session failed.
    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

impl TreeError {
    pub(crate) fn argument(msg: impl Into<String>) -> Self {
        TreeError::Argument(msg.into())
    }
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
