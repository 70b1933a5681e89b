//! Error types for the render crate.

use thiserror::Error;

/// Errors that can occur during drawing-surface and paint-session operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Invalid buffer dimensions (zero width or height).
    #[error("invalid surface dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The drawing surface has already been disposed.
    #[error("drawing surface already disposed")]
    SurfaceDisposed,

    /// The off-screen buffer has already been disposed.
    #[error("off-screen buffer already disposed")]
    BufferDisposed,
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
