//! Drawing backends and paint sessions for Horizon Arbor.
//!
//! This crate provides the paint-side plumbing the tree widget draws through:
//!
//! - Geometry and color types ([`Point`], [`Size`], [`Rect`], [`RoundedRect`], [`Color`], [`Font`])
//! - The [`DrawingSurface`] contract and its recorded [`DrawOp`]s
//! - [`RasterSurface`], a CPU immediate-mode backend
//! - [`DisplayListSurface`], a retained backend that presents on commit
//! - [`Image`], used for cell icons and off-screen buffers
//! - [`PaintSessionManager`], which opens direct or double-buffered sessions
//!   and guarantees their cleanup
//!
//! # Tracing
//!
//! Log targets are `horizon_arbor_render::session`,
//! `horizon_arbor_render::raster` and `horizon_arbor_render::display_list`.

mod display_list;
mod error;
mod image;
mod raster;
mod session;
mod surface;
mod types;

pub use display_list::DisplayListSurface;
pub use error::{RenderError, RenderResult};
pub use crate::image::Image;
pub use raster::{RasterSurface, SurfaceState};
pub use session::{
    BackgroundCache, BufferedSession, DirectSession, PaintSession, PaintSessionManager,
    ResourceLedger, SessionReport, SessionStrategy, SurfaceDefaults, SurfaceOwnership,
};
pub use surface::{DrawOp, DrawingSurface, SurfaceCapabilities};
pub use types::{Color, Font, Point, Rect, RoundedRect, Size};
