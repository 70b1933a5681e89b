//! The drawing-surface contract.
//!
//! This module defines the [`DrawingSurface`] trait, the immediate-mode paint
//! target every backend implements. Its API follows the graphics-context model
//! of native toolkits: colors, font, line width, antialiasing and clipping are
//! state set on the surface, and each primitive draws with the current state.
//! Fills use the background color, strokes, lines and text use the foreground.
//!
//! Every call is expressed as a [`DrawOp`] so that retained backends can
//! record and replay operations, and tests can inspect what was drawn.

use crate::image::Image;
use crate::types::{Color, Font, Point, Rect, RoundedRect, Size};

/// What a backend can guarantee about presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceCapabilities {
    /// Drawing becomes visible atomically, so no manual double buffering is needed.
    pub avoids_tearing: bool,
    /// The on-screen background cannot be queried directly and must be sampled.
    pub requires_background_probe: bool,
}

/// A single recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    SetForeground(Color),
    SetBackground(Color),
    SetFont(Option<Font>),
    SetLineWidth(f32),
    SetAntialias(bool),
    SetClipping(Option<Rect>),
    FillRect(Rect),
    StrokeRect(Rect),
    FillRoundedRect(RoundedRect),
    StrokeRoundedRect(RoundedRect),
    Line { from: Point, to: Point },
    Polyline(Vec<Point>),
    Image { image: Image, at: Point },
    Text { text: String, at: Point },
}

impl DrawOp {
    /// Whether the op changes surface state rather than producing pixels.
    pub fn is_state_change(&self) -> bool {
        matches!(
            self,
            DrawOp::SetForeground(_)
                | DrawOp::SetBackground(_)
                | DrawOp::SetFont(_)
                | DrawOp::SetLineWidth(_)
                | DrawOp::SetAntialias(_)
                | DrawOp::SetClipping(_)
        )
    }
}

/// Primitive 2-D paint target.
///
/// Implementors provide [`execute`](Self::execute) plus lifecycle methods; the
/// drawing API is layered on top as provided methods.
///
/// # Lifecycle
///
/// ```ignore
/// surface.set_background(Color::WHITE);
/// surface.fill_rect(Rect::new(0.0, 0.0, 40.0, 18.0));
/// surface.commit();
/// surface.dispose();
/// assert!(surface.is_disposed());
/// ```
///
/// Operations issued after [`dispose`](Self::dispose) are ignored.
pub trait DrawingSurface {
    /// Pixel extent of the surface.
    fn size(&self) -> Size;

    /// Presentation guarantees of this backend.
    fn capabilities(&self) -> SurfaceCapabilities;

    /// Apply one drawing operation.
    fn execute(&mut self, op: DrawOp);

    /// Copy surface pixels starting at `(x, y)` into `target`, filling it entirely.
    ///
    /// Pixels outside the surface leave the target untouched.
    fn copy_area(&self, target: &mut Image, x: i32, y: i32);

    /// Make all pending operations visible.
    fn commit(&mut self);

    /// Release the surface. Further operations are ignored.
    fn dispose(&mut self);

    /// Whether [`dispose`](Self::dispose) has been called.
    fn is_disposed(&self) -> bool;

    // =========================================================================
    // State
    // =========================================================================

    fn set_foreground(&mut self, color: Color) {
        self.execute(DrawOp::SetForeground(color));
    }

    fn set_background(&mut self, color: Color) {
        self.execute(DrawOp::SetBackground(color));
    }

    /// Set the text font. `None` restores the backend default.
    fn set_font(&mut self, font: Option<Font>) {
        self.execute(DrawOp::SetFont(font));
    }

    fn set_line_width(&mut self, width: f32) {
        self.execute(DrawOp::SetLineWidth(width));
    }

    fn set_antialias(&mut self, enabled: bool) {
        self.execute(DrawOp::SetAntialias(enabled));
    }

    /// Restrict drawing to `rect`, or lift the restriction with `None`.
    fn set_clipping(&mut self, rect: Option<Rect>) {
        self.execute(DrawOp::SetClipping(rect));
    }

    // =========================================================================
    // Drawing - Rectangles
    // =========================================================================

    /// Fill a rectangle with the background color.
    fn fill_rect(&mut self, rect: Rect) {
        self.execute(DrawOp::FillRect(rect));
    }

    /// Outline a rectangle with the foreground color.
    fn stroke_rect(&mut self, rect: Rect) {
        self.execute(DrawOp::StrokeRect(rect));
    }

    /// Fill a rounded rectangle with the background color.
    fn fill_rounded_rect(&mut self, rect: RoundedRect) {
        self.execute(DrawOp::FillRoundedRect(rect));
    }

    /// Outline a rounded rectangle with the foreground color.
    fn stroke_rounded_rect(&mut self, rect: RoundedRect) {
        self.execute(DrawOp::StrokeRoundedRect(rect));
    }

    // =========================================================================
    // Drawing - Lines
    // =========================================================================

    fn draw_line(&mut self, from: Point, to: Point) {
        self.execute(DrawOp::Line { from, to });
    }

    /// Draw connected line segments through `points`.
    fn draw_polyline(&mut self, points: &[Point]) {
        self.execute(DrawOp::Polyline(points.to_vec()));
    }

    // =========================================================================
    // Drawing - Images and Text
    // =========================================================================

    /// Draw an image with its top-left corner at `at`.
    fn draw_image(&mut self, image: &Image, at: Point) {
        self.execute(DrawOp::Image {
            image: image.clone(),
            at,
        });
    }

    /// Draw a text run with its top-left corner at `at`.
    fn draw_text(&mut self, text: &str, at: Point) {
        self.execute(DrawOp::Text {
            text: text.to_owned(),
            at,
        });
    }
}

impl<T: DrawingSurface + ?Sized> DrawingSurface for &mut T {
    fn size(&self) -> Size {
        (**self).size()
    }

    fn capabilities(&self) -> SurfaceCapabilities {
        (**self).capabilities()
    }

    fn execute(&mut self, op: DrawOp) {
        (**self).execute(op)
    }

    fn copy_area(&self, target: &mut Image, x: i32, y: i32) {
        (**self).copy_area(target, x, y)
    }

    fn commit(&mut self) {
        (**self).commit()
    }

    fn dispose(&mut self) {
        (**self).dispose()
    }

    fn is_disposed(&self) -> bool {
        (**self).is_disposed()
    }
}
