//! CPU immediate-mode backend.
//!
//! [`RasterSurface`] rasterizes every operation straight into an RGBA
//! [`Image`] and keeps a log of the operations of the current frame. A frame
//! ends at [`commit`](DrawingSurface::commit); the next operation starts a new
//! log, so a long-lived surface never holds more than one frame. It stands in for
//! platform graphics contexts that draw directly to the screen, so it reports
//! that it does not avoid tearing and that its background must be sampled.
//!
//! Text runs are recorded but not rasterized; glyph rendering belongs to the
//! host toolkit.

use tracing::{trace, warn};

use crate::error::RenderResult;
use crate::image::Image;
use crate::surface::{DrawOp, DrawingSurface, SurfaceCapabilities};
use crate::types::{Color, Font, Point, Rect, RoundedRect, Size};

/// Current graphics state of a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceState {
    pub foreground: Color,
    pub background: Color,
    pub font: Option<Font>,
    pub line_width: f32,
    pub antialias: bool,
    pub clipping: Option<Rect>,
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            foreground: Color::BLACK,
            background: Color::WHITE,
            font: None,
            line_width: 1.0,
            antialias: false,
            clipping: None,
        }
    }
}

/// A drawing surface that rasterizes into an owned RGBA image.
#[derive(Debug)]
pub struct RasterSurface {
    target: Image,
    state: SurfaceState,
    log: Vec<DrawOp>,
    recording: bool,
    frame_committed: bool,
    pending: usize,
    commits: usize,
    disposed: bool,
}

impl RasterSurface {
    /// Create a surface of the given pixel size, cleared to `background`.
    pub fn new(width: u32, height: u32, background: Color) -> RenderResult<Self> {
        Ok(Self::for_image(Image::from_color(width, height, background)?))
    }

    /// Draw into an existing image.
    pub fn for_image(target: Image) -> Self {
        trace!(
            target: "horizon_arbor_render::raster",
            width = target.width(),
            height = target.height(),
            "created raster surface"
        );
        Self {
            target,
            state: SurfaceState::default(),
            log: Vec::new(),
            recording: true,
            frame_committed: false,
            pending: 0,
            commits: 0,
            disposed: false,
        }
    }

    /// Enable or disable the operation log. Rasterization is unaffected.
    pub fn with_recording(mut self, recording: bool) -> Self {
        self.recording = recording;
        if !recording {
            self.log = Vec::new();
        }
        self
    }

    /// Current graphics state.
    pub fn state(&self) -> &SurfaceState {
        &self.state
    }

    /// The rasterized pixels.
    pub fn image(&self) -> &Image {
        &self.target
    }

    /// Dispose the target image. Pixels stay readable.
    pub fn release_image(&mut self) {
        self.target.dispose();
    }

    /// Read back one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.target.pixel(x, y)
    }

    /// Operations of the current frame, in order.
    ///
    /// After a commit this is the frame just committed, until the next
    /// operation arrives.
    pub fn ops(&self) -> &[DrawOp] {
        &self.log
    }

    /// Operations that produced pixels, skipping state changes.
    pub fn draw_ops(&self) -> impl Iterator<Item = &DrawOp> + '_ {
        self.log.iter().filter(|op| !op.is_state_change())
    }

    /// Forget recorded operations. Pixels are kept.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Operations executed since the last commit.
    pub fn pending_ops(&self) -> usize {
        self.pending
    }

    /// Number of commits performed.
    pub fn commit_count(&self) -> usize {
        self.commits
    }

    // =========================================================================
    // Rasterization
    // =========================================================================

    fn plot(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 {
            return;
        }
        if let Some(clip) = self.state.clipping
            && !clip.contains(Point::new(x as f32 + 0.5, y as f32 + 0.5))
        {
            return;
        }
        self.target.blend_pixel(x as u32, y as u32, color);
    }

    /// Pixel span covered by `rect`, clamped to the target.
    fn span(&self, rect: Rect) -> (i64, i64, i64, i64) {
        let x0 = rect.left().round().max(0.0) as i64;
        let y0 = rect.top().round().max(0.0) as i64;
        let x1 = (rect.right().round() as i64).min(self.target.width() as i64);
        let y1 = (rect.bottom().round() as i64).min(self.target.height() as i64);
        (x0, y0, x1, y1)
    }

    fn fill_shape(&mut self, rect: Rect, inside: impl Fn(Point) -> bool, color: Color) {
        let (x0, y0, x1, y1) = self.span(rect);
        for y in y0..y1 {
            for x in x0..x1 {
                if inside(Point::new(x as f32 + 0.5, y as f32 + 0.5)) {
                    self.plot(x, y, color);
                }
            }
        }
    }

    fn stamp(&mut self, x: f32, y: f32, color: Color) {
        let width = self.state.line_width.max(1.0).round() as i64;
        let start = -(width - 1) / 2;
        let (cx, cy) = (x.floor() as i64, y.floor() as i64);
        for dy in start..start + width {
            for dx in start..start + width {
                self.plot(cx + dx, cy + dy, color);
            }
        }
    }

    fn raster_line(&mut self, from: Point, to: Point, color: Color) {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i64;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.stamp(from.x + dx * t, from.y + dy * t, color);
        }
    }

    fn raster(&mut self, op: &DrawOp) {
        let fg = self.state.foreground;
        let bg = self.state.background;
        match op {
            DrawOp::SetForeground(color) => self.state.foreground = *color,
            DrawOp::SetBackground(color) => self.state.background = *color,
            DrawOp::SetFont(font) => self.state.font = font.clone(),
            DrawOp::SetLineWidth(width) => self.state.line_width = width.max(0.0),
            DrawOp::SetAntialias(enabled) => self.state.antialias = *enabled,
            DrawOp::SetClipping(clip) => self.state.clipping = *clip,
            DrawOp::FillRect(rect) => self.fill_shape(*rect, |_| true, bg),
            DrawOp::FillRoundedRect(shape) => {
                let shape = *shape;
                self.fill_shape(shape.rect, move |p| shape.contains(p), bg)
            }
            DrawOp::StrokeRect(rect) => {
                let outline = RoundedRect::new(*rect, 0.0);
                self.stroke_shape(outline, fg);
            }
            DrawOp::StrokeRoundedRect(shape) => self.stroke_shape(*shape, fg),
            DrawOp::Line { from, to } => self.raster_line(*from, *to, fg),
            DrawOp::Polyline(points) => {
                for pair in points.windows(2) {
                    self.raster_line(pair[0], pair[1], fg);
                }
            }
            DrawOp::Image { image, at } => {
                let (ox, oy) = (at.x.round() as i64, at.y.round() as i64);
                for y in 0..image.height() {
                    for x in 0..image.width() {
                        if let Some(color) = image.pixel(x, y) {
                            self.plot(ox + x as i64, oy + y as i64, color);
                        }
                    }
                }
            }
            DrawOp::Text { .. } => {}
        }
    }

    fn stroke_shape(&mut self, shape: RoundedRect, color: Color) {
        let width = self.state.line_width.max(1.0);
        let inner_rect = Rect::new(
            shape.rect.left() + width,
            shape.rect.top() + width,
            shape.rect.width() - 2.0 * width,
            shape.rect.height() - 2.0 * width,
        );
        let inner = RoundedRect::new(inner_rect, (shape.radius - width).max(0.0));
        self.fill_shape(
            shape.rect,
            move |p| shape.contains(p) && !inner.contains(p),
            color,
        );
    }
}

impl DrawingSurface for RasterSurface {
    fn size(&self) -> Size {
        self.target.size()
    }

    fn capabilities(&self) -> SurfaceCapabilities {
        SurfaceCapabilities {
            avoids_tearing: false,
            requires_background_probe: true,
        }
    }

    fn execute(&mut self, op: DrawOp) {
        if self.disposed {
            warn!(target: "horizon_arbor_render::raster", ?op, "draw on disposed surface ignored");
            return;
        }
        self.raster(&op);
        if self.frame_committed {
            self.log.clear();
            self.frame_committed = false;
        }
        if self.recording {
            self.log.push(op);
        }
        self.pending += 1;
    }

    fn copy_area(&self, target: &mut Image, x: i32, y: i32) {
        for ty in 0..target.height() {
            for tx in 0..target.width() {
                let sx = x as i64 + tx as i64;
                let sy = y as i64 + ty as i64;
                if sx < 0 || sy < 0 {
                    continue;
                }
                if let Some(color) = self.target.pixel(sx as u32, sy as u32) {
                    target.set_pixel(tx, ty, color);
                }
            }
        }
    }

    fn commit(&mut self) {
        if self.disposed {
            return;
        }
        trace!(target: "horizon_arbor_render::raster", pending = self.pending, "commit");
        self.pending = 0;
        self.commits += 1;
        self.frame_committed = true;
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(surface: &RasterSurface, x: u32, y: u32) -> [u8; 3] {
        surface.pixel(x, y).unwrap().to_rgb8()
    }

    #[test]
    fn test_fill_rect_uses_background() {
        let mut surface = RasterSurface::new(10, 10, Color::WHITE).unwrap();
        surface.set_background(Color::from_rgb8(243, 243, 243));
        surface.fill_rect(Rect::new(2.0, 2.0, 3.0, 3.0));
        assert_eq!(rgb(&surface, 2, 2), [243, 243, 243]);
        assert_eq!(rgb(&surface, 4, 4), [243, 243, 243]);
        assert_eq!(rgb(&surface, 5, 5), [255, 255, 255]);
    }

    #[test]
    fn test_clipping_limits_fill() {
        let mut surface = RasterSurface::new(10, 10, Color::WHITE).unwrap();
        surface.set_background(Color::BLACK);
        surface.set_clipping(Some(Rect::new(0.0, 0.0, 5.0, 5.0)));
        surface.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(rgb(&surface, 4, 4), [0, 0, 0]);
        assert_eq!(rgb(&surface, 6, 6), [255, 255, 255]);
    }

    #[test]
    fn test_line_uses_foreground() {
        let mut surface = RasterSurface::new(10, 10, Color::WHITE).unwrap();
        surface.set_foreground(Color::from_rgb8(139, 139, 139));
        surface.draw_line(Point::new(0.0, 5.0), Point::new(9.0, 5.0));
        assert_eq!(rgb(&surface, 0, 5), [139, 139, 139]);
        assert_eq!(rgb(&surface, 9, 5), [139, 139, 139]);
        assert_eq!(rgb(&surface, 5, 0), [255, 255, 255]);
    }

    #[test]
    fn test_stroke_rect_leaves_interior() {
        let mut surface = RasterSurface::new(12, 12, Color::WHITE).unwrap();
        surface.stroke_rect(Rect::new(0.0, 0.0, 12.0, 12.0));
        assert_eq!(rgb(&surface, 0, 6), [0, 0, 0]);
        assert_eq!(rgb(&surface, 11, 6), [0, 0, 0]);
        assert_eq!(rgb(&surface, 6, 6), [255, 255, 255]);
    }

    #[test]
    fn test_copy_area_copies_offset_region() {
        let mut surface = RasterSurface::new(4, 4, Color::WHITE).unwrap();
        surface.set_background(Color::from_rgb8(1, 2, 3));
        surface.fill_rect(Rect::new(2.0, 2.0, 1.0, 1.0));
        let mut probe = Image::new(1, 1).unwrap();
        surface.copy_area(&mut probe, 2, 2);
        assert_eq!(probe.pixel(0, 0).unwrap().to_rgb8(), [1, 2, 3]);
    }

    #[test]
    fn test_commit_resets_pending() {
        let mut surface = RasterSurface::new(4, 4, Color::WHITE).unwrap();
        surface.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        surface.draw_text("abc", Point::ZERO);
        assert_eq!(surface.pending_ops(), 2);
        surface.commit();
        assert_eq!(surface.pending_ops(), 0);
        assert_eq!(surface.commit_count(), 1);
        assert_eq!(surface.draw_ops().count(), 2);

        surface.draw_text("next", Point::ZERO);
        assert_eq!(surface.ops().len(), 1);
        assert!(matches!(&surface.ops()[0], DrawOp::Text { text, .. } if text == "next"));
    }

    #[test]
    fn test_log_holds_one_frame() {
        let mut surface = RasterSurface::new(8, 8, Color::WHITE).unwrap();
        let tile = Image::from_color(8, 8, Color::BLACK).unwrap();
        for _ in 0..20 {
            surface.draw_image(&tile, Point::ZERO);
            surface.commit();
        }
        assert_eq!(surface.ops().len(), 1);
        assert_eq!(surface.commit_count(), 20);
        assert_eq!(rgb(&surface, 7, 7), [0, 0, 0]);
    }

    #[test]
    fn test_recording_off_still_rasterizes() {
        let mut surface = RasterSurface::new(4, 4, Color::WHITE)
            .unwrap()
            .with_recording(false);
        surface.set_background(Color::BLACK);
        surface.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0));
        assert!(surface.ops().is_empty());
        assert_eq!(surface.pending_ops(), 2);
        assert_eq!(rgb(&surface, 1, 1), [0, 0, 0]);
    }

    #[test]
    fn test_disposed_surface_ignores_draws() {
        let mut surface = RasterSurface::new(4, 4, Color::WHITE).unwrap();
        surface.dispose();
        surface.set_background(Color::BLACK);
        surface.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0));
        assert!(surface.is_disposed());
        assert!(surface.ops().is_empty());
        assert_eq!(rgb(&surface, 0, 0), [255, 255, 255]);
    }
}
