//! Paint sessions: scoped acquisition of a drawing surface for one paint.
//!
//! A [`PaintSessionManager`] decides once, from the backend's
//! [`SurfaceCapabilities`], whether paints draw straight onto the supplied
//! surface ([`SessionStrategy::Direct`]) or into an off-screen buffer that is
//! blitted on close ([`SessionStrategy::Buffered`]).
//!
//! Cleanup always runs in this order, whether the render callback returns an
//! error, panics, or succeeds:
//!
//! 1. commit pending operations on the drawing surface
//! 2. dispose the drawing surface
//! 3. blit the off-screen buffer onto the real surface and dispose it
//! 4. dispose the original surface if the session owns it
//!
//! # Example
//!
//! ```
//! use horizon_arbor_render::{
//!     Color, DrawingSurface, PaintSessionManager, RasterSurface, Rect, RenderError,
//!     Size, SurfaceDefaults, SurfaceOwnership,
//! };
//!
//! let mut surface = RasterSurface::new(40, 18, Color::WHITE).unwrap();
//! let manager = PaintSessionManager::new(surface.capabilities());
//! manager
//!     .paint(
//!         &mut surface,
//!         Size::new(40.0, 18.0),
//!         SurfaceOwnership::Caller,
//!         &SurfaceDefaults::default(),
//!         |gc| -> Result<(), RenderError> {
//!             gc.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
//!             Ok(())
//!         },
//!     )
//!     .unwrap();
//! assert_eq!(manager.ledger().live_buffers(), 0);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::error::{RenderError, RenderResult};
use crate::image::Image;
use crate::raster::RasterSurface;
use crate::surface::{DrawingSurface, SurfaceCapabilities};
use crate::types::{Color, Font, Point, Rect, Size};

/// How paints reach the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStrategy {
    /// Draw straight onto the supplied surface.
    Direct,
    /// Draw into an off-screen image, then blit it on close.
    Buffered,
}

impl SessionStrategy {
    /// Pick the strategy a backend needs.
    pub fn for_capabilities(capabilities: SurfaceCapabilities) -> Self {
        if capabilities.avoids_tearing {
            SessionStrategy::Direct
        } else {
            SessionStrategy::Buffered
        }
    }
}

/// Who releases the surface handed to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceOwnership {
    /// The session disposes the surface when it closes.
    #[default]
    Session,
    /// The caller keeps the surface alive after the session.
    Caller,
}

/// Initial surface state applied when a session opens.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceDefaults {
    pub foreground: Color,
    pub background: Color,
    pub font: Option<Font>,
}

impl SurfaceDefaults {
    pub fn new(foreground: Color, background: Color) -> Self {
        Self {
            foreground,
            background,
            font: None,
        }
    }

    /// Set the default font.
    pub fn with_font(mut self, font: Font) -> Self {
        self.font = Some(font);
        self
    }
}

impl Default for SurfaceDefaults {
    fn default() -> Self {
        Self::new(Color::BLACK, Color::WHITE)
    }
}

// =============================================================================
// Background cache
// =============================================================================

#[derive(Debug, Default)]
struct BackgroundState {
    color: Option<Color>,
    probes: usize,
}

/// Background color sampled from the screen, shared between sessions.
///
/// Probing copies a single pixel from the real surface. The result is cached
/// until [`reset`](Self::reset) is called, for example after a theme change.
/// Clones share the same cached value.
#[derive(Debug, Clone, Default)]
pub struct BackgroundCache {
    inner: Arc<Mutex<BackgroundState>>,
}

impl BackgroundCache {
    /// A fresh, empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached color, sampling `surface` on first use.
    ///
    /// Returns `None` without caching if the surface has no pixels to sample.
    pub fn get_or_probe(&self, surface: &dyn DrawingSurface) -> Option<Color> {
        let mut state = self.inner.lock();
        if let Some(color) = state.color {
            return Some(color);
        }
        let mut probe = Image::new(1, 1).ok()?;
        if surface.size().is_empty() {
            return None;
        }
        surface.copy_area(&mut probe, 0, 0);
        let color = probe.pixel(0, 0);
        probe.dispose();
        state.probes += 1;
        state.color = color;
        debug!(target: "horizon_arbor_render::session", ?color, "sampled background color");
        color
    }

    /// The cached color, if any.
    pub fn cached(&self) -> Option<Color> {
        self.inner.lock().color
    }

    /// Number of probes executed over the cache's lifetime.
    pub fn probe_count(&self) -> usize {
        self.inner.lock().probes
    }

    /// Forget the cached color so the next buffered session samples again.
    pub fn reset(&self) {
        self.inner.lock().color = None;
    }
}

// =============================================================================
// Resource ledger
// =============================================================================

#[derive(Debug, Default)]
struct LedgerCounts {
    sessions_opened: AtomicUsize,
    sessions_closed: AtomicUsize,
    buffers_allocated: AtomicUsize,
    buffers_disposed: AtomicUsize,
}

/// Counts session and buffer lifetimes so leaks can be asserted on.
#[derive(Debug, Clone, Default)]
pub struct ResourceLedger {
    counts: Arc<LedgerCounts>,
}

impl ResourceLedger {
    pub fn sessions_opened(&self) -> usize {
        self.counts.sessions_opened.load(Ordering::Relaxed)
    }

    pub fn sessions_closed(&self) -> usize {
        self.counts.sessions_closed.load(Ordering::Relaxed)
    }

    pub fn buffers_allocated(&self) -> usize {
        self.counts.buffers_allocated.load(Ordering::Relaxed)
    }

    pub fn buffers_disposed(&self) -> usize {
        self.counts.buffers_disposed.load(Ordering::Relaxed)
    }

    /// Sessions opened but not yet closed.
    pub fn open_sessions(&self) -> usize {
        self.sessions_opened() - self.sessions_closed()
    }

    /// Off-screen buffers allocated but not yet disposed.
    pub fn live_buffers(&self) -> usize {
        self.buffers_allocated() - self.buffers_disposed()
    }

    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

// =============================================================================
// Manager
// =============================================================================

/// Opens paint sessions with a strategy fixed at construction.
#[derive(Debug, Clone)]
pub struct PaintSessionManager {
    strategy: SessionStrategy,
    background: BackgroundCache,
    ledger: ResourceLedger,
}

impl PaintSessionManager {
    /// Create a manager for a backend with the given capabilities.
    ///
    /// The manager starts with its own empty [`BackgroundCache`].
    pub fn new(capabilities: SurfaceCapabilities) -> Self {
        Self {
            strategy: SessionStrategy::for_capabilities(capabilities),
            background: BackgroundCache::new(),
            ledger: ResourceLedger::default(),
        }
    }

    /// Use `cache` for background probes. Managers given clones of one
    /// cache probe at most once between them.
    pub fn with_background_cache(mut self, cache: BackgroundCache) -> Self {
        self.background = cache;
        self
    }

    pub fn strategy(&self) -> SessionStrategy {
        self.strategy
    }

    pub fn background_cache(&self) -> &BackgroundCache {
        &self.background
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// Open a session over `surface` for a widget of the given size.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::SurfaceDisposed`] if the surface was already
    /// released.
    pub fn open<'s, S: DrawingSurface>(
        &self,
        surface: &'s mut S,
        size: Size,
        ownership: SurfaceOwnership,
        defaults: &SurfaceDefaults,
    ) -> RenderResult<PaintSession<'s, S>> {
        if surface.is_disposed() {
            return Err(RenderError::SurfaceDisposed);
        }

        let (width, height) = size.to_pixels();
        let strategy = match self.strategy {
            SessionStrategy::Buffered if width == 0 || height == 0 => {
                debug!(
                    target: "horizon_arbor_render::session",
                    width, height, "empty bounds, drawing directly"
                );
                SessionStrategy::Direct
            }
            strategy => strategy,
        };

        ResourceLedger::bump(&self.ledger.counts.sessions_opened);
        match strategy {
            SessionStrategy::Direct => {
                initialize_surface(surface, size, defaults);
                trace!(target: "horizon_arbor_render::session", ?ownership, "opened direct session");
                Ok(PaintSession::Direct(DirectSession {
                    surface,
                    ownership,
                    ledger: self.ledger.clone(),
                    closed: false,
                }))
            }
            SessionStrategy::Buffered => {
                let mut image = match Image::new(width, height) {
                    Ok(image) => image,
                    Err(err) => {
                        ResourceLedger::bump(&self.ledger.counts.sessions_closed);
                        return Err(err);
                    }
                };
                surface.copy_area(&mut image, 0, 0);
                ResourceLedger::bump(&self.ledger.counts.buffers_allocated);

                let background = if surface.capabilities().requires_background_probe {
                    self.background.get_or_probe(&*surface)
                } else {
                    None
                };

                let mut buffer = RasterSurface::for_image(image);
                if let Some(color) = background {
                    buffer.set_background(color);
                    buffer.fill_rect(Rect::new(0.0, 0.0, width as f32, height as f32));
                }
                initialize_surface(&mut buffer, size, defaults);
                debug!(
                    target: "horizon_arbor_render::session",
                    width, height, ?ownership, "opened buffered session"
                );
                Ok(PaintSession::Buffered(BufferedSession {
                    original: surface,
                    buffer,
                    ownership,
                    ledger: self.ledger.clone(),
                    closed: false,
                }))
            }
        }
    }

    /// Run `render` inside a session and close it, even on error or panic.
    ///
    /// The callback's error wins over a close error.
    pub fn paint<S, R, E, F>(
        &self,
        surface: &mut S,
        size: Size,
        ownership: SurfaceOwnership,
        defaults: &SurfaceDefaults,
        render: F,
    ) -> Result<R, E>
    where
        S: DrawingSurface,
        E: From<RenderError>,
        F: FnOnce(&mut dyn DrawingSurface) -> Result<R, E>,
    {
        let mut session = self.open(surface, size, ownership, defaults)?;
        let result = render(session.surface());
        let closed = session.close();
        let value = result?;
        closed?;
        Ok(value)
    }
}

fn initialize_surface(surface: &mut dyn DrawingSurface, size: Size, defaults: &SurfaceDefaults) {
    surface.set_foreground(defaults.foreground);
    surface.set_background(defaults.background);
    surface.set_font(defaults.font.clone());
    surface.set_clipping(Some(Rect::from_origin_size(Point::ZERO, size)));
    surface.set_antialias(true);
}

// =============================================================================
// Sessions
// =============================================================================

/// Outcome of closing a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    pub strategy: SessionStrategy,
    /// Whether the surface the render callback drew on ended up disposed.
    pub drawing_surface_disposed: bool,
    /// `Some(disposed)` when an off-screen buffer was used.
    pub buffer_disposed: Option<bool>,
    /// Whether the surface handed to the session ended up disposed.
    pub original_disposed: bool,
}

/// An open paint session.
#[derive(Debug)]
pub enum PaintSession<'s, S: DrawingSurface> {
    Direct(DirectSession<'s, S>),
    Buffered(BufferedSession<'s, S>),
}

impl<S: DrawingSurface> PaintSession<'_, S> {
    /// The surface render code draws on.
    pub fn surface(&mut self) -> &mut dyn DrawingSurface {
        match self {
            PaintSession::Direct(session) => &mut *session.surface,
            PaintSession::Buffered(session) => &mut session.buffer,
        }
    }

    pub fn strategy(&self) -> SessionStrategy {
        match self {
            PaintSession::Direct(_) => SessionStrategy::Direct,
            PaintSession::Buffered(_) => SessionStrategy::Buffered,
        }
    }

    /// Close the session, running the full cleanup sequence.
    ///
    /// Cleanup completes even when an error is returned.
    pub fn close(self) -> RenderResult<SessionReport> {
        match self {
            PaintSession::Direct(mut session) => session.finish(),
            PaintSession::Buffered(mut session) => session.finish(),
        }
    }
}

/// Session drawing straight onto the supplied surface.
#[derive(Debug)]
pub struct DirectSession<'s, S: DrawingSurface> {
    surface: &'s mut S,
    ownership: SurfaceOwnership,
    ledger: ResourceLedger,
    closed: bool,
}

impl<S: DrawingSurface> DirectSession<'_, S> {
    fn finish(&mut self) -> RenderResult<SessionReport> {
        let report = SessionReport {
            strategy: SessionStrategy::Direct,
            drawing_surface_disposed: self.surface.is_disposed(),
            buffer_disposed: None,
            original_disposed: self.surface.is_disposed(),
        };
        if self.closed {
            return Ok(report);
        }
        self.closed = true;

        let was_disposed = self.surface.is_disposed();
        self.surface.commit();
        if self.ownership == SurfaceOwnership::Session {
            self.surface.dispose();
        }
        ResourceLedger::bump(&self.ledger.counts.sessions_closed);
        trace!(target: "horizon_arbor_render::session", "closed direct session");

        if was_disposed {
            return Err(RenderError::SurfaceDisposed);
        }
        Ok(SessionReport {
            drawing_surface_disposed: self.surface.is_disposed(),
            original_disposed: self.surface.is_disposed(),
            ..report
        })
    }
}

impl<S: DrawingSurface> Drop for DirectSession<'_, S> {
    fn drop(&mut self) {
        if !self.closed
            && let Err(err) = self.finish()
        {
            warn!(target: "horizon_arbor_render::session", %err, "direct session closed with error");
        }
    }
}

/// Session drawing into an off-screen buffer.
#[derive(Debug)]
pub struct BufferedSession<'s, S: DrawingSurface> {
    original: &'s mut S,
    buffer: RasterSurface,
    ownership: SurfaceOwnership,
    ledger: ResourceLedger,
    closed: bool,
}

impl<S: DrawingSurface> BufferedSession<'_, S> {
    fn report(&self) -> SessionReport {
        SessionReport {
            strategy: SessionStrategy::Buffered,
            drawing_surface_disposed: self.buffer.is_disposed(),
            buffer_disposed: Some(self.buffer.image().is_disposed()),
            original_disposed: self.original.is_disposed(),
        }
    }

    fn finish(&mut self) -> RenderResult<SessionReport> {
        if self.closed {
            return Ok(self.report());
        }
        self.closed = true;

        self.buffer.commit();
        self.buffer.dispose();

        let blitted = !self.original.is_disposed();
        if blitted {
            self.original.draw_image(self.buffer.image(), Point::ZERO);
            self.original.commit();
        }
        self.buffer.release_image();
        ResourceLedger::bump(&self.ledger.counts.buffers_disposed);

        if self.ownership == SurfaceOwnership::Session {
            self.original.dispose();
        }
        ResourceLedger::bump(&self.ledger.counts.sessions_closed);
        debug!(target: "horizon_arbor_render::session", blitted, "closed buffered session");

        if !blitted {
            return Err(RenderError::SurfaceDisposed);
        }
        Ok(self.report())
    }
}

impl<S: DrawingSurface> Drop for BufferedSession<'_, S> {
    fn drop(&mut self) {
        if !self.closed
            && let Err(err) = self.finish()
        {
            warn!(target: "horizon_arbor_render::session", %err, "buffered session closed with error");
        }
    }
}
