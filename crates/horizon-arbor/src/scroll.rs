//! Scrollbar visibility.
//!
//! Scrollbars belong to the host toolkit. The widget only decides whether
//! each bar should be shown and reads its thickness back.

use horizon_arbor_render::Size;

/// When a scrollbar is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBarPolicy {
    /// Shown when the content exceeds the viewport.
    #[default]
    AsNeeded,
    AlwaysOn,
    AlwaysOff,
}

impl ScrollBarPolicy {
    /// Whether a bar is visible given the viewport and content extent on its axis.
    pub fn is_visible(self, viewport: f32, content: f32) -> bool {
        match self {
            ScrollBarPolicy::AlwaysOn => true,
            ScrollBarPolicy::AlwaysOff => false,
            ScrollBarPolicy::AsNeeded => content > viewport,
        }
    }
}

/// A host scrollbar.
pub trait ScrollBar {
    fn set_visible(&mut self, visible: bool);

    fn is_visible(&self) -> bool;

    /// Outer size of the bar. Vertical bars report their width, horizontal
    /// bars their height, as the thickness.
    fn size(&self) -> Size;
}

/// A scrollbar with a fixed size and no native peer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedScrollBar {
    size: Size,
    visible: bool,
}

impl FixedScrollBar {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            visible: false,
        }
    }

    /// A vertical bar `thickness` wide.
    pub fn vertical(thickness: f32) -> Self {
        Self::new(Size::new(thickness, 0.0))
    }

    /// A horizontal bar `thickness` tall.
    pub fn horizontal(thickness: f32) -> Self {
        Self::new(Size::new(0.0, thickness))
    }
}

impl ScrollBar for FixedScrollBar {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn size(&self) -> Size {
        self.size
    }
}

/// The optional horizontal and vertical bars of a widget.
#[derive(Default)]
pub struct ScrollBars {
    pub(crate) horizontal: Option<Box<dyn ScrollBar>>,
    pub(crate) vertical: Option<Box<dyn ScrollBar>>,
    pub(crate) horizontal_policy: ScrollBarPolicy,
    pub(crate) vertical_policy: ScrollBarPolicy,
}

impl std::fmt::Debug for ScrollBars {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollBars")
            .field("horizontal", &self.horizontal.as_ref().map(|b| b.is_visible()))
            .field("vertical", &self.vertical.as_ref().map(|b| b.is_visible()))
            .field("horizontal_policy", &self.horizontal_policy)
            .field("vertical_policy", &self.vertical_policy)
            .finish()
    }
}

impl ScrollBars {
    /// Apply the policies for a widget of `bounds` showing `content`.
    ///
    /// A visible bar shrinks the viewport on the other axis, which may in
    /// turn require the other bar.
    pub fn update(&mut self, bounds: Size, content: Size) {
        let h_thickness = self.horizontal.as_ref().map_or(0.0, |b| b.size().height);
        let v_thickness = self.vertical.as_ref().map_or(0.0, |b| b.size().width);

        let mut show_h = self.horizontal.is_some()
            && self.horizontal_policy.is_visible(bounds.width, content.width);
        let mut show_v = self.vertical.is_some()
            && self.vertical_policy.is_visible(bounds.height, content.height);
        if show_h && !show_v {
            show_v = self.vertical.is_some()
                && self
                    .vertical_policy
                    .is_visible(bounds.height - h_thickness, content.height);
        }
        if show_v && !show_h {
            show_h = self.horizontal.is_some()
                && self
                    .horizontal_policy
                    .is_visible(bounds.width - v_thickness, content.width);
        }

        if let Some(bar) = self.horizontal.as_mut() {
            bar.set_visible(show_h);
        }
        if let Some(bar) = self.vertical.as_mut() {
            bar.set_visible(show_v);
        }
    }

    /// Size of the horizontal bar if shown.
    pub fn visible_horizontal(&self) -> Option<Size> {
        self.horizontal
            .as_ref()
            .filter(|b| b.is_visible())
            .map(|b| b.size())
    }

    /// Size of the vertical bar if shown.
    pub fn visible_vertical(&self) -> Option<Size> {
        self.vertical
            .as_ref()
            .filter(|b| b.is_visible())
            .map(|b| b.size())
    }

    /// The part of `bounds` not covered by visible bars.
    pub fn viewport(&self, bounds: Size) -> Size {
        Size::new(
            (bounds.width - self.visible_vertical().map_or(0.0, |s| s.width)).max(0.0),
            (bounds.height - self.visible_horizontal().map_or(0.0, |s| s.height)).max(0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars() -> ScrollBars {
        ScrollBars {
            horizontal: Some(Box::new(FixedScrollBar::horizontal(15.0))),
            vertical: Some(Box::new(FixedScrollBar::vertical(15.0))),
            ..ScrollBars::default()
        }
    }

    #[test]
    fn test_policy() {
        assert!(ScrollBarPolicy::AsNeeded.is_visible(10.0, 11.0));
        assert!(!ScrollBarPolicy::AsNeeded.is_visible(10.0, 10.0));
        assert!(ScrollBarPolicy::AlwaysOn.is_visible(10.0, 0.0));
        assert!(!ScrollBarPolicy::AlwaysOff.is_visible(10.0, 100.0));
    }

    #[test]
    fn test_fitting_content_hides_bars() {
        let mut bars = bars();
        bars.update(Size::new(100.0, 100.0), Size::new(80.0, 72.0));
        assert_eq!(bars.visible_horizontal(), None);
        assert_eq!(bars.visible_vertical(), None);
        assert_eq!(bars.viewport(Size::new(100.0, 100.0)), Size::new(100.0, 100.0));
    }

    #[test]
    fn test_tall_content_shows_vertical_bar() {
        let mut bars = bars();
        bars.update(Size::new(100.0, 50.0), Size::new(80.0, 72.0));
        assert_eq!(bars.visible_vertical(), Some(Size::new(15.0, 0.0)));
        assert_eq!(bars.visible_horizontal(), None);
        assert_eq!(bars.viewport(Size::new(100.0, 50.0)), Size::new(85.0, 50.0));
    }

    #[test]
    fn test_vertical_bar_can_force_horizontal() {
        let mut bars = bars();
        bars.update(Size::new(90.0, 50.0), Size::new(80.0, 72.0));
        assert!(bars.visible_vertical().is_some());
        assert!(bars.visible_horizontal().is_some());
    }

    #[test]
    fn test_always_off() {
        let mut bars = bars();
        bars.vertical_policy = ScrollBarPolicy::AlwaysOff;
        bars.update(Size::new(100.0, 50.0), Size::new(80.0, 500.0));
        assert_eq!(bars.visible_vertical(), None);
    }
}
