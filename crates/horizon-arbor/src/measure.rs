//! Text measurement.
//!
//! Font metrics belong to the host toolkit. The tree asks a [`TextMeasure`]
//! for the extent of every cell text; [`MonospaceMeasure`] is a fixed-advance
//! implementation for headless use.

use horizon_arbor_render::{Font, Size};

/// Options affecting how a text run is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextFlags {
    /// Expand tab characters to tab stops.
    pub expand_tabs: bool,
    /// Treat `&` as a mnemonic marker that takes no space (`&&` is a literal `&`).
    pub mnemonic: bool,
}

impl TextFlags {
    /// Flags used for cell text.
    pub const CELL: Self = Self {
        expand_tabs: true,
        mnemonic: false,
    };
}

/// Measures text runs in a given font.
pub trait TextMeasure {
    /// Extent of `text` drawn in `font`.
    fn measure(&self, font: &Font, flags: TextFlags, text: &str) -> Size;
}

/// Fixed-advance text metrics.
///
/// Every glyph is `advance × font.size / reference_size` wide, and lines are
/// `line_height × font.size / reference_size` tall.
#[derive(Debug, Clone, PartialEq)]
pub struct MonospaceMeasure {
    pub advance: f32,
    pub line_height: f32,
    pub reference_size: f32,
    /// Tab stop width in glyphs.
    pub tab_width: usize,
}

impl MonospaceMeasure {
    pub fn new(advance: f32, line_height: f32) -> Self {
        Self {
            advance,
            line_height,
            ..Self::default()
        }
    }

    fn glyph_count(&self, flags: TextFlags, text: &str) -> usize {
        let mut column = 0usize;
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '\t' if flags.expand_tabs && self.tab_width > 0 => {
                    column += self.tab_width - column % self.tab_width;
                }
                '&' if flags.mnemonic => {
                    if chars.peek() == Some(&'&') {
                        chars.next();
                        column += 1;
                    }
                }
                _ => column += 1,
            }
        }
        column
    }
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self {
            advance: 7.0,
            line_height: 15.0,
            reference_size: 9.0,
            tab_width: 8,
        }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn measure(&self, font: &Font, flags: TextFlags, text: &str) -> Size {
        let scale = if self.reference_size > 0.0 {
            font.size / self.reference_size
        } else {
            1.0
        };
        let glyphs = self.glyph_count(flags, text);
        Size::new(
            glyphs as f32 * self.advance * scale,
            self.line_height * scale,
        )
    }
}
