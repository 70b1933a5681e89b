//! CPU-side RGBA images.
//!
//! [`Image`] backs both cell icons and the off-screen buffers that paint
//! sessions allocate for double buffering. It wraps `image::RgbaImage` and adds
//! an explicit disposal flag so that buffer lifetimes can be audited.

use image::{Rgba, RgbaImage};

use crate::error::{RenderError, RenderResult};
use crate::types::{Color, Rect, Size};

/// An RGBA8 pixel image with explicit disposal.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pixels: RgbaImage,
    disposed: bool,
}

impl Image {
    /// Create a transparent image of the given pixel dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidDimensions`] if either dimension is zero.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        Ok(Self {
            pixels: RgbaImage::new(width, height),
            disposed: false,
        })
    }

    /// Create an image filled with a solid color.
    pub fn from_color(width: u32, height: u32, color: Color) -> RenderResult<Self> {
        let mut image = Self::new(width, height)?;
        image.fill(color);
        Ok(image)
    }

    /// Wrap an existing RGBA buffer.
    pub fn from_rgba_image(pixels: RgbaImage) -> RenderResult<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(RenderError::InvalidDimensions {
                width: pixels.width(),
                height: pixels.height(),
            });
        }
        Ok(Self {
            pixels,
            disposed: false,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Logical size of the image.
    #[inline]
    pub fn size(&self) -> Size {
        Size::from((self.width(), self.height()))
    }

    /// Bounds of the image anchored at the origin.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(Default::default(), self.size())
    }

    /// Read a pixel, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let Rgba([r, g, b, a]) = *self.pixels.get_pixel(x, y);
        Some(Color::from_rgba8(r, g, b, a))
    }

    /// Overwrite a pixel. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width() && y < self.height() {
            self.pixels.put_pixel(x, y, Rgba(color.to_rgba8()));
        }
    }

    /// Source-over composite a color onto a pixel. Out-of-bounds writes are ignored.
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Color) {
        if color.is_opaque() {
            self.set_pixel(x, y, color);
            return;
        }
        if color.a <= 0.0 {
            return;
        }
        let Some(dst) = self.pixel(x, y) else {
            return;
        };
        let inv = 1.0 - color.a;
        let out = Color::new(
            color.r + dst.r * inv,
            color.g + dst.g * inv,
            color.b + dst.b * inv,
            color.a + dst.a * inv,
        );
        self.set_pixel(x, y, out);
    }

    /// Fill the whole image with one color.
    pub fn fill(&mut self, color: Color) {
        let rgba = Rgba(color.to_rgba8());
        for pixel in self.pixels.pixels_mut() {
            *pixel = rgba;
        }
    }

    /// Borrow the underlying pixel buffer.
    #[inline]
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Release the image. Pixel data stays readable for diagnostics.
    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}
