use crate::foundation::error::{PixcelError, PixcelResult};

/// Opaque 8-bit RGB color; the color of a mesh cell.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    /// Construct from components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Straight (non-premultiplied) RGBA8.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Construct from components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Drop the alpha channel.
    pub const fn rgb(self) -> Rgb8 {
        Rgb8::new(self.r, self.g, self.b)
    }

    /// Color channels scaled by alpha, rounded to nearest.
    pub const fn premultiplied_rgb(self) -> Rgb8 {
        let a = self.a as u16;
        Rgb8::new(
            premul(self.r, a),
            premul(self.g, a),
            premul(self.b, a),
        )
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

const fn premul(c: u8, a: u16) -> u8 {
    ((c as u16 * a + 127) / 255) as u8
}

/// Logical size of an animation canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn is_degenerate(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Integer bounding rectangle of a raw frame, relative to the canvas origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl FrameRect {
    /// Rectangle at the origin.
    pub fn at_origin(width: u32, height: u32) -> Self {
        Self {
            left: 0,
            top: 0,
            width,
            height,
        }
    }

    pub fn right(self) -> u32 {
        self.left.saturating_add(self.width)
    }

    pub fn bottom(self) -> u32 {
        self.top.saturating_add(self.height)
    }
}

/// Immutable W×H grid of straight RGBA8 pixels.
///
/// Backed by an [`image::RgbaImage`] so decoding and scaling hand their buffers over
/// without copying. A grid may have a zero dimension; consumers that cannot handle
/// that reject it with [`PixcelError::InvalidDimensions`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    image: image::RgbaImage,
}

impl PixelGrid {
    /// Wrap a raw RGBA8 buffer, validating its length against the dimensions.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> PixcelResult<Self> {
        let expected = rgba_len(width, height)?;
        if rgba.len() != expected {
            return Err(PixcelError::validation(format!(
                "rgba buffer for {width}x{height} must be {expected} bytes, got {}",
                rgba.len()
            )));
        }
        let image = image::RgbaImage::from_raw(width, height, rgba)
            .ok_or_else(|| PixcelError::validation("rgba buffer does not fit dimensions"))?;
        Ok(Self { image })
    }

    /// Fully transparent grid.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            image: image::RgbaImage::new(width, height),
        }
    }

    /// Grid filled with a single color.
    pub fn filled(width: u32, height: u32, color: Rgba8) -> Self {
        Self {
            image: image::RgbaImage::from_pixel(width, height, image::Rgba(color.to_array())),
        }
    }

    pub fn from_rgba_image(image: image::RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `true` when either dimension is zero.
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Sample all four channels at `(x, y)`. Panics when out of bounds.
    pub fn rgba(&self, x: u32, y: u32) -> Rgba8 {
        let [r, g, b, a] = self.image.get_pixel(x, y).0;
        Rgba8::new(r, g, b, a)
    }

    /// Sample the visible color at `(x, y)`: channels premultiplied by alpha, so every
    /// fully transparent pixel reads as black. Panics when out of bounds.
    pub fn rgb(&self, x: u32, y: u32) -> Rgb8 {
        self.rgba(x, y).premultiplied_rgb()
    }

    pub fn as_rgba_image(&self) -> &image::RgbaImage {
        &self.image
    }

    pub fn into_rgba_image(self) -> image::RgbaImage {
        self.image
    }

    /// Row-major RGBA8 bytes.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }
}

pub(crate) fn rgba_len(width: u32, height: u32) -> PixcelResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| PixcelError::validation("pixel buffer size overflows usize"))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
