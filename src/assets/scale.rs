use image::imageops::FilterType;

use crate::foundation::core::PixelGrid;
use crate::foundation::error::{PixcelError, PixcelResult};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
/// Resampling filter used to bring a source image to the target cell grid.
pub enum Scaler {
    /// Nearest neighbor; keeps hard pixel edges and so merges best.
    #[default]
    Nearest,
    /// Catmull-Rom cubic.
    CatmullRom,
    /// Bilinear.
    Bilinear,
    /// Bilinear, historically a cheaper approximation; same filter here.
    ApproxBilinear,
}

impl Scaler {
    /// Parse a scaler name case-insensitively; unknown names select [`Scaler::Nearest`].
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "catmullrom" => Self::CatmullRom,
            "bilinear" => Self::Bilinear,
            "approxbilinear" => Self::ApproxBilinear,
            _ => Self::Nearest,
        }
    }

    pub fn filter(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Bilinear | Self::ApproxBilinear => FilterType::Triangle,
        }
    }
}

/// Resolve the output grid size for a source of `orig_w`×`orig_h`.
///
/// Without an explicit height the aspect ratio is kept: `round(orig_h * target_w /
/// orig_w)`, never less than one row.
pub fn target_dimensions(
    orig_w: u32,
    orig_h: u32,
    target_w: u32,
    target_h: Option<u32>,
) -> PixcelResult<(u32, u32)> {
    if orig_w == 0 || orig_h == 0 || target_w == 0 {
        return Err(PixcelError::InvalidDimensions);
    }

    let height = match target_h {
        Some(h) if h > 0 => h,
        _ => {
            let h = (f64::from(orig_h) * f64::from(target_w) / f64::from(orig_w)).round();
            (h as u32).max(1)
        }
    };
    Ok((target_w, height))
}

/// Resample `grid` to exactly `width`×`height`.
pub fn scale_grid(
    grid: &PixelGrid,
    width: u32,
    height: u32,
    scaler: Scaler,
) -> PixcelResult<PixelGrid> {
    if grid.is_degenerate() || width == 0 || height == 0 {
        return Err(PixcelError::InvalidDimensions);
    }
    if grid.width() == width && grid.height() == height {
        return Ok(grid.clone());
    }
    let resized = image::imageops::resize(grid.as_rgba_image(), width, height, scaler.filter());
    Ok(PixelGrid::from_rgba_image(resized))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/scale.rs"]
mod tests;
