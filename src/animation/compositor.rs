use std::time::Duration;

use crate::foundation::cancel::{CancelToken, FRAME_POLL_FRAMES};
use crate::foundation::core::{CanvasSize, FrameRect, PixelGrid, rgba_len};
use crate::foundation::error::{PixcelError, PixcelResult};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
/// How the canvas is prepared for the next frame once a frame has been shown.
pub enum Disposal {
    /// Leave the canvas as drawn.
    #[default]
    None,
    /// Clear the frame's rectangle back to transparent.
    Background,
    /// Restore the canvas to the previous displayed frame. On the first frame there
    /// is none, so the canvas goes back to fully transparent.
    Previous,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// One frame as stored in the source, before compositing.
pub struct RawFrame {
    /// Placement on the canvas.
    pub rect: FrameRect,
    /// Straight RGBA8, `rect.width * rect.height * 4` bytes, row-major.
    pub rgba: Vec<u8>,
    /// Canvas preparation applied after this frame is snapshotted.
    pub disposal: Disposal,
    /// Display duration as declared by the source (zero allowed).
    pub delay: Duration,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// An animated source ready for compositing.
pub struct AnimatedSource {
    /// Declared logical canvas size, if any.
    pub canvas: Option<CanvasSize>,
    /// Frames in display order.
    pub frames: Vec<RawFrame>,
}

impl AnimatedSource {
    /// The canvas size compositing will use.
    ///
    /// Falls back to the first frame's right/bottom edge when no non-degenerate size
    /// is declared.
    pub fn canvas_size(&self) -> PixcelResult<CanvasSize> {
        let first = self.frames.first().ok_or(PixcelError::NoFrames)?;
        let size = match self.canvas {
            Some(c) if !c.is_degenerate() => c,
            _ => CanvasSize {
                width: first.rect.right(),
                height: first.rect.bottom(),
            },
        };
        if size.is_degenerate() {
            return Err(PixcelError::InvalidDimensions);
        }
        Ok(size)
    }

    /// Declared per-frame delays in display order.
    pub fn delays(&self) -> Vec<Duration> {
        self.frames.iter().map(|f| f.delay).collect()
    }
}

/// Resolve every raw frame into a full-canvas grid.
///
/// Each frame is drawn source-over onto a persistent canvas, the canvas is snapshotted
/// as that frame's grid, and only then is the frame's [`Disposal`] applied.
/// `cancel` is polled every [`FRAME_POLL_FRAMES`] frames.
#[tracing::instrument(skip(source, cancel), fields(frames = source.frames.len()))]
pub fn composite_frames(
    source: &AnimatedSource,
    cancel: &CancelToken,
) -> PixcelResult<Vec<PixelGrid>> {
    let size = source.canvas_size()?;
    for (i, frame) in source.frames.iter().enumerate() {
        let expected = rgba_len(frame.rect.width, frame.rect.height)?;
        if frame.rgba.len() != expected {
            return Err(PixcelError::validation(format!(
                "frame {i}: rgba buffer must be {expected} bytes, got {}",
                frame.rgba.len()
            )));
        }
    }

    let mut canvas = image::RgbaImage::new(size.width, size.height);
    let mut snapshots: Vec<PixelGrid> = Vec::with_capacity(source.frames.len());

    for (i, frame) in source.frames.iter().enumerate() {
        if i % FRAME_POLL_FRAMES == 0 {
            cancel.check()?;
        }

        draw_over(&mut canvas, frame);
        snapshots.push(PixelGrid::from_rgba_image(canvas.clone()));

        match frame.disposal {
            Disposal::None => {}
            Disposal::Background => clear_rect(&mut canvas, frame.rect),
            Disposal::Previous => match i.checked_sub(1) {
                Some(prev) => canvas.clone_from(snapshots[prev].as_rgba_image()),
                None => clear_rect(&mut canvas, FrameRect::at_origin(size.width, size.height)),
            },
        }
    }

    tracing::debug!(
        width = size.width,
        height = size.height,
        frames = snapshots.len(),
        "composited animation"
    );
    Ok(snapshots)
}

fn draw_over(canvas: &mut image::RgbaImage, frame: &RawFrame) {
    let x_end = frame.rect.right().min(canvas.width());
    let y_end = frame.rect.bottom().min(canvas.height());
    let stride = frame.rect.width as usize * 4;

    for y in frame.rect.top..y_end {
        let row = (y - frame.rect.top) as usize * stride;
        for x in frame.rect.left..x_end {
            let i = row + (x - frame.rect.left) as usize * 4;
            let src = [
                frame.rgba[i],
                frame.rgba[i + 1],
                frame.rgba[i + 2],
                frame.rgba[i + 3],
            ];
            let px = canvas.get_pixel_mut(x, y);
            px.0 = over(px.0, src);
        }
    }
}

fn clear_rect(canvas: &mut image::RgbaImage, rect: FrameRect) {
    let x_end = rect.right().min(canvas.width());
    let y_end = rect.bottom().min(canvas.height());
    for y in rect.top..y_end {
        for x in rect.left..x_end {
            canvas.put_pixel(x, y, image::Rgba([0, 0, 0, 0]));
        }
    }
}

/// Straight-alpha source-over.
pub(crate) fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let sa = u32::from(src[3]);
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }

    let da = u32::from(dst[3]);
    let inv = 255 - sa;
    // Output alpha scaled by 255.
    let out_a = sa * 255 + da * inv;

    let mut out = [0u8; 4];
    for c in 0..3 {
        let num = u32::from(src[c]) * sa * 255 + u32::from(dst[c]) * da * inv;
        out[c] = ((num + out_a / 2) / out_a).min(255) as u8;
    }
    out[3] = ((out_a + 127) / 255) as u8;
    out
}

#[cfg(test)]
#[path = "../../tests/unit/animation/compositor.rs"]
mod tests;
