use std::io::Cursor;

use crate::{
    animation::compositor::{AnimatedSource, Disposal, RawFrame},
    animation::timeline::centis_to_duration,
    foundation::core::{CanvasSize, FrameRect, PixelGrid},
    foundation::error::{PixcelError, PixcelResult},
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// A decoded input, still at its original resolution.
pub enum Source {
    /// Any single-image input, including one-frame GIFs.
    Static(PixelGrid),
    /// A GIF with more than one frame.
    Animated(AnimatedSource),
}

/// Decode encoded bytes, routing multi-frame GIFs to the animated path.
///
/// GIF bytes that fail to decode as an animation, or that hold a single frame, go
/// through the regular image decoder.
pub fn decode_source(bytes: &[u8]) -> PixcelResult<Source> {
    if looks_like_gif(bytes) {
        match decode_gif(bytes) {
            Ok(anim) if anim.frames.len() > 1 => return Ok(Source::Animated(anim)),
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %e, "gif decode failed, trying static decode"),
        }
    }
    decode_image(bytes).map(Source::Static)
}

/// Decode any format the `image` crate understands into straight RGBA8.
pub fn decode_image(bytes: &[u8]) -> PixcelResult<PixelGrid> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| PixcelError::decode(format!("decode image from memory: {e}")))?;
    Ok(PixelGrid::from_rgba_image(dyn_img.to_rgba8()))
}

/// Decode every frame of a GIF without compositing.
///
/// Frames keep their own rectangle, disposal and delay; the logical screen size
/// becomes the canvas size.
pub fn decode_gif(bytes: &[u8]) -> PixcelResult<AnimatedSource> {
    let mut opts = gif::DecodeOptions::new();
    opts.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = opts
        .read_info(Cursor::new(bytes))
        .map_err(|e| PixcelError::decode(format!("read gif header: {e}")))?;

    let canvas = CanvasSize {
        width: u32::from(decoder.width()),
        height: u32::from(decoder.height()),
    };

    let mut frames = Vec::new();
    while let Some(frame) = decoder
        .read_next_frame()
        .map_err(|e| PixcelError::decode(format!("read gif frame {}: {e}", frames.len())))?
    {
        frames.push(RawFrame {
            rect: FrameRect {
                left: u32::from(frame.left),
                top: u32::from(frame.top),
                width: u32::from(frame.width),
                height: u32::from(frame.height),
            },
            rgba: frame.buffer.to_vec(),
            disposal: disposal_from_gif(frame.dispose),
            delay: centis_to_duration(frame.delay),
        });
    }

    Ok(AnimatedSource {
        canvas: Some(canvas),
        frames,
    })
}

fn disposal_from_gif(method: gif::DisposalMethod) -> Disposal {
    match method {
        gif::DisposalMethod::Any | gif::DisposalMethod::Keep => Disposal::None,
        gif::DisposalMethod::Background => Disposal::Background,
        gif::DisposalMethod::Previous => Disposal::Previous,
    }
}

fn looks_like_gif(bytes: &[u8]) -> bool {
    bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a")
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
