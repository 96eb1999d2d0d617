//! pixcel renders raster images as HTML table pixel art.
//!
//! Every image becomes a `<table>` whose cells are the maximal same-color rectangles
//! found by a greedy raster-order mesher, so large flat areas collapse into a single
//! `<td>` with `colspan`/`rowspan`. Animated GIFs are composited frame by frame and
//! rendered as stacked tables driven by CSS `@keyframes`.
//!
//! # Pipeline overview
//!
//! 1. **Decode**: bytes -> [`Source`] (a [`PixelGrid`] or an [`AnimatedSource`] of raw frames)
//! 2. **Composite** (animations only): raw frames -> one full-canvas grid per frame
//! 3. **Scale**: grid -> grid at the target cell size
//! 4. **Mesh**: grid -> [`Layout`] of [`Cell`]s
//! 5. **Time** (animations only): frame delays -> [`Timeline`]
//! 6. **Write**: documents -> HTML on any [`std::io::Write`] sink
//!
//! Conversions are synchronous and single-threaded. Long passes poll a
//! [`CancelToken`] at fixed intervals; a cancelled conversion returns
//! [`PixcelError::Cancelled`] and writes nothing.
#![forbid(unsafe_code)]

mod animation;
mod assets;
mod convert;
mod foundation;
mod mesh;
mod render;

pub use animation::compositor::{AnimatedSource, Disposal, RawFrame, composite_frames};
pub use animation::timeline::{
    MIN_FRAME_DURATION, OpacityKeyframe, Timeline, VisibilityWindow, centis_to_duration,
    normalize_duration,
};
pub use assets::decode::{Source, decode_gif, decode_image, decode_source};
pub use assets::scale::{Scaler, scale_grid, target_dimensions};
pub use convert::converter::{
    AnimatedDocument, ConvertOptions, Converter, DEFAULT_TITLE, DEFAULT_WIDTH, Document, Frame,
    StaticDocument,
};
pub use foundation::cancel::{CancelToken, FRAME_POLL_FRAMES, MESH_POLL_ROWS};
pub use foundation::core::{CanvasSize, FrameRect, PixelGrid, Rgb8, Rgba8};
pub use foundation::error::{PixcelError, PixcelResult};
pub use mesh::mesher::{Cell, Layout, PlacedCell, Row, mesh_grid};
pub use render::html::{HtmlOptions, write_animated_document, write_static_document};
