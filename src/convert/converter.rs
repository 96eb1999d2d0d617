use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;

use crate::{
    animation::compositor::{AnimatedSource, composite_frames},
    animation::timeline::{Timeline, VisibilityWindow},
    assets::decode::{Source, decode_source},
    assets::scale::{Scaler, scale_grid, target_dimensions},
    foundation::cancel::{CancelToken, FRAME_POLL_FRAMES},
    foundation::core::PixelGrid,
    foundation::error::{PixcelError, PixcelResult},
    mesh::mesher::{Layout, mesh_grid},
    render::html::{HtmlOptions, write_animated_document, write_static_document},
};

/// Default output width in cells.
pub const DEFAULT_WIDTH: u32 = 56;
/// Default page title.
pub const DEFAULT_TITLE: &str = "Pixel Art";

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Conversion settings. Plain data: pass it in, nothing is read from globals.
pub struct ConvertOptions {
    /// Output width in cells.
    pub width: u32,
    /// Output height in cells; proportional to the source when `None`.
    pub height: Option<u32>,
    /// Wrap the table in a full HTML page.
    pub with_html: bool,
    /// Page title (page mode only).
    pub title: String,
    /// Hide the page until it has fully loaded.
    pub smooth_load: bool,
    /// Resampling filter.
    pub scaler: Scaler,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: None,
            with_html: true,
            title: DEFAULT_TITLE.to_string(),
            smooth_load: false,
            scaler: Scaler::Nearest,
        }
    }
}

impl ConvertOptions {
    /// Set the output width; zero is ignored.
    pub fn with_width(mut self, width: u32) -> Self {
        if width > 0 {
            self.width = width;
        }
        self
    }

    /// Set an explicit output height; zero is ignored.
    pub fn with_height(mut self, height: u32) -> Self {
        if height > 0 {
            self.height = Some(height);
        }
        self
    }

    /// Toggle the page wrapper; an empty title keeps the current one.
    pub fn with_html_wrapper(mut self, enabled: bool, title: &str) -> Self {
        self.with_html = enabled;
        if !title.is_empty() {
            self.title = title.to_string();
        }
        self
    }

    pub fn with_smooth_load(mut self, enabled: bool) -> Self {
        self.smooth_load = enabled;
        self
    }

    pub fn with_scaler(mut self, scaler: Scaler) -> Self {
        self.scaler = scaler;
        self
    }

    pub fn validate(&self) -> PixcelResult<()> {
        if self.width == 0 {
            return Err(PixcelError::validation("width must be > 0"));
        }
        if self.height == Some(0) {
            return Err(PixcelError::validation("height must be > 0 when set"));
        }
        Ok(())
    }

    /// Read options from a JSON file; missing fields take their defaults.
    pub fn from_json_path(path: &Path) -> PixcelResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let opts: Self = serde_json::from_str(&text)
            .with_context(|| format!("parse config '{}'", path.display()))?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn html(&self) -> HtmlOptions {
        HtmlOptions {
            with_html: self.with_html,
            title: self.title.clone(),
            smooth_load: self.smooth_load,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
/// Meshed single image at its output size.
pub struct StaticDocument {
    pub width: u32,
    pub height: u32,
    pub layout: Layout,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
/// One displayed animation frame.
pub struct Frame {
    /// Meshed, scaled, fully composited pixels.
    pub layout: Layout,
    /// Start relative to the loop start.
    pub offset: Duration,
    /// Normalized display duration.
    pub duration: Duration,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Meshed animation plus its loop timing.
pub struct AnimatedDocument {
    pub width: u32,
    pub height: u32,
    pub frames: Vec<Frame>,
    pub timeline: Timeline,
}

impl AnimatedDocument {
    /// Frames paired with their visibility windows.
    pub fn frames_with_windows(&self) -> impl Iterator<Item = (&Frame, &VisibilityWindow)> {
        self.frames.iter().zip(self.timeline.windows.iter())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// Either kind of meshed document.
pub enum Document {
    Static(StaticDocument),
    Animated(AnimatedDocument),
}

/// Turns decoded images into meshed documents and writes them as HTML.
///
/// All layouts are computed before the first byte reaches the sink, so a cancelled or
/// failed conversion never leaves partial markup behind.
#[derive(Clone, Debug)]
pub struct Converter {
    opts: ConvertOptions,
}

impl Converter {
    pub fn new(opts: ConvertOptions) -> PixcelResult<Self> {
        opts.validate()?;
        Ok(Self { opts })
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.opts
    }

    /// Scale and mesh a single image.
    pub fn layout_image(
        &self,
        grid: &PixelGrid,
        cancel: &CancelToken,
    ) -> PixcelResult<StaticDocument> {
        let (width, height) =
            target_dimensions(grid.width(), grid.height(), self.opts.width, self.opts.height)?;
        cancel.check()?;

        let scaled = scale_grid(grid, width, height, self.opts.scaler)?;
        let layout = mesh_grid(&scaled, cancel)?;
        Ok(StaticDocument {
            width,
            height,
            layout,
        })
    }

    /// Composite, scale and mesh every frame of an animation, and build its timeline.
    ///
    /// The output size is derived from the first composited frame.
    pub fn layout_animation(
        &self,
        source: &AnimatedSource,
        cancel: &CancelToken,
    ) -> PixcelResult<AnimatedDocument> {
        if source.frames.is_empty() {
            return Err(PixcelError::NoFrames);
        }
        let canvas = source.canvas_size()?;
        let (width, height) =
            target_dimensions(canvas.width, canvas.height, self.opts.width, self.opts.height)?;
        let timeline = Timeline::build(&source.delays())?;
        cancel.check()?;

        let composited = composite_frames(source, cancel)?;
        let mut frames = Vec::with_capacity(composited.len());
        for (i, (grid, window)) in composited.iter().zip(&timeline.windows).enumerate() {
            if i % FRAME_POLL_FRAMES == 0 {
                cancel.check()?;
            }
            let scaled = scale_grid(grid, width, height, self.opts.scaler)?;
            frames.push(Frame {
                layout: mesh_grid(&scaled, cancel)?,
                offset: window.offset,
                duration: window.duration,
            });
        }

        Ok(AnimatedDocument {
            width,
            height,
            frames,
            timeline,
        })
    }

    /// Decode `bytes` and mesh them, picking the animated path for multi-frame GIFs.
    pub fn layout_bytes(&self, bytes: &[u8], cancel: &CancelToken) -> PixcelResult<Document> {
        match decode_source(bytes)? {
            Source::Static(grid) => self.layout_image(&grid, cancel).map(Document::Static),
            Source::Animated(anim) => {
                self.layout_animation(&anim, cancel).map(Document::Animated)
            }
        }
    }

    /// Convert a single image and write the document to `out`.
    #[tracing::instrument(skip_all, fields(src_w = grid.width(), src_h = grid.height()))]
    pub fn convert_image<W: Write + ?Sized>(
        &self,
        grid: &PixelGrid,
        out: &mut W,
        cancel: &CancelToken,
    ) -> PixcelResult<()> {
        let doc = self.layout_image(grid, cancel)?;
        self.write_document(out, &Document::Static(doc))
    }

    /// Convert an animation and write the document to `out`.
    #[tracing::instrument(skip_all, fields(frames = source.frames.len()))]
    pub fn convert_animation<W: Write + ?Sized>(
        &self,
        source: &AnimatedSource,
        out: &mut W,
        cancel: &CancelToken,
    ) -> PixcelResult<()> {
        let doc = self.layout_animation(source, cancel)?;
        self.write_document(out, &Document::Animated(doc))
    }

    /// Decode, convert and write in one call.
    #[tracing::instrument(skip_all, fields(bytes = bytes.len()))]
    pub fn convert_bytes<W: Write + ?Sized>(
        &self,
        bytes: &[u8],
        out: &mut W,
        cancel: &CancelToken,
    ) -> PixcelResult<()> {
        let doc = self.layout_bytes(bytes, cancel)?;
        self.write_document(out, &doc)
    }

    /// Write an already meshed document. Sink errors come back as
    /// [`PixcelError::Io`], untouched.
    pub fn write_document<W: Write + ?Sized>(
        &self,
        out: &mut W,
        doc: &Document,
    ) -> PixcelResult<()> {
        let html = self.opts.html();
        let mut buf = BufWriter::new(out);
        match doc {
            Document::Static(d) => {
                tracing::debug!(cells = d.layout.cell_count(), "writing static document");
                write_static_document(&mut buf, &html, d)?;
            }
            Document::Animated(d) => {
                tracing::debug!(
                    frames = d.frames.len(),
                    total_ms = d.timeline.total.as_millis() as u64,
                    "writing animated document"
                );
                write_animated_document(&mut buf, &html, d)?;
            }
        }
        buf.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/convert/converter.rs"]
mod tests;
