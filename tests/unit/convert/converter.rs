use std::io;

use super::*;
use crate::{
    animation::compositor::{Disposal, RawFrame},
    foundation::core::{CanvasSize, FrameRect, Rgba8},
};

fn red_over_blue() -> PixelGrid {
    let mut img = image::RgbaImage::new(4, 4);
    for (_, y, px) in img.enumerate_pixels_mut() {
        *px = if y < 2 {
            image::Rgba([255, 0, 0, 255])
        } else {
            image::Rgba([0, 0, 255, 255])
        };
    }
    PixelGrid::from_rgba_image(img)
}

fn checkerboard() -> PixelGrid {
    let mut img = image::RgbaImage::new(4, 4);
    for (x, y, px) in img.enumerate_pixels_mut() {
        *px = if (x + y) % 2 == 0 {
            image::Rgba([0, 0, 0, 255])
        } else {
            image::Rgba([255, 255, 255, 255])
        };
    }
    PixelGrid::from_rgba_image(img)
}

fn table_only(width: u32) -> Converter {
    Converter::new(
        ConvertOptions::default()
            .with_width(width)
            .with_html_wrapper(false, ""),
    )
    .unwrap()
}

fn to_string(conv: &Converter, grid: &PixelGrid) -> String {
    let mut buf = Vec::new();
    conv.convert_image(grid, &mut buf, &CancelToken::new())
        .unwrap();
    String::from_utf8(buf).unwrap()
}

fn three_frame_source() -> AnimatedSource {
    frame_source(3)
}

fn frame_source(count: u8) -> AnimatedSource {
    let frames = (0..count)
        .map(|i| RawFrame {
            rect: FrameRect::at_origin(4, 4),
            rgba: [i * 30, 255 - i * 30, 0, 255].repeat(16),
            disposal: Disposal::None,
            delay: Duration::from_millis(100),
        })
        .collect();
    AnimatedSource {
        canvas: Some(CanvasSize {
            width: 4,
            height: 4,
        }),
        frames,
    }
}

struct FailingSink;

impl Write for FailingSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn convert_merges_bands_into_two_cells() {
    let out = to_string(&table_only(4), &red_over_blue());
    assert!(out.contains(r#"<table width="4" height="4""#));
    assert!(out.contains(
        r##"<td colspan="4" rowspan="2" style="width:4px;height:2px" bgcolor="#ff0000"></td>"##
    ));
    assert!(out.contains(
        r##"<td colspan="4" rowspan="2" style="width:4px;height:2px" bgcolor="#0000ff"></td>"##
    ));
}

#[test]
fn convert_with_page_wrapper() {
    let conv = Converter::new(
        ConvertOptions::default()
            .with_width(4)
            .with_html_wrapper(true, "Test Art"),
    )
    .unwrap();
    let out = to_string(&conv, &red_over_blue());
    assert!(out.contains("<!DOCTYPE html>"));
    assert!(out.contains("<title>Test Art</title>"));
    assert!(out.contains("</html>"));
    assert!(out.contains("pixcel-container"));
}

#[test]
fn checkerboard_has_no_spans() {
    let out = to_string(&table_only(4), &checkerboard());
    assert!(!out.contains("colspan"));
    assert!(!out.contains("rowspan"));
}

#[test]
fn tall_image_crosses_several_poll_points() {
    let grid = PixelGrid::filled(2, 25, Rgba8::new(0, 255, 0, 255));
    let out = to_string(&table_only(2), &grid);
    assert!(out.contains(r##"bgcolor="#00ff00""##));
    assert!(out.contains(r#"rowspan="25""#));
}

#[test]
fn thin_image_keeps_at_least_one_row() {
    let grid = PixelGrid::filled(100, 1, Rgba8::new(128, 64, 32, 255));
    let out = to_string(&table_only(10), &grid);
    assert!(out.contains(r#"<table width="10" height="1""#));
}

#[test]
fn explicit_height_stretches() {
    let conv = Converter::new(
        ConvertOptions::default()
            .with_width(4)
            .with_height(8)
            .with_html_wrapper(false, ""),
    )
    .unwrap();
    let out = to_string(&conv, &red_over_blue());
    assert!(out.contains(r#"height="8""#));
}

#[test]
fn cancelled_conversion_writes_nothing() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut buf = Vec::new();
    let err = table_only(4)
        .convert_image(&red_over_blue(), &mut buf, &cancel)
        .unwrap_err();
    assert!(matches!(err, PixcelError::Cancelled));
    assert!(buf.is_empty());
}

#[test]
fn zero_sized_image_is_invalid() {
    let mut buf = Vec::new();
    let err = table_only(4)
        .convert_image(&PixelGrid::transparent(0, 0), &mut buf, &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, PixcelError::InvalidDimensions));
}

#[test]
fn sink_failure_is_propagated_verbatim() {
    let err = table_only(4)
        .convert_image(&red_over_blue(), &mut FailingSink, &CancelToken::new())
        .unwrap_err();
    match err {
        PixcelError::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn option_defaults_and_ignored_values() {
    let o = ConvertOptions::default();
    assert_eq!(o.width, DEFAULT_WIDTH);
    assert!(o.with_html);
    assert_eq!(o.title, DEFAULT_TITLE);
    assert_eq!(o.scaler, Scaler::Nearest);

    assert_eq!(ConvertOptions::default().with_width(0).width, DEFAULT_WIDTH);
    assert_eq!(ConvertOptions::default().with_height(0).height, None);
    assert_eq!(
        ConvertOptions::default().with_html_wrapper(true, "").title,
        DEFAULT_TITLE
    );
    assert!(!ConvertOptions::default().with_html_wrapper(false, "").with_html);
}

#[test]
fn invalid_options_are_rejected() {
    let o = ConvertOptions {
        width: 0,
        ..ConvertOptions::default()
    };
    assert!(matches!(Converter::new(o), Err(PixcelError::Validation(_))));
}

#[test]
fn options_load_from_json_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pixcel.json");
    std::fs::write(&path, r#"{ "width": 12, "scaler": "catmullrom", "title": "Cfg" }"#).unwrap();

    let o = ConvertOptions::from_json_path(&path).unwrap();
    assert_eq!(o.width, 12);
    assert_eq!(o.scaler, Scaler::CatmullRom);
    assert_eq!(o.title, "Cfg");
    assert!(o.with_html);

    std::fs::write(&path, r#"{ "colour": "red" }"#).unwrap();
    assert!(matches!(
        ConvertOptions::from_json_path(&path),
        Err(PixcelError::Other(_))
    ));
}

#[test]
fn animation_emits_one_layer_per_frame() {
    let conv = Converter::new(ConvertOptions::default().with_width(4)).unwrap();
    let mut buf = Vec::new();
    conv.convert_animation(&three_frame_source(), &mut buf, &CancelToken::new())
        .unwrap();
    let out = String::from_utf8(buf).unwrap();

    assert!(out.contains("@keyframes pixcel-anim"));
    assert_eq!(out.matches(r#"class="pixcel-frame""#).count(), 3);
    assert!(out.contains("animation-duration:0.300s"));
}

#[test]
fn animation_layout_carries_frame_timing() {
    let conv = Converter::new(ConvertOptions::default().with_width(2)).unwrap();
    let doc = conv
        .layout_animation(&three_frame_source(), &CancelToken::new())
        .unwrap();

    assert_eq!((doc.width, doc.height), (2, 2));
    assert_eq!(doc.frames.len(), 3);
    assert_eq!(doc.frames[2].offset, Duration::from_millis(200));
    for (frame, window) in doc.frames_with_windows() {
        assert_eq!(frame.duration, window.duration);
        assert_eq!(frame.layout.cell_count(), 1);
    }
}

#[test]
fn empty_animation_is_rejected() {
    let conv = Converter::new(ConvertOptions::default()).unwrap();
    let mut buf = Vec::new();
    let err = conv
        .convert_animation(&AnimatedSource::default(), &mut buf, &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, PixcelError::NoFrames));
}

#[test]
fn cancel_at_any_poll_point_discards_the_whole_animation() {
    // 7 frames of 4x4: one check before compositing, frames 0 and 5 while
    // compositing, frames 0 and 5 before meshing, and row 0 of each of the 7 meshes.
    const POLLS: usize = 12;
    let conv = Converter::new(ConvertOptions::default().with_width(4)).unwrap();
    let source = frame_source(7);

    for passed in 0..POLLS {
        let cancel = CancelToken::cancel_after_polls(passed);
        let mut buf = Vec::new();
        let err = conv
            .convert_animation(&source, &mut buf, &cancel)
            .unwrap_err();
        assert!(matches!(err, PixcelError::Cancelled), "poll {passed}: {err:?}");
        assert!(buf.is_empty(), "poll {passed} left partial output");
    }

    let mut buf = Vec::new();
    conv.convert_animation(&source, &mut buf, &CancelToken::cancel_after_polls(POLLS))
        .unwrap();
    assert_eq!(
        String::from_utf8(buf).unwrap().matches(r#"class="pixcel-frame""#).count(),
        7
    );
}

#[test]
fn overflowing_frame_delays_are_rejected() {
    let mut source = frame_source(2);
    source.frames[0].delay = Duration::MAX;
    let err = Converter::new(ConvertOptions::default())
        .unwrap()
        .layout_animation(&source, &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, PixcelError::Validation(_)));
}
