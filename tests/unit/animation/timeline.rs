use super::*;

fn kf(percent: f64, visible: bool) -> OpacityKeyframe {
    OpacityKeyframe { percent, visible }
}

#[test]
fn zero_delay_is_clamped_and_windows_partition_the_loop() {
    let delays = [10u16, 0, 20].map(centis_to_duration);
    let t = Timeline::build(&delays).unwrap();

    assert_eq!(t.total, Duration::from_millis(400));
    let bounds: Vec<(f64, f64)> = t
        .windows
        .iter()
        .map(|w| (w.on_percent, w.off_percent))
        .collect();
    assert_eq!(bounds, vec![(0.0, 25.0), (25.0, 50.0), (50.0, 100.0)]);
    assert_eq!(t.windows[1].duration, MIN_FRAME_DURATION);
    assert_eq!(t.windows[2].offset, Duration::from_millis(200));
    assert!((t.total_secs() - 0.4).abs() < 1e-12);
}

#[test]
fn keyframes_follow_visibility_rules() {
    let t = Timeline::build(&[Duration::from_millis(100); 3]).unwrap();

    let first = &t.windows[0].keyframes;
    let on1 = t.windows[0].off_percent;
    assert_eq!(first, &vec![kf(0.0, true), kf(on1, false), kf(100.0, false)]);

    let middle = &t.windows[1].keyframes;
    let off2 = t.windows[1].off_percent;
    assert_eq!(
        middle,
        &vec![kf(0.0, false), kf(on1, true), kf(off2, false), kf(100.0, false)]
    );

    let last = &t.windows[2].keyframes;
    assert_eq!(last, &vec![kf(0.0, false), kf(off2, true), kf(100.0, true)]);
}

#[test]
fn single_frame_is_always_visible() {
    let t = Timeline::build(&[Duration::ZERO]).unwrap();
    assert_eq!(t.total, MIN_FRAME_DURATION);
    assert_eq!(t.windows[0].keyframes, vec![kf(0.0, true), kf(100.0, true)]);
}

#[test]
fn windows_are_contiguous_for_uneven_delays() {
    let delays = [7u16, 3, 11, 0, 13, 1].map(centis_to_duration);
    let t = Timeline::build(&delays).unwrap();

    assert_eq!(t.windows[0].on_percent, 0.0);
    for pair in t.windows.windows(2) {
        assert_eq!(pair[0].off_percent, pair[1].on_percent);
        assert!(pair[0].on_percent < pair[0].off_percent);
    }
    assert_eq!(t.windows.last().unwrap().off_percent, 100.0);
}

#[test]
fn empty_durations_are_rejected() {
    assert!(matches!(Timeline::build(&[]), Err(PixcelError::NoFrames)));
}

#[test]
fn overflowing_total_is_a_validation_error() {
    let err = Timeline::build(&[Duration::MAX, Duration::from_millis(10)]).unwrap_err();
    assert!(matches!(err, PixcelError::Validation(_)));
    assert!(err.to_string().contains("overflows"));
}

#[test]
fn largest_representable_total_still_builds() {
    let t = Timeline::build(&[Duration::MAX]).unwrap();
    assert_eq!(t.total, Duration::MAX);
    assert_eq!(t.windows[0].off_percent, 100.0);
}
