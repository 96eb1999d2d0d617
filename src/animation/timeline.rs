use std::time::Duration;

use crate::foundation::error::{PixcelError, PixcelResult};

/// Duration substituted for frames that declare a zero delay.
pub const MIN_FRAME_DURATION: Duration = Duration::from_millis(100);

/// Convert a GIF delay (centiseconds) to a [`Duration`].
pub fn centis_to_duration(centis: u16) -> Duration {
    Duration::from_millis(u64::from(centis) * 10)
}

/// Replace a zero duration with [`MIN_FRAME_DURATION`].
pub fn normalize_duration(d: Duration) -> Duration {
    if d.is_zero() { MIN_FRAME_DURATION } else { d }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// Opacity at a given point of the loop.
pub struct OpacityKeyframe {
    /// Position within the loop, `[0, 100]`.
    pub percent: f64,
    /// `true` = fully visible.
    pub visible: bool,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// One frame's visibility interval within a loop.
pub struct VisibilityWindow {
    /// Start of the frame's own interval (inclusive), in percent.
    pub on_percent: f64,
    /// End of the frame's own interval (exclusive), in percent.
    pub off_percent: f64,
    /// Start of the frame relative to the loop start.
    pub offset: Duration,
    /// Normalized display duration.
    pub duration: Duration,
    /// Opacity transitions, ascending by percent.
    pub keyframes: Vec<OpacityKeyframe>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Normalized animation timing for a whole loop.
pub struct Timeline {
    /// Sum of all normalized durations.
    pub total: Duration,
    /// One window per frame, in display order.
    pub windows: Vec<VisibilityWindow>,
}

impl Timeline {
    /// Build the loop timing for the given per-frame durations.
    ///
    /// Zero durations count as [`MIN_FRAME_DURATION`]. Percentages are computed from
    /// integer nanosecond sums, so consecutive windows share exact boundaries and the
    /// last window ends at exactly 100.
    pub fn build(durations: &[Duration]) -> PixcelResult<Self> {
        if durations.is_empty() {
            return Err(PixcelError::NoFrames);
        }

        let normalized: Vec<Duration> =
            durations.iter().copied().map(normalize_duration).collect();
        let total = normalized
            .iter()
            .try_fold(Duration::ZERO, |acc, d| acc.checked_add(*d))
            .ok_or_else(|| PixcelError::validation("total animation duration overflows"))?;
        let total_ns = total.as_nanos() as f64;
        let pct = |d: Duration| d.as_nanos() as f64 / total_ns * 100.0;

        let last = normalized.len() - 1;
        let mut windows = Vec::with_capacity(normalized.len());
        let mut cumulative = Duration::ZERO;

        for (i, duration) in normalized.into_iter().enumerate() {
            // Bounded by `total`, which did not overflow.
            let end = cumulative.saturating_add(duration);
            let on_percent = pct(cumulative);
            let off_percent = if i == last { 100.0 } else { pct(end) };

            let mut keyframes = Vec::with_capacity(4);
            if on_percent > 0.0 {
                keyframes.push(OpacityKeyframe {
                    percent: 0.0,
                    visible: false,
                });
            }
            keyframes.push(OpacityKeyframe {
                percent: on_percent,
                visible: true,
            });
            if off_percent < 100.0 {
                keyframes.push(OpacityKeyframe {
                    percent: off_percent,
                    visible: false,
                });
            }
            keyframes.push(OpacityKeyframe {
                percent: 100.0,
                visible: i == last,
            });

            windows.push(VisibilityWindow {
                on_percent,
                off_percent,
                offset: cumulative,
                duration,
                keyframes,
            });
            cumulative = end;
        }

        tracing::debug!(
            frames = windows.len(),
            total_ms = total.as_millis() as u64,
            "built timeline"
        );
        Ok(Self { total, windows })
    }

    /// Total loop length in seconds.
    pub fn total_secs(&self) -> f64 {
        self.total.as_secs_f64()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
