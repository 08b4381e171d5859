use chrono::{DateTime, TimeZone, Timelike};

use super::interval::TimeInterval;

pub const DEFAULT_HOUR_HEIGHT: f64 = 80.;
/// Intervals shorter than this are drawn as if they lasted this long, in seconds.
pub const DEFAULT_MIN_DURATION_DISPLAY: i64 = 300;
pub const DEFAULT_MIN_ENTRY_HEIGHT: f64 = 30.;

const MIN_DISPLAYED_HOURS: i64 = 24;

/// Maps time onto the vertical axis of the timeline. All results are in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineGeometry {
    pub hour_height: f64,
    pub min_duration_display: i64,
    pub min_entry_height: f64,
}

impl Default for TimelineGeometry {
    fn default() -> Self {
        Self {
            hour_height: DEFAULT_HOUR_HEIGHT,
            min_duration_display: DEFAULT_MIN_DURATION_DISPLAY,
            min_entry_height: DEFAULT_MIN_ENTRY_HEIGHT,
        }
    }
}

impl TimelineGeometry {
    /// Offset from the local midnight of `timestamp`.
    pub fn time_position<Tz: TimeZone>(&self, timestamp: i64, tz: &Tz) -> f64 {
        let local = local_time(timestamp, tz);
        let hours = local.hour() as f64 + local.minute() as f64 / 60. + local.second() as f64 / 3600.;
        hours * self.hour_height
    }

    pub fn entry_height(&self, start: i64, end: i64) -> f64 {
        let shown_duration = (end - start).max(self.min_duration_display);
        (shown_duration as f64 / 3600. * self.hour_height).max(self.min_entry_height)
    }

    /// Height of the whole timeline. Spans from the hour of the earliest start to the hour of the
    /// latest end plus an hour of padding, but never less than a full day.
    pub fn timeline_extent<'a, Tz: TimeZone>(
        &self,
        intervals: impl IntoIterator<Item = &'a TimeInterval>,
        tz: &Tz,
    ) -> f64 {
        let mut intervals = intervals.into_iter().peekable();
        if intervals.peek().is_none() {
            return MIN_DISPLAYED_HOURS as f64 * self.hour_height;
        }
        let (first_start, last_end) = intervals.fold((i64::MAX, i64::MIN), |(low, high), v| {
            (low.min(v.start_time), high.max(v.end_time))
        });

        // Hours are counted from the local midnight of the earliest interval so that sessions
        // running past midnight extend the timeline instead of wrapping around.
        let first = local_time(first_start, tz);
        let midnight = first_start.saturating_sub(first.num_seconds_from_midnight() as i64);
        let first_hour = first_start.saturating_sub(midnight).div_euclid(3600);
        let last_hour = last_end.saturating_sub(midnight).div_euclid(3600);

        let hours = last_hour
            .saturating_sub(first_hour)
            .saturating_add(1)
            .max(MIN_DISPLAYED_HOURS);
        hours as f64 * self.hour_height
    }
}

fn local_time<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> DateTime<Tz> {
    DateTime::from_timestamp(timestamp, 0)
        .unwrap_or_default()
        .with_timezone(tz)
}
