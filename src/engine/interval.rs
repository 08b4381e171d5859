use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use now::DateTimeNow;
use serde::{Deserialize, Serialize};
use tracing::warn;

const SECONDS_IN_DAY: i64 = 60 * 60 * 24;

/// A single foreground session reported by the tracker. Times are unix seconds.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize, Clone)]
pub struct TimeInterval {
    pub app_name: Arc<str>,
    pub start_time: i64,
    pub end_time: i64,
}

impl TimeInterval {
    pub fn new(app_name: impl Into<Arc<str>>, start_time: i64, end_time: i64) -> Self {
        Self {
            app_name: app_name.into(),
            start_time,
            end_time,
        }
    }

    /// Ends no earlier than it starts and both ends are representable dates.
    pub fn is_valid(&self) -> bool {
        self.end_time >= self.start_time
            && DateTime::from_timestamp(self.start_time, 0).is_some()
            && DateTime::from_timestamp(self.end_time, 0).is_some()
    }

    /// Duration in seconds. Never negative, malformed intervals count as zero.
    pub fn duration(&self) -> i64 {
        self.end_time.saturating_sub(self.start_time).max(0)
    }

    pub fn start(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.start_time, 0).unwrap_or_default()
    }

    pub fn end(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.end_time, 0).unwrap_or_default()
    }

    /// Open interval overlap. Touching intervals don't overlap and a zero length interval
    /// overlaps nothing.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        if self.duration() == 0 || other.duration() == 0 {
            return false;
        }
        !(self.end_time <= other.start_time || self.start_time >= other.end_time)
    }
}

/// Interval placed on the timeline. `column` is always lower than `max_columns`.
#[derive(PartialEq, Debug, Serialize, Clone)]
pub struct LayoutInterval {
    #[serde(flatten)]
    pub interval: TimeInterval,
    pub column: usize,
    pub max_columns: usize,
    pub width_pct: f64,
    pub left_pct: f64,
}

/// Drops records that end before they start or lie outside the range of dates. Those would
/// corrupt sums and overlap checks.
pub fn sanitize<'a>(
    intervals: impl IntoIterator<Item = &'a TimeInterval>,
) -> impl Iterator<Item = &'a TimeInterval> {
    intervals.into_iter().filter(|v| {
        if !v.is_valid() {
            warn!(
                "Skipping malformed interval {} {}..{}",
                v.app_name, v.start_time, v.end_time
            );
        }
        v.is_valid()
    })
}

/// Half-open range of unix seconds `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayWindow {
    pub start: i64,
    pub end: i64,
}

impl DayWindow {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Window starting at the local midnight of `now` and lasting one day.
    pub fn containing<Tz: TimeZone>(now: DateTime<Tz>) -> Self {
        let start = now.beginning_of_day().timestamp();
        Self {
            start,
            end: start + SECONDS_IN_DAY,
        }
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        self.start <= timestamp && timestamp < self.end
    }

    /// Keeps intervals that start inside the window. Intervals are never split.
    pub fn filter<'a>(
        &self,
        intervals: impl IntoIterator<Item = &'a TimeInterval>,
    ) -> impl Iterator<Item = &'a TimeInterval> {
        let window = *self;
        intervals
            .into_iter()
            .filter(move |v| window.contains(v.start_time))
    }

    pub fn start(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.start, 0).unwrap_or_default()
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds(self.end - self.start)
    }
}
