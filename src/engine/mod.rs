//! Pure transforms turning raw foreground intervals into what the dashboard shows.
//! Nothing here keeps state between calls, every refresh recomputes from a snapshot.

pub mod category;
pub mod geometry;
pub mod interval;
pub mod layout;
pub mod score;
pub mod usage;

use chrono::TimeZone;
use geometry::TimelineGeometry;
use interval::{sanitize, DayWindow, LayoutInterval, TimeInterval};
use layout::{layout_intervals, LayoutConfig};
use score::Score;
use serde::Serialize;
use tracing::{debug, instrument};
use usage::{aggregate_by_app, aggregate_by_category, AppUsage, CategoryUsage};

#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub layout: LayoutConfig,
    pub geometry: TimelineGeometry,
    /// Apps left out of the timeline, compared case-insensitively. Usually the dashboard itself.
    /// They still count towards usage and xp.
    pub excluded_apps: Vec<String>,
}

impl ReportOptions {
    fn is_excluded(&self, app_name: &str) -> bool {
        self.excluded_apps
            .iter()
            .any(|v| v.eq_ignore_ascii_case(app_name))
    }
}

/// Everything the dashboard renders for one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayReport {
    pub window: DayWindow,
    pub timeline: Vec<LayoutInterval>,
    pub timeline_height: f64,
    pub apps: Vec<AppUsage>,
    pub categories: Vec<CategoryUsage>,
    pub score: Score,
}

impl DayReport {
    #[instrument(skip(intervals, options, tz))]
    pub fn compute<Tz: TimeZone>(
        intervals: &[TimeInterval],
        window: DayWindow,
        options: &ReportOptions,
        tz: &Tz,
    ) -> Self {
        let in_window = window
            .filter(sanitize(intervals))
            .collect::<Vec<&TimeInterval>>();
        debug!(
            "Computing report for {} of {} intervals",
            in_window.len(),
            intervals.len()
        );

        let shown = in_window
            .iter()
            .copied()
            .filter(|v| !options.is_excluded(&v.app_name))
            .collect::<Vec<_>>();

        Self {
            window,
            timeline: layout_intervals(shown.iter().copied(), &options.layout),
            timeline_height: options.geometry.timeline_extent(shown.iter().copied(), tz),
            apps: aggregate_by_app(in_window.iter().copied(), window),
            categories: aggregate_by_category(in_window.iter().copied(), window),
            score: Score::from_intervals(in_window.iter().copied()),
        }
    }
}
