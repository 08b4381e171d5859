//! Text rendering of engine results for the terminal.

use std::{fmt::Display, path::PathBuf};

use ansi_term::Colour;
use chrono::{DateTime, Local, TimeZone, Utc};

use crate::{
    dashboard::DashboardFrame,
    engine::{
        category::{categorize, Category},
        geometry::TimelineGeometry,
        interval::LayoutInterval,
        score::{Score, XP_PER_LEVEL},
        usage::{AppUsage, CategoryUsage},
    },
    utils::{
        percentage::{share, Percentage},
        time::format_duration,
    },
};

const PROGRESS_BAR_WIDTH: u64 = 20;
const SUMMARY_APPS: usize = 3;

pub fn category_colour(category: Category) -> Colour {
    match category {
        Category::Code => Colour::Green,
        Category::Meetings => Colour::Purple,
        Category::Explore => Colour::Blue,
        Category::Productivity => Colour::Yellow,
        Category::Other => Colour::White,
    }
}

/// Trackers may report full executable paths. Only the file name is interesting.
pub fn clean_app_name(value: &str) -> String {
    PathBuf::from(value)
        .file_name()
        .map(|v| v.to_string_lossy().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| value.to_string())
}

fn paint_app(name: &str) -> String {
    category_colour(categorize(name))
        .paint(clean_app_name(name))
        .to_string()
}

fn clock_time<Tz: TimeZone>(time: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    time.with_timezone(tz)
        .format("%H:%M:%S")
        .to_string()
}

/// One line per entry: time range, lane, horizontal placement, vertical placement and app.
pub fn format_timeline<Tz: TimeZone>(
    timeline: &[LayoutInterval],
    geometry: &TimelineGeometry,
    tz: &Tz,
) -> Vec<String>
where
    Tz::Offset: Display,
{
    timeline
        .iter()
        .map(|entry| {
            let interval = &entry.interval;
            format!(
                "{}-{}\t{}/{}\t{:.1}%+{:.1}%\t{:.0}px+{:.0}px\t{}",
                clock_time(interval.start(), tz),
                clock_time(interval.end(), tz),
                entry.column + 1,
                entry.max_columns,
                entry.left_pct,
                entry.width_pct,
                geometry.time_position(interval.start_time, tz),
                geometry.entry_height(interval.start_time, interval.end_time),
                paint_app(&interval.app_name),
            )
        })
        .collect()
}

/// Apps with at least `min_share` of the total time, as `share duration name`.
pub fn format_apps(apps: &[AppUsage], min_share: Percentage) -> Vec<String> {
    let total = apps.iter().map(|v| v.total_duration_seconds).sum();
    apps.iter()
        .filter_map(|app| {
            let app_share = share(app.total_duration_seconds, total)?;
            (app_share >= min_share).then(|| {
                format!(
                    "{}\t{}\t{}",
                    app_share,
                    format_duration(app.total_duration_seconds),
                    paint_app(&app.name)
                )
            })
        })
        .collect()
}

pub fn format_categories(categories: &[CategoryUsage]) -> Vec<String> {
    let total = categories.iter().map(|v| v.total_duration_seconds).sum();
    categories
        .iter()
        .map(|usage| {
            format!(
                "{}\t{}\t{}",
                share(usage.total_duration_seconds, total)
                    .map_or_else(|| "-".to_string(), |v| v.to_string()),
                format_duration(usage.total_duration_seconds),
                category_colour(usage.category).paint(usage.category.as_str())
            )
        })
        .collect()
}

pub fn progress_bar(progress: u64) -> String {
    let filled = (progress * PROGRESS_BAR_WIDTH / XP_PER_LEVEL).min(PROGRESS_BAR_WIDTH);
    format!(
        "[{}{}]",
        "#".repeat(filled as usize),
        "-".repeat((PROGRESS_BAR_WIDTH - filled) as usize)
    )
}

pub fn format_score(score: &Score) -> String {
    format!(
        "Sage level {}\t{} {}/{} xp\ttotal {} xp",
        score.level,
        progress_bar(score.progress),
        score.progress,
        XP_PER_LEVEL,
        score.xp
    )
}

/// Compact single line shown on every dashboard tick.
pub fn summary_line(frame: &DashboardFrame) -> String {
    let mut line = clock_time(frame.generated_at, &Local);
    if let Some(metrics) = frame.metrics {
        line.push_str(&format!(" cpu {} mem {}", metrics.cpu, metrics.memory));
    }
    let score = frame.report.score;
    line.push_str(&format!(
        " | xp {} level {} {}",
        score.xp,
        score.level,
        progress_bar(score.progress)
    ));

    let top = frame
        .report
        .apps
        .iter()
        .take(SUMMARY_APPS)
        .map(|app| {
            format!(
                "{} {}",
                paint_app(&app.name),
                format_duration(app.total_duration_seconds)
            )
        })
        .collect::<Vec<_>>();
    if !top.is_empty() {
        line.push_str(" | ");
        line.push_str(&top.join(", "));
    }
    if frame.stale {
        line.push_str(" (stale)");
    }
    line
}
