use std::{fmt::Display, path::Path};

use anyhow::Result;
use chrono::Local;
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};
use tracing::info;

use crate::{
    config::DashboardConfig,
    engine::{
        category::{categorize, Category},
        interval::{DayWindow, TimeInterval},
        DayReport,
    },
    tracking::{fetch_window, storage::IntervalStorageImpl},
    utils::percentage::Percentage,
};

use super::{
    output::{format_apps, format_categories, format_score, format_timeline},
    Args,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

/// Selects the day a report is about.
#[derive(Debug, Clone, clap::Args)]
pub struct DayArgs {
    #[arg(
        long,
        short,
        help = "Any moment of the day to report on. Examples are \"yesterday\", \"2 days ago\", \"15/03/2025\". Defaults to today"
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, help = "Print json instead of text")]
    json: bool,
}

#[derive(Debug, Parser)]
pub struct TimelineCommand {
    #[command(flatten)]
    day: DayArgs,
    #[arg(
        short,
        long = "exclude",
        help = "App hidden from the timeline in addition to the configured ones. Can be repeated"
    )]
    excluded: Vec<String>,
}

#[derive(Debug, Parser)]
pub struct UsageCommand {
    #[command(flatten)]
    day: DayArgs,
    #[arg(long, help = "Group usage by category instead of app")]
    categories: bool,
    #[arg(long, help = "Only show apps of this category", conflicts_with = "categories")]
    category: Option<Category>,
    #[arg(short = 'p', long = "percentage", help = "Filter apps to have at least specified percentage", default_value_t = Percentage::new_opt(0.).unwrap())]
    min_percentage: Percentage,
}

#[derive(Debug, Parser)]
pub struct ScoreCommand {
    #[command(flatten)]
    day: DayArgs,
}

/// Resolves `--date` into the local day containing it.
fn parse_window(date: Option<&str>, date_style: DateStyle) -> Result<DayWindow> {
    let now = Local::now();
    let moment = match date.map(|s| parse_date_string(s, now, date_style.into())) {
        Some(Ok(v)) => v,
        Some(Err(e)) => {
            return Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate date {e}"),
                )
                .into());
        }
        None => now,
    };
    Ok(DayWindow::containing(moment))
}

async fn load_report(
    day: &DayArgs,
    dir: &Path,
    config: &DashboardConfig,
    extra_excluded: &[String],
) -> Result<DayReport> {
    let window = parse_window(day.date.as_deref(), day.date_style)?;
    let intervals = load_intervals(dir, window).await?;
    info!(
        "Loaded {} intervals starting at {}",
        intervals.len(),
        window.start().with_timezone(&Local)
    );

    let mut options = config.report_options();
    options.excluded_apps.extend_from_slice(extra_excluded);
    Ok(DayReport::compute(&intervals, window, &options, &Local))
}

async fn load_intervals(dir: &Path, window: DayWindow) -> Result<Vec<TimeInterval>> {
    let storage = IntervalStorageImpl::new(dir.join("records"))?;
    fetch_window(storage, window).await
}

fn print_lines(lines: Vec<String>, empty_message: &str) {
    if lines.is_empty() {
        println!("{empty_message}");
    }
    for line in lines {
        println!("{line}");
    }
}

/// Prints where every interval of the day lands on the timeline.
pub async fn process_timeline_command(
    TimelineCommand { day, excluded }: TimelineCommand,
    dir: &Path,
    config: &DashboardConfig,
) -> Result<()> {
    let report = load_report(&day, dir, config, &excluded).await?;
    if day.json {
        println!("{}", serde_json::to_string_pretty(&report.timeline)?);
        return Ok(());
    }
    print_lines(
        format_timeline(&report.timeline, &config.report_options().geometry, &Local),
        "No activity recorded",
    );
    println!("Timeline height {:.0}px", report.timeline_height);
    Ok(())
}

pub async fn process_usage_command(
    UsageCommand {
        day,
        categories,
        category,
        min_percentage,
    }: UsageCommand,
    dir: &Path,
    config: &DashboardConfig,
) -> Result<()> {
    let report = load_report(&day, dir, config, &[]).await?;

    if categories {
        if day.json {
            println!("{}", serde_json::to_string_pretty(&report.categories)?);
        } else {
            print_lines(format_categories(&report.categories), "No activity recorded");
        }
        return Ok(());
    }

    let apps = report
        .apps
        .into_iter()
        .filter(|v| category.map_or(true, |category| category == categorize(&v.name)))
        .collect::<Vec<_>>();
    if day.json {
        println!("{}", serde_json::to_string_pretty(&apps)?);
    } else {
        print_lines(format_apps(&apps, min_percentage), "No activity recorded");
    }
    Ok(())
}

pub async fn process_score_command(
    ScoreCommand { day }: ScoreCommand,
    dir: &Path,
    config: &DashboardConfig,
) -> Result<()> {
    let report = load_report(&day, dir, config, &[]).await?;
    if day.json {
        println!("{}", serde_json::to_string_pretty(&report.score)?);
    } else {
        println!("{}", format_score(&report.score));
    }
    Ok(())
}
