use std::{io::ErrorKind, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::{
    geometry::{
        TimelineGeometry, DEFAULT_HOUR_HEIGHT, DEFAULT_MIN_DURATION_DISPLAY,
        DEFAULT_MIN_ENTRY_HEIGHT,
    },
    layout::{LayoutConfig, DEFAULT_MARGIN_PCT},
    ReportOptions,
};

pub const CONFIG_FILE: &str = "config.json";

/// User adjustable settings, read from `config.json` in the application directory. Missing
/// fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub refresh_interval_secs: u64,
    /// Apps hidden from the timeline. The dashboard hides itself by default.
    pub excluded_apps: Vec<String>,
    pub margin_pct: f64,
    pub hour_height: f64,
    pub min_duration_display: i64,
    pub min_entry_height: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 1,
            excluded_apps: vec![env!("CARGO_PKG_NAME").to_string()],
            margin_pct: DEFAULT_MARGIN_PCT,
            hour_height: DEFAULT_HOUR_HEIGHT,
            min_duration_display: DEFAULT_MIN_DURATION_DISPLAY,
            min_entry_height: DEFAULT_MIN_ENTRY_HEIGHT,
        }
    }
}

impl DashboardConfig {
    /// Reads the config from `dir`. A missing file gives the default config.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config {path:?}")),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {path:?}, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            layout: LayoutConfig {
                margin_pct: self.margin_pct.max(0.),
            },
            geometry: TimelineGeometry {
                hour_height: self.hour_height,
                min_duration_display: self.min_duration_display,
                min_entry_height: self.min_entry_height,
            },
            excluded_apps: self.excluded_apps.clone(),
        }
    }
}
