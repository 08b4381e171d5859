//! Live dashboard. [refresh::RefreshModule] recomputes the report every tick and
//! [presentation::PresentationModule] shows it, connected by a channel.

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone, Utc};
use presentation::{ConsolePresenter, FramePresenter, PresentationModule};
use refresh::RefreshModule;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::{
    config::DashboardConfig,
    engine::DayReport,
    metrics::{MetricsReading, SysinfoMetrics, SystemMetrics},
    tracking::storage::{IntervalSource, IntervalStorageImpl},
    utils::clock::{Clock, DefaultClock},
};

pub mod presentation;
pub mod refresh;
pub mod shutdown;

/// Everything shown during one tick.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardFrame {
    pub generated_at: DateTime<Utc>,
    pub report: Arc<DayReport>,
    pub metrics: Option<MetricsReading>,
    /// Set when the latest snapshot couldn't be fetched and `report` is from an earlier tick.
    pub stale: bool,
}

/// Represents the starting point for the `watch` command.
pub async fn start_dashboard(dir: PathBuf, config: DashboardConfig, json: bool) -> Result<()> {
    let (sender, receiver) = mpsc::channel::<DashboardFrame>(10);
    let storage = IntervalStorageImpl::new(dir.join("records"))?;

    let shutdown_token = CancellationToken::new();

    let refresher = create_refresher(
        sender,
        storage,
        SysinfoMetrics::new(),
        &shutdown_token,
        &config,
        DefaultClock,
        Local,
    );
    let presenter = create_presenter(receiver, ConsolePresenter::new(std::io::stdout(), json));

    let (_, refresh_result, presentation_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        async {
            // Refreshing only stops on errors or cancelation, either way the rest should stop too.
            let result = refresher.run().await;
            shutdown_token.cancel();
            result
        },
        presenter.run(),
    );

    if let Err(refresh_result) = refresh_result {
        error!("Refresh module got an error {:?}", refresh_result);
    }

    if let Err(presentation_result) = presentation_result {
        error!("Presentation module got an error {:?}", presentation_result);
    }

    Ok(())
}

fn create_refresher<S, Tz>(
    sender: mpsc::Sender<DashboardFrame>,
    source: S,
    metrics: impl SystemMetrics + Send + 'static,
    shutdown_token: &CancellationToken,
    config: &DashboardConfig,
    clock: impl Clock,
    tz: Tz,
) -> RefreshModule<S, Tz>
where
    S: IntervalSource + Send + Sync + 'static,
    Tz: TimeZone,
{
    RefreshModule::new(
        sender,
        source,
        Box::new(metrics),
        shutdown_token.clone(),
        config.report_options(),
        config.refresh_interval(),
        Box::new(clock),
        tz,
    )
}

fn create_presenter<P: FramePresenter>(
    receiver: mpsc::Receiver<DashboardFrame>,
    presenter: P,
) -> PresentationModule<P> {
    PresentationModule::new(receiver, presenter)
}
