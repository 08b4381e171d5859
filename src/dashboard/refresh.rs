use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{anyhow, Result};
use chrono::TimeZone;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info_span, warn, Instrument};

use crate::{
    engine::{interval::DayWindow, DayReport, ReportOptions},
    metrics::{read_metrics, MetricsReading, SystemMetrics},
    tracking::{fetch_window, storage::IntervalSource},
    utils::clock::Clock,
};

use super::DashboardFrame;

/// Periodically takes a fresh snapshot of today's intervals and recomputes the whole report.
pub struct RefreshModule<S, Tz> {
    next: mpsc::Sender<DashboardFrame>,
    source: Arc<S>,
    metrics: Arc<Mutex<Box<dyn SystemMetrics + Send>>>,
    shutdown: CancellationToken,
    options: ReportOptions,
    refresh_interval: Duration,
    time_provider: Box<dyn Clock>,
    tz: Tz,
    last_report: Option<Arc<DayReport>>,
    last_metrics: Option<MetricsReading>,
}

impl<S, Tz> RefreshModule<S, Tz>
where
    S: IntervalSource + Send + Sync + 'static,
    Tz: TimeZone,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        next: mpsc::Sender<DashboardFrame>,
        source: S,
        metrics: Box<dyn SystemMetrics + Send>,
        shutdown: CancellationToken,
        options: ReportOptions,
        refresh_interval: Duration,
        time_provider: Box<dyn Clock>,
        tz: Tz,
    ) -> Self {
        Self {
            next,
            source: Arc::new(source),
            metrics: Arc::new(Mutex::new(metrics)),
            shutdown,
            options,
            refresh_interval,
            time_provider,
            tz,
            last_report: None,
            last_metrics: None,
        }
    }

    /// Builds the frame for the current tick. When the snapshot can't be fetched the previous
    /// report is reused as is, nothing is computed from partial data. Returns [None] until the
    /// first snapshot succeeds.
    async fn refresh(&mut self) -> Option<DashboardFrame> {
        let now = self.time_provider.time();
        let window = DayWindow::containing(now.with_timezone(&self.tz));

        let stale = match fetch_window(self.source.clone(), window).await {
            Ok(intervals) => {
                let report = DayReport::compute(&intervals, window, &self.options, &self.tz);
                self.last_report = Some(Arc::new(report));
                false
            }
            Err(e) => {
                error!("Failed to fetch intervals, keeping last snapshot {e:?}");
                true
            }
        };

        match self.read_system_metrics().await {
            Ok(reading) => self.last_metrics = Some(reading),
            Err(e) => warn!("Failed to read system metrics {e:?}"),
        }

        let report = self.last_report.clone()?;
        Some(DashboardFrame {
            generated_at: now,
            report,
            metrics: self.last_metrics,
            stale,
        })
    }

    /// Readers may block the thread while sampling, so they run on the blocking pool.
    async fn read_system_metrics(&self) -> Result<MetricsReading> {
        let metrics = self.metrics.clone();
        tokio::task::spawn_blocking(move || {
            let mut metrics = metrics
                .lock()
                .map_err(|_| anyhow!("Metrics reader is poisoned"))?;
            read_metrics(&mut **metrics)
        })
        .await?
    }

    /// Executes the refresh loop until shutdown.
    pub async fn run(mut self) -> Result<()> {
        let mut refresh_point = self.time_provider.instant();
        loop {
            refresh_point += self.refresh_interval;

            if let Some(frame) = self.refresh().await {
                let span = info_span!("Sending frame");
                debug!("Sending frame generated at {}", frame.generated_at);
                self.next
                    .send(frame)
                    .instrument(span)
                    .await
                    .inspect_err(|e| error!("Unexpected error during sending {e:?}"))?;
            }

            tokio::select! {
                // Cancelation drops the sender, which in turn stops the presentation module.
                _ = self.shutdown.cancelled() => {
                    return Ok(())
                }
                _ = self.time_provider.sleep_until(refresh_point) => ()
            }
        }
    }
}
