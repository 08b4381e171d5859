//! Boundary with the activity tracker. The tracker observes foreground switches and writes
//! finished intervals with [storage::IntervalStorageImpl]; the dashboard only reads them.
//!  - There is a directory with all the records.
//!  - Each file holds intervals that started during one UTC day.
//!  - Every line is a json encoded [TimeInterval].

pub mod storage;

use std::{future, sync::Arc};

use anyhow::Result;
use chrono::NaiveDate;
use futures::{stream, Stream, StreamExt, TryStreamExt};
use storage::IntervalSource;
use tracing::{error, instrument};

use crate::engine::interval::{DayWindow, TimeInterval};

/// Streams intervals that start inside `window`. Every UTC day the window touches is read, at
/// most 4 at a time.
pub fn extract_window(
    source: impl IntervalSource + Send + Sync + 'static,
    window: DayWindow,
) -> impl Stream<Item = Result<TimeInterval>> {
    let source = Arc::new(source);
    let first_day = window.start().date_naive();
    let last_day = (window.start() + window.duration() - chrono::Duration::seconds(1)).date_naive();

    let files = date_range(first_day, last_day)
        .map(move |day| {
            let source = source.clone();
            async move { (day, source.get_data_for(day).await) }
        })
        .buffered(4);

    files
        .flat_map(|(day, data)| match data {
            Ok(data) => stream::iter(data).map(Ok).boxed(),
            Err(e) => {
                error!("Failed to read intervals for {day} {e}");
                stream::once(future::ready(Err(e))).boxed()
            }
        })
        .try_filter(move |v| future::ready(window.contains(v.start_time)))
}

/// Collects a whole snapshot for `window`. Fails if any day failed to load, a partial day is
/// never returned.
#[instrument(skip(source))]
pub async fn fetch_window(
    source: impl IntervalSource + Send + Sync + 'static,
    window: DayWindow,
) -> Result<Vec<TimeInterval>> {
    extract_window(source, window).try_collect().await
}

/// Returns a stream of dates between start (inclusive) and end (inclusive).
fn date_range(start: NaiveDate, end: NaiveDate) -> impl Stream<Item = NaiveDate> {
    stream::iter(start.iter_days().take_while(move |day| *day <= end))
}
