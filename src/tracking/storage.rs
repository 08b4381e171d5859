use std::{
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
};
use tracing::{debug, warn};

use crate::{engine::interval::TimeInterval, utils::time::date_to_record_name};

/// Interface over wherever the tracker leaves its intervals.
pub trait IntervalSource {
    /// Retrieves intervals that started on a certain UTC day.
    fn get_data_for(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<TimeInterval>>> + Send;
}

impl<T: Deref> IntervalSource for T
where
    T::Target: IntervalSource,
{
    fn get_data_for(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<TimeInterval>>> + Send {
        self.deref().get_data_for(date)
    }
}

/// Directory of json-lines files, one per UTC day, each line a [TimeInterval].
pub struct IntervalStorageImpl {
    record_dir: PathBuf,
}

impl IntervalStorageImpl {
    pub fn new(record_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&record_dir)?;

        Ok(Self { record_dir })
    }

    fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.record_dir.join(date_to_record_name(date))
    }

    /// Appends intervals to the file of `date`. This is the tracker side of the contract.
    pub async fn append(&self, date: NaiveDate, intervals: &[TimeInterval]) -> Result<()> {
        let mut buffer = String::new();
        for interval in intervals {
            buffer.push_str(&serde_json::to_string(interval)?);
            buffer.push('\n');
        }

        let mut file = File::options()
            .create(true)
            .append(true)
            .open(self.path_for(date))
            .await?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = file.write_all(buffer.as_bytes()).await;
        file.flush().await?;
        file.unlock_async().await?;
        Ok(result?)
    }

    async fn get_all_inner(&self, path: &Path) -> Result<Vec<TimeInterval>> {
        async fn extract(path: &Path) -> std::result::Result<Vec<TimeInterval>, std::io::Error> {
            debug!("Extracting {path:?}");
            let file = File::open(path).await?;
            file.lock_shared()?;
            let buffer = BufReader::new(file);
            let mut lines = buffer.lines();
            let mut intervals = vec![];
            while let Some(v) = lines.next_line().await? {
                if v.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<TimeInterval>(&v) {
                    Ok(v) => intervals.push(v),
                    Err(e) => {
                        // The tracker might have been interrupted mid-write
                        warn!(
                            "During parsing in path {:?} found illegal json string {}:  {e}",
                            path, &v
                        )
                    }
                }
            }

            lines.into_inner().into_inner().unlock_async().await?;

            Ok(intervals)
        }

        match extract(path).await {
            Ok(s) => Ok(s),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(vec![]),
            Err(e) => Err(e.into()),
        }
    }
}

impl IntervalSource for IntervalStorageImpl {
    async fn get_data_for(&self, date: NaiveDate) -> Result<Vec<TimeInterval>> {
        let path = self.path_for(date);
        self.get_all_inner(&path).await
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::{engine::interval::TimeInterval, utils::logging::TEST_LOGGING};

    use super::{IntervalSource, IntervalStorageImpl};

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2018, 7, 4).unwrap();

    #[tokio::test]
    async fn test_storage_missing_day_is_empty() -> Result<()> {
        let dir = tempdir()?;
        let storage = IntervalStorageImpl::new(dir.path().join("records"))?;
        assert!(storage.get_data_for(TEST_DATE).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_storage_append_and_read() -> Result<()> {
        let dir = tempdir()?;
        let storage = IntervalStorageImpl::new(dir.path().to_path_buf())?;
        let first = vec![
            TimeInterval::new("code", 0, 60),
            TimeInterval::new("zoom.us", 60, 120),
        ];
        let second = vec![TimeInterval::new("code", 120, 180)];
        storage.append(TEST_DATE, &first).await?;
        storage.append(TEST_DATE, &second).await?;

        let data = storage.get_data_for(TEST_DATE).await?;
        assert_eq!(data, [first, second].concat());
        assert!(storage
            .get_data_for(TEST_DATE.succ_opt().unwrap())
            .await?
            .is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_storage_skips_illegal_lines() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let storage = IntervalStorageImpl::new(dir.path().to_path_buf())?;
        let mut file = std::fs::File::create(dir.path().join("2018-07-04"))?;
        write!(
            file,
            "{{\"app_name\":\"code\",\"start_time\":0,\"end_time\":10}}\n\
             {{\"app_name\":\"trunc\n\
             \n\
             {{\"app_name\":\"zoom\",\"start_time\":10,\"end_time\":20}}\n"
        )?;

        let data = storage.get_data_for(TEST_DATE).await?;
        assert_eq!(
            data,
            vec![
                TimeInterval::new("code", 0, 10),
                TimeInterval::new("zoom", 10, 20)
            ]
        );
        Ok(())
    }
}
