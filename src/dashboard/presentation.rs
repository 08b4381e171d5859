use std::{future::Future, io::Write};

use anyhow::Result;
use tokio::sync::mpsc::Receiver;
use tracing::{debug, error, trace};

use crate::cli::output::summary_line;

use super::DashboardFrame;

/// Consumer of computed frames. A terminal printer today, a GUI bridge could implement it too.
pub trait FramePresenter {
    fn present(&mut self, frame: &DashboardFrame) -> impl Future<Output = Result<()>>;

    fn finalize(&mut self) -> impl Future<Output = Result<()>>;
}

/// Receives frames from [super::refresh::RefreshModule] and hands them to a presenter.
pub struct PresentationModule<Presenter> {
    receiver: Receiver<DashboardFrame>,
    presenter: Presenter,
}

impl<P: FramePresenter> PresentationModule<P> {
    pub fn new(receiver: Receiver<DashboardFrame>, presenter: P) -> Self {
        Self {
            receiver,
            presenter,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        while let Some(frame) = self.receiver.recv().await {
            trace!("Presenting frame {:?}", frame.generated_at);
            match self.presenter.present(&frame).await {
                Ok(_) => debug!("Presented frame {}", frame.generated_at),
                Err(e) => error!("Error presenting frame {}: {e:?}", frame.generated_at),
            }
        }

        let result = self.presenter.finalize().await;
        self.receiver.close();
        result
    }
}

/// Prints one line per frame, or one json document per line.
pub struct ConsolePresenter<W> {
    writer: W,
    json: bool,
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(writer: W, json: bool) -> Self {
        Self { writer, json }
    }
}

impl<W: Write> FramePresenter for ConsolePresenter<W> {
    async fn present(&mut self, frame: &DashboardFrame) -> Result<()> {
        if self.json {
            serde_json::to_writer(&mut self.writer, frame)?;
            writeln!(self.writer)?;
        } else {
            writeln!(self.writer, "{}", summary_line(frame))?;
        }
        Ok(())
    }

    async fn finalize(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
