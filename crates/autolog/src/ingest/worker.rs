//! Worker — runs a pipeline on a blocking thread and exposes progress.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error};

use super::pipeline::IngestPipeline;
use super::{IngestError, IngestOutcome, IngestProgress};
use crate::conf::ParserConfig;

/// Consumer side of a running ingestion.
///
/// Progress is a latest-value mailbox; the consumer polls it at the
/// configured interval rather than being pushed every chunk.
pub struct IngestHandle<T> {
    progress: watch::Receiver<IngestProgress>,
    task: JoinHandle<Result<T, IngestError>>,
    poll_interval: Duration,
}

impl<T> fmt::Debug for IngestHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestHandle")
            .field("progress", &*self.progress.borrow())
            .field("poll_interval", &self.poll_interval)
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

impl<T: Send + 'static> IngestHandle<T> {
    /// Latest progress published by the worker.
    pub fn progress(&self) -> IngestProgress {
        *self.progress.borrow()
    }

    pub async fn wait(self) -> Result<T, IngestError> {
        self.wait_with_heartbeat(|_| {}).await
    }

    /// Poll until the worker completes, calling `on_tick` with the latest
    /// progress on every tick. The last tick always observes the final state.
    pub async fn wait_with_heartbeat(
        self,
        mut on_tick: impl FnMut(IngestProgress),
    ) -> Result<T, IngestError> {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let finished = self.task.is_finished();
            on_tick(self.progress());
            if finished {
                break;
            }
        }

        match self.task.await {
            Ok(result) => result,
            Err(e) => {
                error!("Ingestion worker panicked or was cancelled: {}", e);
                Err(IngestError::Worker(e.to_string()))
            }
        }
    }
}

/// Ingest `path` on a blocking worker thread.
///
/// # Panics
///
/// Panics when called outside a Tokio runtime.
pub fn spawn_ingest(path: PathBuf, config: &ParserConfig) -> IngestHandle<IngestOutcome> {
    spawn_with(path, config, |result| result)
}

/// Like [`spawn_ingest`], but `finish` runs on the worker thread with the
/// outcome before completion becomes visible to the consumer.
///
/// # Panics
///
/// Panics when called outside a Tokio runtime, as
/// [`tokio::task::spawn_blocking`] does.
pub fn spawn_with<T, F>(path: PathBuf, config: &ParserConfig, finish: F) -> IngestHandle<T>
where
    T: Send + 'static,
    F: FnOnce(Result<IngestOutcome, IngestError>) -> Result<T, IngestError> + Send + 'static,
{
    let pipeline = IngestPipeline::new(config);
    let (tx, rx) = watch::channel(IngestProgress::default());

    debug!("Spawning ingestion worker for {}", path.display());
    let task = tokio::task::spawn_blocking(move || {
        let result = pipeline.ingest_file(&path, |progress| {
            tx.send_replace(progress);
        });
        finish(result)
    });

    IngestHandle {
        progress: rx,
        task,
        poll_interval: config.poll_interval(),
    }
}
