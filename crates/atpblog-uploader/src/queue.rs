//! Serial upload queue driver.

use smol_str::SmolStr;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use atpblog_composer::{UploadEvent, UploadJob};

use crate::error::UploadError;
use crate::store::UploadPipeline;

// Batches come from a single paste or drop, so a shallow buffer is plenty.
const CHANNEL_DEPTH: usize = 64;

/// Cloneable handle feeding jobs to a spawned driver task.
///
/// Jobs are processed strictly in submission order. Every accepted job
/// produces a `Started` event followed by a `Finished` event, success or
/// not. Dropping all handles drains the queue, then stops the driver.
#[derive(Debug, Clone)]
pub struct UploadQueue {
    jobs: mpsc::Sender<UploadJob>,
}

impl UploadQueue {
    /// Spawns the driver task on the current runtime and returns the handle
    /// plus the event stream to feed back into the composer.
    pub fn spawn<P>(pipeline: P) -> (Self, mpsc::Receiver<UploadEvent>)
    where
        P: UploadPipeline + Send + Sync + 'static,
    {
        let (jobs_tx, mut jobs_rx) = mpsc::channel::<UploadJob>(CHANNEL_DEPTH);
        let (events_tx, events_rx) = mpsc::channel::<UploadEvent>(CHANNEL_DEPTH);

        tokio::spawn(async move {
            while let Some(job) = jobs_rx.recv().await {
                let id = job.id;
                if events_tx.send(UploadEvent::Started(id)).await.is_err() {
                    debug!("event receiver dropped, stopping the upload driver");
                    return;
                }
                let outcome = match pipeline.upload(&job).await {
                    Ok(url) => Ok(url),
                    Err(error) => {
                        warn!(%id, name = %job.file.name, %error, "upload failed");
                        Err(SmolStr::new(error.to_string()))
                    }
                };
                if events_tx
                    .send(UploadEvent::Finished(id, outcome))
                    .await
                    .is_err()
                {
                    debug!("event receiver dropped, stopping the upload driver");
                    return;
                }
            }
        });

        (Self { jobs: jobs_tx }, events_rx)
    }

    /// Queues one job.
    pub async fn push(&self, job: UploadJob) -> Result<(), UploadError> {
        self.jobs
            .send(job)
            .await
            .map_err(|_| UploadError::Store("upload queue is closed".into()))
    }

    /// Queues a whole batch, preserving its order.
    pub async fn push_batch(&self, jobs: Vec<UploadJob>) -> Result<(), UploadError> {
        for job in jobs {
            self.push(job).await?;
        }
        Ok(())
    }
}
