// THEORY:
// `SegmentationPool` is the asynchronous front door to the engine. Callers submit owned
// jobs and await their results; a dispatcher hands jobs round-robin to a fixed set of
// workers, and each worker runs the synchronous engine on tokio's blocking pool so the
// async runtime never stalls on CPU-bound sweeps.
//
// The engine is stateless, so every worker holds its own clone of it and no state is
// shared between jobs. Results travel back over a oneshot channel per job.

use crate::pipeline::{
    CancelToken, Segmentation, SegmentationRequest, SrmEngine, SrmError, SrmResult,
};
use futures::future::join_all;
use log::{debug, warn};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// An owned segmentation request that can cross task boundaries.
#[derive(Debug, Clone)]
pub struct SegmentationJob {
    pub pixels: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub q: f32,
    pub compute_average: bool,
    pub compute_labels: bool,
    pub cancel: Option<CancelToken>,
}

impl SegmentationJob {
    pub fn new(pixels: Vec<u8>, width: usize, height: usize, channels: usize) -> Self {
        let defaults = SegmentationRequest::new(&[], width, height, channels);
        Self {
            pixels,
            width,
            height,
            channels,
            q: defaults.q,
            compute_average: defaults.compute_average,
            compute_labels: defaults.compute_labels,
            cancel: None,
        }
    }

    pub fn with_q(mut self, q: f32) -> Self {
        self.q = q;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Borrows the job as an engine request.
    pub fn request(&self) -> SegmentationRequest<'_> {
        SegmentationRequest {
            q: self.q,
            pixels: &self.pixels,
            width: self.width,
            height: self.height,
            channels: self.channels,
            compute_average: self.compute_average,
            compute_labels: self.compute_labels,
            cancel: self.cancel.clone(),
        }
    }
}

struct PoolTask {
    job: SegmentationJob,
    result_sender: oneshot::Sender<SrmResult<Segmentation>>,
}

pub struct SegmentationPool {
    task_sender: mpsc::UnboundedSender<PoolTask>,
    dispatcher: JoinHandle<()>,
    workers: Vec<JoinHandle<()>>,
}

impl SegmentationPool {
    /// Starts a pool with one worker per logical CPU. Must be called inside a tokio runtime.
    pub fn new(engine: SrmEngine) -> Self {
        Self::with_workers(engine, num_cpus::get())
    }

    pub fn with_workers(engine: SrmEngine, worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<PoolTask>();

        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..worker_count)
            .map(|_| mpsc::unbounded_channel::<PoolTask>())
            .unzip();

        // Spawn dispatcher
        let dispatcher = tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                if worker_senders[worker_idx].send(task).is_err() {
                    warn!("segmentation worker {worker_idx} is gone, job dropped");
                }
                worker_idx = (worker_idx + 1) % worker_count;
            }
            debug!("segmentation dispatcher stopped");
        });

        // Spawn workers
        let mut workers = Vec::with_capacity(worker_count);
        for (worker_id, mut worker_receiver) in worker_receivers.into_iter().enumerate() {
            let worker_engine = engine.clone();

            let worker = tokio::spawn(async move {
                while let Some(PoolTask { job, result_sender }) = worker_receiver.recv().await {
                    let engine = worker_engine.clone();
                    let result = match tokio::task::spawn_blocking(move || {
                        engine.segment(&job.request())
                    })
                    .await
                    {
                        Ok(result) => result,
                        Err(err) => {
                            warn!("segmentation worker {worker_id} lost a job: {err}");
                            Err(SrmError::WorkerUnavailable)
                        }
                    };

                    if result_sender.send(result).is_err() {
                        debug!("segmentation result discarded, requester went away");
                    }
                }
            });

            workers.push(worker);
        }

        Self {
            task_sender,
            dispatcher,
            workers,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Queues one job and waits for its result.
    pub async fn submit(&self, job: SegmentationJob) -> SrmResult<Segmentation> {
        let (result_sender, result_receiver) = oneshot::channel();

        self.task_sender
            .send(PoolTask { job, result_sender })
            .map_err(|_| SrmError::WorkerUnavailable)?;

        result_receiver
            .await
            .map_err(|_| SrmError::WorkerUnavailable)?
    }

    /// Queues every job at once; results come back in submission order.
    pub async fn submit_batch(&self, jobs: Vec<SegmentationJob>) -> Vec<SrmResult<Segmentation>> {
        join_all(jobs.into_iter().map(|job| self.submit(job))).await
    }

    /// Stops accepting jobs and waits for queued ones to finish.
    pub async fn shutdown(self) {
        let Self {
            task_sender,
            dispatcher,
            workers,
        } = self;
        drop(task_sender);
        let _ = dispatcher.await;
        for worker in workers {
            let _ = worker.await;
        }
    }
}
