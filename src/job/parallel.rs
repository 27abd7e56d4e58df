use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::Stream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};

use crate::error::{Error, Result};
use crate::fetch::FetchOutcome;
use crate::job::listener::CompositeListener;
use crate::job::{run_batch, BatchJob};
use crate::partition::Partitions;

const DEFAULT_QUEUE_CAPACITY: usize = 4;
const DEFAULT_TERMINATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Bounded-concurrency settings for a run.
///
/// Batches are queued into a bounded channel and consumed by a fixed set
/// of workers. Batch-to-batch ordering across workers is not guaranteed;
/// within a batch, each worker processes every item in order before
/// taking the next batch.
#[derive(Debug, Clone)]
pub struct Parallelism {
    workers: usize,
    queue_capacity: usize,
    termination_timeout: Duration,
}

impl Parallelism {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            termination_timeout: DEFAULT_TERMINATION_TIMEOUT,
        }
    }

    /// Maximum number of batches waiting in the queue.
    pub fn queue_capacity(mut self, n: usize) -> Self {
        self.queue_capacity = n.max(1);
        self
    }

    /// Overall deadline for enqueueing and draining all batches.
    ///
    /// A batch that cannot be enqueued before the deadline is dropped
    /// (logged, not silent); work still unfinished at the deadline turns
    /// the whole run into [`Error::Incomplete`].
    pub fn termination_timeout(mut self, timeout: Duration) -> Self {
        self.termination_timeout = timeout;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Default for Parallelism {
    fn default() -> Self {
        Self::new(1)
    }
}

pub(crate) async fn run_partitioned<T, D, P, S>(
    job: &BatchJob<T, D, P>,
    cfg: &Parallelism,
    notify: &Arc<CompositeListener<T, D, P>>,
    partitions: &mut Partitions<S>,
) -> Result<()>
where
    T: Send + Sync + 'static,
    D: Send + Sync + 'static,
    P: Send + Sync + 'static,
    S: Stream<Item = FetchOutcome<T>> + Unpin + Send,
{
    let deadline = Instant::now() + cfg.termination_timeout;
    let (tx, rx) = mpsc::channel::<Vec<FetchOutcome<T>>>(cfg.queue_capacity);
    let rx = Arc::new(Mutex::new(rx));
    let pending = Arc::new(AtomicUsize::new(0));

    let mut handles: Vec<JoinHandle<Result<()>>> = Vec::with_capacity(cfg.workers);
    for _ in 0..cfg.workers {
        let rx = rx.clone();
        let pending = pending.clone();
        let processor = job.processor.clone();
        let persistence = job.persistence.clone();
        let notify = notify.clone();
        handles.push(tokio::spawn(async move {
            loop {
                // Lock only around recv; a recv of None means the producer
                // dropped the sender and the queue has drained.
                let batch = { rx.lock().await.recv().await };
                let Some(batch) = batch else { break };
                run_batch(&*processor, &*persistence, &notify, batch).await?;
                pending.fetch_sub(1, Ordering::SeqCst);
            }
            Ok(())
        }));
    }

    while let Some(batch) = partitions.next_batch().await {
        pending.fetch_add(1, Ordering::SeqCst);
        match timeout_at(deadline, tx.send(batch)).await {
            Ok(Ok(())) => {}
            Ok(Err(_closed)) => {
                // Every worker is gone; their join results explain why.
                pending.fetch_sub(1, Ordering::SeqCst);
                break;
            }
            Err(_elapsed) => {
                pending.fetch_sub(1, Ordering::SeqCst);
                #[cfg(feature = "tracing")]
                tracing::event!(
                    tracing::Level::ERROR,
                    event = "batchpipe.queue.enqueue_timeout",
                    "enqueue deadline hit, dropping the remaining input"
                );
                break;
            }
        }
    }
    drop(tx);

    let mut first_err: Option<Error> = None;
    for mut handle in handles {
        match timeout_at(deadline, &mut handle).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(err))) => {
                first_err.get_or_insert(err);
            }
            Ok(Err(join_err)) => {
                first_err.get_or_insert(Error::from(join_err));
            }
            Err(_elapsed) => {
                handle.abort();
                #[cfg(feature = "tracing")]
                tracing::event!(
                    tracing::Level::WARN,
                    event = "batchpipe.worker.aborted",
                    "worker still busy at the termination deadline, stopping it early"
                );
            }
        }
    }

    if let Some(err) = first_err {
        return Err(err);
    }
    let unfinished = pending.load(Ordering::SeqCst);
    if unfinished > 0 {
        return Err(Error::Incomplete {
            pending: unfinished,
        });
    }
    Ok(())
}
