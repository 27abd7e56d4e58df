use std::sync::Arc;

use crate::error::{Error, Result};
use crate::fetch::{FetchOutcome, FetchedItem, Fetcher};
use crate::outcome::Outcome;
use crate::partition::Partitions;
use crate::processor::Processor;

pub mod listener;
pub mod parallel;
pub mod stats;

pub use listener::JobListener;
pub use parallel::Parallelism;
pub use stats::{Counts, RunStatistics};

use listener::CompositeListener;

const DEFAULT_BATCH_SIZE: usize = 100;

/// A single fetch → process → persist run over a partitioned stream.
///
/// The fetcher's lazy stream is partitioned into fixed-size batches; for
/// each batch, listeners observe the raw fetch outcomes, the successes
/// are handed to the process chain, its outcomes are observed, and the
/// surviving successes are handed to the persistence chain. Per-item
/// failures never abort a run; an `Err` out of `run` means a stage broke
/// its contract.
pub struct BatchJob<T, D, P>
where
    T: Send + Sync + 'static,
    D: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    description: String,
    batch_size: usize,
    parallelism: Option<Parallelism>,
    fetcher: Arc<dyn Fetcher<T>>,
    processor: Arc<dyn Processor<FetchedItem<T>, T, D>>,
    persistence: Arc<dyn Processor<FetchedItem<T>, D, P>>,
    listeners: Vec<Arc<dyn JobListener<T, D, P>>>,
}

impl<T, D, P> BatchJob<T, D, P>
where
    T: Send + Sync + 'static,
    D: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    pub fn builder() -> BatchJobBuilder<T, D, P> {
        BatchJobBuilder {
            description: String::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            parallelism: None,
            fetcher: None,
            processor: None,
            persistence: None,
            listeners: Vec::new(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Drive the whole run to completion and return its statistics.
    pub async fn run(&self) -> Result<RunStatistics> {
        let notify = Arc::new(CompositeListener::new(self.listeners.clone()));
        notify.before_run(&self.description);

        #[cfg(feature = "tracing")]
        tracing::event!(
            tracing::Level::INFO,
            event = "batchpipe.job.started",
            description = self.description.as_str(),
            batch_size = self.batch_size,
            "batchpipe.job.started"
        );

        let stream = self.fetcher.fetch();
        let mut partitions = Partitions::new(stream, self.batch_size)?;

        match &self.parallelism {
            Some(cfg) if cfg.workers() > 1 => {
                parallel::run_partitioned(self, cfg, &notify, &mut partitions).await?;
            }
            _ => {
                while let Some(batch) = partitions.next_batch().await {
                    run_batch(&*self.processor, &*self.persistence, &notify, batch).await?;
                }
            }
        }

        Ok(notify.finish())
    }
}

/// Drives one batch through both stages, notifying listeners in between.
pub(crate) async fn run_batch<T, D, P>(
    processor: &dyn Processor<FetchedItem<T>, T, D>,
    persistence: &dyn Processor<FetchedItem<T>, D, P>,
    notify: &CompositeListener<T, D, P>,
    batch: Vec<FetchOutcome<T>>,
) -> Result<()>
where
    T: Send + Sync + 'static,
    D: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    notify.fetch_outcomes(&batch);

    let ready: Vec<FetchOutcome<T>> = batch.into_iter().filter(|o| o.is_success()).collect();
    let processed = processor.process(ready).await?;
    notify.process_outcomes(&processed);

    let persist_ready: Vec<Outcome<FetchedItem<T>, D>> =
        processed.into_iter().filter(|o| o.is_success()).collect();
    let persisted = persistence.process(persist_ready).await?;
    notify.persist_outcomes(&persisted);

    Ok(())
}

pub struct BatchJobBuilder<T, D, P>
where
    T: Send + Sync + 'static,
    D: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    description: String,
    batch_size: usize,
    parallelism: Option<Parallelism>,
    fetcher: Option<Arc<dyn Fetcher<T>>>,
    processor: Option<Arc<dyn Processor<FetchedItem<T>, T, D>>>,
    persistence: Option<Arc<dyn Processor<FetchedItem<T>, D, P>>>,
    listeners: Vec<Arc<dyn JobListener<T, D, P>>>,
}

impl<T, D, P> BatchJobBuilder<T, D, P>
where
    T: Send + Sync + 'static,
    D: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    /// Human-readable run description, handed to `on_before_run`.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Switch the run to bounded-concurrency execution.
    pub fn parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = Some(parallelism);
        self
    }

    pub fn fetcher(mut self, fetcher: impl Fetcher<T> + 'static) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    pub fn processor(mut self, processor: impl Processor<FetchedItem<T>, T, D> + 'static) -> Self {
        self.processor = Some(Arc::new(processor));
        self
    }

    pub fn persistence(
        mut self,
        persistence: impl Processor<FetchedItem<T>, D, P> + 'static,
    ) -> Self {
        self.persistence = Some(Arc::new(persistence));
        self
    }

    /// Register a listener; listeners are notified in registration order.
    pub fn listener(mut self, listener: Arc<dyn JobListener<T, D, P>>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn build(self) -> Result<BatchJob<T, D, P>> {
        if self.batch_size == 0 {
            return Err(Error::config("batch size must be a positive integer"));
        }
        let fetcher = self
            .fetcher
            .ok_or_else(|| Error::config("a fetcher is required"))?;
        let processor = self
            .processor
            .ok_or_else(|| Error::config("a processor is required"))?;
        let persistence = self
            .persistence
            .ok_or_else(|| Error::config("a persistence stage is required"))?;
        Ok(BatchJob {
            description: self.description,
            batch_size: self.batch_size,
            parallelism: self.parallelism,
            fetcher,
            processor,
            persistence,
            listeners: self.listeners,
        })
    }
}
