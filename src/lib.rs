//! # batchpipe
//!
//! **Partitioned batch pipelines with per-item outcome tracking.**
//!
//! `batchpipe` is a Rust crate for building **fetch → process → persist**
//! batch jobs over bounded or unbounded datasets: the kind of small
//! command-line import/export job that downloads records by id and writes
//! them somewhere in chunks, without giving up on the whole run because
//! one record was bad.
//!
//! It is designed for production constraints:
//!
//! - lazy, single-pass sources (huge streams are never materialized)
//! - per-item success/failure tracking through every stage
//! - batch-oriented operations with automatic retry-by-bisection
//! - one bad item never fails its siblings
//!
//! ---
//!
//! ## Core Model
//!
//! A run drives three ordered stages over fixed-size batches:
//!
//! ```text
//! Fetcher → Partitions → Processor (process) → Processor (persist)
//! ```
//!
//! Every stage maps a batch of [`Outcome`]s to a batch of [`Outcome`]s,
//! exactly one output per input. Failed outcomes are carried through but
//! excluded from the real work handed to the next stage. Listeners
//! observe each stage per batch, and a [`RunStatistics`] with per-stage
//! counts comes back from [`BatchJob::run`].
//!
//! ---
//!
//! ## Example
//!
//! ```
//! use batchpipe::error::Error;
//! use batchpipe::fetch::IterFetcher;
//! use batchpipe::job::BatchJob;
//! use batchpipe::processor::{MapProcessor, RetryingBatchProcessor};
//!
//! #[tokio::main]
//! async fn main() -> batchpipe::error::Result<()> {
//!     let job = BatchJob::builder()
//!         .description("double some numbers")
//!         .batch_size(2)
//!         .fetcher(IterFetcher::new(vec![1u32, 2, 3]))
//!         .processor(MapProcessor::new("double", |n: u32| async move {
//!             Ok::<u32, Error>(n * 2)
//!         }))
//!         .persistence(RetryingBatchProcessor::new("store", |values: Vec<u32>| async move {
//!             // one round-trip for the whole batch
//!             Ok::<Vec<u32>, Error>(values)
//!         }))
//!         .build()?;
//!
//!     let stats = job.run().await?;
//!     assert!(stats.is_all_success());
//!     Ok(())
//! }
//! ```
//!
//! ---
//!
//! ## Retry by bisection
//!
//! [`RetryingBatchProcessor`] wraps a function that takes the whole
//! batch's values in one call and must return one output per value, in
//! order. When the batch call fails, every item is retried as its own
//! singleton batch, so a poison item fails alone:
//!
//! ```
//! use batchpipe::error::Error;
//! use batchpipe::outcome::Outcome;
//! use batchpipe::processor::{Processor, RetryingBatchProcessor};
//!
//! # #[tokio::main]
//! # async fn main() -> batchpipe::error::Result<()> {
//! let stage = RetryingBatchProcessor::new("persist", |values: Vec<u32>| async move {
//!     if values.contains(&2) {
//!         Err(Error::stage("persist", "bad row"))
//!     } else {
//!         Ok(values)
//!     }
//! });
//!
//! let input = vec![
//!     Outcome::success(1u32, 1u32),
//!     Outcome::success(2, 2),
//!     Outcome::success(3, 3),
//! ];
//! let out = stage.process(input).await?;
//! assert_eq!(out.iter().filter(|o| o.is_success()).count(), 2);
//! assert_eq!(out.iter().filter(|o| o.is_failure()).count(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! A batch function may see overlapping values across the retry boundary,
//! so whatever it does to external resources must stay safe under
//! re-invocation: transactional per call, or idempotent.
//!
//! ---
//!
//! ## API Contracts
//!
//! - Fetchers never fail: fetch problems surface as failed outcomes
//!   inside the stream.
//! - Processors never fail for data reasons: recoverable faults become
//!   failed outcomes. An `Err` from a stage means a broken collaborator
//!   (e.g. a wrong-length batch return) and aborts the run.
//! - One output per input everywhere, except the explicitly fan-out
//!   combinator [`FanOut`], which doubles cardinality on purpose.
//! - Listener failures are recorded in the statistics and never abort a
//!   run.
//!
//! ---
//!
//! ## Concurrency
//!
//! Runs are sequential by default. [`Parallelism`] switches a job to a
//! fixed set of workers consuming batches from a bounded queue under a
//! termination deadline; batch-to-batch order across workers is then
//! unspecified, item order within a batch is kept.
//!
//! ---
//!
//! ## Observability
//!
//! Enable tracing instrumentation with the default-on `tracing` feature.
//! `batchpipe` emits structured events such as `batchpipe.job.started`,
//! `batchpipe.stage.item_failed`, `batchpipe.batch.attempt_failed`,
//! `batchpipe.listener.failed`, `batchpipe.queue.enqueue_timeout`, and
//! `batchpipe.worker.aborted`.
//!
//! ---
//!
//! ## Feature Flags
//!
//! - `tracing` *(default)*: enables the structured events above.
//!
//! [`Outcome`]: outcome::Outcome
//! [`RunStatistics`]: job::RunStatistics
//! [`BatchJob::run`]: job::BatchJob::run
//! [`RetryingBatchProcessor`]: processor::RetryingBatchProcessor
//! [`FanOut`]: processor::FanOut
//! [`Parallelism`]: job::Parallelism

// Public modules
pub mod error;
pub mod fetch;
pub mod job;
pub mod outcome;
pub mod partition;
pub mod processor;

pub mod prelude {
    //! Convenient imports for most `batchpipe` users.

    pub use crate::fetch::{FetchedItem, Fetcher, FnFetcher, IterFetcher, PageFetcher};
    pub use crate::job::{BatchJob, Counts, JobListener, Parallelism, RunStatistics};
    pub use crate::outcome::Outcome;
    pub use crate::partition::Partitions;
    pub use crate::processor::{
        Identity, MapProcessor, Processor, ProcessorExt, RetryingBatchProcessor,
    };
}
