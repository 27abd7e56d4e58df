use std::sync::Arc;

use crate::error::Result;
use crate::fetch::FetchedItem;
use crate::job::stats::{RunStatistics, StatsCollector};
use crate::outcome::Outcome;

/// Observer hooks invoked around each stage of a run.
///
/// Every callback is a no-op by default, so a listener implements only
/// what it needs. A callback returning `Err` is recorded as a listener
/// delegation failure and skipped; it never aborts the run and never
/// suppresses the callbacks of other listeners.
pub trait JobListener<T, D, P>: Send + Sync {
    fn on_before_run(&self, _description: &str) -> Result<()> {
        Ok(())
    }

    fn on_after_run(&self) -> Result<()> {
        Ok(())
    }

    fn on_fetch_outcomes(&self, _outcomes: &[Outcome<FetchedItem<T>, T>]) -> Result<()> {
        Ok(())
    }

    fn on_process_outcomes(&self, _outcomes: &[Outcome<FetchedItem<T>, D>]) -> Result<()> {
        Ok(())
    }

    fn on_persist_outcomes(&self, _outcomes: &[Outcome<FetchedItem<T>, P>]) -> Result<()> {
        Ok(())
    }
}

/// Fan-out to the statistics collector and every registered listener.
pub(crate) struct CompositeListener<T, D, P> {
    stats: StatsCollector,
    listeners: Vec<Arc<dyn JobListener<T, D, P>>>,
}

impl<T, D, P> CompositeListener<T, D, P> {
    pub fn new(listeners: Vec<Arc<dyn JobListener<T, D, P>>>) -> Self {
        Self {
            stats: StatsCollector::default(),
            listeners,
        }
    }

    pub fn before_run(&self, description: &str) {
        for listener in &self.listeners {
            if let Err(err) = listener.on_before_run(description) {
                self.delegation_failure(err);
            }
        }
    }

    pub fn fetch_outcomes(&self, outcomes: &[Outcome<FetchedItem<T>, T>]) {
        self.stats.record_fetch(outcomes);
        for listener in &self.listeners {
            if let Err(err) = listener.on_fetch_outcomes(outcomes) {
                self.delegation_failure(err);
            }
        }
    }

    pub fn process_outcomes(&self, outcomes: &[Outcome<FetchedItem<T>, D>]) {
        self.stats.record_process(outcomes);
        for listener in &self.listeners {
            if let Err(err) = listener.on_process_outcomes(outcomes) {
                self.delegation_failure(err);
            }
        }
    }

    pub fn persist_outcomes(&self, outcomes: &[Outcome<FetchedItem<T>, P>]) {
        self.stats.record_persist(outcomes);
        for listener in &self.listeners {
            if let Err(err) = listener.on_persist_outcomes(outcomes) {
                self.delegation_failure(err);
            }
        }
    }

    /// Final `on_after_run` round, then the aggregated statistics.
    pub fn finish(&self) -> RunStatistics {
        for listener in &self.listeners {
            if let Err(err) = listener.on_after_run() {
                self.delegation_failure(err);
            }
        }
        self.stats.snapshot()
    }

    fn delegation_failure(&self, err: crate::error::Error) {
        #[cfg(feature = "tracing")]
        tracing::event!(
            tracing::Level::ERROR,
            event = "batchpipe.listener.failed",
            error = %err,
            "batchpipe.listener.failed"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = err;
        self.stats.listener_failed();
    }
}
