use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::outcome::Outcome;

/// Success/error tallies for one stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    success: usize,
    error: usize,
}

impl Counts {
    pub fn new(success: usize, error: usize) -> Self {
        Self { success, error }
    }

    pub fn success(&self) -> usize {
        self.success
    }

    pub fn error(&self) -> usize {
        self.error
    }

    pub fn record<I, O>(&mut self, outcome: &Outcome<I, O>) {
        if outcome.is_success() {
            self.success += 1;
        } else {
            self.error += 1;
        }
    }

    pub fn all_success(&self) -> bool {
        self.error == 0
    }

    /// At least one error and not a single success.
    pub fn all_failed(&self) -> bool {
        self.error != 0 && self.success == 0
    }
}

/// Aggregated per-stage counts for one run.
///
/// `is_all_failed` is an OR over the stages: one wholly-failed stage
/// marks the run as failed even when the stages before it went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatistics {
    fetch: Counts,
    process: Counts,
    persist: Counts,
    listener_failures: bool,
}

impl RunStatistics {
    pub fn new(fetch: Counts, process: Counts, persist: Counts, listener_failures: bool) -> Self {
        Self {
            fetch,
            process,
            persist,
            listener_failures,
        }
    }

    pub fn fetch(&self) -> Counts {
        self.fetch
    }

    pub fn process(&self) -> Counts {
        self.process
    }

    pub fn persist(&self) -> Counts {
        self.persist
    }

    pub fn has_listener_failures(&self) -> bool {
        self.listener_failures
    }

    pub fn is_all_success(&self) -> bool {
        self.fetch.all_success()
            && self.process.all_success()
            && self.persist.all_success()
            && !self.listener_failures
    }

    pub fn is_all_failed(&self) -> bool {
        self.fetch.all_failed() || self.process.all_failed() || self.persist.all_failed()
    }
}

/// Accumulator the composite listener feeds while batches flow; shared
/// across workers in concurrent runs, so everything is atomic.
#[derive(Default)]
pub(crate) struct StatsCollector {
    fetch_success: AtomicUsize,
    fetch_error: AtomicUsize,
    process_success: AtomicUsize,
    process_error: AtomicUsize,
    persist_success: AtomicUsize,
    persist_error: AtomicUsize,
    listener_failures: AtomicBool,
}

impl StatsCollector {
    pub fn record_fetch<I, O>(&self, outcomes: &[Outcome<I, O>]) {
        Self::bump(&self.fetch_success, &self.fetch_error, outcomes);
    }

    pub fn record_process<I, O>(&self, outcomes: &[Outcome<I, O>]) {
        Self::bump(&self.process_success, &self.process_error, outcomes);
    }

    pub fn record_persist<I, O>(&self, outcomes: &[Outcome<I, O>]) {
        Self::bump(&self.persist_success, &self.persist_error, outcomes);
    }

    pub fn listener_failed(&self) {
        self.listener_failures.store(true, Ordering::SeqCst);
    }

    fn bump<I, O>(success: &AtomicUsize, error: &AtomicUsize, outcomes: &[Outcome<I, O>]) {
        for outcome in outcomes {
            if outcome.is_success() {
                success.fetch_add(1, Ordering::SeqCst);
            } else {
                error.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    pub fn snapshot(&self) -> RunStatistics {
        RunStatistics::new(
            Counts::new(
                self.fetch_success.load(Ordering::SeqCst),
                self.fetch_error.load(Ordering::SeqCst),
            ),
            Counts::new(
                self.process_success.load(Ordering::SeqCst),
                self.process_error.load(Ordering::SeqCst),
            ),
            Counts::new(
                self.persist_success.load(Ordering::SeqCst),
                self.persist_error.load(Ordering::SeqCst),
            ),
            self.listener_failures.load(Ordering::SeqCst),
        )
    }
}
