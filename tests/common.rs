#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use batchpipe::error::{Error, Result};
use batchpipe::fetch::FetchedItem;
use batchpipe::job::JobListener;
use batchpipe::outcome::Outcome;
use batchpipe::processor::Processor;

/// Wrap plain values as successful outcomes keyed by themselves.
pub fn successes(values: Vec<u32>) -> Vec<Outcome<u32, u32>> {
    values.into_iter().map(|v| Outcome::success(v, v)).collect()
}

/// Listener counting the batches it observed per stage.
#[derive(Default)]
pub struct CollectListener {
    pub before_runs: Mutex<Vec<String>>,
    pub after_runs: AtomicUsize,
    pub fetch_batches: AtomicUsize,
    pub process_batches: AtomicUsize,
    pub persist_batches: AtomicUsize,
}

impl<T, D, P> JobListener<T, D, P> for CollectListener {
    fn on_before_run(&self, description: &str) -> Result<()> {
        self.before_runs
            .lock()
            .expect("mutex poisoned")
            .push(description.to_string());
        Ok(())
    }

    fn on_after_run(&self) -> Result<()> {
        self.after_runs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_fetch_outcomes(&self, _outcomes: &[Outcome<FetchedItem<T>, T>]) -> Result<()> {
        self.fetch_batches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_process_outcomes(&self, _outcomes: &[Outcome<FetchedItem<T>, D>]) -> Result<()> {
        self.process_batches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_persist_outcomes(&self, _outcomes: &[Outcome<FetchedItem<T>, P>]) -> Result<()> {
        self.persist_batches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Listener that fails every callback.
pub struct FailingListener;

impl<T, D, P> JobListener<T, D, P> for FailingListener {
    fn on_before_run(&self, _description: &str) -> Result<()> {
        Err(Error::Message("listener broke".into()))
    }

    fn on_after_run(&self) -> Result<()> {
        Err(Error::Message("listener broke".into()))
    }

    fn on_fetch_outcomes(&self, _outcomes: &[Outcome<FetchedItem<T>, T>]) -> Result<()> {
        Err(Error::Message("listener broke".into()))
    }

    fn on_process_outcomes(&self, _outcomes: &[Outcome<FetchedItem<T>, D>]) -> Result<()> {
        Err(Error::Message("listener broke".into()))
    }

    fn on_persist_outcomes(&self, _outcomes: &[Outcome<FetchedItem<T>, P>]) -> Result<()> {
        Err(Error::Message("listener broke".into()))
    }
}

/// Persistence stage that records each batch of values it receives and
/// passes every outcome through unchanged.
pub struct CollectPersistence<T> {
    out: Arc<Mutex<Vec<Vec<T>>>>,
}

impl<T> CollectPersistence<T> {
    pub fn new(out: Arc<Mutex<Vec<Vec<T>>>>) -> Self {
        Self { out }
    }
}

#[async_trait]
impl<I, T> Processor<I, T, T> for CollectPersistence<T>
where
    I: Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "collect"
    }

    async fn process(&self, input: Vec<Outcome<I, T>>) -> Result<Vec<Outcome<I, T>>> {
        let values: Vec<T> = input.iter().filter_map(|o| o.output().cloned()).collect();
        self.out.lock().expect("mutex poisoned").push(values);
        Ok(input)
    }
}
