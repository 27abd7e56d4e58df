use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::{Error, Result};
use crate::outcome::Outcome;
use crate::processor::Processor;

/// Applies a whole-batch function, retrying items one by one when the
/// batch attempt fails.
///
/// The wrapped function receives every currently-successful value of the
/// batch in one call (one database round-trip for N rows) and must return
/// exactly one output per value, in order. If it cannot process the batch
/// it returns an error instead of a short or padded list.
///
/// On a batch error the whole algorithm is re-run per item, each wrapped
/// as its own singleton batch, so one poison item cannot fail its
/// siblings. The retry goes straight to singletons, not through binary
/// halving. A wrong-length return is a broken collaborator, reported as
/// [`Error::BatchSizeMismatch`] and never retried.
///
/// The function may see overlapping values across the retry boundary, so
/// whatever it does to external resources must stay safe under
/// re-invocation, e.g. transactional per call. Panics are not caught.
pub struct RetryingBatchProcessor<F> {
    stage: &'static str,
    f: F,
}

impl<F> RetryingBatchProcessor<F> {
    pub fn new(stage: &'static str, f: F) -> Self {
        Self { stage, f }
    }
}

#[async_trait]
impl<I, D, P, F, Fut> Processor<I, D, P> for RetryingBatchProcessor<F>
where
    I: Send + 'static,
    D: Clone + Send + Sync + 'static,
    P: Send + 'static,
    F: Fn(Vec<D>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<P>>> + Send,
{
    fn name(&self) -> &'static str {
        self.stage
    }

    async fn process(&self, input: Vec<Outcome<I, D>>) -> Result<Vec<Outcome<I, P>>> {
        self.run_chunk(input).await
    }
}

impl<F> RetryingBatchProcessor<F> {
    /// One round of the algorithm; singleton retries re-enter here.
    fn run_chunk<'a, I, D, P, Fut>(
        &'a self,
        input: Vec<Outcome<I, D>>,
    ) -> BoxFuture<'a, Result<Vec<Outcome<I, P>>>>
    where
        I: Send + 'static,
        D: Clone + Send + Sync + 'static,
        P: Send + 'static,
        F: Fn(Vec<D>) -> Fut + Send + Sync,
        Fut: Future<Output = Result<Vec<P>>> + Send,
    {
        Box::pin(async move {
            if input.is_empty() {
                return Ok(Vec::new());
            }

            // Already-failed inputs are never re-attempted; they ride along
            // and are re-appended after the attempted outcomes.
            let mut attempt: Vec<Outcome<I, D>> = Vec::new();
            let mut carried: Vec<Outcome<I, D>> = Vec::new();
            for outcome in input {
                if outcome.is_success() {
                    attempt.push(outcome);
                } else {
                    carried.push(outcome);
                }
            }

            let mut out: Vec<Outcome<I, P>> = Vec::with_capacity(attempt.len() + carried.len());
            if !attempt.is_empty() {
                let values: Vec<D> = attempt.iter().filter_map(|o| o.output().cloned()).collect();
                match (self.f)(values).await {
                    Ok(outputs) => {
                        if outputs.len() != attempt.len() {
                            return Err(Error::batch_size_mismatch(
                                self.stage,
                                attempt.len(),
                                outputs.len(),
                            ));
                        }
                        for (outcome, output) in attempt.into_iter().zip(outputs) {
                            let (id, _value, messages, causes) = outcome.into_parts();
                            out.push(Outcome::from_parts(id, Some(output), messages, causes));
                        }
                    }
                    Err(err) if attempt.len() == 1 => {
                        let outcome = attempt.pop().expect("length checked above");
                        let (id, _value, mut messages, mut causes) = outcome.into_parts();
                        messages.push(format!("stage `{}` failed: {err}", self.stage));
                        causes.push(Arc::new(err));
                        out.push(Outcome::from_parts(id, None, messages, causes));
                    }
                    Err(err) => {
                        #[cfg(feature = "tracing")]
                        tracing::event!(
                            tracing::Level::WARN,
                            event = "batchpipe.batch.attempt_failed",
                            stage = self.stage,
                            batch_size = attempt.len(),
                            error = %err,
                            "batchpipe.batch.attempt_failed"
                        );
                        #[cfg(not(feature = "tracing"))]
                        let _ = err;
                        for outcome in attempt {
                            out.extend(self.run_chunk(vec![outcome]).await?);
                        }
                    }
                }
            }

            for outcome in carried {
                out.push(outcome.propagate());
            }
            Ok(out)
        })
    }
}
