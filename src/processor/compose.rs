use std::marker::PhantomData;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::outcome::Outcome;
use crate::processor::Processor;

/// Runs two processors in sequence, feeding only the first stage's
/// successes to the second.
///
/// Outcomes are re-associated with their inputs by position: the
/// one-output-per-input contract makes the k-th output of the second
/// stage belong to the k-th success fed into it, so no equality or
/// hashing is required of intermediate values. A stage that emits the
/// wrong number of outcomes is a broken collaborator and aborts the run.
pub struct Compose<A, B, M> {
    first: A,
    second: B,
    _mid: PhantomData<fn() -> M>,
}

impl<A, B, M> Compose<A, B, M> {
    pub fn new(first: A, second: B) -> Self {
        Self {
            first,
            second,
            _mid: PhantomData,
        }
    }
}

#[async_trait]
impl<I, D, M, P, A, B> Processor<I, D, P> for Compose<A, B, M>
where
    I: Send + 'static,
    D: Send + 'static,
    M: Send + 'static,
    P: Send + 'static,
    A: Processor<I, D, M> + Send + Sync,
    B: Processor<I, M, P> + Send + Sync,
{
    fn name(&self) -> &'static str {
        "compose"
    }

    async fn process(&self, input: Vec<Outcome<I, D>>) -> Result<Vec<Outcome<I, P>>> {
        let expected = input.len();
        let first_out = self.first.process(input).await?;
        if first_out.len() != expected {
            return Err(Error::cardinality(
                self.first.name(),
                expected,
                first_out.len(),
            ));
        }

        // A failed slot is final; a `None` slot is filled from the second
        // stage's output, in order.
        let first_name = self.first.name();
        let mut slots: Vec<Option<Outcome<I, P>>> = Vec::with_capacity(expected);
        let mut ready: Vec<Outcome<I, M>> = Vec::new();
        for outcome in first_out {
            if outcome.is_success() {
                slots.push(None);
                ready.push(outcome);
            } else {
                slots.push(Some(
                    outcome
                        .propagate()
                        .with_message(format!("aborted by `{first_name}`")),
                ));
            }
        }

        let fed = ready.len();
        let second_out = if fed == 0 {
            Vec::new()
        } else {
            self.second.process(ready).await?
        };
        if second_out.len() != fed {
            return Err(Error::cardinality(
                self.second.name(),
                fed,
                second_out.len(),
            ));
        }

        let mut composed = second_out.into_iter();
        Ok(slots
            .into_iter()
            .map(|slot| match slot {
                Some(failed) => failed,
                None => composed.next().expect("cardinality checked above"),
            })
            .collect())
    }
}
