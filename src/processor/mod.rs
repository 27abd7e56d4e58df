use async_trait::async_trait;

use crate::error::Result;
use crate::outcome::Outcome;

pub mod batch;
pub mod compose;
pub mod fanout;
pub mod map;

pub use batch::RetryingBatchProcessor;
pub use compose::Compose;
pub use fanout::FanOut;
pub use map::MapProcessor;

/// One stage of a pipeline: maps a batch of outcomes to a batch of
/// outcomes, exactly one output per input, in order.
///
/// Recoverable faults must be absorbed into failed outcomes. An `Err`
/// from `process` is reserved for contract violations (a broken
/// collaborator, not a data fault) and aborts the whole run.
#[async_trait]
pub trait Processor<I: Send + 'static, D: Send + 'static, P: Send + 'static>: Send + Sync {
    fn name(&self) -> &'static str {
        "processor"
    }

    async fn process(&self, input: Vec<Outcome<I, D>>) -> Result<Vec<Outcome<I, P>>>;
}

/// Passes every outcome through unchanged.
pub struct Identity;

#[async_trait]
impl<I, D> Processor<I, D, D> for Identity
where
    I: Send + 'static,
    D: Send + 'static,
{
    fn name(&self) -> &'static str {
        "identity"
    }

    async fn process(&self, input: Vec<Outcome<I, D>>) -> Result<Vec<Outcome<I, D>>> {
        Ok(input)
    }
}

pub trait ProcessorExt<I, D, P>: Processor<I, D, P> + Sized
where
    I: Send + 'static,
    D: Send + 'static,
    P: Send + 'static,
{
    /// Run `self`, then feed its successes to `next`.
    fn then<Q, N>(self, next: N) -> Compose<Self, N, P>
    where
        Q: Send + 'static,
        N: Processor<I, P, Q> + Send + Sync,
    {
        Compose::new(self, next)
    }

    /// Run `self` and `other` over the same input, concatenating outputs.
    fn fan_out<N>(self, other: N) -> FanOut<Self, N>
    where
        N: Processor<I, D, P> + Send + Sync,
    {
        FanOut::new(self, other)
    }
}

impl<I, D, P, T> ProcessorExt<I, D, P> for T
where
    I: Send + 'static,
    D: Send + 'static,
    P: Send + 'static,
    T: Processor<I, D, P> + Sized + Send + Sync,
{
}
