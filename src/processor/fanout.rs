use async_trait::async_trait;

use crate::error::Result;
use crate::outcome::Outcome;
use crate::processor::Processor;

/// Runs two processors over the same input and concatenates their
/// outputs.
///
/// Every input yields two outcomes, one per branch, in branch order.
/// This combinator intentionally breaks the one-output-per-input rule the
/// rest of the algebra upholds; counting code downstream must account for
/// the doubled cardinality.
pub struct FanOut<A, B> {
    left: A,
    right: B,
}

impl<A, B> FanOut<A, B> {
    pub fn new(left: A, right: B) -> Self {
        Self { left, right }
    }
}

#[async_trait]
impl<I, D, P, A, B> Processor<I, D, P> for FanOut<A, B>
where
    I: Clone + Send + 'static,
    D: Clone + Send + 'static,
    P: Send + 'static,
    A: Processor<I, D, P> + Send + Sync,
    B: Processor<I, D, P> + Send + Sync,
{
    fn name(&self) -> &'static str {
        "fan_out"
    }

    async fn process(&self, input: Vec<Outcome<I, D>>) -> Result<Vec<Outcome<I, P>>> {
        let copy = input.clone();
        let mut out = self.left.process(input).await?;
        out.extend(self.right.process(copy).await?);
        Ok(out)
    }
}
