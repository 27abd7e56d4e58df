use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::outcome::Outcome;
use crate::processor::Processor;

/// Applies an async function to each successful item, one at a time.
///
/// An error from the function turns that item into a failed outcome with
/// the input preserved; failed inputs pass through untouched and are not
/// attempted.
pub struct MapProcessor<F> {
    stage: &'static str,
    f: F,
}

impl<F> MapProcessor<F> {
    pub fn new(stage: &'static str, f: F) -> Self {
        Self { stage, f }
    }
}

#[async_trait]
impl<I, D, P, F, Fut> Processor<I, D, P> for MapProcessor<F>
where
    I: Send + 'static,
    D: Send + 'static,
    P: Send + 'static,
    F: Fn(D) -> Fut + Send + Sync,
    Fut: Future<Output = Result<P>> + Send,
{
    fn name(&self) -> &'static str {
        self.stage
    }

    async fn process(&self, input: Vec<Outcome<I, D>>) -> Result<Vec<Outcome<I, P>>> {
        let mut out = Vec::with_capacity(input.len());
        for outcome in input {
            let (id, value, mut messages, mut causes) = outcome.into_parts();
            match value {
                None => out.push(Outcome::from_parts(id, None, messages, causes)),
                Some(value) => match (self.f)(value).await {
                    Ok(mapped) => {
                        out.push(Outcome::from_parts(id, Some(mapped), messages, causes));
                    }
                    Err(err) => {
                        #[cfg(feature = "tracing")]
                        tracing::event!(
                            tracing::Level::WARN,
                            event = "batchpipe.stage.item_failed",
                            stage = self.stage,
                            error = %err,
                            "batchpipe.stage.item_failed"
                        );
                        messages.push(format!("stage `{}` failed: {err}", self.stage));
                        causes.push(Arc::new(err));
                        out.push(Outcome::from_parts(id, None, messages, causes));
                    }
                },
            }
        }
        Ok(out)
    }
}
