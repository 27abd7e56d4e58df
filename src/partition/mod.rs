use futures::stream::{Stream, StreamExt};

use crate::error::{Error, Result};

/// Lazily groups a stream into fixed-size batches.
///
/// Every batch holds exactly `size` items except possibly the last, which
/// holds the remainder. The source is consumed once, forward-only, so
/// arbitrarily large streams never get materialized wholesale.
pub struct Partitions<S: Stream> {
    stream: S,
    size: usize,
}

impl<S: Stream> Partitions<S> {
    /// Wrap `stream`, validating the batch size.
    pub fn new(stream: S, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::config("batch size must be a positive integer"));
        }
        Ok(Self { stream, size })
    }

    /// Pull the next batch, or `None` once the source is exhausted.
    pub async fn next_batch(&mut self) -> Option<Vec<S::Item>>
    where
        S: Unpin,
    {
        let mut batch = Vec::with_capacity(self.size.min(1024));
        while batch.len() < self.size {
            match self.stream.next().await {
                Some(item) => batch.push(item),
                None => break,
            }
        }
        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }
}
