use futures::stream::{self, BoxStream, StreamExt};

use crate::error::Result;
use crate::outcome::Outcome;

pub mod pages;

pub use pages::PageFetcher;

/// One outcome of the fetch stage: the fetched value, tagged with its
/// position in the run.
pub type FetchOutcome<T> = Outcome<FetchedItem<T>, T>;

/// A fetched value together with its 1-based position within the run,
/// kept for traceability in logs and identifiers.
///
/// The value is absent when the item itself could not be obtained; such a
/// placeholder is the input of a failed fetch outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchedItem<T> {
    value: Option<T>,
    num: usize,
}

impl<T> FetchedItem<T> {
    pub fn of(value: T, num: usize) -> Self {
        Self {
            value: Some(value),
            num,
        }
    }

    pub fn placeholder(num: usize) -> Self {
        Self { value: None, num }
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }

    pub fn num(&self) -> usize {
        self.num
    }
}

/// Produces the candidate stream for one run.
///
/// A fetcher must not fail: fetch problems (a network error, a filesystem
/// listing error, an exhausted paged source) are reported as failed
/// outcomes inside the stream, never as an error of `fetch` itself.
pub trait Fetcher<T: Send>: Send + Sync {
    fn fetch(&self) -> BoxStream<'_, FetchOutcome<T>>;
}

/// Fetches from an in-memory collection, numbering items from 1.
///
/// Each run replays the same items from the top.
#[derive(Clone)]
pub struct IterFetcher<T> {
    items: Vec<T>,
}

impl<T> IterFetcher<T> {
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }
}

impl<T> Fetcher<T> for IterFetcher<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fetch(&self) -> BoxStream<'_, FetchOutcome<T>> {
        Box::pin(stream::iter(self.items.iter().cloned().enumerate().map(
            |(idx, value)| Outcome::success(FetchedItem::of(value.clone(), idx + 1), value),
        )))
    }
}

/// Fetches from a closure producing a fallible iterator per run.
///
/// An `Err` element becomes a failed outcome with a placeholder input, so
/// a source that breaks mid-iteration surfaces inside the stream instead
/// of reaching the driver.
pub struct FnFetcher<F> {
    f: F,
}

impl<F> FnFetcher<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<T, It, F> Fetcher<T> for FnFetcher<F>
where
    T: Clone + Send + Sync + 'static,
    It: Iterator<Item = Result<T>> + Send + 'static,
    F: Fn() -> It + Send + Sync,
{
    fn fetch(&self) -> BoxStream<'_, FetchOutcome<T>> {
        let mut num = 0usize;
        Box::pin(stream::iter((self.f)()).map(move |item| {
            num += 1;
            match item {
                Ok(value) => Outcome::success(FetchedItem::of(value.clone(), num), value),
                Err(err) => Outcome::failure(FetchedItem::placeholder(num), err),
            }
        }))
    }
}
