use std::future::Future;

use futures::stream::{self, BoxStream, StreamExt};

use crate::error::Result;
use crate::fetch::{FetchOutcome, FetchedItem, Fetcher};
use crate::outcome::Outcome;

const DEFAULT_PAGE_SIZE: usize = 100;

/// Lazily pulls a source page by page.
///
/// The closure receives `(offset, limit)` and returns one page of values.
/// Fetching stops after the first page shorter than `limit` (including an
/// empty one). A page error becomes a single failed outcome and ends the
/// stream; nothing past the failing page is requested.
pub struct PageFetcher<F> {
    page_size: usize,
    f: F,
}

impl<F> PageFetcher<F> {
    pub fn new(f: F) -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            f,
        }
    }

    /// Number of values requested per page call.
    pub fn page_size(mut self, n: usize) -> Self {
        self.page_size = n.max(1);
        self
    }
}

struct PageState {
    offset: usize,
    num: usize,
    done: bool,
}

impl<T, F, Fut> Fetcher<T> for PageFetcher<F>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(usize, usize) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<T>>> + Send,
{
    fn fetch(&self) -> BoxStream<'_, FetchOutcome<T>> {
        let state = PageState {
            offset: 0,
            num: 0,
            done: false,
        };
        Box::pin(
            stream::unfold(state, move |mut state| async move {
                if state.done {
                    return None;
                }
                match (self.f)(state.offset, self.page_size).await {
                    Ok(page) => {
                        if page.is_empty() {
                            return None;
                        }
                        state.done = page.len() < self.page_size;
                        state.offset += page.len();
                        let outcomes: Vec<FetchOutcome<T>> = page
                            .into_iter()
                            .map(|value| {
                                state.num += 1;
                                Outcome::success(FetchedItem::of(value.clone(), state.num), value)
                            })
                            .collect();
                        Some((outcomes, state))
                    }
                    Err(err) => {
                        state.done = true;
                        state.num += 1;
                        let outcomes =
                            vec![Outcome::failure(FetchedItem::placeholder(state.num), err)];
                        Some((outcomes, state))
                    }
                }
            })
            .flat_map(stream::iter),
        )
    }
}
