use batchpipe::error::Error;
use batchpipe::partition::Partitions;
use futures::stream;

async fn collect_batches<T>(
    stream: impl futures::Stream<Item = T> + Unpin,
    size: usize,
) -> Vec<Vec<T>> {
    let mut parts = Partitions::new(stream, size).expect("valid batch size");
    let mut out = Vec::new();
    while let Some(batch) = parts.next_batch().await {
        out.push(batch);
    }
    out
}

#[tokio::test]
async fn ten_elements_by_three_is_three_three_three_one() {
    let batches = collect_batches(stream::iter(0..10), 3).await;
    let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![3, 3, 3, 1]);

    let all: Vec<i32> = batches.into_iter().flatten().collect();
    assert_eq!(all, (0..10).collect::<Vec<_>>());
}

#[tokio::test]
async fn empty_source_yields_no_batches() {
    let batches = collect_batches(stream::iter(Vec::<u8>::new()), 4).await;
    assert!(batches.is_empty());
}

#[tokio::test]
async fn batch_larger_than_source_is_one_short_batch() {
    let batches = collect_batches(stream::iter(vec![1, 2, 3]), 16).await;
    assert_eq!(batches, vec![vec![1, 2, 3]]);
}

#[tokio::test]
async fn exact_multiple_has_no_trailing_runt() {
    let batches = collect_batches(stream::iter(0..9), 3).await;
    let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![3, 3, 3]);
}

#[test]
fn zero_batch_size_is_rejected() {
    let err = Partitions::new(stream::iter(0..10), 0).err().expect("must fail");
    assert!(matches!(err, Error::Config(_)));
    assert!(format!("{err}").contains("positive"));
}
