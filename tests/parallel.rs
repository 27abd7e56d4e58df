use std::sync::{Arc, Mutex};
use std::time::Duration;

use batchpipe::error::{Error, Result};
use batchpipe::fetch::IterFetcher;
use batchpipe::job::{BatchJob, Parallelism};
use batchpipe::processor::MapProcessor;

mod common;
use common::CollectPersistence;

#[tokio::test]
async fn workers_drain_every_batch() -> Result<()> {
    let persisted = Arc::new(Mutex::new(Vec::<Vec<u32>>::new()));

    let job = BatchJob::builder()
        .description("parallel doubling")
        .batch_size(10)
        .parallelism(Parallelism::new(4).queue_capacity(2))
        .fetcher(IterFetcher::new(1u32..=100))
        .processor(MapProcessor::new("double", |n: u32| async move {
            Ok::<u32, Error>(n * 2)
        }))
        .persistence(CollectPersistence::new(persisted.clone()))
        .build()?;

    let stats = job.run().await?;

    assert!(stats.is_all_success());
    assert_eq!(stats.fetch().success(), 100);
    assert_eq!(stats.persist().success(), 100);

    let batches = persisted.lock().expect("mutex poisoned").clone();
    assert_eq!(batches.len(), 10);

    // batch-to-batch order across workers is unspecified, item order
    // within a batch is not
    for batch in &batches {
        assert!(batch.windows(2).all(|w| w[0] < w[1]));
    }
    let mut all: Vec<u32> = batches.into_iter().flatten().collect();
    all.sort_unstable();
    assert_eq!(all, (1..=100).map(|n| n * 2).collect::<Vec<_>>());
    Ok(())
}

#[tokio::test]
async fn single_worker_parallelism_matches_sequential_results() -> Result<()> {
    let persisted = Arc::new(Mutex::new(Vec::<Vec<u32>>::new()));

    let job = BatchJob::builder()
        .batch_size(4)
        .parallelism(Parallelism::new(1))
        .fetcher(IterFetcher::new(1u32..=9))
        .processor(MapProcessor::new("id", |n: u32| async move {
            Ok::<u32, Error>(n)
        }))
        .persistence(CollectPersistence::new(persisted.clone()))
        .build()?;

    let stats = job.run().await?;
    assert!(stats.is_all_success());

    let batches = persisted.lock().expect("mutex poisoned").clone();
    assert_eq!(batches, vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8], vec![9]]);
    Ok(())
}

#[tokio::test]
async fn work_left_at_the_deadline_is_a_hard_failure() {
    let persisted = Arc::new(Mutex::new(Vec::<Vec<u32>>::new()));

    let job = BatchJob::builder()
        .batch_size(2)
        .parallelism(
            Parallelism::new(2)
                .queue_capacity(4)
                .termination_timeout(Duration::from_millis(100)),
        )
        .fetcher(IterFetcher::new(1u32..=8))
        .processor(MapProcessor::new("stuck", |n: u32| async move {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok::<u32, Error>(n)
        }))
        .persistence(CollectPersistence::new(persisted))
        .build()
        .expect("valid job");

    let err = job.run().await.err().expect("deadline must abort the run");
    assert!(matches!(err, Error::Incomplete { pending } if pending > 0));
}
