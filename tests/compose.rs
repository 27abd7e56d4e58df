use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use batchpipe::error::{Error, Result};
use batchpipe::outcome::Outcome;
use batchpipe::processor::{
    Identity, MapProcessor, Processor, ProcessorExt, RetryingBatchProcessor,
};

mod common;
use common::successes;

#[tokio::test]
async fn every_combinator_preserves_cardinality() -> Result<()> {
    let mixed = vec![
        Outcome::success(1u32, 1u32),
        Outcome::failure_msg(2, "bad fetch"),
        Outcome::success(3, 3),
        Outcome::failure_msg(4, "bad fetch"),
        Outcome::success(5, 5),
    ];

    let identity_out = Identity.process(mixed.clone()).await?;
    assert_eq!(identity_out.len(), 5);

    let map = MapProcessor::new("inc", |v: u32| async move { Ok::<u32, Error>(v + 1) });
    let map_out = map.process(mixed.clone()).await?;
    assert_eq!(map_out.len(), 5);

    let composed = ProcessorExt::<u32, u32, u32>::then(
        MapProcessor::new("inc", |v: u32| async move { Ok::<u32, Error>(v + 1) }),
        MapProcessor::new("double", |v: u32| async move { Ok::<u32, Error>(v * 2) }),
    );
    let composed_out = composed.process(mixed).await?;
    assert_eq!(composed_out.len(), 5);
    Ok(())
}

#[tokio::test]
async fn failing_first_stage_skips_the_second_entirely() -> Result<()> {
    let second_calls = Arc::new(AtomicUsize::new(0));
    let second_calls_in = second_calls.clone();

    let first = MapProcessor::new("first", |_v: u32| async move {
        Err::<u32, Error>(Error::stage("first", "boom"))
    });
    let second = MapProcessor::new("second", move |v: u32| {
        let calls = second_calls_in.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<u32, Error>(v)
        }
    });

    let out = ProcessorExt::<u32, u32, u32>::then(first, second)
        .process(successes(vec![1, 2, 3]))
        .await?;
    assert_eq!(out.len(), 3);
    assert!(out.iter().all(|o| o.is_failure()));
    assert!(out
        .iter()
        .all(|o| o.messages().iter().any(|m| m.contains("aborted by `first`"))));
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn partial_first_stage_failure_keeps_positions() -> Result<()> {
    let first = MapProcessor::new("first", |v: u32| async move {
        if v == 2 {
            Err(Error::stage("first", "poison"))
        } else {
            Ok::<u32, Error>(v)
        }
    });
    let second = MapProcessor::new("second", |v: u32| async move { Ok::<u32, Error>(v * 10) });

    let out = ProcessorExt::<u32, u32, u32>::then(first, second)
        .process(successes(vec![1, 2, 3]))
        .await?;
    assert_eq!(out.len(), 3);
    assert_eq!(out[0].output(), Some(&10));
    assert!(out[1].is_failure());
    assert_eq!(out[1].input(), &2);
    assert_eq!(out[2].output(), Some(&30));
    Ok(())
}

#[tokio::test]
async fn first_stage_messages_survive_composition() -> Result<()> {
    let first = MapProcessor::new("first", |v: u32| async move {
        if v == 2 {
            Err(Error::stage("first", "poison"))
        } else {
            Ok::<u32, Error>(v)
        }
    });

    let out = ProcessorExt::<u32, u32, u32>::then(first, Identity)
        .process(successes(vec![1, 2, 3]))
        .await?;
    let failed = &out[1];
    assert!(failed.is_failure());
    // the original failure plus the composition annotation
    assert!(failed.messages().len() >= 2);
    assert!(failed.messages()[0].contains("poison"));
    Ok(())
}

#[tokio::test]
async fn batch_stage_inside_a_composition_keeps_one_to_one() -> Result<()> {
    let first = MapProcessor::new("inc", |v: u32| async move { Ok::<u32, Error>(v + 1) });
    let second = RetryingBatchProcessor::new("picky", |values: Vec<u32>| async move {
        if values.contains(&3) {
            Err(Error::stage("picky", "cannot stomach a 3"))
        } else {
            Ok(values)
        }
    });

    // inputs become 2, 3, 4 after the first stage; 3 is poison
    let out = ProcessorExt::<u32, u32, u32>::then(first, second)
        .process(successes(vec![1, 2, 3]))
        .await?;
    assert_eq!(out.len(), 3);
    assert_eq!(out.iter().filter(|o| o.is_failure()).count(), 1);
    assert_eq!(out.iter().filter(|o| o.is_success()).count(), 2);
    Ok(())
}

#[tokio::test]
async fn fan_out_doubles_cardinality_on_purpose() -> Result<()> {
    let doubled = ProcessorExt::<u32, u32, u32>::fan_out(
        MapProcessor::new("left", |v: u32| async move { Ok::<u32, Error>(v) }),
        MapProcessor::new("right", |v: u32| async move { Ok::<u32, Error>(v + 100) }),
    );

    let out = doubled.process(successes(vec![1, 2, 3])).await?;
    assert_eq!(out.len(), 6);

    let outputs: Vec<u32> = out.iter().filter_map(|o| o.output().copied()).collect();
    assert_eq!(outputs, vec![1, 2, 3, 101, 102, 103]);
    Ok(())
}
