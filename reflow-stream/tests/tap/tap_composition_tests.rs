// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use parking_lot::Mutex;
use reflow_core::Publisher;
use reflow_stream::prelude::*;
use reflow_test_utils::TestSubscriber;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Log = Arc<Mutex<Vec<String>>>;

fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

#[tokio::test]
async fn test_chained_hooks_fire_in_registration_order() -> anyhow::Result<()> {
    // Arrange
    let log = log();
    let (first, second) = (Arc::clone(&log), Arc::clone(&log));
    let ts = TestSubscriber::<i32>::unbounded();

    // Act
    from_iter(1..=2)
        .on_next(move |v| first.lock().push(format!("first {v}")))
        .on_next(move |v| second.lock().push(format!("second {v}")))
        .subscribe(ts.clone());

    // Assert
    assert_eq!(
        *log.lock(),
        vec!["first 1", "second 1", "first 2", "second 2"]
    );
    assert_eq!(ts.items(), vec![1, 2]);

    Ok(())
}

#[tokio::test]
async fn test_chaining_wraps_the_source_once() -> anyhow::Result<()> {
    // Arrange
    let requests = Arc::new(Mutex::new(Vec::new()));
    let (a, b) = (Arc::clone(&requests), Arc::clone(&requests));
    let ts = TestSubscriber::<i32>::new();

    let tapped = from_iter(0..10)
        .on_request(move |n| a.lock().push(n))
        .on_request(move |n| b.lock().push(n));

    // Act
    tapped.subscribe(ts.clone());
    ts.request(3);

    // Assert
    assert!(format!("{:?}", tapped.hooks()).contains("on_request: 2"));
    assert_eq!(*requests.lock(), vec![3, 3]);
    assert_eq!(ts.items(), vec![0, 1, 2]);

    Ok(())
}

#[tokio::test]
async fn test_extending_a_clone_leaves_the_base_untouched() -> anyhow::Result<()> {
    // Arrange
    let base_hits = Arc::new(AtomicUsize::new(0));
    let extra_hits = Arc::new(AtomicUsize::new(0));
    let (base_counter, extra_counter) = (Arc::clone(&base_hits), Arc::clone(&extra_hits));

    let base = from_iter(vec![1, 2, 3]).on_next(move |_| {
        base_counter.fetch_add(1, Ordering::SeqCst);
    });
    let extended = base.clone().on_next(move |_| {
        extra_counter.fetch_add(1, Ordering::SeqCst);
    });

    // Act
    base.subscribe(TestSubscriber::<i32>::unbounded());

    // Assert
    assert_eq!(base_hits.load(Ordering::SeqCst), 3);
    assert_eq!(extra_hits.load(Ordering::SeqCst), 0);

    // Act
    extended.subscribe(TestSubscriber::<i32>::unbounded());

    // Assert
    assert_eq!(base_hits.load(Ordering::SeqCst), 6);
    assert_eq!(extra_hits.load(Ordering::SeqCst), 3);

    Ok(())
}

#[tokio::test]
async fn test_taps_around_map_see_their_own_stage() -> anyhow::Result<()> {
    // Arrange
    let log = log();
    let (before, after) = (Arc::clone(&log), Arc::clone(&log));
    let ts = TestSubscriber::<i32>::unbounded();

    // Act
    from_iter(1..=2)
        .peek(move |v| before.lock().push(format!("before {v}")))
        .map(|v| v * 10)
        .peek(move |v| after.lock().push(format!("after {v}")))
        .subscribe(ts.clone());

    // Assert
    assert_eq!(
        *log.lock(),
        vec!["before 1", "after 10", "before 2", "after 20"]
    );
    assert_eq!(ts.items(), vec![10, 20]);

    Ok(())
}

#[tokio::test]
async fn test_tap_is_reusable_across_subscribers() -> anyhow::Result<()> {
    // Arrange
    let completions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&completions);
    let tapped = from_iter(0..4).on_complete(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let (first, second) = (
        TestSubscriber::<i32>::unbounded(),
        TestSubscriber::<i32>::unbounded(),
    );

    // Act
    tapped.subscribe(first.clone());
    tapped.subscribe(second.clone());

    // Assert
    assert_eq!(first.items(), vec![0, 1, 2, 3]);
    assert_eq!(second.items(), vec![0, 1, 2, 3]);
    assert_eq!(completions.load(Ordering::SeqCst), 2);

    Ok(())
}
