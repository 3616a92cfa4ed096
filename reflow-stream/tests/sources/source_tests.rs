// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflow_core::{Publisher, ReflowError, Subscriber, Subscription, SubscriptionSlot};
use reflow_stream::prelude::*;
use reflow_test_utils::TestSubscriber;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Requests one item at a time from inside `on_next`.
#[derive(Default)]
struct OneByOne {
    slot: SubscriptionSlot,
    received: AtomicUsize,
    completed: AtomicBool,
}

impl Subscriber<usize> for OneByOne {
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        if self.slot.set(subscription) {
            self.slot.request(1);
        }
    }

    fn on_next(&self, _item: usize) {
        self.received.fetch_add(1, Ordering::Relaxed);
        self.slot.request(1);
    }

    fn on_error(&self, _error: ReflowError) {}

    fn on_complete(&self) {
        self.slot.release();
        self.completed.store(true, Ordering::Release);
    }
}

#[tokio::test]
async fn test_from_iter_honours_demand() -> anyhow::Result<()> {
    // Arrange
    let ts = TestSubscriber::<i32>::new();
    from_iter(0..10).subscribe(ts.clone());

    // Act
    ts.request(3);

    // Assert
    assert_eq!(ts.items(), vec![0, 1, 2]);
    assert!(!ts.is_complete());

    // Act
    ts.request(2);

    // Assert
    assert_eq!(ts.items(), vec![0, 1, 2, 3, 4]);
    assert!(!ts.is_complete());

    // Act
    ts.request(100);

    // Assert
    assert_eq!(ts.items(), (0..10).collect::<Vec<_>>());
    assert_eq!(ts.completion_count(), 1);

    Ok(())
}

#[tokio::test]
async fn test_from_iter_completes_with_the_last_item() -> anyhow::Result<()> {
    // Arrange
    let ts = TestSubscriber::<i32>::new();
    from_iter(vec![1, 2]).subscribe(ts.clone());

    // Act
    ts.request(2);

    // Assert
    assert_eq!(ts.items(), vec![1, 2]);
    assert!(ts.is_complete());

    Ok(())
}

#[tokio::test]
async fn test_from_iter_pulls_only_what_was_requested() -> anyhow::Result<()> {
    // Arrange
    let pulled = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&pulled);
    let ts = TestSubscriber::<i32>::new();
    from_iter((0..5_i32).inspect(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    }))
    .subscribe(ts.clone());
    assert_eq!(pulled.load(Ordering::SeqCst), 0);

    // Act
    ts.request(2);

    // Assert
    assert_eq!(ts.items(), vec![0, 1]);
    assert_eq!(pulled.load(Ordering::SeqCst), 2);

    Ok(())
}

#[tokio::test]
async fn test_iterator_without_exact_size_completes_once_drained() -> anyhow::Result<()> {
    // Arrange
    let ts = TestSubscriber::<i32>::new();
    from_once((0..4_i32).filter(|v| v % 2 == 0)).subscribe(ts.clone());

    // Act
    ts.request(2);

    // Assert
    assert_eq!(ts.items(), vec![0, 2]);
    assert!(!ts.is_complete());

    // Act
    ts.request(1);

    // Assert
    assert_eq!(ts.items(), vec![0, 2]);
    assert_eq!(ts.completion_count(), 1);

    Ok(())
}

#[tokio::test]
async fn test_from_iter_is_cold() -> anyhow::Result<()> {
    // Arrange
    let source = from_iter(vec!["a", "b"]);
    let (first, second) = (
        TestSubscriber::<&str>::unbounded(),
        TestSubscriber::<&str>::unbounded(),
    );

    // Act
    source.subscribe(first.clone());
    source.subscribe(second.clone());

    // Assert
    assert_eq!(first.items(), vec!["a", "b"]);
    assert_eq!(second.items(), vec!["a", "b"]);
    assert!(first.is_complete() && second.is_complete());

    Ok(())
}

#[tokio::test]
async fn test_one_by_one_requests_do_not_grow_the_stack() -> anyhow::Result<()> {
    // Arrange
    const COUNT: usize = 1_000_000;
    let subscriber = Arc::new(OneByOne::default());

    // Act
    from_iter(0..COUNT).subscribe(subscriber.clone());

    // Assert
    assert_eq!(subscriber.received.load(Ordering::Relaxed), COUNT);
    assert!(subscriber.completed.load(Ordering::Acquire));

    Ok(())
}

#[tokio::test]
async fn test_zero_request_fails_with_invalid_demand() -> anyhow::Result<()> {
    // Arrange
    let ts = TestSubscriber::<i32>::new();
    from_iter(0..10).subscribe(ts.clone());
    ts.request(1);

    // Act
    ts.request(0);
    ts.request(5);

    // Assert
    assert_eq!(ts.items(), vec![0]);
    assert_eq!(ts.errors().len(), 1);
    assert!(matches!(
        ts.last_error(),
        Some(ReflowError::InvalidDemand { requested: 0 })
    ));

    Ok(())
}

#[tokio::test]
async fn test_cancel_stops_emission() -> anyhow::Result<()> {
    // Arrange
    let ts = TestSubscriber::<i32>::new();
    from_iter(0..10).subscribe(ts.clone());
    ts.request(2);

    // Act
    ts.cancel();
    ts.request(5);

    // Assert
    assert_eq!(ts.items(), vec![0, 1]);
    assert!(!ts.is_terminated());

    Ok(())
}

#[tokio::test]
async fn test_from_once_rejects_a_second_subscriber() -> anyhow::Result<()> {
    // Arrange
    let source = from_once(vec![1, 2, 3]);
    let (first, second) = (
        TestSubscriber::<i32>::unbounded(),
        TestSubscriber::<i32>::unbounded(),
    );

    // Act
    source.subscribe(first.clone());
    source.subscribe(second.clone());

    // Assert
    assert_eq!(first.items(), vec![1, 2, 3]);
    assert!(first.is_complete());
    assert_eq!(second.subscription_count(), 1);
    assert!(second.items().is_empty());
    assert!(matches!(
        second.last_error(),
        Some(ReflowError::IllegalState { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_just_emits_one_item() -> anyhow::Result<()> {
    // Arrange
    let ts = TestSubscriber::<i32>::new();
    just(7).subscribe(ts.clone());
    assert!(ts.items().is_empty());

    // Act
    ts.request1();

    // Assert
    assert_eq!(ts.items(), vec![7]);
    assert!(ts.is_complete());

    Ok(())
}

#[tokio::test]
async fn test_empty_completes_without_demand() -> anyhow::Result<()> {
    // Arrange
    let ts = TestSubscriber::<i32>::new();

    // Act
    empty::<i32>().subscribe(ts.clone());

    // Assert
    assert_eq!(ts.subscription_count(), 1);
    assert!(ts.items().is_empty());
    assert_eq!(ts.completion_count(), 1);

    Ok(())
}

#[tokio::test]
async fn test_error_fails_without_demand() -> anyhow::Result<()> {
    // Arrange
    let ts = TestSubscriber::<i32>::new();

    // Act
    error::<i32>(ReflowError::upstream("nothing to see")).subscribe(ts.clone());

    // Assert
    assert_eq!(ts.subscription_count(), 1);
    assert!(ts.items().is_empty());
    assert!(matches!(
        ts.last_error(),
        Some(ReflowError::Upstream { ref context }) if context == "nothing to see"
    ));
    assert!(!ts.is_complete());

    Ok(())
}

#[tokio::test]
async fn test_boxed_publisher_behaves_like_its_source() -> anyhow::Result<()> {
    // Arrange
    let sources: Vec<BoxPublisher<i32>> = vec![from_iter(0..2).boxed(), just(9).boxed()];
    let ts = TestSubscriber::<i32>::unbounded();

    // Act
    from_iter(0..sources.len())
        .flat_map_with(
            move |i| Arc::clone(&sources[i]),
            FlatMapConfig::default().max_concurrency(MaxConcurrency::Bounded(1)),
        )
        .subscribe(ts.clone());

    // Assert
    assert_eq!(ts.items(), vec![0, 1, 9]);
    assert!(ts.is_complete());

    Ok(())
}
