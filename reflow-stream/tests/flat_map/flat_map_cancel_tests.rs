// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflow_core::Publisher;
use reflow_stream::prelude::*;
use reflow_test_utils::{ManualPublisher, TestSubscriber};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn test_cancel_reaches_outer_and_inner() -> anyhow::Result<()> {
    // Arrange
    let outer = ManualPublisher::<i32>::new();
    let inner = ManualPublisher::<i32>::new();
    let source = Arc::clone(&inner);
    let ts = TestSubscriber::<i32>::new();
    Arc::clone(&outer)
        .flat_map(move |_| Arc::clone(&source))
        .subscribe(ts.clone());

    assert!(outer.has_subscribers());
    assert!(!inner.has_subscribers());

    // Act
    outer.emit(1);

    // Assert
    assert!(outer.has_subscribers());
    assert!(inner.has_subscribers());

    // Act
    ts.cancel();

    // Assert
    assert!(!outer.has_subscribers());
    assert!(!inner.has_subscribers());

    Ok(())
}

#[tokio::test]
async fn test_cancel_is_idempotent() -> anyhow::Result<()> {
    // Arrange
    let outer = ManualPublisher::<i32>::new();
    let outer_cancels = Arc::new(AtomicUsize::new(0));
    let inner_cancels = Arc::new(AtomicUsize::new(0));
    let (outer_counter, inner_counter) = (Arc::clone(&outer_cancels), Arc::clone(&inner_cancels));
    let ts = TestSubscriber::<i32>::new();

    Arc::clone(&outer)
        .on_cancel(move || {
            outer_counter.fetch_add(1, Ordering::SeqCst);
        })
        .flat_map(move |v| {
            let counter = Arc::clone(&inner_counter);
            from_iter(vec![v; 100]).on_cancel(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        })
        .subscribe(ts.clone());
    outer.emit(1);
    outer.emit(2);

    // Act
    ts.cancel();
    ts.cancel();

    // Assert
    assert_eq!(outer_cancels.load(Ordering::SeqCst), 1);
    assert_eq!(inner_cancels.load(Ordering::SeqCst), 2);
    assert!(!outer.has_subscribers());

    Ok(())
}

#[tokio::test]
async fn test_no_items_after_cancel() -> anyhow::Result<()> {
    // Arrange
    let outer = ManualPublisher::<i32>::new();
    let inner = ManualPublisher::<i32>::new();
    let source = Arc::clone(&inner);
    let ts = TestSubscriber::<i32>::unbounded();
    Arc::clone(&outer)
        .flat_map(move |_| Arc::clone(&source))
        .subscribe(ts.clone());
    outer.emit(1);
    inner.emit(10);

    // Act
    ts.cancel();
    inner.emit(11);
    outer.emit(2);
    outer.complete();

    // Assert
    assert_eq!(ts.items(), vec![10]);
    assert!(!ts.is_terminated());

    Ok(())
}

#[tokio::test]
async fn test_cancel_stops_further_promotion() -> anyhow::Result<()> {
    // Arrange
    let outer = ManualPublisher::<i32>::new();
    let subscribed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&subscribed);
    let inner = ManualPublisher::<i32>::new();
    let source = Arc::clone(&inner);
    let ts = TestSubscriber::<i32>::new();
    Arc::clone(&outer)
        .flat_map_with(
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Arc::clone(&source)
            },
            FlatMapConfig::default().max_concurrency(MaxConcurrency::Bounded(1)),
        )
        .subscribe(ts.clone());
    outer.emit(1);
    outer.emit(2);

    // Act
    ts.cancel();
    inner.complete();
    outer.emit(3);

    // Assert
    assert_eq!(subscribed.load(Ordering::SeqCst), 1);
    assert!(!ts.is_terminated());

    Ok(())
}
