// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflow_core::{Publisher, ReflowError};
use reflow_stream::prelude::*;
use reflow_test_utils::{ManualPublisher, TestSubscriber};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

#[tokio::test]
async fn test_completed_merge_releases_mapper_and_subscriber() -> anyhow::Result<()> {
    // Arrange
    let token = Arc::new(());
    let mapper_alive = Arc::downgrade(&token);
    let ts = TestSubscriber::<i32>::unbounded();
    let merged = from_iter(0..3).flat_map(move |v| {
        let _captured = &token;
        just(v)
    });

    // Act
    merged.subscribe(ts.clone());
    drop(merged);

    // Assert
    assert_eq!(ts.items(), vec![0, 1, 2]);
    assert!(ts.is_complete());
    assert_eq!(Arc::strong_count(&ts), 1);
    assert!(mapper_alive.upgrade().is_none());

    Ok(())
}

#[tokio::test]
async fn test_cancelled_merge_releases_inner_publishers() -> anyhow::Result<()> {
    // Arrange
    let outer = ManualPublisher::<i32>::new();
    let inner = ManualPublisher::<i32>::new();
    let inner_alive = Arc::downgrade(&inner);
    let captured = Arc::clone(&inner);
    let ts = TestSubscriber::<i32>::new();
    let merged = Arc::clone(&outer).flat_map(move |_| Arc::clone(&captured));
    merged.subscribe(ts.clone());
    outer.emit(1);
    inner.emit(10);
    assert!(inner.has_subscribers());

    // Act
    ts.cancel();
    drop(merged);
    drop(inner);

    // Assert
    assert!(ts.items().is_empty());
    assert!(!outer.has_subscribers());
    assert_eq!(Arc::strong_count(&ts), 1);
    assert!(inner_alive.upgrade().is_none());

    Ok(())
}

#[tokio::test]
async fn test_failed_merge_releases_inner_publishers() -> anyhow::Result<()> {
    // Arrange
    let outer = ManualPublisher::<i32>::new();
    let inner = ManualPublisher::<i32>::new();
    let inner_alive = Arc::downgrade(&inner);
    let captured = Arc::clone(&inner);
    let ts = TestSubscriber::<i32>::unbounded();
    let merged = Arc::clone(&outer).flat_map(move |_| Arc::clone(&captured));
    merged.subscribe(ts.clone());
    outer.emit(1);
    inner.emit(10);

    // Act
    outer.fail(ReflowError::upstream("outer gone"));
    drop(merged);

    // Assert
    assert_eq!(ts.items(), vec![10]);
    assert_eq!(ts.errors().len(), 1);
    assert!(!inner.has_subscribers());
    assert_eq!(Arc::strong_count(&ts), 1);
    drop(inner);
    assert!(inner_alive.upgrade().is_none());

    Ok(())
}

#[tokio::test]
async fn test_completed_inner_is_released_while_the_merge_runs() -> anyhow::Result<()> {
    // Arrange
    let outer = ManualPublisher::<i32>::new();
    let inner = ManualPublisher::<i32>::new();
    let tokens: Arc<Mutex<Vec<Weak<()>>>> = Arc::default();
    let recorded = Arc::clone(&tokens);
    let source = Arc::clone(&inner);
    let ts = TestSubscriber::<i32>::unbounded();
    Arc::clone(&outer)
        .flat_map(move |_| {
            let token = Arc::new(());
            recorded.lock().push(Arc::downgrade(&token));
            Arc::clone(&source).on_next(move |_| {
                let _captured = &token;
            })
        })
        .subscribe(ts.clone());
    outer.emit(1);
    assert!(tokens.lock()[0].upgrade().is_some());

    // Act
    inner.emit(5);
    inner.complete();

    // Assert
    assert_eq!(ts.items(), vec![5]);
    assert!(!ts.is_complete());
    assert!(outer.has_subscribers());
    assert!(tokens.lock()[0].upgrade().is_none());

    Ok(())
}
