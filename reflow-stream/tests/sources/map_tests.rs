// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflow_core::{Publisher, ReflowError};
use reflow_stream::prelude::*;
use reflow_test_utils::{is_divide_by_zero, six_over_one_minus, ManualPublisher, TestSubscriber};
use std::sync::Arc;

#[tokio::test]
async fn test_map_transforms_every_item() -> anyhow::Result<()> {
    // Arrange
    let ts = TestSubscriber::<String>::unbounded();

    // Act
    from_iter(1..=3)
        .map(|v| format!("#{v}"))
        .subscribe(ts.clone());

    // Assert
    assert_eq!(ts.items(), vec!["#1", "#2", "#3"]);
    assert!(ts.is_complete());

    Ok(())
}

#[tokio::test]
async fn test_map_passes_demand_through() -> anyhow::Result<()> {
    // Arrange
    let source = ManualPublisher::<i32>::new();
    let ts = TestSubscriber::<i32>::new();
    Arc::clone(&source).map(|v| v + 1).subscribe(ts.clone());
    source.emit(1);
    source.emit(2);

    // Act
    ts.request(1);

    // Assert
    assert_eq!(source.total_requested(), 1);
    assert_eq!(ts.items(), vec![2]);

    // Act
    ts.request(4);

    // Assert
    assert_eq!(source.total_requested(), 5);
    assert_eq!(ts.items(), vec![2, 3]);

    Ok(())
}

#[tokio::test]
async fn test_try_map_failure_ends_the_stream_once() -> anyhow::Result<()> {
    // Arrange
    let source = ManualPublisher::<i32>::new();
    let ts = TestSubscriber::<i32>::unbounded();
    Arc::clone(&source)
        .try_map(six_over_one_minus)
        .subscribe(ts.clone());

    // Act
    source.emit(0);
    source.emit(1);
    source.emit(2);

    // Assert
    assert_eq!(ts.items(), vec![6]);
    assert_eq!(ts.errors().len(), 1);
    assert!(is_divide_by_zero(&ts.errors()[0]));
    assert!(!source.has_subscribers());
    assert!(!ts.is_complete());

    Ok(())
}

#[tokio::test]
async fn test_map_forwards_upstream_error() -> anyhow::Result<()> {
    // Arrange
    let source = ManualPublisher::<i32>::new();
    let ts = TestSubscriber::<i32>::unbounded();
    Arc::clone(&source).map(|v| v * 2).subscribe(ts.clone());

    // Act
    source.emit(4);
    source.fail(ReflowError::upstream("gone"));

    // Assert
    assert_eq!(ts.items(), vec![8]);
    assert!(matches!(
        ts.last_error(),
        Some(ReflowError::Upstream { ref context }) if context == "gone"
    ));

    Ok(())
}

#[tokio::test]
async fn test_panicking_map_becomes_callback_failure() -> anyhow::Result<()> {
    // Arrange
    let ts = TestSubscriber::<i32>::unbounded();

    // Act
    from_iter(0..5)
        .map(|v: i32| {
            assert!(v < 3, "too large: {v}");
            v
        })
        .subscribe(ts.clone());

    // Assert
    assert_eq!(ts.items(), vec![0, 1, 2]);
    assert!(matches!(
        ts.last_error(),
        Some(ReflowError::CallbackFailure { ref context }) if context == "too large: 3"
    ));
    assert_eq!(ts.completion_count(), 0);

    Ok(())
}
