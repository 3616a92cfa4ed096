// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflow_core::{Publisher, ReflowError};
use reflow_stream::prelude::*;
use reflow_test_utils::{ManualPublisher, TestSubscriber};
use std::sync::Arc;

#[tokio::test]
async fn test_completed_tap_releases_hooks_and_subscriber() -> anyhow::Result<()> {
    // Arrange
    let token = Arc::new(());
    let hooks_alive = Arc::downgrade(&token);
    let ts = TestSubscriber::<i32>::unbounded();
    let tapped = from_iter(0..3).on_next(move |_| {
        let _captured = &token;
    });

    // Act
    tapped.subscribe(ts.clone());
    drop(tapped);

    // Assert
    assert_eq!(ts.items(), vec![0, 1, 2]);
    assert!(ts.is_complete());
    assert_eq!(Arc::strong_count(&ts), 1);
    assert!(hooks_alive.upgrade().is_none());

    Ok(())
}

#[tokio::test]
async fn test_cancelled_tap_releases_hooks_and_subscriber() -> anyhow::Result<()> {
    // Arrange
    let source = ManualPublisher::<i32>::new();
    let token = Arc::new(());
    let hooks_alive = Arc::downgrade(&token);
    let ts = TestSubscriber::<i32>::new();
    let tapped = Arc::clone(&source).on_cancel(move || {
        let _captured = &token;
    });
    tapped.subscribe(ts.clone());
    source.emit(1);
    ts.request(1);

    // Act
    ts.cancel();
    drop(tapped);

    // Assert
    assert_eq!(ts.items(), vec![1]);
    assert!(!source.has_subscribers());
    assert_eq!(Arc::strong_count(&ts), 1);
    assert!(hooks_alive.upgrade().is_none());

    Ok(())
}

#[tokio::test]
async fn test_failed_tap_releases_hooks_and_subscriber() -> anyhow::Result<()> {
    // Arrange
    let source = ManualPublisher::<i32>::new();
    let token = Arc::new(());
    let hooks_alive = Arc::downgrade(&token);
    let ts = TestSubscriber::<i32>::unbounded();
    let tapped = Arc::clone(&source).on_error(move |_| {
        let _captured = &token;
    });
    tapped.subscribe(ts.clone());

    // Act
    source.fail(ReflowError::upstream("gone"));
    drop(tapped);

    // Assert
    assert_eq!(ts.errors().len(), 1);
    assert_eq!(Arc::strong_count(&ts), 1);
    assert!(hooks_alive.upgrade().is_none());

    Ok(())
}
