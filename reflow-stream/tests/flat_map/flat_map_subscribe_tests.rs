// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use parking_lot::Mutex;
use reflow_core::{Publisher, ReflowError, Subscriber, Subscription};
use reflow_stream::prelude::*;
use reflow_test_utils::ManualPublisher;
use std::sync::Arc;
use std::thread;

/// Lets the outer publisher complete from another thread while it is still
/// inside `on_subscribe`, and logs the order signals arrive in.
struct CompletesDuringSubscribe {
    outer: Arc<ManualPublisher<i32>>,
    log: Mutex<Vec<&'static str>>,
}

impl Subscriber<i32> for CompletesDuringSubscribe {
    fn on_subscribe(&self, _subscription: Arc<dyn Subscription>) {
        let outer = Arc::clone(&self.outer);
        let completed = thread::spawn(move || outer.complete()).join();
        assert!(completed.is_ok());
        self.log.lock().push("subscribed");
    }

    fn on_next(&self, _item: i32) {
        self.log.lock().push("next");
    }

    fn on_error(&self, _error: ReflowError) {
        self.log.lock().push("error");
    }

    fn on_complete(&self) {
        self.log.lock().push("complete");
    }
}

#[tokio::test]
async fn test_terminal_waits_for_downstream_on_subscribe() -> anyhow::Result<()> {
    // Arrange
    let outer = ManualPublisher::<i32>::new();
    let subscriber = Arc::new(CompletesDuringSubscribe {
        outer: Arc::clone(&outer),
        log: Mutex::new(Vec::new()),
    });

    // Act
    Arc::clone(&outer)
        .flat_map(just)
        .subscribe(subscriber.clone());

    // Assert
    assert_eq!(*subscriber.log.lock(), vec!["subscribed", "complete"]);

    Ok(())
}

#[tokio::test]
async fn test_demand_granted_inside_on_subscribe_is_served() -> anyhow::Result<()> {
    // Arrange
    let ts = reflow_test_utils::TestSubscriber::<i32>::with_initial_request(2);

    // Act
    from_iter(0..3).flat_map(just).subscribe(ts.clone());

    // Assert
    assert_eq!(ts.items(), vec![0, 1]);
    assert!(!ts.is_complete());

    Ok(())
}
