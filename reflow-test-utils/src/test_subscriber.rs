// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A recording subscriber with manual demand control.

use parking_lot::Mutex;
use reflow_core::demand::UNBOUNDED;
use reflow_core::{ReflowError, Subscriber, Subscription, SubscriptionSlot};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Subscriber that records every signal it receives.
///
/// Demand is granted explicitly through [`request`](Self::request); requests
/// made before `on_subscribe` are held back and forwarded on arrival. The
/// subscription is dropped once a terminal signal arrives.
///
/// # Example
///
/// ```rust
/// use reflow_core::{CancelledSubscription, Subscriber};
/// use reflow_test_utils::TestSubscriber;
/// use std::sync::Arc;
///
/// let ts = TestSubscriber::<i32>::new();
/// ts.on_subscribe(Arc::new(CancelledSubscription));
/// ts.on_next(1);
/// ts.on_complete();
///
/// assert_eq!(ts.items(), vec![1]);
/// assert!(ts.is_complete());
/// assert!(ts.last_error().is_none());
/// ```
pub struct TestSubscriber<T> {
    slot: SubscriptionSlot,
    initial_request: u64,
    items: Mutex<Vec<T>>,
    errors: Mutex<Vec<ReflowError>>,
    completions: AtomicUsize,
    subscriptions: AtomicUsize,
}

impl<T> TestSubscriber<T> {
    /// A subscriber that requests nothing by itself.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Self::with_initial_request(0)
    }

    /// A subscriber that requests `n` items as soon as it is subscribed.
    #[must_use]
    pub fn with_initial_request(n: u64) -> Arc<Self> {
        Arc::new(Self {
            slot: SubscriptionSlot::new(),
            initial_request: n,
            items: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
            completions: AtomicUsize::new(0),
            subscriptions: AtomicUsize::new(0),
        })
    }

    /// A subscriber that requests an unbounded amount when subscribed.
    #[must_use]
    pub fn unbounded() -> Arc<Self> {
        Self::with_initial_request(UNBOUNDED)
    }

    /// Request `n` more items. `0` is forwarded as is, to exercise validation.
    pub fn request(&self, n: u64) {
        self.slot.request(n);
    }

    /// Request a single item.
    pub fn request1(&self) {
        self.request(1);
    }

    /// Request an unbounded number of items.
    pub fn request_max(&self) {
        self.request(UNBOUNDED);
    }

    /// Cancel the subscription.
    pub fn cancel(&self) {
        self.slot.cancel();
    }

    /// Returns a copy of the received items.
    #[must_use]
    pub fn items(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.lock().clone()
    }

    /// Number of received items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.lock().len()
    }

    /// Moves the received items out, leaving the record empty.
    #[must_use]
    pub fn take_items(&self) -> Vec<T> {
        std::mem::take(&mut *self.items.lock())
    }

    /// The most recent error, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<ReflowError> {
        self.errors.lock().last().cloned()
    }

    /// Every error received, in order.
    #[must_use]
    pub fn errors(&self) -> Vec<ReflowError> {
        self.errors.lock().clone()
    }

    /// Returns `true` once `on_complete` was received.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completions.load(Ordering::Acquire) > 0
    }

    /// Number of `on_complete` signals received.
    #[must_use]
    pub fn completion_count(&self) -> usize {
        self.completions.load(Ordering::Acquire)
    }

    /// Number of `on_subscribe` signals received.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.load(Ordering::Acquire)
    }

    /// Returns `true` once a terminal signal was received.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.is_complete() || !self.errors.lock().is_empty()
    }

    /// Wait until a terminal signal arrives or `timeout` elapses.
    ///
    /// Returns `true` if the subscriber terminated in time.
    pub async fn await_terminal(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.is_terminated() {
            if Instant::now() >= deadline {
                return false;
            }
            sleep(Duration::from_millis(1)).await;
        }
        true
    }

    /// Wait until at least `count` items arrived or `timeout` elapses.
    pub async fn await_items(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.item_count() < count {
            if Instant::now() >= deadline {
                return false;
            }
            sleep(Duration::from_millis(1)).await;
        }
        true
    }
}

impl<T: Send> Subscriber<T> for TestSubscriber<T> {
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        self.subscriptions.fetch_add(1, Ordering::AcqRel);
        if self.slot.set(subscription) && self.initial_request > 0 {
            self.slot.request(self.initial_request);
        }
    }

    fn on_next(&self, item: T) {
        self.items.lock().push(item);
    }

    fn on_error(&self, error: ReflowError) {
        self.slot.release();
        self.errors.lock().push(error);
    }

    fn on_complete(&self) {
        self.slot.release();
        self.completions.fetch_add(1, Ordering::AcqRel);
    }
}
