// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A hot publisher driven imperatively from test code.

use parking_lot::Mutex;
use reflow_core::demand::{self, UNBOUNDED};
use reflow_core::{
    Downstream, DrainCoordinator, Publisher, ReflowError, Signal, Subscriber, Subscription,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Hot, multi-subscriber publisher whose items are pushed by the test.
///
/// Items emitted while a subscriber has no outstanding demand are buffered
/// per subscriber and delivered as demand arrives; terminal signals are
/// delivered once the buffer ahead of them is drained. Subscribers that
/// cancel or terminate stop counting towards
/// [`has_subscribers`](Self::has_subscribers), and are no longer referenced
/// by the publisher.
///
/// # Example
///
/// ```rust
/// use reflow_core::Publisher;
/// use reflow_test_utils::{ManualPublisher, TestSubscriber};
///
/// let publisher = ManualPublisher::<i32>::new();
/// let ts = TestSubscriber::new();
/// publisher.subscribe(ts.clone());
///
/// publisher.emit(1);
/// assert!(ts.items().is_empty());
///
/// ts.request(1);
/// assert_eq!(ts.items(), vec![1]);
///
/// ts.cancel();
/// assert!(!publisher.has_subscribers());
/// ```
pub struct ManualPublisher<T> {
    subscriptions: Mutex<Vec<Arc<ManualSubscription<T>>>>,
    subscribe_count: AtomicUsize,
}

impl<T> ManualPublisher<T>
where
    T: Clone + Send + 'static,
{
    /// A publisher without subscribers.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            subscriptions: Mutex::new(Vec::new()),
            subscribe_count: AtomicUsize::new(0),
        })
    }

    fn live(&self) -> Vec<Arc<ManualSubscription<T>>> {
        let mut subscriptions = self.subscriptions.lock();
        subscriptions.retain(|s| s.is_live());
        subscriptions.clone()
    }

    fn broadcast(&self, signal: impl Fn() -> Signal<T>) {
        for subscription in self.live() {
            subscription.push(signal());
        }
    }

    /// Send `item` to every live subscriber.
    pub fn emit(&self, item: T) {
        self.broadcast(|| Signal::Next(item.clone()));
    }

    /// Complete every live subscriber.
    pub fn complete(&self) {
        self.broadcast(|| Signal::Complete);
    }

    /// Fail every live subscriber with `error`.
    pub fn fail(&self, error: ReflowError) {
        self.broadcast(|| Signal::Error(error.clone()));
    }

    /// Returns `true` while at least one subscriber is neither cancelled nor
    /// terminated.
    #[must_use]
    pub fn has_subscribers(&self) -> bool {
        !self.live().is_empty()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.live().len()
    }

    /// Number of subscribe calls ever received.
    #[must_use]
    pub fn subscribe_count(&self) -> usize {
        self.subscribe_count.load(Ordering::Acquire)
    }

    /// Demand granted by the live subscribers, summed; saturates at
    /// [`UNBOUNDED`].
    #[must_use]
    pub fn total_requested(&self) -> u64 {
        self.live()
            .iter()
            .fold(0, |total, s| demand::saturating_add(total, s.granted.load(Ordering::Acquire)))
    }
}

impl<T> Publisher for ManualPublisher<T>
where
    T: Clone + Send + 'static,
{
    type Item = T;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        self.subscribe_count.fetch_add(1, Ordering::AcqRel);
        let subscription = Arc::new(ManualSubscription {
            downstream: Downstream::new(subscriber),
            queue: Mutex::new(VecDeque::new()),
            requested: AtomicU64::new(0),
            granted: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
            drain: DrainCoordinator::new(),
        });
        self.subscriptions.lock().push(Arc::clone(&subscription));
        subscription.downstream.on_subscribe(subscription.clone());
    }
}

struct ManualSubscription<T> {
    downstream: Downstream<T>,
    queue: Mutex<VecDeque<Signal<T>>>,
    requested: AtomicU64,
    granted: AtomicU64,
    cancelled: AtomicBool,
    terminated: AtomicBool,
    drain: DrainCoordinator,
}

impl<T: Send> ManualSubscription<T> {
    fn is_live(&self) -> bool {
        !self.cancelled.load(Ordering::Acquire) && !self.terminated.load(Ordering::Acquire)
    }

    fn push(&self, signal: Signal<T>) {
        self.queue.lock().push_back(signal);
        self.drain.drain(|| self.drain_pass());
    }

    fn drain_pass(&self) {
        loop {
            if self.cancelled.load(Ordering::Acquire) {
                self.queue.lock().clear();
                self.downstream.release();
                return;
            }
            let next = {
                let mut queue = self.queue.lock();
                match queue.front() {
                    Some(Signal::Next(_)) if self.requested.load(Ordering::Acquire) == 0 => None,
                    Some(_) => queue.pop_front(),
                    None => None,
                }
            };
            match next {
                Some(Signal::Next(item)) => {
                    demand::produced(&self.requested, 1);
                    self.downstream.on_next(item);
                }
                Some(Signal::Error(error)) => {
                    self.finish();
                    self.downstream.on_error(error);
                    return;
                }
                Some(Signal::Complete) => {
                    self.finish();
                    self.downstream.on_complete();
                    return;
                }
                Some(_) | None => return,
            }
        }
    }

    fn finish(&self) {
        self.terminated.store(true, Ordering::Release);
        self.queue.lock().clear();
    }
}

impl<T: Send> Subscription for ManualSubscription<T> {
    fn request(&self, n: u64) {
        if !self.is_live() {
            return;
        }
        match demand::validate(n) {
            Ok(n) => {
                demand::add(&self.granted, n);
                demand::add(&self.requested, n);
                self.drain.drain(|| self.drain_pass());
            }
            Err(error) => {
                let mut queue = self.queue.lock();
                queue.clear();
                queue.push_back(Signal::Error(error));
                drop(queue);
                self.drain.drain(|| self.drain_pass());
            }
        }
    }

    fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            self.drain.drain(|| self.drain_pass());
        }
    }
}
