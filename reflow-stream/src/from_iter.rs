// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Synchronous, demand-driven sources backed by iterators.
//!
//! Every source here emits from the thread that grants demand. Emission runs
//! under a [`DrainCoordinator`], so a subscriber that requests more from
//! inside `on_next` does not grow the stack, however long the iterator is.

use parking_lot::Mutex;
use reflow_core::demand::{self, UNBOUNDED};
use reflow_core::{
    CancelledSubscription, Downstream, DrainCoordinator, Publisher, ReflowError, Subscriber,
    Subscription,
};
use std::iter::{Empty, Once};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Cold publisher that replays an iterable to every subscriber.
///
/// Created by [`from_iter`], [`just`] and [`empty`].
#[derive(Debug, Clone)]
pub struct IterPublisher<I> {
    iterable: I,
}

/// Emit the items of `iterable`, starting over for each subscriber.
///
/// Completion follows the last item as soon as the iterator's size hint
/// reports nothing left, so an empty `Vec` or range completes right after
/// `on_subscribe` without waiting for demand. Iterators that cannot tell
/// (`filter`, `from_fn`) complete once `next` returns `None`, which may take
/// one more request. The iterator is never advanced ahead of demand.
pub fn from_iter<I>(iterable: I) -> IterPublisher<I>
where
    I: IntoIterator + Clone + Send + Sync,
{
    IterPublisher { iterable }
}

/// Emit a single item, then complete.
pub fn just<T>(item: T) -> IterPublisher<Once<T>>
where
    T: Clone + Send + Sync,
{
    from_iter(std::iter::once(item))
}

/// Complete immediately without emitting anything.
pub fn empty<T>() -> IterPublisher<Empty<T>> {
    from_iter(std::iter::empty())
}

impl<I> Publisher for IterPublisher<I>
where
    I: IntoIterator + Clone + Send + Sync,
    I::IntoIter: Send + 'static,
    I::Item: Send + 'static,
{
    type Item = I::Item;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<Self::Item>>) {
        IterSubscription::start(subscriber, self.iterable.clone().into_iter());
    }
}

/// Single-subscription publisher over an iterator.
///
/// The first subscriber consumes the iterator; any later subscriber is
/// rejected with [`ReflowError::IllegalState`].
pub struct OncePublisher<It> {
    iter: Mutex<Option<It>>,
}

/// Emit the items of `iter` to one subscriber only.
pub fn from_once<I>(iter: I) -> OncePublisher<I::IntoIter>
where
    I: IntoIterator,
    I::IntoIter: Send,
{
    OncePublisher {
        iter: Mutex::new(Some(iter.into_iter())),
    }
}

impl<It> Publisher for OncePublisher<It>
where
    It: Iterator + Send + 'static,
    It::Item: Send + 'static,
{
    type Item = It::Item;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<Self::Item>>) {
        let taken = self.iter.lock().take();
        match taken {
            Some(iter) => IterSubscription::start(subscriber, iter),
            None => CancelledSubscription::reject(
                subscriber.as_ref(),
                ReflowError::illegal_state("publisher allows only one subscriber"),
            ),
        }
    }
}

/// Emit nothing and fail every subscriber with `error`.
pub fn error<T>(error: ReflowError) -> ErrorPublisher<T> {
    ErrorPublisher {
        error,
        _item: std::marker::PhantomData,
    }
}

/// Publisher created by [`error()`].
pub struct ErrorPublisher<T> {
    error: ReflowError,
    _item: std::marker::PhantomData<fn() -> T>,
}

impl<T> Publisher for ErrorPublisher<T> {
    type Item = T;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        CancelledSubscription::reject(subscriber.as_ref(), self.error.clone());
    }
}

struct IterSubscription<It: Iterator> {
    downstream: Downstream<It::Item>,
    iter: Mutex<It>,
    requested: AtomicU64,
    cancelled: AtomicBool,
    invalid: AtomicBool,
    drain: DrainCoordinator,
}

/// Exhaustion as far as the iterator can tell without being advanced.
fn is_exhausted<It: Iterator>(iter: &It) -> bool {
    iter.size_hint().1 == Some(0)
}

impl<It> IterSubscription<It>
where
    It: Iterator + Send + 'static,
    It::Item: Send + 'static,
{
    fn start(downstream: Arc<dyn Subscriber<It::Item>>, iter: It) {
        let exhausted = is_exhausted(&iter);
        let subscription = Arc::new(Self {
            downstream: Downstream::new(downstream),
            iter: Mutex::new(iter),
            requested: AtomicU64::new(0),
            cancelled: AtomicBool::new(exhausted),
            invalid: AtomicBool::new(false),
            drain: DrainCoordinator::new(),
        });
        subscription
            .downstream
            .on_subscribe(Arc::clone(&subscription) as Arc<dyn Subscription>);
        if exhausted {
            subscription.downstream.on_complete();
        }
    }

    fn drain_pass(&self) {
        if self.cancelled.load(Ordering::Acquire) {
            return;
        }
        if self.invalid.load(Ordering::Acquire) {
            self.cancelled.store(true, Ordering::Release);
            self.downstream.on_error(ReflowError::invalid_demand(0));
            return;
        }

        let requested = self.requested.load(Ordering::Acquire);
        let mut emitted = 0_u64;
        while requested == UNBOUNDED || emitted < requested {
            if self.cancelled.load(Ordering::Acquire) {
                return;
            }
            let next = self.iter.lock().next();
            let Some(item) = next else {
                self.complete();
                return;
            };
            self.downstream.on_next(item);
            emitted += 1;
            if is_exhausted(&*self.iter.lock()) {
                self.complete();
                return;
            }
        }
        demand::produced(&self.requested, emitted);
    }

    fn complete(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            self.downstream.on_complete();
        }
    }
}

impl<It> Subscription for IterSubscription<It>
where
    It: Iterator + Send + 'static,
    It::Item: Send + 'static,
{
    fn request(&self, n: u64) {
        match demand::validate(n) {
            Ok(n) => {
                demand::add(&self.requested, n);
            }
            Err(_) => self.invalid.store(true, Ordering::Release),
        }
        self.drain.drain(|| self.drain_pass());
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.downstream.release();
    }
}
