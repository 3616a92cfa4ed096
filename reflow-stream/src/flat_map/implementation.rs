// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::config::FlatMapConfig;
use crate::logging::{log_debug, log_warn};
use parking_lot::Mutex;
use reflow_core::demand::{self, UNBOUNDED};
use reflow_core::{
    catch_callback, CancelledSubscription, Downstream, DrainCoordinator, Publisher, ReflowError,
    Subscriber, Subscription, SubscriptionSlot,
};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

/// Maps an outer item to an inner publisher and subscribes `subscriber` to it.
type InnerFactory<T, U> = Arc<dyn Fn(T, Arc<dyn Subscriber<U>>) + Send + Sync>;

/// Publisher returned by `flat_map` and `flat_map_with`.
pub struct FlatMapPublisher<P: Publisher, U> {
    source: Arc<P>,
    factory: InnerFactory<P::Item, U>,
    config: FlatMapConfig,
}

impl<P, U> FlatMapPublisher<P, U>
where
    P: Publisher + 'static,
    P::Item: Send + 'static,
    U: Send + 'static,
{
    pub(crate) fn new<Q, F>(source: P, mapper: F, config: FlatMapConfig) -> Self
    where
        F: Fn(P::Item) -> Q + Send + Sync + 'static,
        Q: Publisher<Item = U> + 'static,
    {
        let factory: InnerFactory<P::Item, U> =
            Arc::new(move |item: P::Item, subscriber: Arc<dyn Subscriber<U>>| {
                mapper(item).subscribe(subscriber);
            });
        Self {
            source: Arc::new(source),
            factory,
            config,
        }
    }

    /// The configuration applied to every subscription.
    #[must_use]
    pub const fn config(&self) -> &FlatMapConfig {
        &self.config
    }
}

impl<P: Publisher, U> Clone for FlatMapPublisher<P, U> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            factory: Arc::clone(&self.factory),
            config: self.config,
        }
    }
}

impl<P: Publisher, U> fmt::Debug for FlatMapPublisher<P, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatMapPublisher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<P, U> Publisher for FlatMapPublisher<P, U>
where
    P: Publisher,
    P::Item: Send + 'static,
    U: Send + 'static,
{
    type Item = U;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<U>>) {
        if let Err(error) = self.config.validate() {
            CancelledSubscription::reject(subscriber.as_ref(), error);
            return;
        }
        let main = FlatMapMain::new(subscriber, Arc::clone(&self.factory), self.config);
        self.source.subscribe(main);
    }
}

#[derive(Default)]
struct ErrorState {
    /// Failures collected while errors are delayed.
    deferred: Vec<ReflowError>,
    /// Failure that ends the merge at the next drain pass.
    fatal: Option<ReflowError>,
}

struct InnerState<U> {
    slot: SubscriptionSlot,
    queue: Mutex<VecDeque<U>>,
    done: AtomicBool,
    consumed: AtomicUsize,
}

impl<U> InnerState<U> {
    fn new() -> Self {
        Self {
            slot: SubscriptionSlot::new(),
            queue: Mutex::new(VecDeque::new()),
            done: AtomicBool::new(false),
            consumed: AtomicUsize::new(0),
        }
    }

    fn is_finished(&self) -> bool {
        self.done.load(Ordering::Acquire) && self.queue.lock().is_empty()
    }
}

/// Outer subscriber, downstream subscription and merge state in one.
///
/// Every field that decides what gets emitted (`pending` promotion, the
/// `inners` list, the round-robin cursor, replenishment) is only changed
/// from inside a drain pass, so a single thread owns it at any time.
/// Producer threads only append to queues and signal the coordinator.
///
/// Drain passes do nothing until downstream has received `on_subscribe`.
/// Once terminated or cancelled, the merge drops its downstream, its outer
/// subscription, every inner and all buffered items.
struct FlatMapMain<T, U> {
    downstream: Downstream<U>,
    factory: InnerFactory<T, U>,
    config: FlatMapConfig,
    upstream: SubscriptionSlot,
    drain: DrainCoordinator,
    subscribed: AtomicBool,
    requested: AtomicU64,
    cancelled: AtomicBool,
    outer_done: AtomicBool,
    terminated: AtomicBool,
    pending: Mutex<VecDeque<T>>,
    inners: Mutex<Vec<Arc<InnerState<U>>>>,
    errors: Mutex<ErrorState>,
    cursor: AtomicUsize,
    me: Weak<Self>,
}

impl<T, U> FlatMapMain<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    fn new(
        downstream: Arc<dyn Subscriber<U>>,
        factory: InnerFactory<T, U>,
        config: FlatMapConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            downstream: Downstream::new(downstream),
            factory,
            config,
            upstream: SubscriptionSlot::new(),
            drain: DrainCoordinator::new(),
            subscribed: AtomicBool::new(false),
            requested: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
            outer_done: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
            pending: Mutex::new(VecDeque::new()),
            inners: Mutex::new(Vec::new()),
            errors: Mutex::new(ErrorState::default()),
            cursor: AtomicUsize::new(0),
            me: Weak::clone(me),
        })
    }

    fn is_stopped(&self) -> bool {
        self.cancelled.load(Ordering::Acquire) || self.terminated.load(Ordering::Acquire)
    }

    fn signal(&self) {
        self.drain.drain(|| self.drain_pass());
    }

    /// Record a producer failure according to the error mode.
    fn record_error(&self, error: ReflowError) {
        let mut errors = self.errors.lock();
        if self.config.delays_errors() {
            errors.deferred.push(error);
        } else if errors.fatal.is_none() {
            errors.fatal = Some(error);
        }
    }

    /// Record a failure that ends the merge whatever the error mode.
    fn record_fatal(&self, error: ReflowError) {
        let mut errors = self.errors.lock();
        if errors.fatal.is_none() {
            errors.fatal = Some(error);
        }
    }

    fn has_fatal(&self) -> bool {
        self.errors.lock().fatal.is_some()
    }

    fn inner_next(&self, inner: &InnerState<U>, item: U) {
        if self.is_stopped() {
            return;
        }
        let overflow = {
            let mut queue = inner.queue.lock();
            if queue.len() >= self.config.prefetch_size() {
                true
            } else {
                queue.push_back(item);
                false
            }
        };
        if overflow {
            log_warn!(
                "flat_map: inner publisher emitted beyond its {} item prefetch",
                self.config.prefetch_size()
            );
            inner.slot.cancel();
            inner.done.store(true, Ordering::Release);
            self.record_error(ReflowError::illegal_state(
                "inner publisher emitted more items than requested",
            ));
        }
        self.signal();
    }

    fn inner_error(&self, inner: &InnerState<U>, error: ReflowError) {
        inner.done.store(true, Ordering::Release);
        if self.is_stopped() {
            log_debug!("flat_map: dropping inner failure after termination: {error}");
            return;
        }
        self.record_error(error);
        self.signal();
    }

    fn inner_complete(&self, inner: &InnerState<U>) {
        inner.done.store(true, Ordering::Release);
        self.signal();
    }

    fn drain_pass(&self) {
        if !self.subscribed.load(Ordering::Acquire) {
            return;
        }
        loop {
            if self.is_stopped() {
                self.clear();
                return;
            }
            let fatal = self.errors.lock().fatal.take();
            if let Some(error) = fatal {
                self.fail(error);
                return;
            }

            let promoted = self.promote();
            let emitted = self.emit();
            let reaped = self.reap();

            if self.has_fatal() {
                continue;
            }
            if self.is_exhausted() {
                self.finish();
                return;
            }
            if !promoted && !emitted && reaped == 0 {
                return;
            }
        }
    }

    /// Subscribe to inner publishers for queued outer items while the
    /// concurrency cap allows.
    fn promote(&self) -> bool {
        let mut promoted = false;
        loop {
            if self.is_stopped() || self.has_fatal() {
                return promoted;
            }
            let active = self.inners.lock().len();
            if !self.config.concurrency().admits(active) {
                return promoted;
            }
            let Some(item) = self.pending.lock().pop_front() else {
                return promoted;
            };
            self.spawn_inner(item);
            promoted = true;
        }
    }

    fn spawn_inner(&self, item: T) {
        let Some(parent) = self.me.upgrade() else {
            log_debug!("flat_map: merge released before its inner could start");
            return;
        };
        let state = Arc::new(InnerState::new());
        self.inners.lock().push(Arc::clone(&state));
        let subscriber = Arc::new(InnerSubscriber {
            parent,
            state: Arc::clone(&state),
            prefetch: self.config.prefetch_size() as u64,
        });

        if let Err(failure) = catch_callback(|| (self.factory)(item, subscriber)) {
            log_debug!("flat_map: mapper failed, cancelling the outer publisher: {failure}");
            state.slot.cancel();
            state.done.store(true, Ordering::Release);
            self.upstream.cancel();
            self.outer_done.store(true, Ordering::Release);
            self.pending.lock().clear();
            self.record_error(failure);
        }
    }

    /// Deliver buffered inner items round-robin while downstream demand lasts.
    fn emit(&self) -> bool {
        let inners = self.inners.lock().clone();
        if inners.is_empty() {
            return false;
        }
        let requested = self.requested.load(Ordering::Acquire);
        let threshold = self.config.replenish_threshold();
        let count = inners.len();
        let start = self.cursor.load(Ordering::Relaxed) % count;
        let mut emitted = 0_u64;
        let mut next_cursor = start;

        'sweep: loop {
            let mut progressed = false;
            for offset in 0..count {
                if requested != UNBOUNDED && emitted >= requested {
                    break 'sweep;
                }
                if self.is_stopped() || self.has_fatal() {
                    break 'sweep;
                }
                let index = (start + offset) % count;
                let inner = &inners[index];
                let Some(item) = inner.queue.lock().pop_front() else {
                    continue;
                };
                self.downstream.on_next(item);
                emitted += 1;
                progressed = true;
                next_cursor = index + 1;

                if inner.consumed.fetch_add(1, Ordering::Relaxed) + 1 == threshold {
                    inner.consumed.store(0, Ordering::Relaxed);
                    if !inner.done.load(Ordering::Acquire) {
                        inner.slot.request(threshold as u64);
                    }
                }
            }
            if !progressed {
                break;
            }
        }

        self.cursor.store(next_cursor, Ordering::Relaxed);
        if emitted > 0 {
            demand::produced(&self.requested, emitted);
        }
        emitted > 0
    }

    /// Drop finished inners and ask the outer publisher for replacements.
    fn reap(&self) -> usize {
        let reaped = {
            let mut inners = self.inners.lock();
            let before = inners.len();
            inners.retain(|inner| !inner.is_finished());
            before - inners.len()
        };
        if reaped > 0
            && self.config.concurrency().is_bounded()
            && !self.outer_done.load(Ordering::Acquire)
        {
            self.upstream.request(reaped as u64);
        }
        reaped
    }

    fn is_exhausted(&self) -> bool {
        self.outer_done.load(Ordering::Acquire)
            && self.pending.lock().is_empty()
            && self.inners.lock().is_empty()
    }

    fn finish(&self) {
        self.terminated.store(true, Ordering::Release);
        self.upstream.release();
        self.clear();
        let deferred = std::mem::take(&mut self.errors.lock().deferred);
        match ReflowError::composite(deferred) {
            Some(error) => {
                log_debug!("flat_map: delivering deferred failure: {error}");
                self.downstream.on_error(error);
            }
            None => self.downstream.on_complete(),
        }
    }

    fn fail(&self, error: ReflowError) {
        log_debug!("flat_map: failing fast: {error}");
        self.terminated.store(true, Ordering::Release);
        self.upstream.cancel();
        self.clear();
        self.downstream.on_error(error);
    }

    /// Release queued items and cancel every inner.
    fn clear(&self) {
        self.pending.lock().clear();
        let inners = std::mem::take(&mut *self.inners.lock());
        if !inners.is_empty() {
            log_debug!("flat_map: cancelling {} inner subscriptions", inners.len());
        }
        for inner in inners {
            inner.slot.cancel();
            inner.queue.lock().clear();
        }
    }
}

impl<T, U> Subscriber<T> for FlatMapMain<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        if !self.upstream.set(subscription) {
            return;
        }
        let Some(me) = self.me.upgrade() else {
            self.upstream.cancel();
            return;
        };
        self.downstream.on_subscribe(me);
        self.subscribed.store(true, Ordering::Release);
        self.upstream
            .request(self.config.concurrency().initial_request());
        self.signal();
    }

    fn on_next(&self, item: T) {
        if self.is_stopped() || self.outer_done.load(Ordering::Acquire) {
            return;
        }
        self.pending.lock().push_back(item);
        self.signal();
    }

    fn on_error(&self, error: ReflowError) {
        if self.outer_done.swap(true, Ordering::AcqRel) {
            return;
        }
        self.upstream.release();
        self.record_error(error);
        self.signal();
    }

    fn on_complete(&self) {
        if self.outer_done.swap(true, Ordering::AcqRel) {
            return;
        }
        self.upstream.release();
        self.signal();
    }
}

impl<T, U> Subscription for FlatMapMain<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    fn request(&self, n: u64) {
        match demand::validate(n) {
            Ok(n) => {
                demand::add(&self.requested, n);
            }
            Err(error) => self.record_fatal(error),
        }
        self.signal();
    }

    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        self.downstream.release();
        self.upstream.cancel();
        let inners = self.inners.lock().clone();
        for inner in &inners {
            inner.slot.cancel();
        }
        self.signal();
    }
}

/// Keeps the merge alive while its inner publisher runs; the link is cut
/// when the inner terminates or is cancelled.
struct InnerSubscriber<T, U> {
    parent: Arc<FlatMapMain<T, U>>,
    state: Arc<InnerState<U>>,
    prefetch: u64,
}

impl<T, U> Subscriber<U> for InnerSubscriber<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        if self.state.slot.set(subscription) {
            self.state.slot.request(self.prefetch);
        }
    }

    fn on_next(&self, item: U) {
        self.parent.inner_next(&self.state, item);
    }

    fn on_error(&self, error: ReflowError) {
        self.state.slot.release();
        self.parent.inner_error(&self.state, error);
    }

    fn on_complete(&self) {
        self.state.slot.release();
        self.parent.inner_complete(&self.state);
    }
}
