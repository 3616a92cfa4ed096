// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Side-effect decorator observing every signal of a pipeline.
//!
//! A [`TapPublisher`] runs user hooks for the four downstream signals
//! (`on_subscribe`, `on_next`, `on_error`, `on_complete`) and for the two
//! upstream ones (`request`, `cancel`), then forwards the signal unchanged.
//!
//! # Composition
//!
//! The builder methods consume the tap and return it with one more hook, so
//! chaining on an existing tap layers onto the same hook set instead of
//! nesting decorators. Taps are cheap to clone; clone one to derive several
//! pipelines from a common base:
//!
//! ```ignore
//! use reflow_stream::prelude::*;
//! use reflow_test_utils::TestSubscriber;
//!
//! let base = from_iter(1..=3).peek(|v| println!("base saw {v}"));
//! let logged = base.clone().on_complete(|| println!("done"));
//!
//! let ts = TestSubscriber::unbounded();
//! base.subscribe(ts.clone());
//! assert_eq!(ts.items(), vec![1, 2, 3]);
//! # drop(logged);
//! ```
//!
//! # Hook failures
//!
//! A panicking hook never lets the signal it observed through:
//!
//! | signal         | on hook failure                                        |
//! |----------------|--------------------------------------------------------|
//! | `on_subscribe` | upstream cancelled, subscriber rejected with the error |
//! | `on_next`      | upstream cancelled, item dropped, `on_error` sent      |
//! | `on_error`     | failure attached as suppressed to the original error   |
//! | `on_complete`  | `on_error` sent instead of completion                  |
//! | `request`      | upstream cancelled, `on_error` sent                    |
//! | `cancel`       | logged; upstream is still cancelled                    |
//!
//! A `request` hook runs on the requesting thread, which may differ from the
//! thread delivering items. Its failure is queued behind a
//! [`DrainCoordinator`] shared with the item path, so the subscriber never
//! sees the error while an `on_next` is still running, nor an item after it.

mod hooks;

pub use hooks::TapHooks;

use crate::logging::{log_debug, log_warn};
use parking_lot::Mutex;
use reflow_core::{
    CancelledSubscription, Downstream, DrainCoordinator, Publisher, ReflowError, Signal,
    Subscriber, Subscription, SubscriptionSlot,
};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Publisher that runs [`TapHooks`] around every signal of `P`.
pub struct TapPublisher<P: Publisher> {
    source: Arc<P>,
    hooks: TapHooks<P::Item>,
}

impl<P: Publisher> TapPublisher<P> {
    /// Decorate `source` with `hooks`.
    pub fn new(source: P, hooks: TapHooks<P::Item>) -> Self {
        Self {
            source: Arc::new(source),
            hooks,
        }
    }

    /// The hooks run by this tap.
    #[must_use]
    pub fn hooks(&self) -> &TapHooks<P::Item> {
        &self.hooks
    }

    fn with_hooks(self, hooks: TapHooks<P::Item>) -> Self {
        Self {
            source: self.source,
            hooks,
        }
    }

    /// Add a hook observing the upstream subscription.
    #[must_use]
    pub fn on_subscribe<F>(self, f: F) -> Self
    where
        F: Fn(&Arc<dyn Subscription>) + Send + Sync + 'static,
    {
        let hooks = self.hooks.on_subscribe(f);
        self.with_hooks(hooks)
    }

    /// Add a hook observing every item.
    #[must_use]
    pub fn on_next<F>(self, f: F) -> Self
    where
        F: Fn(&P::Item) + Send + Sync + 'static,
    {
        let hooks = self.hooks.on_next(f);
        self.with_hooks(hooks)
    }

    /// Alias of [`on_next`](Self::on_next).
    #[must_use]
    pub fn peek<F>(self, f: F) -> Self
    where
        F: Fn(&P::Item) + Send + Sync + 'static,
    {
        self.on_next(f)
    }

    /// Add a hook observing the terminal error.
    #[must_use]
    pub fn on_error<F>(self, f: F) -> Self
    where
        F: Fn(&ReflowError) + Send + Sync + 'static,
    {
        let hooks = self.hooks.on_error(f);
        self.with_hooks(hooks)
    }

    /// Add a hook run on completion.
    #[must_use]
    pub fn on_complete<F>(self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let hooks = self.hooks.on_complete(f);
        self.with_hooks(hooks)
    }

    /// Add a hook run on completion or error, but not on cancellation.
    #[must_use]
    pub fn on_terminate<F>(self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let hooks = self.hooks.on_terminate(f);
        self.with_hooks(hooks)
    }

    /// Add a hook observing demand granted downstream.
    #[must_use]
    pub fn on_request<F>(self, f: F) -> Self
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        let hooks = self.hooks.on_request(f);
        self.with_hooks(hooks)
    }

    /// Add a hook run when downstream cancels.
    #[must_use]
    pub fn on_cancel<F>(self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let hooks = self.hooks.on_cancel(f);
        self.with_hooks(hooks)
    }
}

impl<P: Publisher> Clone for TapPublisher<P> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            hooks: self.hooks.clone(),
        }
    }
}

impl<P: Publisher> fmt::Debug for TapPublisher<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapPublisher")
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

impl<P> Publisher for TapPublisher<P>
where
    P: Publisher,
    P::Item: Send + 'static,
{
    type Item = P::Item;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<P::Item>>) {
        let hooks = self.hooks.clone();
        let tap = Arc::new_cyclic(|me| TapSubscriber {
            downstream: Downstream::new(subscriber),
            hooks,
            upstream: SubscriptionSlot::new(),
            done: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            gate: DrainCoordinator::new(),
            terminal: Mutex::new(None),
            me: Weak::clone(me),
        });
        self.source.subscribe(tap);
    }
}

/// Sits between the source and the real subscriber, and is also the
/// subscription the real subscriber sees.
struct TapSubscriber<T> {
    downstream: Downstream<T>,
    hooks: TapHooks<T>,
    upstream: SubscriptionSlot,
    done: AtomicBool,
    cancelled: AtomicBool,
    /// Held by `on_next` while it emits, and kept forever by whoever
    /// delivers the terminal signal.
    gate: DrainCoordinator,
    terminal: Mutex<Option<Result<(), ReflowError>>>,
    me: Weak<Self>,
}

impl<T> TapSubscriber<T> {
    fn finish(&self) -> bool {
        !self.done.swap(true, Ordering::AcqRel)
    }

    fn fail(&self, failure: ReflowError) {
        self.upstream.cancel();
        if self.finish() {
            self.terminate(Err(failure));
        }
    }

    /// Queue the terminal signal; delivered now unless an item is in flight,
    /// in which case `on_next` delivers it on its way out.
    fn terminate(&self, terminal: Result<(), ReflowError>) {
        {
            let mut pending = self.terminal.lock();
            if pending.is_none() {
                *pending = Some(terminal);
            }
        }
        if self.gate.enter() {
            self.deliver_terminal();
        }
    }

    fn deliver_terminal(&self) {
        let terminal = self.terminal.lock().take();
        self.upstream.release();
        match terminal {
            Some(Ok(())) => self.downstream.on_complete(),
            Some(Err(error)) => self.downstream.on_error(error),
            None => {}
        }
    }
}

impl<T: Send + 'static> Subscriber<T> for TapSubscriber<T> {
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        if !self.upstream.set(Arc::clone(&subscription)) {
            return;
        }
        if let Err(failure) = self.hooks.fire(&Signal::Subscribe(subscription)) {
            log_debug!("on_subscribe hook failed, rejecting subscriber: {failure}");
            self.upstream.cancel();
            self.done.store(true, Ordering::Release);
            if let Some(downstream) = self.downstream.release() {
                CancelledSubscription::reject(downstream.as_ref(), failure);
            }
            return;
        }
        if let Some(me) = self.me.upgrade() {
            self.downstream.on_subscribe(me);
        }
    }

    fn on_next(&self, item: T) {
        if self.done.load(Ordering::Acquire) || !self.gate.enter() {
            return;
        }
        let signal = Signal::Next(item);
        match self.hooks.fire(&signal) {
            Ok(()) => {
                if let Some(item) = signal.into_next() {
                    self.downstream.on_next(item);
                }
            }
            Err(failure) => self.fail(failure),
        }
        if self.gate.leave(1) != 0 {
            self.deliver_terminal();
        }
    }

    fn on_error(&self, error: ReflowError) {
        if !self.finish() {
            return;
        }
        let signal = Signal::Error(error);
        let outcome = self.hooks.fire(&signal);
        let Some(error) = signal.into_error() else {
            return;
        };
        match outcome {
            Ok(()) => self.terminate(Err(error)),
            Err(failure) => self.terminate(Err(error.with_suppressed(failure))),
        }
    }

    fn on_complete(&self) {
        if !self.finish() {
            return;
        }
        match self.hooks.fire(&Signal::Complete) {
            Ok(()) => self.terminate(Ok(())),
            Err(failure) => self.terminate(Err(failure)),
        }
    }
}

impl<T: Send + 'static> Subscription for TapSubscriber<T> {
    fn request(&self, n: u64) {
        if self.cancelled.load(Ordering::Acquire) {
            return;
        }
        match self.hooks.fire(&Signal::Request(n)) {
            Ok(()) => self.upstream.request(n),
            Err(failure) => self.fail(failure),
        }
    }

    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Err(failure) = self.hooks.fire(&Signal::Cancel) {
            log_warn!("on_cancel hook failed: {failure}");
        }
        self.upstream.cancel();
        self.downstream.release();
    }
}
