// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::demand;
use crate::logging::{log_debug, log_warn};
use crate::protocol::Subscription;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Set-once, releasable holder for an upstream [`Subscription`].
///
/// Operators receive their upstream subscription asynchronously, yet may be
/// asked to request or cancel before it arrives. The slot remembers demand
/// requested early and forwards it on arrival, and cancels a subscription
/// that shows up after [`cancel`](Self::cancel) was called.
///
/// The stored subscription is dropped on [`cancel`](Self::cancel) and on
/// [`release`](Self::release), so a finished link no longer keeps its
/// producer alive. Requests made after that are ignored.
#[derive(Default)]
pub struct SubscriptionSlot {
    upstream: Mutex<Option<Arc<dyn Subscription>>>,
    filled: AtomicBool,
    cancelled: AtomicBool,
    pending: AtomicU64,
    invalid_request: AtomicBool,
}

impl SubscriptionSlot {
    /// An empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the upstream subscription.
    ///
    /// Returns `false` and cancels `subscription` if the slot was already
    /// filled or cancelled.
    pub fn set(&self, subscription: Arc<dyn Subscription>) -> bool {
        let (invalid, early) = {
            let mut upstream = self.upstream.lock();
            if self.filled.swap(true, Ordering::AcqRel) {
                drop(upstream);
                log_warn!("on_subscribe called twice; cancelling the second subscription");
                subscription.cancel();
                return false;
            }
            if self.cancelled.load(Ordering::Acquire) {
                drop(upstream);
                subscription.cancel();
                return false;
            }
            *upstream = Some(Arc::clone(&subscription));
            (
                self.invalid_request.swap(false, Ordering::AcqRel),
                self.pending.swap(0, Ordering::AcqRel),
            )
        };
        if invalid {
            subscription.request(0);
        }
        if early > 0 {
            subscription.request(early);
        }
        true
    }

    /// Forward `n` to upstream, or remember it until upstream arrives.
    pub fn request(&self, n: u64) {
        let current = {
            let upstream = self.upstream.lock();
            match upstream.as_ref() {
                Some(current) => Arc::clone(current),
                None if self.filled.load(Ordering::Acquire) => return,
                None => {
                    if n == 0 {
                        // Kept so the producer can reject it once it is known.
                        self.invalid_request.store(true, Ordering::Release);
                    } else {
                        demand::add(&self.pending, n);
                    }
                    return;
                }
            }
        };
        current.request(n);
    }

    /// Cancel upstream, now or on arrival, and drop it. Idempotent.
    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        let taken = self.upstream.lock().take();
        match taken {
            Some(upstream) => upstream.cancel(),
            None => log_debug!("cancelled before upstream subscription arrived"),
        }
    }

    /// Drop the upstream subscription without cancelling it.
    ///
    /// Called once upstream delivered its terminal signal.
    pub fn release(&self) {
        let taken = self.upstream.lock().take();
        drop(taken);
    }

    /// Returns `true` once [`cancel`](Self::cancel) was called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Returns `true` once an upstream subscription was stored, even if it
    /// has been released since.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.filled.load(Ordering::Acquire)
    }
}
