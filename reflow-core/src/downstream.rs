// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::ReflowError;
use crate::protocol::{Subscriber, Subscription};
use parking_lot::Mutex;
use std::sync::Arc;

/// Releasable handle on the subscriber a producer emits to.
///
/// Terminal signals take the subscriber out before delivering, so at most one
/// terminal gets through and the link stops referencing its consumer.
/// [`release`](Self::release) does the same on cancellation.
pub struct Downstream<T> {
    subscriber: Mutex<Option<Arc<dyn Subscriber<T>>>>,
}

impl<T> Downstream<T> {
    #[must_use]
    pub fn new(subscriber: Arc<dyn Subscriber<T>>) -> Self {
        Self {
            subscriber: Mutex::new(Some(subscriber)),
        }
    }

    /// The subscriber, unless it was released.
    #[must_use]
    pub fn get(&self) -> Option<Arc<dyn Subscriber<T>>> {
        self.subscriber.lock().clone()
    }

    /// Drop the subscriber; later signals are discarded.
    pub fn release(&self) -> Option<Arc<dyn Subscriber<T>>> {
        self.subscriber.lock().take()
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.subscriber.lock().is_none()
    }

    pub fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        if let Some(subscriber) = self.get() {
            subscriber.on_subscribe(subscription);
        }
    }

    pub fn on_next(&self, item: T) {
        if let Some(subscriber) = self.get() {
            subscriber.on_next(item);
        }
    }

    /// Deliver `error` and release the subscriber; discarded if it is gone.
    pub fn on_error(&self, error: ReflowError) {
        if let Some(subscriber) = self.release() {
            subscriber.on_error(error);
        }
    }

    /// Deliver completion and release the subscriber; discarded if it is gone.
    pub fn on_complete(&self) {
        if let Some(subscriber) = self.release() {
            subscriber.on_complete();
        }
    }
}
