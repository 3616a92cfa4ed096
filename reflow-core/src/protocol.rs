// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The publisher / subscriber / subscription contract.
//!
//! Every component in reflow talks through these three traits:
//!
//! - A [`Publisher`] hands each subscriber exactly one
//!   [`on_subscribe`](Subscriber::on_subscribe) before any item.
//! - A [`Subscriber`] grants credit through [`Subscription::request`] and
//!   receives at most that many [`on_next`](Subscriber::on_next) calls.
//! - [`on_error`](Subscriber::on_error) and [`on_complete`](Subscriber::on_complete)
//!   are mutually exclusive and delivered at most once.
//!
//! Signals may arrive from any thread, so every role is `Send + Sync` and
//! methods take `&self`. Implementations keep their mutable state behind
//! atomics or short-lived locks.

use crate::error::ReflowError;
use std::sync::Arc;

/// One active producer-to-consumer link, as seen by the consumer.
pub trait Subscription: Send + Sync {
    /// Grant the producer credit for `n` more items.
    ///
    /// Requests are additive and saturate at [`UNBOUNDED`](crate::demand::UNBOUNDED).
    /// A request of `0` is a protocol violation that the producer answers with
    /// [`ReflowError::InvalidDemand`].
    fn request(&self, n: u64);

    /// Stop the flow of items. Idempotent; nothing is delivered afterwards.
    fn cancel(&self);
}

/// The consumer side of the protocol.
pub trait Subscriber<T>: Send + Sync {
    /// Receives the subscription, exactly once and before any other signal.
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>);

    /// Receives the next item.
    fn on_next(&self, item: T);

    /// Receives the terminal failure.
    fn on_error(&self, error: ReflowError);

    /// Receives the terminal completion.
    fn on_complete(&self);
}

/// The producer side of the protocol.
pub trait Publisher: Send + Sync {
    /// Type of the items emitted.
    type Item;

    /// Attach a subscriber.
    ///
    /// The subscriber receives `on_subscribe` synchronously or later, but
    /// always before any item or terminal signal.
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<Self::Item>>);
}

impl<P> Publisher for Arc<P>
where
    P: Publisher + ?Sized,
{
    type Item = P::Item;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<Self::Item>>) {
        (**self).subscribe(subscriber);
    }
}

impl<P> Publisher for Box<P>
where
    P: Publisher + ?Sized,
{
    type Item = P::Item;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<Self::Item>>) {
        (**self).subscribe(subscriber);
    }
}

/// A subscription that ignores every call.
///
/// Handed to subscribers that are rejected before a real link exists, so the
/// `on_subscribe`-first rule still holds ahead of the error signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct CancelledSubscription;

impl Subscription for CancelledSubscription {
    fn request(&self, _n: u64) {}

    fn cancel(&self) {}
}

impl CancelledSubscription {
    /// Reject `subscriber`: deliver a no-op subscription, then `error`.
    pub fn reject<T>(subscriber: &dyn Subscriber<T>, error: ReflowError) {
        subscriber.on_subscribe(Arc::new(Self));
        subscriber.on_error(error);
    }
}
