// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Item-by-item transformation.
//!
//! [`map`](crate::PublisherExt::map) applies an infallible function and
//! [`try_map`](crate::PublisherExt::try_map) a fallible one. Demand passes
//! through untouched: the downstream subscriber talks to the upstream
//! subscription directly.
//!
//! A mapper that returns an error or panics terminates the pipeline: upstream
//! is cancelled and the failure is delivered downstream once. Items that
//! arrive afterwards are dropped.

use reflow_core::{
    catch_callback, Downstream, Publisher, ReflowError, Result, Subscriber, Subscription,
    SubscriptionSlot,
};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A per-item transformation that may fail.
pub trait Mapper<T>: Send + Sync + 'static {
    /// Type produced for each item.
    type Output;

    /// Transform one item.
    ///
    /// # Errors
    /// Returns the error that terminates the mapped publisher.
    fn apply(&self, item: T) -> Result<Self::Output>;
}

/// Mapper that cannot fail, created by `map`.
pub struct Total<F>(pub F);

impl<T, U, F> Mapper<T> for Total<F>
where
    F: Fn(T) -> U + Send + Sync + 'static,
{
    type Output = U;

    fn apply(&self, item: T) -> Result<U> {
        Ok((self.0)(item))
    }
}

/// Mapper returning a `Result`, created by `try_map`.
pub struct Partial<F, E> {
    f: F,
    _error: PhantomData<fn() -> E>,
}

impl<F, E> Partial<F, E> {
    /// Wrap a fallible function.
    pub const fn new(f: F) -> Self {
        Self {
            f,
            _error: PhantomData,
        }
    }
}

impl<T, U, E, F> Mapper<T> for Partial<F, E>
where
    F: Fn(T) -> std::result::Result<U, E> + Send + Sync + 'static,
    E: Into<ReflowError> + 'static,
{
    type Output = U;

    fn apply(&self, item: T) -> Result<U> {
        (self.f)(item).map_err(Into::into)
    }
}

/// Publisher returned by `map` and `try_map`.
pub struct MapPublisher<P, M> {
    source: P,
    mapper: Arc<M>,
}

impl<P, M> MapPublisher<P, M> {
    pub(crate) fn new(source: P, mapper: M) -> Self {
        Self {
            source,
            mapper: Arc::new(mapper),
        }
    }
}

impl<P: Clone, M> Clone for MapPublisher<P, M> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            mapper: Arc::clone(&self.mapper),
        }
    }
}

impl<P, M> Publisher for MapPublisher<P, M>
where
    P: Publisher,
    P::Item: 'static,
    M: Mapper<P::Item>,
    M::Output: 'static,
{
    type Item = M::Output;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<M::Output>>) {
        self.source.subscribe(Arc::new(MapSubscriber {
            downstream: Downstream::new(subscriber),
            mapper: Arc::clone(&self.mapper),
            upstream: SubscriptionSlot::new(),
            done: AtomicBool::new(false),
            _item: PhantomData,
        }));
    }
}

struct MapSubscriber<T, M: Mapper<T>> {
    downstream: Downstream<M::Output>,
    mapper: Arc<M>,
    upstream: SubscriptionSlot,
    done: AtomicBool,
    _item: PhantomData<fn(T)>,
}

impl<T, M> MapSubscriber<T, M>
where
    M: Mapper<T>,
{
    fn finish(&self) -> bool {
        !self.done.swap(true, Ordering::AcqRel)
    }
}

impl<T, M> Subscriber<T> for MapSubscriber<T, M>
where
    M: Mapper<T>,
{
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        if self.upstream.set(Arc::clone(&subscription)) {
            self.downstream.on_subscribe(subscription);
        }
    }

    fn on_next(&self, item: T) {
        if self.done.load(Ordering::Acquire) {
            return;
        }
        let mapped = catch_callback(|| self.mapper.apply(item)).and_then(|result| result);
        match mapped {
            Ok(value) => self.downstream.on_next(value),
            Err(error) => {
                if self.finish() {
                    self.upstream.cancel();
                    self.downstream.on_error(error);
                }
            }
        }
    }

    fn on_error(&self, error: ReflowError) {
        if self.finish() {
            self.upstream.release();
            self.downstream.on_error(error);
        }
    }

    fn on_complete(&self) {
        if self.finish() {
            self.upstream.release();
            self.downstream.on_complete();
        }
    }
}
