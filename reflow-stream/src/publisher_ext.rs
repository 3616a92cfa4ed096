// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::flat_map::{FlatMapConfig, FlatMapPublisher};
use crate::map::{MapPublisher, Partial, Total};
use crate::tap::{TapHooks, TapPublisher};
use reflow_core::{Publisher, ReflowError, Subscription};
use std::sync::Arc;

/// A type-erased, shareable publisher.
pub type BoxPublisher<T> = Arc<dyn Publisher<Item = T>>;

/// Fluent operators available on every [`Publisher`].
///
/// The tap operators (`on_next`, `on_error`, ...) wrap the receiver in a
/// [`TapPublisher`]. Calling them again on that tap adds to its hook set
/// rather than wrapping it a second time.
pub trait PublisherExt: Publisher + Sized {
    /// Transform every item with `f`.
    fn map<U, F>(self, f: F) -> MapPublisher<Self, Total<F>>
    where
        F: Fn(Self::Item) -> U + Send + Sync + 'static,
    {
        MapPublisher::new(self, Total(f))
    }

    /// Transform every item with a fallible `f`; the first error ends the
    /// stream.
    fn try_map<U, E, F>(self, f: F) -> MapPublisher<Self, Partial<F, E>>
    where
        F: Fn(Self::Item) -> Result<U, E> + Send + Sync + 'static,
        E: Into<ReflowError> + 'static,
    {
        MapPublisher::new(self, Partial::new(f))
    }

    /// Map every item to an inner publisher and merge their outputs, using
    /// the default [`FlatMapConfig`].
    fn flat_map<Q, F>(self, mapper: F) -> FlatMapPublisher<Self, Q::Item>
    where
        Self: 'static,
        Self::Item: Send + 'static,
        F: Fn(Self::Item) -> Q + Send + Sync + 'static,
        Q: Publisher + 'static,
        Q::Item: Send + 'static,
    {
        self.flat_map_with(mapper, FlatMapConfig::default())
    }

    /// Map every item to an inner publisher and merge their outputs.
    ///
    /// An invalid `config` is reported to each subscriber as
    /// [`ReflowError::InvalidArgument`]; the source is not subscribed.
    fn flat_map_with<Q, F>(self, mapper: F, config: FlatMapConfig) -> FlatMapPublisher<Self, Q::Item>
    where
        Self: 'static,
        Self::Item: Send + 'static,
        F: Fn(Self::Item) -> Q + Send + Sync + 'static,
        Q: Publisher + 'static,
        Q::Item: Send + 'static,
    {
        FlatMapPublisher::new(self, mapper, config)
    }

    /// Run `hooks` around every signal.
    fn tap(self, hooks: TapHooks<Self::Item>) -> TapPublisher<Self> {
        TapPublisher::new(self, hooks)
    }

    /// Observe the upstream subscription.
    fn on_subscribe<F>(self, f: F) -> TapPublisher<Self>
    where
        F: Fn(&Arc<dyn Subscription>) + Send + Sync + 'static,
    {
        self.tap(TapHooks::new()).on_subscribe(f)
    }

    /// Observe every item.
    fn on_next<F>(self, f: F) -> TapPublisher<Self>
    where
        F: Fn(&Self::Item) + Send + Sync + 'static,
    {
        self.tap(TapHooks::new()).on_next(f)
    }

    /// Observe every item; alias of [`on_next`](Self::on_next).
    fn peek<F>(self, f: F) -> TapPublisher<Self>
    where
        F: Fn(&Self::Item) + Send + Sync + 'static,
    {
        self.tap(TapHooks::new()).peek(f)
    }

    /// Observe the terminal error.
    fn on_error<F>(self, f: F) -> TapPublisher<Self>
    where
        F: Fn(&ReflowError) + Send + Sync + 'static,
    {
        self.tap(TapHooks::new()).on_error(f)
    }

    /// Run `f` on completion.
    fn on_complete<F>(self, f: F) -> TapPublisher<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.tap(TapHooks::new()).on_complete(f)
    }

    /// Run `f` on completion or error.
    fn on_terminate<F>(self, f: F) -> TapPublisher<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.tap(TapHooks::new()).on_terminate(f)
    }

    /// Observe demand granted downstream.
    fn on_request<F>(self, f: F) -> TapPublisher<Self>
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        self.tap(TapHooks::new()).on_request(f)
    }

    /// Run `f` when downstream cancels.
    fn on_cancel<F>(self, f: F) -> TapPublisher<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.tap(TapHooks::new()).on_cancel(f)
    }

    /// Erase the publisher type.
    fn boxed(self) -> BoxPublisher<Self::Item>
    where
        Self: 'static,
    {
        Arc::new(self)
    }
}

impl<P: Publisher> PublisherExt for P {}
