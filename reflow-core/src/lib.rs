// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Core protocol and concurrency primitives for reflow.
//!
//! - [`Publisher`], [`Subscriber`] and [`Subscription`] define the
//!   demand-driven contract every operator honours.
//! - [`DrainCoordinator`] serializes emission for a subscription.
//! - [`CallbackChain`] holds ordered side-effect callbacks.
//! - [`SubscriptionSlot`] holds an upstream subscription that may arrive late.
//! - [`Downstream`] holds the subscriber a producer emits to until it terminates.
//! - [`IntoStream`] consumes any publisher as a `futures::Stream`.

pub mod callback_chain;
pub mod demand;
pub mod downstream;
pub mod drain;
pub mod error;
pub mod into_stream;
pub(crate) mod logging;
pub mod protocol;
pub mod signal;
pub mod stream_item;
pub mod subscription_slot;

pub use self::callback_chain::CallbackChain;
pub use self::downstream::Downstream;
pub use self::drain::DrainCoordinator;
pub use self::error::{catch_callback, IntoReflowError, ReflowError, Result, ResultExt};
pub use self::into_stream::{IntoStream, PublisherStream};
pub use self::protocol::{CancelledSubscription, Publisher, Subscriber, Subscription};
pub use self::signal::{Signal, SignalKind};
pub use self::stream_item::StreamItem;
pub use self::subscription_slot::SubscriptionSlot;
