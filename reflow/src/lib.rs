// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Reflow
//!
//! Demand-driven reactive streams for Rust.
//!
//! ## Overview
//!
//! A [`Publisher`] emits items to a [`Subscriber`] only as fast as the
//! subscriber asks for them through its [`Subscription`]. On top of that
//! contract reflow provides:
//!
//! - **Tap** hooks observing every protocol signal, composed into one
//!   decorator however many are chained
//! - **Flat-map** merging the inner publishers produced per item, with a
//!   concurrency cap, per-inner prefetch and optional error deferral
//! - **Map**, and a handful of iterator-backed sources
//! - A bridge to `futures::Stream` through [`IntoStream`]
//!
//! Operators own no threads and never block. Emission is serialized by a
//! [`DrainCoordinator`], so deeply synchronous pipelines run with a flat
//! stack.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reflow::prelude::*;
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut stream = from_iter(1..=3)
//!         .flat_map(|v| from_iter(vec![v; 2]))
//!         .peek(|v| println!("saw {v}"))
//!         .into_stream();
//!
//!     while let Some(item) = stream.next().await {
//!         println!("{}", item.unwrap());
//!     }
//! }
//! ```

// Re-export core types
pub use reflow_core::{
    catch_callback, CallbackChain, CancelledSubscription, Downstream, DrainCoordinator,
    IntoStream, Publisher, PublisherStream, ReflowError, Result, Signal, SignalKind, StreamItem,
    Subscriber, Subscription, SubscriptionSlot,
};

// Re-export operators and sources
pub use reflow_stream::{
    empty, error, from_iter, from_once, just, BoxPublisher, FlatMapConfig, FlatMapPublisher,
    MaxConcurrency, PublisherExt, TapHooks, TapPublisher,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use reflow_stream::prelude::*;
}
