// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Bounded-concurrency flat-map merge.
//!
//! [`flat_map`](crate::PublisherExt::flat_map) maps every outer item to an
//! inner publisher and merges the inner outputs into one demand-driven
//! sequence.
//!
//! # Behavior
//!
//! - At most [`MaxConcurrency`] inner publishers are subscribed at once.
//!   Outer items beyond that wait until an inner finishes.
//! - Each inner is asked for `prefetch` items up front and topped up once
//!   three quarters of them have been delivered downstream.
//! - Items of one inner keep their relative order; items of different
//!   inners interleave round-robin, so no inner with buffered items starves.
//! - Without `delay_errors` the first failure cancels the outer publisher
//!   and every inner, drops buffered items and is delivered once. With it,
//!   failures are collected and delivered once everything else has finished:
//!   a single failure as itself, several as [`ReflowError::Composite`] in
//!   encounter order.
//! - Cancelling downstream cancels the outer publisher and every active
//!   inner. A second cancel does nothing.
//! - Once terminated or cancelled the merge lets go of its subscriber, its
//!   upstream subscriptions and every buffered item, so the mapper and the
//!   inner publishers it captured can be dropped.
//!
//! # Example
//!
//! ```ignore
//! use reflow_stream::prelude::*;
//! use reflow_test_utils::TestSubscriber;
//!
//! let merged = from_iter(1..=3).flat_map_with(
//!     |v| from_iter(vec![v; 2]),
//!     FlatMapConfig::default().max_concurrency(MaxConcurrency::Bounded(1)),
//! );
//!
//! let ts = TestSubscriber::unbounded();
//! merged.subscribe(ts.clone());
//!
//! assert_eq!(ts.items(), vec![1, 1, 2, 2, 3, 3]);
//! assert!(ts.is_complete());
//! ```
//!
//! [`ReflowError::Composite`]: reflow_core::ReflowError::Composite

mod config;
mod implementation;

pub use config::{FlatMapConfig, MaxConcurrency, DEFAULT_MAX_CONCURRENCY, DEFAULT_PREFETCH};
pub use implementation::FlatMapPublisher;
