// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Demand-driven sources and operators built on [`reflow_core`].
//!
//! # Operators
//!
//! - **[`map`](PublisherExt::map) / [`try_map`](PublisherExt::try_map)**: per-item
//!   transformation; demand passes straight through.
//! - **Tap** ([`on_next`](PublisherExt::on_next), [`on_error`](PublisherExt::on_error),
//!   [`on_request`](PublisherExt::on_request), ...): side effects on any of the
//!   six protocol signals, composed without nesting.
//! - **[`flat_map`](PublisherExt::flat_map)**: maps items to inner publishers
//!   and merges them under a concurrency cap, with per-inner prefetch and an
//!   optional error-deferral mode.
//!
//! # Sources
//!
//! [`from_iter`], [`just`], [`empty`], [`error()`] and the
//! single-subscription [`from_once`].
//!
//! # Threading
//!
//! Operators own no threads. Producers may signal from any thread; each
//! operator serializes its own emission with a
//! [`DrainCoordinator`](reflow_core::DrainCoordinator), so downstream never
//! sees two signals at once.

pub mod flat_map;
pub mod from_iter;
pub(crate) mod logging;
pub mod map;
pub mod prelude;
pub mod publisher_ext;
pub mod tap;

pub use self::flat_map::{FlatMapConfig, FlatMapPublisher, MaxConcurrency};
pub use self::from_iter::{
    empty, error, from_iter, from_once, just, ErrorPublisher, IterPublisher, OncePublisher,
};
pub use self::map::{MapPublisher, Mapper};
pub use self::publisher_ext::{BoxPublisher, PublisherExt};
pub use self::tap::{TapHooks, TapPublisher};
